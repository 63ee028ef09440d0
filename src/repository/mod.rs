// ==========================================
// 灌溉水务订单系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod action_log_repo;
pub mod availability_repo;
pub mod db_utils;
pub mod error;
pub mod notification_repo;
pub mod tenant_member_repo;
pub mod water_order_repo;

// 重导出核心仓储
pub use action_log_repo::OrderActionLogRepository;
pub use availability_repo::AvailabilityWindowRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use notification_repo::NotificationRepository;
pub use tenant_member_repo::TenantMemberRepository;
pub use water_order_repo::WaterOrderRepository;
