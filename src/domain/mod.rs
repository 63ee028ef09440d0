// ==========================================
// 灌溉水务订单系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型、业务规则接口
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod action_log;
pub mod availability;
pub mod member;
pub mod notification;
pub mod order;
pub mod types;

// 重导出核心类型
pub use action_log::{ActionType, OrderActionLog};
pub use availability::AvailabilityWindow;
pub use member::TenantMember;
pub use notification::Notification;
pub use order::WaterOrder;
pub use types::{OrderStatus, WaterUnit};
