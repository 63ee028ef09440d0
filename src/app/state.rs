// ==========================================
// 灌溉水务订单系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// ==========================================

use std::sync::{Arc, Mutex};

use crate::api::{AvailabilityApi, OrderApi};
use crate::config::ConfigManager;
use crate::db;
use crate::engine::{CapacityLedgerEngine, NotificationSink, OptionalNotificationSink};
use crate::repository::{
    AvailabilityWindowRepository, NotificationRepository, OrderActionLogRepository,
    TenantMemberRepository, WaterOrderRepository,
};

/// 应用状态
///
/// 包含所有API实例和共享资源
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 订单API
    pub order_api: Arc<OrderApi>,

    /// 供水时段API
    pub availability_api: Arc<AvailabilityApi>,

    /// 配置管理器
    pub config_manager: Arc<ConfigManager>,

    /// 订单仓储（用于查询与统计）
    pub order_repo: Arc<WaterOrderRepository>,

    /// 租户成员仓储（用于成员维护）
    pub member_repo: Arc<TenantMemberRepository>,

    /// 通知仓储（用于查收与超期清理）
    pub notification_repo: Arc<NotificationRepository>,

    /// 操作日志仓储（用于审计追踪）
    pub action_log_repo: Arc<OrderActionLogRepository>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    ///
    /// # 说明
    /// 该方法会：
    /// 1. 打开共享数据库连接并建表
    /// 2. 初始化所有Repository
    /// 3. 初始化容量核算引擎
    /// 4. 创建所有API实例
    pub fn new(db_path: String) -> Result<Self, String> {
        Self::with_notification_sink(db_path, OptionalNotificationSink::none())
    }

    /// 创建带外部通知渠道的AppState实例
    pub fn with_sink(
        db_path: String,
        sink: Arc<dyn NotificationSink>,
    ) -> Result<Self, String> {
        Self::with_notification_sink(db_path, OptionalNotificationSink::with_sink(sink))
    }

    fn with_notification_sink(
        db_path: String,
        notification_sink: OptionalNotificationSink,
    ) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        // 创建数据库连接（共享连接）并建表
        let conn =
            db::open_sqlite_connection(&db_path).map_err(|e| format!("无法打开数据库: {}", e))?;
        db::init_schema(&conn).map_err(|e| format!("无法初始化数据库结构: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        // ==========================================
        // 初始化Repository层
        // ==========================================
        let window_repo = Arc::new(AvailabilityWindowRepository::new(conn.clone()));
        let order_repo = Arc::new(WaterOrderRepository::new(conn.clone()));
        let member_repo = Arc::new(TenantMemberRepository::new(conn.clone()));
        let notification_repo = Arc::new(NotificationRepository::new(conn.clone()));
        let action_log_repo = Arc::new(OrderActionLogRepository::new(conn.clone()));

        // ==========================================
        // 初始化Engine层
        // ==========================================

        // 配置管理器（复用同一个共享连接）
        let config_manager = Arc::new(
            ConfigManager::from_connection(conn.clone())
                .map_err(|e| format!("无法初始化配置管理器: {}", e))?,
        );

        // 容量核算引擎
        let ledger_engine = Arc::new(CapacityLedgerEngine::new(config_manager.clone()));

        // ==========================================
        // 初始化API层
        // ==========================================

        let order_api = Arc::new(OrderApi::new(
            order_repo.clone(),
            window_repo.clone(),
            member_repo.clone(),
            notification_repo.clone(),
            action_log_repo.clone(),
            ledger_engine,
            config_manager.clone(),
            notification_sink,
        ));

        let availability_api = Arc::new(AvailabilityApi::new(
            window_repo,
            member_repo.clone(),
            action_log_repo.clone(),
        ));

        tracing::info!("AppState初始化完成");

        Ok(Self {
            db_path,
            order_api,
            availability_api,
            config_manager,
            order_repo,
            member_repo,
            notification_repo,
            action_log_repo,
        })
    }

    /// 获取数据库路径
    pub fn get_db_path(&self) -> &str {
        &self.db_path
    }
}

// ==========================================
// 默认数据库路径辅助函数
// ==========================================

/// 获取默认数据库路径
///
/// # 返回
/// - 环境变量 AQUAWISE_DB 显式指定时优先
/// - 开发环境: 用户数据目录/aquawise-dev/aquawise.db
/// - 生产环境: 用户数据目录/aquawise/aquawise.db
/// - 拿不到用户数据目录时回退 ./aquawise.db
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    // 允许通过环境变量显式指定 DB 路径（便于调试/测试/CI）
    if let Ok(path) = std::env::var("AQUAWISE_DB") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./aquawise.db");

    if let Some(data_dir) = dirs::data_dir() {
        // 开发环境使用独立目录，避免污染生产数据
        #[cfg(debug_assertions)]
        {
            path = data_dir.join("aquawise-dev");
        }

        #[cfg(not(debug_assertions))]
        {
            path = data_dir.join("aquawise");
        }

        // 确保目录存在
        std::fs::create_dir_all(&path).ok();
        path = path.join("aquawise.db");
    }

    path.to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_default_db_path() {
        let path = get_default_db_path();
        assert!(!path.is_empty());
        assert!(path.ends_with(".db"));
    }

    // 注意：AppState::new() 的测试需要真实的数据库文件
    // 这些测试在集成测试中进行
}
