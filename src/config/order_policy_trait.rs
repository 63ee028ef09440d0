// ==========================================
// 灌溉水务订单系统 - 订单策略读取 Trait
// ==========================================
// 职责: 定义订单链路所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use async_trait::async_trait;
use std::error::Error;

// ==========================================
// OrderPolicyReader Trait
// ==========================================
// 用途: 订单提交/审核链路所需的策略项读取接口
// 实现者: ConfigManager（从 config_kv 表读取）
#[async_trait]
pub trait OrderPolicyReader: Send + Sync {
    /// 订单状态变更后是否发送站内通知
    ///
    /// # 默认值
    /// - true
    async fn get_notify_on_status_change(&self) -> Result<bool, Box<dyn Error>>;

    /// 候选订单允许的最大时间跨度（小时）
    ///
    /// # 返回
    /// - i64: 小时数，小时扫描的上限护栏
    ///
    /// # 默认值
    /// - 8784（366 天）
    async fn get_max_order_window_hours(&self) -> Result<i64, Box<dyn Error>>;

    /// 站内通知保留天数（超期可清理）
    ///
    /// # 默认值
    /// - 90
    async fn get_notification_retention_days(&self) -> Result<i32, Box<dyn Error>>;

    /// 通知文案的默认语言
    ///
    /// # 默认值
    /// - zh-CN
    async fn get_default_locale(&self) -> Result<String, Box<dyn Error>>;
}
