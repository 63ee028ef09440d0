// ==========================================
// 灌溉水务订单系统 - 通知投递接口
// ==========================================
// 职责: 定义通知投递 trait，实现依赖倒置
// 说明: Engine 层定义 trait，外部渠道（邮件/短信等）实现适配器
// 红线: 通知投递失败不得影响订单业务流程 (fire-and-forget)
// ==========================================

use crate::domain::Notification;
use std::error::Error;
use std::sync::Arc;

// ==========================================
// 通知投递 Trait
// ==========================================

/// 通知投递者 Trait
///
/// 订单状态变更后, API 层先把 Notification 落库,
/// 再调用此接口把同一条通知推向外部渠道。
///
/// # 实现说明
/// - 返回 `Ok(delivery_id)`: 渠道回执ID（不支持回执时为空字符串）
/// - 投递失败由调用方记录 warn 日志后继续, 不回滚业务
pub trait NotificationSink: Send + Sync {
    fn dispatch(&self, notification: &Notification) -> Result<String, Box<dyn Error + Send + Sync>>;
}

/// 空操作通知投递者
///
/// 用于不需要外部投递的场景（如单元测试、纯站内通知部署）
#[derive(Debug, Clone, Default)]
pub struct NoOpNotificationSink;

impl NotificationSink for NoOpNotificationSink {
    fn dispatch(
        &self,
        notification: &Notification,
    ) -> Result<String, Box<dyn Error + Send + Sync>> {
        tracing::debug!(
            "NoOpNotificationSink: 跳过外部投递 - user_id={}, message={}",
            notification.user_id,
            notification.message
        );
        Ok(String::new())
    }
}

/// 可选的通知投递包装
///
/// 简化 Option<Arc<dyn NotificationSink>> 的使用
pub struct OptionalNotificationSink {
    inner: Option<Arc<dyn NotificationSink>>,
}

impl OptionalNotificationSink {
    /// 创建带投递者的实例
    pub fn with_sink(sink: Arc<dyn NotificationSink>) -> Self {
        Self { inner: Some(sink) }
    }

    /// 创建空实例（不做外部投递）
    pub fn none() -> Self {
        Self { inner: None }
    }

    /// 投递通知（如果配置了投递者）
    pub fn dispatch(
        &self,
        notification: &Notification,
    ) -> Result<String, Box<dyn Error + Send + Sync>> {
        match &self.inner {
            Some(sink) => sink.dispatch(notification),
            None => {
                tracing::debug!(
                    "OptionalNotificationSink: 未配置投递者，跳过 - user_id={}",
                    notification.user_id
                );
                Ok(String::new())
            }
        }
    }

    /// 检查是否配置了投递者
    pub fn is_configured(&self) -> bool {
        self.inner.is_some()
    }
}

impl Default for OptionalNotificationSink {
    fn default() -> Self {
        Self::none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_notification() -> Notification {
        Notification::new("T001", "U001", "订单已批准".to_string())
    }

    #[test]
    fn test_noop_sink() {
        let sink = NoOpNotificationSink;
        let result = sink.dispatch(&sample_notification());
        assert!(result.is_ok());
        assert!(result.unwrap().is_empty());
    }

    #[test]
    fn test_optional_sink_none() {
        let sink = OptionalNotificationSink::none();
        assert!(!sink.is_configured());
        assert!(sink.dispatch(&sample_notification()).is_ok());
    }

    #[test]
    fn test_optional_sink_with_noop() {
        let noop = Arc::new(NoOpNotificationSink) as Arc<dyn NotificationSink>;
        let sink = OptionalNotificationSink::with_sink(noop);
        assert!(sink.is_configured());
        assert!(sink.dispatch(&sample_notification()).is_ok());
    }
}
