// ==========================================
// 灌溉水务订单系统 - 通知记录领域模型
// ==========================================
// 订单状态变更时为订单归属用户生成一条通知记录。
// 外部送达渠道（邮件/短信）不在本系统范围内，
// 由 engine::events::NotificationSink 适配。
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ==========================================
// Notification - 通知记录
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub notification_id: String,      // 通知ID (UUID)
    pub tenant_id: String,            // 所属租户
    pub user_id: String,              // 接收用户
    pub message: String,              // 通知正文（已本地化）
    pub details: Option<String>,      // 附加说明
    pub link: Option<String>,         // 关联页面链接
    pub created_at: DateTime<Utc>,    // 生成时间
    pub read_flag: bool,              // 是否已读
}

impl Notification {
    /// 创建新通知
    pub fn new(tenant_id: &str, user_id: &str, message: String) -> Self {
        Self {
            notification_id: Uuid::new_v4().to_string(),
            tenant_id: tenant_id.to_string(),
            user_id: user_id.to_string(),
            message,
            details: None,
            link: None,
            created_at: Utc::now(),
            read_flag: false,
        }
    }

    /// 设置附加说明
    pub fn with_details(mut self, details: String) -> Self {
        self.details = Some(details);
        self
    }

    /// 设置关联链接
    pub fn with_link(mut self, link: String) -> Self {
        self.link = Some(link);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notification_builders() {
        let note = Notification::new("T001", "U001", "订单已批准".to_string())
            .with_details("审核备注: 当季配额内".to_string())
            .with_link("/orders/WO-1001".to_string());

        assert_eq!(note.tenant_id, "T001");
        assert_eq!(note.user_id, "U001");
        assert!(!note.read_flag);
        assert_eq!(note.details.as_deref(), Some("审核备注: 当季配额内"));
        assert_eq!(note.link.as_deref(), Some("/orders/WO-1001"));
    }
}
