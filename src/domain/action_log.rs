// ==========================================
// 灌溉水务订单系统 - 操作日志领域模型
// ==========================================
// 红线: 所有 API 写操作必须记录一条日志
// 用途: 审计追踪 (谁在何时对哪个订单/窗口做了什么)
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

// ==========================================
// ActionType - 操作类型
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionType {
    SubmitOrder,   // 提交订单 (含被拒绝的提交)
    ApproveOrder,  // 审核通过
    RejectOrder,   // 审核拒绝
    CompleteOrder, // 完成交付
    CreateWindow,  // 创建可用量窗口
    UpdateWindow,  // 修改可用量窗口
    DeleteWindow,  // 删除可用量窗口
}

impl ActionType {
    /// 转换为字符串 (用于数据库存储)
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::SubmitOrder => "SubmitOrder",
            ActionType::ApproveOrder => "ApproveOrder",
            ActionType::RejectOrder => "RejectOrder",
            ActionType::CompleteOrder => "CompleteOrder",
            ActionType::CreateWindow => "CreateWindow",
            ActionType::UpdateWindow => "UpdateWindow",
            ActionType::DeleteWindow => "DeleteWindow",
        }
    }

    /// 从字符串解析
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "SubmitOrder" => Some(ActionType::SubmitOrder),
            "ApproveOrder" => Some(ActionType::ApproveOrder),
            "RejectOrder" => Some(ActionType::RejectOrder),
            "CompleteOrder" => Some(ActionType::CompleteOrder),
            "CreateWindow" => Some(ActionType::CreateWindow),
            "UpdateWindow" => Some(ActionType::UpdateWindow),
            "DeleteWindow" => Some(ActionType::DeleteWindow),
            _ => None,
        }
    }
}

// ==========================================
// OrderActionLog - 操作日志
// ==========================================
// 对齐: db.rs order_action_log 表
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderActionLog {
    // ===== 主键与归属 =====
    pub action_id: String,        // 日志ID (UUID)
    pub tenant_id: String,        // 所属租户
    pub order_id: Option<String>, // 关联订单 (窗口维护操作为 None)

    // ===== 操作内容 =====
    pub action_type: ActionType,  // 操作类型
    pub action_ts: DateTime<Utc>, // 操作时间戳
    pub actor: String,            // 操作人

    // ===== 操作负载 =====
    pub payload_json: Option<JsonValue>, // 操作参数 (JSON)
    pub detail: Option<String>,          // 详细描述
}

impl OrderActionLog {
    /// 创建新的操作日志 (服务端分配ID与时间戳)
    pub fn new(tenant_id: &str, action_type: ActionType, actor: &str) -> Self {
        Self {
            action_id: uuid::Uuid::new_v4().to_string(),
            tenant_id: tenant_id.to_string(),
            order_id: None,
            action_type,
            action_ts: Utc::now(),
            actor: actor.to_string(),
            payload_json: None,
            detail: None,
        }
    }

    /// 关联订单ID
    pub fn with_order_id(mut self, order_id: &str) -> Self {
        self.order_id = Some(order_id.to_string());
        self
    }

    /// 设置操作负载 (转换为JSON)
    pub fn with_payload<T: Serialize>(mut self, payload: &T) -> Self {
        self.payload_json = serde_json::to_value(payload).ok();
        self
    }

    /// 设置详细描述
    pub fn with_detail(mut self, detail: &str) -> Self {
        self.detail = Some(detail.to_string());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_type_round_trip() {
        for action in [
            ActionType::SubmitOrder,
            ActionType::ApproveOrder,
            ActionType::RejectOrder,
            ActionType::CompleteOrder,
            ActionType::CreateWindow,
            ActionType::UpdateWindow,
            ActionType::DeleteWindow,
        ] {
            assert_eq!(ActionType::from_str(action.as_str()), Some(action));
        }
        assert_eq!(ActionType::from_str("Unknown"), None);
    }

    #[test]
    fn test_builders_populate_optional_fields() {
        let log = OrderActionLog::new("T001", ActionType::SubmitOrder, "user-1")
            .with_order_id("O123")
            .with_payload(&serde_json::json!({ "total_gallons": 5000.0 }))
            .with_detail("提交订单");

        assert_eq!(log.tenant_id, "T001");
        assert_eq!(log.order_id.as_deref(), Some("O123"));
        assert_eq!(log.action_type, ActionType::SubmitOrder);
        assert_eq!(log.actor, "user-1");
        assert!(log.payload_json.is_some());
        assert_eq!(log.detail.as_deref(), Some("提交订单"));
    }
}
