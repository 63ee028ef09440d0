// ==========================================
// 灌溉水务订单系统 - 用水订单领域模型
// ==========================================
// 订单由客户提交，通过容量核算后以 PENDING 状态入库；
// 之后仅允许管理员按状态机流转，订单永不删除。
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::types::{OrderStatus, WaterUnit};

// ==========================================
// WaterOrder - 用水订单
// ==========================================
// 不变式: start_at < end_at; total_gallons >= 0 且有限
// total_gallons 在提交时由录入单位折算得出，此后不再重算
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaterOrder {
    // ===== 主键与归属 =====
    pub order_id: String,             // 订单ID (UUID)
    pub tenant_id: String,            // 所属租户
    pub user_id: String,              // 提交用户

    // ===== 请求区间与水量 =====
    pub start_at: DateTime<Utc>,      // 用水开始时间 (UTC)
    pub end_at: DateTime<Utc>,        // 用水结束时间 (UTC, 半开区间)
    pub requested_amount: f64,        // 用户录入数量 (原始值)
    pub requested_unit: WaterUnit,    // 用户录入单位 (原始值)
    pub total_gallons: f64,           // 折算后总量 (加仑, 提交时固化)

    // ===== 状态与审核 =====
    pub status: OrderStatus,          // 当前状态
    pub created_at: DateTime<Utc>,    // 提交时间
    pub reviewed_by: Option<String>,  // 审核人
    pub reviewed_at: Option<DateTime<Utc>>, // 审核时间
    pub review_notes: Option<String>, // 审核备注
}

impl WaterOrder {
    /// 创建待审核订单（服务端分配ID与时间戳）
    pub fn new_pending(
        tenant_id: &str,
        user_id: &str,
        start_at: DateTime<Utc>,
        end_at: DateTime<Utc>,
        requested_amount: f64,
        requested_unit: WaterUnit,
        total_gallons: f64,
    ) -> Self {
        Self {
            order_id: Uuid::new_v4().to_string(),
            tenant_id: tenant_id.to_string(),
            user_id: user_id.to_string(),
            start_at,
            end_at,
            requested_amount,
            requested_unit,
            total_gallons,
            status: OrderStatus::Pending,
            created_at: Utc::now(),
            reviewed_by: None,
            reviewed_at: None,
            review_notes: None,
        }
    }

    /// 是否计入承诺需求
    pub fn is_committed(&self) -> bool {
        self.status.is_committed()
    }

    /// 时间区间是否按时间先后排列
    pub fn is_chronological(&self) -> bool {
        self.start_at < self.end_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 1, h, 0, 0).unwrap()
    }

    #[test]
    fn test_new_pending_order() {
        let order = WaterOrder::new_pending(
            "T001",
            "U001",
            ts(8),
            ts(9),
            5.0,
            WaterUnit::Kgal,
            5_000.0,
        );

        assert_eq!(order.status, OrderStatus::Pending);
        assert!(!order.is_committed());
        assert!(order.is_chronological());
        assert!(order.reviewed_by.is_none());
        assert!(order.reviewed_at.is_none());
        assert_eq!(order.requested_unit, WaterUnit::Kgal);
        assert!((order.total_gallons - 5_000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_committed_follows_status() {
        let mut order = WaterOrder::new_pending(
            "T001",
            "U001",
            ts(8),
            ts(10),
            100.0,
            WaterUnit::Gallons,
            100.0,
        );

        order.status = OrderStatus::Approved;
        assert!(order.is_committed());

        order.status = OrderStatus::Completed;
        assert!(order.is_committed());

        order.status = OrderStatus::Rejected;
        assert!(!order.is_committed());
    }
}
