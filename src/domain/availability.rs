// ==========================================
// 灌溉水务订单系统 - 供水时段领域模型
// ==========================================
// 供水时段由租户管理员维护，声明某一时间区间内
// 可被订单消耗的总供水量。小时速率为派生值，不落库。
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ==========================================
// AvailabilityWindow - 供水时段
// ==========================================
// 不变式: start_at < end_at; total_gallons >= 0 且有限
// 容量核算引擎只读此数据
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityWindow {
    pub window_id: String,            // 时段ID (UUID)
    pub tenant_id: String,            // 所属租户
    pub start_at: DateTime<Utc>,      // 开始时间 (UTC)
    pub end_at: DateTime<Utc>,        // 结束时间 (UTC, 半开区间)
    pub total_gallons: f64,           // 整个时段可供水量 (加仑)
    pub created_at: DateTime<Utc>,    // 创建时间
    pub updated_at: DateTime<Utc>,    // 更新时间
}

impl AvailabilityWindow {
    /// 创建新的供水时段（服务端分配ID与时间戳）
    pub fn new(
        tenant_id: &str,
        start_at: DateTime<Utc>,
        end_at: DateTime<Utc>,
        total_gallons: f64,
    ) -> Self {
        let now = Utc::now();
        Self {
            window_id: Uuid::new_v4().to_string(),
            tenant_id: tenant_id.to_string(),
            start_at,
            end_at,
            total_gallons,
            created_at: now,
            updated_at: now,
        }
    }

    /// 时间区间是否按时间先后排列
    pub fn is_chronological(&self) -> bool {
        self.start_at < self.end_at
    }

    /// 水量是否合法（非负且有限）
    pub fn has_valid_gallons(&self) -> bool {
        self.total_gallons.is_finite() && self.total_gallons >= 0.0
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
    fn test_new_window_defaults() {
        let window = AvailabilityWindow::new("T001", ts(0), ts(24 - 1), 240_000.0);
        assert_eq!(window.tenant_id, "T001");
        assert!(!window.window_id.is_empty());
        assert!(window.is_chronological());
        assert!(window.has_valid_gallons());
    }

    #[test]
    fn test_invalid_ranges_detected() {
        let mut window = AvailabilityWindow::new("T001", ts(5), ts(5), 100.0);
        assert!(!window.is_chronological());

        window.end_at = ts(6);
        assert!(window.is_chronological());

        window.total_gallons = -1.0;
        assert!(!window.has_valid_gallons());

        window.total_gallons = f64::NAN;
        assert!(!window.has_valid_gallons());
    }
}
