// ==========================================
// 容量核算核心 (CapacityLedgerCore)
// ==========================================
// 职责: 判定候选订单能否在不超出任一小时可供水量的前提下被接受
// 算法: 小时扫描 — 候选区间逐小时切片, 每片比较 承诺需求+候选速率 与 可供速率
// 红线: 纯函数, 无 IO, 无时钟, 不做任何预留或锁定;
//       容量不足返回 LedgerDecision { ok: false }, 不是错误
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{AvailabilityWindow, WaterOrder};
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::rate::RateDistributor;

/// 容量比较容差 (加仑/小时), 吸收浮点累加漂移
pub const CAPACITY_EPSILON: f64 = 1e-6;

// ==========================================
// CandidateOrder - 待核算的候选订单
// ==========================================
// 水量已由单位折算层转为加仑; 核心不关心原始单位
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateOrder {
    pub tenant_id: String,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub total_gallons: f64,
}

// ==========================================
// LedgerDecision - 核算结论
// ==========================================
// ok=false 时附带首个失败切片的诊断信息与机器可读原因码
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerDecision {
    pub ok: bool,
    pub requested_per_hour: f64,                   // 候选订单的小时均摊速率
    pub hours_checked: i64,                        // 实际检查的切片数 (含失败切片)
    pub failed_slice_start: Option<DateTime<Utc>>, // 首个失败切片起点
    pub capacity_at_failure: Option<f64>,          // 失败切片的可供速率
    pub demand_at_failure: Option<f64>,            // 失败切片的已承诺速率
    pub reasons: Vec<String>,                      // 原因码列表 (通过时为空)
}

impl LedgerDecision {
    fn accepted(requested_per_hour: f64, hours_checked: i64) -> Self {
        Self {
            ok: true,
            requested_per_hour,
            hours_checked,
            failed_slice_start: None,
            capacity_at_failure: None,
            demand_at_failure: None,
            reasons: Vec::new(),
        }
    }

    fn rejected(
        requested_per_hour: f64,
        hours_checked: i64,
        slice_start: DateTime<Utc>,
        capacity: f64,
        demand: f64,
        reason: String,
    ) -> Self {
        Self {
            ok: false,
            requested_per_hour,
            hours_checked,
            failed_slice_start: Some(slice_start),
            capacity_at_failure: Some(capacity),
            demand_at_failure: Some(demand),
            reasons: vec![reason],
        }
    }
}

// ==========================================
// CapacityLedgerCore - 核心算法
// ==========================================
pub struct CapacityLedgerCore;

impl CapacityLedgerCore {
    /// 对候选订单执行小时扫描容量核算
    ///
    /// # 参数
    /// - `candidate`: 候选订单 (水量已折算为加仑)
    /// - `windows`: 租户全部供水时段 (无需预过滤, 逐片只取重叠者)
    /// - `committed`: 租户订单列表 (内部只计 APPROVED/COMPLETED)
    ///
    /// # 规则
    /// - 候选速率 = total_gallons / max(1, 整小时时长)
    /// - 每个切片 [t, t+1h): 可供速率 = Σ重叠时段速率, 需求速率 = Σ重叠承诺订单速率
    /// - 需求 + 候选速率 > 可供 + ε 时立即拒绝, 不再检查后续切片
    ///
    /// # 返回
    /// - `Ok(LedgerDecision)`: 核算结论 (接受或业务性拒绝)
    /// - `Err(EngineError)`: 输入本身非法 (区间颠倒 / 水量非法)
    pub fn check(
        candidate: &CandidateOrder,
        windows: &[AvailabilityWindow],
        committed: &[WaterOrder],
    ) -> EngineResult<LedgerDecision> {
        // ===== 输入校验: 候选订单 =====
        if candidate.start_at >= candidate.end_at {
            return Err(EngineError::InvalidTimeRange {
                start: candidate.start_at.to_rfc3339(),
                end: candidate.end_at.to_rfc3339(),
            });
        }
        if !candidate.total_gallons.is_finite() || candidate.total_gallons < 0.0 {
            return Err(EngineError::InvalidGallons {
                value: candidate.total_gallons,
                context: "候选订单 total_gallons".to_string(),
            });
        }

        // ===== 输入校验: 供水时段 =====
        for window in windows {
            if !window.is_chronological() {
                return Err(EngineError::InvalidTimeRange {
                    start: window.start_at.to_rfc3339(),
                    end: window.end_at.to_rfc3339(),
                });
            }
            if !window.has_valid_gallons() {
                return Err(EngineError::InvalidGallons {
                    value: window.total_gallons,
                    context: format!("供水时段 {} total_gallons", window.window_id),
                });
            }
        }

        let requested_per_hour = RateDistributor::hourly_rate(
            candidate.total_gallons,
            candidate.start_at,
            candidate.end_at,
        );

        // 调用方可传未过滤列表, 此处统一收敛到承诺状态
        let committed: Vec<&WaterOrder> =
            committed.iter().filter(|o| o.is_committed()).collect();

        // ===== 小时扫描 =====
        let mut hours_checked: i64 = 0;
        for (slice_start, slice_end) in
            RateDistributor::hour_slices(candidate.start_at, candidate.end_at)
        {
            hours_checked += 1;

            let overlapping_windows: Vec<&AvailabilityWindow> = windows
                .iter()
                .filter(|w| {
                    RateDistributor::overlaps(slice_start, slice_end, w.start_at, w.end_at)
                })
                .collect();

            let capacity: f64 = overlapping_windows
                .iter()
                .map(|w| RateDistributor::hourly_rate(w.total_gallons, w.start_at, w.end_at))
                .sum();

            let demand: f64 = committed
                .iter()
                .filter(|o| {
                    RateDistributor::overlaps(slice_start, slice_end, o.start_at, o.end_at)
                })
                .map(|o| RateDistributor::hourly_rate(o.total_gallons, o.start_at, o.end_at))
                .sum();

            if demand + requested_per_hour > capacity + CAPACITY_EPSILON {
                let reason = if overlapping_windows.is_empty() {
                    format!(
                        "NO_AVAILABILITY: no window overlaps slice starting {}",
                        slice_start.to_rfc3339()
                    )
                } else {
                    format!(
                        "CAPACITY_LIMIT_EXCEEDED: would exceed hourly capacity ({} + {} > {})",
                        demand, requested_per_hour, capacity
                    )
                };
                return Ok(LedgerDecision::rejected(
                    requested_per_hour,
                    hours_checked,
                    slice_start,
                    capacity,
                    demand,
                    reason,
                ));
            }
        }

        Ok(LedgerDecision::accepted(requested_per_hour, hours_checked))
    }
}

// ==========================================
// 单元测试
// ==========================================
