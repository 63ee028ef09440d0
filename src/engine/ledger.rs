// ==========================================
// 容量核算引擎 (CapacityLedgerEngine)
// ==========================================
// 职责: 策略护栏 + 委托纯核心核算
// 红线: 不直接写库; 核心算法保持无策略、无 IO
// ==========================================

use crate::config::OrderPolicyReader;
use crate::domain::{AvailabilityWindow, WaterOrder};
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::ledger_core::{CandidateOrder, CapacityLedgerCore, LedgerDecision};
use crate::engine::rate::RateDistributor;
use std::sync::Arc;
use tracing::instrument;

// ==========================================
// CapacityLedgerEngine - 容量核算引擎
// ==========================================
// 核心算法见 ledger_core.rs; 本层只追加 max_order_window_hours 护栏,
// 防止跨度离谱的候选区间触发超长小时扫描
pub struct CapacityLedgerEngine<C>
where
    C: OrderPolicyReader,
{
    config: Arc<C>,
}

impl<C> CapacityLedgerEngine<C>
where
    C: OrderPolicyReader,
{
    /// 创建新的 CapacityLedgerEngine 实例
    ///
    /// # 参数
    /// - config: 策略读取器
    pub fn new(config: Arc<C>) -> Self {
        Self { config }
    }

    /// 对候选订单执行护栏校验与容量核算
    ///
    /// # 返回
    /// - `Ok(LedgerDecision)`: 核算结论 (接受或业务性拒绝)
    /// - `Err(EngineError)`: 输入非法 / 区间超过护栏 / 策略读取失败
    #[instrument(
        skip(self, candidate, windows, committed),
        fields(
            tenant_id = %candidate.tenant_id,
            windows = windows.len(),
            committed = committed.len()
        )
    )]
    pub async fn check(
        &self,
        candidate: &CandidateOrder,
        windows: &[AvailabilityWindow],
        committed: &[WaterOrder],
    ) -> EngineResult<LedgerDecision> {
        if candidate.start_at >= candidate.end_at {
            return Err(EngineError::InvalidTimeRange {
                start: candidate.start_at.to_rfc3339(),
                end: candidate.end_at.to_rfc3339(),
            });
        }

        let max_hours = self
            .config
            .get_max_order_window_hours()
            .await
            .map_err(|e| EngineError::PolicyRead {
                reason: e.to_string(),
            })?;

        let hours = RateDistributor::duration_hours(candidate.start_at, candidate.end_at);
        if hours > max_hours {
            return Err(EngineError::WindowTooLong { hours, max_hours });
        }

        CapacityLedgerCore::check(candidate, windows, committed)
    }
}

// ==========================================
// 单元测试
// ==========================================
