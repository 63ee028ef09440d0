// ==========================================
// 灌溉水务订单系统 - 订单 API
// ==========================================
// 职责: 订单提交编排、可用量查询、审核状态机、容量展望
// 红线: 容量不足是正常业务结论, 不是错误
// 红线: 所有写操作必须记录操作日志 (可解释性)
// ==========================================

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

use crate::api::error::{ApiError, ApiResult};
use crate::api::validator::{
    parse_rfc3339_utc, validate_amount, validate_chronological, validate_required_id,
};
use crate::config::{ConfigManager, OrderPolicyReader};
use crate::domain::{ActionType, Notification, OrderActionLog, OrderStatus, WaterOrder, WaterUnit};
use crate::engine::{
    CandidateOrder, CapacityLedgerEngine, LedgerDecision, OptionalNotificationSink,
    RateDistributor, UnitConverter,
};
use crate::i18n;
use crate::repository::{
    AvailabilityWindowRepository, NotificationRepository, OrderActionLogRepository,
    TenantMemberRepository, WaterOrderRepository,
};

// ==========================================
// DTO 类型定义
// ==========================================

/// 订单提交请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitOrderRequest {
    pub tenant_id: String,
    pub user_id: String,
    pub start_at: String, // RFC-3339
    pub end_at: String,   // RFC-3339
    pub amount: f64,      // 用户录入数量
    pub unit: WaterUnit,  // 用户录入单位
}

/// 订单提交结果
///
/// accepted=false 时 order 为 None, decision 携带拒绝原因码
#[derive(Debug, Clone, Serialize)]
pub struct SubmitOrderResult {
    pub accepted: bool,
    pub order: Option<WaterOrder>,
    pub decision: LedgerDecision,
}

/// 审核动作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReviewAction {
    Approve,
    Reject,
    Complete,
}

impl ReviewAction {
    /// 动作对应的目标状态
    pub fn target_status(&self) -> OrderStatus {
        match self {
            ReviewAction::Approve => OrderStatus::Approved,
            ReviewAction::Reject => OrderStatus::Rejected,
            ReviewAction::Complete => OrderStatus::Completed,
        }
    }

    fn action_type(&self) -> ActionType {
        match self {
            ReviewAction::Approve => ActionType::ApproveOrder,
            ReviewAction::Reject => ActionType::RejectOrder,
            ReviewAction::Complete => ActionType::CompleteOrder,
        }
    }

    fn notify_key(&self) -> &'static str {
        match self {
            ReviewAction::Approve => "notify.order_approved",
            ReviewAction::Reject => "notify.order_rejected",
            ReviewAction::Complete => "notify.order_completed",
        }
    }
}

/// 容量展望切片 (展示用)
///
/// pending_demand 仅供前端展示, 不参与核算
#[derive(Debug, Clone, Serialize)]
pub struct OutlookSlice {
    pub slice_start: DateTime<Utc>,
    pub capacity: f64,
    pub committed_demand: f64,
    pub pending_demand: f64,
    pub headroom: f64,
}

// ==========================================
// OrderApi - 订单 API
// ==========================================

/// 订单API
///
/// 职责：
/// 1. 订单提交编排 (成员校验 → 单位折算 → 容量核算 → 入库)
/// 2. 只读可用量查询
/// 3. 审核状态机流转 (含通知与审计)
/// 4. 容量展望 (含待审需求的展示口径)
pub struct OrderApi {
    order_repo: Arc<WaterOrderRepository>,
    window_repo: Arc<AvailabilityWindowRepository>,
    member_repo: Arc<TenantMemberRepository>,
    notification_repo: Arc<NotificationRepository>,
    action_log_repo: Arc<OrderActionLogRepository>,
    ledger_engine: Arc<CapacityLedgerEngine<ConfigManager>>,
    config: Arc<ConfigManager>,
    notification_sink: OptionalNotificationSink,
    // 提交守卫: 读-核算-写跨度内串行化, 封住进程内的检查后写入竞态
    submission_guard: tokio::sync::Mutex<()>,
}

impl OrderApi {
    /// 创建新的OrderApi实例
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        order_repo: Arc<WaterOrderRepository>,
        window_repo: Arc<AvailabilityWindowRepository>,
        member_repo: Arc<TenantMemberRepository>,
        notification_repo: Arc<NotificationRepository>,
        action_log_repo: Arc<OrderActionLogRepository>,
        ledger_engine: Arc<CapacityLedgerEngine<ConfigManager>>,
        config: Arc<ConfigManager>,
        notification_sink: OptionalNotificationSink,
    ) -> Self {
        Self {
            order_repo,
            window_repo,
            member_repo,
            notification_repo,
            action_log_repo,
            ledger_engine,
            config,
            notification_sink,
            submission_guard: tokio::sync::Mutex::new(()),
        }
    }

    // ==========================================
    // 订单提交
    // ==========================================

    /// 提交用水订单
    ///
    /// # 流程
    /// 1. 入参校验 (时间顺序 / 水量 / 必填ID)
    /// 2. 租户成员校验, 非成员不落任何数据
    /// 3. 单位折算为加仑 (流量单位使用与核算一致的整小时时长)
    /// 4. 守卫内: 取时段与承诺订单 → 容量核算 → 通过则以 PENDING 入库
    /// 5. 记录操作日志 (失败只告警)
    ///
    /// # 返回
    /// - `Ok(SubmitOrderResult)`: accepted=false 表示容量不足, 无持久化
    /// - `Err(ApiError)`: 入参非法 / 非成员 / 基础设施故障
    #[instrument(skip(self, req), fields(tenant_id = %req.tenant_id, user_id = %req.user_id))]
    pub async fn submit_order(&self, req: SubmitOrderRequest) -> ApiResult<SubmitOrderResult> {
        // 1. 入参校验
        validate_required_id("tenant_id", &req.tenant_id)?;
        validate_required_id("user_id", &req.user_id)?;
        let start_at = parse_rfc3339_utc("start_at", &req.start_at)?;
        let end_at = parse_rfc3339_utc("end_at", &req.end_at)?;
        validate_chronological(start_at, end_at)?;
        validate_amount("订单录入数量", req.amount)?;

        // 2. 租户成员校验
        if !self.member_repo.is_member(&req.tenant_id, &req.user_id)? {
            return Err(ApiError::NotTenantMember {
                tenant_id: req.tenant_id.clone(),
                user_id: req.user_id.clone(),
            });
        }

        // 3. 单位折算 (提交时固化, 之后不再重算)
        let duration = RateDistributor::duration_hours(start_at, end_at) as f64;
        let total_gallons = UnitConverter::to_gallons(req.amount, req.unit, Some(duration))?;

        let candidate = CandidateOrder {
            tenant_id: req.tenant_id.clone(),
            start_at,
            end_at,
            total_gallons,
        };

        // 4. 守卫内核算与写入
        let (decision, order) = {
            let _guard = self.submission_guard.lock().await;

            let windows = self.window_repo.list_by_tenant(&req.tenant_id)?;
            let committed = self.order_repo.list_committed(&req.tenant_id)?;

            let decision = self
                .ledger_engine
                .check(&candidate, &windows, &committed)
                .await?;

            let order = if decision.ok {
                let new_order = WaterOrder::new_pending(
                    &req.tenant_id,
                    &req.user_id,
                    start_at,
                    end_at,
                    req.amount,
                    req.unit,
                    total_gallons,
                );
                self.order_repo.insert(&new_order)?;
                Some(new_order)
            } else {
                None
            };

            (decision, order)
        };

        // 5. 记录操作日志 (被拒绝的提交同样记录)
        let mut log = OrderActionLog::new(&req.tenant_id, ActionType::SubmitOrder, &req.user_id)
            .with_payload(&serde_json::json!({
                "request": &req,
                "decision": &decision,
            }));
        if let Some(ref o) = order {
            log = log.with_order_id(&o.order_id);
        }
        if let Err(e) = self.action_log_repo.insert(&log) {
            warn!(error = %e, "记录操作日志失败");
        }

        Ok(SubmitOrderResult {
            accepted: decision.ok,
            order,
            decision,
        })
    }

    // ==========================================
    // 只读可用量查询
    // ==========================================

    /// 查询指定区间与水量能否被接受 (只读, 不落库)
    ///
    /// # 参数
    /// - `total_gallons`: 已折算的加仑总量
    ///
    /// # 返回
    /// - `Ok(LedgerDecision)`: ok=true 表示按当前快照可接受
    #[instrument(skip(self), fields(tenant_id = %tenant_id))]
    pub async fn check_availability(
        &self,
        tenant_id: &str,
        start_iso: &str,
        end_iso: &str,
        total_gallons: f64,
    ) -> ApiResult<LedgerDecision> {
        validate_required_id("tenant_id", tenant_id)?;
        let start_at = parse_rfc3339_utc("start_at", start_iso)?;
        let end_at = parse_rfc3339_utc("end_at", end_iso)?;
        validate_chronological(start_at, end_at)?;
        validate_amount("查询水量", total_gallons)?;

        let windows = self.window_repo.list_by_tenant(tenant_id)?;
        let committed = self.order_repo.list_committed(tenant_id)?;

        let candidate = CandidateOrder {
            tenant_id: tenant_id.to_string(),
            start_at,
            end_at,
            total_gallons,
        };

        let decision = self
            .ledger_engine
            .check(&candidate, &windows, &committed)
            .await?;
        Ok(decision)
    }

    // ==========================================
    // 审核状态机
    // ==========================================

    /// 审核订单 (批准 / 驳回 / 完成)
    ///
    /// # 流程
    /// 1. 加载订单, 不存在报 NotFound
    /// 2. 状态机校验, 非法流转报 InvalidStatusTransition, 无部分写入
    /// 3. 带状态前置条件的守卫更新 (并发审核时报 StatusConflict)
    /// 4. 按配置生成站内通知并推外部渠道 (fire-and-forget)
    /// 5. 记录操作日志 (失败只告警)
    ///
    /// # 返回
    /// - `Ok(WaterOrder)`: 更新后的订单
    #[instrument(skip(self, notes), fields(order_id = %order_id, reviewer = %reviewer))]
    pub async fn review_order(
        &self,
        order_id: &str,
        action: ReviewAction,
        reviewer: &str,
        notes: Option<String>,
    ) -> ApiResult<WaterOrder> {
        validate_required_id("order_id", order_id)?;
        validate_required_id("reviewer", reviewer)?;

        // 1. 加载订单
        let order = self
            .order_repo
            .find_by_id(order_id)?
            .ok_or_else(|| ApiError::NotFound(format!("water_order(id={})不存在", order_id)))?;

        // 2. 状态机校验
        let target = action.target_status();
        if !order.status.can_transition_to(target) {
            return Err(ApiError::InvalidStatusTransition {
                from: order.status.to_db_str().to_string(),
                to: target.to_db_str().to_string(),
            });
        }

        // 3. 守卫更新 (status 前置条件未命中时由仓储报 StatusConflict)
        self.order_repo
            .update_status(order_id, order.status, target, reviewer, notes.as_deref())?;

        let updated = self
            .order_repo
            .find_by_id(order_id)?
            .ok_or_else(|| ApiError::NotFound(format!("water_order(id={})不存在", order_id)))?;

        // 4. 通知订单归属用户
        let notify_enabled = match self.config.get_notify_on_status_change().await {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, "读取通知开关失败, 按默认开启处理");
                true
            }
        };
        if notify_enabled {
            let message = i18n::t_with_args(action.notify_key(), &[("order_id", order_id)]);
            let mut notification =
                Notification::new(&updated.tenant_id, &updated.user_id, message)
                    .with_link(format!("/orders/{}", order_id));
            if let Some(ref n) = notes {
                notification = notification.with_details(n.clone());
            }

            if let Err(e) = self.notification_repo.insert(&notification) {
                warn!(error = %e, "通知落库失败");
            }
            if let Err(e) = self.notification_sink.dispatch(&notification) {
                warn!(error = %e, "通知外部投递失败");
            }
        }

        // 5. 记录操作日志
        let log = OrderActionLog::new(&updated.tenant_id, action.action_type(), reviewer)
            .with_order_id(order_id)
            .with_payload(&serde_json::json!({
                "from": order.status.to_db_str(),
                "to": target.to_db_str(),
                "notes": notes,
            }));
        if let Err(e) = self.action_log_repo.insert(&log) {
            warn!(error = %e, "记录操作日志失败");
        }

        Ok(updated)
    }

    // ==========================================
    // 容量展望
    // ==========================================

    /// 按小时切片展望区间内的容量与需求
    ///
    /// # 口径
    /// - capacity: 重叠供水时段的小时速率之和
    /// - committed_demand: 重叠承诺订单 (APPROVED/COMPLETED) 的速率之和
    /// - pending_demand: 重叠待审订单的速率之和 (仅展示, 不参与核算)
    /// - headroom: capacity - committed_demand
    #[instrument(skip(self), fields(tenant_id = %tenant_id))]
    pub async fn capacity_outlook(
        &self,
        tenant_id: &str,
        start_iso: &str,
        end_iso: &str,
    ) -> ApiResult<Vec<OutlookSlice>> {
        validate_required_id("tenant_id", tenant_id)?;
        let start_at = parse_rfc3339_utc("start_at", start_iso)?;
        let end_at = parse_rfc3339_utc("end_at", end_iso)?;
        validate_chronological(start_at, end_at)?;

        let windows = self.window_repo.list_by_tenant(tenant_id)?;
        let committed = self.order_repo.list_committed(tenant_id)?;
        let pending = self
            .order_repo
            .list_by_status(tenant_id, OrderStatus::Pending)?;

        let slices = RateDistributor::hour_slices(start_at, end_at)
            .into_iter()
            .map(|(slice_start, slice_end)| {
                let capacity: f64 = windows
                    .iter()
                    .filter(|w| {
                        RateDistributor::overlaps(slice_start, slice_end, w.start_at, w.end_at)
                    })
                    .map(|w| RateDistributor::hourly_rate(w.total_gallons, w.start_at, w.end_at))
                    .sum();
                let committed_demand: f64 = committed
                    .iter()
                    .filter(|o| {
                        RateDistributor::overlaps(slice_start, slice_end, o.start_at, o.end_at)
                    })
                    .map(|o| RateDistributor::hourly_rate(o.total_gallons, o.start_at, o.end_at))
                    .sum();
                let pending_demand: f64 = pending
                    .iter()
                    .filter(|o| {
                        RateDistributor::overlaps(slice_start, slice_end, o.start_at, o.end_at)
                    })
                    .map(|o| RateDistributor::hourly_rate(o.total_gallons, o.start_at, o.end_at))
                    .sum();

                OutlookSlice {
                    slice_start,
                    capacity,
                    committed_demand,
                    pending_demand,
                    headroom: capacity - committed_demand,
                }
            })
            .collect();

        Ok(slices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_review_action_mapping() {
        assert_eq!(ReviewAction::Approve.target_status(), OrderStatus::Approved);
        assert_eq!(ReviewAction::Reject.target_status(), OrderStatus::Rejected);
        assert_eq!(
            ReviewAction::Complete.target_status(),
            OrderStatus::Completed
        );

        assert_eq!(ReviewAction::Approve.action_type(), ActionType::ApproveOrder);
        assert_eq!(ReviewAction::Reject.action_type(), ActionType::RejectOrder);
        assert_eq!(
            ReviewAction::Complete.action_type(),
            ActionType::CompleteOrder
        );

        assert_eq!(ReviewAction::Approve.notify_key(), "notify.order_approved");
        assert_eq!(ReviewAction::Reject.notify_key(), "notify.order_rejected");
        assert_eq!(
            ReviewAction::Complete.notify_key(),
            "notify.order_completed"
        );
    }
    // 完整编排流程的集成测试在 tests/ 目录
}
