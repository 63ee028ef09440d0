// ==========================================
// 灌溉水务订单系统 - 供水时段 API
// ==========================================
// 职责: 供水时段的创建、修改、删除、查询 (管理员维护的参考数据)
// 红线: 所有写操作必须记录操作日志 (可解释性)
// 说明: 时段删除为物理删除; 历史订单不因时段变更被重新校验
// ==========================================

use std::sync::Arc;

use chrono::Utc;
use tracing::{instrument, warn};

use crate::api::error::{ApiError, ApiResult};
use crate::api::validator::{
    parse_rfc3339_utc, validate_amount, validate_chronological, validate_required_id,
};
use crate::domain::{ActionType, AvailabilityWindow, OrderActionLog};
use crate::repository::{
    AvailabilityWindowRepository, OrderActionLogRepository, TenantMemberRepository,
};

// ==========================================
// AvailabilityApi - 供水时段 API
// ==========================================

/// 供水时段API
///
/// 职责：
/// 1. 时段维护 (创建 / 修改 / 删除)
/// 2. 成员校验 (仅租户成员可维护)
/// 3. 操作日志记录
pub struct AvailabilityApi {
    window_repo: Arc<AvailabilityWindowRepository>,
    member_repo: Arc<TenantMemberRepository>,
    action_log_repo: Arc<OrderActionLogRepository>,
}

impl AvailabilityApi {
    /// 创建新的AvailabilityApi实例
    pub fn new(
        window_repo: Arc<AvailabilityWindowRepository>,
        member_repo: Arc<TenantMemberRepository>,
        action_log_repo: Arc<OrderActionLogRepository>,
    ) -> Self {
        Self {
            window_repo,
            member_repo,
            action_log_repo,
        }
    }

    /// 校验操作人是租户成员
    fn verify_membership(&self, tenant_id: &str, user_id: &str) -> ApiResult<()> {
        if !self.member_repo.is_member(tenant_id, user_id)? {
            return Err(ApiError::NotTenantMember {
                tenant_id: tenant_id.to_string(),
                user_id: user_id.to_string(),
            });
        }
        Ok(())
    }

    /// 记录操作日志, 失败只告警
    fn audit(&self, log: OrderActionLog) {
        if let Err(e) = self.action_log_repo.insert(&log) {
            warn!(error = %e, "记录操作日志失败");
        }
    }

    // ==========================================
    // 时段维护
    // ==========================================

    /// 创建供水时段
    ///
    /// # 参数
    /// - `actor`: 操作人 (必须是租户成员)
    /// - `start_iso` / `end_iso`: RFC-3339 时间字符串
    /// - `total_gallons`: 整个时段可供水量 (加仑)
    ///
    /// # 返回
    /// - `Ok(AvailabilityWindow)`: 已入库的时段 (服务端分配ID)
    #[instrument(skip(self), fields(tenant_id = %tenant_id, actor = %actor))]
    pub fn create_window(
        &self,
        tenant_id: &str,
        actor: &str,
        start_iso: &str,
        end_iso: &str,
        total_gallons: f64,
    ) -> ApiResult<AvailabilityWindow> {
        validate_required_id("tenant_id", tenant_id)?;
        validate_required_id("actor", actor)?;
        let start_at = parse_rfc3339_utc("start_at", start_iso)?;
        let end_at = parse_rfc3339_utc("end_at", end_iso)?;
        validate_chronological(start_at, end_at)?;
        validate_amount("时段供水量", total_gallons)?;

        self.verify_membership(tenant_id, actor)?;

        let window = AvailabilityWindow::new(tenant_id, start_at, end_at, total_gallons);
        self.window_repo.insert(&window)?;

        self.audit(
            OrderActionLog::new(tenant_id, ActionType::CreateWindow, actor).with_payload(&window),
        );

        Ok(window)
    }

    /// 修改供水时段 (整体替换区间与水量)
    ///
    /// # 返回
    /// - `Ok(AvailabilityWindow)`: 更新后的时段
    /// - `Err(NotFound)`: 时段不存在
    #[instrument(skip(self), fields(window_id = %window_id, actor = %actor))]
    pub fn update_window(
        &self,
        window_id: &str,
        actor: &str,
        start_iso: &str,
        end_iso: &str,
        total_gallons: f64,
    ) -> ApiResult<AvailabilityWindow> {
        validate_required_id("window_id", window_id)?;
        validate_required_id("actor", actor)?;
        let start_at = parse_rfc3339_utc("start_at", start_iso)?;
        let end_at = parse_rfc3339_utc("end_at", end_iso)?;
        validate_chronological(start_at, end_at)?;
        validate_amount("时段供水量", total_gallons)?;

        let mut window = self.window_repo.find_by_id(window_id)?.ok_or_else(|| {
            ApiError::NotFound(format!("availability_window(id={})不存在", window_id))
        })?;

        self.verify_membership(&window.tenant_id, actor)?;

        window.start_at = start_at;
        window.end_at = end_at;
        window.total_gallons = total_gallons;
        window.updated_at = Utc::now();
        self.window_repo.update(&window)?;

        self.audit(
            OrderActionLog::new(&window.tenant_id, ActionType::UpdateWindow, actor)
                .with_payload(&window),
        );

        Ok(window)
    }

    /// 删除供水时段 (物理删除)
    #[instrument(skip(self), fields(window_id = %window_id, actor = %actor))]
    pub fn delete_window(&self, window_id: &str, actor: &str) -> ApiResult<()> {
        validate_required_id("window_id", window_id)?;
        validate_required_id("actor", actor)?;

        let window = self.window_repo.find_by_id(window_id)?.ok_or_else(|| {
            ApiError::NotFound(format!("availability_window(id={})不存在", window_id))
        })?;

        self.verify_membership(&window.tenant_id, actor)?;

        self.window_repo.delete(window_id)?;

        self.audit(
            OrderActionLog::new(&window.tenant_id, ActionType::DeleteWindow, actor)
                .with_payload(&window)
                .with_detail("物理删除供水时段"),
        );

        Ok(())
    }

    /// 列出租户的全部供水时段 (按开始时间排序)
    pub fn list_windows(&self, tenant_id: &str) -> ApiResult<Vec<AvailabilityWindow>> {
        validate_required_id("tenant_id", tenant_id)?;
        Ok(self.window_repo.list_by_tenant(tenant_id)?)
    }
}

#[cfg(test)]
mod tests {
    // 完整的时段维护流程测试在 tests/ 目录
}
