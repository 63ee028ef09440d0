// ==========================================
// 订单提交端到端测试
// ==========================================
// 目标: 验证 提交校验 → 成员资格 → 单位折算 → 容量核算 → 入库 → 审计 全链路
// ==========================================


#[cfg(test)]
mod order_submission_e2e_test {
    use crate::test_helpers::{iso, seed_default_members, setup_app_state, ts, TEST_TENANT};
    use aquawise::api::{ApiError, ReviewAction, SubmitOrderRequest};
    use aquawise::app::AppState;
    use aquawise::domain::{ActionType, OrderStatus, WaterUnit};
    use chrono::Duration;
    use tempfile::NamedTempFile;

    /// 创建测试环境: 租户成员 + 全天供水时段 (10,000 加仑/小时)
    fn setup_with_window(total_gallons: f64) -> (NamedTempFile, AppState) {
        let (temp_file, state) = setup_app_state();
        seed_default_members(&state);

        state
            .availability_api
            .create_window(TEST_TENANT, "admin-1", &iso(1, 0), &iso(2, 0), total_gallons)
            .expect("创建供水时段失败");

        (temp_file, state)
    }

    fn request(user: &str, start: String, end: String, amount: f64, unit: WaterUnit) -> SubmitOrderRequest {
        SubmitOrderRequest {
            tenant_id: TEST_TENANT.to_string(),
            user_id: user.to_string(),
            start_at: start,
            end_at: end,
            amount,
            unit,
        }
    }

    #[tokio::test]
    async fn test_submit_accepted_end_to_end() {
        let (_temp_file, state) = setup_with_window(240_000.0);

        // 1. 提交: 4 小时 20 kgal => 5,000 加仑/小时
        let result = state
            .order_api
            .submit_order(request(
                "grower-a",
                iso(1, 8),
                iso(1, 12),
                20.0,
                WaterUnit::Kgal,
            ))
            .await
            .expect("提交应当成功");

        assert!(result.accepted);
        assert!(result.decision.ok);
        assert_eq!(result.decision.hours_checked, 4);
        assert!((result.decision.requested_per_hour - 5_000.0).abs() < 1e-9);

        // 2. 订单已入库且为待审状态
        let order = result.order.expect("接受的提交必须返回订单");
        let loaded = state
            .order_repo
            .find_by_id(&order.order_id)
            .unwrap()
            .expect("订单应当已落库");
        assert_eq!(loaded.status, OrderStatus::Pending);
        assert_eq!(loaded.user_id, "grower-a");
        assert_eq!(loaded.requested_unit, WaterUnit::Kgal);
        assert!((loaded.requested_amount - 20.0).abs() < f64::EPSILON);
        assert!((loaded.total_gallons - 20_000.0).abs() < 1e-9);
        assert_eq!(loaded.start_at, ts(1, 8));
        assert_eq!(loaded.end_at, ts(1, 12));
        assert!(loaded.reviewed_by.is_none());

        // 3. 提交动作已审计
        let logs = state
            .action_log_repo
            .list_by_order(&order.order_id)
            .unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].action_type, ActionType::SubmitOrder);
        assert_eq!(logs[0].actor, "grower-a");
        assert!(logs[0].payload_json.is_some());
    }

    #[tokio::test]
    async fn test_rejected_submission_persists_nothing() {
        let (_temp_file, state) = setup_with_window(240_000.0);

        // 1. 先占用 9,000 加仑/小时并批准
        let filler = state
            .order_api
            .submit_order(request(
                "grower-a",
                iso(1, 0),
                iso(2, 0),
                216_000.0,
                WaterUnit::Gallons,
            ))
            .await
            .unwrap();
        assert!(filler.accepted);
        let filler_order = filler.order.unwrap();
        state
            .order_api
            .review_order(&filler_order.order_id, ReviewAction::Approve, "admin-1", None)
            .await
            .unwrap();

        // 2. 候选 2,000 加仑/小时: 9,000 + 2,000 > 10,000 => 业务性拒绝
        let result = state
            .order_api
            .submit_order(request(
                "grower-b",
                iso(1, 8),
                iso(1, 9),
                2_000.0,
                WaterUnit::Gallons,
            ))
            .await
            .expect("容量不足不是错误");

        assert!(!result.accepted);
        assert!(result.order.is_none());
        assert!(result.decision.reasons[0].starts_with("CAPACITY_LIMIT_EXCEEDED"));
        assert_eq!(result.decision.failed_slice_start, Some(ts(1, 8)));
        assert!((result.decision.capacity_at_failure.unwrap() - 10_000.0).abs() < 1e-6);
        assert!((result.decision.demand_at_failure.unwrap() - 9_000.0).abs() < 1e-6);

        // 3. 只有占位订单落库
        let orders = state.order_repo.list_by_tenant(TEST_TENANT).unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].order_id, filler_order.order_id);

        // 4. 被拒绝的提交同样留下审计记录 (不关联订单)
        let logs = state.action_log_repo.list_recent(TEST_TENANT, 20).unwrap();
        let rejected_submits = logs
            .iter()
            .filter(|l| l.action_type == ActionType::SubmitOrder && l.order_id.is_none())
            .count();
        assert_eq!(rejected_submits, 1);
    }

    #[tokio::test]
    async fn test_non_member_cannot_submit() {
        let (_temp_file, state) = setup_with_window(240_000.0);

        let err = state
            .order_api
            .submit_order(request(
                "outsider",
                iso(1, 8),
                iso(1, 9),
                100.0,
                WaterUnit::Gallons,
            ))
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::NotTenantMember { .. }));
        assert!(state.order_repo.list_by_tenant(TEST_TENANT).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_inverted_time_range_rejected_before_anything_else() {
        let (_temp_file, state) = setup_with_window(240_000.0);

        let err = state
            .order_api
            .submit_order(request(
                "grower-a",
                iso(1, 9),
                iso(1, 8),
                100.0,
                WaterUnit::Gallons,
            ))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidTimeRange { .. }));

        // 起止相等同样非法
        let err = state
            .order_api
            .submit_order(request(
                "grower-a",
                iso(1, 8),
                iso(1, 8),
                100.0,
                WaterUnit::Gallons,
            ))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidTimeRange { .. }));

        assert!(state.order_repo.list_by_tenant(TEST_TENANT).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rate_unit_converted_with_whole_hour_duration() {
        // 30,000 加仑/小时的大窗口, 容得下 1 cfs
        let (_temp_file, state) = setup_with_window(720_000.0);

        // 1. 整小时: 1 cfs x 1 小时 = 26,929.87 加仑
        let result = state
            .order_api
            .submit_order(request("grower-a", iso(1, 8), iso(1, 9), 1.0, WaterUnit::Cfs))
            .await
            .unwrap();
        assert!(result.accepted);
        let order = result.order.unwrap();
        assert!((order.total_gallons - 26_929.870_128).abs() < 1e-3);
        assert_eq!(order.requested_unit, WaterUnit::Cfs);
        assert!((order.requested_amount - 1.0).abs() < f64::EPSILON);

        // 2. 59 分钟区间按 1 整小时折算, 小时速率与总量一致
        let end_59min = (ts(1, 10) + Duration::minutes(59)).to_rfc3339();
        let result = state
            .order_api
            .submit_order(request(
                "grower-a",
                iso(1, 10),
                end_59min,
                1.0,
                WaterUnit::Cfs,
            ))
            .await
            .unwrap();
        assert!(result.accepted);
        let order = result.order.unwrap();
        assert!((order.total_gallons - 26_929.870_128).abs() < 1e-3);
        assert_eq!(
            result.decision.requested_per_hour, order.total_gallons,
            "59 分钟候选的小时速率应精确等于总量"
        );
    }

    #[tokio::test]
    async fn test_rate_unit_rejected_amounts() {
        let (_temp_file, state) = setup_with_window(240_000.0);

        // 负水量在折算前拒绝
        let err = state
            .order_api
            .submit_order(request(
                "grower-a",
                iso(1, 8),
                iso(1, 9),
                -3.0,
                WaterUnit::Gpm,
            ))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::ValidationError(_)));
        assert!(state.order_repo.list_by_tenant(TEST_TENANT).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_pending_orders_do_not_reserve_capacity() {
        let (_temp_file, state) = setup_with_window(240_000.0);

        // 两笔各 6,000 加仑/小时的待审订单: 合计超出 10,000 但互不占用
        for user in ["grower-a", "grower-b"] {
            let result = state
                .order_api
                .submit_order(request(
                    user,
                    iso(1, 8),
                    iso(1, 9),
                    6_000.0,
                    WaterUnit::Gallons,
                ))
                .await
                .unwrap();
            assert!(result.accepted, "{} 的待审订单不应互相挤占", user);
        }

        let pending = state
            .order_repo
            .list_by_status(TEST_TENANT, OrderStatus::Pending)
            .unwrap();
        assert_eq!(pending.len(), 2);
    }

    #[tokio::test]
    async fn test_check_availability_is_read_only() {
        let (_temp_file, state) = setup_with_window(240_000.0);

        let decision = state
            .order_api
            .check_availability(TEST_TENANT, &iso(1, 8), &iso(1, 9), 5_000.0)
            .await
            .unwrap();
        assert!(decision.ok);

        // 超量查询同样只返回结论
        let decision = state
            .order_api
            .check_availability(TEST_TENANT, &iso(1, 8), &iso(1, 9), 50_000.0)
            .await
            .unwrap();
        assert!(!decision.ok);

        assert!(state.order_repo.list_by_tenant(TEST_TENANT).unwrap().is_empty());
        // 只读查询不产生审计记录
        assert_eq!(
            state
                .action_log_repo
                .list_recent(TEST_TENANT, 20)
                .unwrap()
                .iter()
                .filter(|l| l.action_type != ActionType::CreateWindow)
                .count(),
            0
        );
    }
}
