// ==========================================
// 灌溉水务订单系统 - 演示数据生成工具
// ==========================================
// 用法: seed_demo_data [db_path]
// 重置演示库, 写入租户成员与供水时段,
// 并端到端跑一遍提交-审核流程
// ==========================================

use chrono::{DateTime, Duration, Local, Utc};
use std::error::Error;
use std::fs;
use std::path::Path;

use aquawise::api::{ReviewAction, SubmitOrderRequest};
use aquawise::app::{get_default_db_path, AppState};
use aquawise::domain::{TenantMember, WaterUnit};

const DEMO_TENANT: &str = "T-DEMO";

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    aquawise::logging::init();

    let db_path = std::env::args().nth(1).unwrap_or_else(get_default_db_path);

    backup_and_reset_db(&db_path)?;

    let state = AppState::new(db_path.clone())?;

    // 演示时间基准: 明天 00:00 UTC, 保证所有演示订单都落在未来
    let demo_day = (Utc::now() + Duration::days(1))
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .ok_or("无法构造演示时间基准")?
        .and_utc();

    seed_members(&state)?;
    seed_windows(&state, demo_day)?;
    run_demo_submissions(&state, demo_day).await?;

    print_quick_counts(&state)?;

    eprintln!("演示库已就绪: {}", db_path);
    Ok(())
}

/// 重置前备份既有数据库 (时间戳后缀)
fn backup_and_reset_db(db_path: &str) -> Result<(), Box<dyn Error>> {
    let path = Path::new(db_path);
    if !path.exists() {
        return Ok(());
    }

    let ts = Local::now().format("%Y%m%d_%H%M%S").to_string();
    let backup_path = format!("{}.bak.{}", db_path, ts);
    fs::copy(path, &backup_path)?;
    fs::remove_file(path)?;

    eprintln!("已备份 {} -> {}", db_path, backup_path);
    Ok(())
}

fn seed_members(state: &AppState) -> Result<(), Box<dyn Error>> {
    for (user_id, role) in [
        ("admin-1", "admin"),
        ("grower-a", "customer"),
        ("grower-b", "customer"),
    ] {
        state
            .member_repo
            .add_member(&TenantMember::new(DEMO_TENANT, user_id, role))?;
    }
    eprintln!("已写入租户 {} 的 3 名成员", DEMO_TENANT);
    Ok(())
}

fn seed_windows(state: &AppState, demo_day: DateTime<Utc>) -> Result<(), Box<dyn Error>> {
    // 主时段: 整天 240,000 加仑 (10,000 加仑/小时)
    state.availability_api.create_window(
        DEMO_TENANT,
        "admin-1",
        &demo_day.to_rfc3339(),
        &(demo_day + Duration::hours(24)).to_rfc3339(),
        240_000.0,
    )?;

    // 补充时段: 后天白班 60,000 加仑 (5,000 加仑/小时)
    let day_after = demo_day + Duration::days(1);
    state.availability_api.create_window(
        DEMO_TENANT,
        "admin-1",
        &(day_after + Duration::hours(6)).to_rfc3339(),
        &(day_after + Duration::hours(18)).to_rfc3339(),
        60_000.0,
    )?;

    eprintln!("已写入 2 个供水时段");
    Ok(())
}

async fn run_demo_submissions(
    state: &AppState,
    demo_day: DateTime<Utc>,
) -> Result<(), Box<dyn Error>> {
    // 订单1: grower-a, 4 小时 20 kgal (5,000 加仑/小时) -> 接受后批准
    let result = state
        .order_api
        .submit_order(SubmitOrderRequest {
            tenant_id: DEMO_TENANT.to_string(),
            user_id: "grower-a".to_string(),
            start_at: (demo_day + Duration::hours(8)).to_rfc3339(),
            end_at: (demo_day + Duration::hours(12)).to_rfc3339(),
            amount: 20.0,
            unit: WaterUnit::Kgal,
        })
        .await?;
    let order_1 = result.order.ok_or("演示订单1应当被接受")?;
    eprintln!(
        "订单1已提交: {} (accepted={})",
        order_1.order_id, result.accepted
    );

    state
        .order_api
        .review_order(
            &order_1.order_id,
            ReviewAction::Approve,
            "admin-1",
            Some("当季配额内, 照常供水".to_string()),
        )
        .await?;
    eprintln!("订单1已批准");

    // 订单2: grower-b, 2 小时 8 kgal (4,000 加仑/小时) -> 接受, 留在待审
    let result = state
        .order_api
        .submit_order(SubmitOrderRequest {
            tenant_id: DEMO_TENANT.to_string(),
            user_id: "grower-b".to_string(),
            start_at: (demo_day + Duration::hours(8)).to_rfc3339(),
            end_at: (demo_day + Duration::hours(10)).to_rfc3339(),
            amount: 8.0,
            unit: WaterUnit::Kgal,
        })
        .await?;
    eprintln!(
        "订单2已提交: accepted={} (待审订单不占用容量)",
        result.accepted
    );

    // 订单3: grower-a, 1 小时 10 kgal (10,000 加仑/小时)
    // 与已批准订单叠加后超出该小时 10,000 加仑上限 -> 业务性拒绝
    let result = state
        .order_api
        .submit_order(SubmitOrderRequest {
            tenant_id: DEMO_TENANT.to_string(),
            user_id: "grower-a".to_string(),
            start_at: (demo_day + Duration::hours(9)).to_rfc3339(),
            end_at: (demo_day + Duration::hours(10)).to_rfc3339(),
            amount: 10.0,
            unit: WaterUnit::Kgal,
        })
        .await?;
    eprintln!(
        "订单3已提交: accepted={}, 原因: {:?}",
        result.accepted, result.decision.reasons
    );

    Ok(())
}

fn print_quick_counts(state: &AppState) -> Result<(), Box<dyn Error>> {
    println!("================ 演示数据概览 ================");

    let windows = state.availability_api.list_windows(DEMO_TENANT)?;
    println!("供水时段: {}", windows.len());

    for (status, count) in state.order_repo.count_by_status(DEMO_TENANT)? {
        println!("订单[{}]: {}", status, count);
    }

    let notifications = state
        .notification_repo
        .list_by_user(DEMO_TENANT, "grower-a")?;
    println!("grower-a 的通知: {}", notifications.len());
    for n in &notifications {
        println!("  - {}", n.message);
    }

    let logs = state.action_log_repo.list_recent(DEMO_TENANT, 20)?;
    println!("操作日志: {}", logs.len());
    println!("==============================================");

    Ok(())
}
