// ==========================================
// 灌溉水务订单系统 - 主入口
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 用水订单容量核算核心
// ==========================================

use aquawise::app::{get_default_db_path, AppState};

fn main() {
    // 初始化日志系统
    aquawise::logging::init();

    tracing::info!("==================================================");
    tracing::info!("{}", aquawise::APP_NAME);
    tracing::info!("系统版本: {}", aquawise::VERSION);
    tracing::info!("==================================================");

    // 获取数据库路径
    let db_path = get_default_db_path();
    tracing::info!("使用数据库: {}", db_path);

    // 创建AppState（建库建表 + 装配仓储/引擎/API）
    tracing::info!("正在初始化AppState...");
    let app_state = match AppState::new(db_path) {
        Ok(state) => state,
        Err(e) => {
            tracing::error!("无法初始化AppState: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("AppState初始化成功: {}", app_state.get_db_path());
    tracing::info!("本系统以库模式对外提供服务:");
    tracing::info!("  use aquawise::app::AppState;");
    tracing::info!("  state.order_api.submit_order(...) / check_availability(...)");
    tracing::info!("演示数据可通过 seed_demo_data 可执行文件生成");
}
