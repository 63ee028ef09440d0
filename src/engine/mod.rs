// ==========================================
// 灌溉水务订单系统 - 引擎层
// ==========================================
// 职责: 单位折算、速率均摊、容量核算的纯业务规则
// 红线: Engine 不拼 SQL, 拒绝结论必须输出 reason
// ==========================================

pub mod error;
pub mod events;
pub mod ledger;
pub mod ledger_core;
pub mod rate;
pub mod units;

// 重导出核心引擎
pub use error::{EngineError, EngineResult};
pub use events::{NoOpNotificationSink, NotificationSink, OptionalNotificationSink};
pub use ledger::CapacityLedgerEngine;
pub use ledger_core::{CandidateOrder, CapacityLedgerCore, LedgerDecision, CAPACITY_EPSILON};
pub use rate::RateDistributor;
pub use units::UnitConverter;
