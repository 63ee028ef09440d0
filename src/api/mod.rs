// ==========================================
// 灌溉水务订单系统 - API 层
// ==========================================
// 职责: 提供业务 API 接口, 编排引擎与仓储
// ==========================================

pub mod availability_api;
pub mod error;
pub mod order_api;
pub mod validator;

// 重导出核心类型
pub use availability_api::AvailabilityApi;
pub use error::{ApiError, ApiResult};
pub use order_api::{OrderApi, OutlookSlice, ReviewAction, SubmitOrderRequest, SubmitOrderResult};
