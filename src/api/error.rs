// ==========================================
// 灌溉水务订单系统 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型,转换仓储/引擎错误为用户友好的错误消息
// 红线: 所有错误信息必须包含显式原因 (可解释性)
// 红线: 容量不足不是错误,是正常的 LedgerDecision { ok: false }
// ==========================================

use crate::engine::EngineError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 业务规则错误
    // ==========================================
    /// 时间区间无效 (start >= end 或无法解析)
    #[error("时间区间无效: start={start} 必须早于 end={end}")]
    InvalidTimeRange { start: String, end: String },

    /// 单位折算无效 (流量单位缺少可用时长 / 水量非法)
    #[error("单位折算无效: {reason}")]
    InvalidUnitConversion { reason: String },

    /// 无效的状态转换
    #[error("无效的状态转换: from={from} to={to}")]
    InvalidStatusTransition { from: String, to: String },

    /// 非租户成员
    #[error("非租户成员: tenant_id={tenant_id}, user_id={user_id}")]
    NotTenantMember { tenant_id: String, user_id: String },

    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("数据验证失败: {0}")]
    ValidationError(String),

    // ==========================================
    // 并发控制错误
    // ==========================================
    /// 带状态前置条件的更新未命中 (订单已被其他审核人修改)
    #[error("状态冲突: {0}")]
    StatusConflict(String),

    // ==========================================
    // 数据访问与通用错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ==========================================
// 从 RepositoryError 转换
// 目的: 将仓储层的技术错误转换为用户友好的业务错误
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            // 并发控制错误
            RepositoryError::StatusConflict { order_id, expected } => {
                ApiError::StatusConflict(format!(
                    "订单{}已被其他审核人修改 (期望状态={})",
                    order_id, expected
                ))
            }

            // 数据库错误
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::DatabaseConnectionError(msg) => {
                ApiError::DatabaseError(format!("数据库连接失败: {}", msg))
            }
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::ValidationError(format!("唯一约束违反: {}", msg))
            }
            RepositoryError::ForeignKeyViolation(msg) => {
                ApiError::ValidationError(format!("外键约束违反: {}", msg))
            }

            // 数据质量错误
            RepositoryError::ValidationError(msg) => ApiError::ValidationError(msg),

            // 通用错误
            RepositoryError::InternalError(msg) => ApiError::InternalError(msg),
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

// ==========================================
// 从 EngineError 转换
// ==========================================
impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::InvalidTimeRange { start, end } => {
                ApiError::InvalidTimeRange { start, end }
            }
            EngineError::InvalidGallons { value, context } => {
                ApiError::ValidationError(format!("水量无效 ({}): {}", context, value))
            }
            EngineError::InvalidUnitConversion { reason } => {
                ApiError::InvalidUnitConversion { reason }
            }
            EngineError::WindowTooLong { hours, max_hours } => ApiError::ValidationError(
                format!("候选区间过长: {} 小时超过上限 {} 小时", hours, max_hours),
            ),
            EngineError::PolicyRead { reason } => {
                ApiError::InternalError(format!("策略读取失败: {}", reason))
            }
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
