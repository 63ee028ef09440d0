// ==========================================
// 引擎层错误类型定义
// ==========================================
// 职责: 定义单位折算与容量核算的输入校验错误
// 红线: 容量不足不是错误, 由 LedgerDecision { ok: false } 表达
// ==========================================

use thiserror::Error;

/// 引擎层错误
///
/// 描述输入本身的问题（非法区间、非法水量、无法折算、区间超限）
/// 以及策略读取失败；不包含存储语义。
#[derive(Debug, Error)]
pub enum EngineError {
    /// 时间区间无效 (start >= end)
    #[error("时间区间无效: start={start} 必须早于 end={end}")]
    InvalidTimeRange { start: String, end: String },

    /// 水量无效 (负数 / NaN / Infinity)
    #[error("水量无效 ({context}): {value}")]
    InvalidGallons { value: f64, context: String },

    /// 单位折算无效 (流量单位缺少可用时长等)
    #[error("单位折算无效: {reason}")]
    InvalidUnitConversion { reason: String },

    /// 候选区间超过策略护栏时长
    #[error("候选区间过长: {hours} 小时超过上限 {max_hours} 小时")]
    WindowTooLong { hours: i64, max_hours: i64 },

    /// 策略读取失败 (config_kv 不可用等)
    #[error("策略读取失败: {reason}")]
    PolicyRead { reason: String },
}

/// 引擎层 Result 类型别名
pub type EngineResult<T> = Result<T, EngineError>;
