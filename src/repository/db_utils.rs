// ==========================================
// 灌溉水务订单系统 - 仓储层公共工具
// ==========================================
// 职责: 提供行映射的公共函数
// 目标: 消除各仓储重复的 RFC3339 时间戳解析代码
// ==========================================

use chrono::{DateTime, Utc};
use rusqlite::Result as SqliteResult;

/// 解析 RFC3339 时间戳列
///
/// # 参数
/// - `idx`: 列下标（用于错误定位）
/// - `raw`: 列原始文本
///
/// # 返回
/// - 成功: UTC 时间
/// - 失败: rusqlite::Error::FromSqlConversionFailure
///
/// # 示例
/// ```
/// use aquawise::repository::db_utils::parse_utc_column;
///
/// let ts = parse_utc_column(0, "2026-06-01T08:00:00+00:00".to_string()).unwrap();
/// assert_eq!(ts.to_rfc3339(), "2026-06-01T08:00:00+00:00");
///
/// assert!(parse_utc_column(0, "not-a-timestamp".to_string()).is_err());
/// ```
pub fn parse_utc_column(idx: usize, raw: String) -> SqliteResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
}

/// 解析可空的 RFC3339 时间戳列
pub fn parse_optional_utc_column(
    idx: usize,
    raw: Option<String>,
) -> SqliteResult<Option<DateTime<Utc>>> {
    match raw {
        Some(s) => parse_utc_column(idx, s).map(Some),
        None => Ok(None),
    }
}

/// 把未知枚举值映射为列转换错误
///
/// 用于 OrderStatus / WaterUnit / ActionType 等 from_str 返回 None 的场景
pub fn column_parse_error(idx: usize, message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        idx,
        rusqlite::types::Type::Text,
        message.into(),
    )
}

// ==========================================
// 单元测试
// ==========================================
