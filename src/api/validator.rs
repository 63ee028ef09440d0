// ==========================================
// 灌溉水务订单系统 - 请求校验器
// ==========================================
// 职责: API 入参的形状校验 (时间解析/时间顺序/水量/必填ID)
// 红线: 校验失败立即终止,不做部分写入
// ==========================================

use chrono::{DateTime, Utc};

use crate::api::error::{ApiError, ApiResult};

/// 解析 RFC-3339 时间字符串为 UTC 时间
///
/// # 参数
/// - `field`: 字段名 (用于错误消息)
/// - `raw`: 原始字符串,如 `2026-06-01T08:00:00Z`
///
/// # 返回
/// - `Ok(DateTime<Utc>)`: 解析成功
/// - `Err(ApiError::ValidationError)`: 无法解析
pub fn parse_rfc3339_utc(field: &str, raw: &str) -> ApiResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| {
            ApiError::ValidationError(format!(
                "字段 {} 无法解析为 RFC-3339 时间: {} ({})",
                field, raw, e
            ))
        })
}

/// 校验时间区间按时间顺序 (start < end)
pub fn validate_chronological(start: DateTime<Utc>, end: DateTime<Utc>) -> ApiResult<()> {
    if start >= end {
        return Err(ApiError::InvalidTimeRange {
            start: start.to_rfc3339(),
            end: end.to_rfc3339(),
        });
    }
    Ok(())
}

/// 校验水量为有限非负数
///
/// # 参数
/// - `context`: 水量语义 (用于错误消息,如 "订单总量")
pub fn validate_amount(context: &str, value: f64) -> ApiResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(ApiError::ValidationError(format!(
            "水量无效 ({}): {}",
            context, value
        )));
    }
    Ok(())
}

/// 校验必填 ID 非空
pub fn validate_required_id(field: &str, value: &str) -> ApiResult<()> {
    if value.trim().is_empty() {
        return Err(ApiError::ValidationError(format!("字段 {} 不能为空", field)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rfc3339_utc() {
        let t = parse_rfc3339_utc("start_at", "2026-06-01T08:00:00Z").unwrap();
        assert_eq!(t.to_rfc3339(), "2026-06-01T08:00:00+00:00");

        // 带时区偏移也归一到 UTC
        let t = parse_rfc3339_utc("start_at", "2026-06-01T16:00:00+08:00").unwrap();
        assert_eq!(t.to_rfc3339(), "2026-06-01T08:00:00+00:00");

        let err = parse_rfc3339_utc("start_at", "2026-06-01 08:00").unwrap_err();
        match err {
            ApiError::ValidationError(msg) => assert!(msg.contains("start_at")),
            _ => panic!("Expected ValidationError"),
        }
    }

    #[test]
    fn test_validate_chronological() {
        let start = parse_rfc3339_utc("s", "2026-06-01T08:00:00Z").unwrap();
        let end = parse_rfc3339_utc("e", "2026-06-01T10:00:00Z").unwrap();

        assert!(validate_chronological(start, end).is_ok());
        assert!(matches!(
            validate_chronological(end, start),
            Err(ApiError::InvalidTimeRange { .. })
        ));
        // start == end 同样无效
        assert!(validate_chronological(start, start).is_err());
    }

    #[test]
    fn test_validate_amount() {
        assert!(validate_amount("订单总量", 0.0).is_ok());
        assert!(validate_amount("订单总量", 5000.0).is_ok());
        assert!(validate_amount("订单总量", -1.0).is_err());
        assert!(validate_amount("订单总量", f64::NAN).is_err());
        assert!(validate_amount("订单总量", f64::INFINITY).is_err());
    }

    #[test]
    fn test_validate_required_id() {
        assert!(validate_required_id("tenant_id", "T001").is_ok());
        assert!(validate_required_id("tenant_id", "").is_err());
        assert!(validate_required_id("tenant_id", "   ").is_err());
    }
}
