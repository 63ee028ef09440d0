// ==========================================
// 区间速率分配器 (RateDistributor)
// ==========================================
// 职责: 把时段总水量均摊为小时速率, 并提供小时切片与区间重叠判定
// 口径: 时长按整小时向上取整, 最小 1 小时; 区间一律为半开区间 [start, end)
// ==========================================

use chrono::{DateTime, Duration, Utc};

/// 区间速率分配器
///
/// 纯计算组件。容量核算引擎以"加仑/小时"为统一口径，
/// 此处负责时长、速率、切片三类基础运算。
pub struct RateDistributor;

impl RateDistributor {
    /// 计算区间时长 (整小时)
    ///
    /// # 规则
    /// - 不足一小时的部分向上取整
    /// - 最小返回 1 (退化的亚小时区间按 1 小时计)
    /// - 调用方需先保证 start < end
    pub fn duration_hours(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
        let secs = (end - start).num_seconds();
        if secs <= 0 {
            return 1;
        }
        ((secs + 3_599) / 3_600).max(1)
    }

    /// 计算区间的小时均摊速率 (加仑/小时)
    pub fn hourly_rate(total_gallons: f64, start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
        total_gallons / Self::duration_hours(start, end) as f64
    }

    /// 半开区间重叠判定
    ///
    /// [a_start, a_end) 与 [b_start, b_end) 是否有交集;
    /// 首尾相接的区间不算重叠
    pub fn overlaps(
        a_start: DateTime<Utc>,
        a_end: DateTime<Utc>,
        b_start: DateTime<Utc>,
        b_end: DateTime<Utc>,
    ) -> bool {
        a_start < b_end && b_start < a_end
    }

    /// 生成覆盖 [start, end) 的小时切片序列
    ///
    /// 每个切片为 [t, t+1h)，从 start 起逐小时推进；
    /// 末尾切片允许越过 end (尾部不足一小时按整小时切片处理)
    pub fn hour_slices(
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Vec<(DateTime<Utc>, DateTime<Utc>)> {
        let mut slices = Vec::new();
        let mut t = start;
        while t < end {
            let next = t + Duration::hours(1);
            slices.push((t, next));
            t = next;
        }
        slices
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 1, h, m, 0).unwrap()
    }

    // ==========================================
    // 时长计算测试
    // ==========================================

    #[test]
    fn test_duration_exact_hours() {
        assert_eq!(RateDistributor::duration_hours(ts(8, 0), ts(9, 0)), 1);
        assert_eq!(RateDistributor::duration_hours(ts(0, 0), ts(12, 0)), 12);
    }

    #[test]
    fn test_duration_rounds_up() {
        // 90 分钟按 2 小时计
        assert_eq!(RateDistributor::duration_hours(ts(8, 0), ts(9, 30)), 2);
        // 61 分钟按 2 小时计
        assert_eq!(RateDistributor::duration_hours(ts(8, 0), ts(9, 1)), 2);
    }

    #[test]
    fn test_duration_floors_at_one() {
        // 30 分钟按 1 小时计
        assert_eq!(RateDistributor::duration_hours(ts(8, 0), ts(8, 30)), 1);
        // 零长度区间也按 1 小时计 (退化输入)
        assert_eq!(RateDistributor::duration_hours(ts(8, 0), ts(8, 0)), 1);
    }

    // ==========================================
    // 小时速率测试
    // ==========================================

    #[test]
    fn test_hourly_rate_even_split() {
        let rate = RateDistributor::hourly_rate(240_000.0, ts(0, 0), ts(0, 0) + Duration::hours(24));
        assert!((rate - 10_000.0).abs() < 1e-9);
    }

    #[test]
    fn test_hourly_rate_sub_hour_is_full_total() {
        // 59 分钟区间: 总量即为小时速率
        let rate = RateDistributor::hourly_rate(5_000.0, ts(8, 0), ts(8, 59));
        assert_eq!(rate, 5_000.0);
    }

    // ==========================================
    // 区间重叠测试
    // ==========================================

    #[test]
    fn test_overlaps_basic() {
        assert!(RateDistributor::overlaps(ts(8, 0), ts(10, 0), ts(9, 0), ts(11, 0)));
        assert!(RateDistributor::overlaps(ts(9, 0), ts(11, 0), ts(8, 0), ts(10, 0)));
        // 完全包含
        assert!(RateDistributor::overlaps(ts(8, 0), ts(12, 0), ts(9, 0), ts(10, 0)));
    }

    #[test]
    fn test_touching_intervals_do_not_overlap() {
        // 半开区间: [8,9) 与 [9,10) 首尾相接不算重叠
        assert!(!RateDistributor::overlaps(ts(8, 0), ts(9, 0), ts(9, 0), ts(10, 0)));
        assert!(!RateDistributor::overlaps(ts(9, 0), ts(10, 0), ts(8, 0), ts(9, 0)));
    }

    #[test]
    fn test_disjoint_intervals_do_not_overlap() {
        assert!(!RateDistributor::overlaps(ts(8, 0), ts(9, 0), ts(10, 0), ts(11, 0)));
    }

    // ==========================================
    // 小时切片测试
    // ==========================================

    #[test]
    fn test_hour_slices_count_matches_duration() {
        let cases = [
            (ts(8, 0), ts(9, 0)),
            (ts(8, 0), ts(9, 30)),
            (ts(0, 0), ts(0, 0) + Duration::hours(24)),
            (ts(8, 0), ts(8, 59)),
        ];
        for (start, end) in cases {
            let slices = RateDistributor::hour_slices(start, end);
            assert_eq!(
                slices.len() as i64,
                RateDistributor::duration_hours(start, end),
                "切片数应等于整小时时长: {} -> {}",
                start,
                end
            );
        }
    }

    #[test]
    fn test_hour_slices_are_consecutive() {
        let slices = RateDistributor::hour_slices(ts(8, 0), ts(11, 0));
        assert_eq!(slices.len(), 3);
        assert_eq!(slices[0].0, ts(8, 0));
        for pair in slices.windows(2) {
            assert_eq!(pair[0].1, pair[1].0);
        }
    }

    #[test]
    fn test_last_slice_may_extend_past_end() {
        // [8:00, 9:30) 的第二个切片为 [9:00, 10:00), 越过 end
        let slices = RateDistributor::hour_slices(ts(8, 0), ts(9, 30));
        assert_eq!(slices.len(), 2);
        assert_eq!(slices[1].0, ts(9, 0));
        assert_eq!(slices[1].1, ts(10, 0));
    }

    #[test]
    fn test_empty_range_yields_no_slices() {
        assert!(RateDistributor::hour_slices(ts(8, 0), ts(8, 0)).is_empty());
    }
}
