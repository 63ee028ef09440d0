// ==========================================
// 单位折算器 (UnitConverter)
// ==========================================
// 职责: 将用户录入的水量单位统一折算为加仑
// 红线: 流量单位缺少可用时长必须显式报错, 禁止静默返回 0
// ==========================================

use crate::domain::types::WaterUnit;
use crate::engine::error::{EngineError, EngineResult};

// ==========================================
// 折算常量
// ==========================================

/// 千加仑 -> 加仑
pub const GALLONS_PER_KGAL: f64 = 1_000.0;
/// 英亩英尺 -> 加仑
pub const GALLONS_PER_ACRE_FOOT: f64 = 325_851.0;
/// 立方英尺 -> 加仑
pub const GALLONS_PER_CUBIC_FOOT: f64 = 7.480_519_48;
/// 每小时秒数
pub const SECONDS_PER_HOUR: f64 = 3_600.0;
/// 每小时分钟数
pub const MINUTES_PER_HOUR: f64 = 60.0;
/// 每天小时数
pub const HOURS_PER_DAY: f64 = 24.0;

/// 单位折算器
///
/// 纯计算组件，无状态、无 IO。体积单位直接乘系数，
/// 流量单位 (cfs / gpm / acre-feet-day) 必须结合用水时长折算。
pub struct UnitConverter;

impl UnitConverter {
    /// 将任意录入单位折算为加仑
    ///
    /// # 参数
    /// - `amount`: 用户录入数量 (必须非负且有限)
    /// - `unit`: 录入单位
    /// - `duration_hours`: 用水时长 (小时); 体积单位忽略该参数
    ///
    /// # 返回
    /// - `Ok(gallons)`: 折算后的加仑数 (非负、有限)
    /// - `Err(InvalidGallons)`: amount 为负数或非有限值
    /// - `Err(InvalidUnitConversion)`: 流量单位缺少可用时长, 或折算结果溢出
    ///
    /// # 规则
    /// - gallons x1; kgal x1000; acre-feet x325,851; cubic-feet x7.48051948
    /// - cfs: amount x 7.48051948 x 3600 x 时长
    /// - gpm: amount x 60 x 时长
    /// - acre-feet-day: amount x 325,851 x (时长 / 24)
    pub fn to_gallons(
        amount: f64,
        unit: WaterUnit,
        duration_hours: Option<f64>,
    ) -> EngineResult<f64> {
        if !amount.is_finite() || amount < 0.0 {
            return Err(EngineError::InvalidGallons {
                value: amount,
                context: "requested_amount".to_string(),
            });
        }

        let gallons = match unit {
            WaterUnit::Gallons => amount,
            WaterUnit::Kgal => amount * GALLONS_PER_KGAL,
            WaterUnit::AcreFeet => amount * GALLONS_PER_ACRE_FOOT,
            WaterUnit::CubicFeet => amount * GALLONS_PER_CUBIC_FOOT,
            WaterUnit::Cfs => {
                let hours = Self::usable_duration(unit, duration_hours)?;
                amount * GALLONS_PER_CUBIC_FOOT * SECONDS_PER_HOUR * hours
            }
            WaterUnit::Gpm => {
                let hours = Self::usable_duration(unit, duration_hours)?;
                amount * MINUTES_PER_HOUR * hours
            }
            WaterUnit::AcreFeetPerDay => {
                let hours = Self::usable_duration(unit, duration_hours)?;
                amount * GALLONS_PER_ACRE_FOOT * (hours / HOURS_PER_DAY)
            }
        };

        if !gallons.is_finite() {
            return Err(EngineError::InvalidUnitConversion {
                reason: format!("折算结果溢出: {} {} -> {}", amount, unit, gallons),
            });
        }

        Ok(gallons)
    }

    /// 校验流量单位的折算时长
    ///
    /// 缺失、零、负数、非有限时长一律拒绝
    fn usable_duration(unit: WaterUnit, duration_hours: Option<f64>) -> EngineResult<f64> {
        match duration_hours {
            Some(h) if h.is_finite() && h > 0.0 => Ok(h),
            Some(h) => Err(EngineError::InvalidUnitConversion {
                reason: format!("流量单位 {} 的折算时长无效: {}", unit, h),
            }),
            None => Err(EngineError::InvalidUnitConversion {
                reason: format!("流量单位 {} 需要提供用水时长才能折算为加仑", unit),
            }),
        }
    }
}
