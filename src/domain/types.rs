// ==========================================
// 灌溉水务订单系统 - 领域类型定义
// ==========================================
// 订单状态机与计量单位是全系统共享的基础类型
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 订单状态 (Order Status)
// ==========================================
// 状态机: PENDING -> {APPROVED, REJECTED}
//         APPROVED -> {COMPLETED, REJECTED}
//         REJECTED / COMPLETED 为终态
// 序列化格式: SCREAMING_SNAKE_CASE (与数据库一致)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,   // 已提交待审核
    Approved,  // 已批准(计入承诺需求)
    Rejected,  // 已驳回
    Completed, // 已完成供水(计入承诺需求)
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderStatus::Pending => write!(f, "PENDING"),
            OrderStatus::Approved => write!(f, "APPROVED"),
            OrderStatus::Rejected => write!(f, "REJECTED"),
            OrderStatus::Completed => write!(f, "COMPLETED"),
        }
    }
}

impl OrderStatus {
    /// 从字符串解析状态
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "PENDING" => Some(OrderStatus::Pending),
            "APPROVED" => Some(OrderStatus::Approved),
            "REJECTED" => Some(OrderStatus::Rejected),
            "COMPLETED" => Some(OrderStatus::Completed),
            _ => None,
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Approved => "APPROVED",
            OrderStatus::Rejected => "REJECTED",
            OrderStatus::Completed => "COMPLETED",
        }
    }

    /// 状态机合法流转判断
    ///
    /// # 返回
    /// - true: 允许从当前状态流转到 next
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        matches!(
            (self, next),
            (OrderStatus::Pending, OrderStatus::Approved)
                | (OrderStatus::Pending, OrderStatus::Rejected)
                | (OrderStatus::Approved, OrderStatus::Completed)
                | (OrderStatus::Approved, OrderStatus::Rejected)
        )
    }

    /// 是否计入承诺需求（容量核算口径）
    ///
    /// PENDING 订单不占用容量，只有 APPROVED / COMPLETED 参与核算
    pub fn is_committed(&self) -> bool {
        matches!(self, OrderStatus::Approved | OrderStatus::Completed)
    }

    /// 是否为终态
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Rejected | OrderStatus::Completed)
    }
}

// ==========================================
// 计量单位 (Water Unit)
// ==========================================
// 用户录入的原始单位，提交时统一折算为加仑
// 序列化格式: 与前端录入一致的小写连字符 token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WaterUnit {
    #[serde(rename = "gallons")]
    Gallons, // 加仑
    #[serde(rename = "kgal")]
    Kgal, // 千加仑
    #[serde(rename = "acre-feet")]
    AcreFeet, // 英亩英尺
    #[serde(rename = "cubic-feet")]
    CubicFeet, // 立方英尺
    #[serde(rename = "cfs")]
    Cfs, // 立方英尺/秒 (流量单位)
    #[serde(rename = "gpm")]
    Gpm, // 加仑/分钟 (流量单位)
    #[serde(rename = "acre-feet-day")]
    AcreFeetPerDay, // 英亩英尺/天 (流量单位)
}

impl fmt::Display for WaterUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl WaterUnit {
    /// 从字符串解析单位（大小写不敏感）
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "gallons" => Some(WaterUnit::Gallons),
            "kgal" => Some(WaterUnit::Kgal),
            "acre-feet" => Some(WaterUnit::AcreFeet),
            "cubic-feet" => Some(WaterUnit::CubicFeet),
            "cfs" => Some(WaterUnit::Cfs),
            "gpm" => Some(WaterUnit::Gpm),
            "acre-feet-day" => Some(WaterUnit::AcreFeetPerDay),
            _ => None,
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            WaterUnit::Gallons => "gallons",
            WaterUnit::Kgal => "kgal",
            WaterUnit::AcreFeet => "acre-feet",
            WaterUnit::CubicFeet => "cubic-feet",
            WaterUnit::Cfs => "cfs",
            WaterUnit::Gpm => "gpm",
            WaterUnit::AcreFeetPerDay => "acre-feet-day",
        }
    }

    /// 是否为流量单位（折算时必须提供时长）
    pub fn is_rate_unit(&self) -> bool {
        matches!(
            self,
            WaterUnit::Cfs | WaterUnit::Gpm | WaterUnit::AcreFeetPerDay
        )
    }
}
