// ==========================================
// 灌溉水务订单系统 - 租户成员领域模型
// ==========================================
// 用途: 提交/管理操作前的成员资格校验
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// TenantMember - 租户成员
// ==========================================
// 主键: (tenant_id, user_id)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenantMember {
    pub tenant_id: String,        // 所属租户
    pub user_id: String,          // 用户ID
    pub role: String,             // 角色 (customer / admin)
    pub added_at: DateTime<Utc>,  // 加入时间
}

impl TenantMember {
    /// 创建新成员 (服务端分配加入时间)
    pub fn new(tenant_id: &str, user_id: &str, role: &str) -> Self {
        Self {
            tenant_id: tenant_id.to_string(),
            user_id: user_id.to_string(),
            role: role.to_string(),
            added_at: Utc::now(),
        }
    }

    /// 是否为管理员角色
    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_check() {
        let admin = TenantMember::new("T001", "U001", "admin");
        let customer = TenantMember::new("T001", "U002", "customer");

        assert!(admin.is_admin());
        assert!(!customer.is_admin());
        assert_eq!(customer.role, "customer");
    }
}
