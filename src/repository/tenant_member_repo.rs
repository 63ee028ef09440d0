// ==========================================
// 灌溉水务订单系统 - 租户成员仓储
// ==========================================
// 职责: tenant_member 表的读写, 支撑成员资格校验
// ==========================================

use crate::domain::TenantMember;
use crate::repository::db_utils::parse_utc_column;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

// ==========================================
// TenantMemberRepository
// ==========================================
pub struct TenantMemberRepository {
    conn: Arc<Mutex<Connection>>,
}

impl TenantMemberRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 添加成员 (重复添加只更新角色)
    pub fn add_member(&self, member: &TenantMember) -> RepositoryResult<()> {
        let conn = self.get_conn()?;

        conn.execute(
            r#"
            INSERT INTO tenant_member (tenant_id, user_id, role, added_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(tenant_id, user_id) DO UPDATE SET role = ?3
            "#,
            params![
                member.tenant_id,
                member.user_id,
                member.role,
                member.added_at.to_rfc3339(),
            ],
        )?;

        Ok(())
    }

    /// 成员资格校验
    pub fn is_member(&self, tenant_id: &str, user_id: &str) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;

        let exists: bool = conn
            .query_row(
                "SELECT 1 FROM tenant_member WHERE tenant_id = ?1 AND user_id = ?2",
                params![tenant_id, user_id],
                |_row| Ok(true),
            )
            .optional()?
            .unwrap_or(false);

        Ok(exists)
    }

    /// 查找成员记录
    pub fn find_member(
        &self,
        tenant_id: &str,
        user_id: &str,
    ) -> RepositoryResult<Option<TenantMember>> {
        let conn = self.get_conn()?;

        let member = conn
            .query_row(
                r#"
                SELECT tenant_id, user_id, role, added_at
                FROM tenant_member
                WHERE tenant_id = ?1 AND user_id = ?2
                "#,
                params![tenant_id, user_id],
                map_row,
            )
            .optional()?;

        Ok(member)
    }

    /// 移除成员
    pub fn remove_member(&self, tenant_id: &str, user_id: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;

        let rows = conn.execute(
            "DELETE FROM tenant_member WHERE tenant_id = ?1 AND user_id = ?2",
            params![tenant_id, user_id],
        )?;

        if rows == 0 {
            return Err(RepositoryError::NotFound {
                entity: "tenant_member".to_string(),
                id: format!("{}/{}", tenant_id, user_id),
            });
        }

        Ok(())
    }
}

fn map_row(row: &Row) -> SqliteResult<TenantMember> {
    Ok(TenantMember {
        tenant_id: row.get(0)?,
        user_id: row.get(1)?,
        role: row.get(2)?,
        added_at: parse_utc_column(3, row.get::<_, String>(3)?)?,
    })
}

// ==========================================
// 单元测试
// ==========================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    fn setup_repo() -> TenantMemberRepository {
        let conn = Connection::open_in_memory().unwrap();
        db::configure_sqlite_connection(&conn).unwrap();
        db::init_schema(&conn).unwrap();
        TenantMemberRepository::new(Arc::new(Mutex::new(conn)))
    }

    #[test]
    fn test_add_and_check_membership() {
        let repo = setup_repo();

        repo.add_member(&TenantMember::new("T001", "U001", "customer"))
            .unwrap();

        assert!(repo.is_member("T001", "U001").unwrap());
        assert!(!repo.is_member("T001", "U002").unwrap());
        assert!(!repo.is_member("T002", "U001").unwrap());
    }

    #[test]
    fn test_add_member_upserts_role() {
        let repo = setup_repo();

        repo.add_member(&TenantMember::new("T001", "U001", "customer"))
            .unwrap();
        repo.add_member(&TenantMember::new("T001", "U001", "admin"))
            .unwrap();

        let member = repo.find_member("T001", "U001").unwrap().unwrap();
        assert_eq!(member.role, "admin");
    }

    #[test]
    fn test_remove_member() {
        let repo = setup_repo();

        repo.add_member(&TenantMember::new("T001", "U001", "customer"))
            .unwrap();
        repo.remove_member("T001", "U001").unwrap();

        assert!(!repo.is_member("T001", "U001").unwrap());

        let err = repo.remove_member("T001", "U001").unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound { .. }));
    }
}
