// ==========================================
// 灌溉水务订单系统 - 供水时段仓储
// ==========================================
// 职责: availability_window 表的 CRUD
// 红线: 不含业务逻辑, 只做参数化 SQL 与行映射
// ==========================================

use crate::domain::AvailabilityWindow;
use crate::repository::db_utils::parse_utc_column;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

// ==========================================
// AvailabilityWindowRepository
// ==========================================
pub struct AvailabilityWindowRepository {
    conn: Arc<Mutex<Connection>>,
}

impl AvailabilityWindowRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 插入新的供水时段
    pub fn insert(&self, window: &AvailabilityWindow) -> RepositoryResult<()> {
        let conn = self.get_conn()?;

        conn.execute(
            r#"
            INSERT INTO availability_window (
                window_id, tenant_id, start_at, end_at, total_gallons,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                window.window_id,
                window.tenant_id,
                window.start_at.to_rfc3339(),
                window.end_at.to_rfc3339(),
                window.total_gallons,
                window.created_at.to_rfc3339(),
                window.updated_at.to_rfc3339(),
            ],
        )?;

        Ok(())
    }

    /// 更新供水时段的区间与水量
    ///
    /// # 返回
    /// - 记录不存在时返回 NotFound
    pub fn update(&self, window: &AvailabilityWindow) -> RepositoryResult<()> {
        let conn = self.get_conn()?;

        let rows = conn.execute(
            r#"
            UPDATE availability_window
            SET start_at = ?2, end_at = ?3, total_gallons = ?4, updated_at = ?5
            WHERE window_id = ?1
            "#,
            params![
                window.window_id,
                window.start_at.to_rfc3339(),
                window.end_at.to_rfc3339(),
                window.total_gallons,
                window.updated_at.to_rfc3339(),
            ],
        )?;

        if rows == 0 {
            return Err(RepositoryError::NotFound {
                entity: "availability_window".to_string(),
                id: window.window_id.clone(),
            });
        }

        Ok(())
    }

    /// 物理删除供水时段
    ///
    /// # 返回
    /// - 记录不存在时返回 NotFound
    pub fn delete(&self, window_id: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;

        let rows = conn.execute(
            "DELETE FROM availability_window WHERE window_id = ?1",
            params![window_id],
        )?;

        if rows == 0 {
            return Err(RepositoryError::NotFound {
                entity: "availability_window".to_string(),
                id: window_id.to_string(),
            });
        }

        Ok(())
    }

    /// 按ID查找供水时段
    pub fn find_by_id(&self, window_id: &str) -> RepositoryResult<Option<AvailabilityWindow>> {
        let conn = self.get_conn()?;

        let window = conn
            .query_row(
                r#"
                SELECT window_id, tenant_id, start_at, end_at, total_gallons,
                       created_at, updated_at
                FROM availability_window
                WHERE window_id = ?1
                "#,
                params![window_id],
                map_row,
            )
            .optional()?;

        Ok(window)
    }

    /// 列出租户全部供水时段 (按开始时间排序)
    pub fn list_by_tenant(&self, tenant_id: &str) -> RepositoryResult<Vec<AvailabilityWindow>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT window_id, tenant_id, start_at, end_at, total_gallons,
                   created_at, updated_at
            FROM availability_window
            WHERE tenant_id = ?1
            ORDER BY start_at
            "#,
        )?;

        let windows = stmt
            .query_map(params![tenant_id], map_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(windows)
    }
}

fn map_row(row: &Row) -> SqliteResult<AvailabilityWindow> {
    Ok(AvailabilityWindow {
        window_id: row.get(0)?,
        tenant_id: row.get(1)?,
        start_at: parse_utc_column(2, row.get::<_, String>(2)?)?,
        end_at: parse_utc_column(3, row.get::<_, String>(3)?)?,
        total_gallons: row.get(4)?,
        created_at: parse_utc_column(5, row.get::<_, String>(5)?)?,
        updated_at: parse_utc_column(6, row.get::<_, String>(6)?)?,
    })
}

// ==========================================
// 单元测试
// ==========================================
