// ==========================================
// 灌溉水务订单系统 - 用水订单仓储
// ==========================================
// 职责: water_order 表的读写
// 红线: 订单永不物理删除; 状态更新必须带前置状态条件 (防并发审核互踩)
// ==========================================

use crate::domain::types::{OrderStatus, WaterUnit};
use crate::domain::WaterOrder;
use crate::repository::db_utils::{column_parse_error, parse_optional_utc_column, parse_utc_column};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

// ==========================================
// WaterOrderRepository
// ==========================================
pub struct WaterOrderRepository {
    conn: Arc<Mutex<Connection>>,
}

impl WaterOrderRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 插入新订单
    pub fn insert(&self, order: &WaterOrder) -> RepositoryResult<()> {
        let conn = self.get_conn()?;

        conn.execute(
            r#"
            INSERT INTO water_order (
                order_id, tenant_id, user_id, start_at, end_at,
                requested_amount, requested_unit, total_gallons,
                status, created_at, reviewed_by, reviewed_at, review_notes
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            "#,
            params![
                order.order_id,
                order.tenant_id,
                order.user_id,
                order.start_at.to_rfc3339(),
                order.end_at.to_rfc3339(),
                order.requested_amount,
                order.requested_unit.to_db_str(),
                order.total_gallons,
                order.status.to_db_str(),
                order.created_at.to_rfc3339(),
                order.reviewed_by,
                order.reviewed_at.map(|t| t.to_rfc3339()),
                order.review_notes,
            ],
        )?;

        Ok(())
    }

    /// 按ID查找订单
    pub fn find_by_id(&self, order_id: &str) -> RepositoryResult<Option<WaterOrder>> {
        let conn = self.get_conn()?;

        let order = conn
            .query_row(
                &format!("{} WHERE order_id = ?1", SELECT_ORDER),
                params![order_id],
                map_row,
            )
            .optional()?;

        Ok(order)
    }

    /// 列出租户全部订单 (新订单在前)
    pub fn list_by_tenant(&self, tenant_id: &str) -> RepositoryResult<Vec<WaterOrder>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(&format!(
            "{} WHERE tenant_id = ?1 ORDER BY created_at DESC",
            SELECT_ORDER
        ))?;

        let orders = stmt
            .query_map(params![tenant_id], map_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(orders)
    }

    /// 列出租户的承诺订单 (容量核算口径: APPROVED / COMPLETED)
    pub fn list_committed(&self, tenant_id: &str) -> RepositoryResult<Vec<WaterOrder>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(&format!(
            "{} WHERE tenant_id = ?1 AND status IN ('APPROVED', 'COMPLETED') ORDER BY start_at",
            SELECT_ORDER
        ))?;

        let orders = stmt
            .query_map(params![tenant_id], map_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(orders)
    }

    /// 按状态列出租户订单
    pub fn list_by_status(
        &self,
        tenant_id: &str,
        status: OrderStatus,
    ) -> RepositoryResult<Vec<WaterOrder>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(&format!(
            "{} WHERE tenant_id = ?1 AND status = ?2 ORDER BY created_at DESC",
            SELECT_ORDER
        ))?;

        let orders = stmt
            .query_map(params![tenant_id, status.to_db_str()], map_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(orders)
    }

    /// 带前置状态条件的状态更新 (审核落库)
    ///
    /// # 规则
    /// - UPDATE 条件同时锁定 order_id 与当前状态
    /// - 零行受影响且订单存在 => 并发审核冲突 (StatusConflict)
    /// - 零行受影响且订单不存在 => NotFound
    pub fn update_status(
        &self,
        order_id: &str,
        from: OrderStatus,
        to: OrderStatus,
        reviewer: &str,
        notes: Option<&str>,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;

        let rows = conn.execute(
            r#"
            UPDATE water_order
            SET status = ?3, reviewed_by = ?4, reviewed_at = ?5, review_notes = ?6
            WHERE order_id = ?1 AND status = ?2
            "#,
            params![
                order_id,
                from.to_db_str(),
                to.to_db_str(),
                reviewer,
                Utc::now().to_rfc3339(),
                notes,
            ],
        )?;

        if rows == 0 {
            let exists: bool = conn
                .query_row(
                    "SELECT 1 FROM water_order WHERE order_id = ?1",
                    params![order_id],
                    |_row| Ok(true),
                )
                .optional()?
                .unwrap_or(false);

            if exists {
                return Err(RepositoryError::StatusConflict {
                    order_id: order_id.to_string(),
                    expected: from.to_db_str().to_string(),
                });
            }
            return Err(RepositoryError::NotFound {
                entity: "water_order".to_string(),
                id: order_id.to_string(),
            });
        }

        Ok(())
    }

    /// 按状态统计租户订单数量
    pub fn count_by_status(&self, tenant_id: &str) -> RepositoryResult<Vec<(OrderStatus, i64)>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT status, COUNT(*) FROM water_order
            WHERE tenant_id = ?1
            GROUP BY status
            ORDER BY status
            "#,
        )?;

        let counts = stmt
            .query_map(params![tenant_id], |row| {
                let status_str: String = row.get(0)?;
                let status = OrderStatus::from_str(&status_str)
                    .ok_or_else(|| column_parse_error(0, format!("未知订单状态: {}", status_str)))?;
                Ok((status, row.get::<_, i64>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(counts)
    }
}

const SELECT_ORDER: &str = r#"
    SELECT order_id, tenant_id, user_id, start_at, end_at,
           requested_amount, requested_unit, total_gallons,
           status, created_at, reviewed_by, reviewed_at, review_notes
    FROM water_order
"#;

fn map_row(row: &Row) -> SqliteResult<WaterOrder> {
    let unit_str: String = row.get(6)?;
    let status_str: String = row.get(8)?;

    Ok(WaterOrder {
        order_id: row.get(0)?,
        tenant_id: row.get(1)?,
        user_id: row.get(2)?,
        start_at: parse_utc_column(3, row.get::<_, String>(3)?)?,
        end_at: parse_utc_column(4, row.get::<_, String>(4)?)?,
        requested_amount: row.get(5)?,
        requested_unit: WaterUnit::from_str(&unit_str)
            .ok_or_else(|| column_parse_error(6, format!("未知计量单位: {}", unit_str)))?,
        total_gallons: row.get(7)?,
        status: OrderStatus::from_str(&status_str)
            .ok_or_else(|| column_parse_error(8, format!("未知订单状态: {}", status_str)))?,
        created_at: parse_utc_column(9, row.get::<_, String>(9)?)?,
        reviewed_by: row.get(10)?,
        reviewed_at: parse_optional_utc_column(11, row.get::<_, Option<String>>(11)?)?,
        review_notes: row.get(12)?,
    })
}

// ==========================================
// 单元测试
// ==========================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use chrono::{DateTime, TimeZone};

    fn setup_repo() -> WaterOrderRepository {
        let conn = Connection::open_in_memory().unwrap();
        db::configure_sqlite_connection(&conn).unwrap();
        db::init_schema(&conn).unwrap();
        WaterOrderRepository::new(Arc::new(Mutex::new(conn)))
    }

    fn ts(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 1, h, 0, 0).unwrap()
    }

    fn sample_order(tenant: &str) -> WaterOrder {
        WaterOrder::new_pending(
            tenant,
            "U001",
            ts(8),
            ts(12),
            5.0,
            WaterUnit::Kgal,
            5_000.0,
        )
    }

    #[test]
    fn test_insert_and_find_round_trip() {
        let repo = setup_repo();
        let order = sample_order("T001");

        repo.insert(&order).unwrap();

        let loaded = repo.find_by_id(&order.order_id).unwrap().unwrap();
        assert_eq!(loaded.order_id, order.order_id);
        assert_eq!(loaded.status, OrderStatus::Pending);
        assert_eq!(loaded.requested_unit, WaterUnit::Kgal);
        assert_eq!(loaded.start_at, order.start_at);
        assert_eq!(loaded.end_at, order.end_at);
        assert!(loaded.reviewed_at.is_none());
        assert!((loaded.total_gallons - 5_000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_list_committed_filters_status() {
        let repo = setup_repo();

        let pending = sample_order("T001");
        let mut approved = sample_order("T001");
        approved.status = OrderStatus::Approved;
        let mut completed = sample_order("T001");
        completed.status = OrderStatus::Completed;
        let mut rejected = sample_order("T001");
        rejected.status = OrderStatus::Rejected;

        for order in [&pending, &approved, &completed, &rejected] {
            repo.insert(order).unwrap();
        }

        let committed = repo.list_committed("T001").unwrap();
        assert_eq!(committed.len(), 2);
        assert!(committed.iter().all(|o| o.is_committed()));
    }

    #[test]
    fn test_update_status_guarded_success() {
        let repo = setup_repo();
        let order = sample_order("T001");
        repo.insert(&order).unwrap();

        repo.update_status(
            &order.order_id,
            OrderStatus::Pending,
            OrderStatus::Approved,
            "admin-1",
            Some("当季配额内"),
        )
        .unwrap();

        let loaded = repo.find_by_id(&order.order_id).unwrap().unwrap();
        assert_eq!(loaded.status, OrderStatus::Approved);
        assert_eq!(loaded.reviewed_by.as_deref(), Some("admin-1"));
        assert!(loaded.reviewed_at.is_some());
        assert_eq!(loaded.review_notes.as_deref(), Some("当季配额内"));
    }

    #[test]
    fn test_update_status_conflict_when_precondition_stale() {
        let repo = setup_repo();
        let order = sample_order("T001");
        repo.insert(&order).unwrap();

        // 第一次审核成功
        repo.update_status(
            &order.order_id,
            OrderStatus::Pending,
            OrderStatus::Approved,
            "admin-1",
            None,
        )
        .unwrap();

        // 第二个审核人仍以 PENDING 为前置条件 => 冲突
        let err = repo
            .update_status(
                &order.order_id,
                OrderStatus::Pending,
                OrderStatus::Rejected,
                "admin-2",
                None,
            )
            .unwrap_err();

        assert!(matches!(err, RepositoryError::StatusConflict { .. }));

        // 订单保持第一次审核的结果
        let loaded = repo.find_by_id(&order.order_id).unwrap().unwrap();
        assert_eq!(loaded.status, OrderStatus::Approved);
        assert_eq!(loaded.reviewed_by.as_deref(), Some("admin-1"));
    }

    #[test]
    fn test_update_status_missing_is_not_found() {
        let repo = setup_repo();

        let err = repo
            .update_status(
                "no-such-order",
                OrderStatus::Pending,
                OrderStatus::Approved,
                "admin-1",
                None,
            )
            .unwrap_err();

        assert!(matches!(err, RepositoryError::NotFound { .. }));
    }

    #[test]
    fn test_list_by_status_and_counts() {
        let repo = setup_repo();

        let mut approved = sample_order("T001");
        approved.status = OrderStatus::Approved;
        repo.insert(&approved).unwrap();
        repo.insert(&sample_order("T001")).unwrap();
        repo.insert(&sample_order("T001")).unwrap();
        // 其他租户不计入
        repo.insert(&sample_order("T002")).unwrap();

        let pending = repo.list_by_status("T001", OrderStatus::Pending).unwrap();
        assert_eq!(pending.len(), 2);

        let counts = repo.count_by_status("T001").unwrap();
        assert!(counts.contains(&(OrderStatus::Approved, 1)));
        assert!(counts.contains(&(OrderStatus::Pending, 2)));
    }
}
