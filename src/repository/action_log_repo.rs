// ==========================================
// 灌溉水务订单系统 - 操作日志数据仓储
// ==========================================
// 职责: order_action_log 表的写入与查询
// 红线: 所有提交/审核/时段变更必须记录
// ==========================================

use crate::domain::{ActionType, OrderActionLog};
use crate::repository::db_utils::{column_parse_error, parse_utc_column};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

// ==========================================
// OrderActionLogRepository
// ==========================================
// 红线: Repository 不做业务逻辑,只做数据映射
pub struct OrderActionLogRepository {
    conn: Arc<Mutex<Connection>>,
}

impl OrderActionLogRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 插入操作日志
    ///
    /// # 返回
    /// - `Ok(action_id)`: 成功插入,返回 action_id
    pub fn insert(&self, log: &OrderActionLog) -> RepositoryResult<String> {
        let conn = self.get_conn()?;

        conn.execute(
            r#"
            INSERT INTO order_action_log (
                action_id, tenant_id, order_id, action_type,
                action_ts, actor, payload_json, detail
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                log.action_id,
                log.tenant_id,
                log.order_id,
                log.action_type.as_str(),
                log.action_ts.to_rfc3339(),
                log.actor,
                log.payload_json.as_ref().map(|v| v.to_string()),
                log.detail,
            ],
        )?;

        Ok(log.action_id.clone())
    }

    /// 查询租户最近的 N 条日志
    pub fn list_recent(&self, tenant_id: &str, limit: i64) -> RepositoryResult<Vec<OrderActionLog>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT action_id, tenant_id, order_id, action_type,
                   action_ts, actor, payload_json, detail
            FROM order_action_log
            WHERE tenant_id = ?1
            ORDER BY action_ts DESC
            LIMIT ?2
            "#,
        )?;

        let logs = stmt
            .query_map(params![tenant_id, limit], map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(logs)
    }

    /// 查询单个订单的全部操作轨迹 (按时间正序)
    pub fn list_by_order(&self, order_id: &str) -> RepositoryResult<Vec<OrderActionLog>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT action_id, tenant_id, order_id, action_type,
                   action_ts, actor, payload_json, detail
            FROM order_action_log
            WHERE order_id = ?1
            ORDER BY action_ts ASC
            "#,
        )?;

        let logs = stmt
            .query_map(params![order_id], map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(logs)
    }
}

fn map_row(row: &Row) -> SqliteResult<OrderActionLog> {
    let action_type_raw: String = row.get(3)?;
    let action_type = ActionType::from_str(&action_type_raw)
        .ok_or_else(|| column_parse_error(3, format!("未知操作类型: {}", action_type_raw)))?;

    let payload_json = row
        .get::<_, Option<String>>(6)?
        .and_then(|s| serde_json::from_str(&s).ok());

    Ok(OrderActionLog {
        action_id: row.get(0)?,
        tenant_id: row.get(1)?,
        order_id: row.get(2)?,
        action_type,
        action_ts: parse_utc_column(4, row.get::<_, String>(4)?)?,
        actor: row.get(5)?,
        payload_json,
        detail: row.get(7)?,
    })
}

// ==========================================
// 单元测试
// ==========================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use serde_json::json;

    fn setup_repo() -> OrderActionLogRepository {
        let conn = Connection::open_in_memory().unwrap();
        db::configure_sqlite_connection(&conn).unwrap();
        db::init_schema(&conn).unwrap();
        OrderActionLogRepository::new(Arc::new(Mutex::new(conn)))
    }

    #[test]
    fn test_insert_and_list_by_order() {
        let repo = setup_repo();

        let submit = OrderActionLog::new("T001", ActionType::SubmitOrder, "grower-a")
            .with_order_id("O-1")
            .with_payload(&json!({"total_gallons": 5000.0}))
            .with_detail("提交灌溉订单");
        let approve = OrderActionLog::new("T001", ActionType::ApproveOrder, "manager-1")
            .with_order_id("O-1");

        repo.insert(&submit).unwrap();
        repo.insert(&approve).unwrap();

        let logs = repo.list_by_order("O-1").unwrap();
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[0].action_type, ActionType::SubmitOrder);
        assert_eq!(logs[1].action_type, ActionType::ApproveOrder);
        assert_eq!(
            logs[0].payload_json.as_ref().unwrap()["total_gallons"],
            json!(5000.0)
        );
        assert_eq!(logs[0].detail.as_deref(), Some("提交灌溉订单"));
    }

    #[test]
    fn test_list_recent_respects_limit_and_tenant() {
        let repo = setup_repo();

        for i in 0..5 {
            let mut log = OrderActionLog::new("T001", ActionType::CreateWindow, "admin-1");
            log.action_ts = chrono::Utc::now() + chrono::Duration::seconds(i);
            repo.insert(&log).unwrap();
        }
        repo.insert(&OrderActionLog::new(
            "T002",
            ActionType::CreateWindow,
            "admin-2",
        ))
        .unwrap();

        let recent = repo.list_recent("T001", 3).unwrap();
        assert_eq!(recent.len(), 3);
        assert!(recent.iter().all(|l| l.tenant_id == "T001"));
        // 最近的在最前
        assert!(recent[0].action_ts >= recent[1].action_ts);
    }

    #[test]
    fn test_window_action_without_order_id() {
        let repo = setup_repo();

        let log = OrderActionLog::new("T001", ActionType::DeleteWindow, "admin-1")
            .with_detail("删除过期供水时段");
        repo.insert(&log).unwrap();

        let recent = repo.list_recent("T001", 10).unwrap();
        assert_eq!(recent.len(), 1);
        assert!(recent[0].order_id.is_none());
    }
}
