// ==========================================
// 灌溉水务订单系统 - 通知仓储
// ==========================================
// 职责: notification 表的读写与超期清理
// ==========================================

use crate::domain::Notification;
use crate::repository::db_utils::parse_utc_column;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{Duration, Utc};
use rusqlite::{params, Connection, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

// ==========================================
// NotificationRepository
// ==========================================
pub struct NotificationRepository {
    conn: Arc<Mutex<Connection>>,
}

impl NotificationRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 插入通知
    pub fn insert(&self, notification: &Notification) -> RepositoryResult<()> {
        let conn = self.get_conn()?;

        conn.execute(
            r#"
            INSERT INTO notification (
                notification_id, tenant_id, user_id, message,
                details, link, created_at, read_flag
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                notification.notification_id,
                notification.tenant_id,
                notification.user_id,
                notification.message,
                notification.details,
                notification.link,
                notification.created_at.to_rfc3339(),
                notification.read_flag as i64,
            ],
        )?;

        Ok(())
    }

    /// 列出用户收到的全部通知 (新通知在前)
    pub fn list_by_user(
        &self,
        tenant_id: &str,
        user_id: &str,
    ) -> RepositoryResult<Vec<Notification>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT notification_id, tenant_id, user_id, message,
                   details, link, created_at, read_flag
            FROM notification
            WHERE tenant_id = ?1 AND user_id = ?2
            ORDER BY created_at DESC
            "#,
        )?;

        let notifications = stmt
            .query_map(params![tenant_id, user_id], map_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(notifications)
    }

    /// 标记通知为已读
    pub fn mark_read(&self, notification_id: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;

        let rows = conn.execute(
            "UPDATE notification SET read_flag = 1 WHERE notification_id = ?1",
            params![notification_id],
        )?;

        if rows == 0 {
            return Err(RepositoryError::NotFound {
                entity: "notification".to_string(),
                id: notification_id.to_string(),
            });
        }

        Ok(())
    }

    /// 删除超过保留期的通知
    ///
    /// # 参数
    /// - days: 保留天数 (来自 notification_retention_days 配置)
    ///
    /// # 返回
    /// - 删除的行数
    pub fn delete_older_than(&self, days: i64) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;

        let cutoff = Utc::now() - Duration::days(days);
        let rows = conn.execute(
            "DELETE FROM notification WHERE created_at < ?1",
            params![cutoff.to_rfc3339()],
        )?;

        Ok(rows)
    }
}

fn map_row(row: &Row) -> SqliteResult<Notification> {
    Ok(Notification {
        notification_id: row.get(0)?,
        tenant_id: row.get(1)?,
        user_id: row.get(2)?,
        message: row.get(3)?,
        details: row.get(4)?,
        link: row.get(5)?,
        created_at: parse_utc_column(6, row.get::<_, String>(6)?)?,
        read_flag: row.get::<_, i64>(7)? != 0,
    })
}

// ==========================================
// 单元测试
// ==========================================
