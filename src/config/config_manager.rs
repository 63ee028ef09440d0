// ==========================================
// 灌溉水务订单系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::order_policy_trait::OrderPolicyReader;
use crate::db::open_sqlite_connection;
use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::error::Error;
use std::sync::{Arc, Mutex};

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 读取 global scope 的配置值（公开方法，供其他模块复用）
    pub fn get_global_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        self.get_config_value(key)
    }

    /// 写入 global scope 的配置值（UPSERT）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;

        Ok(())
    }

    /// 从 config_kv 表读取配置值，带默认值
    fn get_config_or_default(&self, key: &str, default: &str) -> Result<String, Box<dyn Error>> {
        Ok(self
            .get_config_value(key)?
            .unwrap_or_else(|| default.to_string()))
    }
}

// ==========================================
// OrderPolicyReader Trait 实现
// ==========================================
// 解析失败时回落默认值, 不让坏配置拖垮订单链路
#[async_trait]
impl OrderPolicyReader for ConfigManager {
    async fn get_notify_on_status_change(&self) -> Result<bool, Box<dyn Error>> {
        let value = self.get_config_or_default(config_keys::NOTIFY_ON_STATUS_CHANGE, "true")?;
        Ok(matches!(value.to_lowercase().as_str(), "true" | "1" | "yes"))
    }

    async fn get_max_order_window_hours(&self) -> Result<i64, Box<dyn Error>> {
        let value = self.get_config_or_default(config_keys::MAX_ORDER_WINDOW_HOURS, "8784")?;
        let hours = value.parse::<i64>().unwrap_or(8784);
        if hours <= 0 {
            // 非法配置按默认护栏处理
            return Ok(8784);
        }
        Ok(hours)
    }

    async fn get_notification_retention_days(&self) -> Result<i32, Box<dyn Error>> {
        let value = self.get_config_or_default(config_keys::NOTIFICATION_RETENTION_DAYS, "90")?;
        Ok(value.parse::<i32>().unwrap_or(90))
    }

    async fn get_default_locale(&self) -> Result<String, Box<dyn Error>> {
        let value = self.get_config_or_default(config_keys::DEFAULT_LOCALE, "zh-CN")?;
        if value.trim().is_empty() {
            Ok("zh-CN".to_string())
        } else {
            Ok(value)
        }
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 通知
    pub const NOTIFY_ON_STATUS_CHANGE: &str = "notify_on_status_change";
    pub const NOTIFICATION_RETENTION_DAYS: &str = "notification_retention_days";

    // 订单护栏
    pub const MAX_ORDER_WINDOW_HOURS: &str = "max_order_window_hours";

    // 本地化
    pub const DEFAULT_LOCALE: &str = "default_locale";
}

// ==========================================
// 单元测试
// ==========================================
