// ==========================================
// 工地记录管理系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::import_config_trait::{
    ImportConfigReader, DEFAULT_DATE_FORMAT, DEFAULT_LIST_SEPARATOR, DEFAULT_TIME_FORMAT,
};
use crate::db::{configure_sqlite_connection, initialize_schema, open_sqlite_connection};
use rusqlite::{params, Connection, OptionalExtension};
use std::error::Error;
use std::sync::{Arc, Mutex};

/// 配置键
pub const KEY_DATE_FORMAT: &str = "import.date_format";
pub const KEY_TIME_FORMAT: &str = "import.time_format";
pub const KEY_LIST_SEPARATOR: &str = "import.list_separator";
pub const KEY_RECORD_BATCHES: &str = "import.record_batches";

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
        initialize_schema(&conn)?;

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
            configure_sqlite_connection(&conn_guard)?;
            initialize_schema(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// 从 config_kv 表读取配置值，带默认值（空白值视为未配置）
    fn get_config_or_default(&self, key: &str, default: &str) -> Result<String, Box<dyn Error>> {
        Ok(self
            .get_config_value(key)?
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| default.to_string()))
    }

    /// 写入 global scope 配置（存在则覆盖）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            r#"
            INSERT INTO config_kv (scope_id, key, value, updated_at)
            VALUES ('global', ?1, ?2, datetime('now'))
            ON CONFLICT(scope_id, key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
            params![key, value],
        )?;
        Ok(())
    }
}

impl ImportConfigReader for ConfigManager {
    fn get_date_format(&self) -> Result<String, Box<dyn Error>> {
        self.get_config_or_default(KEY_DATE_FORMAT, DEFAULT_DATE_FORMAT)
    }

    fn get_time_format(&self) -> Result<String, Box<dyn Error>> {
        self.get_config_or_default(KEY_TIME_FORMAT, DEFAULT_TIME_FORMAT)
    }

    fn get_list_separator(&self) -> Result<String, Box<dyn Error>> {
        self.get_config_or_default(KEY_LIST_SEPARATOR, DEFAULT_LIST_SEPARATOR)
    }

    fn get_record_batches(&self) -> Result<bool, Box<dyn Error>> {
        let raw = self.get_config_or_default(KEY_RECORD_BATCHES, "true")?;
        match raw.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" => Ok(false),
            other => Err(format!("配置值格式错误 ({}): {}", KEY_RECORD_BATCHES, other).into()),
        }
    }
}
