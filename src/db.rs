// ==========================================
// 工地记录管理系统 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为（外键 + busy_timeout）
// - 统一建表（CREATE TABLE IF NOT EXISTS，不做迁移）
// ==========================================

use rusqlite::Connection;
use std::path::PathBuf;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 数据库路径环境变量
pub const DB_PATH_ENV: &str = "SITE_RECORDS_DB_PATH";

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要“每个连接”单独开启
/// - busy_timeout 需要“每个连接”单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 初始化全部表结构（幂等）
pub fn initialize_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS config_kv (
            scope_id TEXT NOT NULL DEFAULT 'global',
            key TEXT NOT NULL,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (scope_id, key)
        );

        CREATE TABLE IF NOT EXISTS user_account (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            email TEXT UNIQUE,
            badge TEXT UNIQUE,
            national_id TEXT UNIQUE,
            phone TEXT,
            role TEXT NOT NULL,
            job_function TEXT NOT NULL,
            title TEXT,
            password_hash TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS work_site (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            code TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            location TEXT NOT NULL,
            start_km REAL NOT NULL,
            end_km REAL NOT NULL,
            start_date TEXT NOT NULL,
            planned_end_date TEXT NOT NULL,
            responsible_id INTEGER REFERENCES user_account(id) ON DELETE SET NULL,
            status TEXT NOT NULL DEFAULT 'planning',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS equipment (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            category TEXT NOT NULL,
            model TEXT NOT NULL,
            plate TEXT NOT NULL UNIQUE,
            manufacturer TEXT NOT NULL,
            year INTEGER NOT NULL,
            meter_reading REAL NOT NULL DEFAULT 0,
            status TEXT NOT NULL DEFAULT 'active',
            work_site_id INTEGER REFERENCES work_site(id) ON DELETE SET NULL,
            operator_id INTEGER REFERENCES user_account(id) ON DELETE SET NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS activity_category (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            description TEXT NOT NULL DEFAULT ''
        );

        CREATE TABLE IF NOT EXISTS activity (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            code TEXT NOT NULL UNIQUE,
            description TEXT NOT NULL,
            unit TEXT NOT NULL,
            category_id INTEGER REFERENCES activity_category(id) ON DELETE SET NULL,
            unit_price REAL NOT NULL,
            work_site_id INTEGER NOT NULL REFERENCES work_site(id) ON DELETE CASCADE,
            active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS equipment_usage_log (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            equipment_id INTEGER NOT NULL REFERENCES equipment(id) ON DELETE CASCADE,
            operator_id INTEGER REFERENCES user_account(id) ON DELETE SET NULL,
            date TEXT NOT NULL,
            meter_start REAL NOT NULL,
            meter_end REAL NOT NULL,
            time_start TEXT NOT NULL,
            time_end TEXT NOT NULL,
            primary_activity TEXT NOT NULL,
            location TEXT NOT NULL,
            notes TEXT NOT NULL DEFAULT '',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            UNIQUE(equipment_id, date)
        );

        CREATE TABLE IF NOT EXISTS labor_log (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            recorder_id INTEGER NOT NULL REFERENCES user_account(id) ON DELETE CASCADE,
            work_site_id INTEGER NOT NULL REFERENCES work_site(id) ON DELETE CASCADE,
            date TEXT NOT NULL,
            headcount INTEGER NOT NULL DEFAULT 0,
            time_start TEXT NOT NULL,
            time_end TEXT NOT NULL,
            location TEXT NOT NULL,
            notes TEXT NOT NULL DEFAULT '',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            UNIQUE(recorder_id, work_site_id, date)
        );

        CREATE TABLE IF NOT EXISTS labor_log_attendee (
            labor_log_id INTEGER NOT NULL REFERENCES labor_log(id) ON DELETE CASCADE,
            user_id INTEGER NOT NULL REFERENCES user_account(id) ON DELETE CASCADE,
            PRIMARY KEY (labor_log_id, user_id)
        );

        CREATE TABLE IF NOT EXISTS daily_site_report (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            supervisor_id INTEGER NOT NULL REFERENCES user_account(id) ON DELETE CASCADE,
            work_site_id INTEGER NOT NULL REFERENCES work_site(id) ON DELETE CASCADE,
            date TEXT NOT NULL,
            headcount INTEGER NOT NULL,
            present_count INTEGER NOT NULL,
            activities_completed INTEGER NOT NULL DEFAULT 0,
            activities_partial INTEGER NOT NULL DEFAULT 0,
            weather TEXT NOT NULL,
            notes TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            UNIQUE(work_site_id, date, supervisor_id)
        );

        CREATE TABLE IF NOT EXISTS import_batch (
            batch_id TEXT PRIMARY KEY,
            kind TEXT NOT NULL,
            file_name TEXT,
            total_rows INTEGER NOT NULL,
            succeeded INTEGER NOT NULL,
            failed_or_skipped INTEGER NOT NULL,
            created INTEGER NOT NULL,
            updated INTEGER NOT NULL,
            elapsed_ms INTEGER NOT NULL,
            errors_json TEXT NOT NULL DEFAULT '[]',
            imported_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_import_batch_imported_at
            ON import_batch(imported_at DESC);
        "#,
    )
}

/// 默认数据库路径
///
/// 优先级: 环境变量 SITE_RECORDS_DB_PATH → 用户数据目录 → 当前目录
pub fn get_default_db_path() -> String {
    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./site_records.db");
    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("site-records");
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("site_records.db");
        }
    }

    path.to_string_lossy().to_string()
}
