// ==========================================
// 工地记录管理系统 - 导入批次仓储
// ==========================================
// 职责: 管理 import_batch 表（每个导入文件一条审计记录）
// 说明: 行级错误明细以 JSON 存储于 errors_json
// ==========================================

use crate::db::{configure_sqlite_connection, initialize_schema, open_sqlite_connection};
use crate::domain::{ImportBatch, RowFailure};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex, MutexGuard};

const BATCH_COLUMNS: &str = "batch_id, kind, file_name, total_rows, succeeded, failed_or_skipped, \
     created, updated, elapsed_ms, errors_json, imported_at";

/// 未反序列化的批次行
struct BatchRow {
    batch_id: String,
    kind: String,
    file_name: Option<String>,
    total_rows: i64,
    succeeded: i64,
    failed_or_skipped: i64,
    created: i64,
    updated: i64,
    elapsed_ms: i64,
    errors_json: String,
    imported_at: String,
}

impl BatchRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            batch_id: row.get(0)?,
            kind: row.get(1)?,
            file_name: row.get(2)?,
            total_rows: row.get(3)?,
            succeeded: row.get(4)?,
            failed_or_skipped: row.get(5)?,
            created: row.get(6)?,
            updated: row.get(7)?,
            elapsed_ms: row.get(8)?,
            errors_json: row.get(9)?,
            imported_at: row.get(10)?,
        })
    }

    fn into_batch(self) -> RepositoryResult<ImportBatch> {
        let errors: Vec<RowFailure> = serde_json::from_str(&self.errors_json)?;
        let imported_at = DateTime::parse_from_rfc3339(&self.imported_at)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| RepositoryError::FieldValueError {
                field: "imported_at".to_string(),
                message: e.to_string(),
            })?;

        Ok(ImportBatch {
            batch_id: self.batch_id,
            kind: self.kind,
            file_name: self.file_name,
            total_rows: self.total_rows,
            succeeded: self.succeeded,
            failed_or_skipped: self.failed_or_skipped,
            created: self.created,
            updated: self.updated,
            elapsed_ms: self.elapsed_ms,
            errors,
            imported_at,
        })
    }
}

pub struct ImportBatchRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ImportBatchRepository {
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        {
            let guard = conn
                .lock()
                .map_err(|e| RepositoryError::LockError(e.to_string()))?;
            configure_sqlite_connection(&guard)?;
            initialize_schema(&guard)?;
        }
        Ok(Self { conn })
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 写入批次记录
    pub fn insert(&self, batch: &ImportBatch) -> RepositoryResult<()> {
        let errors_json = serde_json::to_string(&batch.errors)?;
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO import_batch (
                batch_id, kind, file_name, total_rows, succeeded, failed_or_skipped,
                created, updated, elapsed_ms, errors_json, imported_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
            params![
                batch.batch_id,
                batch.kind,
                batch.file_name,
                batch.total_rows,
                batch.succeeded,
                batch.failed_or_skipped,
                batch.created,
                batch.updated,
                batch.elapsed_ms,
                errors_json,
                batch.imported_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// 按批次 ID 查询
    pub fn find_by_id(&self, batch_id: &str) -> RepositoryResult<Option<ImportBatch>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM import_batch WHERE batch_id = ?1", BATCH_COLUMNS);
        let row = conn
            .query_row(&sql, params![batch_id], BatchRow::from_row)
            .optional()?;
        row.map(BatchRow::into_batch).transpose()
    }

    /// 最近的批次（按导入时间倒序）
    pub fn list_recent(&self, limit: usize) -> RepositoryResult<Vec<ImportBatch>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM import_batch ORDER BY imported_at DESC, rowid DESC LIMIT ?1",
            BATCH_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![limit as i64], BatchRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter().map(BatchRow::into_batch).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ImportOutcome;

    fn repo() -> ImportBatchRepository {
        let conn = Connection::open_in_memory().unwrap();
        ImportBatchRepository::from_connection(Arc::new(Mutex::new(conn))).unwrap()
    }

    #[test]
    fn test_insert_and_find_batch_with_errors() {
        let repo = repo();
        let mut outcome = ImportOutcome::default();
        outcome.record_success(true);
        outcome.record_skip(3, "missing required field: code");

        let batch = ImportBatch::from_outcome(
            "b-1".to_string(),
            "work_sites",
            Some("obras.csv".to_string()),
            &outcome,
            12,
        );
        repo.insert(&batch).unwrap();

        let loaded = repo.find_by_id("b-1").unwrap().unwrap();
        assert_eq!(loaded.kind, "work_sites");
        assert_eq!(loaded.total_rows, 2);
        assert_eq!(loaded.errors, outcome.errors);
        assert!(repo.find_by_id("missing").unwrap().is_none());
    }

    #[test]
    fn test_list_recent_respects_limit() {
        let repo = repo();
        let outcome = ImportOutcome::default();
        for i in 0..3 {
            let batch =
                ImportBatch::from_outcome(format!("b-{}", i), "users", None, &outcome, 1);
            repo.insert(&batch).unwrap();
        }

        assert_eq!(repo.list_recent(2).unwrap().len(), 2);
        assert_eq!(repo.list_recent(10).unwrap().len(), 3);
    }
}
