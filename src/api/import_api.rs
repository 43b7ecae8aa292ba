// ==========================================
// 工地记录导入 API
// ==========================================
// 职责: 封装导入协调器 + 导入批次日志
// 说明: 批次日志写入失败只记录警告，不影响导入结果
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::{ConfigManager, ImportConfigReader};
use crate::domain::{ImportBatch, ImportOutcome};
use crate::importer::{registry, ImportCoordinator};
use crate::repository::{ImportBatchRepository, SqliteSiteRecordStore};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};
use uuid::Uuid;

/// 导入 API 响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportReport {
    /// 批次 ID
    pub batch_id: String,
    /// 导入类型标签
    pub kind: String,
    /// 源文件名
    pub file_name: Option<String>,
    /// 导入耗时（毫秒）
    pub elapsed_ms: i64,
    /// 导入结果
    #[serde(flatten)]
    pub outcome: ImportOutcome,
}

/// 导入 API
pub struct ImportApi {
    coordinator: ImportCoordinator<SqliteSiteRecordStore, ConfigManager>,
    batch_repo: ImportBatchRepository,
}

impl ImportApi {
    /// 打开数据库（不存在则创建）并初始化表结构
    pub fn new(db_path: &str) -> ApiResult<Self> {
        let store = SqliteSiteRecordStore::new(db_path)?;
        Self::from_store(store)
    }

    /// 基于已有存储创建（配置与批次日志共享同一连接）
    pub fn from_store(store: SqliteSiteRecordStore) -> ApiResult<Self> {
        let conn = store.connection();
        let config = ConfigManager::from_connection(Arc::clone(&conn))
            .map_err(|e| ApiError::ConfigError(e.to_string()))?;
        let batch_repo = ImportBatchRepository::from_connection(conn)?;

        Ok(Self {
            coordinator: ImportCoordinator::with_defaults(store, config),
            batch_repo,
        })
    }

    /// 导入 CSV 文件
    ///
    /// # 参数
    /// - tag: 导入类型标签（如 "work_sites"）
    /// - path: CSV 文件路径
    ///
    /// # 返回
    /// - Ok(ImportReport): 导入结果（可能含行级错误）
    /// - Err(ApiError): 文件级错误
    pub fn import_file(&self, tag: &str, path: &Path) -> ApiResult<ImportReport> {
        let start_time = Instant::now();
        let outcome = self.coordinator.import_file(tag, path)?;
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .map(str::to_string);
        Ok(self.finish(tag, file_name, outcome, start_time))
    }

    /// 导入内存中的 CSV 内容（如上传文件）
    pub fn import_bytes(
        &self,
        tag: &str,
        file_name: Option<&str>,
        bytes: &[u8],
    ) -> ApiResult<ImportReport> {
        let start_time = Instant::now();
        let outcome = self.coordinator.import_bytes(tag, bytes)?;
        Ok(self.finish(tag, file_name.map(str::to_string), outcome, start_time))
    }

    /// 支持的导入类型标签
    pub fn supported_kinds(&self) -> Vec<&'static str> {
        registry::supported_tags()
    }

    /// 最近的导入批次（新→旧）
    pub fn list_batches(&self, limit: usize) -> ApiResult<Vec<ImportBatch>> {
        Ok(self.batch_repo.list_recent(limit)?)
    }

    /// 按批次 ID 查询
    pub fn get_batch(&self, batch_id: &str) -> ApiResult<ImportBatch> {
        self.batch_repo
            .find_by_id(batch_id)?
            .ok_or_else(|| ApiError::NotFound(format!("import batch {}", batch_id)))
    }

    /// 配置管理器（用于覆写导入格式）
    pub fn config(&self) -> &ConfigManager {
        self.coordinator.config()
    }

    /// 底层记录存储
    pub fn store(&self) -> &SqliteSiteRecordStore {
        self.coordinator.store()
    }

    fn finish(
        &self,
        tag: &str,
        file_name: Option<String>,
        outcome: ImportOutcome,
        start_time: Instant,
    ) -> ImportReport {
        let batch_id = Uuid::new_v4().to_string();
        let elapsed_ms = start_time.elapsed().as_millis() as i64;

        let record_batches = self.config().get_record_batches().unwrap_or_else(|e| {
            warn!(error = %e, "读取批次日志开关失败，按默认开启处理");
            true
        });
        if record_batches {
            let batch =
                ImportBatch::from_outcome(batch_id.clone(), tag, file_name.clone(), &outcome, elapsed_ms);
            if let Err(e) = self.batch_repo.insert(&batch) {
                warn!(batch_id = %batch_id, error = %e, "导入批次日志写入失败");
            }
        }

        info!(
            batch_id = %batch_id,
            tag = tag,
            succeeded = outcome.succeeded,
            failed_or_skipped = outcome.failed_or_skipped,
            elapsed_ms = elapsed_ms,
            "导入批次完成"
        );

        ImportReport {
            batch_id,
            kind: tag.to_string(),
            file_name,
            elapsed_ms,
            outcome,
        }
    }
}
