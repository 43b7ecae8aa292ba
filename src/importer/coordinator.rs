// ==========================================
// 工地记录管理系统 - 导入协调器
// ==========================================
// 职责: 整合导入流程，从字节/文件到数据库
// 流程: 查注册表 → 读格式配置 → 解码 → 逐行(校验 → 解析 → 写入 → 记录) → 汇总
// 红线: 文件级错误直接返回；行级错误记录后继续下一行
// 红线: 每行一个独立写入，无文件级事务
// ==========================================

use crate::config::ImportConfigReader;
use crate::domain::{ImportOutcome, ImportRow, FIRST_DATA_ROW};
use crate::importer::credential::Argon2CredentialHasher;
use crate::importer::error::{ImportError, ImportResult, RowResult};
use crate::importer::field_mapper::{FieldFormats, FieldMapper};
use crate::importer::file_parser::CsvDecoder;
use crate::importer::importer_trait::TabularDecoder;
use crate::importer::kinds::EntityKindConfig;
use crate::importer::registry;
use crate::importer::row_validator::validate_required;
use crate::importer::upserter::{RecordUpserter, UpsertReceipt};
use crate::repository::SiteRecordStore;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};

// ==========================================
// ImportCoordinator - 导入协调器
// ==========================================
pub struct ImportCoordinator<S, C>
where
    S: SiteRecordStore,
    C: ImportConfigReader,
{
    // 数据访问层
    store: S,

    // 配置读取器
    config: C,

    // 导入组件
    decoder: Box<dyn TabularDecoder>,
    upserter: RecordUpserter,
}

impl<S, C> ImportCoordinator<S, C>
where
    S: SiteRecordStore,
    C: ImportConfigReader,
{
    /// 创建协调器
    ///
    /// # 参数
    /// - store: 记录存储
    /// - config: 配置读取器
    /// - decoder: 文件解码器
    /// - upserter: 记录写入器
    pub fn new(store: S, config: C, decoder: Box<dyn TabularDecoder>, upserter: RecordUpserter) -> Self {
        Self {
            store,
            config,
            decoder,
            upserter,
        }
    }

    /// 使用默认组件创建（CSV 解码 + Argon2 哈希）
    pub fn with_defaults(store: S, config: C) -> Self {
        Self::new(
            store,
            config,
            Box::new(CsvDecoder),
            RecordUpserter::new(Box::new(Argon2CredentialHasher)),
        )
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &C {
        &self.config
    }

    /// 按标签导入字节内容
    ///
    /// # 返回
    /// - Ok(ImportOutcome): 处理完成（可能含行级错误）
    /// - Err(UnsupportedKind / ConfigError / DecodeError): 文件级错误，未处理任何行
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub fn import_bytes(&self, tag: &str, bytes: &[u8]) -> ImportResult<ImportOutcome> {
        let kind = registry::lookup(tag)?;
        self.import_with_config(kind, bytes)
    }

    /// 按标签导入 CSV 文件
    #[instrument(skip(self, path), fields(path = %path.display()))]
    pub fn import_file(&self, tag: &str, path: &Path) -> ImportResult<ImportOutcome> {
        let kind = registry::lookup(tag)?;
        let formats = self.field_formats()?;
        let rows = self.decoder.decode_file(path).map_err(|e| {
            error!(error = %e, "文件解码失败");
            e
        })?;
        Ok(self.process_rows(kind, &formats, &rows))
    }

    /// 按给定类型配置导入字节内容
    pub fn import_with_config(
        &self,
        kind: &EntityKindConfig,
        bytes: &[u8],
    ) -> ImportResult<ImportOutcome> {
        let formats = self.field_formats()?;
        let rows = self.decoder.decode(bytes).map_err(|e| {
            error!(tag = kind.tag, error = %e, "文件解码失败");
            e
        })?;
        Ok(self.process_rows(kind, &formats, &rows))
    }

    fn field_formats(&self) -> ImportResult<FieldFormats> {
        FieldFormats::from_config(&self.config)
            .map_err(|e| ImportError::ConfigError(e.to_string()))
    }

    /// 逐行处理（按文件顺序，行号含表头偏移）
    fn process_rows(
        &self,
        kind: &EntityKindConfig,
        formats: &FieldFormats,
        rows: &[ImportRow],
    ) -> ImportOutcome {
        let start_time = Instant::now();
        info!(
            tag = kind.tag,
            kind = %kind.kind,
            total_rows = rows.len(),
            "开始导入"
        );

        let mut outcome = ImportOutcome::default();
        for (idx, row) in rows.iter().enumerate() {
            let row_number = idx + FIRST_DATA_ROW;
            let key = kind.describe_key(row);
            match self.process_row(kind, formats, row) {
                Ok(receipt) => {
                    debug!(
                        row = row_number,
                        key = %key,
                        entity_id = receipt.entity_id,
                        created = receipt.created,
                        "行导入成功"
                    );
                    outcome.record_success(receipt.created);
                }
                Err(e) => {
                    warn!(row = row_number, key = %key, error = %e, "行跳过");
                    outcome.record_skip(row_number, e.to_string());
                }
            }
        }

        info!(
            tag = kind.tag,
            succeeded = outcome.succeeded,
            failed_or_skipped = outcome.failed_or_skipped,
            created = outcome.created,
            updated = outcome.updated,
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "导入完成"
        );
        outcome
    }

    fn process_row(
        &self,
        kind: &EntityKindConfig,
        formats: &FieldFormats,
        row: &ImportRow,
    ) -> RowResult<UpsertReceipt> {
        validate_required(row, kind.required_fields)?;
        let mapper = FieldMapper::new(row, formats);
        let record = (kind.resolve)(&self.store, &mapper)?;
        self.upserter.upsert(&self.store, record)
    }
}
