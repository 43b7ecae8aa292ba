// ==========================================
// 工地记录管理系统 - 导入结果领域模型
// ==========================================
// 职责: 行记录 / 行级错误 / 文件导入结果 / 导入批次审计
// 不变量: succeeded + failed_or_skipped == total_rows
//         created + updated == succeeded
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 解码后的一行（列名 → 原始值）
pub type ImportRow = HashMap<String, String>;

/// 第一条数据行的文件行号（表头为第 1 行）
pub const FIRST_DATA_ROW: usize = 2;

// ==========================================
// RowFailure - 行级错误
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowFailure {
    pub row: usize,      // 文件行号（含表头偏移）
    pub message: String, // 可读错误信息
}

// ==========================================
// ImportOutcome - 单文件导入结果
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportOutcome {
    pub succeeded: usize,
    pub failed_or_skipped: usize,
    pub total_rows: usize,
    pub created: usize,
    pub updated: usize,
    pub errors: Vec<RowFailure>,
}

impl ImportOutcome {
    /// 记录一行成功（按 upsert 路径区分新建/更新）
    pub fn record_success(&mut self, created: bool) {
        self.total_rows += 1;
        self.succeeded += 1;
        if created {
            self.created += 1;
        } else {
            self.updated += 1;
        }
    }

    /// 记录一行跳过（附错误信息）
    pub fn record_skip(&mut self, row: usize, message: impl Into<String>) {
        self.total_rows += 1;
        self.failed_or_skipped += 1;
        self.errors.push(RowFailure {
            row,
            message: message.into(),
        });
    }

    /// 是否全部成功
    pub fn is_clean(&self) -> bool {
        self.failed_or_skipped == 0
    }
}

// ==========================================
// ImportBatch - 导入批次审计记录
// ==========================================
// 对齐: import_batch 表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportBatch {
    pub batch_id: String,          // UUID
    pub kind: String,              // 导入类型标签
    pub file_name: Option<String>,
    pub total_rows: i64,
    pub succeeded: i64,
    pub failed_or_skipped: i64,
    pub created: i64,
    pub updated: i64,
    pub elapsed_ms: i64,
    pub errors: Vec<RowFailure>,   // 落库为 JSON
    pub imported_at: DateTime<Utc>,
}

impl ImportBatch {
    /// 由导入结果构造批次记录
    pub fn from_outcome(
        batch_id: String,
        kind: &str,
        file_name: Option<String>,
        outcome: &ImportOutcome,
        elapsed_ms: i64,
    ) -> Self {
        Self {
            batch_id,
            kind: kind.to_string(),
            file_name,
            total_rows: outcome.total_rows as i64,
            succeeded: outcome.succeeded as i64,
            failed_or_skipped: outcome.failed_or_skipped as i64,
            created: outcome.created as i64,
            updated: outcome.updated as i64,
            elapsed_ms,
            errors: outcome.errors.clone(),
            imported_at: Utc::now(),
        }
    }
}
