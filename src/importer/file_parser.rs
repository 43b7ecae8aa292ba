// ==========================================
// 工地记录管理系统 - CSV 解码器实现
// ==========================================
// 职责: 字节 → 行记录（首行为表头）
// 编码: UTF-8 优先，失败回退 Latin-1（逐字节映射，不会失败）
// 表头去空白；单元格保持原值，由 FieldMapper 按字段决定是否去空白
// ==========================================

use crate::domain::ImportRow;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::importer_trait::TabularDecoder;
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

/// 字节解码为文本：UTF-8 → Latin-1 回退，并去除 BOM
fn decode_text(bytes: &[u8]) -> String {
    let text = match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(e) => {
            debug!(valid_up_to = e.valid_up_to(), "UTF-8 解码失败，回退 Latin-1");
            bytes.iter().map(|&b| char::from(b)).collect()
        }
    };

    match text.strip_prefix('\u{feff}') {
        Some(stripped) => stripped.to_string(),
        None => text,
    }
}

// ==========================================
// CsvDecoder 实现
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvDecoder;

impl TabularDecoder for CsvDecoder {
    fn decode(&self, bytes: &[u8]) -> ImportResult<Vec<ImportRow>> {
        let text = decode_text(bytes);
        if text.trim().is_empty() {
            return Err(ImportError::DecodeError("file is empty".to_string()));
        }

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // 允许行长度不一致
            .from_reader(text.as_bytes());

        // 读取表头
        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();
        if headers.iter().all(|h| h.is_empty()) {
            return Err(ImportError::DecodeError("missing header row".to_string()));
        }

        // 读取所有行（值全为空的行保留，由校验阶段报告；完全空的行由读取器跳过）
        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            let mut row: ImportRow = HashMap::with_capacity(headers.len());

            for (col_idx, value) in record.iter().enumerate() {
                if let Some(header) = headers.get(col_idx) {
                    if !header.is_empty() {
                        row.insert(header.clone(), value.to_string());
                    }
                }
            }

            rows.push(row);
        }

        debug!(columns = headers.len(), rows = rows.len(), "CSV 解码完成");
        Ok(rows)
    }

    fn decode_file(&self, path: &Path) -> ImportResult<Vec<ImportRow>> {
        // 检查文件存在
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }

        // 检查扩展名
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        if ext != "csv" {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let bytes = std::fs::read(path)?;
        self.decode(&bytes)
    }
}
