// ==========================================
// 工地记录管理系统 - 行校验器
// ==========================================
// 职责: 必填字段校验（按声明顺序，遇到第一个缺失即返回）
// 规则: 列不存在 与 值为空白 等价，均视为缺失
// ==========================================

use crate::domain::ImportRow;
use crate::importer::error::RowError;

/// 校验必填字段
///
/// # 返回
/// - Ok(()): 全部存在且非空白
/// - Err(MissingField): 第一个缺失字段
pub fn validate_required(row: &ImportRow, required_fields: &[&str]) -> Result<(), RowError> {
    for field in required_fields {
        let present = row
            .get(*field)
            .map(|value| !value.trim().is_empty())
            .unwrap_or(false);
        if !present {
            return Err(RowError::MissingField((*field).to_string()));
        }
    }
    Ok(())
}
