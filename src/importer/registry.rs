// ==========================================
// 工地记录管理系统 - 导入类型注册表
// ==========================================
// 职责: 标签 → EntityKindConfig 的静态映射
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use crate::importer::kinds::{
    activity, daily_report, equipment, equipment_usage, labor_log, user_account, work_site,
    EntityKindConfig,
};

/// 已注册的导入类型（顺序即对外展示顺序）
pub static KIND_CONFIGS: [EntityKindConfig; 7] = [
    work_site::CONFIG,
    equipment::CONFIG,
    user_account::CONFIG,
    activity::CONFIG,
    equipment_usage::CONFIG,
    labor_log::CONFIG,
    daily_report::CONFIG,
];

/// 按标签查找导入类型
///
/// # 返回
/// - Err(UnsupportedKind): 未知标签（错误信息列出全部有效标签）
pub fn lookup(tag: &str) -> ImportResult<&'static EntityKindConfig> {
    KIND_CONFIGS
        .iter()
        .find(|config| config.tag == tag)
        .ok_or_else(|| ImportError::UnsupportedKind {
            tag: tag.to_string(),
            valid: supported_tags().join(", "),
        })
}

/// 全部有效标签
pub fn supported_tags() -> Vec<&'static str> {
    KIND_CONFIGS.iter().map(|config| config.tag).collect()
}
