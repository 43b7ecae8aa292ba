// ==========================================
// 工地记录管理系统 - 配置层
// ==========================================
// 职责: 导入格式与开关配置（config_kv 覆写 + 内置默认值）
// ==========================================

pub mod config_manager;
pub mod import_config_trait;

pub use config_manager::ConfigManager;
pub use import_config_trait::{DefaultImportConfig, ImportConfigReader};
