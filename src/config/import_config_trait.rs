// ==========================================
// 工地记录管理系统 - 导入配置读取 Trait
// ==========================================
// 职责: 定义导入模块所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use std::error::Error;

/// 默认日期格式（DD/MM/YYYY）
pub const DEFAULT_DATE_FORMAT: &str = "%d/%m/%Y";
/// 默认时间格式（24 小时制 HH:MM）
pub const DEFAULT_TIME_FORMAT: &str = "%H:%M";
/// 默认多值列表分隔符
pub const DEFAULT_LIST_SEPARATOR: &str = ";";

// ==========================================
// ImportConfigReader Trait
// ==========================================
// 用途: 导入模块所需的配置读取接口
// 实现者: ConfigManager（从 config_kv 表读取）, DefaultImportConfig（内置默认值）
pub trait ImportConfigReader: Send + Sync {
    /// 日期列解析格式（chrono 格式串）
    ///
    /// # 默认值
    /// - %d/%m/%Y
    fn get_date_format(&self) -> Result<String, Box<dyn Error>>;

    /// 时间列解析格式（chrono 格式串）
    ///
    /// # 默认值
    /// - %H:%M
    fn get_time_format(&self) -> Result<String, Box<dyn Error>>;

    /// 多值引用列的分隔符
    ///
    /// # 默认值
    /// - ;
    fn get_list_separator(&self) -> Result<String, Box<dyn Error>>;

    /// 是否记录导入批次审计
    ///
    /// # 默认值
    /// - true
    fn get_record_batches(&self) -> Result<bool, Box<dyn Error>>;
}

// ==========================================
// DefaultImportConfig - 内置默认值
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultImportConfig;

impl ImportConfigReader for DefaultImportConfig {
    fn get_date_format(&self) -> Result<String, Box<dyn Error>> {
        Ok(DEFAULT_DATE_FORMAT.to_string())
    }

    fn get_time_format(&self) -> Result<String, Box<dyn Error>> {
        Ok(DEFAULT_TIME_FORMAT.to_string())
    }

    fn get_list_separator(&self) -> Result<String, Box<dyn Error>> {
        Ok(DEFAULT_LIST_SEPARATOR.to_string())
    }

    fn get_record_batches(&self) -> Result<bool, Box<dyn Error>> {
        Ok(true)
    }
}
