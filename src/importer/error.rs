// ==========================================
// 工地记录管理系统 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 分层:
// - ImportError: 文件级错误（处理不开始，直接返回调用方）
// - RowError:    行级错误（记录到结果中，批次继续）
// ==========================================

use crate::repository::RepositoryError;
use thiserror::Error;

/// 文件级导入错误
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件相关错误 =====
    #[error("file not found: {0}")]
    FileNotFound(String),

    #[error("unsupported file format: {0} (only .csv is accepted)")]
    UnsupportedFormat(String),

    #[error("failed to read file: {0}")]
    FileReadError(String),

    #[error("failed to decode CSV: {0}")]
    DecodeError(String),

    // ===== 注册表错误 =====
    #[error("unsupported import type: {tag} (valid types: {valid})")]
    UnsupportedKind { tag: String, valid: String },

    // ===== 配置错误 =====
    #[error("failed to read import configuration: {0}")]
    ConfigError(String),
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::DecodeError(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;

/// 行级错误（Display 即写入结果的错误信息）
#[derive(Error, Debug)]
pub enum RowError {
    // ===== 校验错误 =====
    #[error("missing required field: {0}")]
    MissingField(String),

    // ===== 引用解析错误 =====
    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    // ===== 类型转换错误 =====
    #[error("invalid number in field {field}: {value}")]
    InvalidNumber { field: String, value: String },

    #[error("invalid integer in field {field}: {value}")]
    InvalidInteger { field: String, value: String },

    #[error("invalid date in field {field}: {value} (expected {format})")]
    InvalidDate {
        field: String,
        value: String,
        format: String,
    },

    #[error("invalid time in field {field}: {value} (expected {format})")]
    InvalidTime {
        field: String,
        value: String,
        format: String,
    },

    #[error("invalid value in field {field}: {value}")]
    InvalidValue { field: String, value: String },

    // ===== 业务规则错误 =====
    #[error("{0}")]
    Rule(String),

    #[error("failed to hash credential: {0}")]
    Credential(String),

    // ===== 存储错误 =====
    #[error("{0}")]
    Storage(#[from] RepositoryError),
}

impl RowError {
    /// 引用实体不存在
    pub fn not_found(entity: &'static str, key: impl Into<String>) -> Self {
        RowError::NotFound {
            entity,
            key: key.into(),
        }
    }
}

/// 行级 Result 类型别名
pub type RowResult<T> = Result<T, RowError>;
