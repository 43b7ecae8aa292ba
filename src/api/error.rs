// ==========================================
// 工地记录管理系统 - API 层错误类型
// ==========================================
// 职责: 将导入层/仓储层错误转换为调用方可读的错误消息
// ==========================================

use crate::importer::error::ImportError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API 层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 输入错误
    // ==========================================
    #[error("unsupported import type: {0}")]
    UnsupportedKind(String),

    #[error("not found: {0}")]
    NotFound(String),

    // ==========================================
    // 导入错误
    // ==========================================
    #[error("import failed: {0}")]
    ImportError(String),

    #[error("configuration error: {0}")]
    ConfigError(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("database error: {0}")]
    DatabaseError(String),

    #[error("database connection failed: {0}")]
    DatabaseConnectionError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ==========================================
// 从 ImportError 转换
// ==========================================
impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::UnsupportedKind { .. } => ApiError::UnsupportedKind(err.to_string()),
            ImportError::ConfigError(msg) => ApiError::ConfigError(msg),
            other => ApiError::ImportError(other.to_string()),
        }
    }
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, key } => {
                ApiError::NotFound(format!("{} ({})", entity, key))
            }
            RepositoryError::DatabaseConnectionError(msg) => ApiError::DatabaseConnectionError(msg),
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("lock acquisition failed: {}", msg))
            }
            RepositoryError::Other(err) => ApiError::Other(err),
            other => ApiError::DatabaseError(other.to_string()),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
