// ==========================================
// 工地记录管理系统 - API 层
// ==========================================
// 职责: 对外业务接口（CLI / 上层服务调用）
// ==========================================

pub mod error;
pub mod import_api;

pub use error::{ApiError, ApiResult};
pub use import_api::{ImportApi, ImportReport};
