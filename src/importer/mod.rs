// ==========================================
// 工地记录管理系统 - 导入层
// ==========================================
// 职责: CSV 批量导入（解码 → 校验 → 解析引用 → upsert → 汇总）
// 支持: 工地 / 设备 / 账号 / 作业项 / 设备使用记录 / 考勤记录 / 施工日报
// ==========================================

// 模块声明
pub mod coordinator;
pub mod credential;
pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod importer_trait;
pub mod kinds;
pub mod registry;
pub mod row_validator;
pub mod upserter;

// 重导出核心类型
pub use coordinator::ImportCoordinator;
pub use credential::{verify_credential, Argon2CredentialHasher};
pub use error::{ImportError, ImportResult, RowError, RowResult};
pub use field_mapper::{FieldFormats, FieldMapper};
pub use file_parser::CsvDecoder;
pub use kinds::{EntityKind, EntityKindConfig, ResolvedRecord};
pub use registry::{lookup, supported_tags};
pub use row_validator::validate_required;
pub use upserter::{RecordUpserter, UpsertReceipt};

// 重导出 Trait 接口
pub use importer_trait::{CredentialHasher, TabularDecoder};
