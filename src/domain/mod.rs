// ==========================================
// 工地记录管理系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型、导入结果
// 红线: 不含数据访问逻辑,不含导入逻辑
// ==========================================

pub mod import;
pub mod site;
pub mod types;

// 重导出核心类型
pub use import::{ImportBatch, ImportOutcome, ImportRow, RowFailure, FIRST_DATA_ROW};
pub use site::{
    Activity, DailySiteReport, Equipment, EquipmentUsageLog, LaborLog, Stored, Upserted,
    UserAccount, UserKey, WorkSite,
};
pub use types::{AccountRole, EquipmentStatus, SiteStatus};
