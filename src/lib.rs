// ==========================================
// 工地记录管理系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 工地记录 CSV 批量导入（工地 / 设备 / 账号 / 作业项 / 日志类记录）
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 导入层 - 外部数据
pub mod importer;

// 配置层 - 导入配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{AccountRole, EquipmentStatus, SiteStatus};

// 领域实体
pub use domain::{
    Activity, DailySiteReport, Equipment, EquipmentUsageLog, ImportBatch, ImportOutcome,
    LaborLog, RowFailure, UserAccount, WorkSite,
};

// 导入层
pub use importer::{ImportCoordinator, ImportError, RowError};

// API
pub use api::{ApiError, ImportApi, ImportReport};

// ==========================================
// 版本信息
// ==========================================
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const SYSTEM_NAME: &str = "工地记录管理系统";
