// ==========================================
// 工地记录管理系统 - 工地记录领域模型
// ==========================================
// 职责: 工地 / 设备 / 账号 / 作业项 / 设备使用记录 / 考勤记录 / 施工日报
// 用途: 导入层构造,仓储层持久化
// 红线: 外键以代理主键(id)表示,自然键在仓储层匹配
// ==========================================

use crate::domain::types::{AccountRole, EquipmentStatus, SiteStatus};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

// ==========================================
// Stored / Upserted - 持久化包装
// ==========================================

/// 已持久化实体（代理主键 + 记录内容）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stored<T> {
    pub id: i64,
    pub record: T,
}

/// Upsert 结果：实体 + 是否新建
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Upserted<T> {
    pub entity: Stored<T>,
    pub created: bool,
}

// ==========================================
// WorkSite - 工地
// ==========================================
// 自然键: code
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkSite {
    pub code: String,
    pub name: String,
    pub location: String,
    pub start_km: f64,
    pub end_km: f64,
    pub start_date: NaiveDate,
    pub planned_end_date: NaiveDate,
    pub responsible_id: Option<i64>, // 负责人（可选引用）
    pub status: SiteStatus,
}

// ==========================================
// Equipment - 设备
// ==========================================
// 自然键: plate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Equipment {
    pub name: String,
    pub category: String,
    pub model: String,
    pub plate: String,
    pub manufacturer: String,
    pub year: i32,
    pub meter_reading: f64,          // 当前小时计读数
    pub status: EquipmentStatus,
    pub work_site_id: Option<i64>,   // 所在工地（可选引用）
    pub operator_id: Option<i64>,    // 当前操作员（可选引用，角色 driver）
}

// ==========================================
// UserAccount - 账号
// ==========================================
// 自然键: admin → email；其他角色 → badge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserAccount {
    pub name: String,
    pub email: Option<String>,
    pub badge: Option<String>,       // 工号
    pub national_id: Option<String>,
    pub phone: Option<String>,
    pub role: AccountRole,
    pub job_function: String,
    pub title: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>, // Argon2 PHC 字符串，仅新建时写入
}

/// 账号自然键
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserKey {
    Email(String),
    Badge(String),
}

impl UserKey {
    /// 键值（用于日志与错误信息）
    pub fn value(&self) -> &str {
        match self {
            UserKey::Email(v) | UserKey::Badge(v) => v,
        }
    }
}

// ==========================================
// Activity - 作业项（计价清单项）
// ==========================================
// 自然键: code
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub code: String,
    pub description: String,
    pub unit: String,
    pub category_id: Option<i64>, // 分类（按名称 get-or-create）
    pub unit_price: f64,
    pub work_site_id: i64,        // 所属工地（必填引用）
    pub active: bool,
}

// ==========================================
// EquipmentUsageLog - 设备使用记录
// ==========================================
// 自然键: (equipment_id, date)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentUsageLog {
    pub equipment_id: i64,
    pub operator_id: i64,
    pub date: NaiveDate,
    pub meter_start: f64,
    pub meter_end: f64,
    pub time_start: NaiveTime,
    pub time_end: NaiveTime,
    pub primary_activity: String,
    pub location: String,
    pub notes: String,
}

// ==========================================
// LaborLog - 考勤记录
// ==========================================
// 自然键: (recorder_id, work_site_id, date)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaborLog {
    pub recorder_id: i64,
    pub work_site_id: i64,
    pub date: NaiveDate,
    pub headcount: i32,
    pub time_start: NaiveTime,
    pub time_end: NaiveTime,
    pub location: String,
    pub notes: String,
}

// ==========================================
// DailySiteReport - 施工日报
// ==========================================
// 自然键: (work_site_id, date, supervisor_id)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySiteReport {
    pub supervisor_id: i64,
    pub work_site_id: i64,
    pub date: NaiveDate,
    pub headcount: i32,
    pub present_count: i32,
    pub activities_completed: i32,
    pub activities_partial: i32,
    pub weather: String,
    pub notes: String,
}
