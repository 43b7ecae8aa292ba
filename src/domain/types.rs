// ==========================================
// 工地记录管理系统 - 领域类型定义
// ==========================================
// 职责: 账号角色 / 工地状态 / 设备状态
// 存储格式: 小写 snake_case (与数据库一致)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 账号角色 (Account Role)
// ==========================================
// admin 以邮箱为自然键，其余角色以工号(badge)为自然键
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountRole {
    Admin,      // 管理员
    Recorder,   // 记录员(考勤/设备登记)
    Supervisor, // 工长
    Driver,     // 司机/设备操作员
}

impl AccountRole {
    /// 从字符串解析（大小写不敏感）
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Some(AccountRole::Admin),
            "recorder" => Some(AccountRole::Recorder),
            "supervisor" => Some(AccountRole::Supervisor),
            "driver" => Some(AccountRole::Driver),
            _ => None,
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            AccountRole::Admin => "admin",
            AccountRole::Recorder => "recorder",
            AccountRole::Supervisor => "supervisor",
            AccountRole::Driver => "driver",
        }
    }
}

impl fmt::Display for AccountRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// 工地状态 (Work Site Status)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SiteStatus {
    #[default]
    Planning,   // 规划中
    InProgress, // 施工中
    Paused,     // 暂停
    Completed,  // 已完工
}

impl SiteStatus {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "planning" => Some(SiteStatus::Planning),
            "in_progress" => Some(SiteStatus::InProgress),
            "paused" => Some(SiteStatus::Paused),
            "completed" => Some(SiteStatus::Completed),
            _ => None,
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            SiteStatus::Planning => "planning",
            SiteStatus::InProgress => "in_progress",
            SiteStatus::Paused => "paused",
            SiteStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for SiteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// 设备状态 (Equipment Status)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentStatus {
    #[default]
    Active,      // 在用
    Maintenance, // 维修中
    Inactive,    // 停用
}

impl EquipmentStatus {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "active" => Some(EquipmentStatus::Active),
            "maintenance" => Some(EquipmentStatus::Maintenance),
            "inactive" => Some(EquipmentStatus::Inactive),
            _ => None,
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            EquipmentStatus::Active => "active",
            EquipmentStatus::Maintenance => "maintenance",
            EquipmentStatus::Inactive => "inactive",
        }
    }
}

impl fmt::Display for EquipmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_role_round_trip_and_case() {
        assert_eq!(AccountRole::from_str("Driver"), Some(AccountRole::Driver));
        assert_eq!(AccountRole::from_str(" admin "), Some(AccountRole::Admin));
        assert_eq!(AccountRole::from_str("foreman"), None);
        assert_eq!(AccountRole::Supervisor.to_db_str(), "supervisor");
    }

    #[test]
    fn test_status_defaults() {
        assert_eq!(SiteStatus::default(), SiteStatus::Planning);
        assert_eq!(EquipmentStatus::default(), EquipmentStatus::Active);
        assert_eq!(SiteStatus::from_str("in_progress"), Some(SiteStatus::InProgress));
        assert_eq!(EquipmentStatus::from_str("broken"), None);
    }
}
