// ==========================================
// 工地记录管理系统 - 导入类型定义
// ==========================================
// 职责: 每种实体类型 = 一份 EntityKindConfig（策略数据）
// - tag:             注册表标签
// - table:           目标存储表
// - required_fields: 必填列（按校验顺序）
// - natural_key:     upsert 匹配键（CSV 列名，与 table.key_columns() 一一对应）
// - resolve:         行 → 已解析记录（外键已替换为代理主键）
// 红线: resolve 只读存储，不做写入（分类 get-or-create 由 upsert 完成）
// ==========================================

pub mod activity;
pub mod daily_report;
pub mod equipment;
pub mod equipment_usage;
pub mod labor_log;
pub mod user_account;
pub mod work_site;

use crate::domain::{
    AccountRole, Activity, DailySiteReport, Equipment, EquipmentUsageLog, ImportRow, LaborLog,
    UserAccount, UserKey, WorkSite,
};
use crate::importer::error::{RowError, RowResult};
use crate::importer::field_mapper::FieldMapper;
use crate::repository::{SiteRecordStore, StoreTable};
use std::fmt;

/// 解析函数签名
pub type ResolveFn = fn(&dyn SiteRecordStore, &FieldMapper<'_>) -> RowResult<ResolvedRecord>;

// ==========================================
// EntityKind - 实体类型
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    WorkSite,
    Equipment,
    UserAccount,
    Activity,
    EquipmentUsageLog,
    LaborLog,
    DailySiteReport,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::WorkSite => "work site",
            EntityKind::Equipment => "equipment",
            EntityKind::UserAccount => "user account",
            EntityKind::Activity => "activity",
            EntityKind::EquipmentUsageLog => "equipment usage log",
            EntityKind::LaborLog => "labor log",
            EntityKind::DailySiteReport => "daily site report",
        };
        write!(f, "{}", name)
    }
}

// ==========================================
// EntityKindConfig - 单类型导入配置
// ==========================================
#[derive(Clone, Copy)]
pub struct EntityKindConfig {
    pub kind: EntityKind,
    pub table: StoreTable,
    pub tag: &'static str,
    pub required_fields: &'static [&'static str],
    pub natural_key: &'static [&'static str],
    pub resolve: ResolveFn,
}

impl fmt::Debug for EntityKindConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityKindConfig")
            .field("kind", &self.kind)
            .field("table", &self.table)
            .field("tag", &self.tag)
            .field("required_fields", &self.required_fields)
            .field("natural_key", &self.natural_key)
            .finish()
    }
}

impl EntityKindConfig {
    /// 行内非空自然键取值，如 "plate=ABC-1234"
    pub fn describe_key(&self, row: &ImportRow) -> String {
        self.natural_key
            .iter()
            .filter_map(|field| {
                row.get(*field)
                    .map(|value| value.trim())
                    .filter(|value| !value.is_empty())
                    .map(|value| format!("{}={}", field, value))
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

// ==========================================
// ResolvedRecord - 待 upsert 的记录
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedRecord {
    WorkSite(WorkSite),
    Equipment(Equipment),
    UserAccount {
        account: UserAccount,
        key: UserKey,
        password: Option<String>, // 明文，仅新建时哈希
    },
    Activity {
        activity: Activity,
        category_name: Option<String>,
    },
    EquipmentUsageLog(EquipmentUsageLog),
    LaborLog {
        log: LaborLog,
        attendee_ids: Option<Vec<i64>>, // None → 保持原出勤集合
    },
    DailySiteReport(DailySiteReport),
}

// ==========================================
// 引用解析辅助函数
// ==========================================

/// 必填工地引用
pub(crate) fn require_work_site(store: &dyn SiteRecordStore, code: &str) -> RowResult<i64> {
    store
        .find_work_site_by_code(code)?
        .map(|site| site.id)
        .ok_or_else(|| RowError::not_found("work site", code))
}

/// 可选工地引用（不存在 → None）
pub(crate) fn optional_work_site(
    store: &dyn SiteRecordStore,
    code: Option<&str>,
) -> RowResult<Option<i64>> {
    match code {
        Some(code) => Ok(store.find_work_site_by_code(code)?.map(|site| site.id)),
        None => Ok(None),
    }
}

/// 必填账号引用（按工号 + 角色）
pub(crate) fn require_badge_holder(
    store: &dyn SiteRecordStore,
    badge: &str,
    role: AccountRole,
) -> RowResult<i64> {
    store
        .find_user(&UserKey::Badge(badge.to_string()), Some(role))?
        .map(|user| user.id)
        .ok_or_else(|| RowError::not_found(role.to_db_str(), badge))
}

/// 可选账号引用（不存在或角色不符 → None）
pub(crate) fn optional_user(
    store: &dyn SiteRecordStore,
    key: Option<UserKey>,
    role: Option<AccountRole>,
) -> RowResult<Option<i64>> {
    match key {
        Some(key) => Ok(store.find_user(&key, role)?.map(|user| user.id)),
        None => Ok(None),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::domain::{
        AccountRole, Equipment, EquipmentStatus, ImportRow, SiteStatus, UserAccount, UserKey,
        WorkSite,
    };
    use crate::repository::{SiteRecordStore, SqliteSiteRecordStore};
    use chrono::NaiveDate;
    use rusqlite::Connection;
    use std::sync::{Arc, Mutex};

    pub fn store() -> SqliteSiteRecordStore {
        let conn = Connection::open_in_memory().unwrap();
        SqliteSiteRecordStore::from_connection(Arc::new(Mutex::new(conn))).unwrap()
    }

    pub fn row(pairs: &[(&str, &str)]) -> ImportRow {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    pub fn seed_user(store: &SqliteSiteRecordStore, badge: &str, role: AccountRole) -> i64 {
        let account = UserAccount {
            name: format!("User {}", badge),
            email: None,
            badge: Some(badge.to_string()),
            national_id: None,
            phone: None,
            role,
            job_function: "field".to_string(),
            title: None,
            password_hash: None,
        };
        store
            .upsert_user_account(account, &UserKey::Badge(badge.to_string()))
            .unwrap()
            .entity
            .id
    }

    pub fn seed_site(store: &SqliteSiteRecordStore, code: &str) -> i64 {
        let site = WorkSite {
            code: code.to_string(),
            name: format!("Site {}", code),
            location: "Lote 1".to_string(),
            start_km: 0.0,
            end_km: 12.0,
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            planned_end_date: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
            responsible_id: None,
            status: SiteStatus::InProgress,
        };
        store.upsert_work_site(site).unwrap().entity.id
    }

    pub fn seed_equipment(store: &SqliteSiteRecordStore, plate: &str) -> i64 {
        let equipment = Equipment {
            name: "Escavadeira".to_string(),
            category: "excavator".to_string(),
            model: "320D".to_string(),
            plate: plate.to_string(),
            manufacturer: "CAT".to_string(),
            year: 2019,
            meter_reading: 0.0,
            status: EquipmentStatus::Active,
            work_site_id: None,
            operator_id: None,
        };
        store.upsert_equipment(equipment).unwrap().entity.id
    }
}
