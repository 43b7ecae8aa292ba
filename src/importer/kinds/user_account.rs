// ==========================================
// 账号导入
// ==========================================
// 列: name,email,badge,national_id,phone,account_role,job_function,title,password
// 自然键: admin → email；其他角色 → badge
// ==========================================

use super::{EntityKind, EntityKindConfig, ResolvedRecord};
use crate::domain::{AccountRole, UserAccount, UserKey};
use crate::importer::error::{RowError, RowResult};
use crate::importer::field_mapper::FieldMapper;
use crate::repository::{SiteRecordStore, StoreTable};

pub const CONFIG: EntityKindConfig = EntityKindConfig {
    kind: EntityKind::UserAccount,
    table: StoreTable::UserAccount,
    tag: "users",
    required_fields: &["name", "account_role", "job_function"],
    // 二选一: admin 按 email，其他角色按 badge
    natural_key: &["email", "badge"],
    resolve,
};

fn resolve(_store: &dyn SiteRecordStore, mapper: &FieldMapper<'_>) -> RowResult<ResolvedRecord> {
    let role = mapper
        .parse_optional_enum("account_role", AccountRole::from_str)?
        .ok_or_else(|| RowError::MissingField("account_role".to_string()))?;

    let email = mapper.get_string("email");
    let badge = mapper.get_string("badge");

    let key = match role {
        AccountRole::Admin => email
            .clone()
            .map(UserKey::Email)
            .ok_or_else(|| RowError::Rule("admin account requires email".to_string()))?,
        other => badge
            .clone()
            .map(UserKey::Badge)
            .ok_or_else(|| RowError::Rule(format!("{} account requires badge", other)))?,
    };

    Ok(ResolvedRecord::UserAccount {
        account: UserAccount {
            name: mapper.required_string("name")?,
            email,
            badge,
            national_id: mapper.get_string("national_id"),
            phone: mapper.get_string("phone"),
            role,
            job_function: mapper.required_string("job_function")?,
            title: mapper.get_string("title"),
            password_hash: None,
        },
        key,
        password: mapper.raw_string("password"),
    })
}
