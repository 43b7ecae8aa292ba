// ==========================================
// 工地导入
// ==========================================
// 列: code,name,location,start_km,end_km,start_date,planned_end_date,
//     responsible_email,status
// ==========================================

use super::{optional_user, EntityKind, EntityKindConfig, ResolvedRecord};
use crate::domain::{SiteStatus, UserKey, WorkSite};
use crate::importer::error::RowResult;
use crate::importer::field_mapper::FieldMapper;
use crate::repository::{SiteRecordStore, StoreTable};

pub const CONFIG: EntityKindConfig = EntityKindConfig {
    kind: EntityKind::WorkSite,
    table: StoreTable::WorkSite,
    tag: "work_sites",
    required_fields: &[
        "code",
        "name",
        "location",
        "start_km",
        "end_km",
        "start_date",
        "planned_end_date",
    ],
    natural_key: &["code"],
    resolve,
};

fn resolve(store: &dyn SiteRecordStore, mapper: &FieldMapper<'_>) -> RowResult<ResolvedRecord> {
    let responsible_id = optional_user(
        store,
        mapper.get_string("responsible_email").map(UserKey::Email),
        None,
    )?;

    Ok(ResolvedRecord::WorkSite(WorkSite {
        code: mapper.required_string("code")?,
        name: mapper.required_string("name")?,
        location: mapper.required_string("location")?,
        start_km: mapper.parse_decimal("start_km")?,
        end_km: mapper.parse_decimal("end_km")?,
        start_date: mapper.parse_date("start_date")?,
        planned_end_date: mapper.parse_date("planned_end_date")?,
        responsible_id,
        status: mapper
            .parse_optional_enum("status", SiteStatus::from_str)?
            .unwrap_or_default(),
    }))
}
