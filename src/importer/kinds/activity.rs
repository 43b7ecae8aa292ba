// ==========================================
// 作业项导入
// ==========================================
// 列: code,description,unit,category_name,unit_price,work_site_code,active
// ==========================================

use super::{require_work_site, EntityKind, EntityKindConfig, ResolvedRecord};
use crate::domain::Activity;
use crate::importer::error::RowResult;
use crate::importer::field_mapper::FieldMapper;
use crate::repository::{SiteRecordStore, StoreTable};

pub const CONFIG: EntityKindConfig = EntityKindConfig {
    kind: EntityKind::Activity,
    table: StoreTable::Activity,
    tag: "activities",
    required_fields: &["code", "description", "unit", "unit_price", "work_site_code"],
    natural_key: &["code"],
    resolve,
};

fn resolve(store: &dyn SiteRecordStore, mapper: &FieldMapper<'_>) -> RowResult<ResolvedRecord> {
    let work_site_id = require_work_site(store, &mapper.required_string("work_site_code")?)?;

    Ok(ResolvedRecord::Activity {
        activity: Activity {
            code: mapper.required_string("code")?,
            description: mapper.required_string("description")?,
            unit: mapper.required_string("unit")?,
            category_id: None,
            unit_price: mapper.parse_decimal("unit_price")?,
            work_site_id,
            active: mapper.parse_flag("active")?.unwrap_or(true),
        },
        category_name: mapper.get_string("category_name"),
    })
}
