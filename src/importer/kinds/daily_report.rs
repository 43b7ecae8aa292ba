// ==========================================
// 施工日报导入
// ==========================================
// 列: supervisor_badge,work_site_code,date,headcount,present_count,
//     activities_completed,activities_partial,weather,notes
// 自然键: (工地, 日期, 负责人)
// ==========================================

use super::{require_badge_holder, require_work_site, EntityKind, EntityKindConfig, ResolvedRecord};
use crate::domain::{AccountRole, DailySiteReport};
use crate::importer::error::RowResult;
use crate::importer::field_mapper::FieldMapper;
use crate::repository::{SiteRecordStore, StoreTable};

pub const CONFIG: EntityKindConfig = EntityKindConfig {
    kind: EntityKind::DailySiteReport,
    table: StoreTable::DailySiteReport,
    tag: "daily_site_reports",
    required_fields: &[
        "supervisor_badge",
        "work_site_code",
        "date",
        "headcount",
        "present_count",
        "weather",
        "notes",
    ],
    natural_key: &["work_site_code", "date", "supervisor_badge"],
    resolve,
};

fn resolve(store: &dyn SiteRecordStore, mapper: &FieldMapper<'_>) -> RowResult<ResolvedRecord> {
    let supervisor_id = require_badge_holder(
        store,
        &mapper.required_string("supervisor_badge")?,
        AccountRole::Supervisor,
    )?;
    let work_site_id = require_work_site(store, &mapper.required_string("work_site_code")?)?;

    Ok(ResolvedRecord::DailySiteReport(DailySiteReport {
        supervisor_id,
        work_site_id,
        date: mapper.parse_date("date")?,
        headcount: mapper.parse_i32("headcount")?,
        present_count: mapper.parse_i32("present_count")?,
        activities_completed: mapper.parse_optional_i32("activities_completed")?.unwrap_or(0),
        activities_partial: mapper.parse_optional_i32("activities_partial")?.unwrap_or(0),
        weather: mapper.required_string("weather")?,
        notes: mapper.required_string("notes")?,
    }))
}
