// ==========================================
// 设备使用记录导入
// ==========================================
// 列: equipment_plate,operator_badge,date,meter_start,meter_end,
//     time_start,time_end,primary_activity,location,notes
// 自然键: (设备, 日期)
// ==========================================

use super::{require_badge_holder, EntityKind, EntityKindConfig, ResolvedRecord};
use crate::domain::{AccountRole, EquipmentUsageLog};
use crate::importer::error::{RowError, RowResult};
use crate::importer::field_mapper::FieldMapper;
use crate::repository::{SiteRecordStore, StoreTable};

pub const CONFIG: EntityKindConfig = EntityKindConfig {
    kind: EntityKind::EquipmentUsageLog,
    table: StoreTable::EquipmentUsageLog,
    tag: "equipment_usage_logs",
    required_fields: &[
        "equipment_plate",
        "operator_badge",
        "date",
        "meter_start",
        "meter_end",
        "time_start",
        "time_end",
        "primary_activity",
        "location",
    ],
    natural_key: &["equipment_plate", "date"],
    resolve,
};

fn resolve(store: &dyn SiteRecordStore, mapper: &FieldMapper<'_>) -> RowResult<ResolvedRecord> {
    let plate = mapper.required_string("equipment_plate")?;
    let equipment_id = store
        .find_equipment_by_plate(&plate)?
        .map(|equipment| equipment.id)
        .ok_or_else(|| RowError::not_found("equipment", plate.as_str()))?;

    let operator_id = require_badge_holder(
        store,
        &mapper.required_string("operator_badge")?,
        AccountRole::Driver,
    )?;

    Ok(ResolvedRecord::EquipmentUsageLog(EquipmentUsageLog {
        equipment_id,
        operator_id,
        date: mapper.parse_date("date")?,
        meter_start: mapper.parse_decimal("meter_start")?,
        meter_end: mapper.parse_decimal("meter_end")?,
        time_start: mapper.parse_time("time_start")?,
        time_end: mapper.parse_time("time_end")?,
        primary_activity: mapper.required_string("primary_activity")?,
        location: mapper.required_string("location")?,
        notes: mapper.text_or_empty("notes"),
    }))
}
