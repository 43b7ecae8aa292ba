// ==========================================
// 设备导入
// ==========================================
// 列: name,category,model,plate,manufacturer,year,
//     meter_reading,status,work_site_code,operator_badge
// 说明: 工地/操作员均为可选引用，找不到时留空
// ==========================================

use super::{optional_user, optional_work_site, EntityKind, EntityKindConfig, ResolvedRecord};
use crate::domain::{AccountRole, Equipment, EquipmentStatus, UserKey};
use crate::importer::error::RowResult;
use crate::importer::field_mapper::FieldMapper;
use crate::repository::{SiteRecordStore, StoreTable};

pub const CONFIG: EntityKindConfig = EntityKindConfig {
    kind: EntityKind::Equipment,
    table: StoreTable::Equipment,
    tag: "equipment",
    required_fields: &["name", "category", "model", "plate", "manufacturer", "year"],
    natural_key: &["plate"],
    resolve,
};

fn resolve(store: &dyn SiteRecordStore, mapper: &FieldMapper<'_>) -> RowResult<ResolvedRecord> {
    let work_site_id = optional_work_site(store, mapper.get_string("work_site_code").as_deref())?;
    let operator_id = optional_user(
        store,
        mapper.get_string("operator_badge").map(UserKey::Badge),
        Some(AccountRole::Driver),
    )?;

    Ok(ResolvedRecord::Equipment(Equipment {
        name: mapper.required_string("name")?,
        category: mapper.required_string("category")?,
        model: mapper.required_string("model")?,
        plate: mapper.required_string("plate")?,
        manufacturer: mapper.required_string("manufacturer")?,
        year: mapper.parse_i32("year")?,
        meter_reading: mapper.parse_optional_decimal("meter_reading")?.unwrap_or(0.0),
        status: mapper
            .parse_optional_enum("status", EquipmentStatus::from_str)?
            .unwrap_or_default(),
        work_site_id,
        operator_id,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importer::error::RowError;
    use crate::importer::field_mapper::FieldFormats;
    use crate::importer::kinds::test_support::{row, seed_site, seed_user, store};

    fn equipment_row(extra: &[(&str, &str)]) -> crate::domain::ImportRow {
        let mut r = row(&[
            ("name", "Escavadeira"),
            ("category", "excavator"),
            ("model", "320D"),
            ("plate", "ABC-1234"),
            ("manufacturer", "CAT"),
            ("year", "2019"),
        ]);
        for (k, v) in extra {
            r.insert(k.to_string(), v.to_string());
        }
        r
    }

    fn resolve_equipment(store: &dyn SiteRecordStore, r: &crate::domain::ImportRow) -> Equipment {
        let formats = FieldFormats::default();
        match resolve(store, &FieldMapper::new(r, &formats)).unwrap() {
            ResolvedRecord::Equipment(equipment) => equipment,
            other => panic!("unexpected record: {:?}", other),
        }
    }

    #[test]
    fn test_defaults_when_optional_columns_absent() {
        let store = store();
        let equipment = resolve_equipment(&store, &equipment_row(&[]));

        assert_eq!(equipment.meter_reading, 0.0);
        assert_eq!(equipment.status, EquipmentStatus::Active);
        assert!(equipment.work_site_id.is_none());
        assert!(equipment.operator_id.is_none());
    }

    #[test]
    fn test_resolves_site_and_driver() {
        let store = store();
        let site_id = seed_site(&store, "OB-001");
        let driver_id = seed_user(&store, "001234", AccountRole::Driver);

        let equipment = resolve_equipment(
            &store,
            &equipment_row(&[
                ("meter_reading", "1500,5"),
                ("status", "maintenance"),
                ("work_site_code", "OB-001"),
                ("operator_badge", "001234"),
            ]),
        );

        assert_eq!(equipment.meter_reading, 1500.5);
        assert_eq!(equipment.status, EquipmentStatus::Maintenance);
        assert_eq!(equipment.work_site_id, Some(site_id));
        assert_eq!(equipment.operator_id, Some(driver_id));
    }

    #[test]
    fn test_operator_with_other_role_is_left_unset() {
        let store = store();
        seed_user(&store, "009999", AccountRole::Recorder);

        let equipment =
            resolve_equipment(&store, &equipment_row(&[("operator_badge", "009999")]));
        assert!(equipment.operator_id.is_none());
    }

    #[test]
    fn test_invalid_year_fails() {
        let store = store();
        let formats = FieldFormats::default();
        let r = equipment_row(&[("year", "2019.5")]);

        assert!(matches!(
            resolve(&store, &FieldMapper::new(&r, &formats)),
            Err(RowError::InvalidInteger { .. })
        ));
    }
}
