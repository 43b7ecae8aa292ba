// ==========================================
// 考勤记录导入
// ==========================================
// 列: recorder_badge,work_site_code,date,headcount,time_start,time_end,
//     location,notes,attendee_badges
// 自然键: (记录员, 工地, 日期)
// 出勤人员: attendee_badges 非空 → 替换集合（无法解析的工号丢弃）；
//           为空或缺列 → 保持原集合
// ==========================================

use super::{require_badge_holder, require_work_site, EntityKind, EntityKindConfig, ResolvedRecord};
use crate::domain::{AccountRole, LaborLog};
use crate::importer::error::RowResult;
use crate::importer::field_mapper::FieldMapper;
use crate::repository::{SiteRecordStore, StoreTable};

pub const CONFIG: EntityKindConfig = EntityKindConfig {
    kind: EntityKind::LaborLog,
    table: StoreTable::LaborLog,
    tag: "labor_logs",
    required_fields: &[
        "recorder_badge",
        "work_site_code",
        "date",
        "headcount",
        "time_start",
        "time_end",
        "location",
    ],
    natural_key: &["recorder_badge", "work_site_code", "date"],
    resolve,
};

fn resolve(store: &dyn SiteRecordStore, mapper: &FieldMapper<'_>) -> RowResult<ResolvedRecord> {
    let recorder_id = require_badge_holder(
        store,
        &mapper.required_string("recorder_badge")?,
        AccountRole::Recorder,
    )?;
    let work_site_id = require_work_site(store, &mapper.required_string("work_site_code")?)?;

    let attendee_ids = match mapper.parse_list("attendee_badges") {
        Some(badges) => {
            let mut ids: Vec<i64> = store
                .find_users_by_badges(&badges)?
                .into_iter()
                .map(|user| user.id)
                .collect();
            ids.sort_unstable();
            ids.dedup();
            Some(ids)
        }
        None => None,
    };

    Ok(ResolvedRecord::LaborLog {
        log: LaborLog {
            recorder_id,
            work_site_id,
            date: mapper.parse_date("date")?,
            headcount: mapper.parse_i32("headcount")?,
            time_start: mapper.parse_time("time_start")?,
            time_end: mapper.parse_time("time_end")?,
            location: mapper.required_string("location")?,
            notes: mapper.text_or_empty("notes"),
        },
        attendee_ids,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importer::field_mapper::FieldFormats;
    use crate::importer::kinds::test_support::{row, seed_site, seed_user, store};

    fn labor_row(extra: &[(&str, &str)]) -> crate::domain::ImportRow {
        let mut r = row(&[
            ("recorder_badge", "R-01"),
            ("work_site_code", "OB-001"),
            ("date", "03/04/2024"),
            ("headcount", "12"),
            ("time_start", "07:00"),
            ("time_end", "17:00"),
            ("location", "km 12"),
        ]);
        for (k, v) in extra {
            r.insert(k.to_string(), v.to_string());
        }
        r
    }

    #[test]
    fn test_attendees_resolved_and_unknown_dropped() {
        let store = store();
        seed_user(&store, "R-01", AccountRole::Recorder);
        seed_site(&store, "OB-001");
        let w1 = seed_user(&store, "001234", AccountRole::Driver);
        let w2 = seed_user(&store, "001235", AccountRole::Supervisor);
        let formats = FieldFormats::default();
        let r = labor_row(&[("attendee_badges", "001234;001235;999999")]);

        match resolve(&store, &FieldMapper::new(&r, &formats)).unwrap() {
            ResolvedRecord::LaborLog { log, attendee_ids } => {
                assert_eq!(log.headcount, 12);
                let mut expected = vec![w1, w2];
                expected.sort_unstable();
                assert_eq!(attendee_ids, Some(expected));
            }
            other => panic!("unexpected record: {:?}", other),
        }
    }

    #[test]
    fn test_blank_attendee_list_means_untouched() {
        let store = store();
        seed_user(&store, "R-01", AccountRole::Recorder);
        seed_site(&store, "OB-001");
        let formats = FieldFormats::default();
        let r = labor_row(&[("attendee_badges", "  ")]);

        match resolve(&store, &FieldMapper::new(&r, &formats)).unwrap() {
            ResolvedRecord::LaborLog { attendee_ids, .. } => assert!(attendee_ids.is_none()),
            other => panic!("unexpected record: {:?}", other),
        }
    }

    #[test]
    fn test_recorder_role_required() {
        let store = store();
        seed_user(&store, "R-01", AccountRole::Driver);
        seed_site(&store, "OB-001");
        let formats = FieldFormats::default();
        let r = labor_row(&[]);

        let err = resolve(&store, &FieldMapper::new(&r, &formats)).unwrap_err();
        assert_eq!(err.to_string(), "recorder not found: R-01");
    }
}
