// ==========================================
// 导入管道集成测试
// ==========================================
// 测试目标: 验证 CSV → 校验 → 引用解析 → upsert → 结果汇总 的完整流程
// ==========================================


use site_records::domain::{AccountRole, UserKey};
use site_records::importer::verify_credential;
use site_records::logging;
use site_records::repository::{SiteRecordStore, StoreTable};
use site_records::ApiError;
use test_helpers::{create_test_api, seed_reference_data, write_csv, USERS_CSV};

fn labor_log_id(api: &site_records::ImportApi) -> i64 {
    let conn = api.store().connection();
    let conn = conn.lock().unwrap();
    conn.query_row("SELECT id FROM labor_log", [], |row| row.get(0))
        .unwrap()
}

#[test]
fn test_work_site_missing_code_scenario() {
    logging::init_test();
    let (_db, api) = create_test_api();

    let csv = "code,name,location,start_km,end_km,start_date,planned_end_date\n\
        OB-001,Duplicação BR-101,Lote 1,0,12,15/01/2024,30/06/2025\n\
        ,Viaduto,Lote 2,1,2,15/01/2024,30/06/2025\n\
        OB-003,Ponte,Lote 3,5,9,15/01/2024,30/06/2025\n";
    let report = api
        .import_bytes("work_sites", Some("sites.csv"), csv.as_bytes())
        .unwrap();

    assert_eq!(report.outcome.succeeded, 2);
    assert_eq!(report.outcome.failed_or_skipped, 1);
    assert_eq!(report.outcome.total_rows, 3);
    assert_eq!(report.outcome.errors.len(), 1);
    assert_eq!(report.outcome.errors[0].row, 3);
    assert_eq!(
        report.outcome.errors[0].message,
        "missing required field: code"
    );
}

#[test]
fn test_counts_always_add_up_in_file_order() {
    logging::init_test();
    let (_db, api) = create_test_api();
    seed_reference_data(&api);

    let csv = "equipment_plate,operator_badge,date,meter_start,meter_end,time_start,time_end,primary_activity,location\n\
        ABC-1234,001234,03/04/2024,1500,1508,07:00,16:00,Escavação,km 12\n\
        ABC-1234,001234,2024-04-04,1508,1515,07:00,16:00,Escavação,km 12\n\
        ,,,,,,,,\n\
        ABC-1234,001234,05/04/2024,abc,1520,07:00,16:00,Escavação,km 12\n\
        ABC-1234,001234,06/04/2024,1520,1528,7h,16:00,Escavação,km 12\n";
    let outcome = api
        .import_bytes("equipment_usage_logs", None, csv.as_bytes())
        .unwrap()
        .outcome;

    assert_eq!(outcome.total_rows, 5);
    assert_eq!(outcome.succeeded + outcome.failed_or_skipped, outcome.total_rows);
    assert_eq!(outcome.succeeded, 1);
    let rows: Vec<usize> = outcome.errors.iter().map(|e| e.row).collect();
    assert_eq!(rows, vec![3, 4, 5, 6]);
    assert!(outcome.errors[0].message.contains("2024-04-04"));
    assert_eq!(
        outcome.errors[1].message,
        "missing required field: equipment_plate"
    );
    assert!(outcome.errors[2].message.contains("abc"));
    assert!(outcome.errors[3].message.contains("7h"));
}

#[test]
fn test_reimport_is_idempotent() {
    logging::init_test();
    let (_db, api) = create_test_api();
    seed_reference_data(&api);

    let equipment_before = api.store().count(StoreTable::Equipment).unwrap();
    let report = api
        .import_bytes(
            "equipment",
            None,
            test_helpers::EQUIPMENT_CSV.as_bytes(),
        )
        .unwrap();

    assert_eq!(report.outcome.succeeded, 2);
    assert_eq!(report.outcome.created, 0);
    assert_eq!(report.outcome.updated, 2);
    assert_eq!(api.store().count(StoreTable::Equipment).unwrap(), equipment_before);
    assert_eq!(api.store().count(StoreTable::UserAccount).unwrap(), 5);
}

#[test]
fn test_decimal_comma_and_period_store_same_value() {
    logging::init_test();
    let (_db, api) = create_test_api();

    let csv = "code,name,location,start_km,end_km,start_date,planned_end_date\n\
        OB-010,A,Lote 1,\"1500,5\",1600,15/01/2024,30/06/2025\n\
        OB-011,B,Lote 1,1500.5,1600,15/01/2024,30/06/2025\n";
    let outcome = api
        .import_bytes("work_sites", None, csv.as_bytes())
        .unwrap()
        .outcome;
    assert!(outcome.is_clean(), "{:?}", outcome.errors);

    let a = api.store().find_work_site_by_code("OB-010").unwrap().unwrap();
    let b = api.store().find_work_site_by_code("OB-011").unwrap().unwrap();
    assert_eq!(a.record.start_km, 1500.5);
    assert_eq!(a.record.start_km, b.record.start_km);
}

#[test]
fn test_credential_from_first_import_is_kept() {
    logging::init_test();
    let (_db, api) = create_test_api();
    api.import_bytes("users", None, USERS_CSV.as_bytes()).unwrap();

    let changed = USERS_CSV
        .replace("admin-pass", "other-admin-pass")
        .replace("operator,,driver-pass", "senior operator,,new-pass");
    let outcome = api
        .import_bytes("users", None, changed.as_bytes())
        .unwrap()
        .outcome;
    assert_eq!(outcome.updated, 5);

    let admin = api
        .store()
        .find_user(&UserKey::Email("ana@example.com".to_string()), None)
        .unwrap()
        .unwrap();
    let admin_hash = admin.record.password_hash.unwrap();
    assert!(verify_credential("admin-pass", &admin_hash));
    assert!(!verify_credential("other-admin-pass", &admin_hash));

    let driver = api
        .store()
        .find_user(&UserKey::Badge("001234".to_string()), Some(AccountRole::Driver))
        .unwrap()
        .unwrap();
    assert_eq!(driver.record.job_function, "senior operator");
    assert!(verify_credential("driver-pass", &driver.record.password_hash.unwrap()));

    let recorder = api
        .store()
        .find_user(&UserKey::Badge("001235".to_string()), None)
        .unwrap()
        .unwrap();
    assert!(recorder.record.password_hash.is_none());
}

#[test]
fn test_unknown_plate_skips_without_creating_log() {
    logging::init_test();
    let (_db, api) = create_test_api();
    seed_reference_data(&api);

    let csv = "equipment_plate,operator_badge,date,meter_start,meter_end,time_start,time_end,primary_activity,location\n\
        ZZZ-9999,001234,03/04/2024,1500,1508,07:00,16:00,Escavação,km 12\n";
    let outcome = api
        .import_bytes("equipment_usage_logs", None, csv.as_bytes())
        .unwrap()
        .outcome;

    assert_eq!(outcome.failed_or_skipped, 1);
    assert_eq!(outcome.errors[0].row, 2);
    assert!(outcome.errors[0].message.contains("ZZZ-9999"));
    assert_eq!(api.store().count(StoreTable::EquipmentUsageLog).unwrap(), 0);
}

#[test]
fn test_usage_log_upserts_by_equipment_and_date() {
    logging::init_test();
    let (_db, api) = create_test_api();
    seed_reference_data(&api);

    let csv = "equipment_plate,operator_badge,date,meter_start,meter_end,time_start,time_end,primary_activity,location,notes\n\
        ABC-1234,001234,03/04/2024,1500,1508,07:00,16:00,Escavação,km 12,\n\
        ABC-1234,001237,03/04/2024,1500,1509,07:00,16:30,Carga,km 13,troca de operador\n";
    let outcome = api
        .import_bytes("equipment_usage_logs", None, csv.as_bytes())
        .unwrap()
        .outcome;

    assert_eq!(outcome.created, 1);
    assert_eq!(outcome.updated, 1);
    assert_eq!(api.store().count(StoreTable::EquipmentUsageLog).unwrap(), 1);
}

#[test]
fn test_required_and_optional_reference_asymmetry() {
    logging::init_test();
    let (_db, api) = create_test_api();
    seed_reference_data(&api);

    let activities = "code,description,unit,unit_price,work_site_code,category_name\n\
        TER-001,Escavação,m3,\"12,75\",OB-404,Terraplenagem\n";
    let outcome = api
        .import_bytes("activities", None, activities.as_bytes())
        .unwrap()
        .outcome;
    assert_eq!(outcome.failed_or_skipped, 1);
    assert!(outcome.errors[0].message.contains("OB-404"));
    assert_eq!(api.store().count(StoreTable::Activity).unwrap(), 0);
    assert_eq!(api.store().count(StoreTable::ActivityCategory).unwrap(), 0);

    let equipment = "name,category,model,plate,manufacturer,year,operator_badge\n\
        Trator,tractor,D6,GHI-0001,CAT,2018,999999\n";
    let outcome = api
        .import_bytes("equipment", None, equipment.as_bytes())
        .unwrap()
        .outcome;
    assert!(outcome.is_clean());
    let stored = api
        .store()
        .find_equipment_by_plate("GHI-0001")
        .unwrap()
        .unwrap();
    assert!(stored.record.operator_id.is_none());
}

#[test]
fn test_activity_category_get_or_create() {
    logging::init_test();
    let (_db, api) = create_test_api();
    seed_reference_data(&api);

    let csv = "code,description,unit,unit_price,work_site_code,category_name,active\n\
        TER-001,Escavação,m3,\"12,75\",OB-001,Terraplenagem,true\n\
        TER-002,Aterro,m3,9.5,OB-001,Terraplenagem,0\n\
        PAV-001,CBUQ,t,310,OB-002,,\n";
    let outcome = api
        .import_bytes("activities", None, csv.as_bytes())
        .unwrap()
        .outcome;

    assert!(outcome.is_clean(), "{:?}", outcome.errors);
    assert_eq!(api.store().count(StoreTable::Activity).unwrap(), 3);
    assert_eq!(api.store().count(StoreTable::ActivityCategory).unwrap(), 1);
}

#[test]
fn test_labor_log_attendee_set_replacement() {
    logging::init_test();
    let (_db, api) = create_test_api();
    seed_reference_data(&api);

    let header = "recorder_badge,work_site_code,date,headcount,time_start,time_end,location,attendee_badges\n";
    let first = format!(
        "{}001235,OB-001,03/04/2024,12,07:00,17:00,km 12,001234;001236;999999\n",
        header
    );
    api.import_bytes("labor_logs", None, first.as_bytes()).unwrap();
    let log_id = labor_log_id(&api);
    assert_eq!(api.store().attendee_ids(log_id).unwrap().len(), 2);

    // 空白列表 → 保持原集合
    let blank = format!("{}001235,OB-001,03/04/2024,13,07:00,17:00,km 12,\n", header);
    let outcome = api
        .import_bytes("labor_logs", None, blank.as_bytes())
        .unwrap()
        .outcome;
    assert_eq!(outcome.updated, 1);
    assert_eq!(api.store().attendee_ids(log_id).unwrap().len(), 2);

    // 非空列表 → 替换
    let replaced = format!("{}001235,OB-001,03/04/2024,13,07:00,17:00,km 12,001237\n", header);
    api.import_bytes("labor_logs", None, replaced.as_bytes()).unwrap();
    assert_eq!(api.store().attendee_ids(log_id).unwrap().len(), 1);
    assert_eq!(api.store().count(StoreTable::LaborLog).unwrap(), 1);
}

#[test]
fn test_daily_report_keyed_by_site_date_supervisor() {
    logging::init_test();
    let (_db, api) = create_test_api();
    seed_reference_data(&api);

    let csv = "supervisor_badge,work_site_code,date,headcount,present_count,activities_completed,activities_partial,weather,notes\n\
        001236,OB-001,03/04/2024,20,18,3,1,sunny,concrete pour\n\
        001236,OB-001,03/04/2024,20,19,4,0,cloudy,revised\n\
        001236,OB-002,03/04/2024,8,8,,,rain,drainage\n\
        001234,OB-001,04/04/2024,20,18,3,1,sunny,wrong role\n";
    let outcome = api
        .import_bytes("daily_site_reports", None, csv.as_bytes())
        .unwrap()
        .outcome;

    assert_eq!(outcome.created, 2);
    assert_eq!(outcome.updated, 1);
    assert_eq!(outcome.failed_or_skipped, 1);
    assert_eq!(outcome.errors[0].row, 5);
    assert_eq!(outcome.errors[0].message, "supervisor not found: 001234");
    assert_eq!(api.store().count(StoreTable::DailySiteReport).unwrap(), 2);
}

#[test]
fn test_storage_error_skips_only_that_row() {
    logging::init_test();
    let (_db, api) = create_test_api();

    let csv = "name,email,badge,national_id,phone,account_role,job_function,title,password\n\
        João Lima,,001234,111,,driver,operator,,\n\
        Carla Dias,,001235,111,,recorder,timekeeper,,\n\
        Rui Alves,,001236,,,supervisor,foreman,,\n";
    let outcome = api
        .import_bytes("users", None, csv.as_bytes())
        .unwrap()
        .outcome;

    assert_eq!(outcome.succeeded, 2);
    assert_eq!(outcome.failed_or_skipped, 1);
    assert_eq!(outcome.errors[0].row, 3);
    assert_eq!(
        outcome.errors[0].message,
        "unique constraint violated: UNIQUE constraint failed: user_account.national_id"
    );
    assert_eq!(api.store().count(StoreTable::UserAccount).unwrap(), 2);
    assert!(api
        .store()
        .find_user(&UserKey::Badge("001235".to_string()), None)
        .unwrap()
        .is_none());
}

#[test]
fn test_latin1_file_is_decoded() {
    logging::init_test();
    let (_db, api) = create_test_api();

    let mut bytes = b"code,name,location,start_km,end_km,start_date,planned_end_date\nOB-020,Ponte S".to_vec();
    bytes.push(0xE3);
    bytes.extend_from_slice(b"o Jo\xe3o,Lote 1,0,1,15/01/2024,30/06/2025\n");
    let file = write_csv(&bytes);

    let report = api.import_file("work_sites", file.path()).unwrap();
    assert!(report.outcome.is_clean());
    let site = api.store().find_work_site_by_code("OB-020").unwrap().unwrap();
    assert_eq!(site.record.name, "Ponte São João");
}

#[test]
fn test_whole_file_errors() {
    logging::init_test();
    let (_db, api) = create_test_api();

    let err = api
        .import_bytes("contracts", None, USERS_CSV.as_bytes())
        .unwrap_err();
    match err {
        ApiError::UnsupportedKind(message) => {
            assert!(message.contains("contracts"));
            assert!(message.contains("work_sites"));
            assert!(message.contains("daily_site_reports"));
        }
        other => panic!("unexpected error: {:?}", other),
    }

    let err = api.import_bytes("users", None, b"").unwrap_err();
    assert!(matches!(err, ApiError::ImportError(_)));

    let err = api
        .import_file("users", std::path::Path::new("does/not/exist.csv"))
        .unwrap_err();
    assert!(matches!(err, ApiError::ImportError(ref m) if m.contains("not found")));

    assert_eq!(api.store().count(StoreTable::UserAccount).unwrap(), 0);
}
