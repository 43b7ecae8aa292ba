// ==========================================
// 工地记录管理系统 - 工地记录 Repository 实现
// ==========================================
// 职责: 实现按自然键查找与 upsert（使用 rusqlite）
// 红线: Repository 不含业务规则，只做数据 CRUD
// 事务: 每个 upsert 一个事务（先查自然键 → UPDATE / INSERT）
// ==========================================

use crate::db::{configure_sqlite_connection, initialize_schema, open_sqlite_connection};
use crate::domain::{
    AccountRole, Activity, DailySiteReport, Equipment, EquipmentStatus, EquipmentUsageLog,
    LaborLog, SiteStatus, Stored, Upserted, UserAccount, UserKey, WorkSite,
};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::site_record_repo::SiteRecordStore;
use chrono::Utc;
use rusqlite::types::Type;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Params, Row};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

const USER_COLUMNS: &str =
    "id, name, email, badge, national_id, phone, role, job_function, title, password_hash";

const WORK_SITE_COLUMNS: &str = "id, code, name, location, start_km, end_km, start_date, \
     planned_end_date, responsible_id, status";

const EQUIPMENT_COLUMNS: &str = "id, name, category, model, plate, manufacturer, year, \
     meter_reading, status, work_site_id, operator_id";

// ==========================================
// 行映射
// ==========================================

/// 解析数据库中的枚举文本
fn parse_db_enum<T>(idx: usize, raw: &str, parse: fn(&str) -> Option<T>) -> rusqlite::Result<T> {
    parse(raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Text,
            format!("unknown value: {}", raw).into(),
        )
    })
}

fn map_user(row: &Row<'_>) -> rusqlite::Result<Stored<UserAccount>> {
    let role_raw: String = row.get(6)?;
    Ok(Stored {
        id: row.get(0)?,
        record: UserAccount {
            name: row.get(1)?,
            email: row.get(2)?,
            badge: row.get(3)?,
            national_id: row.get(4)?,
            phone: row.get(5)?,
            role: parse_db_enum(6, &role_raw, AccountRole::from_str)?,
            job_function: row.get(7)?,
            title: row.get(8)?,
            password_hash: row.get(9)?,
        },
    })
}

fn map_work_site(row: &Row<'_>) -> rusqlite::Result<Stored<WorkSite>> {
    let status_raw: String = row.get(9)?;
    Ok(Stored {
        id: row.get(0)?,
        record: WorkSite {
            code: row.get(1)?,
            name: row.get(2)?,
            location: row.get(3)?,
            start_km: row.get(4)?,
            end_km: row.get(5)?,
            start_date: row.get(6)?,
            planned_end_date: row.get(7)?,
            responsible_id: row.get(8)?,
            status: parse_db_enum(9, &status_raw, SiteStatus::from_str)?,
        },
    })
}

fn map_equipment(row: &Row<'_>) -> rusqlite::Result<Stored<Equipment>> {
    let status_raw: String = row.get(8)?;
    Ok(Stored {
        id: row.get(0)?,
        record: Equipment {
            name: row.get(1)?,
            category: row.get(2)?,
            model: row.get(3)?,
            plate: row.get(4)?,
            manufacturer: row.get(5)?,
            year: row.get(6)?,
            meter_reading: row.get(7)?,
            status: parse_db_enum(8, &status_raw, EquipmentStatus::from_str)?,
            work_site_id: row.get(9)?,
            operator_id: row.get(10)?,
        },
    })
}

/// 查找自然键对应的代理主键
fn find_id<P: Params>(conn: &Connection, sql: &str, params: P) -> rusqlite::Result<Option<i64>> {
    conn.query_row(sql, params, |row| row.get(0)).optional()
}

fn now_str() -> String {
    Utc::now().to_rfc3339()
}

fn user_key_column(key: &UserKey) -> &'static str {
    match key {
        UserKey::Email(_) => "email",
        UserKey::Badge(_) => "badge",
    }
}

// ==========================================
// SqliteSiteRecordStore
// ==========================================
pub struct SqliteSiteRecordStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteSiteRecordStore {
    /// 打开数据库并确保表结构存在
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建（会再次应用统一 PRAGMA 与建表，幂等）
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        {
            let guard = conn
                .lock()
                .map_err(|e| RepositoryError::LockError(e.to_string()))?;
            configure_sqlite_connection(&guard)?;
            initialize_schema(&guard)?;
        }
        Ok(Self { conn })
    }

    /// 共享底层连接（供同库的其他仓储复用）
    pub fn connection(&self) -> Arc<Mutex<Connection>> {
        Arc::clone(&self.conn)
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 查询考勤记录的出勤人员 id（升序）
    pub fn attendee_ids(&self, labor_log_id: i64) -> RepositoryResult<Vec<i64>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT user_id FROM labor_log_attendee WHERE labor_log_id = ?1 ORDER BY user_id",
        )?;
        let ids = stmt
            .query_map(params![labor_log_id], |row| row.get(0))?
            .collect::<Result<Vec<i64>, _>>()?;
        Ok(ids)
    }

    /// 统计表记录数
    pub fn count(&self, table: StoreTable) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT COUNT(*) FROM {}", table.as_str());
        Ok(conn.query_row(&sql, [], |row| row.get(0))?)
    }
}

/// 存储表（计数与自然键查找）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreTable {
    WorkSite,
    Equipment,
    UserAccount,
    ActivityCategory,
    Activity,
    EquipmentUsageLog,
    LaborLog,
    DailySiteReport,
}

impl StoreTable {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreTable::WorkSite => "work_site",
            StoreTable::Equipment => "equipment",
            StoreTable::UserAccount => "user_account",
            StoreTable::ActivityCategory => "activity_category",
            StoreTable::Activity => "activity",
            StoreTable::EquipmentUsageLog => "equipment_usage_log",
            StoreTable::LaborLog => "labor_log",
            StoreTable::DailySiteReport => "daily_site_report",
        }
    }

    /// upsert 匹配所用的自然键列（按绑定参数顺序）
    ///
    /// 账号表为二选一: admin 按 email，其他角色按 badge
    pub fn key_columns(&self) -> &'static [&'static str] {
        match self {
            StoreTable::WorkSite => &["code"],
            StoreTable::Equipment => &["plate"],
            StoreTable::UserAccount => &["email", "badge"],
            StoreTable::ActivityCategory => &["name"],
            StoreTable::Activity => &["code"],
            StoreTable::EquipmentUsageLog => &["equipment_id", "date"],
            StoreTable::LaborLog => &["recorder_id", "work_site_id", "date"],
            StoreTable::DailySiteReport => &["work_site_id", "date", "supervisor_id"],
        }
    }

    /// 按全部自然键列查找 id 的 SQL
    fn key_lookup_sql(&self) -> String {
        self.lookup_sql(self.key_columns())
    }

    fn lookup_sql(&self, columns: &[&str]) -> String {
        let conditions: Vec<String> = columns
            .iter()
            .enumerate()
            .map(|(idx, column)| format!("{} = ?{}", column, idx + 1))
            .collect();
        format!(
            "SELECT id FROM {} WHERE {}",
            self.as_str(),
            conditions.join(" AND ")
        )
    }
}

impl SiteRecordStore for SqliteSiteRecordStore {
    fn find_user(
        &self,
        key: &UserKey,
        role: Option<AccountRole>,
    ) -> RepositoryResult<Option<Stored<UserAccount>>> {
        let conn = self.get_conn()?;
        let column = user_key_column(key);

        let user = match role {
            Some(role) => {
                let sql = format!(
                    "SELECT {} FROM user_account WHERE {} = ?1 AND role = ?2",
                    USER_COLUMNS, column
                );
                conn.query_row(&sql, params![key.value(), role.to_db_str()], map_user)
                    .optional()?
            }
            None => {
                let sql = format!("SELECT {} FROM user_account WHERE {} = ?1", USER_COLUMNS, column);
                conn.query_row(&sql, params![key.value()], map_user).optional()?
            }
        };
        Ok(user)
    }

    fn find_users_by_badges(&self, badges: &[String]) -> RepositoryResult<Vec<Stored<UserAccount>>> {
        if badges.is_empty() {
            return Ok(Vec::new());
        }

        let conn = self.get_conn()?;
        let placeholders = vec!["?"; badges.len()].join(", ");
        let sql = format!(
            "SELECT {} FROM user_account WHERE badge IN ({}) ORDER BY id",
            USER_COLUMNS, placeholders
        );
        let mut stmt = conn.prepare(&sql)?;
        let users = stmt
            .query_map(params_from_iter(badges.iter()), map_user)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(users)
    }

    fn find_work_site_by_code(&self, code: &str) -> RepositoryResult<Option<Stored<WorkSite>>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM work_site WHERE code = ?1", WORK_SITE_COLUMNS);
        Ok(conn.query_row(&sql, params![code], map_work_site).optional()?)
    }

    fn find_equipment_by_plate(&self, plate: &str) -> RepositoryResult<Option<Stored<Equipment>>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM equipment WHERE plate = ?1", EQUIPMENT_COLUMNS);
        Ok(conn.query_row(&sql, params![plate], map_equipment).optional()?)
    }

    fn upsert_work_site(&self, site: WorkSite) -> RepositoryResult<Upserted<WorkSite>> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;
        let now = now_str();

        let existing = find_id(&tx, &StoreTable::WorkSite.key_lookup_sql(), params![site.code])?;
        let (id, created) = match existing {
            Some(id) => {
                tx.execute(
                    r#"
                    UPDATE work_site SET
                        name = ?1, location = ?2, start_km = ?3, end_km = ?4,
                        start_date = ?5, planned_end_date = ?6, responsible_id = ?7,
                        status = ?8, updated_at = ?9
                    WHERE id = ?10
                    "#,
                    params![
                        site.name,
                        site.location,
                        site.start_km,
                        site.end_km,
                        site.start_date,
                        site.planned_end_date,
                        site.responsible_id,
                        site.status.to_db_str(),
                        now,
                        id,
                    ],
                )?;
                (id, false)
            }
            None => {
                tx.execute(
                    r#"
                    INSERT INTO work_site (
                        code, name, location, start_km, end_km, start_date,
                        planned_end_date, responsible_id, status, created_at, updated_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
                    "#,
                    params![
                        site.code,
                        site.name,
                        site.location,
                        site.start_km,
                        site.end_km,
                        site.start_date,
                        site.planned_end_date,
                        site.responsible_id,
                        site.status.to_db_str(),
                        now,
                        now,
                    ],
                )?;
                (tx.last_insert_rowid(), true)
            }
        };

        tx.commit()?;
        debug!(id, code = %site.code, created, "work_site upserted");
        Ok(Upserted {
            entity: Stored { id, record: site },
            created,
        })
    }

    fn upsert_equipment(&self, equipment: Equipment) -> RepositoryResult<Upserted<Equipment>> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;
        let now = now_str();

        let existing = find_id(
            &tx,
            &StoreTable::Equipment.key_lookup_sql(),
            params![equipment.plate],
        )?;
        let (id, created) = match existing {
            Some(id) => {
                tx.execute(
                    r#"
                    UPDATE equipment SET
                        name = ?1, category = ?2, model = ?3, manufacturer = ?4, year = ?5,
                        meter_reading = ?6, status = ?7, work_site_id = ?8, operator_id = ?9,
                        updated_at = ?10
                    WHERE id = ?11
                    "#,
                    params![
                        equipment.name,
                        equipment.category,
                        equipment.model,
                        equipment.manufacturer,
                        equipment.year,
                        equipment.meter_reading,
                        equipment.status.to_db_str(),
                        equipment.work_site_id,
                        equipment.operator_id,
                        now,
                        id,
                    ],
                )?;
                (id, false)
            }
            None => {
                tx.execute(
                    r#"
                    INSERT INTO equipment (
                        name, category, model, plate, manufacturer, year, meter_reading,
                        status, work_site_id, operator_id, created_at, updated_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
                    "#,
                    params![
                        equipment.name,
                        equipment.category,
                        equipment.model,
                        equipment.plate,
                        equipment.manufacturer,
                        equipment.year,
                        equipment.meter_reading,
                        equipment.status.to_db_str(),
                        equipment.work_site_id,
                        equipment.operator_id,
                        now,
                        now,
                    ],
                )?;
                (tx.last_insert_rowid(), true)
            }
        };

        tx.commit()?;
        debug!(id, plate = %equipment.plate, created, "equipment upserted");
        Ok(Upserted {
            entity: Stored {
                id,
                record: equipment,
            },
            created,
        })
    }

    fn upsert_user_account(
        &self,
        account: UserAccount,
        key: &UserKey,
    ) -> RepositoryResult<Upserted<UserAccount>> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;
        let now = now_str();

        let lookup = StoreTable::UserAccount.lookup_sql(&[user_key_column(key)]);
        let existing = find_id(&tx, &lookup, params![key.value()])?;
        let (id, created) = match existing {
            Some(id) => {
                // 更新路径不触碰 password_hash
                tx.execute(
                    r#"
                    UPDATE user_account SET
                        name = ?1, email = ?2, badge = ?3, national_id = ?4, phone = ?5,
                        role = ?6, job_function = ?7, title = ?8, updated_at = ?9
                    WHERE id = ?10
                    "#,
                    params![
                        account.name,
                        account.email,
                        account.badge,
                        account.national_id,
                        account.phone,
                        account.role.to_db_str(),
                        account.job_function,
                        account.title,
                        now,
                        id,
                    ],
                )?;
                (id, false)
            }
            None => {
                tx.execute(
                    r#"
                    INSERT INTO user_account (
                        name, email, badge, national_id, phone, role, job_function, title,
                        password_hash, created_at, updated_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
                    "#,
                    params![
                        account.name,
                        account.email,
                        account.badge,
                        account.national_id,
                        account.phone,
                        account.role.to_db_str(),
                        account.job_function,
                        account.title,
                        account.password_hash,
                        now,
                        now,
                    ],
                )?;
                (tx.last_insert_rowid(), true)
            }
        };

        let sql = format!("SELECT {} FROM user_account WHERE id = ?1", USER_COLUMNS);
        let stored = tx.query_row(&sql, params![id], map_user)?;
        tx.commit()?;
        debug!(id, key = %key.value(), created, "user_account upserted");
        Ok(Upserted {
            entity: stored,
            created,
        })
    }

    fn upsert_activity(
        &self,
        mut activity: Activity,
        category_name: Option<&str>,
    ) -> RepositoryResult<Upserted<Activity>> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;
        let now = now_str();

        activity.category_id = match category_name {
            Some(name) => {
                let found = find_id(
                    &tx,
                    &StoreTable::ActivityCategory.key_lookup_sql(),
                    params![name],
                )?;
                match found {
                    Some(id) => Some(id),
                    None => {
                        tx.execute(
                            "INSERT INTO activity_category (name) VALUES (?1)",
                            params![name],
                        )?;
                        Some(tx.last_insert_rowid())
                    }
                }
            }
            None => None,
        };

        let existing = find_id(
            &tx,
            &StoreTable::Activity.key_lookup_sql(),
            params![activity.code],
        )?;
        let (id, created) = match existing {
            Some(id) => {
                tx.execute(
                    r#"
                    UPDATE activity SET
                        description = ?1, unit = ?2, category_id = ?3, unit_price = ?4,
                        work_site_id = ?5, active = ?6, updated_at = ?7
                    WHERE id = ?8
                    "#,
                    params![
                        activity.description,
                        activity.unit,
                        activity.category_id,
                        activity.unit_price,
                        activity.work_site_id,
                        activity.active,
                        now,
                        id,
                    ],
                )?;
                (id, false)
            }
            None => {
                tx.execute(
                    r#"
                    INSERT INTO activity (
                        code, description, unit, category_id, unit_price, work_site_id,
                        active, created_at, updated_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                    "#,
                    params![
                        activity.code,
                        activity.description,
                        activity.unit,
                        activity.category_id,
                        activity.unit_price,
                        activity.work_site_id,
                        activity.active,
                        now,
                        now,
                    ],
                )?;
                (tx.last_insert_rowid(), true)
            }
        };

        tx.commit()?;
        debug!(id, code = %activity.code, created, "activity upserted");
        Ok(Upserted {
            entity: Stored {
                id,
                record: activity,
            },
            created,
        })
    }

    fn upsert_equipment_usage_log(
        &self,
        log: EquipmentUsageLog,
    ) -> RepositoryResult<Upserted<EquipmentUsageLog>> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;
        let now = now_str();

        let existing = find_id(
            &tx,
            &StoreTable::EquipmentUsageLog.key_lookup_sql(),
            params![log.equipment_id, log.date],
        )?;
        let (id, created) = match existing {
            Some(id) => {
                tx.execute(
                    r#"
                    UPDATE equipment_usage_log SET
                        operator_id = ?1, meter_start = ?2, meter_end = ?3, time_start = ?4,
                        time_end = ?5, primary_activity = ?6, location = ?7, notes = ?8,
                        updated_at = ?9
                    WHERE id = ?10
                    "#,
                    params![
                        log.operator_id,
                        log.meter_start,
                        log.meter_end,
                        log.time_start,
                        log.time_end,
                        log.primary_activity,
                        log.location,
                        log.notes,
                        now,
                        id,
                    ],
                )?;
                (id, false)
            }
            None => {
                tx.execute(
                    r#"
                    INSERT INTO equipment_usage_log (
                        equipment_id, operator_id, date, meter_start, meter_end, time_start,
                        time_end, primary_activity, location, notes, created_at, updated_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
                    "#,
                    params![
                        log.equipment_id,
                        log.operator_id,
                        log.date,
                        log.meter_start,
                        log.meter_end,
                        log.time_start,
                        log.time_end,
                        log.primary_activity,
                        log.location,
                        log.notes,
                        now,
                        now,
                    ],
                )?;
                (tx.last_insert_rowid(), true)
            }
        };

        tx.commit()?;
        debug!(id, equipment_id = log.equipment_id, date = %log.date, created, "equipment_usage_log upserted");
        Ok(Upserted {
            entity: Stored { id, record: log },
            created,
        })
    }

    fn upsert_labor_log(
        &self,
        log: LaborLog,
        attendee_ids: Option<&[i64]>,
    ) -> RepositoryResult<Upserted<LaborLog>> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;
        let now = now_str();

        let existing = find_id(
            &tx,
            &StoreTable::LaborLog.key_lookup_sql(),
            params![log.recorder_id, log.work_site_id, log.date],
        )?;
        let (id, created) = match existing {
            Some(id) => {
                tx.execute(
                    r#"
                    UPDATE labor_log SET
                        headcount = ?1, time_start = ?2, time_end = ?3, location = ?4,
                        notes = ?5, updated_at = ?6
                    WHERE id = ?7
                    "#,
                    params![
                        log.headcount,
                        log.time_start,
                        log.time_end,
                        log.location,
                        log.notes,
                        now,
                        id,
                    ],
                )?;
                (id, false)
            }
            None => {
                tx.execute(
                    r#"
                    INSERT INTO labor_log (
                        recorder_id, work_site_id, date, headcount, time_start, time_end,
                        location, notes, created_at, updated_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                    "#,
                    params![
                        log.recorder_id,
                        log.work_site_id,
                        log.date,
                        log.headcount,
                        log.time_start,
                        log.time_end,
                        log.location,
                        log.notes,
                        now,
                        now,
                    ],
                )?;
                (tx.last_insert_rowid(), true)
            }
        };

        if let Some(user_ids) = attendee_ids {
            tx.execute(
                "DELETE FROM labor_log_attendee WHERE labor_log_id = ?1",
                params![id],
            )?;
            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO labor_log_attendee (labor_log_id, user_id) VALUES (?1, ?2)",
            )?;
            for user_id in user_ids {
                stmt.execute(params![id, user_id])?;
            }
        }

        tx.commit()?;
        debug!(id, work_site_id = log.work_site_id, date = %log.date, created, "labor_log upserted");
        Ok(Upserted {
            entity: Stored { id, record: log },
            created,
        })
    }

    fn upsert_daily_site_report(
        &self,
        report: DailySiteReport,
    ) -> RepositoryResult<Upserted<DailySiteReport>> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;
        let now = now_str();

        let existing = find_id(
            &tx,
            &StoreTable::DailySiteReport.key_lookup_sql(),
            params![report.work_site_id, report.date, report.supervisor_id],
        )?;
        let (id, created) = match existing {
            Some(id) => {
                tx.execute(
                    r#"
                    UPDATE daily_site_report SET
                        headcount = ?1, present_count = ?2, activities_completed = ?3,
                        activities_partial = ?4, weather = ?5, notes = ?6, updated_at = ?7
                    WHERE id = ?8
                    "#,
                    params![
                        report.headcount,
                        report.present_count,
                        report.activities_completed,
                        report.activities_partial,
                        report.weather,
                        report.notes,
                        now,
                        id,
                    ],
                )?;
                (id, false)
            }
            None => {
                tx.execute(
                    r#"
                    INSERT INTO daily_site_report (
                        supervisor_id, work_site_id, date, headcount, present_count,
                        activities_completed, activities_partial, weather, notes,
                        created_at, updated_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
                    "#,
                    params![
                        report.supervisor_id,
                        report.work_site_id,
                        report.date,
                        report.headcount,
                        report.present_count,
                        report.activities_completed,
                        report.activities_partial,
                        report.weather,
                        report.notes,
                        now,
                        now,
                    ],
                )?;
                (tx.last_insert_rowid(), true)
            }
        };

        tx.commit()?;
        debug!(id, work_site_id = report.work_site_id, date = %report.date, created, "daily_site_report upserted");
        Ok(Upserted {
            entity: Stored { id, record: report },
            created,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    fn store() -> SqliteSiteRecordStore {
        let conn = Connection::open_in_memory().unwrap();
        SqliteSiteRecordStore::from_connection(Arc::new(Mutex::new(conn))).unwrap()
    }

    fn driver(badge: &str, password_hash: Option<&str>) -> UserAccount {
        UserAccount {
            name: format!("Driver {}", badge),
            email: None,
            badge: Some(badge.to_string()),
            national_id: None,
            phone: None,
            role: AccountRole::Driver,
            job_function: "operator".to_string(),
            title: None,
            password_hash: password_hash.map(str::to_string),
        }
    }

    fn site(code: &str) -> WorkSite {
        WorkSite {
            code: code.to_string(),
            name: "Rodovia BR-101".to_string(),
            location: "Lote 3".to_string(),
            start_km: 10.5,
            end_km: 42.0,
            start_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            planned_end_date: NaiveDate::from_ymd_opt(2025, 6, 30).unwrap(),
            responsible_id: None,
            status: SiteStatus::Planning,
        }
    }

    #[test]
    fn test_upsert_work_site_creates_then_updates() {
        let store = store();

        let first = store.upsert_work_site(site("OB-001")).unwrap();
        assert!(first.created);

        let mut changed = site("OB-001");
        changed.name = "Renamed".to_string();
        let second = store.upsert_work_site(changed).unwrap();
        assert!(!second.created);
        assert_eq!(second.entity.id, first.entity.id);

        let found = store.find_work_site_by_code("OB-001").unwrap().unwrap();
        assert_eq!(found.record.name, "Renamed");
        assert_eq!(found.record.start_date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(store.count(StoreTable::WorkSite).unwrap(), 1);
    }

    #[test]
    fn test_failed_activity_write_rolls_back_new_category() {
        let store = store();
        let activity = Activity {
            code: "TER-001".to_string(),
            description: "Escavação".to_string(),
            unit: "m3".to_string(),
            category_id: None,
            unit_price: 12.75,
            work_site_id: 9_999, // 不存在的工地
            active: true,
        };

        let err = store
            .upsert_activity(activity, Some("Terraplenagem"))
            .unwrap_err();
        assert!(matches!(err, RepositoryError::ForeignKeyViolation(_)));
        assert_eq!(store.count(StoreTable::ActivityCategory).unwrap(), 0);
        assert_eq!(store.count(StoreTable::Activity).unwrap(), 0);
    }

    #[test]
    fn test_key_lookup_sql_binds_columns_in_order() {
        assert_eq!(
            StoreTable::LaborLog.key_lookup_sql(),
            "SELECT id FROM labor_log WHERE recorder_id = ?1 AND work_site_id = ?2 AND date = ?3"
        );
        assert_eq!(
            StoreTable::UserAccount.lookup_sql(&["badge"]),
            "SELECT id FROM user_account WHERE badge = ?1"
        );
    }

    #[test]
    fn test_user_update_keeps_password_hash() {
        let store = store();
        let key = UserKey::Badge("M-100".to_string());

        store
            .upsert_user_account(driver("M-100", Some("hash-one")), &key)
            .unwrap();
        let updated = store
            .upsert_user_account(driver("M-100", Some("hash-two")), &key)
            .unwrap();

        assert!(!updated.created);
        assert_eq!(updated.entity.record.password_hash.as_deref(), Some("hash-one"));
    }

    #[test]
    fn test_find_user_filters_by_role() {
        let store = store();
        let key = UserKey::Badge("M-200".to_string());
        store.upsert_user_account(driver("M-200", None), &key).unwrap();

        assert!(store.find_user(&key, Some(AccountRole::Driver)).unwrap().is_some());
        assert!(store.find_user(&key, Some(AccountRole::Recorder)).unwrap().is_none());
        assert!(store.find_user(&key, None).unwrap().is_some());
    }

    #[test]
    fn test_find_users_by_badges_ignores_unknown() {
        let store = store();
        for badge in ["A1", "A2"] {
            store
                .upsert_user_account(driver(badge, None), &UserKey::Badge(badge.to_string()))
                .unwrap();
        }

        let badges = vec!["A1".to_string(), "ZZ".to_string(), "A2".to_string()];
        let users = store.find_users_by_badges(&badges).unwrap();
        assert_eq!(users.len(), 2);
        assert!(store.find_users_by_badges(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_labor_log_attendees_replaced_only_when_given() {
        let store = store();
        let recorder = store
            .upsert_user_account(driver("R1", None), &UserKey::Badge("R1".to_string()))
            .unwrap();
        let worker = store
            .upsert_user_account(driver("W1", None), &UserKey::Badge("W1".to_string()))
            .unwrap();
        let site = store.upsert_work_site(site("OB-002")).unwrap();

        let log = LaborLog {
            recorder_id: recorder.entity.id,
            work_site_id: site.entity.id,
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            headcount: 5,
            time_start: NaiveTime::from_hms_opt(7, 0, 0).unwrap(),
            time_end: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
            location: "km 12".to_string(),
            notes: String::new(),
        };

        let first = store
            .upsert_labor_log(log.clone(), Some(&[worker.entity.id]))
            .unwrap();
        let second = store.upsert_labor_log(log, None).unwrap();

        assert_eq!(first.entity.id, second.entity.id);
        assert_eq!(store.attendee_ids(first.entity.id).unwrap(), vec![worker.entity.id]);
    }
}
