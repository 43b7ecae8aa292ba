// ==========================================
// 工地记录管理系统 - 工地记录 Repository Trait
// ==========================================
// 职责: 定义导入管道所需的查找/持久化接口（不包含业务逻辑）
// 红线: Repository 不含业务规则，只做按自然键查找与 upsert
// 红线: 每个 upsert_* 调用是一个独立事务，失败不留部分写入
// ==========================================

use crate::domain::{
    AccountRole, Activity, DailySiteReport, Equipment, EquipmentUsageLog, LaborLog, Stored,
    Upserted, UserAccount, UserKey, WorkSite,
};
use crate::repository::error::RepositoryResult;

// ==========================================
// SiteRecordStore Trait
// ==========================================
// 用途: 导入管道的记录查找/持久化服务
// 实现者: SqliteSiteRecordStore（使用 rusqlite）
pub trait SiteRecordStore: Send + Sync {
    // ===== 按自然键查找 =====

    /// 按自然键查找账号，可选按角色过滤
    ///
    /// # 返回
    /// - Ok(Some): 找到
    /// - Ok(None): 不存在（或角色不符）
    fn find_user(
        &self,
        key: &UserKey,
        role: Option<AccountRole>,
    ) -> RepositoryResult<Option<Stored<UserAccount>>>;

    /// 按工号列表批量查找账号（不存在的工号直接忽略）
    fn find_users_by_badges(&self, badges: &[String]) -> RepositoryResult<Vec<Stored<UserAccount>>>;

    /// 按工地编码查找工地
    fn find_work_site_by_code(&self, code: &str) -> RepositoryResult<Option<Stored<WorkSite>>>;

    /// 按车牌查找设备
    fn find_equipment_by_plate(&self, plate: &str) -> RepositoryResult<Option<Stored<Equipment>>>;

    // ===== Upsert（单行事务）=====

    /// 按 code upsert 工地
    fn upsert_work_site(&self, site: WorkSite) -> RepositoryResult<Upserted<WorkSite>>;

    /// 按 plate upsert 设备
    fn upsert_equipment(&self, equipment: Equipment) -> RepositoryResult<Upserted<Equipment>>;

    /// 按指定自然键 upsert 账号
    ///
    /// # 说明
    /// - 新建: 写入 account.password_hash（可为空）
    /// - 更新: 永不修改已存储的 password_hash
    fn upsert_user_account(
        &self,
        account: UserAccount,
        key: &UserKey,
    ) -> RepositoryResult<Upserted<UserAccount>>;

    /// 按 code upsert 作业项；category_name 非空时在同一事务内 get-or-create 分类
    fn upsert_activity(
        &self,
        activity: Activity,
        category_name: Option<&str>,
    ) -> RepositoryResult<Upserted<Activity>>;

    /// 按 (equipment_id, date) upsert 设备使用记录
    fn upsert_equipment_usage_log(
        &self,
        log: EquipmentUsageLog,
    ) -> RepositoryResult<Upserted<EquipmentUsageLog>>;

    /// 按 (recorder_id, work_site_id, date) upsert 考勤记录
    ///
    /// # 参数
    /// - attendee_ids: Some → 替换出勤人员集合；None → 保持原集合不变
    fn upsert_labor_log(
        &self,
        log: LaborLog,
        attendee_ids: Option<&[i64]>,
    ) -> RepositoryResult<Upserted<LaborLog>>;

    /// 按 (work_site_id, date, supervisor_id) upsert 施工日报
    fn upsert_daily_site_report(
        &self,
        report: DailySiteReport,
    ) -> RepositoryResult<Upserted<DailySiteReport>>;
}
