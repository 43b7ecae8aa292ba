// ==========================================
// 工地记录管理系统 - 记录写入器
// ==========================================
// 职责: 已解析记录 → 按自然键 create-or-update
// 规则:
// - 账号新建且带密码 → 写入 Argon2 哈希
// - 账号更新 → 已存储的哈希永不改动（即使行中带密码）
// ==========================================

use crate::domain::Upserted;
use crate::importer::error::{RowError, RowResult};
use crate::importer::importer_trait::CredentialHasher;
use crate::importer::kinds::ResolvedRecord;
use crate::repository::SiteRecordStore;

/// 单行写入回执
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpsertReceipt {
    pub entity_id: i64,
    pub created: bool,
}

impl<T> From<Upserted<T>> for UpsertReceipt {
    fn from(upserted: Upserted<T>) -> Self {
        Self {
            entity_id: upserted.entity.id,
            created: upserted.created,
        }
    }
}

pub struct RecordUpserter {
    hasher: Box<dyn CredentialHasher>,
}

impl RecordUpserter {
    pub fn new(hasher: Box<dyn CredentialHasher>) -> Self {
        Self { hasher }
    }

    pub fn upsert(
        &self,
        store: &dyn SiteRecordStore,
        record: ResolvedRecord,
    ) -> RowResult<UpsertReceipt> {
        let receipt = match record {
            ResolvedRecord::WorkSite(site) => store.upsert_work_site(site)?.into(),
            ResolvedRecord::Equipment(equipment) => store.upsert_equipment(equipment)?.into(),
            ResolvedRecord::UserAccount {
                mut account,
                key,
                password,
            } => {
                // 仅新建账号派生哈希
                let exists = store.find_user(&key, None)?.is_some();
                account.password_hash = match (exists, password) {
                    (false, Some(secret)) => {
                        Some(self.hasher.hash(&secret).map_err(RowError::Credential)?)
                    }
                    _ => None,
                };
                store.upsert_user_account(account, &key)?.into()
            }
            ResolvedRecord::Activity {
                activity,
                category_name,
            } => store
                .upsert_activity(activity, category_name.as_deref())?
                .into(),
            ResolvedRecord::EquipmentUsageLog(log) => store.upsert_equipment_usage_log(log)?.into(),
            ResolvedRecord::LaborLog { log, attendee_ids } => store
                .upsert_labor_log(log, attendee_ids.as_deref())?
                .into(),
            ResolvedRecord::DailySiteReport(report) => {
                store.upsert_daily_site_report(report)?.into()
            }
        };
        Ok(receipt)
    }
}
