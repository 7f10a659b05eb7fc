use std::{path::PathBuf, sync::Arc};

use tracing::debug;

use crate::{
    backup::BackupService,
    storage::{
        entities::{Goals, PersonalInfo, Report, WorkDays},
        error::StorageResult,
        key_value::{FileKeyValueStore, KeyValueStore},
        namespace::Namespace,
        record_store::{self, RecordStore},
        settings::SettingsStore,
    },
};

/// Every store the application works with, bound to one shared [KeyValueStore]. Built once at
/// startup and handed to whatever needs it.
pub struct AppContext<S> {
    pub reports: RecordStore<Report, S>,
    pub goals: SettingsStore<Goals, S>,
    pub personal_info: SettingsStore<PersonalInfo, S>,
    pub work_days: SettingsStore<WorkDays, S>,
    pub backup: BackupService<S>,
    store: S,
}

impl<S: KeyValueStore + Clone> AppContext<S> {
    pub fn new(store: S) -> Self {
        Self {
            reports: RecordStore::new(store.clone()),
            goals: SettingsStore::new(store.clone()),
            personal_info: SettingsStore::new(store.clone()),
            work_days: SettingsStore::new(store.clone()),
            backup: BackupService::new(store.clone()),
            store,
        }
    }
}

impl<S: KeyValueStore> AppContext<S> {
    pub async fn clear(&self, namespaces: &[Namespace]) -> StorageResult<()> {
        record_store::clear(&self.store, namespaces).await
    }
}

impl AppContext<Arc<FileKeyValueStore>> {
    /// Opens the file backed store kept in `dir`.
    pub fn open(dir: PathBuf) -> std::io::Result<Self> {
        debug!("Opening store in {dir:?}");
        Ok(Self::new(Arc::new(FileKeyValueStore::new(dir)?)))
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    use crate::storage::{
        entities::{Goals, Report},
        namespace::Namespace,
    };

    use super::AppContext;

    #[tokio::test]
    async fn stores_share_one_directory() -> Result<()> {
        let dir = tempdir()?;
        let context = AppContext::open(dir.path().join("store"))?;
        context
            .reports
            .create(Report {
                date: NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
                duration: 60,
                study_hours: 0,
                observations: String::new(),
            })
            .await?;
        context.goals.save(&Goals::from_hours_and_minutes(2, 0)).await?;

        let reopened = AppContext::open(dir.path().join("store"))?;
        assert_eq!(reopened.reports.list_all().await.len(), 1);
        assert_eq!(reopened.goals.load().await.monthly_hours, 120);

        reopened.clear(&Namespace::ALL).await?;
        assert!(context.reports.list_all().await.is_empty());
        assert_eq!(context.goals.load().await, Goals::default());
        Ok(())
    }
}
