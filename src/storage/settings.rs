use std::marker::PhantomData;

use tracing::{info, warn};

use super::{
    entities::Setting,
    error::{StorageError, StorageResult},
    key_value::KeyValueStore,
};

/// Loads and saves a single value ([Goals](super::entities::Goals),
/// [PersonalInfo](super::entities::PersonalInfo), [WorkDays](super::entities::WorkDays)) under
/// its namespace. Saving overwrites the previous value as a whole.
pub struct SettingsStore<T, S> {
    store: S,
    _value: PhantomData<fn() -> T>,
}

impl<T: Setting, S: KeyValueStore> SettingsStore<T, S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            _value: PhantomData,
        }
    }

    /// `None` when nothing was saved yet.
    pub async fn try_load(&self) -> StorageResult<Option<T>> {
        let key = T::NAMESPACE.key();
        let raw = self
            .store
            .get(key)
            .await
            .map_err(|source| StorageError::Read {
                key: key.to_string(),
                source,
            })?;
        match raw {
            Some(raw) if !raw.trim().is_empty() => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|source| StorageError::Corrupted {
                    key: key.to_string(),
                    source,
                }),
            _ => Ok(None),
        }
    }

    /// Stored value, or the default when it is missing or unreadable.
    pub async fn load(&self) -> T {
        match self.try_load().await {
            Ok(v) => v.unwrap_or_default(),
            Err(e) => {
                warn!("Using default {}: {e}", T::NAMESPACE);
                T::default()
            }
        }
    }

    pub async fn save(&self, value: &T) -> StorageResult<()> {
        let key = T::NAMESPACE.key();
        let raw = serde_json::to_string(value)?;
        self.store
            .set(key, raw)
            .await
            .map_err(|source| StorageError::Write {
                key: key.to_string(),
                source,
            })?;
        info!("Saved {key}");
        Ok(())
    }
}
