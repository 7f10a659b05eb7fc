//! Export of every namespace into one JSON document and the way back.
//!
//! A backup looks like
//! `{"version": "1.0.0", "timestamp": "<RFC 3339>", "data": {"reports": [...], "goals": {...}}}`
//! where `data` holds the decoded value of every namespace that had something stored.

use chrono::SecondsFormat;
use futures::future::join_all;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::{
    storage::{
        error::{StorageError, StorageResult},
        key_value::KeyValueStore,
        namespace::Namespace,
    },
    utils::clock::{Clock, DefaultClock},
};

pub const BACKUP_VERSION: &str = "1.0.0";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BackupDocument {
    pub version: String,
    pub timestamp: String,
    pub data: Map<String, Value>,
}

pub struct BackupService<S> {
    store: S,
    clock: Box<dyn Clock>,
}

impl<S: KeyValueStore> BackupService<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            clock: Box::new(DefaultClock),
        }
    }

    pub fn with_clock(self, clock: impl Clock) -> Self {
        Self {
            clock: Box::new(clock),
            ..self
        }
    }

    /// Serializes every known namespace. Unlike regular reads, a namespace that can't be read or
    /// decoded fails the whole backup instead of being left out.
    pub async fn create_backup(&self) -> StorageResult<String> {
        let reads = Namespace::ALL
            .into_iter()
            .map(|namespace| async move { (namespace, self.store.get(namespace.key()).await) });

        let mut data = Map::new();
        for (namespace, raw) in join_all(reads).await {
            let key = namespace.key();
            let raw = raw.map_err(|source| StorageError::Read {
                key: key.to_string(),
                source,
            })?;
            let Some(raw) = raw.filter(|v| !v.trim().is_empty()) else {
                continue;
            };
            let value =
                serde_json::from_str::<Value>(&raw).map_err(|source| StorageError::Corrupted {
                    key: key.to_string(),
                    source,
                })?;
            data.insert(key.to_string(), value);
        }

        let document = BackupDocument {
            version: BACKUP_VERSION.to_string(),
            timestamp: self.clock.time().to_rfc3339_opts(SecondsFormat::Millis, true),
            data,
        };
        info!(
            "Created backup of {:?}",
            document.data.keys().collect::<Vec<_>>()
        );
        Ok(serde_json::to_string(&document)?)
    }

    /// Replaces every namespace with the content of `content`.
    ///
    /// Nothing is touched when the document is invalid. Otherwise all known namespaces are
    /// removed first and then written back one by one. This is not atomic: if a write fails the
    /// error is [StorageError::PartialRestoreFailure] and namespaces that were not restored yet
    /// stay empty, so the caller should offer to retry. A failure while removing is reported as
    /// [StorageError::Write] and may equally leave some namespaces removed.
    pub async fn restore_backup(&self, content: &str) -> StorageResult<()> {
        let document = parse_backup(content)?;

        self.store
            .remove_many(Namespace::all_keys())
            .await
            .map_err(|source| StorageError::Write {
                key: Namespace::all_keys().join(","),
                source,
            })?;

        let mut restored = vec![];
        for (key, value) in document.data {
            let Some(namespace) = Namespace::from_key(&key) else {
                warn!("Skipping unknown key {key} in backup");
                continue;
            };
            let raw = serde_json::to_string(&value)?;
            if let Err(source) = self.store.set(namespace.key(), raw).await {
                return Err(StorageError::PartialRestoreFailure {
                    namespace,
                    restored,
                    source,
                });
            }
            restored.push(namespace);
        }

        info!("Restored backup from {} ({restored:?})", document.timestamp);
        Ok(())
    }
}

/// Whether `content` looks like a backup: a JSON object with truthy `version` and `timestamp`
/// and an object `data`. Never fails.
pub fn validate_backup(content: &str) -> bool {
    parse_backup(content).is_ok()
}

fn parse_backup(content: &str) -> StorageResult<BackupDocument> {
    let value = serde_json::from_str::<Value>(content)
        .map_err(|e| StorageError::InvalidBackupFormat(e.to_string()))?;
    let Value::Object(mut fields) = value else {
        return Err(StorageError::InvalidBackupFormat(
            "backup must be a JSON object".into(),
        ));
    };

    let version = required_truthy(&mut fields, "version")?;
    let timestamp = required_truthy(&mut fields, "timestamp")?;
    let Some(Value::Object(data)) = fields.remove("data") else {
        return Err(StorageError::InvalidBackupFormat(
            "data must be an object".into(),
        ));
    };

    Ok(BackupDocument {
        version,
        timestamp,
        data,
    })
}

fn required_truthy(fields: &mut Map<String, Value>, name: &str) -> StorageResult<String> {
    match fields.remove(name) {
        Some(Value::String(s)) if !s.is_empty() => Ok(s),
        Some(v) if is_truthy(&v) => Ok(v.to_string()),
        _ => Err(StorageError::InvalidBackupFormat(format!(
            "{name} is missing"
        ))),
    }
}

/// Truthiness as JSON producers usually mean it: empty strings, zero, `false` and `null` don't
/// count as present.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(v) => *v,
        Value::Number(v) => v.as_f64().is_some_and(|v| v != 0.),
        Value::String(v) => !v.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
