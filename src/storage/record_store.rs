use std::marker::PhantomData;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::utils::{
    clock::{Clock, DefaultClock},
    ids::{IdGenerator, RecordId, UuidGenerator},
};

use super::{
    entities::{Record, RecordPayload},
    error::{StorageError, StorageResult},
    key_value::KeyValueStore,
    namespace::Namespace,
};

/// CRUD over one namespace holding a JSON array of [Record]s.
///
/// Every mutation reads the whole list, changes it and writes the whole list back. Nothing guards
/// the gap between the read and the write, so two callers mutating the same namespace at once can
/// lose one of the updates. Callers that might overlap have to take turns themselves.
pub struct RecordStore<P, S> {
    store: S,
    clock: Box<dyn Clock>,
    ids: Box<dyn IdGenerator>,
    _payload: PhantomData<fn() -> P>,
}

impl<P: RecordPayload, S: KeyValueStore> RecordStore<P, S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            clock: Box::new(DefaultClock),
            ids: Box::new(UuidGenerator),
            _payload: PhantomData,
        }
    }

    pub fn with_clock(self, clock: impl Clock) -> Self {
        Self {
            clock: Box::new(clock),
            ..self
        }
    }

    pub fn with_id_generator(self, ids: impl IdGenerator) -> Self {
        Self {
            ids: Box::new(ids),
            ..self
        }
    }

    fn key(&self) -> &'static str {
        P::NAMESPACE.key()
    }

    /// Reads the namespace, surfacing I/O failures and a value that isn't a JSON array. An absent
    /// key is an empty list. Single records that don't decode are left out with a warning, they
    /// stay in storage untouched.
    pub async fn try_list_all(&self) -> StorageResult<Vec<Record<P>>> {
        let key = self.key();
        let Some(raw) = self.read_raw().await? else {
            return Ok(vec![]);
        };
        let records = serde_json::from_str::<Vec<Value>>(&raw).map_err(|source| {
            StorageError::Corrupted {
                key: key.to_string(),
                source,
            }
        })?;
        Ok(records
            .into_iter()
            .filter_map(|value| match serde_json::from_value::<Record<P>>(value) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!("Skipping undecodable record in {key}: {e}");
                    None
                }
            })
            .collect())
    }

    /// Reads the namespace and falls back to an empty list on any failure. Failures are only
    /// logged, so corrupted data looks the same as no data to the caller.
    pub async fn list_all(&self) -> Vec<Record<P>> {
        match self.try_list_all().await {
            Ok(records) => records,
            Err(e) => {
                warn!("Treating {} as empty: {e}", self.key());
                vec![]
            }
        }
    }

    pub async fn get(&self, id: &RecordId) -> Option<Record<P>> {
        self.list_all().await.into_iter().find(|v| &v.id == id)
    }

    pub async fn create(&self, payload: P) -> StorageResult<Record<P>> {
        let mut records = self.read_for_write().await?;
        let now = self.clock.time();
        let record = Record {
            id: self.fresh_id(&records),
            created_at: now,
            updated_at: now,
            payload,
        };
        records.push(serde_json::to_value(&record)?);
        self.write_all(&records).await?;
        info!("Created {} in {}", record.id, self.key());
        Ok(record)
    }

    /// Merges every field `patch` serializes over the stored record and bumps `updatedAt`.
    /// `id` and `createdAt` can't be changed this way. Stored fields the payload doesn't know
    /// about are kept.
    pub async fn update(&self, id: &RecordId, patch: &impl Serialize) -> StorageResult<Record<P>> {
        let Value::Object(patch) = serde_json::to_value(patch).map_err(StorageError::InvalidPatch)?
        else {
            return Err(StorageError::InvalidPatch(serde::ser::Error::custom(
                "patch must serialize into an object",
            )));
        };

        let mut records = self.read_for_write().await?;
        let Some(fields) = records
            .iter_mut()
            .find(|v| record_id(v) == Some(id.as_str()))
            .and_then(Value::as_object_mut)
        else {
            return Err(StorageError::RecordNotFound(id.clone()));
        };

        let now = self.clock.time();
        let updated_at = fields
            .get("updatedAt")
            .and_then(|v| serde_json::from_value::<DateTime<Utc>>(v.clone()).ok())
            .map_or(now, |previous| next_update_time(now, previous));

        let mut merged = fields.clone();
        for (field, value) in patch {
            if field == "id" || field == "createdAt" {
                continue;
            }
            merged.insert(field, value);
        }
        merged.insert("updatedAt".into(), serde_json::to_value(updated_at)?);

        let updated: Record<P> = serde_json::from_value(Value::Object(merged.clone()))
            .map_err(StorageError::InvalidPatch)?;
        *fields = merged;

        self.write_all(&records).await?;
        info!("Updated {} in {}", id, self.key());
        Ok(updated)
    }

    /// Deleting an id that isn't stored still rewrites the list but is not an error.
    pub async fn delete(&self, id: &RecordId) -> StorageResult<()> {
        let mut records = self.read_for_write().await?;
        let before = records.len();
        records.retain(|v| record_id(v) != Some(id.as_str()));
        if records.len() == before {
            debug!("Nothing to delete for {} in {}", id, self.key());
        }
        self.write_all(&records).await?;
        info!("Deleted {} from {}", id, self.key());
        Ok(())
    }

    /// Removes the whole namespace.
    pub async fn clear(&self) -> StorageResult<()> {
        clear(&self.store, &[P::NAMESPACE]).await
    }

    async fn read_raw(&self) -> StorageResult<Option<String>> {
        let key = self.key();
        let raw = self
            .store
            .get(key)
            .await
            .map_err(|source| StorageError::Read {
                key: key.to_string(),
                source,
            })?;
        Ok(raw.filter(|v| !v.trim().is_empty()))
    }

    /// Raw records a mutation starts from. Records are kept as plain JSON so whatever the payload
    /// type can't decode is written back unchanged. Only a value that isn't a JSON array at all is
    /// replaced, and a failed read is surfaced instead of being treated as empty.
    async fn read_for_write(&self) -> StorageResult<Vec<Value>> {
        let Some(raw) = self.read_raw().await? else {
            return Ok(vec![]);
        };
        match serde_json::from_str::<Vec<Value>>(&raw) {
            Ok(records) => Ok(records),
            Err(e) => {
                warn!("Replacing unreadable {}: {e}", self.key());
                Ok(vec![])
            }
        }
    }

    async fn write_all(&self, records: &[Value]) -> StorageResult<()> {
        let key = self.key();
        let raw = serde_json::to_string(records)?;
        self.store
            .set(key, raw)
            .await
            .map_err(|source| StorageError::Write {
                key: key.to_string(),
                source,
            })
    }

    /// The generator is random, but a collision would break id uniqueness inside the list, so
    /// it is checked anyway.
    fn fresh_id(&self, records: &[Value]) -> RecordId {
        loop {
            let id = self.ids.next_id();
            if records.iter().all(|v| record_id(v) != Some(id.as_str())) {
                return id;
            }
            warn!("Generated id {id} already exists in {}", self.key());
        }
    }
}

fn record_id(value: &Value) -> Option<&str> {
    value.get("id").and_then(Value::as_str)
}

/// `updatedAt` must move forward even when the clock hasn't since the last write.
fn next_update_time(now: DateTime<Utc>, previous: DateTime<Utc>) -> DateTime<Utc> {
    if now > previous {
        now
    } else {
        previous + Duration::milliseconds(1)
    }
}

/// Removes the given namespaces entirely. A removed namespace reads back as an empty list or
/// default value.
pub async fn clear(store: &impl KeyValueStore, namespaces: &[Namespace]) -> StorageResult<()> {
    let keys = namespaces
        .iter()
        .map(|v| v.key().to_string())
        .collect::<Vec<_>>();
    info!("Clearing {keys:?}");
    store
        .remove_many(keys.clone())
        .await
        .map_err(|source| StorageError::Write {
            key: keys.join(","),
            source,
        })
}
