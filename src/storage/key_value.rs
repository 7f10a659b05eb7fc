use std::{
    collections::HashMap,
    io::{ErrorKind, SeekFrom},
    ops::Deref,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use fs4::tokio::AsyncFileExt;
use tokio::{
    fs::File,
    io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt},
    sync::Mutex,
};
use tracing::debug;

/// Persistent string-keyed storage every namespace lives in. Values are opaque strings; the
/// layers above decide what they hold.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns `None` when nothing is stored under `key`.
    async fn get(&self, key: &str) -> std::io::Result<Option<String>>;

    async fn set(&self, key: &str, value: String) -> std::io::Result<()>;

    /// Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> std::io::Result<()>;

    async fn remove_many(&self, keys: Vec<String>) -> std::io::Result<()>;
}

#[async_trait]
impl<T> KeyValueStore for T
where
    T: Deref + Send + Sync,
    T::Target: KeyValueStore,
{
    async fn get(&self, key: &str) -> std::io::Result<Option<String>> {
        self.deref().get(key).await
    }

    async fn set(&self, key: &str, value: String) -> std::io::Result<()> {
        self.deref().set(key, value).await
    }

    async fn remove(&self, key: &str) -> std::io::Result<()> {
        self.deref().remove(key).await
    }

    async fn remove_many(&self, keys: Vec<String>) -> std::io::Result<()> {
        self.deref().remove_many(keys).await
    }
}

/// Keeps every key in its own `<key>.json` file inside one directory. Readers take a shared lock
/// and writers an exclusive one, so a read never observes a half written value.
pub struct FileKeyValueStore {
    dir: PathBuf,
}

impl FileKeyValueStore {
    pub fn new(dir: PathBuf) -> Result<Self, std::io::Error> {
        std::fs::create_dir_all(&dir)?;

        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> std::io::Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(std::io::Error::new(
                ErrorKind::InvalidInput,
                format!("Key {key:?} can't be used as a file name"),
            ));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }

    async fn read_locked(path: &Path) -> std::io::Result<String> {
        let mut file = File::open(path).await?;
        file.lock_shared()?;
        let mut content = String::new();
        let result = file.read_to_string(&mut content).await;
        file.unlock_async().await?;
        result.map(|_| content)
    }

    async fn write_locked(path: &Path, value: &str) -> std::io::Result<()> {
        let mut file = File::options()
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .await?;
        // Truncate only after the lock is held, otherwise a reader could see an empty file.
        file.lock_exclusive()?;
        let result = async {
            file.set_len(0).await?;
            file.seek(SeekFrom::Start(0)).await?;
            file.write_all(value.as_bytes()).await?;
            file.flush().await?;
            file.sync_data().await
        }
        .await;
        file.unlock_async().await?;
        result
    }
}

#[async_trait]
impl KeyValueStore for FileKeyValueStore {
    async fn get(&self, key: &str) -> std::io::Result<Option<String>> {
        let path = self.path_for(key)?;
        debug!("Reading {path:?}");
        match Self::read_locked(&path).await {
            Ok(v) => Ok(Some(v)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn set(&self, key: &str, value: String) -> std::io::Result<()> {
        let path = self.path_for(key)?;
        debug!("Writing {} bytes into {path:?}", value.len());
        Self::write_locked(&path, &value).await
    }

    async fn remove(&self, key: &str) -> std::io::Result<()> {
        let path = self.path_for(key)?;
        debug!("Removing {path:?}");
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }

    async fn remove_many(&self, keys: Vec<String>) -> std::io::Result<()> {
        for key in keys {
            self.remove(&key).await?;
        }
        Ok(())
    }
}

/// Volatile store, handy for tests and for embedding without a data directory.
#[derive(Default)]
pub struct MemoryKeyValueStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn get(&self, key: &str) -> std::io::Result<Option<String>> {
        Ok(self.values.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> std::io::Result<()> {
        self.values.lock().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> std::io::Result<()> {
        self.values.lock().await.remove(key);
        Ok(())
    }

    async fn remove_many(&self, keys: Vec<String>) -> std::io::Result<()> {
        let mut values = self.values.lock().await;
        for key in keys {
            values.remove(&key);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use anyhow::Result;
    use tempfile::tempdir;

    use super::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore};

    #[tokio::test]
    async fn file_store_basic() -> Result<()> {
        let dir = tempdir()?;
        let store = FileKeyValueStore::new(dir.path().join("data"))?;

        assert_eq!(store.get("reports").await?, None);

        store.set("reports", "[1,2,3]".into()).await?;
        assert_eq!(store.get("reports").await?.as_deref(), Some("[1,2,3]"));
        assert!(dir.path().join("data").join("reports.json").exists());

        // A shorter value must not leave a tail of the previous one behind.
        store.set("reports", "[]".into()).await?;
        assert_eq!(store.get("reports").await?.as_deref(), Some("[]"));

        store.remove("reports").await?;
        assert_eq!(store.get("reports").await?, None);
        store.remove("reports").await?;
        Ok(())
    }

    #[tokio::test]
    async fn file_store_remove_many() -> Result<()> {
        let dir = tempdir()?;
        let store = FileKeyValueStore::new(dir.path().to_owned())?;
        store.set("goals", "{}".into()).await?;
        store.set("workDays", "[1]".into()).await?;

        store
            .remove_many(vec!["goals".into(), "workDays".into(), "personalInfo".into()])
            .await?;

        assert_eq!(store.get("goals").await?, None);
        assert_eq!(store.get("workDays").await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn file_store_rejects_path_like_keys() -> Result<()> {
        let dir = tempdir()?;
        let store = FileKeyValueStore::new(dir.path().to_owned())?;
        assert!(store.set("../escape", "x".into()).await.is_err());
        assert!(store.get("").await.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn shared_store_through_arc() -> Result<()> {
        let store = Arc::new(MemoryKeyValueStore::new());
        let other = store.clone();
        store.set("goals", "{\"monthlyHours\":60}".into()).await?;
        assert_eq!(
            other.get("goals").await?.as_deref(),
            Some("{\"monthlyHours\":60}")
        );
        other.remove_many(vec!["goals".into()]).await?;
        assert_eq!(store.get("goals").await?, None);
        Ok(())
    }
}
