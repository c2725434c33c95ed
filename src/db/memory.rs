use super::RecordStore;
use async_trait::async_trait;
use color_eyre::eyre::{eyre, Report};
use std::collections::btree_map::{BTreeMap, Entry};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// In-process backend. Keys are kept ordered so prefix scans are a range walk.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, BTreeMap<String, String>>, Report> {
        self.entries
            .read()
            .map_err(|_| eyre!("memory store lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, BTreeMap<String, String>>, Report> {
        self.entries
            .write()
            .map_err(|_| eyre!("memory store lock poisoned"))
    }
}

#[async_trait(?Send)]
impl RecordStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, Report> {
        Ok(self.read()?.get(key).cloned())
    }

    async fn scan(&self, prefix: &str) -> Result<Vec<String>, Report> {
        Ok(self
            .read()?
            .range(prefix.to_owned()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(_, value)| value.clone())
            .collect())
    }

    async fn set(&self, key: &str, value: String) -> Result<(), Report> {
        self.write()?.insert(key.to_owned(), value);
        Ok(())
    }

    async fn set_if_absent(&self, key: &str, value: String) -> Result<bool, Report> {
        match self.write()?.entry(key.to_owned()) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(slot) => {
                slot.insert(value);
                Ok(true)
            }
        }
    }

    async fn delete(&self, key: &str) -> Result<bool, Report> {
        Ok(self.write()?.remove(key).is_some())
    }
}
