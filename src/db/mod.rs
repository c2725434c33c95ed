pub mod memory;
pub mod poll;
pub mod redis;
pub mod vote;
pub mod voter;

use async_trait::async_trait;
use color_eyre::eyre::{Report, WrapErr};
use serde::{de::DeserializeOwned, Serialize};
use std::{fmt::Display, marker::PhantomData, sync::Arc};
use tracing::debug;

pub use self::memory::MemoryStore;
pub use self::redis::RedisStore;

/// Key-value persistence shared by every entity kind.
///
/// Values are JSON documents, keys are `"<prefix>:<id>"`.
#[async_trait(?Send)]
pub trait RecordStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, Report>;

    /// Returns every value whose key starts with `prefix`.
    async fn scan(&self, prefix: &str) -> Result<Vec<String>, Report>;

    /// Overwrites any existing value.
    async fn set(&self, key: &str, value: String) -> Result<(), Report>;

    /// Stores `value` only when `key` is vacant, in one atomic step.
    /// Returns `false` and leaves the old value when `key` is taken.
    async fn set_if_absent(&self, key: &str, value: String) -> Result<bool, Report>;

    /// Returns `false` when nothing was stored under `key`.
    async fn delete(&self, key: &str) -> Result<bool, Report>;
}

pub type SharedStore = Arc<dyn RecordStore>;

/// Declares a transparent, copyable identifier wrapping a `u64`.
macro_rules! id_type {
    ($name:ident) => {
        #[derive(
            Clone,
            Copy,
            Hash,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Debug,
            Default,
            serde::Deserialize,
            serde::Serialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                value.parse().map($name)
            }
        }
    };
}

id_type!(VoterId);
id_type!(PollId);
id_type!(PollOptionId);
id_type!(VoteId);

/// A document stored under its own key.
pub trait Record: Serialize + DeserializeOwned + 'static {
    type Id: Copy + Ord + Display;

    /// Key prefix, also used as the entity name in messages.
    const PREFIX: &'static str;

    fn id(&self) -> Self::Id;
}

/// Typed view over a [`RecordStore`] for a single record kind.
pub struct Records<T> {
    store: SharedStore,
    _record: PhantomData<fn() -> T>,
}

impl<T> Clone for Records<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            _record: PhantomData,
        }
    }
}

impl<T: Record> Records<T> {
    pub fn new(store: SharedStore) -> Self {
        Self {
            store,
            _record: PhantomData,
        }
    }

    pub fn key(id: T::Id) -> String {
        format!("{}:{}", T::PREFIX, id)
    }

    pub async fn get(&self, id: T::Id) -> Result<Option<T>, Report> {
        let key = Self::key(id);
        debug!(key = key.as_str(), "Reading record");
        match self.store.get(&key).await? {
            Some(raw) => Ok(Some(decode(&key, &raw)?)),
            None => Ok(None),
        }
    }

    /// All records of this kind ordered by id.
    pub async fn list(&self) -> Result<Vec<T>, Report> {
        let prefix = format!("{}:", T::PREFIX);
        let mut records = self
            .store
            .scan(&prefix)
            .await?
            .iter()
            .map(|raw| decode(&prefix, raw))
            .collect::<Result<Vec<T>, Report>>()?;
        records.sort_by_key(|record| record.id());
        Ok(records)
    }

    pub async fn put(&self, record: &T) -> Result<(), Report> {
        let (key, raw) = encode(record)?;
        debug!(key = key.as_str(), "Writing record");
        self.store.set(&key, raw).await
    }

    /// Writes `record` unless its id is taken. Returns `false` on a clash.
    pub async fn insert(&self, record: &T) -> Result<bool, Report> {
        let (key, raw) = encode(record)?;
        debug!(key = key.as_str(), "Inserting record");
        self.store.set_if_absent(&key, raw).await
    }

    pub async fn remove(&self, id: T::Id) -> Result<bool, Report> {
        self.store.delete(&Self::key(id)).await
    }
}

fn encode<T: Record>(record: &T) -> Result<(String, String), Report> {
    let key = Records::<T>::key(record.id());
    let raw = serde_json::to_string(record)
        .wrap_err_with(|| format!("could not encode record {}", key))?;
    Ok((key, raw))
}

fn decode<T: DeserializeOwned>(key: &str, raw: &str) -> Result<T, Report> {
    serde_json::from_str(raw).wrap_err_with(|| format!("corrupt record under {}", key))
}

#[cfg(test)]
mod tests {
    use super::voter::Voter;
    use super::*;

    fn voter(id: u64, first: &str) -> Voter {
        Voter {
            id: VoterId(id),
            first_name: first.to_owned(),
            last_name: "Doe".to_owned(),
            vote_history: vec![],
        }
    }

    #[test]
    fn keys_use_entity_prefix() {
        assert_eq!(Records::<Voter>::key(VoterId(42)), "voter:42");
    }

    #[actix_rt::test]
    async fn list_is_ordered_by_id_not_by_key() {
        let records = Records::<Voter>::new(Arc::new(MemoryStore::new()));
        for id in &[10, 2, 1] {
            records.put(&voter(*id, "Jane")).await.unwrap();
        }
        let ids: Vec<u64> = records
            .list()
            .await
            .unwrap()
            .iter()
            .map(|v| v.id.0)
            .collect();
        assert_eq!(ids, vec![1, 2, 10]);
    }

    #[actix_rt::test]
    async fn insert_keeps_the_first_record() {
        let records = Records::<Voter>::new(Arc::new(MemoryStore::new()));
        assert!(records.insert(&voter(1, "Jane")).await.unwrap());
        assert!(!records.insert(&voter(1, "John")).await.unwrap());
        assert_eq!(records.get(VoterId(1)).await.unwrap(), Some(voter(1, "Jane")));
    }

    #[actix_rt::test]
    async fn corrupt_document_is_an_error() {
        let store = Arc::new(MemoryStore::new());
        store.set("voter:1", "not json".to_owned()).await.unwrap();
        let records = Records::<Voter>::new(store);
        assert!(records.get(VoterId(1)).await.is_err());
    }
}
