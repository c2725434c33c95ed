//! CRUD logic shared by every entity kind.
//!
//! An [`EntityService`] validates a request against what is stored and then
//! delegates to its [`Records`] view. Updates are merges: fields the caller
//! left empty keep their stored value, so an update can never blank a field.

pub mod detail;
pub mod poll;
pub mod vote;
pub mod voter;

use crate::db::{Record, Records, SharedStore};
use crate::error::ApiError;
use std::collections::HashSet;
use std::fmt::Display;
use std::hash::Hash;
use tracing::{debug, info};

/// A record kind with update semantics.
pub trait Entity: Record + Clone {
    /// Combines an update body with the stored record. Empty fields of `self`
    /// are taken from `existing`.
    fn merge(self, existing: &Self) -> Self;

    /// Rejects records whose nested collections repeat an id.
    fn validate(&self) -> Result<(), ApiError> {
        Ok(())
    }
}

/// An item living inside its parent's collection, unique by key within it.
pub trait Nested: Clone {
    type Key: Copy + Eq + Hash + Display;

    const NAME: &'static str;

    fn key(&self) -> Self::Key;

    fn merge(self, existing: &Self) -> Self;
}

pub struct EntityService<T> {
    records: Records<T>,
}

impl<T> Clone for EntityService<T> {
    fn clone(&self) -> Self {
        Self {
            records: self.records.clone(),
        }
    }
}

impl<T: Entity> EntityService<T> {
    pub fn new(store: SharedStore) -> Self {
        Self {
            records: Records::new(store),
        }
    }

    pub async fn list(&self) -> Result<Vec<T>, ApiError> {
        Ok(self.records.list().await?)
    }

    pub async fn get(&self, id: T::Id) -> Result<T, ApiError> {
        self.records
            .get(id)
            .await?
            .ok_or_else(|| not_found::<T>(id))
    }

    /// The id check and the write are one atomic store operation, so of two
    /// overlapping creates for the same id exactly one wins.
    pub async fn create(&self, id: T::Id, record: T) -> Result<T, ApiError> {
        ensure_same_id(T::PREFIX, id, record.id())?;
        record.validate()?;
        if !self.records.insert(&record).await? {
            return Err(ApiError::Conflict(format!(
                "{} {} already exists",
                T::PREFIX,
                id
            )));
        }
        info!("Created {} {}", T::PREFIX, id);
        Ok(record)
    }

    pub async fn update(&self, id: T::Id, record: T) -> Result<T, ApiError> {
        ensure_same_id(T::PREFIX, id, record.id())?;
        let existing = self.get(id).await?;
        let merged = record.merge(&existing);
        merged.validate()?;
        self.records.put(&merged).await?;
        debug!("Updated {} {}", T::PREFIX, id);
        Ok(merged)
    }

    pub async fn delete(&self, id: T::Id) -> Result<(), ApiError> {
        if !self.records.remove(id).await? {
            return Err(not_found::<T>(id));
        }
        info!("Deleted {} {}", T::PREFIX, id);
        Ok(())
    }

    /// Loads the parent, lets `edit` change one of its collections and stores
    /// the result. Nothing is written when `edit` fails.
    ///
    /// Read and write are separate store calls: two overlapping edits of the
    /// same parent are last-write-wins and one of them can be lost.
    pub(crate) async fn modify<R, F>(&self, id: T::Id, edit: F) -> Result<R, ApiError>
    where
        F: FnOnce(&mut T) -> Result<R, ApiError>,
    {
        let mut record = self.get(id).await?;
        let result = edit(&mut record)?;
        self.records.put(&record).await?;
        Ok(result)
    }
}

fn not_found<T: Record>(id: T::Id) -> ApiError {
    ApiError::NotFound(format!("{} {} not found", T::PREFIX, id))
}

pub(crate) fn ensure_same_id<I: PartialEq + Display>(
    what: &str,
    url_id: I,
    body_id: I,
) -> Result<(), ApiError> {
    if url_id != body_id {
        return Err(ApiError::BadRequest(format!(
            "{} id in url ({}) and body ({}) do not match",
            what, url_id, body_id
        )));
    }
    Ok(())
}

pub(crate) fn ensure_unique<S: Nested>(items: &[S]) -> Result<(), ApiError> {
    let mut seen = HashSet::with_capacity(items.len());
    for item in items {
        if !seen.insert(item.key()) {
            return Err(ApiError::BadRequest(format!(
                "{} {} appears more than once",
                S::NAME,
                item.key()
            )));
        }
    }
    Ok(())
}

pub(crate) fn find_nested<S: Nested>(items: &[S], key: S::Key) -> Result<&S, ApiError> {
    items
        .iter()
        .find(|item| item.key() == key)
        .ok_or_else(|| ApiError::NotFound(format!("{} {} not found", S::NAME, key)))
}

pub(crate) fn insert_nested<S: Nested>(items: &mut Vec<S>, item: S) -> Result<S, ApiError> {
    if items.iter().any(|existing| existing.key() == item.key()) {
        return Err(ApiError::Conflict(format!(
            "{} {} already exists",
            S::NAME,
            item.key()
        )));
    }
    items.push(item.clone());
    Ok(item)
}

pub(crate) fn update_nested<S: Nested>(items: &mut [S], update: S) -> Result<S, ApiError> {
    let key = update.key();
    let slot = items
        .iter_mut()
        .find(|item| item.key() == key)
        .ok_or_else(|| ApiError::NotFound(format!("{} {} not found", S::NAME, key)))?;
    let merged = update.merge(slot);
    *slot = merged.clone();
    Ok(merged)
}

pub(crate) fn remove_nested<S: Nested>(items: &mut Vec<S>, key: S::Key) -> Result<(), ApiError> {
    let position = items
        .iter()
        .position(|item| item.key() == key)
        .ok_or_else(|| ApiError::NotFound(format!("{} {} not found", S::NAME, key)))?;
    items.remove(position);
    Ok(())
}

/// Keeps `existing` when `update` is empty.
pub(crate) fn or_existing(update: String, existing: &str) -> String {
    if update.is_empty() {
        existing.to_owned()
    } else {
        update
    }
}
