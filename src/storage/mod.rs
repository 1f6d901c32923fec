//! Persistence of the selected locale
//!
//! The active locale survives restarts through a [`LocaleStorage`] backend.
//! Any key-value store with an optional time-to-live satisfies the contract;
//! two are provided:
//!
//! - [`MemoryStorage`] - process-local, useful for tests and embedded hosts
//! - [`FileStorage`] - a small JSON record on disk, the equivalent of a
//!   `locale` cookie with an expiry

mod file;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::sync::{Mutex, PoisonError};

use crate::locale::Locale;
use crate::utils::error::StorageError;

pub use file::FileStorage;

/// Name under which the locale is persisted
pub const LOCALE_KEY: &str = "locale";

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Backend that persists and restores the active locale
#[async_trait]
pub trait LocaleStorage: Send + Sync {
    /// Read the persisted locale, `None` if absent or expired
    async fn read(&self) -> StorageResult<Option<Locale>>;

    /// Persist a locale, optionally expiring after `expiry_days`
    async fn write(&self, locale: &Locale, expiry_days: Option<u32>) -> StorageResult<()>;
}

/// Compute the absolute expiry for a write made now
pub(crate) fn expires_at(expiry_days: Option<u32>) -> Option<DateTime<Utc>> {
    expiry_days.map(|days| Utc::now() + Duration::days(i64::from(days)))
}

/// In-memory locale storage with optional expiry
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entry: Mutex<Option<(Locale, Option<DateTime<Utc>>)>>,
    writes: Mutex<u64>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-seeded with a persisted locale
    pub fn with_locale(locale: Locale) -> Self {
        Self {
            entry: Mutex::new(Some((locale, None))),
            writes: Mutex::new(0),
        }
    }

    /// Number of writes performed so far
    pub fn write_count(&self) -> u64 {
        *self.writes.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Expiry of the stored entry, if any
    pub fn expiry(&self) -> Option<DateTime<Utc>> {
        self.entry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .and_then(|(_, exp)| *exp)
    }
}

#[async_trait]
impl LocaleStorage for MemoryStorage {
    async fn read(&self) -> StorageResult<Option<Locale>> {
        let mut entry = self.entry.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some((_, Some(exp))) = entry.as_ref() {
            if *exp <= Utc::now() {
                *entry = None;
            }
        }

        Ok(entry.as_ref().map(|(locale, _)| locale.clone()))
    }

    async fn write(&self, locale: &Locale, expiry_days: Option<u32>) -> StorageResult<()> {
        *self.entry.lock().unwrap_or_else(PoisonError::into_inner) =
            Some((locale.clone(), expires_at(expiry_days)));
        *self.writes.lock().unwrap_or_else(PoisonError::into_inner) += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(code: &str) -> Locale {
        Locale::parse(code).unwrap()
    }

    #[tokio::test]
    async fn test_memory_storage_roundtrip() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.read().await.unwrap(), None);

        storage.write(&loc("it"), Some(30)).await.unwrap();
        assert_eq!(storage.read().await.unwrap(), Some(loc("it")));
        assert_eq!(storage.write_count(), 1);

        let expiry = storage.expiry().unwrap();
        let days = (expiry - Utc::now()).num_days();
        assert!((29..=30).contains(&days));
    }

    #[tokio::test]
    async fn test_memory_storage_expired_entry_is_dropped() {
        let storage = MemoryStorage::new();
        storage.write(&loc("en"), Some(0)).await.unwrap();

        assert_eq!(storage.read().await.unwrap(), None);
        assert_eq!(storage.expiry(), None);
    }

    #[tokio::test]
    async fn test_memory_storage_preseeded() {
        let storage = MemoryStorage::with_locale(loc("fr"));
        assert_eq!(storage.read().await.unwrap(), Some(loc("fr")));
        assert_eq!(storage.write_count(), 0);
    }
}
