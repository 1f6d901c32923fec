//! Current locale and locale registry
//!
//! The [`LocaleStore`] owns the process-wide current locale. It is changed
//! only through [`define_preferred_language`](LocaleStore::define_preferred_language)
//! and [`set_current_language`](LocaleStore::set_current_language), and every
//! change is written to the [`LocaleStorage`] backend.
//!
//! Persistence is best effort: a failing backend is logged and the in-memory
//! current locale stays authoritative.
//!
//! Changes are serialized with their storage writes, so the persisted locale
//! always ends up equal to the last current locale.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tokio::sync::Mutex;

use super::{LanguageEnvironment, Locale, LocaleRegistry};
use crate::storage::LocaleStorage;
use crate::utils::error::LocaleError;

#[derive(Debug, Default)]
struct StoreState {
    registry: LocaleRegistry,
    current: Option<Locale>,
    expiry_days: Option<u32>,
}

/// Holds the registry and the current locale, persisting changes
pub struct LocaleStore {
    state: RwLock<StoreState>,
    storage: Arc<dyn LocaleStorage>,
    environment: Arc<dyn LanguageEnvironment>,
    // Held from a change of `current` until its write completes
    change_lock: Mutex<()>,
}

impl std::fmt::Debug for LocaleStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocaleStore")
            .field("state", &*self.read())
            .finish_non_exhaustive()
    }
}

impl LocaleStore {
    /// Create a store over a persistence backend and an environment
    pub fn new(storage: Arc<dyn LocaleStorage>, environment: Arc<dyn LanguageEnvironment>) -> Self {
        Self {
            state: RwLock::new(StoreState::default()),
            storage,
            environment,
            change_lock: Mutex::new(()),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, StoreState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, StoreState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register an available locale
    ///
    /// # Errors
    ///
    /// Returns `LocaleError::InvalidCode` for malformed codes and
    /// `LocaleError::Duplicate` if the code is already registered.
    pub fn add_language(&self, code: &str) -> Result<Locale, LocaleError> {
        let locale = Locale::parse(code)?;
        self.write().registry.add(locale.clone())?;
        tracing::debug!(locale = %locale, "Language registered");
        Ok(locale)
    }

    /// Registered locales in declaration order
    pub fn languages(&self) -> Vec<Locale> {
        self.read().registry.locales().to_vec()
    }

    /// Resolve, persist and activate the preferred locale
    ///
    /// Resolution order:
    /// 1. locale previously persisted in storage
    /// 2. environment language, if it matches a registered locale
    /// 3. `default_code`
    ///
    /// The expiry is remembered and reused by later
    /// [`set_current_language`](Self::set_current_language) writes.
    ///
    /// # Errors
    ///
    /// Returns `LocaleError::InvalidCode` if `default_code` is malformed.
    pub async fn define_preferred_language(
        &self,
        default_code: &str,
        expiry_days: Option<u32>,
    ) -> Result<Locale, LocaleError> {
        let default = Locale::parse(default_code)?;
        let _change = self.change_lock.lock().await;

        let stored = match self.storage.read().await {
            Ok(stored) => stored,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read persisted locale, ignoring");
                None
            }
        };

        let locale = match stored {
            Some(stored) => {
                tracing::debug!(locale = %stored, "Using persisted locale");
                stored
            }
            None => self.negotiated().unwrap_or(default),
        };

        {
            let mut state = self.write();
            state.expiry_days = expiry_days;
            state.current = Some(locale.clone());
        }
        self.persist(&locale, expiry_days).await;

        tracing::info!(locale = %locale, "Preferred language defined");
        Ok(locale)
    }

    /// Switch the current locale
    ///
    /// Returns `false` without touching storage if `code` is already current.
    ///
    /// # Errors
    ///
    /// Returns `LocaleError::InvalidCode` if `code` is malformed.
    pub async fn set_current_language(&self, code: &str) -> Result<bool, LocaleError> {
        let locale = Locale::parse(code)?;
        let _change = self.change_lock.lock().await;

        let expiry_days = {
            let mut state = self.write();
            if state.current.as_ref() == Some(&locale) {
                return Ok(false);
            }
            if !state.registry.is_empty() && !state.registry.contains(&locale) {
                tracing::warn!(locale = %locale, "Switching to a locale that was never registered");
            }
            state.current = Some(locale.clone());
            state.expiry_days
        };
        self.persist(&locale, expiry_days).await;

        tracing::info!(locale = %locale, "Current language changed");
        Ok(true)
    }

    /// The current locale, if one was established
    pub fn current_language(&self) -> Option<Locale> {
        self.read().current.clone()
    }

    fn negotiated(&self) -> Option<Locale> {
        let language = self.environment.current_language()?;
        let negotiated = self.read().registry.negotiate(&language).cloned();
        if let Some(locale) = &negotiated {
            tracing::debug!(locale = %locale, environment = %language, "Using environment language");
        }
        negotiated
    }

    async fn persist(&self, locale: &Locale, expiry_days: Option<u32>) {
        if let Err(e) = self.storage.write(locale, expiry_days).await {
            tracing::warn!(locale = %locale, error = %e, "Failed to persist locale");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locale::FixedLanguage;
    use crate::storage::{LocaleStorage, MemoryStorage, StorageResult};
    use crate::utils::error::StorageError;
    use async_trait::async_trait;

    fn store_with(storage: Arc<MemoryStorage>, env: FixedLanguage) -> LocaleStore {
        LocaleStore::new(storage, Arc::new(env))
    }

    fn loc(code: &str) -> Locale {
        Locale::parse(code).unwrap()
    }

    struct BrokenStorage;

    /// Memory storage whose writes of one locale are slow
    struct SlowStorage {
        inner: MemoryStorage,
        slow: Locale,
    }

    #[async_trait]
    impl LocaleStorage for SlowStorage {
        async fn read(&self) -> StorageResult<Option<Locale>> {
            self.inner.read().await
        }

        async fn write(&self, locale: &Locale, expiry_days: Option<u32>) -> StorageResult<()> {
            if *locale == self.slow {
                tokio::time::sleep(std::time::Duration::from_millis(50)).await;
            }
            self.inner.write(locale, expiry_days).await
        }
    }

    #[async_trait]
    impl LocaleStorage for BrokenStorage {
        async fn read(&self) -> StorageResult<Option<Locale>> {
            Err(StorageError::Unavailable("offline".into()))
        }

        async fn write(&self, _: &Locale, _: Option<u32>) -> StorageResult<()> {
            Err(StorageError::Unavailable("offline".into()))
        }
    }

    #[tokio::test]
    async fn test_default_when_nothing_matches() {
        let storage = Arc::new(MemoryStorage::new());
        let store = store_with(Arc::clone(&storage), FixedLanguage::new("fr"));
        store.add_language("en").unwrap();
        store.add_language("it").unwrap();

        let locale = store.define_preferred_language("en", None).await.unwrap();

        assert_eq!(locale, loc("en"));
        assert_eq!(store.current_language(), Some(loc("en")));
        assert_eq!(storage.read().await.unwrap(), Some(loc("en")));
    }

    #[tokio::test]
    async fn test_environment_language_when_registered() {
        let storage = Arc::new(MemoryStorage::new());
        let store = store_with(storage, FixedLanguage::new("it_IT.UTF-8"));
        store.add_language("en").unwrap();
        store.add_language("it").unwrap();

        let locale = store.define_preferred_language("en", Some(30)).await.unwrap();
        assert_eq!(locale, loc("it"));
    }

    #[tokio::test]
    async fn test_persisted_locale_wins() {
        let storage = Arc::new(MemoryStorage::with_locale(loc("de")));
        let store = store_with(Arc::clone(&storage), FixedLanguage::new("it"));
        store.add_language("it").unwrap();

        let locale = store.define_preferred_language("en", Some(7)).await.unwrap();
        assert_eq!(locale, loc("de"));
        assert!(storage.expiry().is_some());
    }

    #[tokio::test]
    async fn test_set_current_is_idempotent() {
        let storage = Arc::new(MemoryStorage::new());
        let store = store_with(Arc::clone(&storage), FixedLanguage::none());

        assert!(store.set_current_language("en").await.unwrap());
        assert_eq!(storage.write_count(), 1);

        assert!(!store.set_current_language("en").await.unwrap());
        assert_eq!(storage.write_count(), 1);

        assert!(store.set_current_language("it").await.unwrap());
        assert_eq!(storage.write_count(), 2);
        assert_eq!(store.current_language(), Some(loc("it")));
    }

    #[tokio::test]
    async fn test_set_current_reuses_expiry() {
        let storage = Arc::new(MemoryStorage::new());
        let store = store_with(Arc::clone(&storage), FixedLanguage::none());

        store.define_preferred_language("en", Some(10)).await.unwrap();
        store.set_current_language("it").await.unwrap();

        let days = (storage.expiry().unwrap() - chrono::Utc::now()).num_days();
        assert!((9..=10).contains(&days));
    }

    #[tokio::test]
    async fn test_duplicate_and_invalid_codes() {
        let store = store_with(Arc::new(MemoryStorage::new()), FixedLanguage::none());
        store.add_language("en").unwrap();

        assert_eq!(
            store.add_language("en"),
            Err(LocaleError::Duplicate("en".into()))
        );
        assert!(matches!(
            store.set_current_language("e n").await,
            Err(LocaleError::InvalidCode(_))
        ));
        assert!(matches!(
            store.define_preferred_language("", None).await,
            Err(LocaleError::InvalidCode(_))
        ));
        assert_eq!(store.languages(), vec![loc("en")]);
    }

    #[tokio::test]
    async fn test_storage_failures_do_not_block() {
        let store = LocaleStore::new(Arc::new(BrokenStorage), Arc::new(FixedLanguage::none()));

        let locale = store.define_preferred_language("en", None).await.unwrap();
        assert_eq!(locale, loc("en"));
        assert!(store.set_current_language("it").await.unwrap());
        assert_eq!(store.current_language(), Some(loc("it")));
    }

    #[tokio::test]
    async fn test_persisted_locale_follows_last_change() {
        let storage = Arc::new(SlowStorage {
            inner: MemoryStorage::new(),
            slow: loc("it"),
        });
        let store = LocaleStore::new(
            Arc::clone(&storage) as Arc<dyn LocaleStorage>,
            Arc::new(FixedLanguage::none()),
        );

        let (first, second) = tokio::join!(store.set_current_language("it"), async {
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
            store.set_current_language("de").await
        });

        assert!(first.unwrap());
        assert!(second.unwrap());
        assert_eq!(store.current_language(), Some(loc("de")));
        assert_eq!(storage.inner.read().await.unwrap(), Some(loc("de")));
        assert_eq!(storage.inner.write_count(), 2);
    }
}
