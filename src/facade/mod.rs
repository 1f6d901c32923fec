//! Public localization surface
//!
//! [`LocalizationFacade`] composes the locale store, the catalog, the
//! resolver and a translation loader. It is an explicitly constructed,
//! cheaply clonable handle; pass it to whatever needs translations.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │              LocalizationFacade              │
//! │  set_current_language / translation_provider │
//! └──────────────────────────────────────────────┘
//!        │               │                │
//!        ▼               ▼                ▼
//!  ┌───────────┐  ┌─────────────┐  ┌────────────┐
//!  │LocaleStore│  │   Catalog   │◀─│ load task  │──▶ TranslationLoader
//!  │ + storage │  │ + Resolver  │  │ (spawned)  │
//!  └───────────┘  └─────────────┘  └────────────┘
//! ```
//!
//! # Loading rules
//!
//! - At most one load runs per locale; further requests attach to it.
//! - Every switch to a locale re-fetches it, even if it was loaded before.
//! - A load that finishes after the user moved on still updates the catalog,
//!   but subscribers are only notified about the current locale.
//! - Nothing is cancelled and nothing is retried automatically.
//!
//! # Example
//!
//! ```rust,no_run
//! use lingo::prelude::*;
//! use std::sync::Arc;
//!
//! # async fn example() -> lingo::error::Result<()> {
//! let loader = Arc::new(HttpLoader::new("https://example.com/")?);
//! let l10n = LocalizationFacade::new(loader);
//!
//! l10n.add_language("en")?;
//! l10n.add_language("it")?;
//! l10n.define_preferred_language("en", Some(30)).await?;
//! l10n.translation_provider(ProviderDescriptor::new("assets/locale")?).await?;
//!
//! let text = l10n.translate("home.title", &Args::new());
//! # Ok(())
//! # }
//! ```

mod events;

use futures::future::try_join_all;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::broadcast;

use crate::catalog::{BeginLoad, Dictionary, LoadState, LoadWaiter, TranslationCatalog};
use crate::error::Result;
use crate::loader::{ProviderDescriptor, TranslationLoader};
use crate::locale::{EnvLanguage, LanguageEnvironment, Locale, LocaleStore};
use crate::resolver::{Args, Resolver};
use crate::storage::{LocaleStorage, MemoryStorage};
use crate::utils::error::ProviderError;

pub use events::{Subscription, TranslationEvent};

/// Default capacity of the event channel
const DEFAULT_EVENT_CAPACITY: usize = 64;

/// Handle on a load started or joined by a facade call
#[derive(Debug)]
pub struct LoadHandle {
    waiter: LoadWaiter,
    started: bool,
}

impl LoadHandle {
    pub fn locale(&self) -> &Locale {
        self.waiter.locale()
    }

    /// Whether this call dispatched the fetch (false: joined a running one)
    pub fn started(&self) -> bool {
        self.started
    }

    /// Wait for the load to settle
    pub async fn wait(self) -> LoadState {
        self.waiter.wait().await
    }
}

struct Inner {
    store: LocaleStore,
    catalog: Arc<TranslationCatalog>,
    resolver: Resolver,
    loader: Arc<dyn TranslationLoader>,
    providers: RwLock<Vec<ProviderDescriptor>>,
    events: broadcast::Sender<TranslationEvent>,
    fetches: AtomicU64,
}

impl Inner {
    fn providers(&self) -> Vec<ProviderDescriptor> {
        self.providers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn is_current(&self, locale: &Locale) -> bool {
        self.store.current_language().as_ref() == Some(locale)
    }

    fn notify(&self, event: TranslationEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    /// Fetch every provider for `locale`, merge in registration order, and
    /// settle the catalog slot opened by `begin_load`
    async fn run_load(&self, locale: Locale, providers: Vec<ProviderDescriptor>) {
        self.fetches
            .fetch_add(providers.len() as u64, Ordering::SeqCst);

        let fetched = try_join_all(
            providers
                .iter()
                .map(|provider| self.loader.get(&locale, provider)),
        )
        .await;

        match fetched {
            Ok(parts) => {
                let mut dictionary = Dictionary::new();
                for part in parts {
                    dictionary.merge(part);
                }
                self.catalog.complete_load(&locale, dictionary);

                if self.is_current(&locale) {
                    self.notify(TranslationEvent::Ready { locale });
                } else {
                    tracing::debug!(locale = %locale, "Load finished for a locale that is no longer current");
                }
            }
            Err(e) => {
                let error = e.to_string();
                self.catalog.fail_load(&locale, &error);

                if self.is_current(&locale) {
                    self.notify(TranslationEvent::LoadFailed { locale, error });
                }
            }
        }
    }
}

/// Builder for [`LocalizationFacade`]
pub struct LocalizationFacadeBuilder {
    loader: Arc<dyn TranslationLoader>,
    storage: Arc<dyn LocaleStorage>,
    environment: Arc<dyn LanguageEnvironment>,
    event_capacity: usize,
}

impl LocalizationFacadeBuilder {
    /// Where the current locale is persisted (default: in memory)
    #[must_use]
    pub fn storage(mut self, storage: Arc<dyn LocaleStorage>) -> Self {
        self.storage = storage;
        self
    }

    /// Where the environment language comes from (default: POSIX env vars)
    #[must_use]
    pub fn environment(mut self, environment: Arc<dyn LanguageEnvironment>) -> Self {
        self.environment = environment;
        self
    }

    /// Capacity of the notification channel
    #[must_use]
    pub fn event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity.max(1);
        self
    }

    pub fn build(self) -> LocalizationFacade {
        let catalog = Arc::new(TranslationCatalog::new());
        let (events, _) = broadcast::channel(self.event_capacity);

        LocalizationFacade {
            inner: Arc::new(Inner {
                store: LocaleStore::new(self.storage, self.environment),
                resolver: Resolver::new(Arc::clone(&catalog)),
                catalog,
                loader: self.loader,
                providers: RwLock::new(Vec::new()),
                events,
                fetches: AtomicU64::new(0),
            }),
        }
    }
}

/// Translation lookup service with locale management and async loading
#[derive(Clone)]
pub struct LocalizationFacade {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for LocalizationFacade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalizationFacade")
            .field("current", &self.current_language())
            .field("loader", &self.inner.loader.name())
            .field("catalog", &self.inner.catalog)
            .finish_non_exhaustive()
    }
}

impl LocalizationFacade {
    /// Facade with in-memory persistence and the POSIX environment language
    pub fn new(loader: Arc<dyn TranslationLoader>) -> Self {
        Self::builder(loader).build()
    }

    pub fn builder(loader: Arc<dyn TranslationLoader>) -> LocalizationFacadeBuilder {
        LocalizationFacadeBuilder {
            loader,
            storage: Arc::new(MemoryStorage::new()),
            environment: Arc::new(EnvLanguage),
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }

    // ------------------------------------------------------------------
    // Configuration
    // ------------------------------------------------------------------

    /// Declare an available locale
    ///
    /// # Errors
    ///
    /// Fails for malformed or already registered codes.
    pub fn add_language(&self, code: &str) -> Result<Locale> {
        Ok(self.inner.store.add_language(code)?)
    }

    /// Declared locales in order
    pub fn languages(&self) -> Vec<Locale> {
        self.inner.store.languages()
    }

    /// Register translations embedded in the application
    ///
    /// # Errors
    ///
    /// Fails for malformed locale codes.
    pub fn add_translation(&self, code: &str, dictionary: Dictionary) -> Result<()> {
        let locale = Locale::parse(code)?;
        let ready = self.inner.catalog.register_direct(&locale, dictionary);

        // A running load announces readiness itself when it completes
        if ready && self.inner.is_current(&locale) {
            self.inner.notify(TranslationEvent::Ready { locale });
        }
        Ok(())
    }

    /// Resolve and activate the preferred locale (storage, environment,
    /// then `default_code`), loading it if providers are configured
    ///
    /// # Errors
    ///
    /// Fails if `default_code` is malformed.
    pub async fn define_preferred_language(
        &self,
        default_code: &str,
        expiry_days: Option<u32>,
    ) -> Result<Locale> {
        let locale = self
            .inner
            .store
            .define_preferred_language(default_code, expiry_days)
            .await?;

        self.inner.notify(TranslationEvent::LocaleChanged {
            locale: locale.clone(),
        });
        self.request_load(&locale);
        Ok(locale)
    }

    /// Register a provider without loading anything
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::EmptyPrefix` for a blank prefix.
    pub fn add_provider(&self, provider: ProviderDescriptor) -> Result<()> {
        provider.validate()?;

        let mut providers = self
            .inner
            .providers
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if !providers.contains(&provider) {
            tracing::debug!(prefix = %provider.prefix, version = ?provider.version, "Provider registered");
            providers.push(provider);
        }
        Ok(())
    }

    /// Register a provider and load the current locale with it
    ///
    /// If a load of the current locale is already running it was started
    /// without this provider; it is awaited and a fresh load is started.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::NoCurrentLocale` if no locale was established
    /// yet, and `ProviderError::EmptyPrefix` for a blank prefix.
    pub async fn translation_provider(&self, provider: ProviderDescriptor) -> Result<LoadHandle> {
        let locale = self
            .current_language()
            .ok_or(ProviderError::NoCurrentLocale)?;
        self.add_provider(provider)?;

        loop {
            match self.request_load(&locale) {
                Some(handle) if handle.started() => return Ok(handle),
                Some(joined) => {
                    joined.wait().await;
                }
                None => return Err(ProviderError::NoCurrentLocale.into()),
            }
        }
    }

    // ------------------------------------------------------------------
    // Locale switching
    // ------------------------------------------------------------------

    /// Switch the current locale and load its translations
    ///
    /// Switching to the locale that is already current does nothing: no
    /// storage write, no load, no notification.
    ///
    /// # Errors
    ///
    /// Fails for malformed locale codes.
    pub async fn set_current_language(&self, code: &str) -> Result<Option<LoadHandle>> {
        if !self.inner.store.set_current_language(code).await? {
            return Ok(None);
        }

        let locale = Locale::parse(code)?;
        self.inner.notify(TranslationEvent::LocaleChanged {
            locale: locale.clone(),
        });
        Ok(self.request_load(&locale))
    }

    /// The current locale, if one was established
    pub fn current_language(&self) -> Option<Locale> {
        self.inner.store.current_language()
    }

    /// Reload the current locale, e.g. after a failed load
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::NoCurrentLocale` if no locale was established.
    pub async fn reload(&self) -> Result<Option<LoadHandle>> {
        let locale = self
            .current_language()
            .ok_or(ProviderError::NoCurrentLocale)?;
        Ok(self.request_load(&locale))
    }

    /// Start or join a load for `locale`; `None` if no provider is configured
    fn request_load(&self, locale: &Locale) -> Option<LoadHandle> {
        let providers = self.inner.providers();
        if providers.is_empty() {
            return None;
        }

        match self.inner.catalog.begin_load(locale) {
            BeginLoad::InFlight(waiter) => Some(LoadHandle {
                waiter,
                started: false,
            }),
            BeginLoad::Started(waiter) => {
                let inner = Arc::clone(&self.inner);
                let locale = locale.clone();
                tokio::spawn(async move {
                    inner.run_load(locale, providers).await;
                });
                Some(LoadHandle {
                    waiter,
                    started: true,
                })
            }
        }
    }

    // ------------------------------------------------------------------
    // Lookup
    // ------------------------------------------------------------------

    /// Translate a key for the current locale; never blocks, never fails
    ///
    /// Missing keys, locales without translations and failed loads all
    /// render as the key itself.
    pub fn translate(&self, key: &str, args: &Args) -> String {
        self.inner
            .resolver
            .resolve(self.current_language().as_ref(), key, args)
    }

    /// Translate once the current locale is no longer loading
    pub async fn translate_async(&self, key: &str, args: Args) -> String {
        self.settle().await;
        self.translate(key, &args)
    }

    /// Wait until the current locale's load (if any) settles
    pub async fn settle(&self) -> LoadState {
        let Some(locale) = self.current_language() else {
            return LoadState::NotLoaded;
        };

        match self.inner.catalog.pending(&locale) {
            Some(waiter) => waiter.wait().await,
            None => self.inner.catalog.load_state(&locale),
        }
    }

    /// Load state of any locale
    ///
    /// # Errors
    ///
    /// Fails for malformed locale codes.
    pub fn load_state(&self, code: &str) -> Result<LoadState> {
        Ok(self.inner.catalog.load_state(&Locale::parse(code)?))
    }

    /// Subscribe to locale and translation changes
    pub fn subscribe(&self) -> Subscription {
        Subscription::new(self.inner.events.subscribe())
    }

    /// The underlying catalog, for inspection
    pub fn catalog(&self) -> &Arc<TranslationCatalog> {
        &self.inner.catalog
    }

    /// Number of loader fetches dispatched so far
    pub fn fetches_dispatched(&self) -> u64 {
        self.inner.fetches.load(Ordering::SeqCst)
    }
}
