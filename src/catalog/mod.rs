//! In-memory translation catalog
//!
//! The catalog owns one [`Dictionary`] per locale together with that
//! locale's [`LoadState`]. It is the only mutable state shared between
//! translation lookups and background loads.
//!
//! # Invariants
//!
//! 1. **Atomic swap**: a dictionary is replaced wholesale by swapping an
//!    `Arc` under the write lock; readers clone the `Arc` under the read lock
//!    and never observe a partially updated dictionary.
//!
//! 2. **Single flight**: at most one load is `Loading` per locale. A second
//!    [`begin_load`](TranslationCatalog::begin_load) attaches to the running
//!    load instead of starting another.
//!
//! 3. **Last good data survives failures**: [`fail_load`](TranslationCatalog::fail_load)
//!    records the error but keeps the previous dictionary.
//!
//! # Lifecycle
//!
//! ```text
//! NotLoaded ──begin──▶ Loading ──complete──▶ Ready
//!                         │                    │
//!                         └──fail──▶ Failed    └──begin──▶ Loading ...
//!                                      │
//!                                      └──begin──▶ Loading ...
//! ```

pub mod dictionary;

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::watch;

use crate::locale::Locale;

pub use dictionary::{Dictionary, Entry, PATH_SEPARATOR};

/// Per-locale load state
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadState {
    /// Nothing requested yet
    #[default]
    NotLoaded,
    /// A fetch is in flight
    Loading,
    /// Dictionary available
    Ready,
    /// Last fetch failed; any earlier dictionary is still served
    Failed(String),
}

impl LoadState {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotLoaded => "not_loaded",
            Self::Loading => "loading",
            Self::Ready => "ready",
            Self::Failed(_) => "failed",
        }
    }
}

impl fmt::Display for LoadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Failed(reason) => write!(f, "failed: {reason}"),
            other => f.write_str(other.as_str()),
        }
    }
}

/// Outcome of [`TranslationCatalog::begin_load`]
#[derive(Debug)]
pub enum BeginLoad {
    /// The caller owns the new load and must finish it with
    /// `complete_load` or `fail_load`
    Started(LoadWaiter),
    /// A load was already running; the waiter follows that load
    InFlight(LoadWaiter),
}

impl BeginLoad {
    pub fn is_started(&self) -> bool {
        matches!(self, Self::Started(_))
    }

    pub fn into_waiter(self) -> LoadWaiter {
        match self {
            Self::Started(waiter) | Self::InFlight(waiter) => waiter,
        }
    }
}

/// Awaitable handle on a running load
#[derive(Debug, Clone)]
pub struct LoadWaiter {
    locale: Locale,
    rx: watch::Receiver<LoadState>,
}

impl LoadWaiter {
    pub fn locale(&self) -> &Locale {
        &self.locale
    }

    /// Wait until the load settles and return its final state
    pub async fn wait(mut self) -> LoadState {
        if self.rx.wait_for(|state| !state.is_loading()).await.is_err() {
            tracing::debug!(locale = %self.locale, "Catalog dropped while waiting for load");
        }
        let state = self.rx.borrow().clone();
        state
    }
}

struct Slot {
    dictionary: Option<Arc<Dictionary>>,
    state: watch::Sender<LoadState>,
}

impl Slot {
    fn new() -> Self {
        let (state, _) = watch::channel(LoadState::NotLoaded);
        Self {
            dictionary: None,
            state,
        }
    }

    fn state(&self) -> LoadState {
        self.state.borrow().clone()
    }
}

/// Locale to dictionary mapping with per-locale load tracking
pub struct TranslationCatalog {
    slots: RwLock<HashMap<Locale, Slot>>,
}

impl Default for TranslationCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TranslationCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TranslationCatalog")
            .field("locales", &self.locales())
            .finish()
    }
}

impl TranslationCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self {
            slots: RwLock::new(HashMap::new()),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<Locale, Slot>> {
        self.slots.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<Locale, Slot>> {
        self.slots.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert or replace a dictionary synchronously
    ///
    /// The locale becomes `Ready` unless a load is in flight, in which case
    /// it stays `Loading` so the running load keeps its single-flight slot.
    /// Returns whether the locale is now `Ready`.
    pub fn register_direct(&self, locale: &Locale, dictionary: Dictionary) -> bool {
        let ready = {
            let mut slots = self.write();
            let slot = slots.entry(locale.clone()).or_insert_with(Slot::new);
            slot.dictionary = Some(Arc::new(dictionary));
            if slot.state().is_loading() {
                false
            } else {
                slot.state.send_replace(LoadState::Ready);
                true
            }
        };

        tracing::debug!(locale = %locale, ready, "Dictionary registered directly");
        ready
    }

    /// Start loading a locale, or attach to the load already running
    pub fn begin_load(&self, locale: &Locale) -> BeginLoad {
        let mut slots = self.write();
        let slot = slots.entry(locale.clone()).or_insert_with(Slot::new);

        let waiter = LoadWaiter {
            locale: locale.clone(),
            rx: slot.state.subscribe(),
        };

        if slot.state().is_loading() {
            tracing::debug!(locale = %locale, "Load already in flight, attaching");
            return BeginLoad::InFlight(waiter);
        }

        slot.state.send_replace(LoadState::Loading);
        tracing::debug!(locale = %locale, "Load started");
        BeginLoad::Started(waiter)
    }

    /// Waiter on the load currently running for a locale, if any
    pub fn pending(&self, locale: &Locale) -> Option<LoadWaiter> {
        self.read()
            .get(locale)
            .filter(|slot| slot.state().is_loading())
            .map(|slot| LoadWaiter {
                locale: locale.clone(),
                rx: slot.state.subscribe(),
            })
    }

    /// Swap in a freshly loaded dictionary and mark the locale `Ready`
    pub fn complete_load(&self, locale: &Locale, dictionary: Dictionary) {
        let entries = dictionary.len();
        {
            let mut slots = self.write();
            let slot = slots.entry(locale.clone()).or_insert_with(Slot::new);
            slot.dictionary = Some(Arc::new(dictionary));
            slot.state.send_replace(LoadState::Ready);
        }

        tracing::info!(locale = %locale, entries, "Translations loaded");
    }

    /// Record a failed load, keeping any previous dictionary
    pub fn fail_load(&self, locale: &Locale, error: impl fmt::Display) {
        let error = error.to_string();
        {
            let mut slots = self.write();
            let slot = slots.entry(locale.clone()).or_insert_with(Slot::new);
            slot.state.send_replace(LoadState::Failed(error.clone()));
        }

        tracing::warn!(locale = %locale, error = %error, "Translation load failed");
    }

    /// Current load state of a locale
    pub fn load_state(&self, locale: &Locale) -> LoadState {
        self.read()
            .get(locale)
            .map(Slot::state)
            .unwrap_or_default()
    }

    /// Last good dictionary of a locale, whatever its current load state
    pub fn dictionary(&self, locale: &Locale) -> Option<Arc<Dictionary>> {
        self.read()
            .get(locale)
            .and_then(|slot| slot.dictionary.clone())
    }

    /// Resolve a key against a locale's dictionary
    pub fn lookup(&self, locale: &Locale, key: &str) -> Option<Entry> {
        self.dictionary(locale)
            .and_then(|dict| dict.get(key).cloned())
    }

    /// Locales with a slot in the catalog, sorted
    pub fn locales(&self) -> Vec<Locale> {
        let mut locales: Vec<Locale> = self.read().keys().cloned().collect();
        locales.sort();
        locales
    }
}
