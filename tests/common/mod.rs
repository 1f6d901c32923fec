//! Common test utilities

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Semaphore;

use lingo::catalog::Dictionary;
use lingo::facade::{Subscription, TranslationEvent};
use lingo::loader::{ProviderDescriptor, TranslationLoader};
use lingo::locale::{FixedLanguage, Locale};
use lingo::storage::{LocaleStorage, MemoryStorage};
use lingo::utils::error::LoadError;
use lingo::LocalizationFacade;

/// In-memory loader whose fetches can be held back per locale
///
/// Every fetch is counted. A gated locale blocks until [`open`](Self::open)
/// is called for it.
#[derive(Default)]
pub struct GatedLoader {
    assets: Mutex<HashMap<String, Option<String>>>,
    gates: Mutex<HashMap<String, Arc<Semaphore>>>,
    calls: Mutex<HashMap<String, usize>>,
}

#[allow(dead_code)]
impl GatedLoader {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Serve `json` for `code`
    pub fn serve(&self, code: &str, json: &str) {
        self.assets
            .lock()
            .unwrap()
            .insert(code.to_string(), Some(json.to_string()));
    }

    /// Make fetches of `code` fail with a server error
    pub fn fail(&self, code: &str) {
        self.assets.lock().unwrap().insert(code.to_string(), None);
    }

    /// Hold fetches of `code` until opened
    pub fn gate(&self, code: &str) {
        self.gates
            .lock()
            .unwrap()
            .insert(code.to_string(), Arc::new(Semaphore::new(0)));
    }

    /// Release every held and future fetch of `code`
    pub fn open(&self, code: &str) {
        if let Some(gate) = self.gates.lock().unwrap().remove(code) {
            gate.add_permits(Semaphore::MAX_PERMITS / 2);
        }
    }

    /// Fetches dispatched for `code`
    pub fn calls(&self, code: &str) -> usize {
        self.calls.lock().unwrap().get(code).copied().unwrap_or(0)
    }
}

#[async_trait]
impl TranslationLoader for GatedLoader {
    fn name(&self) -> &str {
        "gated"
    }

    async fn get(
        &self,
        locale: &Locale,
        provider: &ProviderDescriptor,
    ) -> Result<Dictionary, LoadError> {
        let code = locale.code().to_string();
        *self.calls.lock().unwrap().entry(code.clone()).or_default() += 1;

        let gate = self.gates.lock().unwrap().get(&code).cloned();
        if let Some(gate) = gate {
            let _permit = gate.acquire().await.map_err(|_| LoadError::Timeout)?;
        }

        let asset = self.assets.lock().unwrap().get(&code).cloned();
        match asset {
            Some(Some(json)) => Dictionary::from_json_str(&json),
            Some(None) => Err(LoadError::Status(500)),
            None => Err(LoadError::NotFound(provider.asset_path(locale))),
        }
    }
}

/// Facade over `loader` with in-memory storage and no environment language
#[allow(dead_code)]
pub fn facade_with(loader: Arc<GatedLoader>, storage: Arc<MemoryStorage>) -> LocalizationFacade {
    LocalizationFacade::builder(loader)
        .storage(storage as Arc<dyn LocaleStorage>)
        .environment(Arc::new(FixedLanguage::none()))
        .build()
}

#[allow(dead_code)]
pub fn provider() -> ProviderDescriptor {
    ProviderDescriptor::new("assets/locale").unwrap()
}

#[allow(dead_code)]
pub fn loc(code: &str) -> Locale {
    Locale::parse(code).unwrap()
}

/// Next event, failing the test if none arrives within a second
#[allow(dead_code)]
pub async fn next_event(sub: &mut Subscription) -> TranslationEvent {
    tokio::time::timeout(Duration::from_secs(1), sub.recv())
        .await
        .expect("timed out waiting for event")
        .expect("event channel closed")
}

/// Every event already queued
#[allow(dead_code)]
pub fn drain(sub: &mut Subscription) -> Vec<TranslationEvent> {
    std::iter::from_fn(|| sub.try_recv()).collect()
}
