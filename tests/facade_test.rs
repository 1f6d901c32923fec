//! End-to-end tests for the localization facade
//!
//! Loads are driven through a gated in-memory loader so tests can hold a
//! locale in `Loading` and observe what callers see meanwhile.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{drain, facade_with, loc, next_event, provider, GatedLoader};
use lingo::catalog::{Dictionary, LoadState, TranslationCatalog};
use lingo::error::{ErrorCategory, LingoErrorTrait};
use lingo::facade::TranslationEvent;
use lingo::locale::FixedLanguage;
use lingo::resolver::Args;
use lingo::storage::{FileStorage, MemoryStorage};
use lingo::LocalizationFacade;

const EN: &str = r#"{"GREETING": "hello", "home": {"title": "Home"}}"#;
const IT: &str = r#"{"GREETING": "ciao", "home": {"title": "Casa"}}"#;

/// Facade with `en` and `it` registered, `en` current and loaded
async fn loaded_facade() -> (LocalizationFacade, Arc<GatedLoader>, Arc<MemoryStorage>) {
    let loader = GatedLoader::new();
    loader.serve("en", EN);
    loader.serve("it", IT);

    let storage = Arc::new(MemoryStorage::new());
    let l10n = facade_with(Arc::clone(&loader), Arc::clone(&storage));
    l10n.add_language("en").unwrap();
    l10n.add_language("it").unwrap();
    l10n.define_preferred_language("en", None).await.unwrap();

    let state = l10n
        .translation_provider(provider())
        .await
        .unwrap()
        .wait()
        .await;
    assert_eq!(state, LoadState::Ready);

    (l10n, loader, storage)
}

#[tokio::test]
async fn test_default_locale_when_nothing_stored() {
    let loader = GatedLoader::new();
    let l10n = facade_with(loader, Arc::new(MemoryStorage::new()));
    l10n.add_language("en").unwrap();
    l10n.add_language("it").unwrap();

    l10n.define_preferred_language("en", None).await.unwrap();

    assert_eq!(l10n.current_language(), Some(loc("en")));
    assert_eq!(l10n.languages(), vec![loc("en"), loc("it")]);
}

#[tokio::test]
async fn test_duplicate_language_is_rejected() {
    let l10n = facade_with(GatedLoader::new(), Arc::new(MemoryStorage::new()));
    l10n.add_language("en").unwrap();

    let err = l10n.add_language("en").unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Locale);
    assert_eq!(l10n.languages().len(), 1);
}

#[tokio::test]
async fn test_switch_to_current_locale_is_a_no_op() {
    let (l10n, loader, storage) = loaded_facade().await;
    let writes = storage.write_count();
    let mut sub = l10n.subscribe();

    let handle = l10n.set_current_language("en").await.unwrap();

    assert!(handle.is_none());
    assert_eq!(loader.calls("en"), 1);
    assert_eq!(storage.write_count(), writes);
    assert!(drain(&mut sub).is_empty());
}

#[tokio::test]
async fn test_missing_keys_render_as_key() {
    let (l10n, _, _) = loaded_facade().await;
    let args = Args::new();

    assert_eq!(l10n.translate("GREETING", &args), "hello");
    assert_eq!(l10n.translate("home.title", &args), "Home");
    assert_eq!(l10n.translate("MISSING", &args), "MISSING");
    assert_eq!(l10n.translate("home.missing", &args), "home.missing");
    // A key group is not a displayable value
    assert_eq!(l10n.translate("home", &args), "home");
}

#[tokio::test]
async fn test_previous_locale_does_not_leak_while_loading() {
    let (l10n, loader, _) = loaded_facade().await;
    loader.gate("it");

    let handle = l10n.set_current_language("it").await.unwrap().unwrap();

    assert_eq!(l10n.load_state("it").unwrap(), LoadState::Loading);
    assert_eq!(l10n.translate("GREETING", &Args::new()), "GREETING");

    loader.open("it");
    assert_eq!(handle.wait().await, LoadState::Ready);
    assert_eq!(l10n.translate("GREETING", &Args::new()), "ciao");
}

#[tokio::test]
async fn test_concurrent_requests_share_one_fetch() {
    let (l10n, loader, _) = loaded_facade().await;
    loader.gate("en");

    let first = l10n.reload().await.unwrap().unwrap();
    let second = l10n.reload().await.unwrap().unwrap();
    let third = l10n.reload().await.unwrap().unwrap();

    assert!(first.started());
    assert!(!second.started());
    assert!(!third.started());

    loader.open("en");
    let states = futures::future::join_all([first.wait(), second.wait(), third.wait()]).await;

    assert!(states.iter().all(|s| *s == LoadState::Ready));
    // One fetch from the initial load, one for the shared reload
    assert_eq!(loader.calls("en"), 2);
}

#[tokio::test]
async fn test_switching_back_refetches() {
    let (l10n, loader, _) = loaded_facade().await;

    l10n.set_current_language("it").await.unwrap().unwrap().wait().await;
    l10n.set_current_language("en").await.unwrap().unwrap().wait().await;

    assert_eq!(loader.calls("en"), 2);
    assert_eq!(loader.calls("it"), 1);
}

#[tokio::test]
async fn test_stale_load_updates_catalog_without_notifying() {
    let (l10n, loader, _) = loaded_facade().await;
    let mut sub = l10n.subscribe();
    loader.gate("it");

    let it_load = l10n.set_current_language("it").await.unwrap().unwrap();
    l10n.set_current_language("en").await.unwrap().unwrap().wait().await;

    loader.open("it");
    assert_eq!(it_load.wait().await, LoadState::Ready);
    tokio::time::sleep(Duration::from_millis(50)).await;

    let events = drain(&mut sub);
    assert_eq!(
        events.first(),
        Some(&TranslationEvent::LocaleChanged { locale: loc("it") })
    );
    assert!(events.contains(&TranslationEvent::Ready { locale: loc("en") }));
    assert!(!events.contains(&TranslationEvent::Ready { locale: loc("it") }));

    // The late dictionary is kept for later, but does not affect the current locale
    assert!(l10n.catalog().dictionary(&loc("it")).is_some());
    assert_eq!(l10n.translate("GREETING", &Args::new()), "hello");
}

#[tokio::test]
async fn test_failed_reload_keeps_last_good_dictionary() {
    let (l10n, loader, _) = loaded_facade().await;
    let mut sub = l10n.subscribe();
    loader.fail("en");

    let state = l10n.reload().await.unwrap().unwrap().wait().await;

    assert!(matches!(state, LoadState::Failed(_)));
    assert_eq!(l10n.translate("GREETING", &Args::new()), "hello");

    let event = next_event(&mut sub).await;
    assert!(event.is_error());
    assert_eq!(event.locale(), &loc("en"));

    // Recovery is caller driven
    loader.serve("en", r#"{"GREETING": "hi"}"#);
    let state = l10n.reload().await.unwrap().unwrap().wait().await;
    assert_eq!(state, LoadState::Ready);
    assert_eq!(l10n.translate("GREETING", &Args::new()), "hi");
}

#[tokio::test]
async fn test_failed_first_load_falls_back_to_keys() {
    let loader = GatedLoader::new();
    let l10n = facade_with(Arc::clone(&loader), Arc::new(MemoryStorage::new()));
    l10n.define_preferred_language("fr", None).await.unwrap();

    let state = l10n
        .translation_provider(provider())
        .await
        .unwrap()
        .wait()
        .await;

    assert!(matches!(state, LoadState::Failed(_)));
    assert_eq!(l10n.translate("GREETING", &Args::new()), "GREETING");
}

#[tokio::test]
async fn test_provider_before_locale_is_rejected() {
    let l10n = facade_with(GatedLoader::new(), Arc::new(MemoryStorage::new()));
    assert!(l10n.translation_provider(provider()).await.is_err());
}

#[tokio::test]
async fn test_direct_registration_round_trip() {
    let l10n = facade_with(GatedLoader::new(), Arc::new(MemoryStorage::new()));
    l10n.set_current_language("en").await.unwrap();
    let mut sub = l10n.subscribe();

    l10n.add_translation("en", Dictionary::new().with("K", "V"))
        .unwrap();

    assert_eq!(l10n.translate("K", &Args::new()), "V");
    assert_eq!(
        next_event(&mut sub).await,
        TranslationEvent::Ready { locale: loc("en") }
    );
}

#[tokio::test]
async fn test_direct_registration_during_load_defers_ready() {
    let (l10n, loader, _) = loaded_facade().await;
    loader.gate("en");
    let handle = l10n.reload().await.unwrap().unwrap();
    let mut sub = l10n.subscribe();

    l10n.add_translation("en", Dictionary::new().with("GREETING", "hey"))
        .unwrap();

    assert!(drain(&mut sub).is_empty());
    assert_eq!(l10n.load_state("en").unwrap(), LoadState::Loading);
    assert_eq!(l10n.translate("GREETING", &Args::new()), "hey");

    loader.open("en");
    assert_eq!(handle.wait().await, LoadState::Ready);
    assert_eq!(
        next_event(&mut sub).await,
        TranslationEvent::Ready { locale: loc("en") }
    );
    assert_eq!(l10n.translate("GREETING", &Args::new()), "hello");
}

#[tokio::test]
async fn test_plural_and_interpolation() {
    let l10n = facade_with(GatedLoader::new(), Arc::new(MemoryStorage::new()));
    let dictionary = Dictionary::from_json_str(
        r#"{
            "items": {"=0": "no items", "=1": "one item", "other": "{n} items"},
            "welcome": "Hello, {name}!",
            "reply": {"male": "He replied", "female": "She replied", "other": "They replied"}
        }"#,
    )
    .unwrap();
    l10n.add_translation("en", dictionary).unwrap();
    l10n.set_current_language("en").await.unwrap();

    assert_eq!(l10n.translate("items", &Args::new().with("n", 0)), "no items");
    assert_eq!(l10n.translate("items", &Args::new().with("n", 1)), "one item");
    assert_eq!(l10n.translate("items", &Args::new().with("n", 3)), "3 items");

    assert_eq!(
        l10n.translate("welcome", &Args::new().with("name", "Ada")),
        "Hello, Ada!"
    );
    assert_eq!(l10n.translate("welcome", &Args::new()), "Hello, {name}!");

    assert_eq!(
        l10n.translate("reply", &Args::new().with("gender", "female")),
        "She replied"
    );
}

#[tokio::test]
async fn test_translate_async_waits_for_current_locale() {
    let (l10n, loader, _) = loaded_facade().await;
    loader.gate("it");
    l10n.set_current_language("it").await.unwrap();

    let pending = {
        let l10n = l10n.clone();
        tokio::spawn(async move { l10n.translate_async("GREETING", Args::new()).await })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(!pending.is_finished());

    loader.open("it");
    assert_eq!(pending.await.unwrap(), "ciao");
}

#[tokio::test]
async fn test_selected_locale_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let build = || {
        LocalizationFacade::builder(GatedLoader::new())
            .storage(Arc::new(FileStorage::in_dir(dir.path())))
            .environment(Arc::new(FixedLanguage::none()))
            .build()
    };

    let first = build();
    first.define_preferred_language("en", Some(30)).await.unwrap();
    first.set_current_language("it").await.unwrap();

    let second = build();
    let locale = second.define_preferred_language("en", Some(30)).await.unwrap();
    assert_eq!(locale, loc("it"));
}

#[tokio::test]
async fn test_environment_language_is_negotiated() {
    let l10n = LocalizationFacade::builder(GatedLoader::new())
        .environment(Arc::new(FixedLanguage::new("it_IT.UTF-8")))
        .build();
    l10n.add_language("en").unwrap();
    l10n.add_language("it").unwrap();

    let locale = l10n.define_preferred_language("en", None).await.unwrap();
    assert_eq!(locale, loc("it"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_lookups_never_see_partial_dictionaries() {
    const KEYS: usize = 200;

    fn generation(tag: &str) -> Dictionary {
        (0..KEYS)
            .map(|i| (format!("key{i}"), lingo::catalog::Entry::from(tag)))
            .collect()
    }

    let catalog = Arc::new(TranslationCatalog::new());
    let en = loc("en");
    catalog.register_direct(&en, generation("a"));

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let catalog = Arc::clone(&catalog);
            let en = en.clone();
            tokio::task::spawn_blocking(move || {
                for _ in 0..500 {
                    let snapshot = catalog.dictionary(&en).unwrap();
                    let values: Vec<_> = snapshot.flatten().into_iter().map(|(_, v)| v).collect();
                    assert_eq!(values.len(), KEYS);
                    assert!(values.iter().all(|v| *v == values[0]));
                }
            })
        })
        .collect();

    for round in 0..200 {
        catalog.begin_load(&en);
        let tag = if round % 2 == 0 { "b" } else { "a" };
        catalog.complete_load(&en, generation(tag));
        tokio::task::yield_now().await;
    }

    for reader in readers {
        reader.await.unwrap();
    }
}
