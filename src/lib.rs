//! lingo - Translation resolution engine
//!
//! Loads per-locale translation dictionaries from remote or local assets and
//! resolves keys to rendered text with interpolation and plural/gender
//! selection.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`locale`] - Locale codes, registry, current locale and environment detection
//! - [`storage`] - Persistence of the selected locale
//! - [`catalog`] - Dictionaries and per-locale load state
//! - [`resolver`] - Key lookup, interpolation and plural/gender selection
//! - [`loader`] - Translation asset loading over HTTP or the filesystem
//! - [`facade`] - The public localization surface with change notifications
//! - [`config`] - Configuration management and settings
//! - [`utils`] - Error types and retry helpers
//!
//! # Example
//!
//! ```no_run
//! use lingo::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> lingo::Result<()> {
//!     let loader = Arc::new(FileLoader::new("./assets"));
//!     let l10n = LocalizationFacade::new(loader);
//!
//!     l10n.add_language("en")?;
//!     l10n.define_preferred_language("en", None).await?;
//!     l10n.translation_provider(ProviderDescriptor::new("locale")?)
//!         .await?
//!         .wait()
//!         .await;
//!
//!     println!("{}", l10n.translate("inbox.count", &Args::new().with("count", 3)));
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod config;
pub mod error;
pub mod facade;
pub mod loader;
pub mod locale;
pub mod resolver;
pub mod storage;
pub mod utils;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::catalog::{Dictionary, Entry, LoadState};
    pub use crate::config::Config;
    pub use crate::error::{Error, ErrorCategory, LingoErrorTrait, Result};
    pub use crate::facade::{LoadHandle, LocalizationFacade, Subscription, TranslationEvent};
    pub use crate::loader::{FileLoader, HttpLoader, ProviderDescriptor, TranslationLoader, UrlStyle};
    pub use crate::locale::Locale;
    pub use crate::resolver::{ArgValue, Args};
    pub use crate::storage::{FileStorage, LocaleStorage, MemoryStorage};
}

// Direct re-exports for convenience
pub use error::{Error, Result};
pub use facade::LocalizationFacade;
