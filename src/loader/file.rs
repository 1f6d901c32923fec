//! Filesystem translation loader

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use super::{ProviderDescriptor, TranslationLoader};
use crate::catalog::Dictionary;
use crate::locale::Locale;
use crate::utils::error::LoadError;

/// Loader that reads dictionaries from a directory tree
///
/// The provider version is a remote cache-busting token and is ignored here.
#[derive(Debug, Clone)]
pub struct FileLoader {
    root: PathBuf,
}

impl FileLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of a locale's asset on disk
    pub fn asset_path(&self, locale: &Locale, provider: &ProviderDescriptor) -> PathBuf {
        self.root.join(provider.asset_path(locale))
    }
}

#[async_trait]
impl TranslationLoader for FileLoader {
    fn name(&self) -> &str {
        "file"
    }

    async fn get(
        &self,
        locale: &Locale,
        provider: &ProviderDescriptor,
    ) -> Result<Dictionary, LoadError> {
        let path = self.asset_path(locale, provider);
        tracing::debug!(locale = %locale, path = %path.display(), "Reading translations");

        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(LoadError::NotFound(path.display().to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        Dictionary::from_json_str(&content)
    }
}
