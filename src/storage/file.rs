//! File-backed locale storage
//!
//! Persists a single JSON record, written to a temp file and renamed into
//! place so a crash never leaves a half-written record. Every write uses its
//! own temp file, so concurrent writers never rename each other's file.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use super::{expires_at, LocaleStorage, StorageResult, LOCALE_KEY};
use crate::locale::Locale;

static WRITE_SEQ: AtomicU64 = AtomicU64::new(0);

/// On-disk record
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredLocale {
    locale: Locale,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    expires_at: Option<DateTime<Utc>>,
}

/// Locale storage backed by a JSON file
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    /// Storage at an explicit file path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Storage at `<dir>/locale.json`
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(format!("{LOCALE_KEY}.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let seq = WRITE_SEQ.fetch_add(1, Ordering::Relaxed);
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(format!(".{}.{seq}.tmp", std::process::id()));
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl LocaleStorage for FileStorage {
    async fn read(&self) -> StorageResult<Option<Locale>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let stored: StoredLocale = serde_json::from_str(&content)?;

        if stored.expires_at.is_some_and(|exp| exp <= Utc::now()) {
            tracing::debug!(path = %self.path.display(), "Stored locale expired");
            return Ok(None);
        }

        Ok(Some(stored.locale))
    }

    async fn write(&self, locale: &Locale, expiry_days: Option<u32>) -> StorageResult<()> {
        let record = StoredLocale {
            locale: locale.clone(),
            expires_at: expires_at(expiry_days),
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let temp_path = self.temp_path();
        tokio::fs::write(&temp_path, serde_json::to_vec_pretty(&record)?).await?;
        tokio::fs::rename(&temp_path, &self.path).await?;

        tracing::debug!(path = %self.path.display(), locale = %locale, "Locale persisted");
        Ok(())
    }
}
