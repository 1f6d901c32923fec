//! HTTP translation loader
//!
//! Fetches JSON translation assets with:
//! - Configurable request timeout
//! - Retry with exponential backoff on 429/5xx and timeouts
//! - Cache-busting `v` query parameter from the provider version

use async_trait::async_trait;
use reqwest::{header::ACCEPT, Client, StatusCode};
use std::time::Duration;
use url::Url;

use super::{ProviderDescriptor, TranslationLoader};
use crate::catalog::Dictionary;
use crate::locale::Locale;
use crate::utils::error::LoadError;
use crate::utils::retry::{with_retry_if, RetryConfig};
use crate::utils::truncate_text;

/// Loader that fetches dictionaries over HTTP
pub struct HttpLoader {
    /// HTTP client with configured timeout and compression
    client: Client,

    /// Base URL asset paths are resolved against
    base_url: Url,

    /// Retry policy for transient failures within one fetch
    retry: RetryConfig,
}

impl HttpLoader {
    /// Create a loader with default timeout and retry policy
    ///
    /// # Errors
    ///
    /// Returns `LoadError::InvalidUrl` for an unparsable base URL and
    /// `LoadError::Http` if the HTTP client cannot be created.
    pub fn new(base_url: &str) -> Result<Self, LoadError> {
        Self::with_config(base_url, Duration::from_secs(10), RetryConfig::default())
    }

    /// Create a loader with custom timeout and retry policy
    ///
    /// # Errors
    ///
    /// Returns `LoadError::InvalidUrl` for an unparsable base URL and
    /// `LoadError::Http` if the HTTP client cannot be created.
    pub fn with_config(
        base_url: &str,
        timeout: Duration,
        retry: RetryConfig,
    ) -> Result<Self, LoadError> {
        // Url::join drops the last segment unless the base ends with '/'
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        let base_url = Url::parse(&normalized)
            .map_err(|e| LoadError::InvalidUrl(format!("{base_url}: {e}")))?;

        let client = Client::builder()
            .timeout(timeout)
            .gzip(true)
            .user_agent(format!("lingo/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url,
            retry,
        })
    }

    /// Full URL of a locale's asset, including the version parameter
    ///
    /// # Errors
    ///
    /// Returns `LoadError::InvalidUrl` if the asset path cannot be joined.
    pub fn asset_url(&self, locale: &Locale, provider: &ProviderDescriptor) -> Result<Url, LoadError> {
        let path = provider.asset_path(locale);
        let mut url = self
            .base_url
            .join(path.trim_start_matches("./"))
            .map_err(|e| LoadError::InvalidUrl(format!("{path}: {e}")))?;

        if let Some(version) = &provider.version {
            url.query_pairs_mut().append_pair("v", version);
        }

        Ok(url)
    }

    async fn fetch_once(&self, url: &Url) -> Result<Dictionary, LoadError> {
        let response = self
            .client
            .get(url.clone())
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LoadError::Timeout
                } else {
                    LoadError::Http(e)
                }
            })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(LoadError::NotFound(url.to_string()));
        }
        if !status.is_success() {
            return Err(LoadError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        Dictionary::from_json_str(&body).inspect_err(|e| {
            tracing::debug!(
                url = %url,
                error = %e,
                body = %truncate_text(&body, 120),
                "Asset is not a valid dictionary"
            );
        })
    }
}

#[async_trait]
impl TranslationLoader for HttpLoader {
    fn name(&self) -> &str {
        "http"
    }

    async fn get(
        &self,
        locale: &Locale,
        provider: &ProviderDescriptor,
    ) -> Result<Dictionary, LoadError> {
        let url = self.asset_url(locale, provider)?;
        tracing::debug!(locale = %locale, url = %url, "Fetching translations");

        with_retry_if(&self.retry, || self.fetch_once(&url), LoadError::is_recoverable).await
    }
}
