//! Zippopotam client: one GET per lookup, no retries.
//!
//! The client is a thin transport. It reports the upstream status or the
//! transport failure as-is; turning those into user-facing errors is the
//! store's job.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use thiserror::Error;
use tracing::instrument;
use zipsnap_core::ApiConfig;

use crate::types::{ApiLocation, Country};

const ZIPPOPOTAM_URL: &str = "http://api.zippopotam.us";
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Failure modes of a single fetch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Upstream answered with a non-success status.
    #[error("Upstream status {0}")]
    Status(u16),

    /// The request could not be completed (DNS, connect, timeout).
    #[error("Transport failure: {0}")]
    Transport(String),

    /// Success status, but the body was not the expected JSON.
    #[error("Malformed response body: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            FetchError::Decode(e.to_string())
        } else if let Some(status) = e.status() {
            FetchError::Status(status.as_u16())
        } else {
            FetchError::Transport(e.to_string())
        }
    }
}

/// Looks up a postal code against a geocoding service.
pub trait GeocodingClient: Send + Sync {
    fn fetch(
        &self,
        country: Country,
        postal_code: &str,
    ) -> impl Future<Output = Result<ApiLocation, FetchError>> + Send;
}

impl<T: GeocodingClient> GeocodingClient for Arc<T> {
    fn fetch(
        &self,
        country: Country,
        postal_code: &str,
    ) -> impl Future<Output = Result<ApiLocation, FetchError>> + Send {
        (**self).fetch(country, postal_code)
    }
}

#[derive(Debug, Clone)]
pub struct ZippopotamClient {
    client: Client,
    base_url: String,
}

impl ZippopotamClient {
    pub fn new() -> Result<Self, FetchError> {
        Self::with_base_url(ZIPPOPOTAM_URL, Duration::from_secs(REQUEST_TIMEOUT_SECS), None)
    }

    pub fn from_config(config: &ApiConfig) -> Result<Self, FetchError> {
        Self::with_base_url(
            &config.base_url,
            Duration::from_secs(config.timeout_secs),
            Some(&config.user_agent),
        )
    }

    pub fn with_base_url(
        base_url: &str,
        timeout: Duration,
        user_agent: Option<&str>,
    ) -> Result<Self, FetchError> {
        let mut builder = Client::builder().timeout(timeout);
        if let Some(agent) = user_agent {
            builder = builder.user_agent(agent);
        }
        let client = builder
            .build()
            .map_err(|e| FetchError::Transport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url_for(&self, country: Country, postal_code: &str) -> String {
        format!(
            "{}/{}/{}",
            self.base_url,
            country.code(),
            urlencoding::encode(postal_code)
        )
    }
}

impl GeocodingClient for ZippopotamClient {
    #[instrument(skip(self), level = "debug")]
    async fn fetch(&self, country: Country, postal_code: &str) -> Result<ApiLocation, FetchError> {
        let url = self.url_for(country, postal_code);

        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!("Lookup {} returned status {}", url, status);
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| FetchError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_for_encodes_postal_code() {
        let client =
            ZippopotamClient::with_base_url("http://example.test/", Duration::from_secs(1), None)
                .unwrap();
        assert_eq!(client.base_url(), "http://example.test");
        assert_eq!(client.url_for(Country::Us, "90210"), "http://example.test/us/90210");
        assert_eq!(client.url_for(Country::Ca, "K1A 0B1"), "http://example.test/ca/K1A%200B1");
    }

    #[test]
    fn test_from_config_uses_base_url() {
        let config = ApiConfig {
            base_url: "https://zip.example".to_string(),
            ..ApiConfig::default()
        };
        let client = ZippopotamClient::from_config(&config).unwrap();
        assert_eq!(client.url_for(Country::Jp, "100-0001"), "https://zip.example/jp/100-0001");
    }
}
