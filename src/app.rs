use anyhow::{Context, Result};
use std::sync::Arc;

use zipsnap_core::Config;
use zipsnap_geocode::{Country, ZippopotamClient};
use zipsnap_store::{JsonFileStore, LocationStore};

/// Application wiring: config, lookup client, persistence and the store
pub struct App {
    config: Arc<Config>,
    store: LocationStore<ZippopotamClient>,
}

impl App {
    /// Create an application from the validated on-disk configuration
    pub fn new() -> Result<Self> {
        let (config, _) = Config::load_validated()?;
        Self::from_config(config)
    }

    pub fn from_config(config: Config) -> Result<Self> {
        let client =
            ZippopotamClient::from_config(&config.api).context("Failed to create lookup client")?;

        let country = config
            .lookup
            .default_country
            .parse::<Country>()
            .unwrap_or_else(|e| {
                tracing::warn!("{}; using {}", e, Country::default());
                Country::default()
            });

        let data_dir = config.data_dir();
        tracing::debug!("Persisting searches under {:?}", data_dir);

        let store = LocationStore::new(client, Arc::new(JsonFileStore::new(data_dir)))
            .with_request_sequencing(config.lookup.sequence_requests)
            .with_country(country);

        tracing::info!("Application initialized (lookup service: {})", config.api.base_url);

        Ok(Self {
            config: Arc::new(config),
            store,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &LocationStore<ZippopotamClient> {
        &self.store
    }

    pub fn shutdown(&self) {
        tracing::info!(
            "Shutting down with {} history entries and {} favorites",
            self.store.history().len(),
            self.store.favorites().len()
        );
    }
}
