//! The location store: lookup plus the collections built around it.
//!
//! History and favorites are loaded once at construction and written back
//! through the [`PersistenceAdapter`] after every change. The comparison
//! list and the active record live in memory only.
//!
//! All methods take `&self`. The state lock is never held across the network
//! call, so a slow lookup does not block favorites, comparison or export.
//! Overlapping lookups apply their history update in the order they resolve
//! unless request sequencing is turned on.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use zipsnap_core::LocationError;
use zipsnap_geocode::{
    validate_postal_code, Country, FetchError, GeocodingClient, LocationRecord, PatternCheck,
};

use crate::export::{export_record, Export, ExportFormat};
use crate::history;
use crate::persistence::{PersistenceAdapter, FAVORITES_KEY, HISTORY_KEY};

/// Maximum number of entries kept in search history.
pub const HISTORY_CAPACITY: usize = 10;

#[derive(Debug, Default)]
struct StoreState {
    history: Vec<LocationRecord>,
    favorites: Vec<LocationRecord>,
    comparison: Vec<LocationRecord>,
    active: Option<LocationRecord>,
    country: Country,
}

pub struct LocationStore<C> {
    client: C,
    persistence: Arc<dyn PersistenceAdapter>,
    state: Mutex<StoreState>,
    /// Sequence number of the most recently issued lookup
    issued: AtomicU64,
    sequence_requests: bool,
}

impl<C: GeocodingClient> LocationStore<C> {
    /// Create a store, restoring history and favorites from `persistence`.
    pub fn new(client: C, persistence: Arc<dyn PersistenceAdapter>) -> Self {
        let history = history::restore(
            HISTORY_KEY,
            persistence.load(HISTORY_KEY).as_deref(),
            Some(HISTORY_CAPACITY),
        );
        let favorites =
            history::restore(FAVORITES_KEY, persistence.load(FAVORITES_KEY).as_deref(), None);

        tracing::info!(
            "Restored {} history entries and {} favorites",
            history.len(),
            favorites.len()
        );

        Self {
            client,
            persistence,
            state: Mutex::new(StoreState {
                history,
                favorites,
                ..StoreState::default()
            }),
            issued: AtomicU64::new(0),
            sequence_requests: false,
        }
    }

    /// Discard lookups that resolve after a newer one was issued.
    pub fn with_request_sequencing(mut self, enabled: bool) -> Self {
        self.sequence_requests = enabled;
        self
    }

    pub fn with_country(self, country: Country) -> Self {
        self.state.lock().country = country;
        self
    }

    /// Look up `raw_zip` in `country` and record the result in history.
    ///
    /// The postal code is trimmed first; an empty one fails before any
    /// network call is made.
    pub async fn lookup(
        &self,
        country: Country,
        raw_zip: &str,
    ) -> Result<LocationRecord, LocationError> {
        let zip = raw_zip.trim();
        if zip.is_empty() {
            return Err(LocationError::EmptyInput);
        }

        if validate_postal_code(country, zip) == PatternCheck::Invalid {
            tracing::debug!("{} does not look like a {} postal code", zip, country.name());
        }

        let seq = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        let outcome = self.client.fetch(country, zip).await;

        if self.sequence_requests && self.issued.load(Ordering::SeqCst) != seq {
            tracing::debug!("Discarding stale lookup {}/{} (request {})", country, zip, seq);
            return Err(LocationError::Superseded);
        }

        let api = outcome.map_err(|e| {
            let err = classify(e);
            tracing::debug!("Lookup {}/{} failed: {}", country, zip, err);
            err
        })?;

        let record =
            LocationRecord::capture(api, country, zip, Utc::now()).ok_or_else(|| {
                tracing::debug!("Lookup {}/{} returned no places", country, zip);
                LocationError::NoPlaces
            })?;

        tracing::info!(
            "Found {} {} ({} places)",
            record.country,
            record.postal_code,
            record.places.len()
        );

        let mut state = self.state.lock();
        history::upsert(&mut state.history, record.clone(), HISTORY_CAPACITY);
        self.persist(HISTORY_KEY, &state.history);

        // A favorite with the same key now refers to the fresh record
        if let Some(index) = state.favorites.iter().position(|f| f.same_key(&record)) {
            state.favorites[index] = record.as_favorite();
            self.persist(FAVORITES_KEY, &state.favorites);
        }

        state.active = Some(record.clone());
        state.country = country;

        Ok(record)
    }

    pub fn toggle_favorite(&self, record: &LocationRecord) {
        let mut state = self.state.lock();
        let now_favorite = history::toggle(&mut state.favorites, record);
        tracing::debug!(
            "{} {} {} favorites",
            record.country,
            record.postal_code,
            if now_favorite { "added to" } else { "removed from" }
        );
        self.persist(FAVORITES_KEY, &state.favorites);
    }

    pub fn is_favorite(&self, record: &LocationRecord) -> bool {
        history::contains(&self.state.lock().favorites, record)
    }

    pub fn is_in_history(&self, record: &LocationRecord) -> bool {
        history::contains(&self.state.lock().history, record)
    }

    /// Stage a record for side-by-side comparison.
    ///
    /// Duplicates are allowed here; use [`Self::is_in_comparison`] to keep a
    /// record from being staged twice.
    pub fn add_to_comparison(&self, record: LocationRecord) {
        self.state.lock().comparison.push(record);
    }

    /// Remove and return the staged record at `index`.
    pub fn remove_from_comparison(&self, index: usize) -> Result<LocationRecord, LocationError> {
        let mut state = self.state.lock();
        let len = state.comparison.len();
        if index >= len {
            return Err(LocationError::IndexOutOfRange { index, len });
        }
        Ok(state.comparison.remove(index))
    }

    pub fn is_in_comparison(&self, record: &LocationRecord) -> bool {
        history::contains(&self.state.lock().comparison, record)
    }

    /// Show a record recalled from history or favorites.
    pub fn select(&self, record: LocationRecord) {
        let mut state = self.state.lock();
        if let Some(country) = record.country_code() {
            state.country = country;
        }
        state.active = Some(record);
    }

    /// Change the selected country. The displayed record belongs to the old
    /// one, so it is cleared.
    pub fn switch_country(&self, country: Country) {
        let mut state = self.state.lock();
        state.country = country;
        state.active = None;
    }

    pub fn export_active(
        &self,
        format: ExportFormat,
        exported_at: DateTime<Utc>,
    ) -> Result<Export, LocationError> {
        let state = self.state.lock();
        export_record(state.active.as_ref(), format, exported_at)
    }

    /// Search history, most recent first.
    pub fn history(&self) -> Vec<LocationRecord> {
        self.state.lock().history.clone()
    }

    pub fn favorites(&self) -> Vec<LocationRecord> {
        self.state.lock().favorites.clone()
    }

    pub fn comparison(&self) -> Vec<LocationRecord> {
        self.state.lock().comparison.clone()
    }

    pub fn active(&self) -> Option<LocationRecord> {
        self.state.lock().active.clone()
    }

    pub fn country(&self) -> Country {
        self.state.lock().country
    }

    /// Best-effort write; failures are logged and otherwise ignored.
    fn persist(&self, key: &str, records: &[LocationRecord]) {
        let json = match serde_json::to_string(records) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!("Failed to serialize {}: {}", key, e);
                return;
            }
        };

        if let Err(e) = self.persistence.save(key, &json) {
            tracing::warn!("Failed to persist {}: {}", key, e);
        }
    }
}

fn classify(error: FetchError) -> LocationError {
    match error {
        FetchError::Status(404) => LocationError::NotFound,
        FetchError::Status(status) => LocationError::UpstreamError { status },
        FetchError::Transport(message) => LocationError::NetworkUnavailable(message),
        FetchError::Decode(message) => LocationError::InvalidResponse(message),
    }
}
