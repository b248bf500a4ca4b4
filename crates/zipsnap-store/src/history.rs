//! List bookkeeping for history and favorites, keyed by record identity.

use zipsnap_geocode::LocationRecord;

/// Insert-or-update `record` in a most-recent-first history.
///
/// An existing key is replaced where it sits: no reordering, no eviction.
/// A new key goes to the front and the list is cut back to `capacity`.
pub fn upsert(history: &mut Vec<LocationRecord>, record: LocationRecord, capacity: usize) {
    match history.iter().position(|r| r.same_key(&record)) {
        Some(index) => history[index] = record,
        None => {
            history.insert(0, record);
            history.truncate(capacity);
        }
    }
}

/// Remove the favorite with `record`'s key, or append `record` tagged as one.
///
/// Returns whether the record is a favorite afterwards.
pub fn toggle(favorites: &mut Vec<LocationRecord>, record: &LocationRecord) -> bool {
    match favorites.iter().position(|r| r.same_key(record)) {
        Some(index) => {
            favorites.remove(index);
            false
        }
        None => {
            favorites.push(record.as_favorite());
            true
        }
    }
}

pub fn contains(records: &[LocationRecord], record: &LocationRecord) -> bool {
    records.iter().any(|r| r.same_key(record))
}

/// Parse a persisted collection, tolerating anything a previous session (or a
/// hand edit) may have left behind.
///
/// Malformed input yields an empty list. Records without places are dropped,
/// duplicate keys keep their first occurrence, and the result is capped at
/// `capacity` when one is given.
pub fn restore(key: &str, raw: Option<&str>, capacity: Option<usize>) -> Vec<LocationRecord> {
    let Some(raw) = raw else {
        return Vec::new();
    };

    let parsed: Vec<LocationRecord> = match serde_json::from_str(raw) {
        Ok(records) => records,
        Err(e) => {
            tracing::warn!("Ignoring malformed stored value for {}: {}", key, e);
            return Vec::new();
        }
    };

    let mut records: Vec<LocationRecord> = Vec::with_capacity(parsed.len());
    for record in parsed {
        if record.places.is_empty() {
            tracing::debug!("Dropping stored {} entry without places", key);
        } else if !contains(&records, &record) {
            records.push(record);
        }
    }

    if let Some(cap) = capacity {
        records.truncate(cap);
    }

    records
}
