//! Postal code lookups for ZipSnap
//!
//! Domain types for looked-up locations, the `GeocodingClient` seam with its
//! Zippopotam implementation, and per-country postal code pattern checks.

pub mod client;
pub mod types;
pub mod validate;

pub use client::{FetchError, GeocodingClient, ZippopotamClient};
pub use types::*;
pub use validate::{validate_postal_code, PatternCheck};
