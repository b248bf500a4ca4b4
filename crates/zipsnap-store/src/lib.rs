//! Location store for ZipSnap
//!
//! Owns lookup, search history, favorites and the comparison list, persists
//! the first two through a [`PersistenceAdapter`], and renders records for
//! export.

pub mod export;
pub mod history;
pub mod persistence;
pub mod store;

pub use export::{export_record, Export, ExportFormat, UnknownFormat};
pub use persistence::{
    JsonFileStore, MemoryStore, PersistenceAdapter, FAVORITES_KEY, HISTORY_KEY,
};
pub use store::{LocationStore, HISTORY_CAPACITY};
