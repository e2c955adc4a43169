//! Dataset fetching, retry and the canonical in-memory store.

pub mod api;
pub mod retry;
pub mod store;
pub mod sync;

pub use api::{CatalogApi, HttpCatalogApi, Resource};
pub use retry::RetryPolicy;
pub use store::{CatalogStore, DataKind, LoadState, Snapshot, Stored};
pub use sync::{BootStatus, CatalogSync, SyncEvent};
