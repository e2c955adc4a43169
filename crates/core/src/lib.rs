#![warn(clippy::all, missing_docs)]

//! Core engine of the banknote catalog browser.
//!
//! This crate hosts the domain models, the tabular sort/filter/projection
//! engine, the catalog store and its sync task, configuration handling and
//! preference persistence used by the terminal UI and any future frontends.

pub mod config;
pub mod error;
pub mod models;
pub mod preferences;
pub mod repository;
pub mod table;

pub use config::AppConfig;
pub use error::{ConnectivityError, TableError};
pub use models::{
    CollectionItem, Currency, CurrencyType, Denomination, IssueYear, Link, Ownership,
    StatisticBlock, StatsRecord, Territory, TerritoryType,
};
pub use preferences::Preferences;
pub use repository::{
    BootStatus, CatalogApi, CatalogStore, CatalogSync, DataKind, HttpCatalogApi, LoadState,
    Resource, RetryPolicy, SyncEvent,
};
