//! Background task loading every dataset into the store.

use std::sync::Arc;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::{
    config::AppConfig,
    models::{CollectionItem, Currency, Denomination, IssueYear, StatsRecord, Territory},
};

use super::{
    api::{CatalogApi, Resource},
    retry::RetryPolicy,
    store::{CatalogStore, DataKind, LoadState, Stored},
};

/// Progress reported by [`CatalogSync::run`].
#[derive(Debug, Clone, PartialEq)]
pub enum SyncEvent {
    /// A dataset was swapped into the store.
    Loaded {
        /// Dataset.
        kind: DataKind,
        /// Number of records.
        count: usize,
    },
    /// A dataset exhausted its retries.
    Failed {
        /// Dataset.
        kind: DataKind,
        /// Last error.
        error: String,
    },
    /// Every dataset settled.
    Finished(BootStatus),
}

/// Outcome of the initial load.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BootStatus {
    /// Kinds that failed to load.
    pub failed: Vec<DataKind>,
}

impl BootStatus {
    /// Whether a dataset the client needs to start could not be loaded.
    pub fn connection_error(&self) -> bool {
        self.failed.iter().any(|kind| kind.is_boot_required())
    }
}

/// Fetches every dataset independently and fills a [`CatalogStore`].
///
/// A failing dataset is marked failed in the store; the others still load.
pub struct CatalogSync<A> {
    api: Arc<A>,
    store: CatalogStore,
    retry: RetryPolicy,
    session: Option<String>,
    denominations: (Option<i32>, Option<i32>),
}

impl<A: CatalogApi> CatalogSync<A> {
    /// Create a synchroniser from configuration.
    pub fn new(api: Arc<A>, store: CatalogStore, config: &AppConfig) -> Self {
        Self {
            api,
            store,
            retry: RetryPolicy::from_config(config),
            session: config.session.clone(),
            denominations: (config.denomination_from, config.denomination_to),
        }
    }

    /// Replace the retry policy.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn resource(&self, kind: DataKind) -> Option<Resource> {
        Some(match kind {
            DataKind::Territories => Resource::Territories,
            DataKind::Currencies => Resource::Currencies,
            DataKind::Denominations => Resource::Denominations {
                from: self.denominations.0,
                to: self.denominations.1,
            },
            DataKind::IssueYears => Resource::IssueYears,
            DataKind::Collection => Resource::Collection {
                session: self.session.clone()?,
            },
            DataKind::TerritoryStats => Resource::TerritoryStats,
            DataKind::CurrencyStats => Resource::CurrencyStats,
            DataKind::DenominationStats => Resource::DenominationStats,
            DataKind::IssueYearStats => Resource::IssueYearStats,
        })
    }

    /// Load every dataset, reporting progress on `sender`.
    pub async fn run(self, sender: mpsc::Sender<SyncEvent>) -> Result<BootStatus> {
        info!("catalog sync started");
        tokio::join!(
            self.load_records::<Territory>(&sender),
            self.load_records::<Currency>(&sender),
            self.load_records::<Denomination>(&sender),
            self.load_records::<IssueYear>(&sender),
            self.load_records::<CollectionItem>(&sender),
            self.load_stats::<Territory>(&sender),
            self.load_stats::<Currency>(&sender),
            self.load_stats::<Denomination>(&sender),
            self.load_stats::<IssueYear>(&sender),
        );

        let status = BootStatus {
            failed: self.store.failed_kinds(),
        };
        info!(failed = status.failed.len(), "catalog sync finished");
        sender
            .send(SyncEvent::Finished(status.clone()))
            .await
            .context("failed to send sync finished event")?;
        Ok(status)
    }

    async fn fetch<T>(&self, kind: DataKind, sender: &mpsc::Sender<SyncEvent>) -> Option<Vec<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let Some(resource) = self.resource(kind) else {
            info!(kind = kind.label(), "skipped");
            self.store.set_state(kind, LoadState::Skipped);
            return None;
        };

        let api = &self.api;
        let resource = &resource;
        match self
            .retry
            .retry_async(move |_| api.fetch::<T>(resource))
            .await
        {
            Ok(records) => Some(records),
            Err(err) => {
                warn!(kind = kind.label(), "giving up: {err}");
                let error = err.to_string();
                self.store.set_state(kind, LoadState::Failed(error.clone()));
                let _ = sender.send(SyncEvent::Failed { kind, error }).await;
                None
            }
        }
    }

    async fn load_records<R>(&self, sender: &mpsc::Sender<SyncEvent>)
    where
        R: Stored + DeserializeOwned,
    {
        let Some(records) = self.fetch::<R>(R::KIND, sender).await else {
            return;
        };
        let count = records.len();
        self.store.replace(records);
        info!(kind = R::KIND.label(), count, "loaded");
        let _ = sender
            .send(SyncEvent::Loaded {
                kind: R::KIND,
                count,
            })
            .await;
    }

    async fn load_stats<R: Stored>(&self, sender: &mpsc::Sender<SyncEvent>) {
        let Some(kind) = R::STATS else {
            return;
        };
        let Some(records) = self.fetch::<StatsRecord>(kind, sender).await else {
            return;
        };
        let count = records.len();
        self.store.replace_stats::<R>(records);
        info!(kind = kind.label(), count, "loaded");
        let _ = sender.send(SyncEvent::Loaded { kind, count }).await;
    }
}
