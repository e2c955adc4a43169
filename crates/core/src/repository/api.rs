//! Fetch collaborator: typed record lists from the catalog service.

use std::{future::Future, time::Duration};

use anyhow::{Context, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::{config::AppConfig, error::ConnectivityError};

/// A dataset exposed by the catalog service.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Resource {
    /// All territories.
    Territories,
    /// All currencies.
    Currencies,
    /// Denominations, optionally limited to notes issued within a year range.
    Denominations {
        /// First issue year, inclusive.
        from: Option<i32>,
        /// Last issue year, inclusive.
        to: Option<i32>,
    },
    /// Years in which notes were issued.
    IssueYears,
    /// Statistics per territory.
    TerritoryStats,
    /// Statistics per currency.
    CurrencyStats,
    /// Statistics per denomination.
    DenominationStats,
    /// Statistics per issue year.
    IssueYearStats,
    /// Items owned by a collector.
    Collection {
        /// Collector session name.
        session: String,
    },
}

impl Resource {
    /// Endpoint path relative to the service base URL.
    pub fn path(&self) -> String {
        match self {
            Resource::Territories => "territories".to_string(),
            Resource::Currencies => "currencies".to_string(),
            Resource::Denominations { .. } => "denominations".to_string(),
            Resource::IssueYears => "issue-years".to_string(),
            Resource::TerritoryStats => "territories/stats".to_string(),
            Resource::CurrencyStats => "currencies/stats".to_string(),
            Resource::DenominationStats => "denominations/stats".to_string(),
            Resource::IssueYearStats => "issue-years/stats".to_string(),
            Resource::Collection { session } => format!("collectors/{session}/items"),
        }
    }

    /// Query parameters of the request.
    pub fn query(&self) -> Vec<(&'static str, String)> {
        match self {
            Resource::Denominations { from, to } => {
                let mut query = Vec::new();
                if let Some(from) = from {
                    query.push(("from", from.to_string()));
                }
                if let Some(to) = to {
                    query.push(("to", to.to_string()));
                }
                query
            }
            _ => Vec::new(),
        }
    }
}

/// Source of catalog datasets.
pub trait CatalogApi: Send + Sync + 'static {
    /// Fetch every record of `resource`.
    fn fetch<T>(
        &self,
        resource: &Resource,
    ) -> impl Future<Output = Result<Vec<T>, ConnectivityError>> + Send
    where
        T: DeserializeOwned + Send + 'static;
}

/// JSON-over-HTTP implementation of [`CatalogApi`].
#[derive(Debug, Clone)]
pub struct HttpCatalogApi {
    client: Client,
    base_url: String,
}

impl HttpCatalogApi {
    /// Build a client for `base_url` with a per-request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .gzip(true)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// Build a client from the application configuration.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Self::new(
            config.api_base_url.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    /// Absolute URL of `resource`.
    pub fn url(&self, resource: &Resource) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), resource.path())
    }
}

impl CatalogApi for HttpCatalogApi {
    async fn fetch<T>(&self, resource: &Resource) -> Result<Vec<T>, ConnectivityError>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let url = self.url(resource);
        debug!(%url, "fetching");
        let response = self
            .client
            .get(&url)
            .query(&resource.query())
            .send()
            .await
            .map_err(|source| ConnectivityError::Transport {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ConnectivityError::Status {
                url,
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|source| ConnectivityError::Transport {
                url: url.clone(),
                source,
            })?;
        serde_json::from_slice(&body).map_err(|source| ConnectivityError::Decode { url, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resources_map_to_endpoints() -> Result<()> {
        let api = HttpCatalogApi::new("https://catalog.example/api/", Duration::from_secs(5))?;
        assert_eq!(
            api.url(&Resource::TerritoryStats),
            "https://catalog.example/api/territories/stats"
        );
        assert_eq!(
            api.url(&Resource::Collection {
                session: "alice".to_string()
            }),
            "https://catalog.example/api/collectors/alice/items"
        );
        Ok(())
    }

    #[test]
    fn denomination_range_becomes_query() {
        let resource = Resource::Denominations {
            from: Some(1900),
            to: None,
        };
        assert_eq!(resource.query(), vec![("from", "1900".to_string())]);
        assert!(Resource::Territories.query().is_empty());
    }
}
