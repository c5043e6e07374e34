//! Song catalog resolution
//!
//! Abstraction over the external catalog a submission is resolved against.
//! The core only ever needs the resolved (id, title, cover, duration) tuple;
//! lookup failures degrade to a fallback duration upstream instead of
//! rejecting the submission.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Resolver error
#[derive(Debug, thiserror::Error)]
pub enum ResolverError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("No match for query")]
    NoMatch,
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Resolved song metadata as returned by the catalog
#[derive(Debug, Clone)]
pub struct ResolvedSong {
    pub id: String,
    pub title: String,
    pub cover_url: Option<String>,
    /// Compact ISO-8601 duration, if the catalog supplied one
    pub duration_encoded: Option<String>,
}

/// Song resolver trait
#[async_trait]
pub trait SongResolver: Send + Sync {
    /// Resolve free-text into catalog metadata
    async fn resolve(&self, query: &str) -> Result<ResolvedSong, ResolverError>;

    /// Check if the catalog is reachable
    async fn health_check(&self) -> bool;
}

/// Catalog service configuration
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub max_results: u32,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: std::env::var("CATALOG_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8780".to_string()),
            timeout_secs: 10,
            max_results: 1,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CatalogSearchResponse {
    #[serde(default)]
    results: Vec<CatalogEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CatalogEntry {
    id: String,
    title: String,
    cover_url: Option<String>,
    duration: Option<String>,
}

/// HTTP catalog resolver
pub struct CatalogService {
    client: Client,
    config: CatalogConfig,
}

impl CatalogService {
    pub fn new(config: CatalogConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        info!("CatalogService initialized: {}", config.base_url);

        Self { client, config }
    }

    pub fn with_defaults() -> Self {
        Self::new(CatalogConfig::default())
    }
}

#[async_trait]
impl SongResolver for CatalogService {
    async fn resolve(&self, query: &str) -> Result<ResolvedSong, ResolverError> {
        let url = format!("{}/search", self.config.base_url);
        debug!("Resolving song query: {}", query);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("q", query),
                ("limit", &self.config.max_results.to_string()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ResolverError::InvalidResponse(format!(
                "catalog returned {}",
                response.status()
            )));
        }

        let body: CatalogSearchResponse = response.json().await?;
        let entry = body.results.into_iter().next().ok_or(ResolverError::NoMatch)?;

        Ok(ResolvedSong {
            id: entry.id,
            title: entry.title,
            cover_url: entry.cover_url,
            duration_encoded: entry.duration,
        })
    }

    async fn health_check(&self) -> bool {
        let url = format!("{}/health", self.config.base_url);
        match self.client.get(&url).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                warn!("Catalog health check failed: {}", e);
                false
            }
        }
    }
}
