use async_trait::async_trait;
use reqwest::Client;
use sha2::{Digest, Sha256};
use std::time::Duration;
use thiserror::Error;

use crate::logging::{log_fetch, v_str, ProfileScope};
use crate::quake::FeatureCollection;

#[derive(Debug, Error)]
pub enum FeedError {
    /// Connect, timeout or body read failure.
    #[error("feed transport error: {0}")]
    Transport(String),
    /// Server answered with a non-success status.
    #[error("feed returned HTTP {0}")]
    Status(u16),
    /// Body is not a GeoJSON feature collection.
    #[error("feed body is not a feature collection: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for FeedError {
    fn from(e: reqwest::Error) -> Self {
        match e.status() {
            Some(status) => FeedError::Status(status.as_u16()),
            None => FeedError::Transport(e.to_string()),
        }
    }
}

/// Decoded feed plus the raw body size and digest.
#[derive(Debug, Clone)]
pub struct FeedPayload {
    pub collection: FeatureCollection,
    pub bytes: usize,
    pub sha256: String,
}

impl FeedPayload {
    pub fn from_body(body: &[u8]) -> Result<Self, FeedError> {
        let collection: FeatureCollection =
            serde_json::from_slice(body).map_err(|e| FeedError::Decode(e.to_string()))?;
        Ok(Self {
            collection,
            bytes: body.len(),
            sha256: hex::encode(Sha256::digest(body)),
        })
    }
}

/// Anything that can produce one snapshot of the earthquake feed.
#[async_trait]
pub trait FeedSource {
    async fn fetch(&self) -> Result<FeedPayload, FeedError>;
}

pub struct HttpFeed {
    client: Client,
    url: String,
}

impl HttpFeed {
    pub fn new(url: impl Into<String>, timeout_secs: u64) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self::with_client(url, client)
    }

    pub fn with_client(url: impl Into<String>, client: Client) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl FeedSource for HttpFeed {
    async fn fetch(&self) -> Result<FeedPayload, FeedError> {
        let _scope = ProfileScope::with_context("fetch_feed", &[("url", v_str(&self.url))]);
        let resp = self.client.get(&self.url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FeedError::Status(status.as_u16()));
        }
        let body = resp.bytes().await?;
        let payload = FeedPayload::from_body(&body)?;
        log_fetch(&self.url, status.as_u16(), payload.bytes, &payload.sha256);
        Ok(payload)
    }
}

/// Serves a fixed body instead of going to the network.
pub struct StaticFeed {
    body: Vec<u8>,
}

impl StaticFeed {
    pub fn new(body: impl Into<Vec<u8>>) -> Self {
        Self { body: body.into() }
    }
}

#[async_trait]
impl FeedSource for StaticFeed {
    async fn fetch(&self) -> Result<FeedPayload, FeedError> {
        FeedPayload::from_body(&self.body)
    }
}
