//! HTTP poll endpoint.

use super::{parse_payload, DataSource};
use crate::error::FetchError;
use crate::models::Payload;
use anyhow::{Context, Result};
use futures::future::BoxFuture;
use std::time::Duration;
use tracing::debug;

/// Polls a detection endpoint with `GET`.
pub struct HttpSource {
    url: String,
    http_client: reqwest::Client,
}

impl HttpSource {
    /// Create a source for `url` with a per-request timeout.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            url: url.into(),
            http_client,
        })
    }

    async fn get(&self) -> Result<Payload, FetchError> {
        let response = self.http_client.get(&self.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let body = response.bytes().await?;
        debug!("Received {} bytes from {}", body.len(), self.url);

        parse_payload(&body)
    }
}

impl DataSource for HttpSource {
    fn fetch(&self) -> BoxFuture<'_, Result<Payload, FetchError>> {
        Box::pin(self.get())
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}
