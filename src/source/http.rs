//! HTTP data source pulling `{ agents, projects }` JSON from a remote API.

use crate::source::types::SourceData;
use crate::source::{DataSource, SourceError};
use std::future::Future;
use std::time::Duration;

/// Pulls records from a JSON endpoint on every fetch.
pub struct HttpSource {
    url: String,
    client: reqwest::Client,
}

impl HttpSource {
    /// Create a source for the given endpoint URL.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SourceError::Unavailable(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            url: url.into(),
            client,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn pull(&self) -> Result<SourceData, SourceError> {
        let response = self
            .client
            .get(&self.url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| SourceError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(SourceError::Unavailable(format!("{status}: {message}")));
        }

        response
            .json::<SourceData>()
            .await
            .map_err(|e| SourceError::Decode(e.to_string()))
    }
}

impl DataSource for HttpSource {
    fn name(&self) -> &str {
        "http"
    }

    fn fetch(&self) -> impl Future<Output = Result<SourceData, SourceError>> + Send {
        self.pull()
    }
}
