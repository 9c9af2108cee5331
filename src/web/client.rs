// src/web/client.rs
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header;

use crate::config::FetchConfig;
use crate::utils::error::FetchError;

/// Source of raw page content.
///
/// `Ok(None)` means the server answered without usable content (non-2xx);
/// transport failures are `Err`. Callers treat both as "no events" for the
/// organization being processed.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Option<String>, FetchError>;
}

/// reqwest-backed fetcher sending the configured User-Agent.
pub struct HttpFetcher {
    client: reqwest::Client,
    user_agent: String,
    request_delay: Duration,
}

impl HttpFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            user_agent: config.user_agent.clone(),
            request_delay: Duration::from_millis(config.request_delay_ms),
        })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Option<String>, FetchError> {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(FetchError::InvalidUrl(url.to_string()));
        }

        tracing::info!("Fetching page: {}", url);
        tracing::debug!("Using User-Agent: {}", self.user_agent);

        // --- Politeness delay ---
        if !self.request_delay.is_zero() {
            tokio::time::sleep(self.request_delay).await;
        }

        let response = self
            .client
            .get(url)
            .header(header::ACCEPT, "text/html,application/xhtml+xml,*/*;q=0.8")
            .send()
            .await?; // Propagates reqwest::Error as FetchError::Network

        // Non-success is "no content", not a failure
        let status = response.status();
        if !status.is_success() {
            tracing::warn!("HTTP status {} for URL: {}", status, url);
            if status == reqwest::StatusCode::FORBIDDEN || status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                tracing::warn!("Received {} - the site may be blocking automated requests.", status);
            }
            return Ok(None);
        }

        let body = response.text().await?;
        tracing::debug!("Downloaded {} bytes from {}", body.len(), url);

        Ok(Some(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builds_with_default_config() {
        assert!(HttpFetcher::new(&FetchConfig::default()).is_ok());
    }

    #[tokio::test]
    async fn test_rejects_non_http_urls() {
        let fetcher = HttpFetcher::new(&FetchConfig::default()).unwrap();
        let result = fetcher.fetch("ftp://example.org/events").await;
        assert!(matches!(result, Err(FetchError::InvalidUrl(_))));
    }
}
