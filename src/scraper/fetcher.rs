//! HTTP fetcher implementation
//!
//! One outbound request per call, bounded by the configured timeout. Failures
//! are classified into [`FetchError`] variants; retry policy belongs to callers,
//! and none is applied here.

use crate::config::CrawlerConfig;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Transport-level failure classification for a single page fetch
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request timeout for {url}")]
    Timeout { url: String },

    #[error("connection refused for {url}")]
    ConnectionRefused { url: String },

    #[error("HTTP {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("fetch failed for {url}: {message}")]
    Other { url: String, message: String },
}

impl FetchError {
    fn from_reqwest(url: &Url, e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
            }
        } else if e.is_connect() {
            FetchError::ConnectionRefused {
                url: url.to_string(),
            }
        } else {
            FetchError::Other {
                url: url.to_string(),
                message: e.to_string(),
            }
        }
    }
}

/// A successfully fetched page
#[derive(Debug)]
pub struct PageContent {
    /// The URL the body was fetched from
    pub url: Url,

    /// Raw HTML body
    pub body: String,
}

/// Builds the HTTP client used for all catalog requests
///
/// The per-request timeout comes from the crawler configuration; a shorter
/// connect timeout bounds unreachable hosts.
pub fn build_http_client(config: &CrawlerConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(Duration::from_secs(config.fetch_timeout_secs))
        .connect_timeout(Duration::from_secs(config.fetch_timeout_secs.min(10)))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches one URL and returns its HTML body
///
/// Non-2xx statuses are reported as [`FetchError::HttpStatus`]; transport
/// failures are classified as timeout, connection refused, or other.
pub async fn fetch_page(client: &Client, url: &Url) -> Result<PageContent, FetchError> {
    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|e| FetchError::from_reqwest(url, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::HttpStatus {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let body = response
        .text()
        .await
        .map_err(|e| FetchError::from_reqwest(url, e))?;

    Ok(PageContent {
        url: url.clone(),
        body,
    })
}
