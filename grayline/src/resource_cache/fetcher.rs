//! HTTP fetching behind a trait, so the cache can be tested without a network.

use std::time::{Duration, SystemTime};

use chrono::{DateTime, Utc};
use reqwest::header::IF_MODIFIED_SINCE;
use thiserror::Error;

use super::HttpStatus;

/// Errors that prevent an HTTP response from being received at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The HTTP client could not be built.
    #[error("failed to create HTTP client: {0}")]
    Client(String),

    /// The request could not be sent or the body not read.
    #[error("request to {url} failed: {message}")]
    Request { url: String, message: String },
}

/// A received HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: HttpStatus,
    pub body: Vec<u8>,
}

impl FetchResponse {
    /// A `200 OK` response with a body.
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    /// A bodiless response with the given status.
    pub fn status(status: HttpStatus) -> Self {
        Self {
            status,
            body: Vec::new(),
        }
    }
}

/// Performs conditional GET requests.
///
/// Called from blocking worker threads; implementations may block.
pub trait ResourceFetcher: Send + Sync {
    /// GET `url`, sending `If-Modified-Since` when `if_modified_since` is set.
    ///
    /// Any status the server returns is a successful fetch; `Err` is for
    /// transport failures only.
    fn fetch(
        &self,
        url: &str,
        if_modified_since: Option<SystemTime>,
    ) -> Result<FetchResponse, FetchError>;
}

/// Production fetcher using a blocking reqwest client.
pub struct ReqwestFetcher {
    client: reqwest::blocking::Client,
}

impl ReqwestFetcher {
    /// Default request timeout in seconds.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Create a fetcher with the default timeout.
    pub fn new() -> Result<Self, FetchError> {
        Self::with_timeout(Self::DEFAULT_TIMEOUT_SECS)
    }

    /// Create a fetcher with a custom timeout.
    pub fn with_timeout(timeout_secs: u64) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(concat!("grayline/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self { client })
    }
}

impl ResourceFetcher for ReqwestFetcher {
    fn fetch(
        &self,
        url: &str,
        if_modified_since: Option<SystemTime>,
    ) -> Result<FetchResponse, FetchError> {
        let request_failed = |e: reqwest::Error| FetchError::Request {
            url: url.to_string(),
            message: e.to_string(),
        };

        let mut request = self.client.get(url);
        if let Some(since) = if_modified_since {
            request = request.header(IF_MODIFIED_SINCE, http_date(since));
        }

        let response = request.send().map_err(request_failed)?;
        let status = response.status().as_u16();
        let body = response.bytes().map_err(request_failed)?.to_vec();

        Ok(FetchResponse { status, body })
    }
}

/// Format a timestamp as an RFC 7231 HTTP date.
pub fn http_date(t: SystemTime) -> String {
    DateTime::<Utc>::from(t)
        .format("%a, %d %b %Y %H:%M:%S GMT")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_date_format() {
        assert_eq!(http_date(SystemTime::UNIX_EPOCH), "Thu, 01 Jan 1970 00:00:00 GMT");
        let t = SystemTime::UNIX_EPOCH + Duration::from_secs(1_718_900_000);
        assert_eq!(http_date(t), "Thu, 20 Jun 2024 16:13:20 GMT");
    }

    #[test]
    fn test_response_constructors() {
        assert_eq!(FetchResponse::ok(vec![1, 2]).status, 200);
        assert!(FetchResponse::status(304).body.is_empty());
    }

    #[test]
    fn test_fetch_error_display() {
        let err = FetchError::Request {
            url: "http://example.com/a".to_string(),
            message: "timed out".to_string(),
        };
        assert_eq!(err.to_string(), "request to http://example.com/a failed: timed out");
    }
}
