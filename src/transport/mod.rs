pub mod reqwest_transport;

#[cfg(test)]
pub mod mock;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::Method;
use thiserror::Error;

use crate::domain::Response;

pub use reqwest_transport::ReqwestTransport;

#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
    pub timeout: Duration,
}

impl TransportRequest {
    pub fn new(method: Method, url: &str, headers: HeaderMap, timeout: Duration) -> Self {
        Self {
            method,
            url: url.to_string(),
            headers,
            body: None,
            timeout,
        }
    }
}

/// Failure to obtain a response at all.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("request to {url} timed out after {timeout:?}")]
    Timeout { url: String, timeout: Duration },

    #[error("could not connect to {url}: {message}")]
    Connect { url: String, message: String },

    #[error("request to {url} failed: {message}")]
    Request { url: String, message: String },

    #[error("failed to read response body from {url}: {message}")]
    Body { url: String, message: String },
}

impl TransportError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, TransportError::Timeout { .. })
    }
}

/// Sends one HTTP request and reads the whole response.
///
/// Implementations must not follow redirects and must fail with
/// [`TransportError::Timeout`] once `request.timeout` elapses.
#[async_trait]
pub trait Transport {
    async fn send(&self, request: &TransportRequest) -> Result<Response, TransportError>;
}
