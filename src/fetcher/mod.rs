pub mod change_aware;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::app::{FreshetError, Result};
use crate::domain::Validators;

pub use change_aware::ChangeAwareFetcher;

/// Caller-supplied request settings applied to every request of a poll.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub headers: HeaderMap,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Result<Self> {
        let name = HeaderName::from_bytes(name.trim().as_bytes())
            .map_err(|_| FreshetError::InvalidHeader(name.to_string()))?;
        let value = HeaderValue::from_str(value.trim())
            .map_err(|_| FreshetError::InvalidHeader(format!("{}: {}", name, value)))?;
        self.headers.append(name, value);
        Ok(self)
    }

    /// Add a header written as `Name: value`.
    pub fn with_header_line(self, line: &str) -> Result<Self> {
        let (name, value) = line
            .split_once(':')
            .ok_or_else(|| FreshetError::InvalidHeader(line.to_string()))?;
        self.with_header(name, value)
    }

    /// Caller headers plus the watch validators. Validators replace any
    /// caller value of the same name.
    pub fn merged_with(&self, validators: &Validators) -> HeaderMap {
        let mut headers = self.headers.clone();
        for (name, value) in validators.to_headers().iter() {
            headers.insert(name.clone(), value.clone());
        }
        headers
    }
}
