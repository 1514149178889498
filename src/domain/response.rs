use std::borrow::Cow;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::transport::TransportError;

/// Status reported by responses synthesized from a transport failure.
pub const SYNTHESIZED_STATUS: u16 = 0;

/// A fully read HTTP response, or a stand-in for one that never arrived.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl Response {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: Vec::new(),
        }
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Wrap a transport failure so callers see the same shape as a real
    /// response: no status, no headers, the error message as body.
    pub fn from_transport_error(error: &TransportError) -> Self {
        Self::new(SYNTHESIZED_STATUS).with_body(error.to_string())
    }

    pub fn is_synthesized(&self) -> bool {
        self.status == SYNTHESIZED_STATUS
    }

    /// 2xx, or 304 Not Modified.
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status) || self.status == 304
    }

    pub fn header(&self, name: &HeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Body decoded as UTF-8, with invalid sequences replaced.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}
