//! Observability hooks around every network attempt.
//!
//! The fetcher awaits each hook before moving on. A hook that returns an
//! error aborts the fetch and the error reaches the caller unchanged.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, IF_MODIFIED_SINCE, IF_NONE_MATCH};
use reqwest::Method;

use crate::app::Result;
use crate::domain::Response;
use crate::transport::TransportError;

#[derive(Debug)]
pub struct PreRequest<'a> {
    pub headers: &'a HeaderMap,
    pub method: &'a Method,
    pub timeout: Duration,
    pub url: &'a str,
}

#[derive(Debug)]
pub struct PostRequest<'a> {
    /// Time spent in the transport call alone.
    pub duration: Duration,
    pub headers: &'a HeaderMap,
    pub method: &'a Method,
    pub url: &'a str,
    /// The received response, or one synthesized from `error`.
    pub response: &'a Response,
    pub error: Option<&'a TransportError>,
}

#[async_trait]
pub trait RequestHooks {
    async fn on_pre_request(&self, _request: &PreRequest<'_>) -> Result<()> {
        Ok(())
    }

    async fn on_post_request(&self, _request: &PostRequest<'_>) -> Result<()> {
        Ok(())
    }
}

/// Hooks that do nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHooks;

impl RequestHooks for NoopHooks {}

/// Hooks that log every request through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingHooks;

#[async_trait]
impl RequestHooks for TracingHooks {
    async fn on_pre_request(&self, request: &PreRequest<'_>) -> Result<()> {
        let conditional = request.headers.contains_key(IF_NONE_MATCH)
            || request.headers.contains_key(IF_MODIFIED_SINCE);

        tracing::debug!(
            method = %request.method,
            url = request.url,
            timeout_ms = request.timeout.as_millis() as u64,
            conditional,
            "sending request"
        );
        Ok(())
    }

    async fn on_post_request(&self, request: &PostRequest<'_>) -> Result<()> {
        let elapsed_ms = request.duration.as_millis() as u64;

        match request.error {
            Some(error) => {
                tracing::warn!(
                    method = %request.method,
                    url = request.url,
                    elapsed_ms,
                    "request failed: {}",
                    error
                );
            }
            None => {
                tracing::debug!(
                    method = %request.method,
                    url = request.url,
                    status = request.response.status,
                    elapsed_ms,
                    bytes = request.response.body.len(),
                    "received response"
                );
            }
        }
        Ok(())
    }
}

#[cfg(test)]
pub mod recording {
    use std::sync::Mutex;

    use super::*;
    use crate::app::FreshetError;

    /// Records hook invocations in order, e.g. `pre GET`, `post GET 200`.
    #[derive(Default)]
    pub struct RecordingHooks {
        pub events: Mutex<Vec<String>>,
        pub durations: Mutex<Vec<Duration>>,
        pub fail_pre: bool,
        /// Sleep this long in `on_pre_request`.
        pub pre_delay: Duration,
    }

    impl RecordingHooks {
        pub fn events(&self) -> Vec<String> {
            self.events.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl RequestHooks for RecordingHooks {
        async fn on_pre_request(&self, request: &PreRequest<'_>) -> Result<()> {
            if self.fail_pre {
                return Err(FreshetError::Hook("pre-request rejected".into()));
            }
            if !self.pre_delay.is_zero() {
                tokio::time::sleep(self.pre_delay).await;
            }
            self.events
                .lock()
                .unwrap()
                .push(format!("pre {}", request.method));
            Ok(())
        }

        async fn on_post_request(&self, request: &PostRequest<'_>) -> Result<()> {
            let line = match request.error {
                Some(_) => format!("post {} error", request.method),
                None => format!("post {} {}", request.method, request.response.status),
            };
            self.events.lock().unwrap().push(line);
            self.durations.lock().unwrap().push(request.duration);
            Ok(())
        }
    }
}
