use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::Method;

use crate::app::Result;
use crate::domain::{FetchOutcome, InputRef, ResolvedInput, Response, WatchState};
use crate::fetcher::RequestOptions;
use crate::hooks::{NoopHooks, PostRequest, PreRequest, RequestHooks};
use crate::transport::{Transport, TransportRequest};

/// Retrieves a document only when it changed since the previous poll.
///
/// URL inputs are revalidated in two phases: a HEAD probe compared against
/// the stored validators, then a GET whose body is compared as text when the
/// server offered no validators. File and inline inputs are reported once
/// and never again within a session.
pub struct ChangeAwareFetcher {
    transport: Arc<dyn Transport + Send + Sync>,
    hooks: Arc<dyn RequestHooks + Send + Sync>,
}

/// Either a real response or one synthesized from a transport failure.
enum Exchange {
    Received(Response),
    Failed(Response),
}

impl ChangeAwareFetcher {
    pub fn new(transport: Arc<dyn Transport + Send + Sync>) -> Self {
        Self {
            transport,
            hooks: Arc::new(NoopHooks),
        }
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn RequestHooks + Send + Sync>) -> Self {
        self.hooks = hooks;
        self
    }

    /// Poll `input` once.
    ///
    /// Network and server failures come back as [`FetchOutcome::NotOk`];
    /// `Err` only carries errors raised by the hooks.
    pub async fn fetch(
        &self,
        input: &InputRef,
        options: &RequestOptions,
        timeout: Duration,
        state: &mut WatchState,
    ) -> Result<FetchOutcome> {
        let resolved = input.resolve();

        match &resolved {
            ResolvedInput::Url { path } => {
                let url = path.clone();
                self.revalidate(resolved, &url, options, timeout, state).await
            }
            ResolvedInput::File { .. } | ResolvedInput::Raw { .. } => {
                Ok(observe_local(resolved, state))
            }
        }
    }

    async fn revalidate(
        &self,
        resolved: ResolvedInput,
        url: &str,
        options: &RequestOptions,
        timeout: Duration,
        state: &mut WatchState,
    ) -> Result<FetchOutcome> {
        state.last_url = Some(url.to_string());

        let mut changed: Option<bool> = None;

        if state.should_probe() {
            let headers = options.merged_with(&state.validators);
            let request = TransportRequest::new(Method::HEAD, url, headers, timeout);

            let response = match self.exchange(&request).await? {
                Exchange::Received(response) => response,
                Exchange::Failed(response) => return Ok(FetchOutcome::NotOk { response }),
            };

            if state.head_supported.is_none() {
                state.head_supported = Some(response.is_ok());
                tracing::debug!("HEAD support for {}: {}", url, response.is_ok());
            }

            // Covers every status >= 300 except 304, and a server that
            // accepted HEAD before but rejects it now.
            if !response.is_ok() {
                tracing::debug!("HEAD {} returned {}", url, response.status);
                return Ok(FetchOutcome::NotOk { response });
            }

            if response.status == 304 {
                tracing::debug!("{} not modified (304)", url);
                return Ok(FetchOutcome::NotModified {
                    response: Some(response),
                });
            }

            changed = state.validators.observe(&response.headers);

            if changed == Some(false) {
                tracing::debug!("{} unchanged according to validators", url);
                return Ok(FetchOutcome::NotModified {
                    response: Some(response),
                });
            }
        }

        let request = TransportRequest::new(Method::GET, url, options.headers.clone(), timeout);

        let mut response = match self.exchange(&request).await? {
            Exchange::Received(response) => response,
            Exchange::Failed(response) => return Ok(FetchOutcome::NotOk { response }),
        };

        if response.status >= 300 || !response.is_ok() {
            tracing::debug!("GET {} returned {}", url, response.status);
            return Ok(FetchOutcome::NotOk { response });
        }

        state.validators.record(&response.headers);

        let changed = match changed {
            Some(changed) => changed,
            None => {
                let content = response.text().into_owned();
                let changed = state.last_value.as_deref() != Some(content.as_str());
                state.last_value = Some(content);
                changed
            }
        };

        if !changed {
            tracing::debug!("{} unchanged according to content", url);
            return Ok(FetchOutcome::NotModified {
                response: Some(response),
            });
        }

        tracing::info!("{} changed ({} bytes)", url, response.body.len());

        Ok(FetchOutcome::Content {
            bytes: Some(std::mem::take(&mut response.body)),
            input: resolved,
        })
    }

    /// Send one request wrapped in the hooks. The reported duration covers
    /// the transport call only.
    async fn exchange(&self, request: &TransportRequest) -> Result<Exchange> {
        self.hooks
            .on_pre_request(&PreRequest {
                headers: &request.headers,
                method: &request.method,
                timeout: request.timeout,
                url: &request.url,
            })
            .await?;

        let started = Instant::now();
        let result = self.transport.send(request).await;
        let duration = started.elapsed();

        let (response, error) = match result {
            Ok(response) => (response, None),
            Err(error) => (Response::from_transport_error(&error), Some(error)),
        };

        self.hooks
            .on_post_request(&PostRequest {
                duration,
                headers: &request.headers,
                method: &request.method,
                url: &request.url,
                response: &response,
                error: error.as_ref(),
            })
            .await?;

        Ok(match error {
            Some(_) => Exchange::Failed(response),
            None => Exchange::Received(response),
        })
    }
}

/// Files and inline data are reported on first sight only.
fn observe_local(resolved: ResolvedInput, state: &mut WatchState) -> FetchOutcome {
    if state.last_value.is_some() {
        return FetchOutcome::NotModified { response: None };
    }

    state.last_value = Some(resolved.kind().to_string());
    FetchOutcome::Content {
        bytes: None,
        input: resolved,
    }
}
