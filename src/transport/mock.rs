//! Scripted transport for tests: replays queued results and records requests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::header::{HeaderValue, ETAG, LAST_MODIFIED};
use reqwest::Method;

use crate::domain::Response;
use crate::transport::{Transport, TransportError, TransportRequest};

#[derive(Default)]
pub struct MockTransport {
    replies: Mutex<VecDeque<Result<Response, TransportError>>>,
    requests: Mutex<Vec<TransportRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(&self, response: Response) -> &Self {
        self.replies.lock().unwrap().push_back(Ok(response));
        self
    }

    pub fn fail(&self, error: TransportError) -> &Self {
        self.replies.lock().unwrap().push_back(Err(error));
        self
    }

    pub fn requests(&self) -> Vec<TransportRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn methods(&self) -> Vec<Method> {
        self.requests().into_iter().map(|r| r.method).collect()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: &TransportRequest) -> Result<Response, TransportError> {
        self.requests.lock().unwrap().push(request.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("unexpected {} {}", request.method, request.url))
    }
}

pub fn ok(body: &str) -> Response {
    Response::new(200).with_body(body)
}

pub fn with_etag(response: Response, etag: &'static str) -> Response {
    response.with_header(ETAG, HeaderValue::from_static(etag))
}

pub fn with_last_modified(response: Response, last_modified: &'static str) -> Response {
    response.with_header(LAST_MODIFIED, HeaderValue::from_static(last_modified))
}

pub fn timeout(url: &str) -> TransportError {
    TransportError::Timeout {
        url: url.to_string(),
        timeout: std::time::Duration::from_secs(1),
    }
}
