use async_trait::async_trait;
use reqwest::redirect::Policy;
use reqwest::Client;

use crate::app::Result;
use crate::domain::Response;
use crate::transport::{Transport, TransportError, TransportRequest};

pub const DEFAULT_USER_AGENT: &str = concat!("freshet/", env!("CARGO_PKG_VERSION"));

pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self> {
        Self::with_user_agent(DEFAULT_USER_AGENT)
    }

    pub fn with_user_agent(user_agent: &str) -> Result<Self> {
        // 3xx must reach the fetcher untouched
        let client = Client::builder()
            .gzip(true)
            .brotli(true)
            .user_agent(user_agent)
            .redirect(Policy::none())
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: &TransportRequest) -> std::result::Result<Response, TransportError> {
        let mut builder = self
            .client
            .request(request.method.clone(), &request.url)
            .headers(request.headers.clone())
            .timeout(request.timeout);

        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| classify(request, e))?;

        let status = response.status().as_u16();
        let headers = response.headers().clone();

        let body = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                classify(request, e)
            } else {
                TransportError::Body {
                    url: request.url.clone(),
                    message: e.to_string(),
                }
            }
        })?;

        Ok(Response {
            status,
            headers,
            body: body.to_vec(),
        })
    }
}

fn classify(request: &TransportRequest, error: reqwest::Error) -> TransportError {
    let url = request.url.clone();

    if error.is_timeout() {
        TransportError::Timeout {
            url,
            timeout: request.timeout,
        }
    } else if error.is_connect() {
        TransportError::Connect {
            url,
            message: error.to_string(),
        }
    } else {
        TransportError::Request {
            url,
            message: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use reqwest::header::{HeaderMap, ETAG};
    use reqwest::Method;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve one canned HTTP response on a local port and return its URL.
    async fn serve_once(raw_response: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            socket.write_all(raw_response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        });

        format!("http://{}/spec.json", addr)
    }

    fn get(url: &str, timeout: Duration) -> TransportRequest {
        TransportRequest::new(Method::GET, url, HeaderMap::new(), timeout)
    }

    #[tokio::test]
    async fn test_reads_status_headers_and_body() {
        let url = serve_once(
            "HTTP/1.1 200 OK\r\nETag: \"v1\"\r\nContent-Length: 2\r\nConnection: close\r\n\r\n{}",
        )
        .await;

        let transport = ReqwestTransport::new().unwrap();
        let response = transport
            .send(&get(&url, Duration::from_secs(5)))
            .await
            .unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(response.header(&ETAG), Some("\"v1\""));
        assert_eq!(response.body, b"{}");
    }

    #[tokio::test]
    async fn test_does_not_follow_redirects() {
        let url = serve_once(
            "HTTP/1.1 302 Found\r\nLocation: http://127.0.0.1:1/elsewhere\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        )
        .await;

        let transport = ReqwestTransport::new().unwrap();
        let response = transport
            .send(&get(&url, Duration::from_secs(5)))
            .await
            .unwrap();

        assert_eq!(response.status, 302);
    }

    #[tokio::test]
    async fn test_timeout_is_distinguishable() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        // Accept and then never answer
        tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(10)).await;
            drop(socket);
        });

        let transport = ReqwestTransport::new().unwrap();
        let url = format!("http://{}/slow", addr);
        let error = transport
            .send(&get(&url, Duration::from_millis(200)))
            .await
            .unwrap_err();

        assert!(error.is_timeout(), "expected timeout, got {:?}", error);
    }

    #[tokio::test]
    async fn test_refused_connection_is_connect_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let transport = ReqwestTransport::new().unwrap();
        let url = format!("http://{}/gone", addr);
        let error = transport
            .send(&get(&url, Duration::from_secs(5)))
            .await
            .unwrap_err();

        assert!(
            matches!(error, TransportError::Connect { .. }),
            "expected connect error, got {:?}",
            error
        );
    }
}
