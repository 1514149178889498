use std::sync::Arc;
use std::time::Duration;

use crate::app::error::Result;
use crate::config::Config;
use crate::domain::WatchState;
use crate::fetcher::{ChangeAwareFetcher, RequestOptions};
use crate::hooks::TracingHooks;
use crate::transport::{ReqwestTransport, Transport};

pub struct AppContext {
    pub config: Config,
    pub fetcher: Arc<ChangeAwareFetcher>,
    pub request: RequestOptions,
    pub timeout: Duration,
}

impl AppContext {
    pub fn new(config: Config) -> Result<Self> {
        let transport: Arc<dyn Transport + Send + Sync> =
            Arc::new(ReqwestTransport::with_user_agent(&config.fetch.user_agent)?);
        Self::with_transport(config, transport)
    }

    pub fn with_transport(
        config: Config,
        transport: Arc<dyn Transport + Send + Sync>,
    ) -> Result<Self> {
        let mut request = RequestOptions::new();
        for (name, value) in &config.fetch.headers {
            request = request.with_header(name, value)?;
        }

        let fetcher =
            Arc::new(ChangeAwareFetcher::new(transport).with_hooks(Arc::new(TracingHooks)));

        Ok(Self {
            timeout: config.fetch.timeout(),
            config,
            fetcher,
            request,
        })
    }

    /// Fresh state for a new session, honouring `probe_with_head`.
    pub fn new_state(&self) -> WatchState {
        if self.config.watch.probe_with_head {
            WatchState::new()
        } else {
            WatchState::without_head_probe()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::mock::MockTransport;

    #[test]
    fn test_config_headers_become_request_headers() {
        let mut config = Config::default();
        config
            .fetch
            .headers
            .insert("Authorization".into(), "Bearer abc".into());

        let ctx = AppContext::with_transport(config, Arc::new(MockTransport::new())).unwrap();
        assert_eq!(ctx.request.headers.get("authorization").unwrap(), "Bearer abc");
        assert_eq!(ctx.timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_invalid_config_header_is_rejected() {
        let mut config = Config::default();
        config.fetch.headers.insert("bad name".into(), "x".into());

        assert!(AppContext::with_transport(config, Arc::new(MockTransport::new())).is_err());
    }

    #[test]
    fn test_new_state_respects_probe_setting() {
        let mut config = Config::default();
        config.watch.probe_with_head = false;

        let ctx = AppContext::with_transport(config, Arc::new(MockTransport::new())).unwrap();
        assert_eq!(ctx.new_state().head_supported, Some(false));
    }
}
