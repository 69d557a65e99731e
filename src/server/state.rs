//! Shared handler state

use std::sync::Arc;

use crate::config::SmbSettings;
use crate::relay::RetryConfig;
use crate::smb::SessionConnector;

#[derive(Clone)]
pub struct AppState {
    pub connector: Arc<dyn SessionConnector>,
    /// Validated into connection parameters on every request
    pub settings: Arc<SmbSettings>,
    pub retry: RetryConfig,
}

impl AppState {
    pub fn new(connector: Arc<dyn SessionConnector>, settings: SmbSettings) -> Self {
        let retry = settings.retry_config();
        Self {
            connector,
            settings: Arc::new(settings),
            retry,
        }
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }
}
