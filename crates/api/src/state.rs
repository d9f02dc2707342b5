//! Shared application state for the Axum API server.

use std::sync::Arc;

use courier_common::config::AppConfig;
use courier_notifier::{Dispatcher, HttpTransport};

/// Application state shared across all route handlers via Axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher<HttpTransport>>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(dispatcher: Dispatcher<HttpTransport>, config: AppConfig) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
            config: Arc::new(config),
        }
    }

    /// Build the HTTP transport and dispatcher described by `config`.
    pub fn from_config(config: AppConfig) -> anyhow::Result<Self> {
        let transport = HttpTransport::new(std::time::Duration::from_millis(
            config.provider_timeout_ms,
        ))?;
        let dispatcher = Dispatcher::from_config(transport, &config)?;
        Ok(Self::new(dispatcher, config))
    }
}
