//! Notification dispatcher: round-robin provider failover with backoff.
//!
//! Each `send` call:
//! 1. Picks a starting provider from the round-robin cursor for the type
//! 2. Tries providers one after another, wrapping around the roster
//! 3. Sleeps on an exponential backoff after every full rotation of failures
//! 4. Gives up with `DispatchFailed` once the backoff budget is spent

use std::sync::atomic::{AtomicU32, Ordering};

use tokio::sync::Mutex;
use tracing::Instrument;
use uuid::Uuid;

use courier_common::config::AppConfig;
use courier_common::types::{Notification, ProviderResponse};

use crate::backoff::{BackoffConfig, ExponentialBackoff};
use crate::error::NotifierError;
use crate::retry::{Recovery, fold_retries};
use crate::roster::ProviderRegistry;
use crate::transport::Transport;

/// Sends notifications through the configured provider rosters.
#[derive(Debug)]
pub struct Dispatcher<T> {
    transport: T,
    registry: ProviderRegistry,
    backoff: BackoffConfig,
}

impl<T: Transport> Dispatcher<T> {
    /// Backoff parameters are validated here so every dispatch can build its own policy.
    pub fn new(
        transport: T,
        registry: ProviderRegistry,
        backoff: BackoffConfig,
    ) -> Result<Self, NotifierError> {
        backoff.validate()?;
        Ok(Self {
            transport,
            registry,
            backoff,
        })
    }

    pub fn from_config(transport: T, config: &AppConfig) -> Result<Self, NotifierError> {
        Self::new(
            transport,
            ProviderRegistry::from_config(config),
            BackoffConfig::from(config),
        )
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Deliver `notification` through one of its type's providers.
    ///
    /// Returns the provider's response body, `NoProvidersConfigured` when the
    /// roster is empty, or `DispatchFailed` once every retry has been used.
    /// The returned future may be dropped at any await point.
    pub async fn send(
        &self,
        notification: &Notification,
    ) -> Result<ProviderResponse, NotifierError> {
        let kind = notification.kind();
        let span = tracing::info_span!("dispatch", dispatch_id = %Uuid::new_v4(), kind = %kind);
        self.dispatch(notification).instrument(span).await
    }

    async fn dispatch(
        &self,
        notification: &Notification,
    ) -> Result<ProviderResponse, NotifierError> {
        let kind = notification.kind();
        let roster = self.registry.roster(kind);
        if roster.is_empty() {
            return Err(NotifierError::NoProvidersConfigured(kind));
        }
        let roster_len = roster.len();

        let backoff = Mutex::new(ExponentialBackoff::new(self.backoff)?);
        let attempts = AtomicU32::new(0);
        let start = roster.next_index()?;
        let body = notification.data();

        let attempt = |index: usize| {
            let attempt = attempts.fetch_add(1, Ordering::SeqCst) + 1;
            let endpoint = roster.get(index);
            let transport = &self.transport;

            async move {
                let endpoint = endpoint.ok_or(NotifierError::NoProvidersConfigured(kind))?;
                tracing::info!(
                    attempt,
                    provider = endpoint.ordinal + 1,
                    url = %endpoint.url,
                    "Sending notification"
                );
                let response = transport.post(&endpoint.url, &body).await?;
                Ok::<_, NotifierError>(response)
            }
        };

        let recover = |index: usize, error: NotifierError| {
            let attempts = attempts.load(Ordering::SeqCst);
            let backoff = &backoff;

            async move {
                tracing::warn!(
                    attempt = attempts,
                    provider_index = index,
                    error = %error,
                    "Provider send failed"
                );

                let mut backoff = backoff.lock().await;
                if backoff.is_exhausted() {
                    return Ok(Recovery::Stop(NotifierError::DispatchFailed { kind, attempts }));
                }

                // Every provider has failed once since the last pause.
                if attempts as usize % roster_len == 0 {
                    let delay = backoff.delay_and_advance().await?;
                    tracing::info!(
                        delay_ms = delay.as_millis() as u64,
                        step = backoff.attempts_used(),
                        "Backed off after full provider rotation"
                    );
                }

                Ok::<_, NotifierError>(Recovery::Continue((index + 1) % roster_len))
            }
        };

        match fold_retries(attempt, recover, start).await {
            Ok(response) => {
                tracing::info!(
                    attempts = attempts.load(Ordering::SeqCst),
                    "Notification delivered"
                );
                Ok(response)
            }
            Err(err) => {
                let err = err.into_inner();
                tracing::error!(error = %err, "Notification dispatch failed");
                Err(err)
            }
        }
    }
}

impl From<&AppConfig> for BackoffConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            base_delay: std::time::Duration::from_millis(config.backoff_base_delay_ms),
            multiplier: config.backoff_multiplier,
            max_attempts: config.backoff_max_attempts,
            jitter_fraction: config.backoff_jitter,
        }
    }
}
