use thiserror::Error;

use courier_common::error::AppError;
use courier_common::types::NotificationType;

/// A single provider send failed. Always recoverable by rotating providers.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("provider responded with status {status}: {body}")]
    Status { status: u16, body: String },
}

/// Errors produced by the dispatch core.
#[derive(Debug, Error)]
pub enum NotifierError {
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("backoff exhausted")]
    BackoffExhausted,

    #[error("failed to send {kind} after {attempts} attempts")]
    DispatchFailed {
        kind: NotificationType,
        attempts: u32,
    },

    #[error("no {0} providers configured")]
    NoProvidersConfigured(NotificationType),

    #[error("invalid backoff parameters: {0}")]
    InvalidBackoff(String),
}

impl From<NotifierError> for AppError {
    fn from(err: NotifierError) -> Self {
        match err {
            NotifierError::DispatchFailed { kind, attempts } => AppError::Dispatch(format!(
                "Failed to send {} after {} attempts",
                kind, attempts
            )),
            NotifierError::NoProvidersConfigured(kind) => {
                AppError::Unavailable(format!("No {} providers are available", kind))
            }
            NotifierError::InvalidBackoff(msg) => AppError::Config(msg),
            other => AppError::Internal(other.to_string()),
        }
    }
}
