//! Selector-threading retry loop.
//!
//! `fold_retries` runs `attempt(selector)` until it succeeds. After each
//! failure, `recover(selector, error)` decides what happens next: continue
//! with a new selector, stop, or fail outright. The loop itself keeps no
//! counters and never looks inside errors; bounding the number of retries is
//! the recovery callback's job.

use std::future::Future;

use thiserror::Error;

/// Outcome of a recovery callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recovery<S, X> {
    /// Retry with this selector.
    Continue(S),
    /// Give up with this reason.
    Stop(X),
}

/// Terminal failure of [`fold_retries`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RetryError<X> {
    /// Recovery asked to stop.
    #[error("retries exhausted: {0}")]
    Exhausted(X),

    /// Recovery itself failed.
    #[error("recovery failed: {0}")]
    Recovery(X),
}

impl<X> RetryError<X> {
    pub fn into_inner(self) -> X {
        match self {
            RetryError::Exhausted(x) | RetryError::Recovery(x) => x,
        }
    }
}

/// Run `attempt` until it succeeds or `recover` stops the loop.
pub async fn fold_retries<S, T, E, X, A, AFut, R, RFut>(
    mut attempt: A,
    mut recover: R,
    initial: S,
) -> Result<T, RetryError<X>>
where
    S: Clone,
    A: FnMut(S) -> AFut,
    AFut: Future<Output = Result<T, E>>,
    R: FnMut(S, E) -> RFut,
    RFut: Future<Output = Result<Recovery<S, X>, X>>,
{
    let mut selector = initial;

    loop {
        let error = match attempt(selector.clone()).await {
            Ok(result) => return Ok(result),
            Err(error) => error,
        };

        match recover(selector, error).await {
            Ok(Recovery::Continue(next)) => selector = next,
            Ok(Recovery::Stop(reason)) => return Err(RetryError::Exhausted(reason)),
            Err(err) => return Err(RetryError::Recovery(err)),
        }
    }
}
