//! Resilient notification dispatch.
//!
//! A notification is relayed to one of several interchangeable providers.
//! Failed sends rotate to the next provider; after every full rotation the
//! dispatcher waits on an exponential backoff, and gives up once the backoff
//! budget is spent.

pub mod backoff;
pub mod dispatcher;
pub mod error;
pub mod retry;
pub mod roster;
pub mod transport;

pub use backoff::{BackoffConfig, ExponentialBackoff};
pub use dispatcher::Dispatcher;
pub use error::{NotifierError, TransportError};
pub use retry::{Recovery, RetryError, fold_retries};
pub use roster::{ProviderEndpoint, ProviderRegistry, ProviderRoster};
pub use transport::{HttpTransport, Transport};
