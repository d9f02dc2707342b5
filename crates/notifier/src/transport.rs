//! Outbound delivery to a single provider.

use std::future::Future;
use std::time::Duration;

use serde::Serialize;

use courier_common::types::ProviderResponse;

use crate::error::TransportError;

/// POSTs a payload to a provider endpoint.
///
/// Any 2xx response is a success carrying the provider's body; everything
/// else, including connection failures, is a [`TransportError`].
pub trait Transport: Send + Sync {
    fn post<B>(
        &self,
        url: &str,
        body: &B,
    ) -> impl Future<Output = Result<ProviderResponse, TransportError>> + Send
    where
        B: Serialize + Sync + ?Sized;
}

/// `reqwest`-backed transport.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Build a transport whose requests time out after `timeout`.
    ///
    /// Providers are addressed directly, so system proxy settings are ignored.
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .no_proxy()
            .build()?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    async fn post<B>(&self, url: &str, body: &B) -> Result<ProviderResponse, TransportError>
    where
        B: Serialize + Sync + ?Sized,
    {
        let response = self.client.post(url).json(body).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        // Providers normally answer with JSON; keep anything else as a string.
        Ok(serde_json::from_str(&text).unwrap_or(ProviderResponse::String(text)))
    }
}
