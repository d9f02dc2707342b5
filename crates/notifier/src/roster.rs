//! Provider rosters and round-robin selection.
//!
//! Each notification type owns a fixed, ordered list of provider endpoints
//! plus a rotation cursor. The cursor is the only state shared between
//! concurrent dispatches; it is advanced with a single atomic read-and-increment
//! so no two dispatches of the same type start on the same provider.

use std::sync::atomic::{AtomicUsize, Ordering};

use courier_common::config::AppConfig;
use courier_common::types::NotificationType;

use crate::error::NotifierError;

/// A single provider endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderEndpoint {
    /// Zero-based position in the roster
    pub ordinal: usize,
    pub url: String,
}

impl ProviderEndpoint {
    /// Endpoint for the provider at `ordinal` (0-based; the URL is 1-based).
    pub fn new(kind: NotificationType, host: &str, port: u16, ordinal: usize) -> Self {
        Self {
            ordinal,
            url: format!("http://{}:{}/api/{}/provider{}", host, port, kind, ordinal + 1),
        }
    }
}

/// Ordered providers for one notification type with a rotation cursor.
#[derive(Debug)]
pub struct ProviderRoster {
    kind: NotificationType,
    providers: Vec<ProviderEndpoint>,
    cursor: AtomicUsize,
}

impl ProviderRoster {
    pub fn new(kind: NotificationType, providers: Vec<ProviderEndpoint>) -> Self {
        Self {
            kind,
            providers,
            cursor: AtomicUsize::new(0),
        }
    }

    /// Build a roster of `host:port` providers in the given order.
    pub fn from_ports(kind: NotificationType, host: &str, ports: &[u16]) -> Self {
        let providers = ports
            .iter()
            .enumerate()
            .map(|(ordinal, &port)| ProviderEndpoint::new(kind, host, port, ordinal))
            .collect();
        Self::new(kind, providers)
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ProviderEndpoint> {
        self.providers.get(index)
    }

    /// Return the current cursor and advance it by one, wrapping at the roster length.
    pub fn next_index(&self) -> Result<usize, NotifierError> {
        let len = self.providers.len();
        if len == 0 {
            return Err(NotifierError::NoProvidersConfigured(self.kind));
        }

        let previous = self
            .cursor
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |index| {
                Some((index + 1) % len)
            })
            .unwrap_or_else(|index| index);

        Ok(previous)
    }
}

/// Process-wide provider rosters, one per notification type.
#[derive(Debug)]
pub struct ProviderRegistry {
    sms: ProviderRoster,
    email: ProviderRoster,
}

impl ProviderRegistry {
    pub fn new(sms: ProviderRoster, email: ProviderRoster) -> Self {
        Self { sms, email }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        let build = |kind: NotificationType| {
            ProviderRoster::from_ports(kind, &config.provider_host, config.provider_ports(kind))
        };
        let registry = Self::new(build(NotificationType::Sms), build(NotificationType::Email));

        for kind in NotificationType::ALL {
            let roster = registry.roster(kind);
            if roster.is_empty() {
                tracing::warn!(
                    kind = %kind,
                    "No providers configured; requests of this type will fail"
                );
            } else {
                tracing::info!(kind = %kind, providers = roster.len(), "Provider roster loaded");
            }
        }

        registry
    }

    pub fn roster(&self, kind: NotificationType) -> &ProviderRoster {
        match kind {
            NotificationType::Sms => &self.sms,
            NotificationType::Email => &self.email,
        }
    }

    /// Round-robin starting index for the next dispatch of `kind`.
    pub fn next_index(&self, kind: NotificationType) -> Result<usize, NotifierError> {
        self.roster(kind).next_index()
    }
}
