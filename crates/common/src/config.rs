use serde::Deserialize;

use crate::types::NotificationType;

/// Global application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// API listen port (default: 3010)
    pub port: u16,

    /// Host every provider listens on
    pub provider_host: String,

    /// One port per SMS provider, in rotation order
    pub sms_provider_ports: Vec<u16>,

    /// One port per email provider, in rotation order
    pub email_provider_ports: Vec<u16>,

    /// First backoff delay in milliseconds (default: 500)
    pub backoff_base_delay_ms: u64,

    /// Backoff growth factor (default: 1.5)
    pub backoff_multiplier: f64,

    /// Number of backoff delays allowed per dispatch (default: 10)
    pub backoff_max_attempts: u32,

    /// Jitter fraction in [0, 1) (default: 0.5)
    pub backoff_jitter: f64,

    /// Per-request timeout for provider calls in milliseconds (default: 5000)
    pub provider_timeout_ms: u64,

    /// Overall deadline for one dispatch in milliseconds (default: 60000)
    pub dispatch_timeout_ms: u64,

    /// Maximum accepted request body size (default: 64 KiB)
    pub max_body_bytes: usize,

    /// Emit JSON logs instead of the human-readable format
    pub log_json: bool,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        Ok(Self {
            port: parse_var("PORT", &var("PORT", "3010"))?,
            provider_host: var("PROVIDER_HOST", "127.0.0.1"),
            sms_provider_ports: parse_ports(
                "SMS_PROVIDER_PORTS",
                &var("SMS_PROVIDER_PORTS", "8071,8072,8073"),
            )?,
            email_provider_ports: parse_ports(
                "EMAIL_PROVIDER_PORTS",
                &var("EMAIL_PROVIDER_PORTS", "8091,8092,8093"),
            )?,
            backoff_base_delay_ms: parse_var(
                "BACKOFF_BASE_DELAY_MS",
                &var("BACKOFF_BASE_DELAY_MS", "500"),
            )?,
            backoff_multiplier: parse_var("BACKOFF_MULTIPLIER", &var("BACKOFF_MULTIPLIER", "1.5"))?,
            backoff_max_attempts: parse_var(
                "BACKOFF_MAX_ATTEMPTS",
                &var("BACKOFF_MAX_ATTEMPTS", "10"),
            )?,
            backoff_jitter: parse_var("BACKOFF_JITTER", &var("BACKOFF_JITTER", "0.5"))?,
            provider_timeout_ms: parse_var(
                "PROVIDER_TIMEOUT_MS",
                &var("PROVIDER_TIMEOUT_MS", "5000"),
            )?,
            dispatch_timeout_ms: parse_var(
                "DISPATCH_TIMEOUT_MS",
                &var("DISPATCH_TIMEOUT_MS", "60000"),
            )?,
            max_body_bytes: parse_var("MAX_BODY_BYTES", &var("MAX_BODY_BYTES", "65536"))?,
            log_json: var("LOG_FORMAT", "pretty").eq_ignore_ascii_case("json"),
        })
    }

    /// Provider ports configured for a notification type.
    pub fn provider_ports(&self, kind: NotificationType) -> &[u16] {
        match kind {
            NotificationType::Sms => &self.sms_provider_ports,
            NotificationType::Email => &self.email_provider_ports,
        }
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, raw: &str) -> anyhow::Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("{} has an invalid value: {:?}", key, raw))
}

/// Parse a comma-separated port list. An empty value yields an empty roster.
fn parse_ports(key: &str, raw: &str) -> anyhow::Result<Vec<u16>> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| parse_var(key, part))
        .collect()
}
