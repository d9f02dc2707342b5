use serde::{Deserialize, Serialize};

/// Channels a notification can be relayed through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationType {
    Sms,
    Email,
}

impl NotificationType {
    pub const ALL: [NotificationType; 2] = [NotificationType::Sms, NotificationType::Email];
}

impl std::fmt::Display for NotificationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotificationType::Sms => write!(f, "sms"),
            NotificationType::Email => write!(f, "email"),
        }
    }
}

/// SMS payload forwarded to an SMS provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sms {
    pub phone: String,
    pub text: String,
}

/// Email payload forwarded to an email provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Email {
    pub subject: String,
    pub body: String,
    pub recipients: Vec<String>,
}

/// An inbound notification request.
///
/// Wire shape is `{"type": "sms" | "email", "data": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum Notification {
    Sms(Sms),
    Email(Email),
}

impl Notification {
    pub fn kind(&self) -> NotificationType {
        match self {
            Notification::Sms(_) => NotificationType::Sms,
            Notification::Email(_) => NotificationType::Email,
        }
    }

    /// The `data` object, serialized exactly as it arrived.
    pub fn data(&self) -> NotificationData<'_> {
        match self {
            Notification::Sms(sms) => NotificationData::Sms(sms),
            Notification::Email(email) => NotificationData::Email(email),
        }
    }
}

/// Borrowed view of a notification's `data` field, used as the provider request body.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(untagged)]
pub enum NotificationData<'a> {
    Sms(&'a Sms),
    Email(&'a Email),
}

/// Raw body returned by a provider on successful delivery.
pub type ProviderResponse = serde_json::Value;
