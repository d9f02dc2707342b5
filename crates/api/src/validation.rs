//! Payload validation for inbound notifications.
//!
//! Deserialization already guarantees the shape; these checks cover the
//! content rules providers rely on.

use std::sync::LazyLock;

use regex::Regex;

use courier_common::error::AppError;
use courier_common::types::{Email, Notification, Sms};

/// Bangladeshi mobile numbers, optionally prefixed with the country code.
static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:\+88|88)?01[3-9]\d{8}$").expect("phone pattern compiles"));

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

/// Check a notification's content, reporting every violated rule at once.
pub fn validate_notification(notification: &Notification) -> Result<(), AppError> {
    let problems = match notification {
        Notification::Sms(sms) => sms_problems(sms),
        Notification::Email(email) => email_problems(email),
    };

    if problems.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(problems.join("; ")))
    }
}

fn sms_problems(sms: &Sms) -> Vec<String> {
    let mut problems = Vec::new();
    if !PHONE_RE.is_match(&sms.phone) {
        problems.push("data.phone: Invalid phone number".to_string());
    }
    if sms.text.is_empty() {
        problems.push("data.text: Text is required".to_string());
    }
    problems
}

fn email_problems(email: &Email) -> Vec<String> {
    let mut problems = Vec::new();
    if email.subject.is_empty() {
        problems.push("data.subject: Subject is required".to_string());
    }
    if email.body.is_empty() {
        problems.push("data.body: Body is required".to_string());
    }
    if email.recipients.is_empty() {
        problems.push("data.recipients: At least one recipient is required".to_string());
    }
    for (i, recipient) in email.recipients.iter().enumerate() {
        if !EMAIL_RE.is_match(recipient) {
            problems.push(format!("data.recipients[{}]: Invalid email address", i));
        }
    }
    problems
}
