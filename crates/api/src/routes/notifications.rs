//! Notification relay route.

use std::time::Duration;

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::json;

use courier_common::error::AppError;
use courier_common::types::Notification;

use crate::state::AppState;
use crate::validation::validate_notification;

pub fn router() -> Router<AppState> {
    Router::new().route("/notification", post(send_notification))
}

/// POST /notification: Relay a notification to one of its type's providers.
async fn send_notification(
    State(state): State<AppState>,
    payload: Result<Json<Notification>, JsonRejection>,
) -> Result<Json<serde_json::Value>, AppError> {
    let Json(notification) = payload.map_err(rejection_to_error)?;
    validate_notification(&notification)?;

    let kind = notification.kind();
    let deadline = Duration::from_millis(state.config.dispatch_timeout_ms);

    let result = tokio::time::timeout(deadline, state.dispatcher.send(&notification))
        .await
        .map_err(|_| {
            tracing::warn!(
                kind = %kind,
                deadline_ms = state.config.dispatch_timeout_ms,
                "Dispatch deadline exceeded"
            );
            AppError::Timeout(format!("Sending {} took too long", kind))
        })??;

    Ok(Json(json!({ "success": true, "result": result })))
}

fn rejection_to_error(rejection: JsonRejection) -> AppError {
    match rejection.status() {
        StatusCode::UNPROCESSABLE_ENTITY => AppError::Validation(rejection.body_text()),
        _ => AppError::BadRequest(rejection.body_text()),
    }
}
