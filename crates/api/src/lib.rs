//! Courier HTTP API.
//!
//! Endpoints:
//! - POST /notification: validate and relay an SMS or email notification
//! - GET  /health: liveness probe

pub mod routes;
pub mod state;
pub mod validation;
