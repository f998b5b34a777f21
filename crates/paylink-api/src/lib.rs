//! Paylink API Library
//!
//! HTTP handlers, application state and setup for the pay-link service.

mod api_doc;
mod handlers;
pub mod setup;
mod telemetry;
mod utils;

pub mod auth;
pub mod error;
pub mod state;

pub use error::{ErrorResponse, HttpAppError};
pub use state::AppState;

/// Versioned prefix of every JSON endpoint
pub const API_PREFIX: &str = "/api/v1";
