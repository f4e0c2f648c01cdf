//! cw-api: HTTP surface of the relay
//!
//! Receives the Meta and Chatwoot webhooks and exposes the operator
//! endpoints. Built with axum.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod server;

pub use error::{ApiError, Result};
pub use server::{AppState, router, start_server};
