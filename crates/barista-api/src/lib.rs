//! HTTP transport for the barista chat engine.
//!
//! Exposes `POST /chat`, `DELETE /chat/sessions/{id}` and `GET /health`.

pub mod error;
pub mod handlers;
pub mod rate_limit;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::{create_router, start_server};
pub use state::AppState;
