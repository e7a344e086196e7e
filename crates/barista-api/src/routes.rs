//! Router setup and server start.

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use barista_core::error::BaristaError;

use crate::handlers;
use crate::rate_limit::{rate_limit_middleware, RateLimiter};
use crate::state::AppState;

/// Smallest request body cap, whatever the message limit.
const MIN_BODY_LIMIT_BYTES: usize = 64 * 1024;

/// Room for the JSON envelope and the session id.
const BODY_ENVELOPE_BYTES: usize = 4 * 1024;

/// Request body cap for a given message limit.
///
/// A message byte can take up to six bytes once JSON-escaped (`\u0001`), so
/// any message within `max_message_length` reaches the handler and gets its
/// 400 there instead of a 413 from the body limit.
pub fn body_limit(max_message_length: usize) -> usize {
    max_message_length
        .saturating_mul(6)
        .saturating_add(BODY_ENVELOPE_BYTES)
        .max(MIN_BODY_LIMIT_BYTES)
}

/// Localhost origins on the configured port plus any configured extras.
/// Origins that are not valid header values are skipped.
fn cors_origins(state: &AppState) -> Vec<HeaderValue> {
    let port = state.config.general.port;
    let defaults = [
        format!("http://127.0.0.1:{}", port),
        format!("http://localhost:{}", port),
    ];

    defaults
        .iter()
        .chain(state.config.api.allowed_origins.iter())
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect()
}

/// Build the router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(cors_origins(&state)))
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    let limiter = RateLimiter::new(state.config.api.rate_limit_per_sec);
    let max_body = body_limit(state.config.chat.max_message_length);

    let chat_routes = Router::new()
        .route("/chat", post(handlers::chat))
        .route("/chat/sessions/{id}", delete(handlers::delete_session))
        .layer(axum::middleware::from_fn(rate_limit_middleware))
        .layer(axum::Extension(limiter));

    Router::new()
        .route("/health", get(handlers::health))
        .merge(chat_routes)
        .layer(DefaultBodyLimit::max(max_body))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Serve on 127.0.0.1 at the configured port until the process exits.
pub async fn start_server(state: AppState) -> Result<(), BaristaError> {
    let addr = format!("127.0.0.1:{}", state.config.general.port);
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| BaristaError::Api(format!("Failed to bind {}: {}", addr, e)))?;
    info!("Barista API listening on {}", addr);

    axum::serve(listener, router)
        .await
        .map_err(|e| BaristaError::Api(format!("Server error: {}", e)))
}
