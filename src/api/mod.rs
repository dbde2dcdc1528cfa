//! # API Module
//!
//! HTTP handlers for the credential backend. Every endpoint takes and
//! returns JSON; failures are rendered as `500 {"error": "..."}`.
//!
//! ## Available Endpoints
//!
//! - `GET /api/health` - Liveness check
//! - `POST /api/issue-credential` - Issue off-chain, then mark on-chain
//! - `POST /api/check-verification` - Read the Humanity verification flag
//! - `POST /api/revoke-credential` - Revoke an issued credential on-chain
//! - `POST /api/credential-details` - Count and types stored for an address

pub mod credentials;
pub mod error;
pub mod health;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::AppState;

/// Routes served under `/api`.
pub fn credential_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/issue-credential",
            post(credentials::issue_credential_handler),
        )
        .route(
            "/check-verification",
            post(credentials::check_verification_handler),
        )
        .route(
            "/revoke-credential",
            post(credentials::revoke_credential_handler),
        )
        .route(
            "/credential-details",
            post(credentials::credential_details_handler),
        )
}

/// The full application: `/api` routes plus tracing and CORS layers.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api", credential_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
