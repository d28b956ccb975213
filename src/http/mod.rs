//! HTTP transport - the member registry as a JSON API.
//!
//! Requires the `http` feature. Uses axum for routing.
//!
//! ## Routes
//!
//! - `GET /health`: `{ "ok": true }`
//! - `GET /api/members`: all members, ordered by last name
//! - `POST /api/members`: create a member (201)
//! - `GET /api/members/search?lastName=...`: filtered members
//! - `GET /api/members/:id`: one member
//! - `PUT /api/members/:id`: guarded update; body carries `version`
//! - `DELETE /api/members/:id`: guarded delete
//! - `POST /api/members/:id/unlock`: administrative lock release
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use claimant_registry::{http, InMemoryMemberStore, MemberRegistry};
//!
//! let registry = Arc::new(MemberRegistry::new(InMemoryMemberStore::new()));
//! let app = http::router(registry.clone());
//! http::serve(registry, "0.0.0.0:3000").await?;
//! ```

mod error;
mod handlers;

use std::sync::Arc;

use axum::body::Body;
use axum::http::Request;
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::registry::MemberRegistry;
use crate::store::MemberStore;

pub use error::ApiError;

/// Build an axum `Router` over the given registry.
pub fn router<S: MemberStore + 'static>(registry: Arc<MemberRegistry<S>>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/api/members",
            get(handlers::list::<S>).post(handlers::create::<S>),
        )
        .route("/api/members/search", get(handlers::search::<S>))
        .route(
            "/api/members/:id",
            get(handlers::get_one::<S>)
                .put(handlers::update::<S>)
                .delete(handlers::delete::<S>),
        )
        .route("/api/members/:id/unlock", post(handlers::unlock::<S>))
        .with_state(registry)
}

/// The router wrapped in a per-request tracing span.
pub fn app<S: MemberStore + 'static>(registry: Arc<MemberRegistry<S>>) -> Router {
    router(registry).layer(TraceLayer::new_for_http().make_span_with(
        |request: &Request<Body>| {
            tracing::info_span!(
                "api-request",
                method = %request.method(),
                uri = %request.uri(),
            )
        },
    ))
}

/// Serve the registry over HTTP at `addr` until ctrl-c.
pub async fn serve<S: MemberStore + 'static>(
    registry: Arc<MemberRegistry<S>>,
    addr: &str,
) -> Result<(), std::io::Error> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "member server listening");
    axum::serve(listener, app(registry))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
