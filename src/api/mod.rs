//! HTTP surface of the bridge
//!
//! ## Architecture
//!
//! - **Axum** router with Tower middleware
//! - **Access filter** layered over every route, reads and writes alike
//! - **Emitter paths** are explicit routes serving the cache snapshot
//! - **Everything else** falls through to ingestion, which matches the path
//!   against the endpoint table itself
//!
//! ## Responses
//!
//! - refused client, unknown path, accepted alert: `200` with an empty body
//! - empty alert body, non-GET on an emitter path: `400`
//! - unsupported plugin, unparsable alert: `500`
//! - snapshot: `200` with an `application/json` array

pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::ApiState;

use std::collections::BTreeSet;
use std::net::SocketAddr;

use axum::{Router, routing::any};
use tower_http::trace::TraceLayer;
use tracing::info;

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Bind address (e.g., "127.0.0.1:8080")
    pub bind_addr: SocketAddr,

    /// Paths serving the cache snapshot
    pub emitter_paths: Vec<String>,
}

impl ApiConfig {
    pub fn from_config(config: &crate::config::Config) -> Self {
        Self {
            bind_addr: config.listen_addr(),
            emitter_paths: config
                .emitter
                .iter()
                .map(|emitter| emitter.uri_path.clone())
                .collect(),
        }
    }
}

/// Assembles the router without binding it
pub fn build_router(emitter_paths: &[String], state: ApiState) -> Router {
    let emitter_paths: BTreeSet<&String> = emitter_paths.iter().collect();

    let mut app = Router::new();
    for path in emitter_paths {
        app = app.route(path, any(routes::snapshot::snapshot));
    }

    app.fallback(routes::ingest::ingest)
        .with_state(state.clone())
        .layer(axum::middleware::from_fn_with_state(
            state.access.clone(),
            middleware::access::access_filter,
        ))
        .layer(TraceLayer::new_for_http())
}

/// Spawn the API server
///
/// This starts an Axum HTTP server in a background task.
/// Returns the server's local address.
pub async fn spawn_api_server(config: ApiConfig, state: ApiState) -> anyhow::Result<SocketAddr> {
    info!("starting web server on {}", config.bind_addr);

    let app = build_router(&config.emitter_paths, state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    let addr = listener.local_addr()?;

    info!("web server listening on {}", addr);

    tokio::spawn(async move {
        let service = app.into_make_service_with_connect_info::<SocketAddr>();
        if let Err(e) = axum::serve(listener, service).await {
            tracing::error!("web server error: {}", e);
        }
    });

    Ok(addr)
}
