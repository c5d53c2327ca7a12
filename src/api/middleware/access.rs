//! Source-address admission middleware

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{ConnectInfo, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::access::AccessFilter;

/// Drops requests from clients missing from the allow-list.
///
/// A refused client gets an empty 200, the same answer as an ignored request,
/// so nothing about the bridge leaks to it.
pub async fn access_filter(
    State(filter): State<Arc<AccessFilter>>,
    ConnectInfo(remote): ConnectInfo<SocketAddr>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if !filter.admits_socket(&remote) {
        return StatusCode::OK.into_response();
    }

    next.run(request).await
}
