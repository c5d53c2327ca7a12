//! Alert ingestion endpoint

use std::net::SocketAddr;

use axum::{
    body::Bytes,
    extract::{ConnectInfo, State},
    http::{StatusCode, Uri},
};
use tracing::{error, info, instrument};

use crate::{
    api::{error::ApiResult, state::ApiState},
    ingest::IngestOutcome,
    util::{dump_request, unix_now},
};

/// Any path that is not an emitter path
///
/// Matches the path against the endpoint table and applies the payload
#[instrument(skip(state, body), fields(path = %uri.path()))]
pub async fn ingest(
    State(state): State<ApiState>,
    ConnectInfo(remote): ConnectInfo<SocketAddr>,
    uri: Uri,
    body: Bytes,
) -> ApiResult<StatusCode> {
    let path = uri.path();
    info!("receiving a new query from {remote} on {path} ({} bytes)", body.len());

    if let Some(dir) = &state.dump_dir
        && !body.is_empty()
    {
        dump_request(dir, &body).await;
    }

    match state.router.ingest(path, &body, unix_now()).await {
        Ok(IngestOutcome::Unrouted) => Ok(StatusCode::OK),
        Ok(IngestOutcome::Applied {
            service, severity, ..
        }) => {
            info!("applied {severity} alert for {service}");
            Ok(StatusCode::OK)
        }
        Err(e) => {
            error!("request from {remote} on {path} failed: {e}");
            Err(e.into())
        }
    }
}
