//! Cache snapshot endpoint

use axum::{
    extract::State,
    http::{Method, header},
    response::{IntoResponse, Response},
};
use tracing::{info, instrument};

use crate::{
    api::{
        error::{ApiError, ApiResult},
        state::ApiState,
    },
    emitter::render_snapshot,
};

/// GET <emitter path>
///
/// Returns every cached check as a health-check JSON array
#[instrument(skip(state))]
pub async fn snapshot(State(state): State<ApiState>, method: Method) -> ApiResult<Response> {
    if method != Method::GET {
        return Err(ApiError::BadRequest);
    }

    let records = state.cache.snapshot_all().await;
    let count = records.len();
    let document = render_snapshot(records);

    info!("{count} item(s) read from the cache");

    Ok(([(header::CONTENT_TYPE, "application/json")], document).into_response())
}
