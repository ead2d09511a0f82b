use crate::{auth::Claims, humanize::HumanizeError, ApiError, SharedAppState, ToAxumResponse};
use humanizer_core::humanize::{HumanizeRequest, HumanizeResponse};

use axum::{
    extract::{rejection::JsonRejection, State},
    response::Response,
    routing, Json, Router,
};

pub fn router() -> Router<SharedAppState> {
    Router::new().route("/humanize", routing::post(humanize))
}

async fn humanize(
    claims: Claims,
    State(state): State<SharedAppState>,
    request: Result<Json<HumanizeRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = request.map_err(|e| {
        log::debug!("unreadable humanize body - {e}");
        ApiError::from(HumanizeError::MissingText)
    })?;

    log::info!("humanize request from {}", claims.email);
    let humanized_text = state.humanizer.humanize(request).await?;

    Ok(HumanizeResponse { humanized_text }.ok())
}
