use axum::{
    body::Bytes,
    extract::{Query, State},
    http::Method,
    response::Json,
};

use crate::app::AppState;
use crate::dispatch::Execution;
use crate::error::ApiError;

/// GET|POST /execute - Run the injected logic
///
/// Query parameters override JSON body parameters; GET ignores the body.
/// A failing entry point still answers 200 with the failure in `result`;
/// a payload or evaluation failure answers 500 with `success: false`.
pub async fn execute(
    State(state): State<AppState>,
    method: Method,
    Query(query): Query<Vec<(String, String)>>,
    body: Bytes,
) -> Result<Json<Execution>, ApiError> {
    let body = (method == Method::POST).then_some(&body[..]);
    tracing::debug!("{} /execute with {} query parameters", method, query.len());

    let execution = state.dispatcher.handle(body, query).await?;
    Ok(Json(execution))
}
