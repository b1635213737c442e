use axum::{extract::State, http::Uri, response::Json};
use serde_json::{json, Value};

use crate::app::AppState;
use crate::error::ApiError;

/// GET / - Describe this service instance
pub async fn home(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "message": "Roble Service ready",
        "serviceId": state.service.service_id,
        "tableName": state.dispatcher.table_name(),
        "endpoint": state.service.endpoint(),
        "status": "running",
        "logic": state.dispatcher.logic_name(),
    }))
}

/// GET /health - Always healthy while the process serves requests
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::not_found(format!("route not found: {}", uri.path()))
}
