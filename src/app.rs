use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::ServiceConfig;
use crate::dispatch::Dispatcher;
use crate::handlers;

/// Shared state handed to every route; built once at startup
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ServiceConfig>,
    pub dispatcher: Arc<Dispatcher>,
}

impl AppState {
    pub fn new(service: ServiceConfig, dispatcher: Dispatcher) -> Self {
        Self {
            service: Arc::new(service),
            dispatcher: Arc::new(dispatcher),
        }
    }
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::home))
        .route("/health", get(handlers::health))
        .route("/execute", get(handlers::execute).post(handlers::execute))
        .fallback(handlers::not_found)
        .with_state(state)
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
