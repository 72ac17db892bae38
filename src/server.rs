use crate::constants::{EXPOSITION_CONTENT_TYPE, HEALTH_PATH, METRICS_PATH};
use crate::error::{ExporterError, Result};
use crate::metrics::MetricStore;
use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use hyper::Server;
use metrics_exporter_prometheus::PrometheusHandle;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

/// Read side of the exporter: the committed event metrics plus the
/// self-instrumentation recorder, if installed.
#[derive(Clone)]
pub struct ServerState {
    store: Arc<MetricStore>,
    handle: Option<PrometheusHandle>,
}

impl ServerState {
    pub fn new(store: Arc<MetricStore>, handle: Option<PrometheusHandle>) -> Self {
        Self { store, handle }
    }
}

/// Health check endpoint
async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "scheduledevent-exporter",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Prometheus text exposition of the latest committed state
async fn metrics(State(state): State<ServerState>) -> impl IntoResponse {
    let mut body = state.store.current().to_string();
    if let Some(handle) = &state.handle {
        body.push_str(&handle.render());
    }
    ([(header::CONTENT_TYPE, EXPOSITION_CONTENT_TYPE)], body)
}

pub fn create_router(state: ServerState) -> Router {
    Router::new()
        .route(METRICS_PATH, get(metrics))
        .route(HEALTH_PATH, get(health))
        .with_state(state)
}

/// Bind `addr` and serve `router` until the server fails.
pub async fn serve(addr: SocketAddr, router: Router) -> Result<()> {
    let server = Server::try_bind(&addr)
        .map_err(|e| ExporterError::Server(format!("failed to bind {}: {}", addr, e)))?;

    info!("Serving metrics on http://{}{}", addr, METRICS_PATH);

    server
        .serve(router.into_make_service())
        .await
        .map_err(|e| ExporterError::Server(e.to_string()))
}
