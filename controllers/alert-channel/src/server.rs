//! # HTTP Server
//!
//! HTTP server for metrics and Kubernetes probes.
//!
//! Provides endpoints:
//! - `/metrics` - Prometheus metrics in text format
//! - `/healthz` - Liveness probe (always returns 200)
//! - `/readyz` - Readiness probe (200 once the Checkly key is validated and the watcher runs)

use crate::metrics::Metrics;
use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Router};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

pub struct ServerState {
    pub is_ready: AtomicBool,
    pub metrics: Metrics,
}

impl ServerState {
    pub fn new(metrics: Metrics) -> Self {
        Self {
            is_ready: AtomicBool::new(false),
            metrics,
        }
    }

    pub fn set_ready(&self) {
        self.is_ready.store(true, Ordering::Relaxed);
    }
}

pub fn router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .route("/healthz", get(healthz_handler))
        .route("/readyz", get(readyz_handler))
        .with_state(state)
}

pub async fn start_server(port: u16, state: Arc<ServerState>) -> Result<(), anyhow::Error> {
    let addr = format!("0.0.0.0:{}", port);
    let listener = TcpListener::bind(&addr).await?;

    info!("HTTP server listening on {}", addr);

    axum::serve(listener, router(state)).await?;

    Ok(())
}

async fn metrics_handler(State(state): State<Arc<ServerState>>) -> impl IntoResponse {
    match state.metrics.encode() {
        Ok(buffer) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            buffer,
        ),
        Err(e) => {
            error!("Failed to encode metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [("content-type", "text/plain")],
                format!("Failed to encode metrics: {}", e).into_bytes(),
            )
        }
    }
}

async fn healthz_handler() -> impl IntoResponse {
    StatusCode::OK
}

async fn readyz_handler(State(state): State<Arc<ServerState>>) -> impl IntoResponse {
    if state.is_ready.load(Ordering::Relaxed) {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use http::Request;
    use tower::ServiceExt;

    async fn status_of(app: Router, uri: &str) -> StatusCode {
        app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn test_readyz_flips_after_ready() {
        let state = Arc::new(ServerState::new(Metrics::new().unwrap()));

        assert_eq!(status_of(router(state.clone()), "/healthz").await, StatusCode::OK);
        assert_eq!(
            status_of(router(state.clone()), "/readyz").await,
            StatusCode::SERVICE_UNAVAILABLE
        );

        state.set_ready();
        assert_eq!(status_of(router(state), "/readyz").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_metrics_endpoint_serves_text() {
        let metrics = Metrics::new().unwrap();
        metrics.record_outcome("requeue");
        let state = Arc::new(ServerState::new(metrics));

        let response = router(state)
            .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(text.contains("alert_channel_reconciliations_total{outcome=\"requeue\"} 1"));
    }
}
