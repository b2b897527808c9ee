//! HTTP server for incident.io webhooks
//!
//! # Routes
//!
//! - `POST /webhook` - Receive an incident.io event and sync component fields to Jira
//! - `GET /health` - Liveness check
//! - `GET /metrics` - Prometheus metrics
//!
//! # Responses
//!
//! | Situation | Status | Body |
//! |---|---|---|
//! | Event synced | 200 | `{"status":"success"}` |
//! | Event type not handled | 200 | `{"status":"ignored"}` |
//! | Body is not valid JSON | 400 | `{"error":"Invalid JSON payload"}` |
//! | Sync failed | 500 | `{"error":"Processing failed"}` |
//!
//! Non-2xx responses make incident.io redeliver the event on its own schedule.

use crate::event::IncidentEvent;
use crate::sync::{metrics, ComponentSync, SyncOutcome};
use axum::{
    body::Bytes,
    extract::{ConnectInfo, DefaultBodyLimit, State},
    http::{header, Extensions, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;

/// Largest webhook body accepted
const MAX_BODY_SIZE: usize = 1024 * 1024;

/// Server error types
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Bind error: {0}")]
    Bind(String),
}

/// Shared server state
struct AppState {
    syncer: ComponentSync,
}

/// HTTP server for incident.io webhooks
pub struct RelayServer {
    state: Arc<AppState>,
}

impl RelayServer {
    pub fn new(syncer: ComponentSync) -> Self {
        Self {
            state: Arc::new(AppState { syncer }),
        }
    }

    fn router(state: Arc<AppState>) -> Router {
        Router::new()
            .route("/health", get(health))
            .route("/metrics", get(metrics_endpoint))
            .route("/webhook", post(webhook))
            .layer(DefaultBodyLimit::max(MAX_BODY_SIZE))
            .with_state(state)
    }

    /// Router without a bound listener, for embedding and tests
    pub fn into_router(self) -> Router {
        Self::router(self.state)
    }

    /// Run the server on the given address
    pub async fn run(self, addr: &str) -> Result<(), ServerError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::Bind(format!("{}: {}", addr, e)))?;

        tracing::info!(addr = addr, "Starting incident.io to JIRA webhook listener");

        axum::serve(
            listener,
            Self::router(self.state).into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .map_err(ServerError::Io)
    }
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
        .into_response()
}

// ============================================================================
// Handlers
// ============================================================================

async fn health() -> impl IntoResponse {
    Json(StatusResponse { status: "healthy" })
}

async fn metrics_endpoint() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        metrics::encode_metrics(),
    )
}

async fn webhook(
    State(state): State<Arc<AppState>>,
    extensions: Extensions,
    body: Bytes,
) -> Response {
    // ConnectInfo is absent when the router is driven without a listener
    let remote = extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.to_string())
        .unwrap_or_else(|| "unknown".to_string());
    tracing::info!(remote = %remote, bytes = body.len(), "Webhook received");

    let event = match IncidentEvent::from_slice(&body) {
        Ok(event) => event,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to decode JSON payload");
            metrics::record_webhook_event("unknown", "invalid_payload");
            return error_response(StatusCode::BAD_REQUEST, "Invalid JSON payload");
        }
    };

    tracing::info!(kind = event.kind(), "Processing event");

    match state.syncer.handle_event(&event).await {
        Ok(SyncOutcome::Ignored { .. }) => {
            metrics::record_webhook_event(event.kind(), "ignored");
            Json(StatusResponse { status: "ignored" }).into_response()
        }
        Ok(SyncOutcome::Synced(report)) => {
            tracing::info!(
                issue = %report.issue_key,
                fields_updated = report.fields_updated(),
                "Successfully processed incident update"
            );
            metrics::record_webhook_event(event.kind(), "success");
            Json(StatusResponse { status: "success" }).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to process incident update");
            metrics::record_webhook_event(event.kind(), "failure");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Processing failed")
        }
    }
}
