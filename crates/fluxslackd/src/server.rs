//! Event receiver.
//!
//! Flux posts `{"Event": {...}}` to [`EVENT_PATH`]. Each request is decoded,
//! composed and delivered on its own task:
//! - 201 when Slack accepted the message
//! - 400 when the body is not a Flux event
//! - 500 when delivery failed (rate limiting included)
//!
//! # Graceful Shutdown
//!
//! On CTRL+C or SIGTERM the server stops accepting connections and lets
//! in-flight requests finish.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use fluxslack_core::{Event, Notifier};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info, warn};

/// Path Flux is configured to post events to.
pub const EVENT_PATH: &str = "/v1/event";

#[derive(Deserialize)]
struct EventEnvelope {
    #[serde(rename = "Event", alias = "event")]
    event: Event,
}

/// Build the receiver's router around a notifier.
pub fn create_router(notifier: Arc<dyn Notifier>) -> Router {
    Router::new()
        .route(EVENT_PATH, post(handle_event))
        .route("/healthz", get(health_check))
        .fallback(not_found)
        .with_state(notifier)
}

async fn handle_event(State(notifier): State<Arc<dyn Notifier>>, body: Bytes) -> Response {
    let envelope: EventEnvelope = match serde_json::from_slice(&body) {
        Ok(envelope) => envelope,
        Err(err) => {
            warn!(error = %err, "Rejected malformed event");
            return error_response(StatusCode::BAD_REQUEST, err.to_string());
        }
    };
    let event = envelope.event;

    info!(
        event_id = event.id,
        kind = event.kind(),
        resources = event.resource_ids.len(),
        "Received Flux event"
    );

    let message = notifier.compose(&event);
    if let Err(err) = notifier.send(&message).await {
        let dumped = serde_json::to_string(&message).unwrap_or_default();
        error!(
            event_id = event.id,
            error = %err,
            message = %dumped,
            "Failed to send slack message"
        );
        return error_response(StatusCode::INTERNAL_SERVER_ERROR, err.to_string());
    }

    StatusCode::CREATED.into_response()
}

async fn health_check() -> &'static str {
    "ok"
}

async fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "message": "not found" }))).into_response()
}

fn error_response(status: StatusCode, message: String) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

/// Serve the receiver on `addr` until a shutdown signal arrives.
pub async fn start_server(notifier: Arc<dyn Notifier>, addr: SocketAddr) -> std::io::Result<()> {
    let app = create_router(notifier);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Event receiver listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Event receiver stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = wait_for_signal("Ctrl+C", tokio::signal::ctrl_c());

    #[cfg(unix)]
    let terminate = wait_for_signal("SIGTERM", async {
        let mut signal =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;
        signal.recv().await;
        Ok::<(), std::io::Error>(())
    });

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received CTRL+C, shutting down"),
        () = terminate => info!("Received SIGTERM, shutting down"),
    }
}

/// Resolve once `signal` fires. A handler that fails to install never fires.
async fn wait_for_signal<F>(name: &str, signal: F)
where
    F: Future<Output = std::io::Result<()>>,
{
    if let Err(e) = signal.await {
        error!("Failed to install {} handler: {}", name, e);
        std::future::pending::<()>().await;
    }
}
