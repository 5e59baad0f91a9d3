//! # HTTP Control Surface
//!
//! | Method | Path | Effect |
//! |--------|------|--------|
//! | `PUT`  | `/api/v1/notify/registrations` | Registrations changed; triggers a re-read (202) |
//! | `POST` | `/api/v1/events` | Ingest one event (202, 503 once the loop is gone) |
//! | `GET`  | `/api/v1/ping` | Liveness (`pong`) |
//! | `GET`  | `/metrics` | Prometheus text exposition |

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use export_distro::ChangeNotifier;
use export_types::Event;
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub events: mpsc::Sender<Event>,
    pub changes: ChangeNotifier,
}

/// Build the control surface router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/ping", get(ping))
        .route("/api/v1/notify/registrations", put(notify_registrations))
        .route("/api/v1/events", post(ingest_event))
        .route("/metrics", get(metrics))
        .with_state(state)
}

async fn ping() -> &'static str {
    "pong"
}

async fn notify_registrations(State(state): State<AppState>) -> StatusCode {
    if state.changes.notify() {
        debug!("Registration change notification accepted");
        StatusCode::ACCEPTED
    } else {
        warn!("Registration change notification rejected, distribution loop stopped");
        StatusCode::SERVICE_UNAVAILABLE
    }
}

async fn ingest_event(State(state): State<AppState>, Json(event): Json<Event>) -> StatusCode {
    match state.events.send(event).await {
        Ok(()) => StatusCode::ACCEPTED,
        Err(_) => {
            warn!("Event rejected, distribution loop stopped");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

async fn metrics() -> impl IntoResponse {
    match export_telemetry::gather_metrics() {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to render metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
