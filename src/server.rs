//! HTTP server exposing the collective state to dashboards.
//!
//! - `GET /health` liveness and version
//! - `GET /api/metrics` latest state, never waits for a tick
//! - `GET /api/history?metric=pulse|temperature` recent readings, most-recent-last
//! - `GET /api/mood` mood breakdown and dominant mood over the recent readings
//! - `GET /api/stats` tick statistics
//! - `GET /api/stream` Server-Sent Events, one `update` per broadcast tick
//!
//! # Architecture
//!
//! ```text
//! BroadcastScheduler ──publish──▶ MetricsHub ◀──read── handlers ──▶ dashboard
//!                                     │
//!                                     └──subscribe──▶ /api/stream ──▶ dashboard
//! ```

use crate::broadcast::{MetricsHub, TickStatsSnapshot};
use crate::core::{CollectivePsychologyState, Mood, MoodBreakdown};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::{Stream, StreamExt};
use tower_http::cors::{Any, CorsLayer};

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to bind to (0 for random)
    pub port: u16,
}

impl ServerConfig {
    pub fn new(port: u16) -> Self {
        Self { port }
    }
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub instance_id: String,
}

/// Error response
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

/// Mood breakdown plus its most frequent label
#[derive(Serialize)]
pub struct MoodResponse {
    #[serde(flatten)]
    pub breakdown: MoodBreakdown,
    /// `null` until the first reading
    pub dominant: Option<Mood>,
}

/// Query for `/api/history`
#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub metric: Option<String>,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, code: &str, error: String) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error,
            code: code.to_string(),
        }),
    )
}

/// GET /health
async fn health(State(hub): State<MetricsHub>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        instance_id: hub.instance_id().to_string(),
    })
}

/// GET /api/metrics
async fn metrics(
    State(hub): State<MetricsHub>,
) -> Result<Json<CollectivePsychologyState>, ApiError> {
    hub.latest()
        .map(|state| Json(state.as_ref().clone()))
        .ok_or_else(|| {
            api_error(
                StatusCode::SERVICE_UNAVAILABLE,
                "NO_SNAPSHOT",
                "No state has been assembled yet".to_string(),
            )
        })
}

/// GET /api/history
async fn history(
    State(hub): State<MetricsHub>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<f64>>, ApiError> {
    match query.metric.as_deref().unwrap_or("pulse") {
        "pulse" => Ok(Json(hub.pulse_history())),
        "temperature" => Ok(Json(hub.temperature_history())),
        other => Err(api_error(
            StatusCode::BAD_REQUEST,
            "INVALID_METRIC",
            format!("Unknown metric '{other}', expected pulse or temperature"),
        )),
    }
}

/// GET /api/mood
async fn mood(State(hub): State<MetricsHub>) -> Json<MoodResponse> {
    let breakdown = hub.mood_breakdown();
    let dominant = breakdown.dominant();
    Json(MoodResponse {
        breakdown,
        dominant,
    })
}

/// GET /api/stats
async fn stats(State(hub): State<MetricsHub>) -> Json<TickStatsSnapshot> {
    Json(hub.stats())
}

/// GET /api/stream
///
/// Each connection is one more subscriber on the shared broadcast; it does
/// not start a timer of its own. A client that falls behind skips states.
async fn stream(
    State(hub): State<MetricsHub>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    tracing::info!(subscribers = hub.subscriber_count() + 1, "Stream client connected");

    let updates = BroadcastStream::new(hub.subscribe()).filter_map(|message| match message {
        Ok(state) => match Event::default().event("update").json_data(state.as_ref()) {
            Ok(event) => Some(Ok(event)),
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize state");
                None
            }
        },
        Err(e) => {
            tracing::warn!(error = %e, "Stream client lagged, skipped states");
            None
        }
    });

    Sse::new(updates).keep_alive(KeepAlive::default())
}

/// Build the router over a hub.
pub fn router(hub: MetricsHub) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/metrics", get(metrics))
        .route("/api/history", get(history))
        .route("/api/mood", get(mood))
        .route("/api/stats", get(stats))
        .route("/api/stream", get(stream))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(hub)
}

/// Run the HTTP server
pub async fn run(
    config: ServerConfig,
    hub: MetricsHub,
) -> anyhow::Result<(SocketAddr, tokio::sync::oneshot::Sender<()>)> {
    let app = router(hub);

    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    let listener = TcpListener::bind(addr).await?;
    let actual_addr = listener.local_addr()?;

    tracing::info!("Pulse server listening on http://{}", actual_addr);

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
                tracing::info!("Server shutdown signal received");
            })
            .await
        {
            tracing::error!("Server error: {}", e);
        }
    });

    Ok((actual_addr, shutdown_tx))
}
