//! API handlers for the HTTP REST API

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;

use crate::commands::{self, Command, CommandReply, ThresholdUpdate};
use crate::monitor::{ChainMonitor, MonitorSnapshot};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Monitor the commands act on
    pub monitor: Arc<ChainMonitor>,
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    /// Always `ok` while the server answers
    pub status: String,
    /// Crate version
    pub version: String,
}

/// Health check endpoint
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Command response
#[derive(Debug, Serialize)]
pub struct CommandResponse {
    /// Reply text for the command
    pub message: String,
    /// Whether the monitor is watching after the command
    pub watching: bool,
    /// Chain threshold in seconds after the command
    pub chain_threshold: i64,
    /// Alert threshold in seconds after the command
    pub alert_threshold: i64,
}

fn respond(state: &AppState, reply: CommandReply) -> (StatusCode, Json<CommandResponse>) {
    let settings = state.monitor.settings();
    let status = if reply.rejected {
        StatusCode::UNPROCESSABLE_ENTITY
    } else {
        StatusCode::OK
    };

    (
        status,
        Json(CommandResponse {
            message: reply.message,
            watching: settings.watching(),
            chain_threshold: settings.chain_threshold(),
            alert_threshold: settings.alert_threshold(),
        }),
    )
}

/// Monitor snapshot
pub async fn status(State(state): State<AppState>) -> Json<MonitorSnapshot> {
    Json(state.monitor.snapshot().await)
}

/// Enable the chain watcher
pub async fn enable(State(state): State<AppState>) -> (StatusCode, Json<CommandResponse>) {
    let reply = commands::execute(&state.monitor, Command::Enable);
    respond(&state, reply)
}

/// Disable the chain watcher
pub async fn disable(State(state): State<AppState>) -> (StatusCode, Json<CommandResponse>) {
    let reply = commands::execute(&state.monitor, Command::Disable);
    respond(&state, reply)
}

/// Read thresholds, or update them from query parameters
pub async fn get_threshold(
    State(state): State<AppState>,
    Query(update): Query<ThresholdUpdate>,
) -> (StatusCode, Json<CommandResponse>) {
    let reply = commands::execute(&state.monitor, Command::Threshold(update));
    respond(&state, reply)
}

/// Update thresholds from a JSON body
pub async fn set_threshold(
    State(state): State<AppState>,
    Json(update): Json<ThresholdUpdate>,
) -> (StatusCode, Json<CommandResponse>) {
    let reply = commands::execute(&state.monitor, Command::Threshold(update));
    respond(&state, reply)
}
