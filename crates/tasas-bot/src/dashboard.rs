//! Read-only JSON dashboard.

use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;

use crate::app::App;
use crate::error::BotError;

const DEFAULT_HISTORY_DAYS: usize = 7;

pub fn create_router(app: Arc<App>) -> Router {
    Router::new()
        .route("/api/status", get(status))
        .route("/api/history", get(history))
        .route("/api/logs", get(logs))
        .route("/api/health", get(health))
        .with_state(app)
}

/// Serve the dashboard until cancelled.
pub async fn serve(bind: &str, app: Arc<App>, cancel: CancellationToken) -> Result<(), BotError> {
    let listener = tokio::net::TcpListener::bind(bind).await?;
    tracing::info!(addr = %listener.local_addr()?, "Dashboard listening");

    axum::serve(listener, create_router(app))
        .with_graceful_shutdown(async move { cancel.cancelled().await })
        .await?;

    tracing::info!("Dashboard stopped");
    Ok(())
}

fn timestamp(app: &App) -> String {
    Utc::now()
        .with_timezone(&app.service.timezone())
        .to_rfc3339()
}

fn success<T: Serialize>(app: &App, data: T) -> Json<Value> {
    Json(json!({
        "success": true,
        "data": data,
        "timestamp": timestamp(app),
    }))
}

/// A failed request, answered with 500 and the error envelope.
struct ApiError {
    message: String,
    timestamp: String,
}

impl ApiError {
    fn new(app: &App, error: impl std::fmt::Display) -> Self {
        Self {
            message: error.to_string(),
            timestamp: timestamp(app),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self.message, "Dashboard request failed");
        let body = Json(json!({
            "success": false,
            "error": self.message,
            "timestamp": self.timestamp,
        }));
        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}

async fn status(State(app): State<Arc<App>>) -> Json<Value> {
    success(&app, app.status())
}

#[derive(Debug, Deserialize)]
struct HistoryQuery {
    days: Option<usize>,
}

async fn history(
    State(app): State<Arc<App>>,
    query: Result<Query<HistoryQuery>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::new(&app, e.body_text()))?;
    let days = query.days.unwrap_or(DEFAULT_HISTORY_DAYS);
    Ok(success(&app, app.service.store().history(days)))
}

async fn logs(State(app): State<Arc<App>>) -> Result<Json<Value>, ApiError> {
    let lines = app.recent_logs().map_err(|e| ApiError::new(&app, e))?;
    Ok(success(&app, lines))
}

async fn health(State(app): State<Arc<App>>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": timestamp(&app),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
