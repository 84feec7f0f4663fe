//! HTTP front-end over the insight pipeline.
//!
//! | Route | Success | Failure |
//! |-------|---------|---------|
//! | `GET /get_news?company=X` | report JSON | 400 blank company, 404 no results |
//! | `GET /get_tts_audio?filename=X` | `audio/mpeg` attachment | 404 unknown file |
//! | `GET /health` | `ok` | |
//!
//! Errors are always `{"error": "<message>"}`. Each news request awaits a
//! full pipeline run.

use crate::audio::AudioStore;
use crate::pipeline::InsightPipeline;
use axum::{
    Json, Router,
    extract::{Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Deserialize;
use serde_json::json;
use std::io;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::{info, instrument, warn};

#[derive(Clone)]
pub struct AppState {
    pipeline: Arc<InsightPipeline>,
    audio: AudioStore,
}

impl AppState {
    pub fn new(pipeline: InsightPipeline, audio: AudioStore) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            audio,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/get_news", get(get_news))
        .route("/get_tts_audio", get(get_tts_audio))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/// Bind `addr` and serve until Ctrl-C.
pub async fn serve(state: AppState, addr: &str) -> io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "Listening");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
        })
        .await
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

#[derive(Deserialize)]
struct NewsQuery {
    company: Option<String>,
}

#[instrument(level = "info", skip_all, fields(company = ?q.company))]
async fn get_news(State(state): State<AppState>, Query(q): Query<NewsQuery>) -> Response {
    let company = q.company.as_deref().map(str::trim).unwrap_or_default();
    if company.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "Company name is required");
    }
    match state.pipeline.run(company).await {
        Ok(report) => Json(report).into_response(),
        Err(e) => {
            warn!(reason = %e, "No results");
            error_response(StatusCode::NOT_FOUND, &e.to_string())
        }
    }
}

#[derive(Deserialize)]
struct AudioQuery {
    filename: Option<String>,
}

#[instrument(level = "info", skip_all, fields(filename = ?q.filename))]
async fn get_tts_audio(State(state): State<AppState>, Query(q): Query<AudioQuery>) -> Response {
    let Some(filename) = q.filename else {
        return error_response(StatusCode::NOT_FOUND, "Audio file not found");
    };
    match state.audio.open(&filename).await {
        Ok(bytes) => (
            [
                (header::CONTENT_TYPE, "audio/mpeg".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{filename}\""),
                ),
            ],
            bytes,
        )
            .into_response(),
        Err(e) => {
            warn!(error = %e, "Audio lookup failed");
            error_response(StatusCode::NOT_FOUND, "Audio file not found")
        }
    }
}
