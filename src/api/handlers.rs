use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use crate::api::state::AppState;
use crate::api::types::{
    FetchResponse, HealthResponse, LatestResponse, PredictRequest, PredictResponse,
    ResetResponse, ScoredPlay, ServiceInfo, StreamStatusResponse,
};
use crate::domain::{PlayEvent, SituationSnapshot};
use crate::engine;
use crate::error::GridironError;
use crate::stream::FetchResult;

pub async fn service_info() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        message: "gridiron real-time NFL analytics API",
        version: env!("CARGO_PKG_VERSION"),
        prediction_method: "rule-based",
    })
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let cursor = state.cursor.status().await;
    let uptime = (Utc::now() - state.started_at).num_seconds().max(0) as u64;

    Json(HealthResponse {
        status: "healthy",
        timestamp: Utc::now(),
        uptime_seconds: uptime,
        stream: state.stream_name.clone(),
        cursor_phase: cursor.phase.to_string(),
    })
}

pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; charset=utf-8",
        )],
        state.metrics.prometheus(),
    )
}

pub async fn predict(Json(request): Json<PredictRequest>) -> Json<PredictResponse> {
    let snapshot = request.snapshot(Utc::now());
    let predictions = engine::predict(&snapshot);
    Json(PredictResponse {
        input: request,
        predictions,
    })
}

#[derive(Debug, Deserialize)]
pub struct FetchParams {
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    10
}

pub async fn fetch_stream(
    State(state): State<AppState>,
    Query(params): Query<FetchParams>,
) -> axum::response::Response {
    match state.cursor.fetch(params.limit).await {
        Ok(result) => {
            let has_new_data = result.has_new_data;
            let plays = score_records(&state, result);
            Json(FetchResponse {
                status: "success",
                play_count: plays.len(),
                plays,
                has_new_data,
            })
            .into_response()
        }
        Err(e) => fetch_error(e),
    }
}

pub async fn latest_play(State(state): State<AppState>) -> axum::response::Response {
    match state.cursor.fetch(10).await {
        Ok(result) => {
            let mut plays = score_records(&state, result);
            match plays.pop() {
                Some(play) => Json(LatestResponse {
                    status: "success",
                    play: Some(play),
                })
                .into_response(),
                None => Json(LatestResponse {
                    status: "no_data",
                    play: None,
                })
                .into_response(),
            }
        }
        Err(e) => fetch_error(e),
    }
}

pub async fn reset_stream(State(state): State<AppState>) -> Json<ResetResponse> {
    state.cursor.reset().await;
    Json(ResetResponse {
        status: "reset",
        message: "Will fetch from latest on next call",
    })
}

pub async fn stream_status(State(state): State<AppState>) -> Json<StreamStatusResponse> {
    Json(StreamStatusResponse {
        stream: state.stream_name.clone(),
        cursor: state.cursor.status().await,
    })
}

/// Parse and score each fetched record; unparseable records are skipped and
/// counted, never fatal.
fn score_records(state: &AppState, result: FetchResult) -> Vec<ScoredPlay> {
    let mut plays = Vec::with_capacity(result.records.len());

    for record in result.records {
        match serde_json::from_value::<PlayEvent>(record.data) {
            Ok(event) => {
                let snapshot = SituationSnapshot::from(&event);
                let predictions = engine::predict(&snapshot);
                plays.push(ScoredPlay { event, predictions });
                state.metrics.inc_records_served();
            }
            Err(e) => {
                warn!(sequence = %record.sequence, error = %e, "skipping unparseable record");
                state.metrics.inc_record_parse_failures();
            }
        }
    }

    plays
}

fn fetch_error(error: GridironError) -> axum::response::Response {
    let status = match &error {
        GridironError::StreamUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    warn!(error = %error, "stream fetch failed");

    (
        status,
        Json(json!({
            "status": "error",
            "error": error.to_string(),
            "plays": [],
        })),
    )
        .into_response()
}
