use crate::config;
use crate::logging::*;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::sync::RwLock;

const DEFAULT_LIMIT: usize = 50;
const MAX_LIMIT: usize = 200;

pub fn get_port() -> Option<u16> {
    let value = config::get("RECORDER_PORT").ok()?;
    match value.parse() {
        Ok(port) => Some(port),
        Err(err) => {
            let log = DEFAULT.new(o!("function" => "recorder::get_port"));
            warn!(log, "ignoring invalid RECORDER_PORT"; "value" => value, "error" => %err);
            None
        }
    }
}

#[derive(Default)]
struct AppState {
    responses: RwLock<Vec<SavedResponse>>,
}

#[derive(Debug, Clone, Serialize)]
struct SavedResponse {
    id: u64,
    message: String,
    date: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct SaveRequest {
    response: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    limit: Option<usize>,
    skip: Option<usize>,
    order: Option<String>,
}

pub async fn run(port: u16) {
    let log = DEFAULT.new(o!("function" => "recorder::run"));
    let app = router(Arc::new(AppState::default()));
    let listener = match tokio::net::TcpListener::bind(("0.0.0.0", port)).await {
        Ok(listener) => listener,
        Err(err) => {
            error!(log, "bind failed"; "port" => port, "error" => %err);
            return;
        }
    };
    info!(log, "listening"; "port" => port);
    if let Err(err) = axum::serve(listener, app).await {
        error!(log, "server terminated"; "error" => %err);
    }
}

fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthcheck", get(|| async { "OK" }))
        .route("/save-response", post(save_response))
        .route("/responses", get(list_responses))
        .with_state(state)
}

async fn save_response(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SaveRequest>,
) -> (StatusCode, Json<Value>) {
    let message = match request.response {
        Some(text) if !text.is_empty() => text,
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"message": "Invalid payload: expected { response: string }"})),
            );
        }
    };

    let mut responses = state.responses.write().await;
    let id = responses.len() as u64 + 1;
    responses.push(SavedResponse {
        id,
        message,
        date: Utc::now(),
    });
    (
        StatusCode::OK,
        Json(json!({"message": "Response saved successfully", "id": id})),
    )
}

async fn list_responses(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Json<Value> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let skip = query.skip.unwrap_or(0);
    let ascending = query
        .order
        .as_deref()
        .is_some_and(|order| order.eq_ignore_ascii_case("asc"));

    let responses = state.responses.read().await;
    let ordered: Box<dyn Iterator<Item = &SavedResponse>> = if ascending {
        Box::new(responses.iter())
    } else {
        Box::new(responses.iter().rev())
    };
    let items: Vec<SavedResponse> = ordered.skip(skip).take(limit).cloned().collect();
    Json(json!({"count": items.len(), "items": items}))
}
