use std::net::SocketAddr;

use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::domain::{SampleName, SortedOtuValues};
use crate::error::ApiError;
use crate::query::QueryService;

const INDEX_HTML: &str = include_str!("../static/index.html");
const INDEX_JS: &str = include_str!("../static/index.js");

#[derive(Clone)]
pub struct AppState {
    query: QueryService,
}

impl AppState {
    pub fn new(query: QueryService) -> Self {
        Self { query }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/static/index.js", get(script_handler))
        .route("/names", get(names_handler))
        .route("/otu", get(otu_handler))
        .route("/metadata/{sample}", get(metadata_handler))
        .route("/wfreq/{sample}", get(wfreq_handler))
        .route("/samples/{sample}", get(samples_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Binds `addr` and serves until Ctrl-C.
pub async fn serve(state: AppState, addr: SocketAddr) -> Result<(), ApiError> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|err| ApiError::Serve(format!("bind {addr}: {err}")))?;
    let local = listener
        .local_addr()
        .map_err(|err| ApiError::Serve(err.to_string()))?;
    info!(addr = %local, "listening");
    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| ApiError::Serve(err.to_string()))
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "failed to listen for shutdown signal");
        return;
    }
    info!("shutting down");
}

async fn index_handler() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn script_handler() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/javascript; charset=utf-8")],
        INDEX_JS,
    )
}

async fn names_handler(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.query.list_sample_names())
}

async fn otu_handler(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.query.list_otu_descriptions())
}

async fn metadata_handler(
    State(state): State<AppState>,
    Path(sample): Path<String>,
) -> Response {
    match state.query.get_sample_metadata(&SampleName::new(sample)) {
        Some(metadata) => Json(metadata).into_response(),
        None => Json(serde_json::json!({})).into_response(),
    }
}

async fn wfreq_handler(State(state): State<AppState>, Path(sample): Path<String>) -> Response {
    match state.query.get_wash_frequency(&SampleName::new(sample)) {
        Ok(wfreq) => Json(wfreq).into_response(),
        Err(err) => error_response(err, StatusCode::NOT_FOUND),
    }
}

async fn samples_handler(State(state): State<AppState>, Path(sample): Path<String>) -> Response {
    match state.query.get_sorted_otu_values(&SampleName::new(sample)) {
        Ok(sorted) => Json::<[SortedOtuValues; 1]>([sorted]).into_response(),
        Err(err) => error_response(err, StatusCode::BAD_REQUEST),
    }
}

/// Error bodies are bare JSON strings, e.g. `"BB_999 not found!!!"`.
fn error_response(err: ApiError, not_found: StatusCode) -> Response {
    let status = match err {
        ApiError::SampleNotFound(_) => not_found,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(err.to_string())).into_response()
}
