use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use rust_client::domain::Reading;
use serde::Serialize;
use serde_json::{json, Value};

use crate::{
    config::{DataConfig, SourceFailurePolicy},
    lookup::{self, LookupError, LookupRequest},
    sources::{HouseFileSource, ReadingSource},
};

#[derive(Clone)]
pub struct AppState {
    sources: Arc<[Arc<dyn ReadingSource>]>,
    policy: SourceFailurePolicy,
}

impl AppState {
    pub fn new(sources: Vec<Arc<dyn ReadingSource>>, policy: SourceFailurePolicy) -> Self {
        Self {
            sources: sources.into(),
            policy,
        }
    }

    /// One `HouseFileSource` per configured house, in search order.
    pub fn from_config(data: &DataConfig) -> Self {
        let sources = data
            .house_paths()
            .into_iter()
            .map(|(name, path)| Arc::new(HouseFileSource::new(name, path)) as Arc<dyn ReadingSource>)
            .collect();
        Self::new(sources, data.on_source_error)
    }

    pub fn sources(&self) -> &[Arc<dyn ReadingSource>] {
        &self.sources
    }

    pub fn policy(&self) -> SourceFailurePolicy {
        self.policy
    }
}

#[derive(Debug, Serialize)]
struct ReadingResponse {
    reading: Reading,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for LookupError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            LookupError::MissingFields => (StatusCode::BAD_REQUEST, self.to_string()),
            LookupError::NotFound => (StatusCode::NOT_FOUND, self.to_string()),
            LookupError::Source { source_name, error } => {
                tracing::error!(source = %source_name, error = %error, "failed to fetch meter readings");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to fetch meter readings".to_string(),
                )
            }
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/meters", post(lookup_meter_reading))
        .route("/health", get(health))
        .with_state(state)
}

pub async fn serve(bind_addr: &str, state: AppState) -> anyhow::Result<()> {
    let addr: SocketAddr = bind_addr
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid server.bind_addr: {e}"))?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(state).into_make_service()).await?;
    Ok(())
}

async fn lookup_meter_reading(
    State(state): State<AppState>,
    payload: Result<Json<LookupRequest>, JsonRejection>,
) -> Result<Json<ReadingResponse>, LookupError> {
    metrics::counter!("meter_lookup_requests_total").increment(1);

    // An unreadable body is treated like one with no fields at all.
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "lookup body rejected");
            LookupRequest::default()
        }
    };

    let reading = lookup::find_reading(&request, state.sources(), state.policy()).await?;

    Ok(Json(ReadingResponse { reading }))
}

async fn health() -> Json<Value> {
    Json(json!({
        "ok": true,
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
