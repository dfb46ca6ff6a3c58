//! HTTP route handlers.

use axum::body::Bytes;
use axum::{
    Json, Router,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::engine::EngineError;
use crate::output::{OutputError, build_rows, read_summary, summarize_rows};
use crate::planner::{PlanError, TripPlanner};

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(welcome))
        .route("/health", get(health))
        .route("/process", post(process))
        .route("/summaries/:id", get(summary_csv))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn welcome() -> Json<WelcomeResponse> {
    Json(WelcomeResponse {
        message: "Welcome to the Trip Planner API".to_string(),
    })
}

/// Health check endpoint.
///
/// Reports the engine state without triggering initialisation.
async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        engine: state.engine.state().label().to_string(),
        stops: state.feed.stops().len(),
        parking_locations: state.parking.len(),
    })
}

/// Plan a trip with every mode combination.
async fn process(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ProcessResponse>, AppError> {
    // Parse JSON manually so we can log the body on failure
    let req: PlanTripRequest = serde_json::from_slice(&body).map_err(|e| {
        warn!(error = %e, body = %String::from_utf8_lossy(&body), "invalid request body");
        AppError::BadRequest {
            message: format!("Invalid JSON: {e}"),
        }
    })?;

    let config = req.planner_config(&state.config)?;
    let trip = req.trip_request(config.default_departure)?;

    let engine = state.engine().await?;
    let planner = TripPlanner::new(engine.as_ref(), &state.feed, &state.parking, &config);
    let plan = planner.plan(&trip).await?;

    let rows = build_rows(&plan);
    let dir = state.output_dir.clone();
    let summary = blocking(move || summarize_rows(rows, &dir)).await??;
    info!(
        summary = %summary.id,
        modes = plan.itineraries.len(),
        rows = summary.rows.len(),
        issues = summary.report.issues_detected,
        "trip planned"
    );

    Ok(Json(ProcessResponse::new(&summary, &plan.failures)))
}

/// Download a persisted trip summary.
async fn summary_csv(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let dir = state.output_dir.clone();
    let lookup = id.clone();
    let text = blocking(move || read_summary(&dir, &lookup))
        .await??
        .ok_or_else(|| AppError::NotFound {
            message: format!("No trip summary {id}"),
        })?;

    Ok(([(header::CONTENT_TYPE, "text/csv; charset=utf-8")], text).into_response())
}

/// Run file I/O off the async workers.
async fn blocking<T, F>(task: F) -> Result<T, AppError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| AppError::Internal {
            message: format!("Background task failed: {e}"),
        })
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    Unavailable { message: String },
    Unprocessable { message: String },
    Internal { message: String },
}

impl From<EngineError> for AppError {
    fn from(e: EngineError) -> Self {
        AppError::Unavailable {
            message: e.to_string(),
        }
    }
}

impl From<OutputError> for AppError {
    fn from(e: OutputError) -> Self {
        AppError::Internal {
            message: e.to_string(),
        }
    }
}

impl From<PlanError> for AppError {
    fn from(e: PlanError) -> Self {
        let message = e.to_string();
        match e {
            _ if e.is_input_error() => AppError::BadRequest { message },
            PlanError::EngineUnavailable(_) => AppError::Unavailable { message },
            PlanError::ScheduleDataMissing(_) | PlanError::InvalidFeedLayout(_) => {
                AppError::Internal { message }
            }
            _ => AppError::Unprocessable { message },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
            AppError::Unavailable { message } => (StatusCode::SERVICE_UNAVAILABLE, message),
            AppError::Unprocessable { message } => (StatusCode::UNPROCESSABLE_ENTITY, message),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        if status.is_server_error() {
            error!(%status, %message, "request failed");
        } else {
            warn!(%status, %message, "request rejected");
        }

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
