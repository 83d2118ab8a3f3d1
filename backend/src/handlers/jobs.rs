use axum::{
    extract::{Path, State},
    response::Json,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::jobs::{JobExecutionLog, JobKind};
use crate::AppState;

pub fn job_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/logs", get(get_logs))
        .route("/:name/run", post(run_job))
}

async fn get_logs(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<JobExecutionLog>>> {
    auth.require_staff()?;
    Ok(Json(state.jobs.get_execution_logs().await))
}

/// Run a job immediately. A failed run is reported through the returned
/// log entry rather than as an HTTP error.
async fn run_job(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(name): Path<String>,
) -> ApiResult<Json<JobExecutionLog>> {
    auth.require_admin()?;

    let kind: JobKind = name
        .parse()
        .map_err(|_| ApiError::not_found(format!("Job '{}'", name)))?;

    Ok(Json(state.jobs.run(kind).await))
}
