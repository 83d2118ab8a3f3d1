use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{post, put},
    Router,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use lexdesk_shared::{Task, TaskPriority, TaskStatus, UserRole};

use super::parse_choice;
use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult, ValidationBuilder};
use crate::store::NewTask;
use crate::AppState;

pub fn task_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(create_task))
        .route("/:id/status", put(update_task_status))
}

#[derive(Debug, Deserialize)]
pub struct TaskCreate {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub case_id: Option<Uuid>,
    pub assigned_to: Uuid,
    pub priority: Option<String>,
    pub due_date: DateTime<Utc>,
    pub estimated_hours: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
pub struct TaskStatusUpdate {
    pub status: String,
}

async fn create_task(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(input): Json<TaskCreate>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    if auth.role() == UserRole::Client {
        return Err(ApiError::forbidden("Clients cannot create tasks"));
    }

    let priority = parse_choice::<TaskPriority>(input.priority.as_deref())?
        .unwrap_or(TaskPriority::Medium);
    let estimated_hours = input.estimated_hours.unwrap_or(Decimal::ZERO);

    ValidationBuilder::new()
        .check(input.title.trim().is_empty(), "title", "Title is required")
        .check(
            estimated_hours < Decimal::ZERO,
            "estimated_hours",
            "Estimated hours must not be negative",
        )
        .finish()?;

    state
        .store
        .get_user(input.assigned_to)
        .await?
        .filter(|user| user.is_active)
        .ok_or_else(|| ApiError::bad_request("Assignee does not exist or is inactive"))?;

    if let Some(case_id) = input.case_id {
        state
            .store
            .get_case(case_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Case"))?;
    }

    let task = state
        .store
        .create_task(NewTask {
            title: input.title.trim().to_string(),
            description: input.description,
            case_id: input.case_id,
            assigned_to: input.assigned_to,
            assigned_by: Some(auth.id()),
            priority,
            due_date: input.due_date,
            estimated_hours,
        })
        .await?;

    info!("Task {} assigned to {} by {}", task.id, task.assigned_to, auth.id());
    Ok((StatusCode::CREATED, Json(task)))
}

/// `done` stamps `completed_at`; any other status clears it.
pub fn completion_time(status: TaskStatus, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    (status == TaskStatus::Done).then_some(now)
}

async fn update_task_status(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(task_id): Path<Uuid>,
    Json(input): Json<TaskStatusUpdate>,
) -> ApiResult<Json<Task>> {
    if auth.role() == UserRole::Client {
        return Err(ApiError::forbidden("Clients cannot update tasks"));
    }

    let status = parse_choice::<TaskStatus>(Some(&input.status))?
        .ok_or_else(|| ApiError::bad_request("status is required"))?;

    let task = state
        .store
        .update_task_status(task_id, status, completion_time(status, Utc::now()))
        .await?
        .ok_or_else(|| ApiError::not_found("Task"))?;

    info!("Task {} moved to {} by {}", task.id, task.status, auth.id());
    Ok(Json(task))
}
