//! Per-user notification inbox

use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::{delete, get, put},
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use lexdesk_shared::Notification;

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

const DEFAULT_LIMIT: i64 = 50;
const MAX_LIMIT: i64 = 100;

pub fn notification_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_notifications))
        .route("/:id/read", put(mark_as_read))
        .route("/read-all", put(mark_all_as_read))
        .route("/:id", delete(delete_notification))
        .route("/unread-count", get(get_unread_count))
}

#[derive(Debug, Deserialize)]
pub struct ListNotificationsQuery {
    #[serde(default)]
    pub unread_only: bool,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct NotificationResponse {
    #[serde(flatten)]
    pub notification: Notification,
    pub relative_time: String,
}

#[derive(Debug, Serialize)]
pub struct UnreadCountResponse {
    pub unread_count: i64,
}

async fn list_notifications(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Query(query): Query<ListNotificationsQuery>,
) -> ApiResult<Json<Vec<NotificationResponse>>> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let offset = (page - 1).saturating_mul(limit);

    let notifications = state
        .store
        .list_notifications(auth.id(), query.unread_only, limit, offset)
        .await?;

    let now = Utc::now();
    let responses = notifications
        .into_iter()
        .map(|notification| NotificationResponse {
            relative_time: format_relative_time(notification.created_at, now),
            notification,
        })
        .collect();

    Ok(Json(responses))
}

async fn mark_as_read(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    let updated = state
        .store
        .mark_notification_read(id, auth.id(), Utc::now())
        .await?;

    if !updated {
        return Err(ApiError::not_found("Notification"));
    }

    Ok(Json(json!({ "message": "Notification marked as read" })))
}

async fn mark_all_as_read(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> ApiResult<Json<serde_json::Value>> {
    let updated = state
        .store
        .mark_all_notifications_read(auth.id(), Utc::now())
        .await?;

    Ok(Json(json!({
        "message": "All notifications marked as read",
        "updated_count": updated
    })))
}

async fn delete_notification(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    if !state.store.delete_notification(id, auth.id()).await? {
        return Err(ApiError::not_found("Notification"));
    }

    Ok(Json(json!({ "message": "Notification deleted" })))
}

async fn get_unread_count(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> ApiResult<Json<UnreadCountResponse>> {
    let unread_count = state.store.count_notifications(auth.id(), true).await?;
    Ok(Json(UnreadCountResponse { unread_count }))
}

fn format_relative_time(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let duration = now.signed_duration_since(timestamp);

    if duration.num_minutes() < 1 {
        "just now".to_string()
    } else if duration.num_minutes() < 60 {
        format!("{} minutes ago", duration.num_minutes())
    } else if duration.num_hours() < 24 {
        format!("{} hours ago", duration.num_hours())
    } else if duration.num_days() < 30 {
        format!("{} days ago", duration.num_days())
    } else {
        format!("{} months ago", duration.num_days() / 30)
    }
}
