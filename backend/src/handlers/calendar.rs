//! Calendar endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use lexdesk_shared::{CalendarEvent, EventType, UserRole};

use crate::auth::AuthUser;
use crate::error::{ApiResult, ValidationBuilder};
use crate::services::calendar::{sync_external_calendar, SyncStatus};
use crate::store::EventFilter;
use crate::AppState;

pub fn calendar_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/events", get(list_events))
        .route("/my", get(my_events))
        .route("/sync/:provider", post(sync_calendar))
}

#[derive(Debug, Deserialize)]
pub struct EventRangeQuery {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct EventSummary {
    pub id: Uuid,
    pub title: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub color: String,
    pub event_type: EventType,
}

impl From<CalendarEvent> for EventSummary {
    fn from(event: CalendarEvent) -> Self {
        Self {
            id: event.id,
            title: event.title,
            start_time: event.start_time,
            end_time: event.end_time,
            color: event.color,
            event_type: event.event_type,
        }
    }
}

/// Calendar-widget representation of an event.
#[derive(Debug, Serialize)]
pub struct WidgetEvent {
    pub id: Uuid,
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub color: String,
    pub description: String,
    #[serde(rename = "type")]
    pub event_type: EventType,
    /// Title of the linked case
    pub case: Option<String>,
}

/// Events starting at or after `start` and ending at or before `end`.
/// Clients only see events they take part in.
async fn list_events(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Query(range): Query<EventRangeQuery>,
) -> ApiResult<Json<Vec<EventSummary>>> {
    ValidationBuilder::new()
        .check(range.start > range.end, "start", "start must not be after end")
        .finish()?;

    let involving = (auth.role() == UserRole::Client).then(|| auth.id());
    let events = state
        .store
        .list_events(&EventFilter {
            start_from: Some(range.start),
            end_to: Some(range.end),
            involving,
            ..Default::default()
        })
        .await?;

    Ok(Json(events.into_iter().map(EventSummary::from).collect()))
}

/// Events the caller participates in or created, in start order.
async fn my_events(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<WidgetEvent>>> {
    let events = state
        .store
        .list_events(&EventFilter {
            involving: Some(auth.id()),
            ..Default::default()
        })
        .await?;

    let mut case_titles: HashMap<Uuid, String> = HashMap::new();
    for case_id in events.iter().filter_map(|e| e.case_id) {
        if case_titles.contains_key(&case_id) {
            continue;
        }
        if let Some(case) = state.store.get_case(case_id).await? {
            case_titles.insert(case_id, case.title);
        }
    }

    let widget = events
        .into_iter()
        .map(|event| WidgetEvent {
            case: event.case_id.and_then(|id| case_titles.get(&id).cloned()),
            id: event.id,
            title: event.title,
            start: event.start_time,
            end: event.end_time,
            color: event.color,
            description: event.description,
            event_type: event.event_type,
        })
        .collect();

    Ok(Json(widget))
}

async fn sync_calendar(
    auth: AuthUser,
    Path(provider): Path<String>,
) -> (StatusCode, Json<SyncStatus>) {
    info!("User {} requested calendar sync with {}", auth.id(), provider);
    (StatusCode::NOT_IMPLEMENTED, Json(sync_external_calendar(&provider)))
}
