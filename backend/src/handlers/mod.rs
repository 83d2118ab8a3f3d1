use axum::{extract::State, http::StatusCode, response::Json};
use chrono::{Datelike, Duration, Months, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::json;
use std::str::FromStr;
use std::sync::Arc;

use lexdesk_shared::{
    AnalyticsReport, CalendarEvent, CaseStage, Period, Task, TaskStatus, UnknownVariant, UserRole,
};

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::services::analytics::{build_report, day_bounds, round_money};
use crate::store::{CaseFilter, EventFilter, LegalStore, PaymentFilter, TaskFilter};
use crate::AppState;

pub mod analytics;
pub mod calendar;
pub mod cases;
pub mod jobs;
pub mod tasks;

pub use analytics::analytics_routes;
pub use calendar::calendar_routes;
pub use cases::case_routes;
pub use jobs::job_routes;
pub use tasks::task_routes;

const UPCOMING_DEADLINE_DAYS: i64 = 7;
const UPCOMING_DEADLINE_LIMIT: i64 = 10;
const UPCOMING_MEETING_DAYS: i64 = 3;

/// Parse an optional machine value from a query or body field; an
/// unrecognised value is a 400.
pub(crate) fn parse_choice<T>(value: Option<&str>) -> ApiResult<Option<T>>
where
    T: FromStr<Err = UnknownVariant>,
{
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|e| ApiError::bad_request(e.to_string())),
    }
}

pub async fn health_check(State(state): State<Arc<AppState>>) -> (StatusCode, Json<serde_json::Value>) {
    match state.store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({"status": "healthy", "service": "lexdesk-api"})),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({"status": "unhealthy", "service": "lexdesk-api"})),
            )
        }
    }
}

// ==================== Dashboard ====================

#[derive(Debug, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum Dashboard {
    Staff(StaffDashboard),
    Lawyer(LawyerDashboard),
    Client(ClientDashboard),
}

#[derive(Debug, Serialize)]
pub struct StaffDashboard {
    pub total_cases: i64,
    /// Active cases that have not reached a decision yet
    pub active_cases: i64,
    pub total_clients: i64,
    pub monthly_revenue: Decimal,
    pub upcoming_deadlines: Vec<Task>,
    pub today_events: Vec<CalendarEvent>,
    pub analytics: AnalyticsReport,
}

#[derive(Debug, Serialize)]
pub struct LawyerDashboard {
    pub my_cases: i64,
    pub my_tasks: i64,
    pub upcoming_meetings: Vec<CalendarEvent>,
}

#[derive(Debug, Serialize)]
pub struct ClientDashboard {
    pub my_cases: i64,
}

fn month_range(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let start = today.with_day(1).unwrap_or(today);
    let end = start
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(today);
    (start, end)
}

async fn staff_dashboard(store: &dyn LegalStore) -> ApiResult<StaffDashboard> {
    let now = Utc::now();
    let today = now.date_naive();

    let total_cases = store
        .count_cases(&CaseFilter {
            is_active: Some(true),
            ..Default::default()
        })
        .await?;

    let mut active_cases = 0;
    for stage in CaseStage::IN_PROGRESS {
        active_cases += store
            .count_cases(&CaseFilter {
                is_active: Some(true),
                stage: Some(*stage),
                ..Default::default()
            })
            .await?;
    }

    let (month_start, month_end) = month_range(today);
    let monthly_revenue = round_money(
        store
            .sum_payments(&PaymentFilter::paid_between(month_start, month_end))
            .await?,
    );

    let (deadline_from, deadline_to) = day_bounds(today, today + Duration::days(UPCOMING_DEADLINE_DAYS))?;
    let upcoming_deadlines = store
        .list_tasks(&TaskFilter {
            statuses: TaskStatus::OPEN.to_vec(),
            due_from: Some(deadline_from),
            due_to: Some(deadline_to),
            limit: Some(UPCOMING_DEADLINE_LIMIT),
            ..Default::default()
        })
        .await?;

    let (day_start, day_end) = day_bounds(today, today)?;
    let today_events = store
        .list_events(&EventFilter {
            start_from: Some(day_start),
            start_to: Some(day_end),
            ..Default::default()
        })
        .await?;

    Ok(StaffDashboard {
        total_cases,
        active_cases,
        total_clients: store.count_clients(None, None).await?,
        monthly_revenue,
        upcoming_deadlines,
        today_events,
        analytics: build_report(store, Period::Month, None, None, now).await?,
    })
}

async fn lawyer_dashboard(store: &dyn LegalStore, auth: &AuthUser) -> ApiResult<LawyerDashboard> {
    let today = Utc::now().date_naive();

    let my_cases = store
        .count_cases(&CaseFilter {
            lawyer_id: Some(auth.id()),
            is_active: Some(true),
            ..Default::default()
        })
        .await?;

    let my_tasks = store
        .list_tasks(&TaskFilter {
            assigned_to: Some(auth.id()),
            statuses: TaskStatus::OPEN.to_vec(),
            ..Default::default()
        })
        .await?
        .len() as i64;

    let (from, to) = day_bounds(today, today + Duration::days(UPCOMING_MEETING_DAYS))?;
    let upcoming_meetings = store
        .list_events(&EventFilter {
            participant: Some(auth.id()),
            start_from: Some(from),
            start_to: Some(to),
            ..Default::default()
        })
        .await?;

    Ok(LawyerDashboard {
        my_cases,
        my_tasks,
        upcoming_meetings,
    })
}

async fn client_dashboard(store: &dyn LegalStore, auth: &AuthUser) -> ApiResult<ClientDashboard> {
    let my_cases = match store.client_for_user(auth.id()).await? {
        Some(client) => {
            store
                .count_cases(&CaseFilter {
                    client_id: Some(client.id),
                    is_active: Some(true),
                    ..Default::default()
                })
                .await?
        }
        None => 0,
    };
    Ok(ClientDashboard { my_cases })
}

pub async fn dashboard_stats(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> ApiResult<Json<Dashboard>> {
    let store = state.store.as_ref();
    let dashboard = match auth.role() {
        UserRole::Admin | UserRole::Manager => Dashboard::Staff(staff_dashboard(store).await?),
        UserRole::Lawyer => Dashboard::Lawyer(lawyer_dashboard(store, &auth).await?),
        UserRole::Client => Dashboard::Client(client_dashboard(store, &auth).await?),
    };
    Ok(Json(dashboard))
}
