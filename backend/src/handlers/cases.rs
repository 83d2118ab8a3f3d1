//! Case endpoints: listing, the full case report, and the write paths that
//! hang off a case (communications, payments, time entries).

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use lexdesk_shared::{
    CalendarEvent, Case, CaseReport, CaseStage, Communication, CommunicationType, Payment,
    PaymentType, TimeEntry, UserRole,
};

use super::parse_choice;
use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult, ValidationBuilder};
use crate::services::{calendar, case_report};
use crate::store::{CaseFilter, NewCommunication, NewPayment, NewTimeEntry};
use crate::{AppState, PaginatedResponse, PaginationParams};

pub fn case_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_cases))
        .route("/:id/report", get(get_case_report))
        .route("/:id/communications", post(create_communication))
        .route("/:id/payments", post(create_payment))
        .route("/:id/time-entries", post(create_time_entry))
}

// ==================== Access ====================

/// Load a case the caller may see. Clients only see cases of their own
/// client record; staff and lawyers see every case.
async fn load_case(state: &AppState, auth: &AuthUser, case_id: Uuid) -> ApiResult<Case> {
    let case = state
        .store
        .get_case(case_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Case"))?;

    if auth.role() == UserRole::Client {
        let own = state.store.client_for_user(auth.id()).await?;
        if own.is_none_or(|client| client.id != case.client_id) {
            // Do not reveal other clients' cases
            return Err(ApiError::not_found("Case"));
        }
    }

    Ok(case)
}

fn require_firm_member(auth: &AuthUser) -> ApiResult<()> {
    if auth.role() == UserRole::Client {
        return Err(ApiError::forbidden("Clients cannot perform this action"));
    }
    Ok(())
}

// ==================== Listing ====================

#[derive(Debug, Deserialize, Default)]
pub struct CaseListQuery {
    pub stage: Option<String>,
    pub lawyer: Option<Uuid>,
    pub search: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct CaseListItem {
    #[serde(flatten)]
    pub case: Case,
    pub client_name: String,
    pub lawyer_name: String,
    pub case_type_label: String,
    pub stage_label: String,
}

async fn list_cases(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Query(query): Query<CaseListQuery>,
) -> ApiResult<Json<PaginatedResponse<CaseListItem>>> {
    let pagination = PaginationParams::from_query(query.page, query.per_page);

    let mut filter = CaseFilter {
        is_active: Some(true),
        stage: parse_choice::<CaseStage>(query.stage.as_deref())?,
        lawyer_id: query.lawyer,
        search: query.search.filter(|s| !s.trim().is_empty()),
        ..Default::default()
    };

    if auth.role() == UserRole::Client {
        match state.store.client_for_user(auth.id()).await? {
            Some(client) => filter.client_id = Some(client.id),
            None => {
                return Ok(Json(PaginatedResponse::new(Vec::new(), &pagination, 0)));
            }
        }
    }

    let total = state.store.count_cases(&filter).await?;
    let cases = state
        .store
        .list_cases(&filter, pagination.limit(), pagination.offset())
        .await?;

    // Resolve client and lawyer display names in one round of lookups
    let mut client_users: HashMap<Uuid, Uuid> = HashMap::new();
    for client_id in cases.iter().map(|c| c.client_id) {
        if client_users.contains_key(&client_id) {
            continue;
        }
        if let Some(client) = state.store.get_client(client_id).await? {
            client_users.insert(client_id, client.user_id);
        }
    }
    let mut user_ids: Vec<Uuid> = client_users.values().copied().collect();
    user_ids.extend(cases.iter().filter_map(|c| c.lawyer_id));
    user_ids.sort();
    user_ids.dedup();
    let names = state.store.user_names(&user_ids).await?;

    let items = cases
        .into_iter()
        .map(|case| CaseListItem {
            client_name: client_users
                .get(&case.client_id)
                .and_then(|user_id| names.get(user_id).cloned())
                .unwrap_or_default(),
            lawyer_name: case
                .lawyer_id
                .and_then(|id| names.get(&id).cloned())
                .unwrap_or_else(|| state.labels.unassigned()),
            case_type_label: state.labels.case_type(case.case_type),
            stage_label: state.labels.case_stage(case.stage),
            case,
        })
        .collect();

    Ok(Json(PaginatedResponse::new(items, &pagination, total)))
}

// ==================== Report ====================

async fn get_case_report(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(case_id): Path<Uuid>,
) -> ApiResult<Json<CaseReport>> {
    load_case(&state, &auth, case_id).await?;
    let report = case_report::build_case_report(state.store.as_ref(), &state.labels, case_id).await?;
    Ok(Json(report))
}

// ==================== Communications ====================

#[derive(Debug, Deserialize)]
pub struct CommunicationCreate {
    pub communication_type: String,
    pub subject: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub participants: Vec<Uuid>,
    pub scheduled_for: Option<DateTime<Utc>>,
    pub duration_minutes: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct CommunicationCreated {
    pub communication: Communication,
    /// Calendar event derived from a scheduled meeting or call
    pub calendar_event: Option<CalendarEvent>,
}

async fn create_communication(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(case_id): Path<Uuid>,
    Json(input): Json<CommunicationCreate>,
) -> ApiResult<(StatusCode, Json<CommunicationCreated>)> {
    load_case(&state, &auth, case_id).await?;

    let communication_type = parse_choice::<CommunicationType>(Some(&input.communication_type))?
        .ok_or_else(|| ApiError::bad_request("communication_type is required"))?;

    ValidationBuilder::new()
        .check(input.subject.trim().is_empty(), "subject", "Subject is required")
        .check(
            input.duration_minutes.is_some_and(|m| m <= 0),
            "duration_minutes",
            "Duration must be positive",
        )
        .check(
            input.scheduled_for.is_some_and(|at| {
                let minutes = input.duration_minutes.unwrap_or(calendar::DEFAULT_DURATION_MINUTES);
                at.checked_add_signed(Duration::minutes(i64::from(minutes))).is_none()
            }),
            "scheduled_for",
            "Scheduled time is out of range",
        )
        .finish()?;

    let communication = state
        .store
        .create_communication(NewCommunication {
            case_id,
            communication_type,
            subject: input.subject.trim().to_string(),
            content: input.content,
            participants: input.participants,
            scheduled_for: input.scheduled_for,
            duration_minutes: input.duration_minutes,
            created_by: auth.id(),
        })
        .await?;

    info!(
        "User {} logged {} communication {} on case {}",
        auth.id(),
        communication.communication_type,
        communication.id,
        case_id
    );

    let calendar_event = calendar::materialize_event(
        state.store.as_ref(),
        state.sink.as_ref(),
        &state.labels,
        &communication,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(CommunicationCreated {
            communication,
            calendar_event,
        }),
    ))
}

// ==================== Payments ====================

#[derive(Debug, Deserialize)]
pub struct PaymentCreate {
    pub amount: Decimal,
    pub payment_type: String,
    pub payment_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub is_paid: bool,
    pub paid_date: Option<NaiveDate>,
    pub payment_method: Option<String>,
    pub invoice_number: Option<String>,
    pub notes: Option<String>,
}

async fn create_payment(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(case_id): Path<Uuid>,
    Json(input): Json<PaymentCreate>,
) -> ApiResult<(StatusCode, Json<Payment>)> {
    require_firm_member(&auth)?;
    load_case(&state, &auth, case_id).await?;

    let payment_type = parse_choice::<PaymentType>(Some(&input.payment_type))?
        .ok_or_else(|| ApiError::bad_request("payment_type is required"))?;

    ValidationBuilder::new()
        .check(input.amount < Decimal::ZERO, "amount", "Amount must not be negative")
        .check(
            input.paid_date.is_some() && !input.is_paid,
            "paid_date",
            "Paid date can only be set on a paid payment",
        )
        .finish()?;

    let payment = state
        .store
        .create_payment(NewPayment {
            case_id,
            amount: input.amount,
            payment_type,
            payment_date: input.payment_date,
            due_date: input.due_date,
            is_paid: input.is_paid,
            paid_date: input.paid_date,
            payment_method: input.payment_method,
            invoice_number: input.invoice_number,
            notes: input.notes,
        })
        .await?;

    info!("Recorded payment {} of {} on case {}", payment.id, payment.amount, case_id);
    Ok((StatusCode::CREATED, Json(payment)))
}

// ==================== Time entries ====================

#[derive(Debug, Deserialize)]
pub struct TimeEntryCreate {
    /// Staff may log time for another lawyer; defaults to the caller
    pub lawyer_id: Option<Uuid>,
    pub task_id: Option<Uuid>,
    pub description: String,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    /// Hours
    pub duration: Decimal,
    #[serde(default = "default_billable")]
    pub billable: bool,
    #[serde(default)]
    pub billed: bool,
}

fn default_billable() -> bool {
    true
}

async fn create_time_entry(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(case_id): Path<Uuid>,
    Json(input): Json<TimeEntryCreate>,
) -> ApiResult<(StatusCode, Json<TimeEntry>)> {
    require_firm_member(&auth)?;
    load_case(&state, &auth, case_id).await?;

    let lawyer_id = input.lawyer_id.unwrap_or(auth.id());
    auth.require_self_or_staff(lawyer_id)?;

    ValidationBuilder::new()
        .check(input.description.trim().is_empty(), "description", "Description is required")
        .check(input.duration < Decimal::ZERO, "duration", "Duration must not be negative")
        .check(
            input.end_time.is_some_and(|end| end < input.start_time),
            "end_time",
            "End time must not be before start time",
        )
        .check(
            input.billed && !input.billable,
            "billed",
            "Only billable time can be billed",
        )
        .finish()?;

    let entry = state
        .store
        .create_time_entry(NewTimeEntry {
            lawyer_id,
            case_id,
            task_id: input.task_id,
            description: input.description.trim().to_string(),
            start_time: input.start_time,
            end_time: input.end_time,
            duration: input.duration,
            billable: input.billable,
            billed: input.billed,
        })
        .await?;

    info!("Logged {}h on case {} for lawyer {}", entry.duration, case_id, lawyer_id);
    Ok((StatusCode::CREATED, Json(entry)))
}
