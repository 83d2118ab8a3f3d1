//! Analytics endpoints: firm-wide report, lawyer bonus, stored snapshots.

use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::get,
    Router,
};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use lexdesk_shared::{AnalyticsReport, AnalyticsSnapshot, BonusResult, Period};

use super::parse_choice;
use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::services::{analytics, bonus};
use crate::AppState;

const DEFAULT_SNAPSHOT_LIMIT: i64 = 30;
const MAX_SNAPSHOT_LIMIT: i64 = 366;

pub fn analytics_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(get_report))
        .route("/bonus/:lawyer_id", get(get_bonus))
        .route("/snapshots", get(list_snapshots))
}

#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    pub period: Option<String>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct BonusQuery {
    pub period_start: Option<NaiveDate>,
    pub period_end: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct SnapshotQuery {
    pub period: Option<String>,
    pub limit: Option<i64>,
}

async fn get_report(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Query(query): Query<ReportQuery>,
) -> ApiResult<Json<AnalyticsReport>> {
    auth.require_staff()?;

    let period = parse_choice::<Period>(query.period.as_deref())?.unwrap_or(Period::Month);
    let report = analytics::build_report(
        state.store.as_ref(),
        period,
        query.date_from,
        query.date_to,
        Utc::now(),
    )
    .await?;

    Ok(Json(report))
}

/// Bonus for a lawyer; the period defaults to the current month to date.
async fn get_bonus(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(lawyer_id): Path<Uuid>,
    Query(query): Query<BonusQuery>,
) -> ApiResult<Json<BonusResult>> {
    auth.require_self_or_staff(lawyer_id)?;

    let today = Utc::now().date_naive();
    let period_start = query
        .period_start
        .unwrap_or_else(|| today.with_day(1).unwrap_or(today));
    let period_end = query.period_end.unwrap_or(today);

    let result = bonus::calculate_bonus(state.store.as_ref(), lawyer_id, period_start, period_end).await?;
    Ok(Json(result))
}

async fn list_snapshots(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Query(query): Query<SnapshotQuery>,
) -> ApiResult<Json<Vec<AnalyticsSnapshot>>> {
    auth.require_staff()?;

    let period = parse_choice::<Period>(query.period.as_deref())?;
    let limit = query
        .limit
        .unwrap_or(DEFAULT_SNAPSHOT_LIMIT)
        .clamp(1, MAX_SNAPSHOT_LIMIT);

    let snapshots = state.store.list_snapshots(period, limit).await?;
    Ok(Json(snapshots))
}
