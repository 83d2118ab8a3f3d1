// Maintenance Jobs - analytics snapshots and notification cleanup

use chrono::{DateTime, Duration, Utc};
use tracing::info;

use lexdesk_shared::{AnalyticsSnapshot, Period};

use crate::error::{ApiError, ApiResult};
use crate::services::analytics::{build_report, day_bounds};
use crate::store::{LegalStore, NewSnapshot, StoreResult};

pub struct MaintenanceJobs;

impl MaintenanceJobs {
    /// Persist a `day` snapshot covering the calendar day before `now`.
    /// Re-running for the same day replaces the stored snapshot.
    pub async fn snapshot_previous_day(
        store: &dyn LegalStore,
        now: DateTime<Utc>,
    ) -> ApiResult<AnalyticsSnapshot> {
        let day = (now - Duration::days(1)).date_naive();
        let (from, to) = day_bounds(day, day)?;
        info!("Building analytics snapshot for {}", day);

        let report = build_report(store, Period::Day, Some(from), Some(to), now).await?;

        let lawyer_performance = serde_json::to_value(&report.lawyer_productivity)
            .map_err(|e| ApiError::internal(e.to_string()))?;
        let case_type_distribution = serde_json::to_value(&report.case_type_distribution)
            .map_err(|e| ApiError::internal(e.to_string()))?;

        let snapshot = store
            .upsert_snapshot(NewSnapshot {
                period: Period::Day,
                period_date: day,
                total_revenue: report.total_revenue,
                total_expenses: report.total_expenses,
                total_profit: report.total_profit,
                active_cases: report.active_cases,
                new_clients: report.new_clients,
                lawyer_performance,
                case_type_distribution,
            })
            .await?;

        info!(
            "Analytics snapshot for {} stored: revenue={}, profit={}",
            day, snapshot.total_revenue, snapshot.total_profit
        );
        Ok(snapshot)
    }

    /// Delete read notifications older than `retention_days`.
    pub async fn cleanup_notifications(
        store: &dyn LegalStore,
        now: DateTime<Utc>,
        retention_days: i64,
    ) -> StoreResult<u64> {
        let cutoff = now - Duration::days(retention_days);
        let deleted = store.purge_read_notifications(cutoff).await?;

        if deleted > 0 {
            info!("Deleted {} read notifications older than {}", deleted, cutoff);
        }

        Ok(deleted)
    }
}
