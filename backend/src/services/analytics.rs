//! Analytics report builder
//!
//! A report is a fixed sequence of store aggregates over one date range,
//! followed by ratio arithmetic. Every ratio falls back to zero when its
//! denominator is zero.

use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;

use lexdesk_shared::{
    AnalyticsReport, CaseStage, CaseType, CaseTypeShare, LawyerProductivity, Period,
    RevenueBucket, StageShare, TopClient,
};

use crate::error::{ApiError, ApiResult, ValidationBuilder};
use crate::store::{CaseFilter, LegalStore, PaymentFilter, TimeEntryFilter};

const TOP_CLIENTS: usize = 10;
const ROLLING_BUCKET_DAYS: i64 = 30;

/// Money and hours: 2 dp.
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp(2)
}

/// Percentages: 1 dp.
pub fn round_rate(value: Decimal) -> Decimal {
    value.round_dp(1)
}

/// `numerator / denominator`, or zero when the denominator is zero.
pub fn ratio(numerator: Decimal, denominator: Decimal) -> Decimal {
    if denominator.is_zero() {
        return Decimal::ZERO;
    }
    numerator.checked_div(denominator).unwrap_or(Decimal::ZERO)
}

/// `part / whole * 100` rounded to 1 dp, or zero when `whole` is zero.
pub fn percentage(part: i64, whole: i64) -> Decimal {
    if whole <= 0 {
        return Decimal::ZERO;
    }
    round_rate(ratio(
        Decimal::from(part) * Decimal::ONE_HUNDRED,
        Decimal::from(whole),
    ))
}

/// Resolve an optional range against `now`: the start defaults to
/// `now - window(period)`, the end to `now`.
pub fn resolve_range(
    period: Period,
    date_from: Option<DateTime<Utc>>,
    date_to: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> ApiResult<(DateTime<Utc>, DateTime<Utc>)> {
    let date_from = date_from.unwrap_or_else(|| now - Duration::days(period.window_days()));
    let date_to = date_to.unwrap_or(now);

    ValidationBuilder::new()
        .check(
            date_from > date_to,
            "date_from",
            "date_from must not be after date_to",
        )
        .finish()?;

    Ok((date_from, date_to))
}

/// Inclusive instant bounds covering whole days `start..=end`.
/// An `end` on the last representable day is rejected with 422.
pub fn day_bounds(start: NaiveDate, end: NaiveDate) -> ApiResult<(DateTime<Utc>, DateTime<Utc>)> {
    let from = start.and_time(NaiveTime::MIN).and_utc();
    let to = end
        .and_time(NaiveTime::MIN)
        .and_utc()
        .checked_add_signed(Duration::days(1) - Duration::microseconds(1));

    let to = to.ok_or_else(|| ApiError::invalid_field("period_end", "Date is out of the supported range"))?;
    Ok((from, to))
}

fn month_start(date: NaiveDate) -> Option<NaiveDate> {
    date.with_day(1)
}

/// Partition `[from, to]` into buckets: calendar months for month-scale
/// periods, rolling 30-day windows otherwise. Buckets are disjoint and
/// cover the range exactly.
pub fn revenue_buckets(period: Period, from: NaiveDate, to: NaiveDate) -> Vec<(String, NaiveDate, NaiveDate)> {
    let mut buckets = Vec::new();
    let mut cursor = from;

    while cursor <= to {
        let next = if period.uses_calendar_months() {
            month_start(cursor).and_then(|start| start.checked_add_months(Months::new(1)))
        } else {
            cursor.checked_add_signed(Duration::days(ROLLING_BUCKET_DAYS))
        };
        let Some(next) = next else { break };
        let end = next.pred_opt().map_or(to, |last| last.min(to));

        let label = if period.uses_calendar_months() {
            cursor.format("%Y-%m").to_string()
        } else {
            format!("{} - {}", cursor.format("%d.%m.%Y"), end.format("%d.%m.%Y"))
        };
        buckets.push((label, cursor, end));
        cursor = next;
    }

    buckets
}

/// Stable sort, highest efficiency first.
pub fn rank_by_efficiency(rows: &mut [LawyerProductivity]) {
    rows.sort_by(|a, b| b.efficiency.cmp(&a.efficiency));
}

/// Drop non-positive revenue, order by revenue (ties by name), keep ten.
pub fn rank_top_clients(mut clients: Vec<TopClient>) -> Vec<TopClient> {
    clients.retain(|c| c.revenue > Decimal::ZERO);
    clients.sort_by(|a, b| b.revenue.cmp(&a.revenue).then_with(|| a.name.cmp(&b.name)));
    clients.truncate(TOP_CLIENTS);
    clients
}

pub async fn build_report(
    store: &dyn LegalStore,
    period: Period,
    date_from: Option<DateTime<Utc>>,
    date_to: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> ApiResult<AnalyticsReport> {
    let (from, to) = resolve_range(period, date_from, date_to, now)?;
    let (from_day, to_day) = (from.date_naive(), to.date_naive());
    let paid_in_range = PaymentFilter::paid_between(from_day, to_day);

    // Financials
    let total_revenue = round_money(store.sum_payments(&paid_in_range).await?);
    let total_expenses = round_money(
        store
            .sum_labor_cost(&TimeEntryFilter {
                billable: Some(true),
                started_from: Some(from),
                started_to: Some(to),
                ..Default::default()
            })
            .await?,
    );
    let total_profit = total_revenue - total_expenses;
    let profit_margin = if total_revenue > Decimal::ZERO {
        round_rate(ratio(total_profit, total_revenue) * Decimal::ONE_HUNDRED)
    } else {
        Decimal::ZERO
    };

    // Case and client counts
    let created_since = CaseFilter {
        created_from: Some(from),
        ..Default::default()
    };
    let created_in_range = CaseFilter {
        created_from: Some(from),
        created_to: Some(to),
        ..Default::default()
    };

    let active_cases = store
        .count_cases(&CaseFilter {
            is_active: Some(true),
            ..created_since.clone()
        })
        .await?;
    let new_clients = store.count_clients(Some(from), Some(to)).await?;
    let avg_case_duration = round_rate(
        store
            .avg_case_duration_days(&created_since)
            .await?
            .unwrap_or(Decimal::ZERO),
    );

    let closed_cases = store
        .count_cases(&CaseFilter {
            stage: Some(CaseStage::Closed),
            ..created_since.clone()
        })
        .await?;
    let total_cases = store.count_cases(&created_in_range).await?;
    let case_success_rate = percentage(closed_cases, total_cases);

    let lawyer_productivity = lawyer_productivity(store, from, to).await?;

    // Distributions share the active_cases denominator
    let mut case_type_distribution = Vec::new();
    for case_type in CaseType::ALL {
        let count = store
            .count_cases(&CaseFilter {
                case_type: Some(*case_type),
                ..created_in_range.clone()
            })
            .await?;
        if count > 0 {
            case_type_distribution.push(CaseTypeShare {
                case_type: *case_type,
                count,
                percentage: percentage(count, active_cases),
            });
        }
    }

    let mut stage_distribution = Vec::new();
    for stage in CaseStage::ALL {
        let count = store
            .count_cases(&CaseFilter {
                stage: Some(*stage),
                ..created_in_range.clone()
            })
            .await?;
        if count > 0 {
            stage_distribution.push(StageShare {
                stage: *stage,
                count,
                percentage: percentage(count, active_cases),
            });
        }
    }

    let mut revenue_by_month = Vec::new();
    for (label, start, end) in revenue_buckets(period, from_day, to_day) {
        let revenue = store
            .sum_payments(&PaymentFilter::paid_between(start, end))
            .await?;
        revenue_by_month.push(RevenueBucket {
            label,
            revenue: round_money(revenue),
            start,
            end,
        });
    }

    let top_clients = rank_top_clients(
        store
            .revenue_by_client(&paid_in_range)
            .await?
            .into_iter()
            .map(|row| TopClient {
                client_id: row.client_id,
                name: row.client_name,
                revenue: round_money(row.revenue),
                cases_count: row.cases_count,
            })
            .collect(),
    );

    Ok(AnalyticsReport {
        period,
        date_from: from,
        date_to: to,
        total_revenue,
        total_expenses,
        total_profit,
        profit_margin,
        active_cases,
        new_clients,
        avg_case_duration,
        case_success_rate,
        lawyer_productivity,
        case_type_distribution,
        stage_distribution,
        revenue_by_month,
        top_clients,
    })
}

async fn lawyer_productivity(
    store: &dyn LegalStore,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> ApiResult<Vec<LawyerProductivity>> {
    let mut rows = Vec::new();

    for lawyer in store.active_lawyers().await? {
        let own_cases = CaseFilter {
            lawyer_id: Some(lawyer.id),
            ..Default::default()
        };
        let cases_count = store
            .count_cases(&CaseFilter {
                is_active: Some(true),
                ..own_cases.clone()
            })
            .await?;
        let revenue = store
            .sum_payments(&PaymentFilter {
                lawyer_id: Some(lawyer.id),
                ..PaymentFilter::paid_between(from.date_naive(), to.date_naive())
            })
            .await?;
        let worked_hours = store
            .sum_hours(&TimeEntryFilter {
                lawyer_id: Some(lawyer.id),
                started_from: Some(from),
                started_to: Some(to),
                ..Default::default()
            })
            .await?;
        let closed = store
            .count_cases(&CaseFilter {
                stage: Some(CaseStage::Closed),
                ..own_cases.clone()
            })
            .await?;
        let total = store.count_cases(&own_cases).await?;

        rows.push(LawyerProductivity {
            lawyer_id: lawyer.id,
            name: lawyer.full_name(),
            cases_count,
            revenue: round_money(revenue),
            worked_hours: round_money(worked_hours),
            efficiency: round_money(ratio(revenue, worked_hours)),
            success_rate: percentage(closed, total),
        });
    }

    rank_by_efficiency(&mut rows);
    Ok(rows)
}
