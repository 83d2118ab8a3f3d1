//! Lawyer performance bonus

use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

use lexdesk_shared::{BonusResult, CaseStage};

use crate::error::{ApiError, ApiResult, ValidationBuilder};
use crate::services::analytics::{day_bounds, ratio, round_money, round_rate};
use crate::store::{CaseFilter, LegalStore, PaymentFilter, TimeEntryFilter};

/// Share of revenue paid as base bonus for a given efficiency.
fn efficiency_tier(efficiency: Decimal) -> Decimal {
    if efficiency > Decimal::new(15, 1) {
        Decimal::new(10, 2)
    } else if efficiency > Decimal::new(12, 1) {
        Decimal::new(7, 2)
    } else if efficiency > Decimal::ONE {
        Decimal::new(5, 2)
    } else {
        Decimal::ZERO
    }
}

/// Share of the base bonus added for a given success rate (percent).
fn success_tier(success_rate: Decimal) -> Decimal {
    if success_rate > Decimal::from(90) {
        Decimal::new(50, 2)
    } else if success_rate > Decimal::from(80) {
        Decimal::new(30, 2)
    } else if success_rate > Decimal::from(70) {
        Decimal::new(10, 2)
    } else {
        Decimal::ZERO
    }
}

/// Returns `(base_bonus, success_bonus)`, each rounded to 2 dp.
pub fn bonus_tiers(revenue: Decimal, efficiency: Decimal, success_rate: Decimal) -> (Decimal, Decimal) {
    let base = round_money(revenue * efficiency_tier(efficiency));
    let success = round_money(base * success_tier(success_rate));
    (base, success)
}

pub async fn calculate_bonus(
    store: &dyn LegalStore,
    lawyer_id: Uuid,
    period_start: NaiveDate,
    period_end: NaiveDate,
) -> ApiResult<BonusResult> {
    ValidationBuilder::new()
        .check(
            period_start > period_end,
            "period_start",
            "period_start must not be after period_end",
        )
        .finish()?;

    let lawyer = store
        .get_user(lawyer_id)
        .await?
        .filter(|u| u.is_lawyer())
        .ok_or_else(|| ApiError::not_found("Lawyer"))?;

    let (from, to) = day_bounds(period_start, period_end)?;

    let revenue = store
        .sum_payments(&PaymentFilter {
            lawyer_id: Some(lawyer.id),
            ..PaymentFilter::paid_between(period_start, period_end)
        })
        .await?;
    let hours = store
        .sum_hours(&TimeEntryFilter {
            lawyer_id: Some(lawyer.id),
            started_from: Some(from),
            started_to: Some(to),
            ..Default::default()
        })
        .await?;

    let cases_in_period = CaseFilter {
        lawyer_id: Some(lawyer.id),
        created_from: Some(from),
        created_to: Some(to),
        ..Default::default()
    };
    let total_cases = store.count_cases(&cases_in_period).await?;
    let closed_cases = store
        .count_cases(&CaseFilter {
            stage: Some(CaseStage::Closed),
            ..cases_in_period.clone()
        })
        .await?;
    let success_rate = if total_cases > 0 {
        ratio(
            Decimal::from(closed_cases) * Decimal::ONE_HUNDRED,
            Decimal::from(total_cases),
        )
    } else {
        Decimal::ZERO
    };

    let efficiency = if hours > Decimal::ZERO && lawyer.hourly_rate > Decimal::ZERO {
        ratio(revenue, hours * lawyer.hourly_rate)
    } else {
        Decimal::ZERO
    };

    // Tiers are decided on unrounded figures
    let (base_bonus, success_bonus) = bonus_tiers(revenue, efficiency, success_rate);

    tracing::debug!(
        "Bonus for lawyer {}: revenue={}, hours={}, efficiency={}, success_rate={}",
        lawyer.id,
        revenue,
        hours,
        efficiency,
        success_rate
    );

    Ok(BonusResult {
        lawyer_id: lawyer.id,
        lawyer_name: lawyer.full_name(),
        period_start,
        period_end,
        revenue: round_money(revenue),
        hours_worked: round_money(hours),
        hourly_rate: round_money(lawyer.hourly_rate),
        total_cases,
        closed_cases,
        success_rate: round_rate(success_rate),
        efficiency: round_money(efficiency),
        base_bonus,
        success_bonus,
        total_bonus: base_bonus + success_bonus,
    })
}
