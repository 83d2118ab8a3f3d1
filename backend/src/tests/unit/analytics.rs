// Unit tests for the analytics report builder

use axum::http::StatusCode;
use chrono::Duration;
use rust_decimal::Decimal;
use uuid::Uuid;

use lexdesk_shared::{AnalyticsReport, CaseStage, CaseType, Period, TopClient};

use crate::services::analytics::{
    build_report, day_bounds, percentage, rank_top_clients, ratio, resolve_range, revenue_buckets,
};
use crate::store::MemoryStore;
use crate::tests::fixtures::*;

#[cfg(test)]
mod helper_tests {
    use super::*;

    #[test]
    fn test_ratios_fall_back_to_zero() {
        assert_eq!(ratio(dec("10"), Decimal::ZERO), Decimal::ZERO);
        assert_eq!(ratio(dec("10"), dec("4")), dec("2.5"));
        assert_eq!(percentage(3, 0), Decimal::ZERO);
        assert_eq!(percentage(1, 3), dec("33.3"));
        assert_eq!(percentage(2, 3), dec("66.7"));
    }

    #[test]
    fn test_resolve_range_defaults_to_period_window() {
        let now = at(2024, 3, 31, 12);
        let (from, to) = resolve_range(Period::Week, None, None, now).unwrap();
        assert_eq!(to, now);
        assert_eq!(from, now - Duration::days(7));

        let (from, _) = resolve_range(Period::Year, None, None, now).unwrap();
        assert_eq!(from, now - Duration::days(365));
    }

    #[test]
    fn test_resolve_range_rejects_inverted_range() {
        let now = at(2024, 3, 31, 12);
        let err = resolve_range(Period::Month, Some(now), Some(now - Duration::days(1)), now)
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_monthly_buckets_follow_calendar_months() {
        let buckets = revenue_buckets(Period::Quarter, date(2024, 1, 15), date(2024, 3, 10));
        let labels: Vec<&str> = buckets.iter().map(|(label, _, _)| label.as_str()).collect();
        assert_eq!(labels, vec!["2024-01", "2024-02", "2024-03"]);
        assert_eq!((buckets[0].1, buckets[0].2), (date(2024, 1, 15), date(2024, 1, 31)));
        assert_eq!((buckets[1].1, buckets[1].2), (date(2024, 2, 1), date(2024, 2, 29)));
        assert_eq!((buckets[2].1, buckets[2].2), (date(2024, 3, 1), date(2024, 3, 10)));
    }

    #[test]
    fn test_rolling_buckets_partition_the_range() {
        let (from, to) = (date(2024, 1, 1), date(2024, 3, 15));
        let buckets = revenue_buckets(Period::Week, from, to);

        assert_eq!(buckets[0].0, "01.01.2024 - 30.01.2024");
        assert_eq!(buckets.first().unwrap().1, from);
        assert_eq!(buckets.last().unwrap().2, to);
        for pair in buckets.windows(2) {
            assert_eq!(pair[0].2.succ_opt().unwrap(), pair[1].1);
        }
    }

    #[test]
    fn test_single_day_range_has_one_bucket() {
        let day = date(2024, 5, 5);
        let buckets = revenue_buckets(Period::Day, day, day);
        assert_eq!(buckets.len(), 1);
        assert_eq!((buckets[0].1, buckets[0].2), (day, day));
    }

    #[test]
    fn test_top_clients_are_capped_and_ordered() {
        let mut clients: Vec<TopClient> = (0..12)
            .map(|i| TopClient {
                client_id: Uuid::new_v4(),
                name: format!("Client {:02}", i),
                revenue: Decimal::from(100 * (i % 6)),
                cases_count: 1,
            })
            .collect();
        clients.push(TopClient {
            client_id: Uuid::new_v4(),
            name: "Aardvark".to_string(),
            revenue: Decimal::from(500),
            cases_count: 2,
        });

        let top = rank_top_clients(clients);

        assert_eq!(top.len(), 10);
        assert!(top.iter().all(|c| c.revenue > Decimal::ZERO));
        assert!(top.windows(2).all(|w| w[0].revenue >= w[1].revenue));
        // Equal revenue is ordered by name
        assert_eq!(top[0].name, "Aardvark");
        assert_eq!(top[1].name, "Client 05");
    }
}

#[cfg(test)]
mod report_tests {
    use super::*;

    struct Firm {
        store: MemoryStore,
        lawyer_a: Uuid,
        lawyer_b: Uuid,
        client_1: Uuid,
    }

    /// Two lawyers, two clients, activity spread over Q1 2024 plus some
    /// records outside the quarter.
    fn firm() -> Firm {
        let store = MemoryStore::new();
        let a = UserBuilder::lawyer().named("Anton", "Abramov").hourly_rate(dec("100")).insert(&store);
        let b = UserBuilder::lawyer().named("Boris", "Belov").hourly_rate(dec("50")).insert(&store);
        UserBuilder::lawyer().named("Ivan", "Idle").inactive().insert(&store);

        let anna = UserBuilder::client().named("Anna", "Petrova").insert(&store);
        let client_1 = ClientBuilder::for_user(&anna).created_at(at(2024, 1, 5, 9)).insert(&store);
        let (_, client_2) = client_with_user(&store, "Boris", "Ivanov");

        let case_1 = CaseBuilder::new(client_1.id)
            .lawyer(a.id)
            .case_type(CaseType::Civil)
            .stage(CaseStage::Closed)
            .created_at(at(2024, 1, 10, 10))
            .ended(date(2024, 2, 9))
            .insert(&store);
        let case_2 = CaseBuilder::new(client_2.id)
            .lawyer(b.id)
            .case_type(CaseType::Criminal)
            .stage(CaseStage::Court)
            .created_at(at(2024, 2, 5, 10))
            .insert(&store);
        CaseBuilder::new(client_1.id)
            .created_at(at(2023, 12, 1, 10))
            .insert(&store);

        PaymentBuilder::paid(case_1.id, dec("1000"), date(2024, 1, 15)).insert(&store);
        PaymentBuilder::paid(case_2.id, dec("500"), date(2024, 2, 20)).insert(&store);
        PaymentBuilder::paid(case_2.id, dec("700"), date(2024, 3, 1)).unpaid().insert(&store);
        PaymentBuilder::paid(case_1.id, dec("200"), date(2023, 12, 20)).insert(&store);

        TimeEntryBuilder::new(a.id, case_1.id, dec("5"), at(2024, 1, 12, 9)).insert(&store);
        TimeEntryBuilder::new(b.id, case_2.id, dec("4"), at(2024, 2, 10, 9))
            .non_billable()
            .insert(&store);
        TimeEntryBuilder::new(b.id, case_2.id, dec("2"), at(2024, 3, 5, 9)).insert(&store);

        Firm {
            store,
            lawyer_a: a.id,
            lawyer_b: b.id,
            client_1: client_1.id,
        }
    }

    async fn quarter_report(store: &MemoryStore) -> AnalyticsReport {
        let (from, to) = day_bounds(date(2024, 1, 1), date(2024, 3, 31)).unwrap();
        build_report(store, Period::Quarter, Some(from), Some(to), at(2024, 4, 1, 8))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_financials() {
        let firm = firm();
        let report = quarter_report(&firm.store).await;

        assert_eq!(report.total_revenue, dec("1500"));
        // Only billable time is costed
        assert_eq!(report.total_expenses, dec("600"));
        assert_eq!(report.total_profit, report.total_revenue - report.total_expenses);
        assert_eq!(report.profit_margin, dec("60.0"));
    }

    #[tokio::test]
    async fn test_case_and_client_counts() {
        let firm = firm();
        let report = quarter_report(&firm.store).await;

        assert_eq!(report.active_cases, 2);
        assert_eq!(report.new_clients, 1);
        assert_eq!(report.avg_case_duration, dec("30.0"));
        assert_eq!(report.case_success_rate, dec("50.0"));
    }

    #[tokio::test]
    async fn test_lawyer_productivity_is_ranked_by_efficiency() {
        let firm = firm();
        let report = quarter_report(&firm.store).await;
        let rows = &report.lawyer_productivity;

        // Inactive lawyers are not listed
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].lawyer_id, firm.lawyer_a);
        assert_eq!(rows[0].cases_count, 1);
        assert_eq!(rows[0].revenue, dec("1000"));
        assert_eq!(rows[0].worked_hours, dec("5"));
        assert_eq!(rows[0].efficiency, dec("200"));
        assert_eq!(rows[0].success_rate, dec("100.0"));

        assert_eq!(rows[1].lawyer_id, firm.lawyer_b);
        // Non-billable hours still count as worked
        assert_eq!(rows[1].worked_hours, dec("6"));
        assert_eq!(rows[1].efficiency, dec("83.33"));
        assert_eq!(rows[1].success_rate, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_distributions_and_buckets() {
        let firm = firm();
        let report = quarter_report(&firm.store).await;

        let types: Vec<(CaseType, i64)> = report
            .case_type_distribution
            .iter()
            .map(|share| (share.case_type, share.count))
            .collect();
        assert_eq!(types, vec![(CaseType::Civil, 1), (CaseType::Criminal, 1)]);
        assert!(report
            .case_type_distribution
            .iter()
            .all(|share| share.percentage == dec("50.0")));
        assert_eq!(report.stage_distribution.len(), 2);

        let monthly: Vec<Decimal> = report.revenue_by_month.iter().map(|b| b.revenue).collect();
        assert_eq!(monthly, vec![dec("1000"), dec("500"), Decimal::ZERO]);
        let bucket_total: Decimal = monthly.iter().copied().sum();
        assert_eq!(bucket_total, report.total_revenue);
    }

    #[tokio::test]
    async fn test_top_clients_count_all_cases() {
        let firm = firm();
        let report = quarter_report(&firm.store).await;

        assert_eq!(report.top_clients.len(), 2);
        assert_eq!(report.top_clients[0].client_id, firm.client_1);
        assert_eq!(report.top_clients[0].name, "Anna Petrova");
        assert_eq!(report.top_clients[0].revenue, dec("1000"));
        assert_eq!(report.top_clients[0].cases_count, 2);
        assert_eq!(report.top_clients[1].name, "Boris Ivanov");
    }

    #[tokio::test]
    async fn test_empty_store_reports_zeros() {
        let store = MemoryStore::new();
        let report = build_report(&store, Period::Month, None, None, at(2024, 6, 15, 12))
            .await
            .unwrap();

        assert_eq!(report.total_revenue, Decimal::ZERO);
        assert_eq!(report.total_profit, Decimal::ZERO);
        assert_eq!(report.profit_margin, Decimal::ZERO);
        assert_eq!(report.case_success_rate, Decimal::ZERO);
        assert_eq!(report.avg_case_duration, Decimal::ZERO);
        assert!(report.lawyer_productivity.is_empty());
        assert!(report.case_type_distribution.is_empty());
        assert!(report.top_clients.is_empty());
        assert!(report.revenue_by_month.iter().all(|b| b.revenue.is_zero()));
    }

    #[tokio::test]
    async fn test_losses_give_negative_margin() {
        let store = MemoryStore::new();
        let lawyer = UserBuilder::lawyer().hourly_rate(dec("200")).insert(&store);
        let (_, client) = client_with_user(&store, "Olga", "Smirnova");
        let case = CaseBuilder::new(client.id)
            .lawyer(lawyer.id)
            .created_at(at(2024, 5, 2, 9))
            .insert(&store);
        PaymentBuilder::paid(case.id, dec("100"), date(2024, 5, 3)).insert(&store);
        TimeEntryBuilder::new(lawyer.id, case.id, dec("1"), at(2024, 5, 3, 9)).insert(&store);

        let (from, to) = day_bounds(date(2024, 5, 1), date(2024, 5, 31)).unwrap();
        let report = build_report(&store, Period::Month, Some(from), Some(to), at(2024, 6, 1, 0))
            .await
            .unwrap();

        assert_eq!(report.total_profit, dec("-100"));
        assert_eq!(report.profit_margin, dec("-100.0"));
    }

    #[tokio::test]
    async fn test_equal_efficiency_keeps_lawyer_order() {
        let store = MemoryStore::new();
        let zulu = UserBuilder::lawyer().named("Zed", "Zulu").insert(&store);
        let kuznetsov = UserBuilder::lawyer().named("Mikhail", "Kuznetsov").insert(&store);
        let alpha = UserBuilder::lawyer().named("Al", "Alpha").insert(&store);
        let borisova = UserBuilder::lawyer().named("Anna", "Borisova").insert(&store);
        let top = UserBuilder::lawyer().named("Petr", "Volkov").insert(&store);
        let (_, client) = client_with_user(&store, "Olga", "Smirnova");

        for (lawyer, revenue, hours) in [
            (&kuznetsov, "300", "3"),
            (&borisova, "300", "3"),
            (&top, "500", "2"),
        ] {
            let case = CaseBuilder::new(client.id)
                .lawyer(lawyer.id)
                .created_at(at(2024, 5, 2, 9))
                .insert(&store);
            PaymentBuilder::paid(case.id, dec(revenue), date(2024, 5, 3)).insert(&store);
            TimeEntryBuilder::new(lawyer.id, case.id, dec(hours), at(2024, 5, 3, 9)).insert(&store);
        }

        let (from, to) = day_bounds(date(2024, 5, 1), date(2024, 5, 31)).unwrap();
        let report = build_report(&store, Period::Month, Some(from), Some(to), at(2024, 6, 1, 0))
            .await
            .unwrap();

        let order: Vec<Uuid> = report.lawyer_productivity.iter().map(|row| row.lawyer_id).collect();
        // Ties (100 per hour, then zero) stay in last-name order
        assert_eq!(order, vec![top.id, borisova.id, kuznetsov.id, alpha.id, zulu.id]);
        assert_eq!(report.lawyer_productivity[1].efficiency, dec("100"));
        assert_eq!(report.lawyer_productivity[2].efficiency, dec("100"));
        assert_eq!(report.lawyer_productivity[3].efficiency, Decimal::ZERO);
        assert_eq!(report.lawyer_productivity[4].efficiency, Decimal::ZERO);
    }

    #[test]
    fn test_day_bounds_reject_last_representable_day() {
        let err = day_bounds(date(2024, 1, 1), chrono::NaiveDate::MAX).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
