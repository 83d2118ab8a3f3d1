// Unit tests for the case report builder

use axum::http::StatusCode;
use chrono::Duration;
use rust_decimal::Decimal;
use uuid::Uuid;

use lexdesk_shared::{CommunicationType, LabelCatalog, TaskStatus};

use crate::services::case_report::{build_case_report, format_date, format_datetime};
use crate::store::MemoryStore;
use crate::tests::fixtures::*;

#[cfg(test)]
mod case_report_tests {
    use super::*;

    #[test]
    fn test_display_formats() {
        assert_eq!(format_date(date(2024, 3, 7)), "07.03.2024");
        assert_eq!(format_datetime(at(2024, 3, 7, 14)), "07.03.2024 14:00");
    }

    #[tokio::test]
    async fn test_unknown_case_is_not_found() {
        let store = MemoryStore::new();
        let err = build_case_report(&store, &LabelCatalog::english(), Uuid::new_v4())
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_report_sections_and_statistics() {
        let store = MemoryStore::new();
        let labels = LabelCatalog::english();
        let lawyer = UserBuilder::lawyer().named("Elena", "Sokolova").insert(&store);
        let (_, client) = client_with_user(&store, "Anna", "Petrova");
        let case = CaseBuilder::new(client.id)
            .lawyer(lawyer.id)
            .budget(dec("100"))
            .insert(&store);
        let base = at(2024, 4, 1, 9);

        CommunicationBuilder::new(case.id, CommunicationType::Email, lawyer.id)
            .subject("older")
            .created_at(base)
            .insert(&store);
        CommunicationBuilder::new(case.id, CommunicationType::Phone, lawyer.id)
            .subject("newer")
            .created_at(base + Duration::days(1))
            .insert(&store);

        document(&store, case.id, lawyer.id, base);

        TaskBuilder::new(lawyer.id).case(case.id).status(TaskStatus::Done).due(base).insert(&store);
        TaskBuilder::new(lawyer.id)
            .case(case.id)
            .status(TaskStatus::Todo)
            .due(base + Duration::days(5))
            .insert(&store);
        TaskBuilder::new(lawyer.id)
            .case(case.id)
            .status(TaskStatus::Review)
            .due(base + Duration::days(2))
            .insert(&store);

        PaymentBuilder::paid(case.id, dec("90"), date(2024, 4, 2)).insert(&store);
        PaymentBuilder::paid(case.id, dec("60"), date(2024, 4, 9)).insert(&store);
        PaymentBuilder::paid(case.id, dec("500"), date(2024, 4, 10)).unpaid().insert(&store);

        TimeEntryBuilder::new(lawyer.id, case.id, dec("1.5"), base).insert(&store);
        TimeEntryBuilder::new(lawyer.id, case.id, dec("2.25"), base + Duration::days(3)).insert(&store);

        let later = EventBuilder::new(lawyer.id, base + Duration::days(7), 60)
            .case(case.id)
            .insert(&store);
        let sooner = EventBuilder::new(lawyer.id, base + Duration::days(2), 30)
            .case(case.id)
            .insert(&store);

        let report = build_case_report(&store, &labels, case.id).await.unwrap();

        assert_eq!(report.case.client_name, "Anna Petrova");
        assert_eq!(report.case.lawyer_name, "Elena Sokolova");

        // Newest first everywhere except the calendar
        assert_eq!(report.communications[0].subject, "newer");
        assert_eq!(report.communications[0].created_by, "Elena Sokolova");
        assert_eq!(report.tasks[0].status, TaskStatus::Todo);
        assert_eq!(report.payments[0].amount, dec("500"));
        assert_eq!(report.time_entries[0].duration, dec("2.25"));
        assert_eq!(report.calendar_events[0].id, sooner.id);
        assert_eq!(report.calendar_events[1].id, later.id);

        let stats = &report.statistics;
        assert_eq!(stats.total_paid, dec("150"));
        // Overspent budgets stay negative
        assert_eq!(stats.remaining_budget, dec("-50"));
        assert_eq!(stats.total_hours_spent, dec("3.75"));
        assert_eq!(stats.documents_count, 1);
        assert_eq!(stats.tasks_completed, 1);
        assert_eq!(stats.tasks_pending, 1);
    }

    #[tokio::test]
    async fn test_unassigned_case_uses_label() {
        let store = MemoryStore::new();
        let labels = LabelCatalog::english();
        let (_, client) = client_with_user(&store, "Anna", "Petrova");
        let case = CaseBuilder::new(client.id).insert(&store);

        let report = build_case_report(&store, &labels, case.id).await.unwrap();

        assert_eq!(report.case.lawyer_name, labels.unassigned());
        assert!(report.communications.is_empty());
        assert_eq!(report.statistics.total_paid, Decimal::ZERO);
        assert_eq!(report.statistics.remaining_budget, case.budget);
    }
}
