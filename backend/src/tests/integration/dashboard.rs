// Role-specific dashboard views

use axum::http::StatusCode;
use chrono::{Duration, Utc};

use lexdesk_shared::{CaseStage, TaskStatus};

use crate::tests::fixtures::*;
use crate::tests::helpers::*;

#[cfg(test)]
mod dashboard_tests {
    use super::*;

    #[tokio::test]
    async fn test_staff_dashboard() {
        let app = TestApp::new();
        let admin = UserBuilder::admin().insert(&app.store);
        let lawyer = UserBuilder::lawyer().insert(&app.store);
        let (_, client) = client_with_user(&app.store, "Ivan", "Sokolov");
        let case = CaseBuilder::new(client.id)
            .stage(CaseStage::Lawsuit)
            .insert(&app.store);
        CaseBuilder::new(client.id).stage(CaseStage::Closed).insert(&app.store);
        CaseBuilder::new(client.id).inactive().insert(&app.store);
        PaymentBuilder::paid(case.id, dec("320"), Utc::now().date_naive()).insert(&app.store);
        TaskBuilder::new(lawyer.id)
            .due(Utc::now() + Duration::days(2))
            .insert(&app.store);
        TaskBuilder::new(lawyer.id)
            .status(TaskStatus::Done)
            .due(Utc::now() + Duration::days(2))
            .insert(&app.store);

        let (status, body) = app.get("/api/v1/dashboard", &admin).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["view"], "staff");
        assert_eq!(body["total_cases"], 2);
        assert_eq!(body["active_cases"], 1);
        assert_eq!(body["total_clients"], 1);
        assert_eq!(decimal(&body["monthly_revenue"]), dec("320"));
        assert_eq!(body["upcoming_deadlines"].as_array().unwrap().len(), 1);
        assert_eq!(body["analytics"]["period"], "month");
    }

    #[tokio::test]
    async fn test_lawyer_dashboard() {
        let app = TestApp::new();
        let lawyer = UserBuilder::lawyer().insert(&app.store);
        let other = UserBuilder::lawyer().insert(&app.store);
        let (_, client) = client_with_user(&app.store, "Ivan", "Sokolov");
        CaseBuilder::new(client.id).lawyer(lawyer.id).insert(&app.store);
        CaseBuilder::new(client.id).lawyer(other.id).insert(&app.store);
        TaskBuilder::new(lawyer.id).insert(&app.store);
        TaskBuilder::new(lawyer.id)
            .status(TaskStatus::InProgress)
            .insert(&app.store);
        TaskBuilder::new(lawyer.id).status(TaskStatus::Done).insert(&app.store);
        EventBuilder::new(other.id, Utc::now() + Duration::days(1), 30)
            .participants(vec![lawyer.id])
            .insert(&app.store);
        EventBuilder::new(other.id, Utc::now() + Duration::days(10), 30)
            .participants(vec![lawyer.id])
            .insert(&app.store);

        let (status, body) = app.get("/api/v1/dashboard", &lawyer).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["view"], "lawyer");
        assert_eq!(body["my_cases"], 1);
        assert_eq!(body["my_tasks"], 2);
        assert_eq!(body["upcoming_meetings"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_client_dashboard() {
        let app = TestApp::new();
        let (me, client) = client_with_user(&app.store, "Ivan", "Sokolov");
        CaseBuilder::new(client.id).insert(&app.store);
        CaseBuilder::new(client.id).insert(&app.store);

        let (status, body) = app.get("/api/v1/dashboard", &me).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["view"], "client");
        assert_eq!(body["my_cases"], 2);
    }
}
