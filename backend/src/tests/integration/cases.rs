// Case listing, reports and the write paths hanging off a case

use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

use lexdesk_shared::{CaseStage, NotificationType};

use crate::tests::fixtures::*;
use crate::tests::helpers::*;

#[cfg(test)]
mod case_list_tests {
    use super::*;

    #[tokio::test]
    async fn test_list_paginates_active_cases() {
        let app = TestApp::new();
        let manager = UserBuilder::manager().insert(&app.store);
        let (_, client) = client_with_user(&app.store, "Ivan", "Sokolov");
        for _ in 0..3 {
            CaseBuilder::new(client.id).insert(&app.store);
        }
        CaseBuilder::new(client.id).inactive().insert(&app.store);

        let (status, body) = app.get("/api/v1/cases?page=2&per_page=2", &manager).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
        assert_eq!(body["meta"]["total"], 3);
        assert_eq!(body["meta"]["total_pages"], 2);
        assert_eq!(body["meta"]["has_prev"], true);
        assert_eq!(body["meta"]["has_next"], false);
    }

    #[tokio::test]
    async fn test_list_search_and_labels() {
        let app = TestApp::new();
        let manager = UserBuilder::manager().insert(&app.store);
        let (_, client) = client_with_user(&app.store, "Ivan", "Sokolov");
        CaseBuilder::new(client.id)
            .title("Zephyrwood lease dispute")
            .stage(CaseStage::Court)
            .insert(&app.store);
        CaseBuilder::new(client.id).title("Unrelated matter").insert(&app.store);

        let (status, body) = app.get("/api/v1/cases?search=zephyrwood", &manager).await;

        assert_eq!(status, StatusCode::OK);
        let items = body["data"].as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["title"], "Zephyrwood lease dispute");
        assert_eq!(items[0]["client_name"], "Ivan Sokolov");
        assert_eq!(items[0]["stage"], "court");
        assert_eq!(items[0]["lawyer_name"], "Unassigned");

        let (_, body) = app.get("/api/v1/cases?search=sokolov", &manager).await;
        assert_eq!(body["meta"]["total"], 2);
    }

    #[tokio::test]
    async fn test_unknown_stage_filter_is_bad_request() {
        let app = TestApp::new();
        let manager = UserBuilder::manager().insert(&app.store);

        let (status, _) = app.get("/api/v1/cases?stage=appeal", &manager).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_client_lists_only_own_cases() {
        let app = TestApp::new();
        let (me, my_client) = client_with_user(&app.store, "Ivan", "Sokolov");
        let (_, other_client) = client_with_user(&app.store, "Maria", "Orlova");
        let mine = CaseBuilder::new(my_client.id).insert(&app.store);
        CaseBuilder::new(other_client.id).insert(&app.store);

        let (status, body) = app.get("/api/v1/cases", &me).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["meta"]["total"], 1);
        assert_eq!(body["data"][0]["id"], mine.id.to_string());
    }

    #[tokio::test]
    async fn test_huge_page_number_is_empty_page() {
        let app = TestApp::new();
        let manager = UserBuilder::manager().insert(&app.store);
        let (_, client) = client_with_user(&app.store, "Ivan", "Sokolov");
        CaseBuilder::new(client.id).insert(&app.store);

        let (status, body) = app
            .get("/api/v1/cases?page=9223372036854775807", &manager)
            .await;

        assert_eq!(status, StatusCode::OK);
        assert!(body["data"].as_array().unwrap().is_empty());
        assert_eq!(body["meta"]["total"], 1);
    }
}

#[cfg(test)]
mod case_report_endpoint_tests {
    use super::*;

    #[tokio::test]
    async fn test_report_for_existing_case() {
        let app = TestApp::new();
        let lawyer = UserBuilder::lawyer().named("Petr", "Volkov").insert(&app.store);
        let (_, client) = client_with_user(&app.store, "Ivan", "Sokolov");
        let case = CaseBuilder::new(client.id).lawyer(lawyer.id).insert(&app.store);
        PaymentBuilder::paid(case.id, dec("400"), date(2024, 2, 1)).insert(&app.store);

        let (status, body) = app.get(&format!("/api/v1/cases/{}/report", case.id), &lawyer).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["case"]["lawyer_name"], "Petr Volkov");
        assert_eq!(body["case"]["client_name"], "Ivan Sokolov");
        assert_eq!(body["payments"].as_array().unwrap().len(), 1);
        assert_eq!(decimal(&body["statistics"]["total_paid"]), dec("400"));
    }

    #[tokio::test]
    async fn test_report_for_missing_case_is_not_found() {
        let app = TestApp::new();
        let admin = UserBuilder::admin().insert(&app.store);

        let (status, body) = app
            .get(&format!("/api/v1/cases/{}/report", Uuid::new_v4()), &admin)
            .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_client_cannot_see_other_clients_case() {
        let app = TestApp::new();
        let (me, _) = client_with_user(&app.store, "Ivan", "Sokolov");
        let (_, other_client) = client_with_user(&app.store, "Maria", "Orlova");
        let theirs = CaseBuilder::new(other_client.id).insert(&app.store);

        let (status, _) = app.get(&format!("/api/v1/cases/{}/report", theirs.id), &me).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}

#[cfg(test)]
mod case_write_tests {
    use super::*;

    #[tokio::test]
    async fn test_scheduled_meeting_creates_event_and_notifies() {
        let app = TestApp::new();
        let lawyer = UserBuilder::lawyer().insert(&app.store);
        let (client_user, client) = client_with_user(&app.store, "Ivan", "Sokolov");
        let case = CaseBuilder::new(client.id).lawyer(lawyer.id).insert(&app.store);

        let (status, body) = app
            .post(
                &format!("/api/v1/cases/{}/communications", case.id),
                &lawyer,
                json!({
                    "communication_type": "meeting",
                    "subject": "Strategy review",
                    "participants": [lawyer.id, client_user.id],
                    "scheduled_for": "2024-06-03T10:00:00Z",
                    "duration_minutes": 60
                }),
            )
            .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["communication"]["subject"], "Strategy review");
        assert_eq!(body["calendar_event"]["title"], "Meeting: Strategy review");
        assert_eq!(body["calendar_event"]["end_time"], "2024-06-03T11:00:00Z");

        let notifications = app.store.notifications();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].user_id, client_user.id);
        assert_eq!(notifications[0].notification_type, NotificationType::Calendar);

        let (_, events) = app.get("/api/v1/calendar/my", &client_user).await;
        assert_eq!(events.as_array().unwrap().len(), 1);
        assert_eq!(events[0]["type"], "meeting");
        assert_eq!(events[0]["case"], case.title);
    }

    #[tokio::test]
    async fn test_email_creates_no_event() {
        let app = TestApp::new();
        let lawyer = UserBuilder::lawyer().insert(&app.store);
        let (_, client) = client_with_user(&app.store, "Ivan", "Sokolov");
        let case = CaseBuilder::new(client.id).insert(&app.store);

        let (status, body) = app
            .post(
                &format!("/api/v1/cases/{}/communications", case.id),
                &lawyer,
                json!({
                    "communication_type": "email",
                    "subject": "Documents sent",
                    "scheduled_for": "2024-06-03T10:00:00Z"
                }),
            )
            .await;

        assert_eq!(status, StatusCode::CREATED);
        assert!(body["calendar_event"].is_null());
        assert!(app.store.events().is_empty());
    }

    #[tokio::test]
    async fn test_communication_validation() {
        let app = TestApp::new();
        let lawyer = UserBuilder::lawyer().insert(&app.store);
        let (_, client) = client_with_user(&app.store, "Ivan", "Sokolov");
        let case = CaseBuilder::new(client.id).insert(&app.store);
        let uri = format!("/api/v1/cases/{}/communications", case.id);

        let (status, body) = app
            .post(&uri, &lawyer, json!({"communication_type": "phone", "subject": " ", "duration_minutes": 0}))
            .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["details"]["subject"].is_array());
        assert!(body["details"]["duration_minutes"].is_array());

        let (status, _) = app
            .post(&uri, &lawyer, json!({"communication_type": "fax", "subject": "Hello"}))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_payment_create_and_validation() {
        let app = TestApp::new();
        let manager = UserBuilder::manager().insert(&app.store);
        let (client_user, client) = client_with_user(&app.store, "Ivan", "Sokolov");
        let case = CaseBuilder::new(client.id).insert(&app.store);
        let uri = format!("/api/v1/cases/{}/payments", case.id);

        let (status, body) = app
            .post(
                &uri,
                &manager,
                json!({
                    "amount": "750.00",
                    "payment_type": "advance",
                    "payment_date": "2024-04-01",
                    "is_paid": true,
                    "paid_date": "2024-04-02"
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(decimal(&body["amount"]), dec("750"));

        let (status, body) = app
            .post(
                &uri,
                &manager,
                json!({
                    "amount": "-5",
                    "payment_type": "final",
                    "payment_date": "2024-04-01",
                    "paid_date": "2024-04-02"
                }),
            )
            .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["details"]["amount"].is_array());
        assert!(body["details"]["paid_date"].is_array());

        let (status, _) = app
            .post(
                &uri,
                &client_user,
                json!({"amount": "10", "payment_type": "final", "payment_date": "2024-04-01"}),
            )
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_time_entry_rules() {
        let app = TestApp::new();
        let lawyer = UserBuilder::lawyer().insert(&app.store);
        let colleague = UserBuilder::lawyer().insert(&app.store);
        let (_, client) = client_with_user(&app.store, "Ivan", "Sokolov");
        let case = CaseBuilder::new(client.id).insert(&app.store);
        let uri = format!("/api/v1/cases/{}/time-entries", case.id);

        let (status, body) = app
            .post(
                &uri,
                &lawyer,
                json!({
                    "description": "Drafting the claim",
                    "start_time": "2024-04-01T09:00:00Z",
                    "end_time": "2024-04-01T11:30:00Z",
                    "duration": "2.5"
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["lawyer_id"], lawyer.id.to_string());
        assert_eq!(body["billable"], true);

        let (status, _) = app
            .post(
                &uri,
                &lawyer,
                json!({
                    "lawyer_id": colleague.id,
                    "description": "Research",
                    "start_time": "2024-04-01T09:00:00Z",
                    "duration": "1"
                }),
            )
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = app
            .post(
                &uri,
                &lawyer,
                json!({
                    "description": "Research",
                    "start_time": "2024-04-01T09:00:00Z",
                    "end_time": "2024-04-01T08:00:00Z",
                    "duration": "1",
                    "billable": false,
                    "billed": true
                }),
            )
            .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["details"]["end_time"].is_array());
        assert!(body["details"]["billed"].is_array());
    }

    #[tokio::test]
    async fn test_meeting_ending_past_calendar_limit_is_rejected() {
        let app = TestApp::new();
        let lawyer = UserBuilder::lawyer().insert(&app.store);
        let (_, client) = client_with_user(&app.store, "Ivan", "Sokolov");
        let case = CaseBuilder::new(client.id).insert(&app.store);

        let (status, _) = app
            .post(
                &format!("/api/v1/cases/{}/communications", case.id),
                &lawyer,
                json!({
                    "communication_type": "meeting",
                    "subject": "Far future",
                    "scheduled_for": "+262142-12-31T23:59:00Z"
                }),
            )
            .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(app.store.events().is_empty());
    }
}
