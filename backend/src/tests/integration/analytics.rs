// Analytics, bonus and snapshot endpoints

use axum::http::StatusCode;
use rust_decimal::Decimal;

use crate::tests::fixtures::*;
use crate::tests::helpers::*;

#[cfg(test)]
mod analytics_endpoint_tests {
    use super::*;

    #[tokio::test]
    async fn test_report_requires_staff() {
        let app = TestApp::new();
        let lawyer = UserBuilder::lawyer().insert(&app.store);
        let (client_user, _) = client_with_user(&app.store, "Olga", "Smirnova");

        let (status, _) = app.get("/api/v1/analytics", &lawyer).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let (status, _) = app.get("/api/v1/analytics", &client_user).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_report_for_explicit_range() {
        let app = TestApp::new();
        let admin = UserBuilder::admin().insert(&app.store);
        let (_, client) = client_with_user(&app.store, "Olga", "Smirnova");
        let case = CaseBuilder::new(client.id).created_at(at(2024, 5, 2, 9)).insert(&app.store);
        PaymentBuilder::paid(case.id, dec("1200"), date(2024, 5, 10)).insert(&app.store);
        PaymentBuilder::paid(case.id, dec("999"), date(2024, 7, 1)).insert(&app.store);

        let (status, body) = app
            .get(
                "/api/v1/analytics?period=quarter&date_from=2024-05-01T00:00:00Z&date_to=2024-05-31T23:59:59Z",
                &admin,
            )
            .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["period"], "quarter");
        assert_eq!(decimal(&body["total_revenue"]), dec("1200"));
        assert_eq!(body["top_clients"][0]["name"], "Olga Smirnova");
    }

    #[tokio::test]
    async fn test_unknown_period_is_bad_request() {
        let app = TestApp::new();
        let manager = UserBuilder::manager().insert(&app.store);

        let (status, body) = app.get("/api/v1/analytics?period=fortnight", &manager).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn test_inverted_range_is_unprocessable() {
        let app = TestApp::new();
        let admin = UserBuilder::admin().insert(&app.store);

        let (status, _) = app
            .get(
                "/api/v1/analytics?date_from=2024-06-01T00:00:00Z&date_to=2024-05-01T00:00:00Z",
                &admin,
            )
            .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_lawyer_sees_own_bonus_only() {
        let app = TestApp::new();
        let lawyer = UserBuilder::lawyer().insert(&app.store);
        let colleague = UserBuilder::lawyer().insert(&app.store);

        let (status, body) = app
            .get(
                &format!(
                    "/api/v1/analytics/bonus/{}?period_start=2024-01-01&period_end=2024-01-31",
                    lawyer.id
                ),
                &lawyer,
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(decimal(&body["total_bonus"]), Decimal::ZERO);
        assert_eq!(body["period_start"], "2024-01-01");

        let (status, _) = app
            .get(&format!("/api/v1/analytics/bonus/{}", colleague.id), &lawyer)
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_snapshots_listed_after_job_run() {
        let app = TestApp::new();
        let admin = UserBuilder::admin().insert(&app.store);

        let (status, _) = app
            .post("/api/v1/jobs/analytics_snapshot/run", &admin, serde_json::json!({}))
            .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = app.get("/api/v1/analytics/snapshots?period=day", &admin).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["period"], "day");

        let (_, body) = app.get("/api/v1/analytics/snapshots?period=week", &admin).await;
        assert!(body.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_bonus_period_past_calendar_limit_is_unprocessable() {
        let app = TestApp::new();
        let lawyer = UserBuilder::lawyer().insert(&app.store);

        let (status, body) = app
            .get(
                &format!(
                    "/api/v1/analytics/bonus/{}?period_start=2024-01-01&period_end=%2B262142-12-31",
                    lawyer.id
                ),
                &lawyer,
            )
            .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["details"]["period_end"].is_array());
    }
}
