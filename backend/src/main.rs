use axum::{
    http::Method,
    routing::get,
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

use lexdesk_shared::LabelCatalog;

mod auth;
mod config;
mod database;
mod error;
mod handlers;
mod jobs;
mod notifications;
mod pagination;
mod services;
mod store;

pub use pagination::{PaginatedResponse, PaginationParams};


use jobs::{JobRunner, JobScheduler};
use services::{NotificationSink, StoreNotificationSink};
use store::{LegalStore, PgStore};

pub struct AppState {
    pub store: Arc<dyn LegalStore>,
    pub sink: Arc<dyn NotificationSink>,
    pub labels: Arc<LabelCatalog>,
    pub jwt_secret: String,
    pub jobs: Arc<JobRunner>,
}

pub fn app_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    Router::new()
        .route("/", get(|| async { "Lexdesk Legal Practice API v1.0.0" }))
        .route("/health", get(handlers::health_check))
        .route("/api/v1/dashboard", get(handlers::dashboard_stats))
        .nest("/api/v1/cases", handlers::case_routes())
        .nest("/api/v1/tasks", handlers::task_routes())
        .nest("/api/v1/calendar", handlers::calendar_routes())
        .nest("/api/v1/analytics", handlers::analytics_routes())
        .nest("/api/v1/notifications", notifications::notification_routes())
        .nest("/api/v1/jobs", handlers::job_routes())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

/// `issue-token <user-id>`: print a bearer token for an existing active user.
async fn issue_token(store: &dyn LegalStore, secret: &str, user_id: &str) -> anyhow::Result<()> {
    let user_id: Uuid = user_id.parse()?;
    let user = store
        .get_user(user_id)
        .await?
        .filter(|user| user.is_active)
        .ok_or_else(|| anyhow::anyhow!("User {} not found or inactive", user_id))?;

    let issued = auth::jwt::create_jwt(&user, secret)?;
    println!("{}", issued.token);
    tracing::info!("Issued token for {} valid until {}", user.username, issued.expires_at);
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutting down...");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = config::Config::from_env()?;
    let db_pool = database::create_pool(&config.database_url, &config.pool).await?;

    database::migrate(&db_pool).await?;

    let store: Arc<dyn LegalStore> = Arc::new(PgStore::new(db_pool));

    let args: Vec<String> = std::env::args().collect();
    if let [_, command, user_id] = args.as_slice() {
        if command == "issue-token" {
            return issue_token(store.as_ref(), &config.jwt_secret, user_id).await;
        }
    }

    let sink: Arc<dyn NotificationSink> = Arc::new(StoreNotificationSink::new(store.clone()));
    let runner = Arc::new(JobRunner::new(store.clone(), sink.clone(), config.jobs.clone()));

    let mut scheduler = if config.jobs.enabled {
        let scheduler = JobScheduler::new(runner.clone()).await?;
        scheduler.start().await?;
        Some(scheduler)
    } else {
        tracing::info!("Background jobs disabled");
        None
    };

    let app_state = Arc::new(AppState {
        store,
        sink,
        labels: Arc::new(LabelCatalog::for_locale(&config.label_locale)),
        jwt_secret: config.jwt_secret.clone(),
        jobs: runner,
    });

    let app = app_router(app_state);

    let listener = tokio::net::TcpListener::bind(&config.server_addr).await?;
    tracing::info!("Server running on {}", config.server_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(scheduler) = scheduler.as_mut() {
        scheduler.shutdown().await?;
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
