// Job Scheduler - runs the periodic jobs and keeps their execution log

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use tokio_cron_scheduler::{Job, JobScheduler as TokioScheduler, JobSchedulerError};
use tracing::{error, info};
use uuid::Uuid;

use super::{send_task_reminders, MaintenanceJobs};
use crate::config::JobConfig;
use crate::services::NotificationSink;
use crate::store::{LegalStore, StoreError};

const MAX_EXECUTION_LOGS: usize = 100;

#[derive(Error, Debug)]
pub enum JobError {
    #[error("Scheduler error: {0}")]
    SchedulerError(#[from] JobSchedulerError),
    #[error("Store error: {0}")]
    StoreError(#[from] StoreError),
    #[error("Job execution error: {0}")]
    ExecutionError(String),
    #[error("Unknown job: {0}")]
    UnknownJob(String),
}

pub type JobResult<T> = Result<T, JobError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    TaskReminders,
    AnalyticsSnapshot,
    NotificationCleanup,
}

impl JobKind {
    pub const ALL: [JobKind; 3] = [
        JobKind::TaskReminders,
        JobKind::AnalyticsSnapshot,
        JobKind::NotificationCleanup,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            JobKind::TaskReminders => "task_reminders",
            JobKind::AnalyticsSnapshot => "analytics_snapshot",
            JobKind::NotificationCleanup => "notification_cleanup",
        }
    }

    pub fn cron<'a>(&self, config: &'a JobConfig) -> &'a str {
        match self {
            JobKind::TaskReminders => &config.task_reminder_cron,
            JobKind::AnalyticsSnapshot => &config.analytics_snapshot_cron,
            JobKind::NotificationCleanup => &config.notification_cleanup_cron,
        }
    }
}

impl FromStr for JobKind {
    type Err = JobError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        JobKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| JobError::UnknownJob(s.to_string()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobExecutionLog {
    pub id: Uuid,
    pub job_name: String,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub status: JobStatus,
    pub items_processed: i64,
    pub errors: Vec<String>,
    pub duration_ms: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum JobStatus {
    Completed,
    Failed,
}

/// Executes jobs on demand and records every run.
pub struct JobRunner {
    store: Arc<dyn LegalStore>,
    sink: Arc<dyn NotificationSink>,
    config: JobConfig,
    execution_logs: Arc<RwLock<Vec<JobExecutionLog>>>,
}

impl JobRunner {
    pub fn new(store: Arc<dyn LegalStore>, sink: Arc<dyn NotificationSink>, config: JobConfig) -> Self {
        Self {
            store,
            sink,
            config,
            execution_logs: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub fn config(&self) -> &JobConfig {
        &self.config
    }

    pub async fn get_execution_logs(&self) -> Vec<JobExecutionLog> {
        self.execution_logs.read().await.clone()
    }

    async fn execute(&self, kind: JobKind, now: DateTime<Utc>) -> JobResult<i64> {
        let store = self.store.as_ref();
        match kind {
            JobKind::TaskReminders => {
                let tasks = send_task_reminders(
                    store,
                    self.sink.as_ref(),
                    now,
                    self.config.reminder_window_hours,
                )
                .await?;
                Ok(tasks as i64)
            }
            JobKind::AnalyticsSnapshot => {
                MaintenanceJobs::snapshot_previous_day(store, now)
                    .await
                    .map_err(|e| JobError::ExecutionError(e.to_string()))?;
                Ok(1)
            }
            JobKind::NotificationCleanup => {
                let deleted = MaintenanceJobs::cleanup_notifications(
                    store,
                    now,
                    self.config.notification_retention_days,
                )
                .await?;
                Ok(deleted as i64)
            }
        }
    }

    /// Run `kind` once and append the outcome to the execution log.
    /// Failures are reported through the log's status and errors.
    pub async fn run(&self, kind: JobKind) -> JobExecutionLog {
        let started_at = Utc::now();
        info!("Running {} job", kind.as_str());

        let outcome = self.execute(kind, started_at).await;
        let completed_at = Utc::now();

        let mut log = JobExecutionLog {
            id: Uuid::new_v4(),
            job_name: kind.as_str().to_string(),
            started_at,
            completed_at: Some(completed_at),
            status: JobStatus::Completed,
            items_processed: 0,
            errors: Vec::new(),
            duration_ms: Some((completed_at - started_at).num_milliseconds()),
        };

        match outcome {
            Ok(items) => {
                log.items_processed = items;
                info!("{} job completed: {} items processed", kind.as_str(), items);
            }
            Err(e) => {
                log.status = JobStatus::Failed;
                log.errors.push(e.to_string());
                error!("{} job failed: {}", kind.as_str(), e);
            }
        }

        {
            let mut logs = self.execution_logs.write().await;
            logs.push(log.clone());
            // Keep only the most recent runs
            if logs.len() > MAX_EXECUTION_LOGS {
                let excess = logs.len() - MAX_EXECUTION_LOGS;
                logs.drain(..excess);
            }
        }

        log
    }
}

pub struct JobScheduler {
    scheduler: TokioScheduler,
    runner: Arc<JobRunner>,
}

impl JobScheduler {
    pub async fn new(runner: Arc<JobRunner>) -> JobResult<Self> {
        let scheduler = TokioScheduler::new().await?;
        Ok(Self { scheduler, runner })
    }

    pub async fn start(&self) -> JobResult<()> {
        info!("Starting background job scheduler");

        for kind in JobKind::ALL {
            self.schedule(kind).await?;
        }

        self.scheduler.start().await?;

        info!("Background job scheduler started successfully");
        Ok(())
    }

    pub async fn shutdown(&mut self) -> JobResult<()> {
        info!("Shutting down background job scheduler");
        self.scheduler.shutdown().await?;
        Ok(())
    }

    async fn schedule(&self, kind: JobKind) -> JobResult<()> {
        let cron_expr = kind.cron(self.runner.config()).to_string();
        let runner = self.runner.clone();

        let job = Job::new_async(cron_expr.as_str(), move |_uuid, _lock| {
            let runner = runner.clone();

            Box::pin(async move {
                runner.run(kind).await;
            })
        })?;

        self.scheduler.add(job).await?;
        info!("Scheduled {} job with cron '{}'", kind.as_str(), cron_expr);

        Ok(())
    }
}
