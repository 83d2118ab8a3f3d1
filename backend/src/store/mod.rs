//! Data store accessor
//!
//! Every read the analytics and report services need is expressed as a
//! filter-driven query or aggregate on `LegalStore`, so the services stay
//! independent of the storage engine. `PgStore` backs the running service.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use std::collections::HashMap;
use uuid::Uuid;

use lexdesk_shared::{
    AnalyticsSnapshot, CalendarEvent, Case, CaseStage, CaseType, Client, Communication,
    CommunicationType, Document, EventType, Notification, NotificationType, Payment, PaymentType,
    Period, Task, TaskPriority, TaskStatus, TimeEntry, User,
};

pub mod postgres;

#[cfg(test)]
pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(String),
    #[error("Invalid data: {0}")]
    Invalid(String),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

// ==================== Filters ====================

/// Case selection; `None` fields do not constrain.
#[derive(Debug, Clone, Default)]
pub struct CaseFilter {
    pub lawyer_id: Option<Uuid>,
    pub client_id: Option<Uuid>,
    pub is_active: Option<bool>,
    pub stage: Option<CaseStage>,
    pub case_type: Option<CaseType>,
    /// Inclusive lower bound on `created_at`
    pub created_from: Option<DateTime<Utc>>,
    /// Inclusive upper bound on `created_at`
    pub created_to: Option<DateTime<Utc>>,
    /// Case-insensitive match on title, case number or client name
    pub search: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct PaymentFilter {
    pub case_id: Option<Uuid>,
    /// Payments on cases assigned to this lawyer
    pub lawyer_id: Option<Uuid>,
    pub is_paid: Option<bool>,
    /// Inclusive bounds on `payment_date`
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

impl PaymentFilter {
    /// Paid payments with a payment date inside `[from, to]`.
    pub fn paid_between(from: NaiveDate, to: NaiveDate) -> Self {
        Self {
            is_paid: Some(true),
            date_from: Some(from),
            date_to: Some(to),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TimeEntryFilter {
    pub case_id: Option<Uuid>,
    pub lawyer_id: Option<Uuid>,
    pub billable: Option<bool>,
    /// Inclusive bounds on `start_time`
    pub started_from: Option<DateTime<Utc>>,
    pub started_to: Option<DateTime<Utc>>,
}

/// Task selection; results are ordered by `due_date` ascending.
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    pub case_id: Option<Uuid>,
    pub assigned_to: Option<Uuid>,
    /// Empty means any status
    pub statuses: Vec<TaskStatus>,
    pub due_from: Option<DateTime<Utc>>,
    pub due_to: Option<DateTime<Utc>>,
    pub limit: Option<i64>,
}

/// Calendar event selection; results are ordered by `start_time` ascending.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    pub case_id: Option<Uuid>,
    /// Events this user participates in
    pub participant: Option<Uuid>,
    /// Events this user participates in or created
    pub involving: Option<Uuid>,
    pub start_from: Option<DateTime<Utc>>,
    pub start_to: Option<DateTime<Utc>>,
    pub end_to: Option<DateTime<Utc>>,
}

// ==================== Aggregate rows ====================

/// Paid revenue attributed to one client.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientRevenue {
    pub client_id: Uuid,
    pub client_name: String,
    pub revenue: Decimal,
    /// All cases of the client, regardless of the payment filter
    pub cases_count: i64,
}

// ==================== Inputs ====================

#[derive(Debug, Clone)]
pub struct NewCommunication {
    pub case_id: Uuid,
    pub communication_type: CommunicationType,
    pub subject: String,
    pub content: String,
    pub participants: Vec<Uuid>,
    pub scheduled_for: Option<DateTime<Utc>>,
    pub duration_minutes: Option<i32>,
    pub created_by: Uuid,
}

#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub case_id: Option<Uuid>,
    pub assigned_to: Uuid,
    pub assigned_by: Option<Uuid>,
    pub priority: TaskPriority,
    pub due_date: DateTime<Utc>,
    pub estimated_hours: Decimal,
}

#[derive(Debug, Clone)]
pub struct NewPayment {
    pub case_id: Uuid,
    pub amount: Decimal,
    pub payment_type: PaymentType,
    pub payment_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub is_paid: bool,
    pub paid_date: Option<NaiveDate>,
    pub payment_method: Option<String>,
    pub invoice_number: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewTimeEntry {
    pub lawyer_id: Uuid,
    pub case_id: Uuid,
    pub task_id: Option<Uuid>,
    pub description: String,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub duration: Decimal,
    pub billable: bool,
    pub billed: bool,
}

#[derive(Debug, Clone)]
pub struct NewCalendarEvent {
    pub title: String,
    pub description: String,
    pub event_type: EventType,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub case_id: Option<Uuid>,
    pub task_id: Option<Uuid>,
    pub participants: Vec<Uuid>,
    pub location: Option<String>,
    pub is_all_day: bool,
    pub color: String,
    pub created_by: Uuid,
}

#[derive(Debug, Clone)]
pub struct NewNotification {
    pub user_id: Uuid,
    pub title: String,
    pub message: String,
    pub notification_type: NotificationType,
    pub related_object_id: Option<Uuid>,
    pub related_object_type: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewSnapshot {
    pub period: Period,
    pub period_date: NaiveDate,
    pub total_revenue: Decimal,
    pub total_expenses: Decimal,
    pub total_profit: Decimal,
    pub active_cases: i64,
    pub new_clients: i64,
    pub lawyer_performance: serde_json::Value,
    pub case_type_distribution: serde_json::Value,
}

// ==================== Port ====================

#[async_trait]
pub trait LegalStore: Send + Sync {
    async fn ping(&self) -> StoreResult<()>;

    // --- Users & clients ---
    async fn get_user(&self, id: Uuid) -> StoreResult<Option<User>>;
    /// Full names for the given users; unknown ids are omitted.
    async fn user_names(&self, ids: &[Uuid]) -> StoreResult<HashMap<Uuid, String>>;
    async fn active_lawyers(&self) -> StoreResult<Vec<User>>;
    async fn get_client(&self, id: Uuid) -> StoreResult<Option<Client>>;
    async fn client_for_user(&self, user_id: Uuid) -> StoreResult<Option<Client>>;
    async fn count_clients(
        &self,
        created_from: Option<DateTime<Utc>>,
        created_to: Option<DateTime<Utc>>,
    ) -> StoreResult<i64>;

    // --- Cases ---
    async fn get_case(&self, id: Uuid) -> StoreResult<Option<Case>>;
    /// Newest first.
    async fn list_cases(&self, filter: &CaseFilter, limit: i64, offset: i64)
        -> StoreResult<Vec<Case>>;
    async fn count_cases(&self, filter: &CaseFilter) -> StoreResult<i64>;
    /// Mean of `end_date - start_date` in days over matching cases that have an end date.
    async fn avg_case_duration_days(&self, filter: &CaseFilter) -> StoreResult<Option<Decimal>>;

    // --- Money & time ---
    async fn sum_payments(&self, filter: &PaymentFilter) -> StoreResult<Decimal>;
    async fn revenue_by_client(&self, filter: &PaymentFilter) -> StoreResult<Vec<ClientRevenue>>;
    async fn sum_hours(&self, filter: &TimeEntryFilter) -> StoreResult<Decimal>;
    /// Sum of `duration * lawyer.hourly_rate` over matching entries.
    async fn sum_labor_cost(&self, filter: &TimeEntryFilter) -> StoreResult<Decimal>;

    // --- Case activity ---
    async fn case_communications(&self, case_id: Uuid) -> StoreResult<Vec<Communication>>;
    async fn case_documents(&self, case_id: Uuid) -> StoreResult<Vec<Document>>;
    async fn case_payments(&self, case_id: Uuid) -> StoreResult<Vec<Payment>>;
    async fn case_time_entries(&self, case_id: Uuid) -> StoreResult<Vec<TimeEntry>>;
    async fn list_tasks(&self, filter: &TaskFilter) -> StoreResult<Vec<Task>>;
    async fn list_events(&self, filter: &EventFilter) -> StoreResult<Vec<CalendarEvent>>;

    // --- Writes ---
    async fn create_communication(&self, input: NewCommunication) -> StoreResult<Communication>;
    async fn create_task(&self, input: NewTask) -> StoreResult<Task>;
    /// Returns `None` when the task does not exist.
    async fn update_task_status(
        &self,
        id: Uuid,
        status: TaskStatus,
        completed_at: Option<DateTime<Utc>>,
    ) -> StoreResult<Option<Task>>;
    async fn create_payment(&self, input: NewPayment) -> StoreResult<Payment>;
    async fn create_time_entry(&self, input: NewTimeEntry) -> StoreResult<TimeEntry>;
    /// Persists the event together with its participant set.
    async fn create_calendar_event(&self, input: NewCalendarEvent) -> StoreResult<CalendarEvent>;

    // --- Notifications ---
    async fn create_notification(&self, input: NewNotification) -> StoreResult<Notification>;
    /// Newest first.
    async fn list_notifications(
        &self,
        user_id: Uuid,
        unread_only: bool,
        limit: i64,
        offset: i64,
    ) -> StoreResult<Vec<Notification>>;
    async fn count_notifications(&self, user_id: Uuid, unread_only: bool) -> StoreResult<i64>;
    async fn mark_notification_read(
        &self,
        id: Uuid,
        user_id: Uuid,
        at: DateTime<Utc>,
    ) -> StoreResult<bool>;
    async fn mark_all_notifications_read(&self, user_id: Uuid, at: DateTime<Utc>)
        -> StoreResult<u64>;
    async fn delete_notification(&self, id: Uuid, user_id: Uuid) -> StoreResult<bool>;
    /// Deletes read notifications created before `before`.
    async fn purge_read_notifications(&self, before: DateTime<Utc>) -> StoreResult<u64>;

    // --- Snapshots ---
    /// Inserts or replaces the snapshot for `(period, period_date)`.
    async fn upsert_snapshot(&self, input: NewSnapshot) -> StoreResult<AnalyticsSnapshot>;
    /// Most recent first.
    async fn list_snapshots(&self, period: Option<Period>, limit: i64)
        -> StoreResult<Vec<AnalyticsSnapshot>>;
}
