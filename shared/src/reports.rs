//! Report shapes produced by the backend and consumed by any rendering layer.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    CaseStage, CaseType, CommunicationType, DocumentCategory, EventType, PaymentType, Period,
    TaskPriority, TaskStatus,
};

// ==================== Analytics ====================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsReport {
    pub period: Period,
    pub date_from: DateTime<Utc>,
    pub date_to: DateTime<Utc>,

    pub total_revenue: Decimal,
    pub total_expenses: Decimal,
    pub total_profit: Decimal,
    pub profit_margin: Decimal, // percent, 1 dp

    pub active_cases: i64,
    pub new_clients: i64,
    pub avg_case_duration: Decimal, // days
    pub case_success_rate: Decimal, // percent, 1 dp

    pub lawyer_productivity: Vec<LawyerProductivity>,
    pub case_type_distribution: Vec<CaseTypeShare>,
    pub stage_distribution: Vec<StageShare>,
    pub revenue_by_month: Vec<RevenueBucket>,
    pub top_clients: Vec<TopClient>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LawyerProductivity {
    pub lawyer_id: Uuid,
    pub name: String,
    pub cases_count: i64,
    pub revenue: Decimal,
    pub worked_hours: Decimal,
    pub efficiency: Decimal, // revenue per worked hour
    pub success_rate: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseTypeShare {
    pub case_type: CaseType,
    pub count: i64,
    pub percentage: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageShare {
    pub stage: CaseStage,
    pub count: i64,
    pub percentage: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevenueBucket {
    pub label: String,
    pub revenue: Decimal,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopClient {
    pub client_id: Uuid,
    pub name: String,
    pub revenue: Decimal,
    pub cases_count: i64,
}

/// Persisted daily roll-up of an analytics report.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsSnapshot {
    pub id: Uuid,
    pub period: Period,
    pub period_date: NaiveDate,
    pub total_revenue: Decimal,
    pub total_expenses: Decimal,
    pub total_profit: Decimal,
    pub active_cases: i64,
    pub new_clients: i64,
    pub lawyer_performance: serde_json::Value,
    pub case_type_distribution: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

// ==================== Bonus ====================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BonusResult {
    pub lawyer_id: Uuid,
    pub lawyer_name: String,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub revenue: Decimal,
    pub hours_worked: Decimal,
    pub hourly_rate: Decimal,
    pub total_cases: i64,
    pub closed_cases: i64,
    pub success_rate: Decimal,
    pub efficiency: Decimal,
    pub base_bonus: Decimal,
    pub success_bonus: Decimal,
    pub total_bonus: Decimal,
}

// ==================== Case report ====================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseReport {
    pub case: CaseSummary,
    pub communications: Vec<CommunicationEntry>,
    pub documents: Vec<DocumentEntry>,
    pub tasks: Vec<TaskEntry>,
    pub payments: Vec<PaymentEntry>,
    pub time_entries: Vec<TimeEntryLine>,
    pub calendar_events: Vec<EventEntry>,
    pub statistics: CaseStatistics,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseSummary {
    pub id: Uuid,
    pub case_number: String,
    pub title: String,
    pub client_name: String,
    pub lawyer_name: String,
    pub case_type: CaseType,
    pub case_type_label: String,
    pub stage: CaseStage,
    pub stage_label: String,
    pub start_date: String,
    pub end_date: Option<String>,
    pub budget: Decimal,
    pub actual_cost: Decimal,
    pub success_probability: i32,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommunicationEntry {
    pub id: Uuid,
    pub communication_type: CommunicationType,
    pub type_label: String,
    pub subject: String,
    pub content: String,
    pub scheduled_for: Option<String>,
    pub duration_minutes: Option<i32>,
    pub created_by: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentEntry {
    pub id: Uuid,
    pub title: String,
    pub category: DocumentCategory,
    pub category_label: String,
    pub version: i32,
    pub is_signed: bool,
    pub uploaded_by: String,
    pub uploaded_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskEntry {
    pub id: Uuid,
    pub title: String,
    pub status: TaskStatus,
    pub status_label: String,
    pub priority: TaskPriority,
    pub priority_label: String,
    pub assigned_to: String,
    pub due_date: String,
    pub completed_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentEntry {
    pub id: Uuid,
    pub amount: Decimal,
    pub payment_type: PaymentType,
    pub type_label: String,
    pub payment_date: String,
    pub is_paid: bool,
    pub paid_date: Option<String>,
    pub invoice_number: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeEntryLine {
    pub id: Uuid,
    pub lawyer: String,
    pub description: String,
    pub start_time: String,
    pub duration: Decimal,
    pub billable: bool,
    pub billed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEntry {
    pub id: Uuid,
    pub title: String,
    pub event_type: EventType,
    pub type_label: String,
    pub start_time: String,
    pub end_time: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseStatistics {
    pub total_paid: Decimal,
    pub remaining_budget: Decimal, // may be negative
    pub total_hours_spent: Decimal,
    pub documents_count: i64,
    pub tasks_completed: i64,
    pub tasks_pending: i64,
}
