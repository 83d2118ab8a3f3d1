use chrono::{DateTime, Utc, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use rust_decimal::Decimal;

pub mod labels;
pub mod reports;

pub use labels::LabelCatalog;
pub use reports::*;

/// Raised when a stored machine value does not name any variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} value '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

/// Declares a closed choice enum stored as its snake_case machine value.
///
/// Every enum gets `as_str`, `FromStr`, `Display`, an `ALL` table in
/// declaration order and, with the `sqlx` feature, Postgres `TEXT` mapping.
macro_rules! choice_enum {
    (
        $(#[$meta:meta])*
        $name:ident : $kind:literal {
            $($variant:ident => $value:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const KIND: &'static str = $kind;
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $value),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($value => Ok($name::$variant),)+
                    other => Err(UnknownVariant {
                        kind: $kind,
                        value: other.to_string(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        #[cfg(feature = "sqlx")]
        impl sqlx::Type<sqlx::Postgres> for $name {
            fn type_info() -> sqlx::postgres::PgTypeInfo {
                <str as sqlx::Type<sqlx::Postgres>>::type_info()
            }

            fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
                <str as sqlx::Type<sqlx::Postgres>>::compatible(ty)
            }
        }

        #[cfg(feature = "sqlx")]
        impl<'r> sqlx::Decode<'r, sqlx::Postgres> for $name {
            fn decode(
                value: sqlx::postgres::PgValueRef<'r>,
            ) -> Result<Self, sqlx::error::BoxDynError> {
                let raw = <&str as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
                Ok(raw.parse::<$name>()?)
            }
        }

        #[cfg(feature = "sqlx")]
        impl<'q> sqlx::Encode<'q, sqlx::Postgres> for $name {
            fn encode_by_ref(
                &self,
                buf: &mut sqlx::postgres::PgArgumentBuffer,
            ) -> sqlx::encode::IsNull {
                <&str as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.as_str(), buf)
            }
        }
    };
}

// ==================== Choice enums ====================

choice_enum! {
    UserRole: "user_role" {
        Admin => "admin",
        Manager => "manager",
        Lawyer => "lawyer",
        Client => "client",
    }
}

impl UserRole {
    /// Admins and managers see firm-wide analytics.
    pub fn is_staff_manager(&self) -> bool {
        matches!(self, UserRole::Admin | UserRole::Manager)
    }
}

choice_enum! {
    ClientStatus: "client_status" {
        New => "new",
        Active => "active",
        Closed => "closed",
        Lost => "lost",
    }
}

choice_enum! {
    CaseType: "case_type" {
        Civil => "civil",
        Criminal => "criminal",
        Administrative => "administrative",
        Arbitration => "arbitration",
        Consultation => "consultation",
    }
}

choice_enum! {
    /// Lifecycle position of a case, in lifecycle order.
    CaseStage: "case_stage" {
        Consultation => "consultation",
        Analysis => "analysis",
        Negotiation => "negotiation",
        Lawsuit => "lawsuit",
        Court => "court",
        Decision => "decision",
        Execution => "execution",
        Closed => "closed",
    }
}

impl CaseStage {
    /// Stages before a court decision has been handed down.
    pub const IN_PROGRESS: &'static [CaseStage] = &[
        CaseStage::Consultation,
        CaseStage::Analysis,
        CaseStage::Negotiation,
        CaseStage::Lawsuit,
        CaseStage::Court,
    ];

    pub fn is_resolved(&self) -> bool {
        *self == CaseStage::Closed
    }
}

choice_enum! {
    TaskPriority: "task_priority" {
        Low => "low",
        Medium => "medium",
        High => "high",
        Urgent => "urgent",
    }
}

choice_enum! {
    TaskStatus: "task_status" {
        Todo => "todo",
        InProgress => "in_progress",
        Review => "review",
        Done => "done",
    }
}

impl TaskStatus {
    pub const OPEN: &'static [TaskStatus] = &[TaskStatus::Todo, TaskStatus::InProgress];

    pub fn is_open(&self) -> bool {
        Self::OPEN.contains(self)
    }
}

choice_enum! {
    CommunicationType: "communication_type" {
        Email => "email",
        Phone => "phone",
        Meeting => "meeting",
        Message => "message",
        Document => "document",
    }
}

impl CommunicationType {
    /// Only calls and meetings occupy a slot in the calendar.
    pub fn is_schedulable(&self) -> bool {
        matches!(self, CommunicationType::Meeting | CommunicationType::Phone)
    }
}

choice_enum! {
    DocumentCategory: "document_category" {
        Contract => "contract",
        Lawsuit => "lawsuit",
        Protocol => "protocol",
        Expertise => "expertise",
        Decision => "decision",
        Other => "other",
    }
}

choice_enum! {
    EventType: "event_type" {
        Meeting => "meeting",
        CourtHearing => "court_hearing",
        Deadline => "deadline",
        Reminder => "reminder",
        Task => "task",
    }
}

choice_enum! {
    PaymentType: "payment_type" {
        Advance => "advance",
        Installment => "installment",
        Final => "final",
        Additional => "additional",
    }
}

choice_enum! {
    NotificationType: "notification_type" {
        Info => "info",
        Warning => "warning",
        Success => "success",
        Error => "error",
        Reminder => "reminder",
        Calendar => "calendar",
        Task => "task",
        Case => "case",
        Payment => "payment",
    }
}

choice_enum! {
    /// Reporting window for analytics.
    Period: "period" {
        Day => "day",
        Week => "week",
        Month => "month",
        Quarter => "quarter",
        Year => "year",
    }
}

impl Period {
    /// Look-back window used when no explicit start date is given.
    pub fn window_days(&self) -> i64 {
        match self {
            Period::Day => 1,
            Period::Week => 7,
            Period::Month => 30,
            Period::Quarter => 90,
            Period::Year => 365,
        }
    }

    /// Month and longer periods report revenue per calendar month.
    pub fn uses_calendar_months(&self) -> bool {
        matches!(self, Period::Month | Period::Quarter | Period::Year)
    }
}

// ==================== Entities ====================

#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
    pub phone: Option<String>,
    pub specialization: Option<String>,
    pub hourly_rate: Decimal,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// "First Last", falling back to the username when both are blank.
    pub fn full_name(&self) -> String {
        let name = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let name = name.trim();
        if name.is_empty() {
            self.username.clone()
        } else {
            name.to_string()
        }
    }

    pub fn is_lawyer(&self) -> bool {
        self.role == UserRole::Lawyer
    }
}

#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    pub id: Uuid,
    pub user_id: Uuid,
    pub company_name: Option<String>,
    pub inn: Option<String>,
    pub address: Option<String>,
    pub status: ClientStatus,
    pub source: Option<String>,
    pub notes: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Case {
    pub id: Uuid,
    pub case_number: String,
    pub title: String,
    pub client_id: Uuid,
    pub lawyer_id: Option<Uuid>,
    pub case_type: CaseType,
    pub stage: CaseStage,
    pub description: String,
    pub budget: Decimal,
    pub actual_cost: Decimal,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub success_probability: i32, // 0..=100
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub case_id: Option<Uuid>,
    pub assigned_to: Uuid,
    pub assigned_by: Option<Uuid>,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    pub due_date: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub estimated_hours: Decimal,
    pub actual_hours: Decimal,
    pub created_at: DateTime<Utc>,
}

#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Communication {
    pub id: Uuid,
    pub case_id: Uuid,
    pub communication_type: CommunicationType,
    pub subject: String,
    pub content: String,
    pub participants: Vec<Uuid>,
    pub scheduled_for: Option<DateTime<Utc>>,
    pub duration_minutes: Option<i32>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: Uuid,
    pub case_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub category: DocumentCategory,
    pub file_path: String,
    pub uploaded_by: Uuid,
    pub uploaded_at: DateTime<Utc>,
    pub version: i32,
    pub is_signed: bool,
    pub signed_at: Option<DateTime<Utc>>,
}

#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: Uuid,
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
    pub created_at: DateTime<Utc>,
}

/// Default widget colour for new calendar events.
pub const DEFAULT_EVENT_COLOR: &str = "#3788d8";

#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeEntry {
    pub id: Uuid,
    pub lawyer_id: Uuid,
    pub case_id: Uuid,
    pub task_id: Option<Uuid>,
    pub description: String,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub duration: Decimal, // hours
    pub billable: bool,
    pub billed: bool,
    pub created_at: DateTime<Utc>,
}

#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub id: Uuid,
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
    pub created_at: DateTime<Utc>,
}

#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub message: String,
    pub notification_type: NotificationType,
    pub is_read: bool,
    pub related_object_id: Option<Uuid>,
    pub related_object_type: Option<String>, // calendar_event, task, case, payment
    pub created_at: DateTime<Utc>,
    pub read_at: Option<DateTime<Utc>>,
}
