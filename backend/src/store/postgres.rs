use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

use lexdesk_shared::{
    AnalyticsSnapshot, CalendarEvent, Case, Client, Communication, Document, Notification,
    Payment, Period, Task, TaskStatus, TimeEntry, User, UserRole,
};

use super::{
    CaseFilter, ClientRevenue, EventFilter, LegalStore, NewCalendarEvent, NewCommunication,
    NewNotification, NewPayment, NewSnapshot, NewTask, NewTimeEntry, PaymentFilter, StoreResult,
    TaskFilter, TimeEntryFilter,
};

/// Case filter over alias `c`; binds `$1..=$8`.
const CASE_WHERE: &str = r#"
    ($1::uuid IS NULL OR c.lawyer_id = $1)
    AND ($2::uuid IS NULL OR c.client_id = $2)
    AND ($3::bool IS NULL OR c.is_active = $3)
    AND ($4::text IS NULL OR c.stage = $4)
    AND ($5::text IS NULL OR c.case_type = $5)
    AND ($6::timestamptz IS NULL OR c.created_at >= $6)
    AND ($7::timestamptz IS NULL OR c.created_at <= $7)
    AND ($8::text IS NULL
         OR c.title ILIKE '%' || $8 || '%'
         OR c.case_number ILIKE '%' || $8 || '%'
         OR EXISTS (
             SELECT 1 FROM clients cl JOIN users u ON u.id = cl.user_id
             WHERE cl.id = c.client_id
               AND (u.first_name ILIKE '%' || $8 || '%' OR u.last_name ILIKE '%' || $8 || '%')
         ))"#;

/// Payment filter over aliases `p` (payments) and `c` (cases); binds `$1..=$5`.
const PAYMENT_WHERE: &str = r#"
    ($1::uuid IS NULL OR p.case_id = $1)
    AND ($2::uuid IS NULL OR c.lawyer_id = $2)
    AND ($3::bool IS NULL OR p.is_paid = $3)
    AND ($4::date IS NULL OR p.payment_date >= $4)
    AND ($5::date IS NULL OR p.payment_date <= $5)"#;

/// Time entry filter over alias `te`; binds `$1..=$5`.
const TIME_ENTRY_WHERE: &str = r#"
    ($1::uuid IS NULL OR te.case_id = $1)
    AND ($2::uuid IS NULL OR te.lawyer_id = $2)
    AND ($3::bool IS NULL OR te.billable = $3)
    AND ($4::timestamptz IS NULL OR te.start_time >= $4)
    AND ($5::timestamptz IS NULL OR te.start_time <= $5)"#;

const COMMUNICATION_COLUMNS: &str = r#"
    c.id, c.case_id, c.communication_type, c.subject, c.content,
    ARRAY(SELECT cp.user_id FROM communication_participants cp
          WHERE cp.communication_id = c.id) AS participants,
    c.scheduled_for, c.duration_minutes, c.created_by, c.created_at"#;

const EVENT_COLUMNS: &str = r#"
    e.id, e.title, e.description, e.event_type, e.start_time, e.end_time,
    e.case_id, e.task_id,
    ARRAY(SELECT ep.user_id FROM calendar_event_participants ep
          WHERE ep.event_id = e.id) AS participants,
    e.location, e.is_all_day, e.color, e.created_by, e.created_at"#;

macro_rules! bind_case_filter {
    ($query:expr, $filter:expr) => {
        $query
            .bind($filter.lawyer_id)
            .bind($filter.client_id)
            .bind($filter.is_active)
            .bind($filter.stage)
            .bind($filter.case_type)
            .bind($filter.created_from)
            .bind($filter.created_to)
            .bind($filter.search.as_deref().filter(|s| !s.trim().is_empty()))
    };
}

macro_rules! bind_payment_filter {
    ($query:expr, $filter:expr) => {
        $query
            .bind($filter.case_id)
            .bind($filter.lawyer_id)
            .bind($filter.is_paid)
            .bind($filter.date_from)
            .bind($filter.date_to)
    };
}

macro_rules! bind_time_entry_filter {
    ($query:expr, $filter:expr) => {
        $query
            .bind($filter.case_id)
            .bind($filter.lawyer_id)
            .bind($filter.billable)
            .bind($filter.started_from)
            .bind($filter.started_to)
    };
}

#[derive(sqlx::FromRow)]
struct ClientRevenueRow {
    client_id: Uuid,
    username: String,
    first_name: String,
    last_name: String,
    revenue: Decimal,
    cases_count: i64,
}

fn display_name(username: &str, first_name: &str, last_name: &str) -> String {
    let name = format!("{} {}", first_name.trim(), last_name.trim());
    let name = name.trim();
    if name.is_empty() {
        username.to_string()
    } else {
        name.to_string()
    }
}

fn dedup(ids: &[Uuid]) -> Vec<Uuid> {
    let mut out: Vec<Uuid> = Vec::with_capacity(ids.len());
    for id in ids {
        if !out.contains(id) {
            out.push(*id);
        }
    }
    out
}

fn status_values(statuses: &[TaskStatus]) -> Vec<String> {
    statuses.iter().map(|s| s.as_str().to_string()).collect()
}

/// PostgreSQL-backed store
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LegalStore for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn get_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn user_names(&self, ids: &[Uuid]) -> StoreResult<HashMap<Uuid, String>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let users = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ANY($1)")
            .bind(dedup(ids))
            .fetch_all(&self.pool)
            .await?;
        Ok(users.into_iter().map(|u| (u.id, u.full_name())).collect())
    }

    async fn active_lawyers(&self) -> StoreResult<Vec<User>> {
        let lawyers = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE role = $1 AND is_active = TRUE ORDER BY last_name, first_name",
        )
        .bind(UserRole::Lawyer)
        .fetch_all(&self.pool)
        .await?;
        Ok(lawyers)
    }

    async fn get_client(&self, id: Uuid) -> StoreResult<Option<Client>> {
        let client = sqlx::query_as::<_, Client>("SELECT * FROM clients WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(client)
    }

    async fn client_for_user(&self, user_id: Uuid) -> StoreResult<Option<Client>> {
        let client = sqlx::query_as::<_, Client>("SELECT * FROM clients WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(client)
    }

    async fn count_clients(
        &self,
        created_from: Option<DateTime<Utc>>,
        created_to: Option<DateTime<Utc>>,
    ) -> StoreResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"SELECT COUNT(*) FROM clients
               WHERE ($1::timestamptz IS NULL OR created_at >= $1)
                 AND ($2::timestamptz IS NULL OR created_at <= $2)"#,
        )
        .bind(created_from)
        .bind(created_to)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn get_case(&self, id: Uuid) -> StoreResult<Option<Case>> {
        let case = sqlx::query_as::<_, Case>("SELECT * FROM cases WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(case)
    }

    async fn list_cases(
        &self,
        filter: &CaseFilter,
        limit: i64,
        offset: i64,
    ) -> StoreResult<Vec<Case>> {
        let sql = format!(
            "SELECT c.* FROM cases c WHERE {CASE_WHERE} ORDER BY c.created_at DESC LIMIT $9 OFFSET $10"
        );
        let cases = bind_case_filter!(sqlx::query_as::<_, Case>(&sql), filter)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;
        Ok(cases)
    }

    async fn count_cases(&self, filter: &CaseFilter) -> StoreResult<i64> {
        let sql = format!("SELECT COUNT(*) FROM cases c WHERE {CASE_WHERE}");
        let count = bind_case_filter!(sqlx::query_scalar::<_, i64>(&sql), filter)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn avg_case_duration_days(&self, filter: &CaseFilter) -> StoreResult<Option<Decimal>> {
        let sql = format!(
            r#"SELECT AVG((c.end_date - c.start_date)::numeric) FROM cases c
               WHERE c.end_date IS NOT NULL AND {CASE_WHERE}"#
        );
        let avg = bind_case_filter!(sqlx::query_scalar::<_, Option<Decimal>>(&sql), filter)
            .fetch_one(&self.pool)
            .await?;
        Ok(avg)
    }

    async fn sum_payments(&self, filter: &PaymentFilter) -> StoreResult<Decimal> {
        let sql = format!(
            r#"SELECT COALESCE(SUM(p.amount), 0) FROM payments p
               JOIN cases c ON c.id = p.case_id
               WHERE {PAYMENT_WHERE}"#
        );
        let total = bind_payment_filter!(sqlx::query_scalar::<_, Decimal>(&sql), filter)
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }

    async fn revenue_by_client(&self, filter: &PaymentFilter) -> StoreResult<Vec<ClientRevenue>> {
        let sql = format!(
            r#"SELECT cl.id AS client_id, u.username, u.first_name, u.last_name,
                      COALESCE(SUM(p.amount), 0) AS revenue,
                      (SELECT COUNT(*) FROM cases cc WHERE cc.client_id = cl.id) AS cases_count
               FROM payments p
               JOIN cases c ON c.id = p.case_id
               JOIN clients cl ON cl.id = c.client_id
               JOIN users u ON u.id = cl.user_id
               WHERE {PAYMENT_WHERE}
               GROUP BY cl.id, u.username, u.first_name, u.last_name"#
        );
        let rows = bind_payment_filter!(sqlx::query_as::<_, ClientRevenueRow>(&sql), filter)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| ClientRevenue {
                client_id: row.client_id,
                client_name: display_name(&row.username, &row.first_name, &row.last_name),
                revenue: row.revenue,
                cases_count: row.cases_count,
            })
            .collect())
    }

    async fn sum_hours(&self, filter: &TimeEntryFilter) -> StoreResult<Decimal> {
        let sql = format!(
            "SELECT COALESCE(SUM(te.duration), 0) FROM time_entries te WHERE {TIME_ENTRY_WHERE}"
        );
        let hours = bind_time_entry_filter!(sqlx::query_scalar::<_, Decimal>(&sql), filter)
            .fetch_one(&self.pool)
            .await?;
        Ok(hours)
    }

    async fn sum_labor_cost(&self, filter: &TimeEntryFilter) -> StoreResult<Decimal> {
        let sql = format!(
            r#"SELECT COALESCE(SUM(te.duration * u.hourly_rate), 0) FROM time_entries te
               JOIN users u ON u.id = te.lawyer_id
               WHERE {TIME_ENTRY_WHERE}"#
        );
        let cost = bind_time_entry_filter!(sqlx::query_scalar::<_, Decimal>(&sql), filter)
            .fetch_one(&self.pool)
            .await?;
        Ok(cost)
    }

    async fn case_communications(&self, case_id: Uuid) -> StoreResult<Vec<Communication>> {
        let sql = format!(
            "SELECT {COMMUNICATION_COLUMNS} FROM communications c WHERE c.case_id = $1 ORDER BY c.created_at DESC"
        );
        let rows = sqlx::query_as::<_, Communication>(&sql)
            .bind(case_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn case_documents(&self, case_id: Uuid) -> StoreResult<Vec<Document>> {
        let rows = sqlx::query_as::<_, Document>(
            "SELECT * FROM documents WHERE case_id = $1 ORDER BY uploaded_at DESC",
        )
        .bind(case_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn case_payments(&self, case_id: Uuid) -> StoreResult<Vec<Payment>> {
        let rows = sqlx::query_as::<_, Payment>(
            "SELECT * FROM payments WHERE case_id = $1 ORDER BY payment_date DESC",
        )
        .bind(case_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn case_time_entries(&self, case_id: Uuid) -> StoreResult<Vec<TimeEntry>> {
        let rows = sqlx::query_as::<_, TimeEntry>(
            "SELECT * FROM time_entries WHERE case_id = $1 ORDER BY start_time DESC",
        )
        .bind(case_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn list_tasks(&self, filter: &TaskFilter) -> StoreResult<Vec<Task>> {
        let tasks = sqlx::query_as::<_, Task>(
            r#"SELECT * FROM tasks t
               WHERE ($1::uuid IS NULL OR t.case_id = $1)
                 AND ($2::uuid IS NULL OR t.assigned_to = $2)
                 AND (cardinality($3::text[]) = 0 OR t.status = ANY($3))
                 AND ($4::timestamptz IS NULL OR t.due_date >= $4)
                 AND ($5::timestamptz IS NULL OR t.due_date <= $5)
               ORDER BY t.due_date ASC
               LIMIT $6"#,
        )
        .bind(filter.case_id)
        .bind(filter.assigned_to)
        .bind(status_values(&filter.statuses))
        .bind(filter.due_from)
        .bind(filter.due_to)
        .bind(filter.limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(tasks)
    }

    async fn list_events(&self, filter: &EventFilter) -> StoreResult<Vec<CalendarEvent>> {
        let sql = format!(
            r#"SELECT {EVENT_COLUMNS} FROM calendar_events e
               WHERE ($1::uuid IS NULL OR e.case_id = $1)
                 AND ($2::uuid IS NULL OR EXISTS (
                     SELECT 1 FROM calendar_event_participants ep
                     WHERE ep.event_id = e.id AND ep.user_id = $2))
                 AND ($3::uuid IS NULL OR e.created_by = $3 OR EXISTS (
                     SELECT 1 FROM calendar_event_participants ep
                     WHERE ep.event_id = e.id AND ep.user_id = $3))
                 AND ($4::timestamptz IS NULL OR e.start_time >= $4)
                 AND ($5::timestamptz IS NULL OR e.start_time <= $5)
                 AND ($6::timestamptz IS NULL OR e.end_time <= $6)
               ORDER BY e.start_time ASC"#
        );
        let events = sqlx::query_as::<_, CalendarEvent>(&sql)
            .bind(filter.case_id)
            .bind(filter.participant)
            .bind(filter.involving)
            .bind(filter.start_from)
            .bind(filter.start_to)
            .bind(filter.end_to)
            .fetch_all(&self.pool)
            .await?;
        Ok(events)
    }

    async fn create_communication(&self, input: NewCommunication) -> StoreResult<Communication> {
        let participants = dedup(&input.participants);
        let mut tx = self.pool.begin().await?;

        let communication = sqlx::query_as::<_, Communication>(
            r#"INSERT INTO communications
                   (id, case_id, communication_type, subject, content,
                    scheduled_for, duration_minutes, created_by)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
               RETURNING id, case_id, communication_type, subject, content,
                         $9::uuid[] AS participants,
                         scheduled_for, duration_minutes, created_by, created_at"#,
        )
        .bind(Uuid::new_v4())
        .bind(input.case_id)
        .bind(input.communication_type)
        .bind(&input.subject)
        .bind(&input.content)
        .bind(input.scheduled_for)
        .bind(input.duration_minutes)
        .bind(input.created_by)
        .bind(&participants)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"INSERT INTO communication_participants (communication_id, user_id)
               SELECT $1, UNNEST($2::uuid[])"#,
        )
        .bind(communication.id)
        .bind(&participants)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(communication)
    }

    async fn create_task(&self, input: NewTask) -> StoreResult<Task> {
        let task = sqlx::query_as::<_, Task>(
            r#"INSERT INTO tasks
                   (id, title, description, case_id, assigned_to, assigned_by,
                    priority, status, due_date, estimated_hours)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
               RETURNING *"#,
        )
        .bind(Uuid::new_v4())
        .bind(&input.title)
        .bind(&input.description)
        .bind(input.case_id)
        .bind(input.assigned_to)
        .bind(input.assigned_by)
        .bind(input.priority)
        .bind(TaskStatus::Todo)
        .bind(input.due_date)
        .bind(input.estimated_hours)
        .fetch_one(&self.pool)
        .await?;
        Ok(task)
    }

    async fn update_task_status(
        &self,
        id: Uuid,
        status: TaskStatus,
        completed_at: Option<DateTime<Utc>>,
    ) -> StoreResult<Option<Task>> {
        let task = sqlx::query_as::<_, Task>(
            "UPDATE tasks SET status = $2, completed_at = $3 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status)
        .bind(completed_at)
        .fetch_optional(&self.pool)
        .await?;
        Ok(task)
    }

    async fn create_payment(&self, input: NewPayment) -> StoreResult<Payment> {
        let payment = sqlx::query_as::<_, Payment>(
            r#"INSERT INTO payments
                   (id, case_id, amount, payment_type, payment_date, due_date,
                    is_paid, paid_date, payment_method, invoice_number, notes)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
               RETURNING *"#,
        )
        .bind(Uuid::new_v4())
        .bind(input.case_id)
        .bind(input.amount)
        .bind(input.payment_type)
        .bind(input.payment_date)
        .bind(input.due_date)
        .bind(input.is_paid)
        .bind(input.paid_date)
        .bind(&input.payment_method)
        .bind(&input.invoice_number)
        .bind(&input.notes)
        .fetch_one(&self.pool)
        .await?;
        Ok(payment)
    }

    async fn create_time_entry(&self, input: NewTimeEntry) -> StoreResult<TimeEntry> {
        let entry = sqlx::query_as::<_, TimeEntry>(
            r#"INSERT INTO time_entries
                   (id, lawyer_id, case_id, task_id, description, start_time,
                    end_time, duration, billable, billed)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
               RETURNING *"#,
        )
        .bind(Uuid::new_v4())
        .bind(input.lawyer_id)
        .bind(input.case_id)
        .bind(input.task_id)
        .bind(&input.description)
        .bind(input.start_time)
        .bind(input.end_time)
        .bind(input.duration)
        .bind(input.billable)
        .bind(input.billed)
        .fetch_one(&self.pool)
        .await?;
        Ok(entry)
    }

    async fn create_calendar_event(&self, input: NewCalendarEvent) -> StoreResult<CalendarEvent> {
        let participants = dedup(&input.participants);
        let mut tx = self.pool.begin().await?;

        let event = sqlx::query_as::<_, CalendarEvent>(
            r#"INSERT INTO calendar_events
                   (id, title, description, event_type, start_time, end_time,
                    case_id, task_id, location, is_all_day, color, created_by)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
               RETURNING id, title, description, event_type, start_time, end_time,
                         case_id, task_id, $13::uuid[] AS participants,
                         location, is_all_day, color, created_by, created_at"#,
        )
        .bind(Uuid::new_v4())
        .bind(&input.title)
        .bind(&input.description)
        .bind(input.event_type)
        .bind(input.start_time)
        .bind(input.end_time)
        .bind(input.case_id)
        .bind(input.task_id)
        .bind(&input.location)
        .bind(input.is_all_day)
        .bind(&input.color)
        .bind(input.created_by)
        .bind(&participants)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"INSERT INTO calendar_event_participants (event_id, user_id)
               SELECT $1, UNNEST($2::uuid[])"#,
        )
        .bind(event.id)
        .bind(&participants)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(event)
    }

    async fn create_notification(&self, input: NewNotification) -> StoreResult<Notification> {
        let notification = sqlx::query_as::<_, Notification>(
            r#"INSERT INTO notifications
                   (id, user_id, title, message, notification_type,
                    related_object_id, related_object_type)
               VALUES ($1, $2, $3, $4, $5, $6, $7)
               RETURNING *"#,
        )
        .bind(Uuid::new_v4())
        .bind(input.user_id)
        .bind(&input.title)
        .bind(&input.message)
        .bind(input.notification_type)
        .bind(input.related_object_id)
        .bind(&input.related_object_type)
        .fetch_one(&self.pool)
        .await?;
        Ok(notification)
    }

    async fn list_notifications(
        &self,
        user_id: Uuid,
        unread_only: bool,
        limit: i64,
        offset: i64,
    ) -> StoreResult<Vec<Notification>> {
        let rows = sqlx::query_as::<_, Notification>(
            r#"SELECT * FROM notifications
               WHERE user_id = $1 AND (NOT $2 OR is_read = FALSE)
               ORDER BY created_at DESC
               LIMIT $3 OFFSET $4"#,
        )
        .bind(user_id)
        .bind(unread_only)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn count_notifications(&self, user_id: Uuid, unread_only: bool) -> StoreResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND (NOT $2 OR is_read = FALSE)",
        )
        .bind(user_id)
        .bind(unread_only)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn mark_notification_read(
        &self,
        id: Uuid,
        user_id: Uuid,
        at: DateTime<Utc>,
    ) -> StoreResult<bool> {
        let result = sqlx::query(
            r#"UPDATE notifications
               SET is_read = TRUE, read_at = COALESCE(read_at, $3)
               WHERE id = $1 AND user_id = $2"#,
        )
        .bind(id)
        .bind(user_id)
        .bind(at)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn mark_all_notifications_read(
        &self,
        user_id: Uuid,
        at: DateTime<Utc>,
    ) -> StoreResult<u64> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = TRUE, read_at = $2 WHERE user_id = $1 AND is_read = FALSE",
        )
        .bind(user_id)
        .bind(at)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn delete_notification(&self, id: Uuid, user_id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM notifications WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn purge_read_notifications(&self, before: DateTime<Utc>) -> StoreResult<u64> {
        let result =
            sqlx::query("DELETE FROM notifications WHERE is_read = TRUE AND created_at < $1")
                .bind(before)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected())
    }

    async fn upsert_snapshot(&self, input: NewSnapshot) -> StoreResult<AnalyticsSnapshot> {
        let snapshot = sqlx::query_as::<_, AnalyticsSnapshot>(
            r#"INSERT INTO analytics_snapshots
                   (id, period, period_date, total_revenue, total_expenses, total_profit,
                    active_cases, new_clients, lawyer_performance, case_type_distribution)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
               ON CONFLICT (period, period_date) DO UPDATE SET
                   total_revenue = EXCLUDED.total_revenue,
                   total_expenses = EXCLUDED.total_expenses,
                   total_profit = EXCLUDED.total_profit,
                   active_cases = EXCLUDED.active_cases,
                   new_clients = EXCLUDED.new_clients,
                   lawyer_performance = EXCLUDED.lawyer_performance,
                   case_type_distribution = EXCLUDED.case_type_distribution,
                   created_at = NOW()
               RETURNING *"#,
        )
        .bind(Uuid::new_v4())
        .bind(input.period)
        .bind(input.period_date)
        .bind(input.total_revenue)
        .bind(input.total_expenses)
        .bind(input.total_profit)
        .bind(input.active_cases)
        .bind(input.new_clients)
        .bind(&input.lawyer_performance)
        .bind(&input.case_type_distribution)
        .fetch_one(&self.pool)
        .await?;
        Ok(snapshot)
    }

    async fn list_snapshots(
        &self,
        period: Option<Period>,
        limit: i64,
    ) -> StoreResult<Vec<AnalyticsSnapshot>> {
        let rows = sqlx::query_as::<_, AnalyticsSnapshot>(
            r#"SELECT * FROM analytics_snapshots
               WHERE ($1::text IS NULL OR period = $1)
               ORDER BY period_date DESC
               LIMIT $2"#,
        )
        .bind(period)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
