//! Case report builder: one case's full activity history plus derived statistics.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use std::collections::HashMap;
use uuid::Uuid;

use lexdesk_shared::{
    CaseReport, CaseStatistics, CaseSummary, CommunicationEntry, DocumentEntry, EventEntry,
    LabelCatalog, PaymentEntry, TaskEntry, TaskStatus, TimeEntryLine,
};

use crate::error::{ApiError, ApiResult};
use crate::services::analytics::round_money;
use crate::store::{EventFilter, LegalStore, TaskFilter};

pub const DATE_FORMAT: &str = "%d.%m.%Y";
pub const DATETIME_FORMAT: &str = "%d.%m.%Y %H:%M";

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn format_datetime(at: DateTime<Utc>) -> String {
    at.format(DATETIME_FORMAT).to_string()
}

fn name_of(names: &HashMap<Uuid, String>, id: Uuid) -> String {
    names.get(&id).cloned().unwrap_or_default()
}

pub async fn build_case_report(
    store: &dyn LegalStore,
    labels: &LabelCatalog,
    case_id: Uuid,
) -> ApiResult<CaseReport> {
    let case = store
        .get_case(case_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Case"))?;

    let mut communications = store.case_communications(case_id).await?;
    let mut documents = store.case_documents(case_id).await?;
    let mut payments = store.case_payments(case_id).await?;
    let mut time_entries = store.case_time_entries(case_id).await?;
    let mut tasks = store
        .list_tasks(&TaskFilter {
            case_id: Some(case_id),
            ..Default::default()
        })
        .await?;
    let events = store
        .list_events(&EventFilter {
            case_id: Some(case_id),
            ..Default::default()
        })
        .await?;

    // Newest first, whatever order the store returned
    communications.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    documents.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at));
    tasks.sort_by(|a, b| b.due_date.cmp(&a.due_date));
    payments.sort_by(|a, b| b.payment_date.cmp(&a.payment_date));
    time_entries.sort_by(|a, b| b.start_time.cmp(&a.start_time));

    let client = store.get_client(case.client_id).await?;

    let mut user_ids: Vec<Uuid> = Vec::new();
    user_ids.extend(client.as_ref().map(|c| c.user_id));
    user_ids.extend(case.lawyer_id);
    user_ids.extend(communications.iter().map(|c| c.created_by));
    user_ids.extend(documents.iter().map(|d| d.uploaded_by));
    user_ids.extend(tasks.iter().map(|t| t.assigned_to));
    user_ids.extend(time_entries.iter().map(|e| e.lawyer_id));
    user_ids.sort();
    user_ids.dedup();
    let names = store.user_names(&user_ids).await?;

    let summary = CaseSummary {
        id: case.id,
        case_number: case.case_number.clone(),
        title: case.title.clone(),
        client_name: client
            .map(|c| name_of(&names, c.user_id))
            .unwrap_or_default(),
        lawyer_name: case
            .lawyer_id
            .and_then(|id| names.get(&id).cloned())
            .unwrap_or_else(|| labels.unassigned()),
        case_type: case.case_type,
        case_type_label: labels.case_type(case.case_type),
        stage: case.stage,
        stage_label: labels.case_stage(case.stage),
        start_date: format_date(case.start_date),
        end_date: case.end_date.map(format_date),
        budget: case.budget,
        actual_cost: case.actual_cost,
        success_probability: case.success_probability,
        is_active: case.is_active,
    };

    let total_paid: Decimal = payments.iter().filter(|p| p.is_paid).map(|p| p.amount).sum();
    let total_hours: Decimal = time_entries.iter().map(|e| e.duration).sum();
    let statistics = CaseStatistics {
        total_paid: round_money(total_paid),
        remaining_budget: round_money(case.budget - total_paid),
        total_hours_spent: round_money(total_hours),
        documents_count: documents.len() as i64,
        tasks_completed: tasks.iter().filter(|t| t.status == TaskStatus::Done).count() as i64,
        tasks_pending: tasks.iter().filter(|t| t.status.is_open()).count() as i64,
    };

    Ok(CaseReport {
        case: summary,
        communications: communications
            .into_iter()
            .map(|c| CommunicationEntry {
                id: c.id,
                communication_type: c.communication_type,
                type_label: labels.communication_type(c.communication_type),
                subject: c.subject,
                content: c.content,
                scheduled_for: c.scheduled_for.map(format_datetime),
                duration_minutes: c.duration_minutes,
                created_by: name_of(&names, c.created_by),
                created_at: format_datetime(c.created_at),
            })
            .collect(),
        documents: documents
            .into_iter()
            .map(|d| DocumentEntry {
                id: d.id,
                title: d.title,
                category: d.category,
                category_label: labels.document_category(d.category),
                version: d.version,
                is_signed: d.is_signed,
                uploaded_by: name_of(&names, d.uploaded_by),
                uploaded_at: format_datetime(d.uploaded_at),
            })
            .collect(),
        tasks: tasks
            .into_iter()
            .map(|t| TaskEntry {
                id: t.id,
                title: t.title,
                status: t.status,
                status_label: labels.task_status(t.status),
                priority: t.priority,
                priority_label: labels.task_priority(t.priority),
                assigned_to: name_of(&names, t.assigned_to),
                due_date: format_datetime(t.due_date),
                completed_at: t.completed_at.map(format_datetime),
            })
            .collect(),
        payments: payments
            .into_iter()
            .map(|p| PaymentEntry {
                id: p.id,
                amount: p.amount,
                payment_type: p.payment_type,
                type_label: labels.payment_type(p.payment_type),
                payment_date: format_date(p.payment_date),
                is_paid: p.is_paid,
                paid_date: p.paid_date.map(format_date),
                invoice_number: p.invoice_number,
            })
            .collect(),
        time_entries: time_entries
            .into_iter()
            .map(|e| TimeEntryLine {
                id: e.id,
                lawyer: name_of(&names, e.lawyer_id),
                description: e.description,
                start_time: format_datetime(e.start_time),
                duration: e.duration,
                billable: e.billable,
                billed: e.billed,
            })
            .collect(),
        calendar_events: events
            .into_iter()
            .map(|e| EventEntry {
                id: e.id,
                title: e.title,
                event_type: e.event_type,
                type_label: labels.event_type(e.event_type),
                start_time: format_datetime(e.start_time),
                end_time: format_datetime(e.end_time),
            })
            .collect(),
        statistics,
    })
}
