// Task Reminder Sweep - notifies assignees about open tasks falling due soon

use chrono::{DateTime, Duration, Utc};
use tracing::info;

use lexdesk_shared::{NotificationType, Task, TaskStatus};

use crate::services::case_report::format_datetime;
use crate::services::NotificationSink;
use crate::store::{LegalStore, NewNotification, StoreResult, TaskFilter};

pub const TASK_OBJECT: &str = "task";

fn reminder_for(task: &Task, user_id: uuid::Uuid) -> NewNotification {
    NewNotification {
        user_id,
        title: "Task due soon".to_string(),
        message: format!(
            "Task \"{}\" is due on {}",
            task.title,
            format_datetime(task.due_date)
        ),
        notification_type: NotificationType::Reminder,
        related_object_id: Some(task.id),
        related_object_type: Some(TASK_OBJECT.to_string()),
    }
}

/// Remind about open tasks due within `[now, now + window_hours]`.
///
/// The assignee is always notified, the assigner too when it is a
/// different user. Returns the number of tasks processed. Runs are not
/// de-duplicated: a second run inside the window repeats the reminders.
pub async fn send_task_reminders(
    store: &dyn LegalStore,
    sink: &dyn NotificationSink,
    now: DateTime<Utc>,
    window_hours: i64,
) -> StoreResult<usize> {
    let tasks = store
        .list_tasks(&TaskFilter {
            statuses: TaskStatus::OPEN.to_vec(),
            due_from: Some(now),
            due_to: Some(now + Duration::hours(window_hours)),
            ..Default::default()
        })
        .await?;

    let mut sent = 0;
    for task in &tasks {
        if sink.notify(reminder_for(task, task.assigned_to)).await.is_some() {
            sent += 1;
        }
        if let Some(assigner) = task.assigned_by.filter(|id| *id != task.assigned_to) {
            if sink.notify(reminder_for(task, assigner)).await.is_some() {
                sent += 1;
            }
        }
    }

    info!(
        "Task reminder sweep: {} tasks due, {} notifications sent",
        tasks.len(),
        sent
    );
    Ok(tasks.len())
}
