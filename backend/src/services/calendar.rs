// Calendar side effects - events derived from scheduled communications

use chrono::Duration;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use lexdesk_shared::{
    CalendarEvent, Communication, CommunicationType, EventType, LabelCatalog, NotificationType,
    DEFAULT_EVENT_COLOR,
};

use crate::services::case_report::format_datetime;
use crate::services::notifications::NotificationSink;
use crate::store::{LegalStore, NewCalendarEvent, NewNotification, StoreError, StoreResult};

pub const DEFAULT_DURATION_MINUTES: i32 = 30;
pub const CALENDAR_EVENT_OBJECT: &str = "calendar_event";

/// Create the calendar event for a scheduled meeting or phone call and
/// notify every participant except its creator.
///
/// Returns `Ok(None)` when the communication is not schedulable. Only the
/// event write can fail; notification failures are absorbed by the sink.
pub async fn materialize_event(
    store: &dyn LegalStore,
    sink: &dyn NotificationSink,
    labels: &LabelCatalog,
    communication: &Communication,
) -> StoreResult<Option<CalendarEvent>> {
    let Some(start_time) = communication.scheduled_for else {
        return Ok(None);
    };
    if !communication.communication_type.is_schedulable() {
        return Ok(None);
    }

    let minutes = communication
        .duration_minutes
        .unwrap_or(DEFAULT_DURATION_MINUTES);
    let end_time = start_time
        .checked_add_signed(Duration::minutes(i64::from(minutes)))
        .ok_or_else(|| StoreError::Invalid("Event end time is out of range".to_string()))?;
    let event_type = if communication.communication_type == CommunicationType::Meeting {
        EventType::Meeting
    } else {
        EventType::Reminder
    };

    let event = store
        .create_calendar_event(NewCalendarEvent {
            title: format!(
                "{}: {}",
                labels.communication_type(communication.communication_type),
                communication.subject
            ),
            description: communication.content.clone(),
            event_type,
            start_time,
            end_time,
            case_id: Some(communication.case_id),
            task_id: None,
            participants: communication.participants.clone(),
            location: None,
            is_all_day: false,
            color: DEFAULT_EVENT_COLOR.to_string(),
            created_by: communication.created_by,
        })
        .await?;

    info!(
        "Created calendar event {} from communication {}",
        event.id, communication.id
    );

    let mut delivered = 0;
    for participant in event
        .participants
        .iter()
        .filter(|id| **id != communication.created_by)
    {
        let notification = sink
            .notify(NewNotification {
                user_id: *participant,
                title: "New calendar event".to_string(),
                message: format!(
                    "You have been added to \"{}\" on {}",
                    event.title,
                    format_datetime(event.start_time)
                ),
                notification_type: NotificationType::Calendar,
                related_object_id: Some(event.id),
                related_object_type: Some(CALENDAR_EVENT_OBJECT.to_string()),
            })
            .await;
        if notification.is_some() {
            delivered += 1;
        }
    }
    debug!("Sent {} calendar notifications for event {}", delivered, event.id);

    Ok(Some(event))
}

/// Outcome of an external calendar sync request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncStatus {
    pub status: String,
    pub provider: String,
    pub message: String,
}

/// Third-party calendar sync is not available; callers get a structured
/// status instead of an error.
pub fn sync_external_calendar(provider: &str) -> SyncStatus {
    SyncStatus {
        status: "not_implemented".to_string(),
        provider: provider.to_string(),
        message: format!("Calendar sync with {} is not implemented", provider),
    }
}
