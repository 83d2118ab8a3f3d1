// Background Jobs Service
//
// Periodic jobs for the lexdesk back office. Jobs are scheduled using
// tokio-cron-scheduler and can also be triggered on demand through the API.

pub mod maintenance;
pub mod scheduler;
pub mod task_reminders;

pub use maintenance::MaintenanceJobs;
pub use scheduler::{JobExecutionLog, JobKind, JobRunner, JobScheduler, JobStatus};
pub use task_reminders::send_task_reminders;
