// Domain services - report builders, bonus calculation and write-side effects

pub mod analytics;
pub mod bonus;
pub mod calendar;
pub mod case_report;
pub mod notifications;

pub use notifications::{NotificationSink, StoreNotificationSink};
