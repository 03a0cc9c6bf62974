//! Sink for script notifications (`alert`, `logInfo`, `logWarning`, `logError`, `showcond`).

use crate::domain::notification::Notification;

pub trait NotificationPort {
    fn notify(&self, notification: &Notification);
}
