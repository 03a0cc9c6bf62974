//! Notification adapter that writes script notifications as `tracing` events.

use crate::domain::notification::Notification;
use crate::domain::registry::NotifyLevel;
use crate::ports::notification_port::NotificationPort;

#[derive(Debug, Default)]
pub struct TracingNotifier;

impl NotificationPort for TracingNotifier {
    fn notify(&self, n: &Notification) {
        let (bar, message) = (n.bar_index, n.message.as_str());
        match n.level {
            NotifyLevel::Alert => tracing::warn!(target: "devscript::alert", bar, time = n.time, "{message}"),
            NotifyLevel::Info => tracing::info!(target: "devscript::script", bar, "{message}"),
            NotifyLevel::Warning => tracing::warn!(target: "devscript::script", bar, "{message}"),
            NotifyLevel::Error => tracing::error!(target: "devscript::script", bar, "{message}"),
        }
    }
}
