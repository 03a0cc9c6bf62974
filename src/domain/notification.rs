//! Script notifications (`alert`, `logInfo`, `logWarning`, `logError`, `showcond`).

use std::fmt;

use crate::domain::registry::NotifyLevel;

impl NotifyLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            NotifyLevel::Alert => "alert",
            NotifyLevel::Info => "info",
            NotifyLevel::Warning => "warning",
            NotifyLevel::Error => "error",
        }
    }
}

impl fmt::Display for NotifyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub level: NotifyLevel,
    pub message: String,
    pub bar_index: usize,
    pub time: i64,
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] bar {}: {}", self.level, self.bar_index, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_level_and_bar() {
        let n = Notification {
            level: NotifyLevel::Warning,
            message: "spread widened".into(),
            bar_index: 12,
            time: 0,
        };
        assert_eq!(n.to_string(), "[warning] bar 12: spread widened");
    }
}
