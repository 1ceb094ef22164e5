//! Write-only sink for user-facing signals. Nothing in the session ever
//! reads a notification back.

use std::fmt;
use std::sync::{Mutex, PoisonError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Success,
    Error,
    Warning,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::Success => "success",
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        };
        f.write_str(label)
    }
}

pub trait Notifier: Send + Sync {
    fn success(&self, message: &str);
    fn error(&self, message: &str);
    fn warning(&self, message: &str);
    fn info(&self, message: &str);

    fn notify(&self, severity: Severity, message: &str) {
        match severity {
            Severity::Success => self.success(message),
            Severity::Error => self.error(message),
            Severity::Warning => self.warning(message),
            Severity::Info => self.info(message),
        }
    }
}

/// Routes notifications into the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn success(&self, message: &str) {
        tracing::info!(severity = "success", "{message}");
    }

    fn error(&self, message: &str) {
        tracing::error!("{message}");
    }

    fn warning(&self, message: &str) {
        tracing::warn!("{message}");
    }

    fn info(&self, message: &str) {
        tracing::info!("{message}");
    }
}

/// Prints notifications to stderr, one line each.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

impl ConsoleNotifier {
    fn print(&self, severity: Severity, message: &str) {
        eprintln!("[{severity}] {message}");
    }
}

impl Notifier for ConsoleNotifier {
    fn success(&self, message: &str) {
        self.print(Severity::Success, message);
    }

    fn error(&self, message: &str) {
        self.print(Severity::Error, message);
    }

    fn warning(&self, message: &str) {
        self.print(Severity::Warning, message);
    }

    fn info(&self, message: &str) {
        self.print(Severity::Info, message);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub severity: Severity,
    pub message: String,
}

/// Keeps every signal in memory so tests can inspect them.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    records: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, severity: Severity, message: &str) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Notification {
                severity,
                message: message.to_string(),
            });
    }

    pub fn records(&self) -> Vec<Notification> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|n| n.severity == severity)
            .count()
    }
}

impl Notifier for RecordingNotifier {
    fn success(&self, message: &str) {
        self.push(Severity::Success, message);
    }

    fn error(&self, message: &str) {
        self.push(Severity::Error, message);
    }

    fn warning(&self, message: &str) {
        self.push(Severity::Warning, message);
    }

    fn info(&self, message: &str) {
        self.push(Severity::Info, message);
    }
}

impl<T: Notifier + ?Sized> Notifier for std::sync::Arc<T> {
    fn success(&self, message: &str) {
        (**self).success(message);
    }

    fn error(&self, message: &str) {
        (**self).error(message);
    }

    fn warning(&self, message: &str) {
        (**self).warning(message);
    }

    fn info(&self, message: &str) {
        (**self).info(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_notifier_keeps_order() {
        let notifier = RecordingNotifier::new();
        notifier.warning("upload a document first");
        notifier.notify(Severity::Error, "boom");

        let records = notifier.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].severity, Severity::Warning);
        assert_eq!(records[1].message, "boom");
        assert_eq!(notifier.count(Severity::Error), 1);
        assert_eq!(notifier.count(Severity::Info), 0);
    }
}
