//! Side channel for git failure output.
//!
//! Writing here never changes control flow; the error is still returned.

use std::sync::Mutex;

pub trait DiagnosticSink: Send + Sync {
    fn write_message(&self, message: &str);
}

/// Error-level record through the logging facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn write_message(&self, message: &str) {
        tracing::error!("{message}");
    }
}

/// Keeps every message in memory.
#[derive(Debug, Default)]
pub struct RecordingSink {
    messages: Mutex<Vec<String>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .map(|m| m.clone())
            .unwrap_or_default()
    }
}

impl DiagnosticSink for RecordingSink {
    fn write_message(&self, message: &str) {
        if let Ok(mut messages) = self.messages.lock() {
            messages.push(message.to_string());
        }
    }
}

impl<T: DiagnosticSink + ?Sized> DiagnosticSink for std::sync::Arc<T> {
    fn write_message(&self, message: &str) {
        (**self).write_message(message);
    }
}

/// `<command line> failed with output:\n<output>`
pub(crate) fn failure_message(command: &str, output: &str) -> String {
    format!("{command} failed with output:\n{output}")
}
