//! Decision reporting.
//!
//! The engine never logs through a global. Each decision gets a
//! [`Reporter`] handed in by its caller: the binary forwards to `tracing`,
//! tests record what was said and assert on it.

use std::fmt;
use std::sync::Mutex;

use tracing::Level;

/// Receives the messages a decision produces.
///
/// Reporting never fails and never changes the outcome of a decision.
pub trait Reporter {
    fn report(&self, level: Level, args: fmt::Arguments<'_>);

    fn debug(&self, args: fmt::Arguments<'_>) {
        self.report(Level::DEBUG, args);
    }

    fn warn(&self, args: fmt::Arguments<'_>) {
        self.report(Level::WARN, args);
    }

    fn error(&self, args: fmt::Arguments<'_>) {
        self.report(Level::ERROR, args);
    }
}

/// Forwards every message to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn report(&self, level: Level, args: fmt::Arguments<'_>) {
        match level {
            Level::ERROR => tracing::error!("{args}"),
            Level::WARN => tracing::warn!("{args}"),
            Level::INFO => tracing::info!("{args}"),
            Level::DEBUG => tracing::debug!("{args}"),
            _ => tracing::trace!("{args}"),
        }
    }
}

/// A message recorded by [`MemoryReporter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub level: Level,
    pub message: String,
}

/// Keeps every message in memory.
#[derive(Debug, Default)]
pub struct MemoryReporter {
    entries: Mutex<Vec<Entry>>,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of everything reported so far.
    pub fn entries(&self) -> Vec<Entry> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Messages reported at exactly `level`.
    pub fn messages(&self, level: Level) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|e| e.level == level)
            .map(|e| e.message)
            .collect()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.messages(Level::WARN)
    }

    pub fn errors(&self) -> Vec<String> {
        self.messages(Level::ERROR)
    }
}

impl Reporter for MemoryReporter {
    fn report(&self, level: Level, args: fmt::Arguments<'_>) {
        let entry = Entry {
            level,
            message: args.to_string(),
        };
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(entry);
    }
}
