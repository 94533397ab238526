//! Audit trail events
//!
//! The pipeline reports what it checked and what it emitted through an
//! [`EventLog`]. Appending never fails the caller: sinks swallow (and trace)
//! their own errors.

use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Mutex;
use uuid::Uuid;

/// Write-append capability for audit messages
pub trait EventLog: Send + Sync {
    /// Appends a message stamped with `timestamp`
    fn append(&self, timestamp: DateTime<Utc>, message: &str);
}

/// Audit events emitted by the checker and the orchestrator
#[derive(Debug, Clone, PartialEq)]
pub enum AuditEvent {
    RunStarted {
        run_id: Uuid,
        entities: usize,
    },
    SessionOpened {
        target: String,
    },
    SessionUnavailable {
        error: String,
    },
    EntityChecked {
        entity: String,
        total: u64,
        null_count: u64,
        ratio: f64,
    },
    EmptyEntity {
        entity: String,
    },
    ThresholdExceeded {
        threshold: f64,
        entities: Vec<String>,
    },
    CheckAborted {
        entity: String,
        error: String,
    },
    NoEntities,
    Halted {
        detail: String,
    },
    EntityExported {
        entity: String,
        rows: usize,
        location: String,
    },
    ExportFailed {
        entity: String,
        error: String,
    },
    RunFinished {
        exported: usize,
        failed: usize,
    },
    SessionReleased,
}

impl fmt::Display for AuditEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditEvent::RunStarted { run_id, entities } => {
                write!(f, "Run {run_id} started for {entities} entities")
            }
            AuditEvent::SessionOpened { target } => write!(f, "Query session opened on {target}"),
            AuditEvent::SessionUnavailable { error } => {
                write!(f, "Alert: Failed to open query session: {error}")
            }
            AuditEvent::EntityChecked {
                entity,
                total,
                null_count,
                ratio,
            } => write!(
                f,
                "{entity}: {total} rows, {null_count} nulls, ratio {ratio:.4}"
            ),
            AuditEvent::EmptyEntity { entity } => {
                write!(f, "Warning: {entity}: table is empty")
            }
            AuditEvent::ThresholdExceeded {
                threshold,
                entities,
            } => write!(
                f,
                "Error: integrity threshold {threshold} exceeded by: {}",
                entities.join(", ")
            ),
            AuditEvent::CheckAborted { entity, error } => {
                write!(f, "Error: integrity check aborted at {entity}: {error}")
            }
            AuditEvent::NoEntities => {
                write!(f, "Error: integrity check aborted: no entities configured")
            }
            AuditEvent::Halted { detail } => {
                write!(f, "Data integrity check failed. Aborting extraction: {detail}")
            }
            AuditEvent::EntityExported {
                entity,
                rows,
                location,
            } => write!(f, "{entity}: exported {rows} rows to {location}"),
            AuditEvent::ExportFailed { entity, error } => {
                write!(f, "Error: {entity}: export failed: {error}")
            }
            AuditEvent::RunFinished { exported, failed } => {
                write!(f, "Run finished: {exported} exported, {failed} failed")
            }
            AuditEvent::SessionReleased => write!(f, "Query session released"),
        }
    }
}

/// Appends `event` to `log` with the current time
pub fn record(log: &dyn EventLog, event: &AuditEvent) {
    log.append(Utc::now(), &event.to_string());
}

/// Forwards audit messages to the diagnostic `tracing` output
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingEventLog;

impl EventLog for TracingEventLog {
    fn append(&self, timestamp: DateTime<Utc>, message: &str) {
        tracing::info!(target: "vigil::audit", timestamp = %timestamp, "{message}");
    }
}

/// Fans each message out to several sinks
#[derive(Default)]
pub struct CompositeEventLog {
    sinks: Vec<Box<dyn EventLog>>,
}

impl CompositeEventLog {
    /// Creates an empty composite
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a sink
    pub fn with(mut self, sink: impl EventLog + 'static) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }

    /// Number of sinks
    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    /// Whether no sink is attached
    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl EventLog for CompositeEventLog {
    fn append(&self, timestamp: DateTime<Utc>, message: &str) {
        for sink in &self.sinks {
            sink.append(timestamp, message);
        }
    }
}

/// Keeps audit messages in memory
#[derive(Debug, Default)]
pub struct MemoryEventLog {
    entries: Mutex<Vec<(DateTime<Utc>, String)>>,
}

impl MemoryEventLog {
    /// Creates an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages appended so far, oldest first
    pub fn messages(&self) -> Vec<String> {
        self.entries
            .lock()
            .map(|entries| entries.iter().map(|(_, m)| m.clone()).collect())
            .unwrap_or_default()
    }

    /// Whether any message contains `needle`
    pub fn contains(&self, needle: &str) -> bool {
        self.messages().iter().any(|m| m.contains(needle))
    }
}

impl EventLog for MemoryEventLog {
    fn append(&self, timestamp: DateTime<Utc>, message: &str) {
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push((timestamp, message.to_string()));
    }
}
