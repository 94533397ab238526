//! Extraction orchestrator - gates export behind the integrity verdict
//!
//! One call to [`ExtractionOrchestrator::run`] is one run:
//! `Start -> CheckingIntegrity -> {Halted | Extracting} -> Finished`.
//! The query session is acquired at the start of the run and dropped on every
//! exit path. Export failures are isolated per entity; a failing verdict stops
//! the run before any row is fetched for export.

use crate::adapters::database::traits::{QuerySession, SessionSource};
use crate::adapters::flatfile::ExportSink;
use crate::core::audit::{record, AuditEvent, EventLog};
use crate::core::export::summary::{ExtractionOutcome, HaltReason, RunSummary};
use crate::core::integrity::{IntegrityChecker, IntegrityVerdict};
use crate::domain::{Dataset, EntitySpec, Result, VigilError};
use std::fmt;
use std::time::Instant;

/// Run phases, used for diagnostic tracing only
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunPhase {
    CheckingIntegrity,
    Halted,
    Extracting,
    Finished,
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunPhase::CheckingIntegrity => "checking_integrity",
            RunPhase::Halted => "halted",
            RunPhase::Extracting => "extracting",
            RunPhase::Finished => "finished",
        };
        f.write_str(name)
    }
}

/// Extraction orchestrator
#[derive(Debug, Clone, Default)]
pub struct ExtractionOrchestrator {
    checker: IntegrityChecker,
    dry_run: bool,
}

impl ExtractionOrchestrator {
    /// Create an orchestrator around `checker`
    pub fn new(checker: IntegrityChecker) -> Self {
        Self {
            checker,
            dry_run: false,
        }
    }

    /// Mark summaries produced by this orchestrator as dry runs
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn checker(&self) -> &IntegrityChecker {
        &self.checker
    }

    /// Execute one run
    ///
    /// Never returns an error: session failures, failing verdicts and
    /// per-entity export failures are all reported through the returned
    /// [`RunSummary`] and the audit log.
    pub async fn run(
        &self,
        entities: &[EntitySpec],
        source: &dyn SessionSource,
        sink: &dyn ExportSink,
        log: &dyn EventLog,
    ) -> RunSummary {
        let start_time = Instant::now();
        let mut summary = RunSummary::new();
        summary.dry_run = self.dry_run;

        tracing::info!(
            run_id = %summary.run_id,
            entities = entities.len(),
            source = %source.describe(),
            sink = %sink.describe(),
            "Starting run"
        );
        record(
            log,
            &AuditEvent::RunStarted {
                run_id: summary.run_id,
                entities: entities.len(),
            },
        );

        let session = match self.open_session(source, log).await {
            Ok(session) => session,
            Err(e) => {
                summary.halt(HaltReason::SessionUnavailable(e.to_string()));
                record(
                    log,
                    &AuditEvent::Halted {
                        detail: format!("query session unavailable: {e}"),
                    },
                );
                enter(RunPhase::Halted);
                return finish(summary, start_time, log);
            }
        };

        enter(RunPhase::CheckingIntegrity);
        let verdict = self.checker.evaluate(entities, session.as_ref(), log).await;

        if verdict.overall_passed() {
            enter(RunPhase::Extracting);
            for entity in entities {
                let outcome = extract_entity(entity, session.as_ref(), sink, log).await;
                summary.outcomes.push(outcome);
            }
        } else {
            enter(RunPhase::Halted);
            tracing::warn!(detail = %verdict.describe(), "Extraction halted by integrity gate");
            record(
                log,
                &AuditEvent::Halted {
                    detail: verdict.describe(),
                },
            );
            summary.halt(HaltReason::IntegrityFailed);
        }
        summary.verdict = Some(verdict);

        drop(session);
        tracing::debug!("Query session released");
        record(log, &AuditEvent::SessionReleased);

        finish(summary, start_time, log)
    }

    /// Run the integrity check only
    ///
    /// # Errors
    ///
    /// Returns [`VigilError::Connectivity`] if no session can be opened. A
    /// failing verdict is not an error.
    pub async fn check(
        &self,
        entities: &[EntitySpec],
        source: &dyn SessionSource,
        log: &dyn EventLog,
    ) -> Result<IntegrityVerdict> {
        let session = self.open_session(source, log).await?;
        let verdict = self.checker.evaluate(entities, session.as_ref(), log).await;
        drop(session);
        record(log, &AuditEvent::SessionReleased);
        Ok(verdict)
    }

    async fn open_session(
        &self,
        source: &dyn SessionSource,
        log: &dyn EventLog,
    ) -> Result<Box<dyn QuerySession>> {
        match source.acquire().await {
            Ok(session) => {
                record(
                    log,
                    &AuditEvent::SessionOpened {
                        target: source.describe(),
                    },
                );
                Ok(session)
            }
            Err(e) => {
                tracing::error!(source = %source.describe(), error = %e, "Failed to open query session");
                record(
                    log,
                    &AuditEvent::SessionUnavailable {
                        error: e.to_string(),
                    },
                );
                Err(match e {
                    VigilError::Connectivity(_) => e,
                    other => VigilError::Connectivity(other.to_string()),
                })
            }
        }
    }
}

async fn extract_entity(
    entity: &EntitySpec,
    session: &dyn QuerySession,
    sink: &dyn ExportSink,
    log: &dyn EventLog,
) -> ExtractionOutcome {
    let start_time = Instant::now();

    match export_entity(entity, session, sink).await {
        Ok(receipt) => {
            tracing::info!(
                entity = %entity.name,
                rows = receipt.rows_written,
                location = %receipt.location,
                "Entity exported"
            );
            record(
                log,
                &AuditEvent::EntityExported {
                    entity: entity.name.clone(),
                    rows: receipt.rows_written,
                    location: receipt.location.clone(),
                },
            );
            ExtractionOutcome::succeeded(entity.name.as_str(), receipt, start_time.elapsed())
        }
        Err(e) => {
            tracing::error!(entity = %entity.name, error = %e, "Entity export failed");
            record(
                log,
                &AuditEvent::ExportFailed {
                    entity: entity.name.clone(),
                    error: e.to_string(),
                },
            );
            ExtractionOutcome::failed(
                entity.name.as_str(),
                entity.dataset_name(),
                e.to_string(),
                start_time.elapsed(),
            )
        }
    }
}

async fn export_entity(
    entity: &EntitySpec,
    session: &dyn QuerySession,
    sink: &dyn ExportSink,
) -> Result<crate::adapters::flatfile::ExportReceipt> {
    let columns = entity.source_columns();
    let records = session
        .fetch_rows(entity, &columns, &entity.key_column)
        .await?;
    tracing::debug!(entity = %entity.name, rows = records.len(), "Rows fetched");

    let dataset = Dataset::shape(entity, records)?;
    Ok(sink.write(&dataset)?)
}

fn enter(phase: RunPhase) {
    tracing::debug!(phase = %phase, "Run phase");
}

fn finish(summary: RunSummary, start_time: Instant, log: &dyn EventLog) -> RunSummary {
    enter(RunPhase::Finished);
    let summary = summary.with_duration(start_time.elapsed());
    record(
        log,
        &AuditEvent::RunFinished {
            exported: summary.exported_count(),
            failed: summary.failed_count(),
        },
    );
    summary.log_summary();
    summary
}
