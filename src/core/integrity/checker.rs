//! Integrity checker
//!
//! Decides, for an ordered set of entities and an open query session, whether
//! the dataset as a whole is complete enough to export. The checker is
//! fail-closed: any query failure stops the run and yields a verdict that does
//! not pass. Retries are left to the query layer.

use super::verdict::{CheckFailure, IntegrityResult, IntegrityVerdict};
use crate::adapters::database::traits::QuerySession;
use crate::config::IntegrityConfig;
use crate::core::audit::{record, AuditEvent, EventLog};
use crate::domain::{EntitySpec, QueryError, Result, VigilError};

/// Default highest tolerated null ratio
pub const DEFAULT_MAX_NULL_RATIO: f64 = 0.8;

/// Per-table completeness evaluation and threshold decision
#[derive(Debug, Clone)]
pub struct IntegrityChecker {
    max_null_ratio: f64,
    warn_on_empty: bool,
}

impl IntegrityChecker {
    /// Creates a checker with the given threshold
    ///
    /// # Errors
    ///
    /// Returns [`VigilError::Validation`] unless `0.0 <= max_null_ratio <= 1.0`.
    pub fn new(max_null_ratio: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&max_null_ratio) {
            return Err(VigilError::Validation(format!(
                "max_null_ratio must be between 0.0 and 1.0, got {max_null_ratio}"
            )));
        }
        Ok(Self {
            max_null_ratio,
            warn_on_empty: true,
        })
    }

    /// Creates a checker from the `[integrity]` configuration section
    pub fn from_config(config: &IntegrityConfig) -> Result<Self> {
        Ok(Self::new(config.max_null_ratio)?.with_warn_on_empty(config.warn_on_empty))
    }

    /// Enables or disables the empty-table audit warning
    pub fn with_warn_on_empty(mut self, warn: bool) -> Self {
        self.warn_on_empty = warn;
        self
    }

    pub fn max_null_ratio(&self) -> f64 {
        self.max_null_ratio
    }

    /// Evaluates every entity in order and aggregates the verdict
    ///
    /// Emits one audit event per checked entity and, when the verdict fails on
    /// ratio grounds, one event naming the offending entities. A query error
    /// aborts the remaining checks; the returned verdict then holds only the
    /// results gathered so far and never passes.
    pub async fn evaluate(
        &self,
        entities: &[EntitySpec],
        session: &dyn QuerySession,
        log: &dyn EventLog,
    ) -> IntegrityVerdict {
        if entities.is_empty() {
            tracing::error!("Integrity check requested without entities");
            record(log, &AuditEvent::NoEntities);
            return IntegrityVerdict::aborted(
                Vec::new(),
                self.max_null_ratio,
                CheckFailure {
                    entity: None,
                    message: "no entities configured".to_string(),
                },
            );
        }

        let mut results = Vec::with_capacity(entities.len());

        for entity in entities {
            let result = match self.check_entity(entity, session).await {
                Ok(result) => result,
                Err(e) => {
                    tracing::error!(
                        entity = %entity.name,
                        error = %e,
                        checked = results.len(),
                        "Integrity check aborted"
                    );
                    record(
                        log,
                        &AuditEvent::CheckAborted {
                            entity: entity.name.clone(),
                            error: e.to_string(),
                        },
                    );
                    return IntegrityVerdict::aborted(
                        results,
                        self.max_null_ratio,
                        CheckFailure {
                            entity: Some(entity.name.clone()),
                            message: e.to_string(),
                        },
                    );
                }
            };

            tracing::info!(
                entity = %result.entity(),
                total = result.total_count(),
                nulls = result.null_count(),
                ratio = result.null_ratio(),
                passed = result.passed(),
                "Entity checked"
            );
            record(
                log,
                &AuditEvent::EntityChecked {
                    entity: result.entity().to_string(),
                    total: result.total_count(),
                    null_count: result.null_count(),
                    ratio: result.null_ratio(),
                },
            );

            if result.is_empty() && self.warn_on_empty {
                tracing::warn!(entity = %result.entity(), "Table has no rows");
                record(
                    log,
                    &AuditEvent::EmptyEntity {
                        entity: result.entity().to_string(),
                    },
                );
            }

            results.push(result);
        }

        let verdict = IntegrityVerdict::from_results(results, self.max_null_ratio);

        if verdict.overall_passed() {
            tracing::info!(
                entities = verdict.results().len(),
                threshold = self.max_null_ratio,
                "Integrity check passed"
            );
        } else {
            let failing: Vec<String> = verdict
                .failing_entities()
                .into_iter()
                .map(str::to_string)
                .collect();
            tracing::warn!(
                failing = ?failing,
                threshold = self.max_null_ratio,
                "Integrity check failed"
            );
            record(
                log,
                &AuditEvent::ThresholdExceeded {
                    threshold: self.max_null_ratio,
                    entities: failing,
                },
            );
        }

        verdict
    }

    async fn check_entity(
        &self,
        entity: &EntitySpec,
        session: &dyn QuerySession,
    ) -> std::result::Result<IntegrityResult, QueryError> {
        let total = session.count(entity).await?;
        let required = entity.required_columns();
        let null_count = session.count_where_any_null(entity, &required).await?;
        IntegrityResult::evaluate(entity.name.as_str(), total, null_count, self.max_null_ratio)
    }
}

impl Default for IntegrityChecker {
    fn default() -> Self {
        Self {
            max_null_ratio: DEFAULT_MAX_NULL_RATIO,
            warn_on_empty: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_bounds() {
        assert!(IntegrityChecker::new(0.0).is_ok());
        assert!(IntegrityChecker::new(1.0).is_ok());
        assert!(IntegrityChecker::new(1.01).is_err());
        assert!(IntegrityChecker::new(f64::NAN).is_err());
    }

    #[test]
    fn test_default_threshold() {
        assert_eq!(IntegrityChecker::default().max_null_ratio(), 0.8);
    }

    #[test]
    fn test_from_config() {
        let config = IntegrityConfig {
            max_null_ratio: 0.25,
            warn_on_empty: false,
        };
        let checker = IntegrityChecker::from_config(&config).unwrap();
        assert_eq!(checker.max_null_ratio(), 0.25);
        assert!(!checker.warn_on_empty);
    }
}
