//! Integrity results and the aggregate verdict

use crate::domain::QueryError;
use serde::Serialize;

/// Completeness outcome for one entity
///
/// Immutable once created; the only constructor enforces
/// `null_count <= total_count` and derives the ratio and pass flag.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntegrityResult {
    entity: String,
    total_count: u64,
    null_count: u64,
    null_ratio: f64,
    passed: bool,
}

impl IntegrityResult {
    /// Evaluates one entity's counts against `threshold`
    ///
    /// An empty table has a ratio of 0 and therefore passes.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::InconsistentCounts`] if `null_count > total_count`.
    pub fn evaluate(
        entity: impl Into<String>,
        total_count: u64,
        null_count: u64,
        threshold: f64,
    ) -> Result<Self, QueryError> {
        let entity = entity.into();
        if null_count > total_count {
            return Err(QueryError::InconsistentCounts {
                entity,
                total: total_count,
                null_count,
            });
        }

        let null_ratio = if total_count == 0 {
            0.0
        } else {
            null_count as f64 / total_count as f64
        };

        Ok(Self {
            entity,
            total_count,
            null_count,
            null_ratio,
            passed: null_ratio <= threshold,
        })
    }

    pub fn entity(&self) -> &str {
        &self.entity
    }

    pub fn total_count(&self) -> u64 {
        self.total_count
    }

    pub fn null_count(&self) -> u64 {
        self.null_count
    }

    /// Fraction of rows with at least one NULL required column, in `[0, 1]`
    pub fn null_ratio(&self) -> f64 {
        self.null_ratio
    }

    pub fn passed(&self) -> bool {
        self.passed
    }

    /// Whether the table has no rows
    pub fn is_empty(&self) -> bool {
        self.total_count == 0
    }
}

/// Why a check run stopped before evaluating every entity
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckFailure {
    /// Entity being checked when the failure happened, if any
    pub entity: Option<String>,

    /// Error description
    pub message: String,
}

/// Aggregate decision over all entities of one check run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntegrityVerdict {
    threshold: f64,
    results: Vec<IntegrityResult>,
    overall_passed: bool,
    failure: Option<CheckFailure>,
}

impl IntegrityVerdict {
    /// Builds the verdict of a run that evaluated every entity
    ///
    /// `overall_passed` is the AND of every result's `passed` flag. An empty
    /// result list never passes.
    pub fn from_results(results: Vec<IntegrityResult>, threshold: f64) -> Self {
        let overall_passed = !results.is_empty() && results.iter().all(IntegrityResult::passed);
        Self {
            threshold,
            results,
            overall_passed,
            failure: None,
        }
    }

    /// Builds the verdict of a run that stopped early; it never passes
    pub fn aborted(results: Vec<IntegrityResult>, threshold: f64, failure: CheckFailure) -> Self {
        Self {
            threshold,
            results,
            overall_passed: false,
            failure: Some(failure),
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Per-entity results in check order
    pub fn results(&self) -> &[IntegrityResult] {
        &self.results
    }

    pub fn overall_passed(&self) -> bool {
        self.overall_passed
    }

    /// Set when the check stopped before evaluating every entity
    pub fn failure(&self) -> Option<&CheckFailure> {
        self.failure.as_ref()
    }

    /// Names of the entities whose ratio exceeded the threshold
    pub fn failing_entities(&self) -> Vec<&str> {
        self.results
            .iter()
            .filter(|r| !r.passed())
            .map(IntegrityResult::entity)
            .collect()
    }

    /// One-line explanation of a failing verdict
    pub fn describe(&self) -> String {
        if self.overall_passed {
            return format!("all {} entities within threshold {}", self.results.len(), self.threshold);
        }

        let mut parts = Vec::new();
        let failing = self.failing_entities();
        if !failing.is_empty() {
            parts.push(format!(
                "threshold {} exceeded by {}",
                self.threshold,
                failing.join(", ")
            ));
        }
        if let Some(failure) = &self.failure {
            match &failure.entity {
                Some(entity) => parts.push(format!("check aborted at {entity}: {}", failure.message)),
                None => parts.push(format!("check aborted: {}", failure.message)),
            }
        }
        if parts.is_empty() {
            parts.push("no entities evaluated".to_string());
        }
        parts.join("; ")
    }
}
