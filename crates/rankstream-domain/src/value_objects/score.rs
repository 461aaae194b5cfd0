//! Score value object with total ordering

use crate::{DomainError, DomainResult};
use serde::{Deserialize, Serialize};
use std::{cmp::Ordering, fmt};

/// Suitability score assigned by the backend to a result.
///
/// Scores are finite `f64` values. Rejecting NaN and infinities at
/// construction is what lets `Score` implement `Ord`, which the ranked
/// aggregate relies on for binary-search insertion.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Score(f64);

impl Score {
    /// Create a validated score
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidScore`] when `value` is NaN or infinite.
    pub fn new(value: f64) -> DomainResult<Self> {
        if !value.is_finite() {
            return Err(DomainError::InvalidScore(format!(
                "score must be finite, got {value}"
            )));
        }
        // Normalize -0.0 so that equal scores compare equal under total_cmp
        Ok(Self(if value == 0.0 { 0.0 } else { value }))
    }

    /// Get the raw value
    pub fn value(self) -> f64 {
        self.0
    }
}

impl PartialEq for Score {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Score {}

impl PartialOrd for Score {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Score {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl TryFrom<f64> for Score {
    type Error = DomainError;

    fn try_from(value: f64) -> DomainResult<Self> {
        Self::new(value)
    }
}

impl From<Score> for f64 {
    fn from(score: Score) -> Self {
        score.0
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
