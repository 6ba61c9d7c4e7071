//! Grading error types.
//!
//! Grading itself never fails: malformed answers degrade to an incorrect
//! score. These errors come from the strict parsing pass used by the
//! authoring-time validator and from constructors of constrained values
//! such as [`BandScore`](crate::band::BandScore).

use thiserror::Error;

use crate::family::Family;

/// Errors raised by strict parsing and value construction.
#[derive(Debug, Error, PartialEq)]
pub enum GradingError {
    /// A JSON payload does not have the shape its family requires.
    #[error("{family} {what}: expected {expected} at `{field}`")]
    ShapeMismatch {
        family: Family,
        /// Which payload was being read ("answer data", "type config", ...).
        what: &'static str,
        field: String,
        expected: &'static str,
    },

    /// A band value outside 0.0..=9.0 or not on a half step.
    #[error("invalid band score {0}: must be between 0.0 and 9.0 in steps of 0.5")]
    InvalidBand(f64),

    /// An unrecognised section name.
    #[error("unknown section: {0}")]
    UnknownSection(String),

    /// An unrecognised attempt or review status.
    #[error("unknown status: {0}")]
    UnknownStatus(String),
}

impl GradingError {
    pub(crate) fn shape(
        family: Family,
        what: &'static str,
        field: impl Into<String>,
        expected: &'static str,
    ) -> Self {
        GradingError::ShapeMismatch {
            family,
            what,
            field: field.into(),
            expected,
        }
    }

    /// Returns `true` if this error describes a malformed question payload.
    pub fn is_shape_error(&self) -> bool {
        matches!(self, GradingError::ShapeMismatch { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shape_error_message_names_the_field() {
        let err = GradingError::shape(Family::Matching, "answer data", "mappings", "an object");
        assert!(err.is_shape_error());
        assert_eq!(
            err.to_string(),
            "matching answer data: expected an object at `mappings`"
        );
    }

    #[test]
    fn band_error_is_not_a_shape_error() {
        assert!(!GradingError::InvalidBand(9.5).is_shape_error());
    }
}
