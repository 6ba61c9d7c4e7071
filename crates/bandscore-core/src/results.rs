//! Grading result types.
//!
//! Every grader returns a [`GradingResult`] of the same shape regardless of
//! family, so callers can store and aggregate results without knowing how a
//! question was scored.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Why a sub-part was marked incorrect without a text comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// The answer has more words than the blank or label allows.
    WordLimitExceeded,
    /// The answer key and submission belong to different families.
    ShapeMismatch,
}

/// Outcome of one blank, item, statement or label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartResult {
    pub correct: bool,
    /// What the test-taker wrote (empty when omitted).
    pub user_answer: String,
    /// The reference answer, for families with a single canonical value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_answer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<FailureReason>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_words: Option<usize>,
}

impl PartResult {
    pub fn graded(correct: bool, user_answer: impl Into<String>) -> Self {
        Self {
            correct,
            user_answer: user_answer.into(),
            correct_answer: None,
            reason: None,
            max_words: None,
        }
    }

    pub fn with_correct_answer(mut self, answer: impl Into<String>) -> Self {
        self.correct_answer = Some(answer.into());
        self
    }

    pub fn over_word_limit(user_answer: impl Into<String>, max_words: usize) -> Self {
        Self {
            correct: false,
            user_answer: user_answer.into(),
            correct_answer: None,
            reason: Some(FailureReason::WordLimitExceeded),
            max_words: Some(max_words),
        }
    }
}

/// Family-specific diagnostic breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GradingDetails {
    /// Completion, matching, TFNG and diagram questions.
    Parts {
        parts: BTreeMap<String, PartResult>,
        correct_count: usize,
        total: usize,
    },
    /// Multiple choice.
    Choice {
        selected: Vec<String>,
        correct: Vec<String>,
    },
    /// Short answer and legacy single-value questions.
    Text {
        user_answer: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<FailureReason>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_words: Option<usize>,
    },
}

/// The uniform output of every grader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradingResult {
    /// True only if every sub-part is fully correct.
    pub is_correct: bool,
    /// Fraction of credit earned, in `[0, 1]`.
    pub score: f64,
    pub details: GradingDetails,
}

impl GradingResult {
    /// Aggregate per-part outcomes. The denominator is the number of parts,
    /// floored to one so an empty key scores zero instead of dividing by zero.
    /// A key with no parts is never correct.
    pub fn from_parts(parts: BTreeMap<String, PartResult>) -> Self {
        let total = parts.len();
        let correct_count = parts.values().filter(|p| p.correct).count();
        Self {
            is_correct: total > 0 && correct_count == total,
            score: correct_count as f64 / total.max(1) as f64,
            details: GradingDetails::Parts {
                parts,
                correct_count,
                total,
            },
        }
    }

    /// A binary text result.
    pub fn text(correct: bool, user_answer: impl Into<String>) -> Self {
        Self {
            is_correct: correct,
            score: if correct { 1.0 } else { 0.0 },
            details: GradingDetails::Text {
                user_answer: user_answer.into(),
                reason: None,
                max_words: None,
            },
        }
    }

    /// A text answer rejected for length.
    pub fn over_word_limit(user_answer: impl Into<String>, max_words: usize) -> Self {
        Self {
            is_correct: false,
            score: 0.0,
            details: GradingDetails::Text {
                user_answer: user_answer.into(),
                reason: Some(FailureReason::WordLimitExceeded),
                max_words: Some(max_words),
            },
        }
    }

    /// The worst case: nothing could be compared.
    pub fn mismatched() -> Self {
        Self {
            is_correct: false,
            score: 0.0,
            details: GradingDetails::Text {
                user_answer: String::new(),
                reason: Some(FailureReason::ShapeMismatch),
                max_words: None,
            },
        }
    }

    /// The failure reason of a single-valued result, if any.
    pub fn reason(&self) -> Option<FailureReason> {
        match &self.details {
            GradingDetails::Text { reason, .. } => *reason,
            _ => None,
        }
    }
}
