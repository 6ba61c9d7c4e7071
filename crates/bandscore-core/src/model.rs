//! Exam and attempt data model.
//!
//! Questions keep `answer_data` and `type_config` as loose JSON; the
//! dispatcher reads them into typed shapes per family at grading time.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::GradingError;
use crate::family::{Family, Section};
use crate::rubric::{Review, SpeakingGrade, WritingGrade};

/// A legacy answer record: one accepted text plus alternates, compared by
/// trimmed equality without optional-word expansion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyAnswer {
    pub correct_answer: String,
    #[serde(default)]
    pub alternative_answers: Vec<String>,
    #[serde(default)]
    pub case_sensitive: bool,
}

/// A gradable question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub section: Section,
    /// Type identifier such as `"listening_form_completion"`.
    pub question_type: String,
    /// Resolved grading family. Filled from `question_type` at load time
    /// when the file leaves it out.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family: Option<Family>,
    /// Prompt shown to the test-taker.
    #[serde(default)]
    pub text: String,
    /// Marks awarded when fully correct. Falls back to the configured default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marks: Option<i64>,
    /// Structured answer key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer_data: Option<Value>,
    /// Per-family grading parameters.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub type_config: Value,
    /// Answer records used only when `answer_data` is absent.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub legacy_answers: Vec<LegacyAnswer>,
}

impl Question {
    /// The grading family, resolving from the type identifier if unset.
    pub fn family(&self) -> Family {
        self.family
            .unwrap_or_else(|| Family::from_question_type(&self.question_type))
    }

    /// Store the resolved family so later lookups skip string matching.
    pub fn resolve_family(&mut self) {
        if self.family.is_none() {
            self.family = Some(Family::from_question_type(&self.question_type));
        }
    }

    /// Marks for this question. Non-positive marks count as zero.
    pub fn marks_or(&self, default: u32) -> u32 {
        match self.marks {
            None => default,
            Some(m) => u32::try_from(m.max(0)).unwrap_or(u32::MAX),
        }
    }
}

/// A set of questions graded together.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exam {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub questions: Vec<Question>,
}

impl Exam {
    pub fn question(&self, id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    /// Questions belonging to `section`, in file order.
    pub fn section_questions(&self, section: Section) -> impl Iterator<Item = &Question> {
        self.questions.iter().filter(move |q| q.section == section)
    }
}

/// Lifecycle of a test attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptStatus {
    #[default]
    InProgress,
    Submitted,
    Graded,
}

impl AttemptStatus {
    /// Submitted by the test-taker, whether or not grading has run.
    pub fn is_submitted(self) -> bool {
        matches!(self, AttemptStatus::Submitted | AttemptStatus::Graded)
    }
}

impl fmt::Display for AttemptStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptStatus::InProgress => write!(f, "in_progress"),
            AttemptStatus::Submitted => write!(f, "submitted"),
            AttemptStatus::Graded => write!(f, "graded"),
        }
    }
}

impl FromStr for AttemptStatus {
    type Err = GradingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "in_progress" => Ok(AttemptStatus::InProgress),
            "submitted" => Ok(AttemptStatus::Submitted),
            "graded" => Ok(AttemptStatus::Graded),
            other => Err(GradingError::UnknownStatus(other.to_string())),
        }
    }
}

/// Human review state of a writing or speaking task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    #[default]
    Pending,
    UnderReview,
    Graded,
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReviewStatus::Pending => write!(f, "pending"),
            ReviewStatus::UnderReview => write!(f, "under_review"),
            ReviewStatus::Graded => write!(f, "graded"),
        }
    }
}

impl FromStr for ReviewStatus {
    type Err = GradingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(ReviewStatus::Pending),
            "under_review" => Ok(ReviewStatus::UnderReview),
            "graded" => Ok(ReviewStatus::Graded),
            other => Err(GradingError::UnknownStatus(other.to_string())),
        }
    }
}

/// One test-taker's attempt at an exam.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attempt {
    pub attempt_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub candidate: Option<String>,
    #[serde(default)]
    pub status: AttemptStatus,
    /// Question id → raw submitted answer.
    #[serde(default)]
    pub answers: BTreeMap<String, Value>,
    #[serde(default)]
    pub writing: Vec<Review<WritingGrade>>,
    #[serde(default)]
    pub speaking: Vec<Review<SpeakingGrade>>,
}

/// A submitted answer as received from a client.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionPayload {
    /// A JSON object or array.
    Structured(Value),
    /// Anything else, kept verbatim.
    Text(String),
}

impl SubmissionPayload {
    /// Decode a raw payload: text holding a JSON object or array is read
    /// structurally, everything else stays literal. `"42"` and `"true"` are
    /// answers, not JSON.
    pub fn decode(raw: &str) -> SubmissionPayload {
        match serde_json::from_str::<Value>(raw) {
            Ok(value @ (Value::Object(_) | Value::Array(_))) => SubmissionPayload::Structured(value),
            _ => SubmissionPayload::Text(raw.to_string()),
        }
    }

    /// Normalize an answer already parsed from JSON: strings get a second
    /// decode pass, other values pass through.
    pub fn from_value(value: Value) -> SubmissionPayload {
        match value {
            Value::String(raw) => SubmissionPayload::decode(&raw),
            other => SubmissionPayload::Structured(other),
        }
    }

    pub fn into_value(self) -> Value {
        match self {
            SubmissionPayload::Structured(value) => value,
            SubmissionPayload::Text(text) => Value::String(text),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn question(question_type: &str) -> Question {
        Question {
            id: "q1".into(),
            section: Section::Reading,
            question_type: question_type.into(),
            family: None,
            text: String::new(),
            marks: None,
            answer_data: None,
            type_config: Value::Null,
            legacy_answers: vec![],
        }
    }

    #[test]
    fn family_resolves_once() {
        let mut q = question("reading_matching_headings");
        assert_eq!(q.family(), Family::Matching);
        q.resolve_family();
        assert_eq!(q.family, Some(Family::Matching));

        let mut pinned = question("reading_matching_headings");
        pinned.family = Some(Family::Simple);
        pinned.resolve_family();
        assert_eq!(pinned.family(), Family::Simple);
    }

    #[test]
    fn marks_fallbacks() {
        let mut q = question("reading_short_answer");
        assert_eq!(q.marks_or(1), 1);
        q.marks = Some(3);
        assert_eq!(q.marks_or(1), 3);
        q.marks = Some(-2);
        assert_eq!(q.marks_or(1), 0);
    }

    #[test]
    fn decode_payloads() {
        assert_eq!(
            SubmissionPayload::decode(r#"{"blanks": {"BLANK_1": "9 am"}}"#),
            SubmissionPayload::Structured(json!({"blanks": {"BLANK_1": "9 am"}}))
        );
        assert_eq!(
            SubmissionPayload::decode(r#"["A", "C"]"#),
            SubmissionPayload::Structured(json!(["A", "C"]))
        );
        assert_eq!(SubmissionPayload::decode("9 am"), SubmissionPayload::Text("9 am".into()));
        assert_eq!(SubmissionPayload::decode("42"), SubmissionPayload::Text("42".into()));
        assert_eq!(SubmissionPayload::decode("{broken"), SubmissionPayload::Text("{broken".into()));
    }

    #[test]
    fn from_value_decodes_embedded_json() {
        let value = SubmissionPayload::from_value(json!("{\"selected\": [\"B\"]}")).into_value();
        assert_eq!(value, json!({"selected": ["B"]}));
        assert_eq!(SubmissionPayload::from_value(json!(7)).into_value(), json!(7));
    }

    #[test]
    fn status_parse_and_display() {
        for status in [AttemptStatus::InProgress, AttemptStatus::Submitted, AttemptStatus::Graded] {
            assert_eq!(status.to_string().parse::<AttemptStatus>().unwrap(), status);
        }
        assert_eq!("Under_Review".parse::<ReviewStatus>().unwrap(), ReviewStatus::UnderReview);
        assert!(matches!("done".parse::<ReviewStatus>(), Err(GradingError::UnknownStatus(_))));
        assert!(AttemptStatus::Graded.is_submitted());
        assert!(!AttemptStatus::InProgress.is_submitted());
    }

    #[test]
    fn attempt_deserializes_with_defaults() {
        let attempt: Attempt = serde_json::from_value(json!({
            "attempt_id": "a-1",
            "answers": {"q1": "TRUE"}
        }))
        .unwrap();
        assert_eq!(attempt.status, AttemptStatus::InProgress);
        assert!(attempt.writing.is_empty());
        assert_eq!(attempt.answers["q1"], json!("TRUE"));
    }
}
