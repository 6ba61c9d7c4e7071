//! Authoring-time validation.
//!
//! Grading is deliberately forgiving, so broken questions surface only as
//! candidates who can never score. This pass reads questions strictly and
//! reports what would silently degrade, before an exam goes live.

use std::collections::{BTreeSet, HashSet};
use std::fmt;

use serde::Serialize;

use crate::answer::{AnswerKey, TypeConfig};
use crate::config::GradingDefaults;
use crate::family::Family;
use crate::model::{Exam, Question};

/// A problem found in an exam or question.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationWarning {
    /// The question ID (if applicable).
    pub question_id: Option<String>,
    pub message: String,
}

impl ValidationWarning {
    fn question(id: &str, message: impl Into<String>) -> Self {
        Self {
            question_id: Some(id.to_string()),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.question_id {
            Some(id) => write!(f, "[{id}] {}", self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

const TFNG_VALUES: &[&str] = &["TRUE", "FALSE", "NOT GIVEN", "YES", "NO"];

/// `[BLANK_3]` style markers in a completion template, as blank ids.
fn template_markers(template: &str) -> BTreeSet<String> {
    let mut markers = BTreeSet::new();
    let mut rest = template;
    while let Some(start) = rest.find("[BLANK_") {
        let after = &rest[start + 1..];
        let digits = after["BLANK_".len()..]
            .chars()
            .take_while(char::is_ascii_digit)
            .count();
        let id_len = "BLANK_".len() + digits;
        if digits > 0 && after[id_len..].starts_with(']') {
            markers.insert(after[..id_len].to_string());
        }
        rest = &after[id_len..];
    }
    markers
}

/// Check a single question. An empty list means it grades as authored.
pub fn validate_question(question: &Question, defaults: &GradingDefaults) -> Vec<ValidationWarning> {
    let id = question.id.as_str();
    let family = question.family();

    let Some(answer_data) = &question.answer_data else {
        if question.legacy_answers.is_empty() {
            return vec![ValidationWarning::question(
                id,
                "no answer data or legacy answers; it can never be marked correct",
            )];
        }
        return question
            .legacy_answers
            .iter()
            .filter(|a| a.correct_answer.trim().is_empty())
            .map(|_| ValidationWarning::question(id, "legacy answer has an empty correct_answer"))
            .collect();
    };

    let mut warnings = Vec::new();
    let key = AnswerKey::strict(family, answer_data);
    let config = TypeConfig::strict(family, &question.type_config, defaults);

    if let Err(e) = &key {
        warnings.push(ValidationWarning::question(id, e.to_string()));
    }
    if let Err(e) = &config {
        warnings.push(ValidationWarning::question(id, e.to_string()));
    }
    let (Ok(key), Ok(config)) = (key, config) else {
        return warnings;
    };

    let mut warn = |message: String| warnings.push(ValidationWarning::question(id, message));

    match (&key, &config) {
        (AnswerKey::Completion(blanks), TypeConfig::Completion(c)) => {
            if blanks.is_empty() {
                warn("completion question has no blanks".into());
            }
            let configured: BTreeSet<String> = c.blanks.keys().cloned().collect();
            if let Some(template) = &c.template {
                let markers = template_markers(template);
                let expected = if configured.is_empty() {
                    blanks.keys().cloned().collect()
                } else {
                    configured.clone()
                };
                if markers != expected {
                    warn(format!(
                        "template blanks {markers:?} don't match defined blanks {expected:?}"
                    ));
                }
            }
            for blank_id in &configured {
                if !blanks
                    .get(blank_id)
                    .is_some_and(|answers| answers.iter().any(|a| !a.trim().is_empty()))
                {
                    warn(format!("missing correct answer for {blank_id}"));
                }
            }
        }
        (AnswerKey::Matching(mappings), TypeConfig::Matching(c)) => {
            if c.items.is_empty() || c.options.is_empty() {
                warn("matching questions require items and options".into());
            }
            if !c.allow_option_reuse && c.options.len() < c.items.len() {
                warn("must have at least as many options as items".into());
            }
            for item in &c.items {
                if !mappings.contains_key(item) {
                    warn(format!("missing answer mapping for item {item}"));
                }
            }
            if !c.options.is_empty() {
                for (item, option) in mappings {
                    if !c.options.iter().any(|o| o.eq_ignore_ascii_case(option.trim())) {
                        warn(format!("invalid option {option} for item {item}"));
                    }
                }
            }
        }
        (AnswerKey::Mcq(correct), TypeConfig::Mcq(c)) => {
            if c.options.len() < 2 {
                warn("multiple choice requires at least 2 options".into());
            }
            if correct.is_empty() {
                warn("must have at least 1 correct answer".into());
            } else if !c.allow_multiple && correct.len() != 1 {
                warn("single-select MCQ must have exactly 1 correct answer".into());
            }
            for answer in correct {
                if !c.options.is_empty() && !c.options.iter().any(|o| o.eq_ignore_ascii_case(answer.trim())) {
                    warn(format!("invalid correct answer {answer}"));
                }
            }
        }
        (AnswerKey::Tfng(answers), TypeConfig::Tfng) => {
            if answers.is_empty() {
                warn("no statements to grade".into());
            }
            for (statement, value) in answers {
                let canonical = value.to_uppercase().replace('_', " ");
                if !TFNG_VALUES.contains(&canonical.trim()) {
                    warn(format!("statement {statement} has unrecognised answer {value}"));
                }
            }
        }
        (AnswerKey::Diagram(labels), TypeConfig::Diagram(c)) => {
            if !c.image_url.as_deref().is_some_and(|url| !url.trim().is_empty()) {
                warn("diagram questions require an image".into());
            }
            if c.labels.is_empty() {
                warn("diagram must have at least 1 label".into());
            }
            for label in &c.labels {
                if !labels.contains_key(label) {
                    warn(format!("missing answer for label {label}"));
                }
            }
        }
        (AnswerKey::ShortAnswer(answers), TypeConfig::ShortAnswer(_)) => {
            if answers.iter().all(|a| a.trim().is_empty()) {
                warn("short answer question has no accepted answers".into());
            }
        }
        (AnswerKey::Simple(simple), TypeConfig::Simple) => {
            if simple.correct_answer.trim().is_empty() {
                warn("correct_answer is empty".into());
            }
        }
        _ => warn(format!("answer data and type config disagree on family {family}")),
    }

    warnings
}

/// Validate every question plus exam-wide rules.
pub fn validate_exam(exam: &Exam, defaults: &GradingDefaults) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if exam.questions.is_empty() {
        warnings.push(ValidationWarning {
            question_id: None,
            message: format!("exam {} has no questions", exam.id),
        });
    }

    // Check for duplicate question IDs
    let mut seen_ids = HashSet::new();
    for question in &exam.questions {
        if !seen_ids.insert(&question.id) {
            warnings.push(ValidationWarning::question(
                &question.id,
                format!("duplicate question ID: {}", question.id),
            ));
        }
    }

    for question in &exam.questions {
        if let Some(marks) = question.marks.filter(|m| *m <= 0) {
            warnings.push(ValidationWarning::question(
                &question.id,
                format!("marks must be positive, got {marks}"),
            ));
        }

        let resolved = Family::from_question_type(&question.question_type);
        match question.family {
            None | Some(Family::Simple) if resolved == Family::Simple && question.answer_data.is_some() => {
                warnings.push(ValidationWarning::question(
                    &question.id,
                    format!(
                        "question type {} matches no family and will be graded as simple",
                        question.question_type
                    ),
                ));
            }
            Some(declared) if resolved != Family::Simple && declared != resolved => {
                warnings.push(ValidationWarning::question(
                    &question.id,
                    format!(
                        "declared family {declared} differs from {resolved} implied by {}",
                        question.question_type
                    ),
                ));
            }
            _ => {}
        }

        warnings.extend(validate_question(question, defaults));
    }

    warnings
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::*;
    use crate::family::Section;

    fn question(question_type: &str, answer_data: Value, type_config: Value) -> Question {
        Question {
            id: "q1".into(),
            section: Section::Listening,
            question_type: question_type.into(),
            family: None,
            text: String::new(),
            marks: None,
            answer_data: Some(answer_data),
            type_config,
            legacy_answers: vec![],
        }
    }

    fn messages(q: &Question) -> Vec<String> {
        validate_question(q, &GradingDefaults::default())
            .into_iter()
            .map(|w| w.message)
            .collect()
    }

    #[test]
    fn template_marker_extraction() {
        let markers = template_markers("Name: [BLANK_1]  Time: [BLANK_12] [BLANK_] [BLANK_3");
        assert_eq!(markers, BTreeSet::from(["BLANK_1".to_string(), "BLANK_12".to_string()]));
    }

    #[test]
    fn well_formed_completion_passes() {
        let q = question(
            "listening_form_completion",
            json!({"blanks": {"BLANK_1": ["9 am"], "BLANK_2": ["library"]}}),
            json!({
                "template": "Opens at [BLANK_1] next to the [BLANK_2]",
                "blanks": [{"blank_id": "BLANK_1"}, {"blank_id": "BLANK_2", "max_words": 1}]
            }),
        );
        assert!(messages(&q).is_empty(), "{:?}", messages(&q));
    }

    #[test]
    fn completion_template_mismatch_and_missing_answer() {
        let q = question(
            "listening_form_completion",
            json!({"blanks": {"BLANK_1": ["9 am"]}}),
            json!({
                "template": "Opens at [BLANK_1]",
                "blanks": [{"blank_id": "BLANK_1"}, {"blank_id": "BLANK_2"}]
            }),
        );
        let msgs = messages(&q);
        assert!(msgs.iter().any(|m| m.contains("don't match")));
        assert!(msgs.iter().any(|m| m.contains("missing correct answer for BLANK_2")));
    }

    #[test]
    fn strict_shape_errors_are_reported() {
        let q = question("reading_matching_headings", json!({"mappings": ["A"]}), Value::Null);
        let msgs = messages(&q);
        assert_eq!(msgs.len(), 1);
        assert!(msgs[0].contains("mappings"));
    }

    #[test]
    fn matching_rules() {
        let q = question(
            "reading_matching_headings",
            json!({"mappings": {"1": "A", "2": "Z"}}),
            json!({
                "items": [{"number": 1}, {"number": 2}, {"number": 3}],
                "options": [{"letter": "A"}, {"letter": "B"}]
            }),
        );
        let msgs = messages(&q);
        assert!(msgs.iter().any(|m| m.contains("as many options as items")));
        assert!(msgs.iter().any(|m| m.contains("item 3")));
        assert!(msgs.iter().any(|m| m.contains("invalid option Z")));
    }

    #[test]
    fn mcq_rules() {
        let q = question(
            "listening_multiple_choice",
            json!({"correct": ["A", "E"]}),
            json!({"options": [{"label": "A"}, {"label": "B"}, {"label": "C"}]}),
        );
        let msgs = messages(&q);
        assert!(msgs.iter().any(|m| m.contains("exactly 1")));
        assert!(msgs.iter().any(|m| m.contains("invalid correct answer E")));

        let lonely = question("listening_multiple_choice", json!({"correct": []}), json!({"options": ["A"]}));
        let msgs = messages(&lonely);
        assert!(msgs.iter().any(|m| m.contains("at least 2 options")));
        assert!(msgs.iter().any(|m| m.contains("at least 1 correct")));
    }

    #[test]
    fn diagram_rules() {
        let q = question(
            "listening_map_labeling",
            json!({"labels": {"L1": "bank"}}),
            json!({"labels": [{"id": "L1"}, {"id": "L2"}]}),
        );
        let msgs = messages(&q);
        assert!(msgs.iter().any(|m| m.contains("require an image")));
        assert!(msgs.iter().any(|m| m.contains("label L2")));
    }

    #[test]
    fn tfng_values_are_checked() {
        let q = question(
            "reading_true_false_not_given",
            json!({"answers": {"1": "not_given", "2": "MAYBE"}}),
            Value::Null,
        );
        assert_eq!(messages(&q), vec!["statement 2 has unrecognised answer MAYBE"]);
    }

    #[test]
    fn question_without_any_key() {
        let mut q = question("reading_short_answer", Value::Null, Value::Null);
        q.answer_data = None;
        assert!(messages(&q)[0].contains("can never be marked correct"));
    }

    #[test]
    fn exam_level_rules() {
        let mut first = question("reading_short_answer", json!({"correct_answers": ["x"]}), Value::Null);
        first.marks = Some(0);
        let duplicate = first.clone();
        let unknown = Question {
            id: "q2".into(),
            ..question("reading_essay", json!({"correct_answer": "x"}), Value::Null)
        };
        let exam = Exam {
            id: "e1".into(),
            name: "Exam".into(),
            description: String::new(),
            questions: vec![first, duplicate, unknown],
        };
        let warnings = validate_exam(&exam, &GradingDefaults::default());
        assert!(warnings.iter().any(|w| w.message.contains("duplicate question ID")));
        assert!(warnings.iter().any(|w| w.message.contains("marks must be positive")));
        assert!(warnings
            .iter()
            .any(|w| w.question_id.as_deref() == Some("q2") && w.message.contains("graded as simple")));
    }

    #[test]
    fn warning_display() {
        let w = ValidationWarning::question("q9", "bad");
        assert_eq!(w.to_string(), "[q9] bad");
    }
}
