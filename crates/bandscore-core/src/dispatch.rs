//! Question dispatch.
//!
//! Routes a question to its family grader. The string-typed entry point,
//! [`grade_question`], never fails: payloads are read leniently and any
//! mismatch degrades to an incorrect result.

use serde_json::Value;

use crate::answer::{AnswerKey, Submission, TypeConfig};
use crate::config::GradingDefaults;
use crate::family::Family;
use crate::graders;
use crate::model::{LegacyAnswer, Question};
use crate::results::GradingResult;
use crate::text::normalize;

/// Grade typed inputs. All three must belong to the same family.
pub fn grade(key: &AnswerKey, submission: &Submission, config: &TypeConfig) -> GradingResult {
    match (key, submission, config) {
        (AnswerKey::Completion(k), Submission::Completion(s), TypeConfig::Completion(c)) => {
            graders::grade_completion(k, s, c)
        }
        (AnswerKey::Matching(k), Submission::Matching(s), TypeConfig::Matching(_)) => {
            graders::grade_matching(k, s)
        }
        (AnswerKey::Mcq(k), Submission::Mcq(s), TypeConfig::Mcq(c)) => graders::grade_mcq(k, s, c),
        (AnswerKey::Tfng(k), Submission::Tfng(s), TypeConfig::Tfng) => graders::grade_tfng(k, s),
        (AnswerKey::Diagram(k), Submission::Diagram(s), TypeConfig::Diagram(c)) => {
            graders::grade_diagram(k, s, c)
        }
        (AnswerKey::ShortAnswer(k), Submission::ShortAnswer(s), TypeConfig::ShortAnswer(c)) => {
            graders::grade_short_answer(k, s, c)
        }
        (AnswerKey::Simple(k), Submission::Simple(s), TypeConfig::Simple) => graders::grade_simple(k, s),
        _ => {
            tracing::debug!(
                key = %key.family(),
                submission = %submission.family(),
                config = %config.family(),
                "family mismatch, grading as incorrect"
            );
            GradingResult::mismatched()
        }
    }
}

/// Grade a question from its raw type identifier and JSON payloads using
/// default word limits.
pub fn grade_question(
    question_type: &str,
    submitted: &Value,
    answer_data: &Value,
    type_config: &Value,
) -> GradingResult {
    Dispatcher::default().grade_question(question_type, submitted, answer_data, type_config)
}

/// Grades questions with configured fallback limits.
#[derive(Debug, Clone, Default)]
pub struct Dispatcher {
    defaults: GradingDefaults,
}

impl Dispatcher {
    pub fn new(defaults: GradingDefaults) -> Self {
        Self { defaults }
    }

    pub fn defaults(&self) -> &GradingDefaults {
        &self.defaults
    }

    /// Grade raw payloads for a known family.
    pub fn grade_family(
        &self,
        family: Family,
        submitted: &Value,
        answer_data: &Value,
        type_config: &Value,
    ) -> GradingResult {
        let key = AnswerKey::lenient(family, answer_data);
        let submission = Submission::lenient(family, submitted);
        let config = TypeConfig::lenient(family, type_config, &self.defaults);
        grade(&key, &submission, &config)
    }

    pub fn grade_question(
        &self,
        question_type: &str,
        submitted: &Value,
        answer_data: &Value,
        type_config: &Value,
    ) -> GradingResult {
        let family = Family::from_question_type(question_type);
        if family == Family::Simple {
            tracing::debug!(question_type, "no family keyword matched, using simple grader");
        }
        self.grade_family(family, submitted, answer_data, type_config)
    }

    /// Grade a stored question. Structured `answer_data` wins; legacy answer
    /// records are consulted only without it; a question with neither is
    /// always incorrect.
    pub fn grade_submission(&self, question: &Question, submitted: &Value) -> GradingResult {
        if let Some(answer_data) = &question.answer_data {
            return self.grade_family(question.family(), submitted, answer_data, &question.type_config);
        }

        let Submission::Simple(text) = Submission::lenient(Family::Simple, submitted) else {
            return GradingResult::mismatched();
        };

        if question.legacy_answers.is_empty() {
            tracing::debug!(question = %question.id, "question has no answer key");
            return GradingResult::text(false, text);
        }

        tracing::debug!(question = %question.id, "grading against legacy answer records");
        let correct = question
            .legacy_answers
            .iter()
            .any(|record| legacy_matches(record, &text));
        GradingResult::text(correct, text)
    }
}

fn legacy_matches(record: &LegacyAnswer, text: &str) -> bool {
    let user = normalize(text, record.case_sensitive);
    std::iter::once(&record.correct_answer)
        .chain(&record.alternative_answers)
        .filter(|accepted| !accepted.trim().is_empty())
        .any(|accepted| normalize(accepted, record.case_sensitive) == user)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::family::Section;
    use crate::results::{FailureReason, GradingDetails};

    #[test]
    fn completion_example() {
        let result = grade_question(
            "listening_form_completion",
            &json!({"blanks": {"BLANK_1": "9 am"}}),
            &json!({"blanks": {"BLANK_1": ["9 am", "nine am"]}}),
            &json!({"blanks": [{"blank_id": "BLANK_1", "case_sensitive": false}]}),
        );
        assert!(result.is_correct);
        assert_eq!(result.score, 1.0);
    }

    #[test]
    fn short_answer_word_limit() {
        let result = grade_question(
            "reading_short_answer",
            &json!({"text": "the phenomenon of global warming"}),
            &json!({"correct_answers": ["the phenomenon of global warming"]}),
            &json!({"max_words": 2}),
        );
        assert!(!result.is_correct);
        assert_eq!(result.reason(), Some(FailureReason::WordLimitExceeded));
    }

    #[test]
    fn tfng_tolerates_underscores() {
        let result = grade_question(
            "reading_true_false_not_given",
            &json!({"answers": {"1": "NOT_GIVEN"}}),
            &json!({"answers": {"1": "NOT GIVEN"}}),
            &Value::Null,
        );
        assert!(result.is_correct);
    }

    #[test]
    fn mcq_partial_credit_through_dispatch() {
        let answer_data = json!({"correct_options": ["A", "C"]});
        let config = json!({"allow_multiple": true});
        let half = grade_question("listening_multiple_choice", &json!({"selected": ["A"]}), &answer_data, &config);
        assert_eq!(half.score, 0.5);
        let cancelled = grade_question("listening_multiple_choice", &json!(["A", "B"]), &answer_data, &config);
        assert_eq!(cancelled.score, 0.0);
    }

    #[test]
    fn malformed_payloads_never_panic() {
        let garbage = [json!(null), json!(42), json!("text"), json!([1, [2]]), json!({"x": {"y": 1}})];
        for family in Family::ALL {
            for submitted in &garbage {
                for answer_data in &garbage {
                    let result = Dispatcher::default().grade_family(family, submitted, answer_data, &json!("bad"));
                    assert!((0.0..=1.0).contains(&result.score));
                }
            }
        }
    }

    #[test]
    fn unknown_type_uses_simple_grader() {
        let result = grade_question(
            "writing_essay_prompt",
            &json!("Paris"),
            &json!({"correct_answer": "paris"}),
            &Value::Null,
        );
        assert!(result.is_correct);
    }

    #[test]
    fn mismatched_typed_inputs() {
        let result = grade(
            &AnswerKey::Tfng(Default::default()),
            &Submission::Mcq(vec!["A".into()]),
            &TypeConfig::Tfng,
        );
        assert!(!result.is_correct);
        assert_eq!(result.reason(), Some(FailureReason::ShapeMismatch));
    }

    fn question(answer_data: Option<Value>, legacy: Vec<LegacyAnswer>) -> Question {
        Question {
            id: "r7".into(),
            section: Section::Reading,
            question_type: "reading_short_answer".into(),
            family: None,
            text: String::new(),
            marks: None,
            answer_data,
            type_config: Value::Null,
            legacy_answers: legacy,
        }
    }

    fn legacy(answer: &str, alternates: &[&str]) -> LegacyAnswer {
        LegacyAnswer {
            correct_answer: answer.into(),
            alternative_answers: alternates.iter().map(|a| a.to_string()).collect(),
            case_sensitive: false,
        }
    }

    #[test]
    fn structured_key_wins_over_legacy() {
        let q = question(
            Some(json!({"correct_answers": ["canal"]})),
            vec![legacy("river", &[])],
        );
        let dispatcher = Dispatcher::default();
        assert!(dispatcher.grade_submission(&q, &json!("Canal")).is_correct);
        assert!(!dispatcher.grade_submission(&q, &json!("river")).is_correct);
    }

    #[test]
    fn legacy_records_without_expansion() {
        let q = question(None, vec![legacy("(the) river", &["stream"])]);
        let dispatcher = Dispatcher::default();
        assert!(dispatcher.grade_submission(&q, &json!(" STREAM ")).is_correct);
        assert!(dispatcher.grade_submission(&q, &json!("(the) river")).is_correct);
        assert!(!dispatcher.grade_submission(&q, &json!("river")).is_correct);
    }

    #[test]
    fn no_key_at_all_is_incorrect() {
        let result = Dispatcher::default().grade_submission(&question(None, vec![]), &json!("anything"));
        assert!(!result.is_correct);
        assert!(matches!(result.details, GradingDetails::Text { .. }));
    }

    #[test]
    fn configured_defaults_apply() {
        let dispatcher = Dispatcher::new(GradingDefaults {
            short_answer_max_words: 1,
            ..GradingDefaults::default()
        });
        let result = dispatcher.grade_question(
            "reading_short_answer",
            &json!("solar panels"),
            &json!({"correct_answers": ["solar panels"]}),
            &Value::Null,
        );
        assert_eq!(result.reason(), Some(FailureReason::WordLimitExceeded));
    }
}
