use std::collections::BTreeMap;

use crate::answer::CompletionConfig;
use crate::results::{GradingResult, PartResult};
use crate::text::{acceptable_set, normalize, within_word_limit};

/// Grade a fill-in-the-blank question.
///
/// Each blank is checked against its word budget first; an answer over the
/// limit is wrong without comparing text. Otherwise the normalized answer
/// must appear among the expanded, normalized acceptable answers.
pub fn grade_completion(
    key: &BTreeMap<String, Vec<String>>,
    submitted: &BTreeMap<String, String>,
    config: &CompletionConfig,
) -> GradingResult {
    let parts = key
        .iter()
        .map(|(blank_id, accepted)| {
            let user = submitted.get(blank_id).map(String::as_str).unwrap_or_default();
            let blank = config.blank(blank_id);

            let part = if !within_word_limit(user, blank.max_words) {
                PartResult::over_word_limit(user, blank.max_words)
            } else {
                let acceptable = acceptable_set(accepted.iter().map(String::as_str), blank.case_sensitive);
                PartResult::graded(acceptable.contains(&normalize(user, blank.case_sensitive)), user)
            };

            (blank_id.clone(), part)
        })
        .collect();

    GradingResult::from_parts(parts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::answer::BlankConfig;
    use crate::results::{FailureReason, GradingDetails};

    fn config(max_words: usize, case_sensitive: bool) -> CompletionConfig {
        CompletionConfig {
            blanks: BTreeMap::new(),
            default_blank: BlankConfig {
                max_words,
                case_sensitive,
            },
            template: None,
        }
    }

    fn key(entries: &[(&str, &[&str])]) -> BTreeMap<String, Vec<String>> {
        entries
            .iter()
            .map(|(id, answers)| (id.to_string(), answers.iter().map(|a| a.to_string()).collect()))
            .collect()
    }

    fn answers(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
        entries
            .iter()
            .map(|(id, text)| (id.to_string(), text.to_string()))
            .collect()
    }

    #[test]
    fn matches_any_alternative_case_insensitively() {
        let result = grade_completion(
            &key(&[("BLANK_1", &["9 am", "nine am"])]),
            &answers(&[("BLANK_1", "9 AM")]),
            &config(3, false),
        );
        assert!(result.is_correct);
        assert_eq!(result.score, 1.0);
    }

    #[test]
    fn expands_optional_words() {
        let key = key(&[("BLANK_1", &["(fast) food"])]);
        for text in ["fast food", "Food"] {
            let result = grade_completion(&key, &answers(&[("BLANK_1", text)]), &config(3, false));
            assert!(result.is_correct, "{text} should be accepted");
        }
    }

    #[test]
    fn case_sensitive_blank() {
        let mut cfg = config(3, false);
        cfg.blanks.insert(
            "BLANK_1".into(),
            BlankConfig {
                max_words: 3,
                case_sensitive: true,
            },
        );
        let result = grade_completion(
            &key(&[("BLANK_1", &["London"])]),
            &answers(&[("BLANK_1", "london")]),
            &cfg,
        );
        assert!(!result.is_correct);
    }

    #[test]
    fn omitted_blank_counts_against_the_score() {
        let result = grade_completion(
            &key(&[("BLANK_1", &["river"]), ("BLANK_2", &["bridge"])]),
            &answers(&[("BLANK_1", "river")]),
            &config(3, false),
        );
        assert!(!result.is_correct);
        assert_eq!(result.score, 0.5);
    }

    #[test]
    fn word_limit_short_circuits() {
        let result = grade_completion(
            &key(&[("BLANK_1", &["a very long reference answer"])]),
            &answers(&[("BLANK_1", "a very long reference answer")]),
            &config(2, false),
        );
        let GradingDetails::Parts { parts, .. } = &result.details else {
            panic!("expected part details");
        };
        assert_eq!(parts["BLANK_1"].reason, Some(FailureReason::WordLimitExceeded));
        assert_eq!(parts["BLANK_1"].max_words, Some(2));
        assert_eq!(result.score, 0.0);
    }

    #[test]
    fn blank_reference_never_matches() {
        let result = grade_completion(
            &key(&[("BLANK_1", &[""])]),
            &answers(&[]),
            &config(3, false),
        );
        assert!(!result.is_correct);
    }
}
