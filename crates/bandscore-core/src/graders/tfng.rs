use std::collections::BTreeMap;

use crate::results::{GradingResult, PartResult};

/// `not_given`, `NOT GIVEN` and ` Not Given ` all read as `NOT GIVEN`.
fn canonical(value: &str) -> String {
    value.to_uppercase().replace('_', " ").trim().to_string()
}

/// Grade a True/False/Not Given or Yes/No/Not Given question.
pub fn grade_tfng(key: &BTreeMap<String, String>, submitted: &BTreeMap<String, String>) -> GradingResult {
    let parts = key
        .iter()
        .map(|(statement, reference)| {
            let user = submitted.get(statement).map(String::as_str).unwrap_or_default();
            let expected = canonical(reference);
            let correct = !expected.is_empty() && canonical(user) == expected;
            (
                statement.clone(),
                PartResult::graded(correct, user).with_correct_answer(reference),
            )
        })
        .collect();

    GradingResult::from_parts(parts)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn underscore_and_space_spellings_match() {
        let key = map(&[("1", "NOT GIVEN")]);
        assert!(grade_tfng(&key, &map(&[("1", "NOT_GIVEN")])).is_correct);
        assert!(grade_tfng(&key, &map(&[("1", "not given")])).is_correct);
    }

    #[test]
    fn partial_credit_across_statements() {
        let key = map(&[("1", "TRUE"), ("2", "FALSE"), ("3", "NOT GIVEN"), ("4", "YES")]);
        let result = grade_tfng(&key, &map(&[("1", "true"), ("2", "TRUE"), ("4", "yes")]));
        assert!(!result.is_correct);
        assert_eq!(result.score, 0.5);
    }
}
