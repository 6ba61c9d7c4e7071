use std::collections::BTreeMap;

use crate::results::{GradingResult, PartResult};

fn same_letter(user: &str, reference: &str) -> bool {
    let reference = reference.trim();
    !reference.is_empty() && user.trim().to_uppercase() == reference.to_uppercase()
}

/// Grade a matching question: each item's chosen option letter must equal
/// the reference letter, ignoring case.
pub fn grade_matching(
    key: &BTreeMap<String, String>,
    submitted: &BTreeMap<String, String>,
) -> GradingResult {
    let parts = key
        .iter()
        .map(|(item, reference)| {
            let user = submitted.get(item).map(String::as_str).unwrap_or_default();
            let part = PartResult::graded(same_letter(user, reference), user).with_correct_answer(reference);
            (item.clone(), part)
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
    fn letters_compare_case_insensitively() {
        let key = map(&[("1", "A"), ("2", "B"), ("3", "C")]);
        let result = grade_matching(&key, &map(&[("1", "a"), ("2", "B"), ("3", "D")]));
        assert!(!result.is_correct);
        assert!((result.score - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn all_items_correct() {
        let key = map(&[("1", "A"), ("2", "C")]);
        let result = grade_matching(&key, &map(&[("1", "A"), ("2", "c ")]));
        assert!(result.is_correct);
        assert_eq!(result.score, 1.0);
    }

    #[test]
    fn extra_submitted_items_are_ignored() {
        let key = map(&[("1", "A")]);
        let result = grade_matching(&key, &map(&[("1", "A"), ("9", "Z")]));
        assert!(result.is_correct);
    }
}
