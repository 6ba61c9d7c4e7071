use std::collections::BTreeSet;

use crate::answer::McqConfig;
use crate::results::{GradingDetails, GradingResult};

fn letters(values: &[String]) -> Vec<String> {
    values
        .iter()
        .map(|v| v.trim().to_uppercase())
        .filter(|v| !v.is_empty())
        .collect()
}

/// Grade a multiple-choice question.
///
/// Single-select is all or nothing. Multi-select earns
/// `max(0, (right - wrong) / |correct|)`, so each extra guess cancels one
/// correct pick. Either way `is_correct` requires the exact reference set.
pub fn grade_mcq(correct: &[String], selected: &[String], config: &McqConfig) -> GradingResult {
    let selected = letters(selected);
    let correct = letters(correct);

    let user_set: BTreeSet<&str> = selected.iter().map(String::as_str).collect();
    let correct_set: BTreeSet<&str> = correct.iter().map(String::as_str).collect();

    let is_correct = !correct_set.is_empty() && user_set == correct_set;

    let score = if config.allow_multiple && !correct_set.is_empty() {
        let right = user_set.intersection(&correct_set).count() as f64;
        let wrong = user_set.difference(&correct_set).count() as f64;
        ((right - wrong) / correct_set.len() as f64).max(0.0)
    } else if is_correct {
        1.0
    } else {
        0.0
    };

    GradingResult {
        is_correct,
        score,
        details: GradingDetails::Choice { selected, correct },
    }
}
