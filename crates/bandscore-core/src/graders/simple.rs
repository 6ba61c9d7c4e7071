use std::iter;

use crate::answer::SimpleKey;
use crate::results::GradingResult;
use crate::text::{acceptable_set, normalize};

/// Grade a legacy single-value question against its primary answer and
/// alternates, all expanded for optional words.
pub fn grade_simple(key: &SimpleKey, text: &str) -> GradingResult {
    let references = iter::once(key.correct_answer.as_str())
        .chain(key.alternative_answers.iter().map(String::as_str));
    let acceptable = acceptable_set(references, key.case_sensitive);
    GradingResult::text(acceptable.contains(&normalize(text, key.case_sensitive)), text)
}
