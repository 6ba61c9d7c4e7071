use std::collections::BTreeMap;

use crate::answer::{DiagramConfig, LabelAnswer};
use crate::results::{GradingResult, PartResult};
use crate::text::{acceptable_set, normalize, within_word_limit};

fn label_matches(answer: &LabelAnswer, user: &str) -> bool {
    let user = normalize(user, false);
    match answer {
        LabelAnswer::Alternatives(alternatives) => alternatives
            .iter()
            .filter(|alt| !alt.trim().is_empty())
            .any(|alt| normalize(alt, false) == user),
        LabelAnswer::Single(single) => acceptable_set([single.as_str()], false).contains(&user),
    }
}

/// Grade a diagram, map or flowchart labeling question. Matching is always
/// case-insensitive; only single-string answers get optional-word expansion.
pub fn grade_diagram(
    key: &BTreeMap<String, LabelAnswer>,
    submitted: &BTreeMap<String, String>,
    config: &DiagramConfig,
) -> GradingResult {
    let max_words = config.max_words_per_label;
    let parts = key
        .iter()
        .map(|(label, answer)| {
            let user = submitted.get(label).map(String::as_str).unwrap_or_default();
            let part = if within_word_limit(user, max_words) {
                PartResult::graded(label_matches(answer, user), user)
            } else {
                PartResult::over_word_limit(user, max_words)
            };
            (label.clone(), part)
        })
        .collect();

    GradingResult::from_parts(parts)
}
