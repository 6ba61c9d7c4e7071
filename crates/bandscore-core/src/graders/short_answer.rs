use crate::answer::ShortAnswerConfig;
use crate::results::GradingResult;
use crate::text::{acceptable_set, normalize, within_word_limit};

/// Grade a short-answer question against every acceptable answer,
/// expanding optional words. Over-long answers are rejected unread.
pub fn grade_short_answer(accepted: &[String], text: &str, config: &ShortAnswerConfig) -> GradingResult {
    if !within_word_limit(text, config.max_words) {
        return GradingResult::over_word_limit(text, config.max_words);
    }

    let acceptable = acceptable_set(accepted.iter().map(String::as_str), config.case_sensitive);
    GradingResult::text(acceptable.contains(&normalize(text, config.case_sensitive)), text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::results::FailureReason;

    fn config(max_words: usize) -> ShortAnswerConfig {
        ShortAnswerConfig {
            max_words,
            case_sensitive: false,
        }
    }

    #[test]
    fn accepts_expanded_variants() {
        let accepted = vec!["(solar) panels".to_string(), "photovoltaic cells".to_string()];
        for text in ["panels", "Solar Panels", " photovoltaic cells "] {
            assert!(grade_short_answer(&accepted, text, &config(3)).is_correct, "{text}");
        }
        assert!(!grade_short_answer(&accepted, "wind turbines", &config(3)).is_correct);
    }

    #[test]
    fn word_limit_wins_over_content() {
        let accepted = vec!["the phenomenon of global warming".to_string()];
        let result = grade_short_answer(&accepted, "the phenomenon of global warming", &config(2));
        assert!(!result.is_correct);
        assert_eq!(result.score, 0.0);
        assert_eq!(result.reason(), Some(FailureReason::WordLimitExceeded));
    }
}
