//! Question families and exam sections.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GradingError;

/// The grading strategy a question type belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Family {
    Completion,
    Matching,
    Mcq,
    Tfng,
    Diagram,
    ShortAnswer,
    /// Legacy single-value questions and anything unrecognised.
    Simple,
}

/// Keyword lists checked in order; the first family with a match wins.
const FAMILY_KEYWORDS: &[(Family, &[&str])] = &[
    (
        Family::Completion,
        &[
            "form_completion",
            "note_completion",
            "table_completion",
            "summary_completion",
            "sentence_completion",
        ],
    ),
    (
        Family::Matching,
        &[
            "matching_headings",
            "matching_sentence_endings",
            "matching_paragraphs",
            "name_matching",
            "matching_information",
            "matching_features",
        ],
    ),
    (
        Family::Diagram,
        &["diagram_labeling", "map_labeling", "flowchart"],
    ),
    (
        Family::Tfng,
        &["true_false_not_given", "yes_no_not_given"],
    ),
    (Family::Mcq, &["multiple_choice"]),
    (Family::ShortAnswer, &["short_answer"]),
];

const SECTION_PREFIXES: &[&str] = &["listening_", "reading_"];

impl Family {
    /// All families, in dispatch order.
    pub const ALL: [Family; 7] = [
        Family::Completion,
        Family::Matching,
        Family::Diagram,
        Family::Tfng,
        Family::Mcq,
        Family::ShortAnswer,
        Family::Simple,
    ];

    /// Resolve a question type identifier such as
    /// `"reading_true_false_not_given"` to its family.
    ///
    /// Unknown types fall back to [`Family::Simple`].
    pub fn from_question_type(question_type: &str) -> Family {
        let lowered = question_type.trim().to_ascii_lowercase();
        let suffix = SECTION_PREFIXES
            .iter()
            .find_map(|prefix| lowered.strip_prefix(prefix))
            .unwrap_or(&lowered);

        FAMILY_KEYWORDS
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|k| suffix.contains(k)))
            .map(|(family, _)| *family)
            .unwrap_or(Family::Simple)
    }

    /// Whether this family scores a set of sub-parts (blanks, items, ...).
    pub fn is_multi_part(self) -> bool {
        matches!(
            self,
            Family::Completion | Family::Matching | Family::Tfng | Family::Diagram
        )
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Family::Completion => "completion",
            Family::Matching => "matching",
            Family::Mcq => "mcq",
            Family::Tfng => "tfng",
            Family::Diagram => "diagram",
            Family::ShortAnswer => "short_answer",
            Family::Simple => "simple",
        };
        f.write_str(name)
    }
}

impl FromStr for Family {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Family::ALL
            .into_iter()
            .find(|f| f.to_string() == s.trim().to_ascii_lowercase())
            .ok_or_else(|| format!("unknown family: {s}"))
    }
}

/// The four sections of a test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Listening,
    Reading,
    Writing,
    Speaking,
}

impl Section {
    pub const ALL: [Section; 4] = [
        Section::Listening,
        Section::Reading,
        Section::Writing,
        Section::Speaking,
    ];

    /// Listening and reading are graded automatically.
    pub fn is_auto_graded(self) -> bool {
        matches!(self, Section::Listening | Section::Reading)
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Section::Listening => write!(f, "listening"),
            Section::Reading => write!(f, "reading"),
            Section::Writing => write!(f, "writing"),
            Section::Speaking => write!(f, "speaking"),
        }
    }
}

impl FromStr for Section {
    type Err = GradingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "listening" => Ok(Section::Listening),
            "reading" => Ok(Section::Reading),
            "writing" => Ok(Section::Writing),
            "speaking" => Ok(Section::Speaking),
            other => Err(GradingError::UnknownSection(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_every_known_type() {
        let cases = [
            ("listening_form_completion", Family::Completion),
            ("reading_summary_completion", Family::Completion),
            ("listening_matching_sentence_endings", Family::Matching),
            ("reading_matching_features", Family::Matching),
            ("listening_name_matching", Family::Matching),
            ("listening_map_labeling", Family::Diagram),
            ("reading_flowchart", Family::Diagram),
            ("reading_true_false_not_given", Family::Tfng),
            ("reading_yes_no_not_given", Family::Tfng),
            ("listening_multiple_choice", Family::Mcq),
            ("reading_short_answer", Family::ShortAnswer),
        ];
        for (question_type, family) in cases {
            assert_eq!(Family::from_question_type(question_type), family, "{question_type}");
        }
    }

    #[test]
    fn unknown_types_fall_back_to_simple() {
        assert_eq!(Family::from_question_type("writing_task2_essay"), Family::Simple);
        assert_eq!(Family::from_question_type(""), Family::Simple);
        assert_eq!(Family::from_question_type("listening_"), Family::Simple);
    }

    #[test]
    fn prefix_is_optional() {
        assert_eq!(Family::from_question_type("short_answer"), Family::ShortAnswer);
        assert_eq!(Family::from_question_type("Multiple_Choice"), Family::Mcq);
    }

    #[test]
    fn family_display_and_parse() {
        for family in Family::ALL {
            assert_eq!(family.to_string().parse::<Family>().unwrap(), family);
        }
        assert!("essay".parse::<Family>().is_err());
        assert!(Family::Tfng.is_multi_part());
        assert!(!Family::Mcq.is_multi_part());
    }

    #[test]
    fn section_parse() {
        assert_eq!("Reading".parse::<Section>().unwrap(), Section::Reading);
        assert!(matches!(
            "maths".parse::<Section>(),
            Err(GradingError::UnknownSection(_))
        ));
        assert!(Section::Listening.is_auto_graded());
        assert!(!Section::Speaking.is_auto_graded());
    }
}
