//! Section scoring and overall result aggregation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::band::{average_of, convert_count_to_band, BandScore};
use crate::dispatch::Dispatcher;
use crate::error::GradingError;
use crate::family::{Family, Section};
use crate::model::{AttemptStatus, Question, ReviewStatus, SubmissionPayload};
use crate::results::GradingResult;

/// Per-section bands. `None` means the section has not been graded, which
/// is distinct from a graded 0.0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionScores {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listening: Option<BandScore>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reading: Option<BandScore>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub writing: Option<BandScore>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaking: Option<BandScore>,
}

impl SectionScores {
    /// Build from plain numbers where anything not above zero means
    /// "not graded".
    pub fn from_raw(listening: f64, reading: f64, writing: f64, speaking: f64) -> Result<Self, GradingError> {
        let present = |value: f64| -> Result<Option<BandScore>, GradingError> {
            if value > 0.0 {
                BandScore::try_from(value).map(Some)
            } else {
                Ok(None)
            }
        };
        Ok(Self {
            listening: present(listening)?,
            reading: present(reading)?,
            writing: present(writing)?,
            speaking: present(speaking)?,
        })
    }

    pub fn get(&self, section: Section) -> Option<BandScore> {
        match section {
            Section::Listening => self.listening,
            Section::Reading => self.reading,
            Section::Writing => self.writing,
            Section::Speaking => self.speaking,
        }
    }

    pub fn set(&mut self, section: Section, band: Option<BandScore>) {
        let slot = match section {
            Section::Listening => &mut self.listening,
            Section::Reading => &mut self.reading,
            Section::Writing => &mut self.writing,
            Section::Speaking => &mut self.speaking,
        };
        *slot = band;
    }

    /// Bands of the graded sections, in section order.
    pub fn present(&self) -> Vec<BandScore> {
        Section::ALL.iter().filter_map(|s| self.get(*s)).collect()
    }

    /// Overwrite each section that `update` carries.
    pub fn merge(&mut self, update: &SectionScores) {
        for section in Section::ALL {
            if let Some(band) = update.get(section) {
                self.set(section, Some(band));
            }
        }
    }
}

/// Overall band plus the sections it was computed from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestResult {
    pub overall: BandScore,
    pub sections: SectionScores,
}

impl TestResult {
    /// Apply newly graded sections to a stored result, creating an empty
    /// one if none exists yet, and recompute the overall band.
    pub fn refresh(existing: Option<TestResult>, update: &SectionScores) -> TestResult {
        let mut sections = existing.unwrap_or_default().sections;
        sections.merge(update);
        aggregate_test_result(sections)
    }
}

/// Average the graded sections into an overall band. No graded section
/// gives 0.0.
pub fn aggregate_test_result(sections: SectionScores) -> TestResult {
    TestResult {
        overall: average_of(&sections.present()),
        sections,
    }
}

/// An attempt is complete once submitted and every writing and speaking
/// task has been graded by a reviewer.
pub fn is_test_complete(status: AttemptStatus, writing: &[ReviewStatus], speaking: &[ReviewStatus]) -> bool {
    status.is_submitted()
        && writing
            .iter()
            .chain(speaking)
            .all(|s| *s == ReviewStatus::Graded)
}

/// The graded outcome of one question within an attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionOutcome {
    pub question_id: String,
    pub family: Family,
    pub marks: u32,
    pub answered: bool,
    pub result: GradingResult,
}

/// Marks earned in an auto-graded section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionTally {
    pub section: Section,
    pub questions: usize,
    pub marks_correct: u32,
    pub marks_total: u32,
    /// Absent when the section has no questions.
    pub band: Option<BandScore>,
}

/// Grade every question of a listening or reading section and convert the
/// marks of fully correct questions to a band. Unanswered questions still
/// count towards the total.
pub fn score_section<'a, I>(
    dispatcher: &Dispatcher,
    section: Section,
    questions: I,
    answers: &BTreeMap<String, Value>,
) -> (SectionTally, Vec<QuestionOutcome>)
where
    I: IntoIterator<Item = &'a Question>,
{
    let default_marks = dispatcher.defaults().default_marks;
    let mut outcomes = Vec::new();
    let mut marks_correct = 0u32;
    let mut marks_total = 0u32;

    for question in questions {
        let marks = question.marks_or(default_marks);
        let submitted = answers
            .get(&question.id)
            .cloned()
            .map(|v| SubmissionPayload::from_value(v).into_value());
        let answered = submitted.is_some();
        let result = dispatcher.grade_submission(question, &submitted.unwrap_or(Value::Null));

        marks_total = marks_total.saturating_add(marks);
        if result.is_correct {
            marks_correct = marks_correct.saturating_add(marks);
        }

        outcomes.push(QuestionOutcome {
            question_id: question.id.clone(),
            family: question.family(),
            marks,
            answered,
            result,
        });
    }

    let band = if outcomes.is_empty() {
        None
    } else {
        Some(convert_count_to_band(marks_correct, marks_total))
    };

    let tally = SectionTally {
        section,
        questions: outcomes.len(),
        marks_correct,
        marks_total,
        band,
    };
    (tally, outcomes)
}
