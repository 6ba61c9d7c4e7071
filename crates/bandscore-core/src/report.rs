//! Batch grading reports with JSON persistence and markdown rendering.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::aggregate::{QuestionOutcome, SectionTally, TestResult};
use crate::band::BandScore;
use crate::family::Section;
use crate::model::{AttemptStatus, Exam};

/// The graded outcome of one attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptReport {
    pub attempt_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub candidate: Option<String>,
    pub status: AttemptStatus,
    /// Submitted and every human-reviewed task graded.
    pub complete: bool,
    pub result: TestResult,
    /// Auto-graded sections that had questions.
    pub sections: Vec<SectionTally>,
    pub questions: Vec<QuestionOutcome>,
    /// Answers for question ids the exam does not define.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unknown_answers: Vec<String>,
}

impl AttemptReport {
    pub fn tally(&self, section: Section) -> Option<&SectionTally> {
        self.sections.iter().find(|t| t.section == section)
    }
}

/// Summary of an exam (without the question definitions).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamSummary {
    pub id: String,
    pub name: String,
    pub question_count: usize,
}

impl From<&Exam> for ExamSummary {
    fn from(exam: &Exam) -> Self {
        Self {
            id: exam.id.clone(),
            name: exam.name.clone(),
            question_count: exam.questions.len(),
        }
    }
}

/// Figures across every attempt in a batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub attempts: usize,
    pub complete: usize,
    /// Mean overall band of attempts with at least one graded section.
    pub mean_overall: Option<f64>,
    /// Overall band (as `"6.5"`) → number of attempts.
    pub distribution: BTreeMap<String, usize>,
}

impl BatchSummary {
    pub fn compute(attempts: &[AttemptReport]) -> Self {
        let graded: Vec<f64> = attempts
            .iter()
            .filter(|a| !a.result.sections.present().is_empty())
            .map(|a| a.result.overall.value())
            .collect();

        let mut distribution = BTreeMap::new();
        for attempt in attempts {
            *distribution.entry(attempt.result.overall.to_string()).or_insert(0) += 1;
        }

        Self {
            attempts: attempts.len(),
            complete: attempts.iter().filter(|a| a.complete).count(),
            mean_overall: if graded.is_empty() {
                None
            } else {
                Some(graded.iter().sum::<f64>() / graded.len() as f64)
            },
            distribution,
        }
    }
}

/// A complete batch grading report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    pub exam: ExamSummary,
    /// Per-attempt results, ordered by attempt id.
    pub attempts: Vec<AttemptReport>,
    pub summary: BatchSummary,
    /// Attempts that could not be graded.
    #[serde(default)]
    pub failed: usize,
    /// Total wall-clock duration in milliseconds.
    pub duration_ms: u64,
}

fn band_cell(band: Option<BandScore>) -> String {
    band.map(|b| b.to_string()).unwrap_or_else(|| "-".into())
}

impl BatchReport {
    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: BatchReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }

    pub fn attempt(&self, attempt_id: &str) -> Option<&AttemptReport> {
        self.attempts.iter().find(|a| a.attempt_id == attempt_id)
    }

    /// Format the report as markdown.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str(&format!("# {} ({})\n\n", self.exam.name, self.exam.id));
        md.push_str(&format!(
            "Report `{}` created {}. {} attempts, {} complete, {} failed.\n\n",
            self.id,
            self.created_at.format("%Y-%m-%d %H:%M:%S UTC"),
            self.summary.attempts,
            self.summary.complete,
            self.failed
        ));
        if let Some(mean) = self.summary.mean_overall {
            md.push_str(&format!("**Mean overall band:** {mean:.2}\n\n"));
        }

        md.push_str("| Attempt | Listening | Reading | Writing | Speaking | Overall | Complete |\n");
        md.push_str("|---------|-----------|---------|---------|----------|---------|----------|\n");
        for a in &self.attempts {
            let s = &a.result.sections;
            md.push_str(&format!(
                "| {} | {} | {} | {} | {} | {} | {} |\n",
                a.attempt_id,
                band_cell(s.listening),
                band_cell(s.reading),
                band_cell(s.writing),
                band_cell(s.speaking),
                a.result.overall,
                if a.complete { "yes" } else { "no" }
            ));
        }
        md.push('\n');

        if !self.summary.distribution.is_empty() {
            md.push_str("### Band distribution\n\n");
            md.push_str("| Overall | Attempts |\n");
            md.push_str("|---------|----------|\n");
            for (band, count) in self.summary.distribution.iter().rev() {
                md.push_str(&format!("| {band} | {count} |\n"));
            }
            md.push('\n');
        }

        md
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::SectionScores;

    fn band(value: f64) -> BandScore {
        BandScore::try_from(value).unwrap()
    }

    fn attempt(id: &str, listening: Option<f64>, complete: bool) -> AttemptReport {
        let sections = SectionScores {
            listening: listening.map(band),
            ..SectionScores::default()
        };
        AttemptReport {
            attempt_id: id.into(),
            candidate: None,
            status: AttemptStatus::Submitted,
            complete,
            result: crate::aggregate::aggregate_test_result(sections),
            sections: vec![],
            questions: vec![],
            unknown_answers: vec![],
        }
    }

    fn report() -> BatchReport {
        let attempts = vec![
            attempt("a1", Some(7.0), true),
            attempt("a2", Some(6.0), false),
            attempt("a3", None, false),
        ];
        BatchReport {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            exam: ExamSummary {
                id: "practice-1".into(),
                name: "Practice Test 1".into(),
                question_count: 3,
            },
            summary: BatchSummary::compute(&attempts),
            attempts,
            failed: 0,
            duration_ms: 12,
        }
    }

    #[test]
    fn summary_ignores_ungraded_attempts_in_mean() {
        let report = report();
        assert_eq!(report.summary.attempts, 3);
        assert_eq!(report.summary.complete, 1);
        assert_eq!(report.summary.mean_overall, Some(6.5));
        assert_eq!(report.summary.distribution["0.0"], 1);
        assert_eq!(report.summary.distribution["7.0"], 1);
    }

    #[test]
    fn json_roundtrip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("report.json");
        let original = report();
        original.save_json(&path).unwrap();

        let loaded = BatchReport::load_json(&path).unwrap();
        assert_eq!(loaded.id, original.id);
        assert_eq!(loaded.attempts, original.attempts);
        assert_eq!(loaded.summary, original.summary);
    }

    #[test]
    fn markdown_lists_every_attempt() {
        let md = report().to_markdown();
        assert!(md.contains("# Practice Test 1 (practice-1)"));
        assert!(md.contains("| a1 | 7.0 | - | - | - | 7.0 | yes |"));
        assert!(md.contains("| a3 | - | - | - | - | 0.0 | no |"));
        assert!(md.contains("Mean overall band:** 6.50"));
    }
}
