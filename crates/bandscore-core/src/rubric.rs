//! Human-graded writing and speaking rubrics.

use serde::{Deserialize, Serialize};

use crate::band::{average_of, BandScore};
use crate::model::ReviewStatus;

/// Anything reduced to a single band from rubric criteria.
pub trait RubricGrade {
    fn criteria(&self) -> [BandScore; 4];

    /// The task band: criteria averaged and rounded to the half band.
    fn overall(&self) -> BandScore {
        average_of(&self.criteria())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WritingGrade {
    pub task_achievement: BandScore,
    pub coherence_cohesion: BandScore,
    pub lexical_resource: BandScore,
    pub grammatical_range: BandScore,
}

impl RubricGrade for WritingGrade {
    fn criteria(&self) -> [BandScore; 4] {
        [
            self.task_achievement,
            self.coherence_cohesion,
            self.lexical_resource,
            self.grammatical_range,
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeakingGrade {
    pub fluency_coherence: BandScore,
    pub lexical_resource: BandScore,
    pub grammatical_range: BandScore,
    pub pronunciation: BandScore,
}

impl RubricGrade for SpeakingGrade {
    fn criteria(&self) -> [BandScore; 4] {
        [
            self.fluency_coherence,
            self.lexical_resource,
            self.grammatical_range,
            self.pronunciation,
        ]
    }
}

/// A writing or speaking task and where it stands in review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review<G> {
    pub task_id: String,
    #[serde(default)]
    pub status: ReviewStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grade: Option<G>,
}

impl<G: RubricGrade> Review<G> {
    /// The task band, once a reviewer has finished with it.
    pub fn band(&self) -> Option<BandScore> {
        match (&self.status, &self.grade) {
            (ReviewStatus::Graded, Some(grade)) => Some(grade.overall()),
            _ => None,
        }
    }
}

/// Section band over every graded task. `None` until at least one task has
/// been graded.
pub fn section_band<G: RubricGrade>(reviews: &[Review<G>]) -> Option<BandScore> {
    let bands: Vec<BandScore> = reviews.iter().filter_map(Review::band).collect();
    if bands.is_empty() {
        None
    } else {
        Some(average_of(&bands))
    }
}

/// Review states only, for completion checks.
pub fn statuses<G>(reviews: &[Review<G>]) -> Vec<ReviewStatus> {
    reviews.iter().map(|r| r.status).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn band(value: f64) -> BandScore {
        BandScore::try_from(value).unwrap()
    }

    fn writing(scores: [f64; 4]) -> WritingGrade {
        WritingGrade {
            task_achievement: band(scores[0]),
            coherence_cohesion: band(scores[1]),
            lexical_resource: band(scores[2]),
            grammatical_range: band(scores[3]),
        }
    }

    fn review(task_id: &str, status: ReviewStatus, grade: Option<WritingGrade>) -> Review<WritingGrade> {
        Review {
            task_id: task_id.into(),
            status,
            grade,
        }
    }

    #[test]
    fn overall_rounds_criteria() {
        assert_eq!(writing([6.0, 6.5, 6.5, 7.0]).overall(), band(6.5));
        assert_eq!(writing([7.0, 7.0, 7.0, 7.5]).overall(), band(7.0)); // 7.125
        let speaking = SpeakingGrade {
            fluency_coherence: band(7.0),
            lexical_resource: band(7.5),
            grammatical_range: band(7.5),
            pronunciation: band(8.0),
        };
        assert_eq!(speaking.overall(), band(7.5));
    }

    #[test]
    fn only_graded_tasks_count() {
        let reviews = vec![
            review("task1", ReviewStatus::Graded, Some(writing([6.0; 4]))),
            review("task2", ReviewStatus::Graded, Some(writing([7.0; 4]))),
            review("task3", ReviewStatus::UnderReview, Some(writing([9.0; 4]))),
            review("task4", ReviewStatus::Graded, None),
        ];
        assert_eq!(section_band(&reviews), Some(band(6.5)));
    }

    #[test]
    fn no_graded_task_means_absent() {
        let reviews = vec![review("task1", ReviewStatus::Pending, None)];
        assert_eq!(section_band(&reviews), None);
        assert_eq!(section_band::<WritingGrade>(&[]), None);
    }

    #[test]
    fn rejects_off_grid_criteria() {
        let json = r#"{"task_achievement": 6.3, "coherence_cohesion": 6, "lexical_resource": 6, "grammatical_range": 6}"#;
        assert!(serde_json::from_str::<WritingGrade>(json).is_err());
    }
}
