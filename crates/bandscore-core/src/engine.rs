//! Batch grading engine.
//!
//! Grades many attempts against one exam. Grading is pure CPU work, so each
//! attempt runs on a tokio blocking thread with a semaphore bounding how
//! many run at once.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::Semaphore;
use uuid::Uuid;

use crate::aggregate::{aggregate_test_result, is_test_complete, score_section, SectionScores};
use crate::config::{BandscoreConfig, GradingDefaults};
use crate::dispatch::Dispatcher;
use crate::family::Section;
use crate::model::{Attempt, Exam};
use crate::report::{AttemptReport, BatchReport, BatchSummary, ExamSummary};
use crate::rubric::{section_band, statuses};

/// Configuration for the grading engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Maximum attempts graded concurrently.
    pub parallelism: usize,
    pub grading: GradingDefaults,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            parallelism: 4,
            grading: GradingDefaults::default(),
        }
    }
}

impl From<&BandscoreConfig> for EngineConfig {
    fn from(config: &BandscoreConfig) -> Self {
        Self {
            parallelism: config.parallelism,
            grading: config.grading.clone(),
        }
    }
}

/// Progress reporting trait.
pub trait ProgressReporter: Send + Sync {
    fn on_attempt_start(&self, attempt_id: &str);
    fn on_attempt_complete(&self, report: &AttemptReport);
    fn on_attempt_error(&self, attempt_id: &str, error: &str);
    fn on_batch_complete(&self, total: usize, completed: usize, failed: usize, elapsed: Duration);
}

/// No-op progress reporter.
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn on_attempt_start(&self, _: &str) {}
    fn on_attempt_complete(&self, _: &AttemptReport) {}
    fn on_attempt_error(&self, _: &str, _: &str) {}
    fn on_batch_complete(&self, _: usize, _: usize, _: usize, _: Duration) {}
}

/// Grade one attempt: auto-graded sections from the answers, writing and
/// speaking from reviewer grades, then the overall band.
pub fn grade_attempt(dispatcher: &Dispatcher, exam: &Exam, attempt: &Attempt) -> AttemptReport {
    let unknown_answers: Vec<String> = attempt
        .answers
        .keys()
        .filter(|id| exam.question(id).is_none())
        .cloned()
        .collect();
    for id in &unknown_answers {
        tracing::warn!(attempt = %attempt.attempt_id, "answer for unknown question {id} ignored");
    }

    let mut scores = SectionScores::default();
    let mut tallies = Vec::new();
    let mut questions = Vec::new();

    for section in Section::ALL.into_iter().filter(|s| s.is_auto_graded()) {
        let (tally, outcomes) =
            score_section(dispatcher, section, exam.section_questions(section), &attempt.answers);
        if tally.questions == 0 {
            continue;
        }
        scores.set(section, tally.band);
        tallies.push(tally);
        questions.extend(outcomes);
    }

    scores.writing = section_band(&attempt.writing);
    scores.speaking = section_band(&attempt.speaking);

    AttemptReport {
        attempt_id: attempt.attempt_id.clone(),
        candidate: attempt.candidate.clone(),
        status: attempt.status,
        complete: is_test_complete(
            attempt.status,
            &statuses(&attempt.writing),
            &statuses(&attempt.speaking),
        ),
        result: aggregate_test_result(scores),
        sections: tallies,
        questions,
        unknown_answers,
    }
}

/// The batch grading engine.
pub struct GradingEngine {
    dispatcher: Arc<Dispatcher>,
    config: EngineConfig,
}

impl GradingEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            dispatcher: Arc::new(Dispatcher::new(config.grading.clone())),
            config,
        }
    }

    /// Grade every attempt against `exam`.
    pub async fn run(
        &self,
        exam: &Exam,
        attempts: Vec<Attempt>,
        progress: &dyn ProgressReporter,
    ) -> Result<BatchReport> {
        let start = Instant::now();
        let run_id = Uuid::new_v4();
        let semaphore = Arc::new(Semaphore::new(self.config.parallelism.max(1)));
        let shared_exam = Arc::new(exam.clone());

        tracing::info!(
            exam = %exam.id,
            attempts = attempts.len(),
            parallelism = self.config.parallelism,
            "grading batch"
        );

        let mut futures = FuturesUnordered::new();

        for attempt in attempts {
            let semaphore = Arc::clone(&semaphore);
            let dispatcher = Arc::clone(&self.dispatcher);
            let exam = Arc::clone(&shared_exam);
            let attempt_id = attempt.attempt_id.clone();
            progress.on_attempt_start(&attempt_id);

            futures.push(async move {
                let inner = async move {
                    let _permit = semaphore
                        .acquire_owned()
                        .await
                        .map_err(|_| anyhow::anyhow!("semaphore closed"))?;

                    tokio::task::spawn_blocking(move || grade_attempt(&dispatcher, &exam, &attempt))
                        .await
                        .map_err(|e| anyhow::anyhow!("grading task failed: {e}"))
                };
                (attempt_id, inner.await)
            });
        }

        let mut reports = Vec::new();
        let mut failed = 0usize;
        let total = futures.len();

        while let Some((attempt_id, result)) = futures.next().await {
            match result {
                Ok(report) => {
                    progress.on_attempt_complete(&report);
                    reports.push(report);
                }
                Err(e) => {
                    tracing::error!("grading failed for {attempt_id}: {e:#}");
                    progress.on_attempt_error(&attempt_id, &e.to_string());
                    failed += 1;
                }
            }
        }

        let elapsed = start.elapsed();
        progress.on_batch_complete(total, reports.len(), failed, elapsed);
        tracing::info!(graded = reports.len(), failed, "batch complete");

        reports.sort_by(|a, b| a.attempt_id.cmp(&b.attempt_id));

        Ok(BatchReport {
            id: run_id,
            created_at: chrono::Utc::now(),
            exam: ExamSummary::from(exam),
            summary: BatchSummary::compute(&reports),
            attempts: reports,
            failed,
            duration_ms: elapsed.as_millis() as u64,
        })
    }
}
