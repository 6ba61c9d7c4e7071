//! The `bandscore grade` command.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;

use bandscore_core::config::load_config_from;
use bandscore_core::engine::{EngineConfig, GradingEngine, ProgressReporter};
use bandscore_core::parser;
use bandscore_core::report::{AttemptReport, BatchReport};

/// Console progress reporter.
struct ConsoleReporter;

impl ProgressReporter for ConsoleReporter {
    fn on_attempt_start(&self, _attempt_id: &str) {}

    fn on_attempt_complete(&self, report: &AttemptReport) {
        eprintln!(
            "  Graded: {} overall {}{}",
            report.attempt_id,
            report.result.overall,
            if report.complete { "" } else { " (incomplete)" }
        );
    }

    fn on_attempt_error(&self, attempt_id: &str, error: &str) {
        eprintln!("  ERROR: {attempt_id}: {error}");
    }

    fn on_batch_complete(&self, total: usize, completed: usize, failed: usize, elapsed: Duration) {
        eprintln!(
            "\nComplete: {completed}/{total} graded, {failed} failed ({:.1}s)",
            elapsed.as_secs_f64()
        );
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum OutputFormat {
    Json,
    Markdown,
}

fn parse_formats(format: &str) -> Result<Vec<OutputFormat>> {
    if format == "all" {
        return Ok(vec![OutputFormat::Json, OutputFormat::Markdown]);
    }
    format
        .split(',')
        .map(|f| match f.trim() {
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            other => Err(anyhow::anyhow!(
                "unknown format: {other} (expected json, markdown or all)"
            )),
        })
        .collect()
}

pub async fn execute(
    exam_path: PathBuf,
    attempts_path: PathBuf,
    output: Option<PathBuf>,
    format: String,
    parallelism: Option<usize>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let formats = parse_formats(&format)?;

    let mut config = load_config_from(config_path.as_deref())?;
    if let Some(p) = parallelism {
        anyhow::ensure!(p >= 1, "parallelism must be at least 1");
        config.parallelism = p;
    }
    let output = output.unwrap_or_else(|| config.output_dir.clone());

    let exam = parser::parse_exam(&exam_path)?;
    let attempts = parser::load_attempts(&attempts_path)?;

    eprintln!(
        "bandscore v{} — Grading {} attempts against {} ({} questions)",
        env!("CARGO_PKG_VERSION"),
        attempts.len(),
        exam.name,
        exam.questions.len()
    );
    eprintln!();

    let engine = GradingEngine::new(EngineConfig::from(&config));
    let report = engine.run(&exam, attempts, &ConsoleReporter).await?;

    print_summary(&report);

    std::fs::create_dir_all(&output)?;
    let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H%M%S");

    for fmt in formats {
        match fmt {
            OutputFormat::Json => {
                let path = output.join(format!("report-{timestamp}.json"));
                report.save_json(&path)?;
                eprintln!("Results saved to: {}", path.display());
            }
            OutputFormat::Markdown => {
                let path = output.join(format!("report-{timestamp}.md"));
                std::fs::write(&path, report.to_markdown())?;
                eprintln!("Markdown report: {}", path.display());
            }
        }
    }

    Ok(())
}

fn print_summary(report: &BatchReport) {
    use comfy_table::{Cell, Table};

    let band = |b: Option<bandscore_core::band::BandScore>| {
        Cell::new(b.map(|b| b.to_string()).unwrap_or_else(|| "-".into()))
    };

    let mut table = Table::new();
    table.set_header(vec![
        "Attempt",
        "Listening",
        "Reading",
        "Writing",
        "Speaking",
        "Overall",
        "Complete",
    ]);

    for attempt in &report.attempts {
        let sections = &attempt.result.sections;
        table.add_row(vec![
            Cell::new(&attempt.attempt_id),
            band(sections.listening),
            band(sections.reading),
            band(sections.writing),
            band(sections.speaking),
            Cell::new(attempt.result.overall),
            Cell::new(if attempt.complete { "yes" } else { "no" }),
        ]);
    }

    println!("{table}");
}
