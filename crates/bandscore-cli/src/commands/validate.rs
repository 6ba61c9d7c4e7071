//! The `bandscore validate` command.

use std::path::PathBuf;

use anyhow::Result;

use bandscore_core::config::load_config_from;
use bandscore_core::parser;
use bandscore_core::validation::validate_exam;

pub fn execute(exam_path: PathBuf, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let exams = parser::load_exams(&exam_path)?;
    anyhow::ensure!(!exams.is_empty(), "no exams found in {}", exam_path.display());

    let mut total_warnings = 0;

    for exam in &exams {
        println!("Exam: {} ({} questions)", exam.name, exam.questions.len());

        let warnings = validate_exam(exam, &config.grading);
        for w in &warnings {
            let prefix = w
                .question_id
                .as_ref()
                .map(|id| format!("  [{id}]"))
                .unwrap_or_else(|| "  ".to_string());
            println!("{prefix} WARNING: {}", w.message);
        }
        total_warnings += warnings.len();
    }

    if total_warnings == 0 {
        println!("All exams valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
