//! Exam and attempt file loading.
//!
//! Exams are TOML files with an `[exam]` header and `[[questions]]` tables;
//! attempts are JSON, either one attempt per file or an array of them.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::model::{Attempt, Exam, Question};

/// Intermediate TOML structure for exam files.
#[derive(Debug, Deserialize)]
struct TomlExamFile {
    exam: TomlExamHeader,
    #[serde(default)]
    questions: Vec<Question>,
}

#[derive(Debug, Deserialize)]
struct TomlExamHeader {
    id: String,
    name: String,
    #[serde(default)]
    description: String,
}

/// Parse a single TOML file into an [`Exam`].
pub fn parse_exam(path: &Path) -> Result<Exam> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read exam file: {}", path.display()))?;

    parse_exam_str(&content, path)
}

/// Parse a TOML string into an [`Exam`], resolving each question's family.
pub fn parse_exam_str(content: &str, source_path: &Path) -> Result<Exam> {
    let parsed: TomlExamFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let mut questions = parsed.questions;
    for question in &mut questions {
        question.resolve_family();
    }

    Ok(Exam {
        id: parsed.exam.id,
        name: parsed.exam.name,
        description: parsed.exam.description,
        questions,
    })
}

/// Load an exam from a file, or every `.toml` exam under a directory.
pub fn load_exams(path: &Path) -> Result<Vec<Exam>> {
    if path.is_dir() {
        load_exam_directory(path)
    } else {
        Ok(vec![parse_exam(path)?])
    }
}

/// Recursively load all `.toml` exam files from a directory.
pub fn load_exam_directory(dir: &Path) -> Result<Vec<Exam>> {
    let mut exams = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
    {
        let entry = entry?;
        let path = entry.path();

        if path.is_dir() {
            exams.extend(load_exam_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_exam(&path) {
                Ok(exam) => exams.push(exam),
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }

    exams.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(exams)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AttemptFile {
    Many(Vec<Attempt>),
    One(Box<Attempt>),
}

/// Parse a JSON document holding one attempt or an array of attempts.
pub fn parse_attempts_str(content: &str, source_path: &Path) -> Result<Vec<Attempt>> {
    let parsed: AttemptFile = serde_json::from_str(content)
        .with_context(|| format!("failed to parse attempts: {}", source_path.display()))?;

    Ok(match parsed {
        AttemptFile::Many(attempts) => attempts,
        AttemptFile::One(attempt) => vec![*attempt],
    })
}

/// Load attempts from a JSON file, or from every `.json` file in a directory
/// (not recursive). Unreadable files in a directory are skipped with a
/// warning.
pub fn load_attempts(path: &Path) -> Result<Vec<Attempt>> {
    if !path.is_dir() {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read attempts file: {}", path.display()))?;
        return parse_attempts_str(&content, path);
    }

    let mut files: Vec<_> = std::fs::read_dir(path)
        .with_context(|| format!("failed to read directory: {}", path.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    files.sort();

    let mut attempts = Vec::new();
    for file in files {
        let loaded = std::fs::read_to_string(&file)
            .with_context(|| format!("failed to read attempts file: {}", file.display()))
            .and_then(|content| parse_attempts_str(&content, &file));
        match loaded {
            Ok(batch) => attempts.extend(batch),
            Err(e) => tracing::warn!("skipping {}: {:#}", file.display(), e),
        }
    }

    Ok(attempts)
}
