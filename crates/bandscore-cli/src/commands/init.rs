//! The `bandscore init` command.

use std::path::Path;

use anyhow::{Context, Result};

fn write_if_missing(path: &Path, content: &str) -> Result<()> {
    if path.exists() {
        println!("{} already exists, skipping.", path.display());
    } else {
        std::fs::write(path, content)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("Created {}", path.display());
    }
    Ok(())
}

pub fn execute() -> Result<()> {
    write_if_missing(Path::new("bandscore.toml"), SAMPLE_CONFIG)?;

    std::fs::create_dir_all("exams")?;
    write_if_missing(Path::new("exams/example.toml"), EXAMPLE_EXAM)?;
    write_if_missing(Path::new("exams/example-attempts.json"), EXAMPLE_ATTEMPTS)?;

    println!("\nNext steps:");
    println!("  1. Run: bandscore validate --exam exams/example.toml");
    println!("  2. Run: bandscore grade --exam exams/example.toml --attempts exams/example-attempts.json");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# bandscore configuration

parallelism = 4
output_dir = "./bandscore-results"

[grading]
completion_max_words = 3
diagram_max_words = 2
short_answer_max_words = 3
default_marks = 1
"#;

const EXAMPLE_EXAM: &str = r#"[exam]
id = "example"
name = "Example Exam"
description = "A small exam to get started"

[[questions]]
id = "L1"
section = "listening"
question_type = "listening_note_completion"
text = "Complete the notes. Write NO MORE THAN TWO WORDS."

[questions.answer_data.blanks]
BLANK_1 = ["(fresh) bread"]

[questions.type_config]
template = "Buy [BLANK_1] on the way home."
blanks = [{ blank_id = "BLANK_1", max_words = 2 }]

[[questions]]
id = "R1"
section = "reading"
question_type = "reading_yes_no_not_given"
text = "Does the writer agree?"
answer_data = { answers = { "1" = "YES", "2" = "NOT GIVEN" } }
"#;

const EXAMPLE_ATTEMPTS: &str = r#"[
  {
    "attempt_id": "example-1",
    "status": "submitted",
    "answers": {
      "L1": {"blanks": {"BLANK_1": "Bread"}},
      "R1": {"answers": {"1": "yes", "2": "NOT_GIVEN"}}
    }
  }
]
"#;
