//! Configuration loading.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Fallback grading parameters for questions whose `type_config` omits them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradingDefaults {
    /// Word budget for a completion blank.
    #[serde(default = "default_completion_words")]
    pub completion_max_words: usize,
    /// Word budget for a diagram label.
    #[serde(default = "default_diagram_words")]
    pub diagram_max_words: usize,
    /// Word budget for a short answer.
    #[serde(default = "default_short_answer_words")]
    pub short_answer_max_words: usize,
    /// Marks for a question that does not declare any.
    #[serde(default = "default_marks")]
    pub default_marks: u32,
}

fn default_completion_words() -> usize {
    3
}
fn default_diagram_words() -> usize {
    2
}
fn default_short_answer_words() -> usize {
    3
}
fn default_marks() -> u32 {
    1
}

impl Default for GradingDefaults {
    fn default() -> Self {
        Self {
            completion_max_words: default_completion_words(),
            diagram_max_words: default_diagram_words(),
            short_answer_max_words: default_short_answer_words(),
            default_marks: default_marks(),
        }
    }
}

/// Top-level bandscore configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BandscoreConfig {
    /// Max attempts graded concurrently.
    #[serde(default = "default_parallelism")]
    pub parallelism: usize,
    /// Output directory for reports.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Grading fallbacks.
    #[serde(default)]
    pub grading: GradingDefaults,
}

fn default_parallelism() -> usize {
    4
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("./bandscore-results")
}

impl Default for BandscoreConfig {
    fn default() -> Self {
        Self {
            parallelism: default_parallelism(),
            output_dir: default_output_dir(),
            grading: GradingDefaults::default(),
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!("{}{}{}", &result[..start], value, &result[start + end + 1..]);
        } else {
            break;
        }
    }
    result
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `bandscore.toml` in the current directory
/// 2. `~/.config/bandscore/config.toml`
///
/// Environment variable overrides: `BANDSCORE_PARALLELISM`, `BANDSCORE_OUTPUT_DIR`.
pub fn load_config() -> Result<BandscoreConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<BandscoreConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("bandscore.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            parse_config(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => BandscoreConfig::default(),
    };

    if let Ok(value) = std::env::var("BANDSCORE_PARALLELISM") {
        config.parallelism = value
            .trim()
            .parse()
            .with_context(|| format!("BANDSCORE_PARALLELISM is not a number: {value}"))?;
    }
    if let Ok(dir) = std::env::var("BANDSCORE_OUTPUT_DIR") {
        config.output_dir = PathBuf::from(dir);
    }

    config.output_dir = PathBuf::from(resolve_env_vars(&config.output_dir.to_string_lossy()));
    anyhow::ensure!(config.parallelism >= 1, "parallelism must be at least 1");

    Ok(config)
}

/// Parse a config document.
pub fn parse_config(content: &str) -> Result<BandscoreConfig> {
    Ok(toml::from_str::<BandscoreConfig>(content)?)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("bandscore"))
}
