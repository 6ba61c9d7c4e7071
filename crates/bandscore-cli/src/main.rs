//! bandscore CLI — grade exam attempts and work with band scores.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "bandscore", version, about = "IELTS-style answer grading and band scoring")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Grade attempts against an exam
    Grade {
        /// Path to the exam .toml file
        #[arg(long)]
        exam: PathBuf,

        /// Attempts JSON file or directory of JSON files
        #[arg(long)]
        attempts: PathBuf,

        /// Output directory (default: from config)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Output format: json, markdown, all
        #[arg(long, default_value = "json")]
        format: String,

        /// Max attempts graded concurrently (default: from config)
        #[arg(long)]
        parallelism: Option<usize>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Convert a correct-answer count to a band
    Convert {
        /// Number of correct answers
        #[arg(long)]
        correct: u32,

        /// Number of questions
        #[arg(long, default_value = "40")]
        total: u32,
    },

    /// Average scores and round to the nearest half band
    Average {
        /// Scores to average
        #[arg(required = true, num_args = 1.., allow_negative_numbers = true)]
        scores: Vec<f64>,
    },

    /// Validate exam TOML files
    Validate {
        /// Path to exam file or directory
        #[arg(long)]
        exam: PathBuf,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create starter config and example exam
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("bandscore=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Grade {
            exam,
            attempts,
            output,
            format,
            parallelism,
            config,
        } => commands::grade::execute(exam, attempts, output, format, parallelism, config).await,
        Commands::Convert { correct, total } => commands::convert::execute(correct, total),
        Commands::Average { scores } => commands::average::execute(scores),
        Commands::Validate { exam, config } => commands::validate::execute(exam, config),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
