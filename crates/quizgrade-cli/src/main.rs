//! quizgrade CLI: normalize question sets and grade learner answers.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;
mod config;

use config::OutputFormat;

#[derive(Parser)]
#[command(
    name = "quizgrade",
    version,
    about = "Quiz question normalization and answer grading"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize authored questions into their canonical shape
    Normalize {
        /// Path to a .toml/.json question set or a directory
        #[arg(long)]
        question_set: PathBuf,

        /// Write JSON here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Grade submitted answers against a question set
    Grade {
        /// Path to a .toml/.json question set
        #[arg(long)]
        question_set: PathBuf,

        /// JSON object mapping question IDs to submitted answers
        #[arg(long)]
        answers: PathBuf,

        /// Drop credit strictly between 0 and 100 percent
        #[arg(long)]
        no_partial_credit: bool,

        /// Output format (defaults to the configured format)
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Check question sets for authoring mistakes
    Validate {
        /// Path to a question set file or directory
        #[arg(long)]
        question_set: PathBuf,
    },

    /// Create a starter config, question set and answers file
    Init,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("quizgrade=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Normalize {
            question_set,
            output,
        } => commands::normalize::execute(question_set, output),
        Commands::Grade {
            question_set,
            answers,
            no_partial_credit,
            format,
            config,
        } => commands::grade::execute(question_set, answers, no_partial_credit, format, config),
        Commands::Validate { question_set } => commands::validate::execute(question_set),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
