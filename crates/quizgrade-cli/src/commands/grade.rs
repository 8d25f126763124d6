//! The `quizgrade grade` command.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use comfy_table::{Cell, Table};
use serde_json::Value;

use quizgrade_core::bank::{normalize_question_set, parse_question_set};
use quizgrade_core::grading::{grade_questions, QuestionOutcome};

use crate::config::{load_config_from, OutputFormat};

pub fn execute(
    question_set_path: PathBuf,
    answers_path: PathBuf,
    no_partial_credit: bool,
    format: Option<OutputFormat>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let partial_credit_enabled = config.partial_credit_enabled && !no_partial_credit;
    let format = format.unwrap_or(config.output_format);

    let set = parse_question_set(&question_set_path)?;
    let mut normalized = normalize_question_set(&set);
    for question in &mut normalized.questions {
        if question.points.is_none() {
            question.points = Some(config.default_points);
        }
    }

    let answers = load_answers(&answers_path)?;
    for id in answers.keys() {
        if !normalized.questions.iter().any(|q| &q.id == id) {
            tracing::warn!("answer for unknown question '{id}' ignored");
        }
    }

    tracing::info!(
        partial_credit = partial_credit_enabled,
        "grading {} answer(s) against {}",
        answers.len(),
        normalized.header.id
    );
    let outcomes = grade_questions(&normalized.questions, &answers, partial_credit_enabled);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&outcomes)?),
        OutputFormat::Text => {
            println!(
                "Question set: {} ({} questions)",
                normalized.header.name,
                normalized.questions.len()
            );
            print_outcomes(&outcomes);
        }
    }

    Ok(())
}

/// Read a JSON object mapping question IDs to raw submissions.
fn load_answers(path: &std::path::Path) -> Result<BTreeMap<String, Value>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read answers file: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("failed to parse answers file: {}", path.display()))
}

fn result_label(outcome: &QuestionOutcome) -> &'static str {
    if outcome.is_correct {
        "correct"
    } else if outcome.credit_percent > 0.0 {
        "partial"
    } else {
        "incorrect"
    }
}

fn print_outcomes(outcomes: &[QuestionOutcome]) {
    let mut table = Table::new();
    table.set_header(vec!["Question", "Type", "Result", "Credit", "Points", "Feedback"]);

    for outcome in outcomes {
        table.add_row(vec![
            Cell::new(&outcome.question_id),
            Cell::new(outcome.question_type.as_str()),
            Cell::new(result_label(outcome)),
            Cell::new(format!("{:.1}%", outcome.credit_percent)),
            Cell::new(format!(
                "{:.2} / {:.2}",
                outcome.points_earned, outcome.points_possible
            )),
            Cell::new(outcome.feedback.as_deref().unwrap_or("-")),
        ]);
    }

    println!("{table}");
}
