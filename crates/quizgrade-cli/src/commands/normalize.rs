//! The `quizgrade normalize` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use quizgrade_core::bank::{load_question_sets, normalize_question_set};

/// A single file normalizes to one JSON object, a directory to an array.
pub fn execute(question_set_path: PathBuf, output: Option<PathBuf>) -> Result<()> {
    let sets = load_question_sets(&question_set_path)?;
    let normalized: Vec<_> = sets.iter().map(normalize_question_set).collect();

    for set in &normalized {
        tracing::info!(
            "normalized {} ({} questions)",
            set.header.id,
            set.questions.len()
        );
    }

    let json = if question_set_path.is_dir() {
        serde_json::to_string_pretty(&normalized)?
    } else {
        match normalized.first() {
            Some(set) => serde_json::to_string_pretty(set)?,
            None => anyhow::bail!("no question set loaded from {}", question_set_path.display()),
        }
    };

    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, json)
                .with_context(|| format!("failed to write {}", path.display()))?;
            let total: usize = normalized.iter().map(|set| set.questions.len()).sum();
            println!("Wrote {total} normalized question(s) to {}", path.display());
        }
        None => println!("{json}"),
    }

    Ok(())
}
