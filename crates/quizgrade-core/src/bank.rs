//! Question-set files.
//!
//! Loads question sets from TOML or JSON files and directories, checks them
//! for authoring problems, and normalizes them in bulk.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::{CorrectAnswerData, QuestionType, RawQuestionInput, StoredQuestion};
use crate::normalizer::normalize_question_payload;

/// Identity of a question set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionSetHeader {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// One question as written by an author. The answer fields are loosely typed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthoredQuestion {
    pub id: String,
    #[serde(default)]
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<f64>,
    #[serde(default, alias = "questionType", skip_serializing_if = "Option::is_none")]
    pub question_type: Option<Value>,
    #[serde(default, alias = "questionConfig", skip_serializing_if = "Option::is_none")]
    pub question_config: Option<Value>,
    #[serde(
        default,
        alias = "correctAnswerData",
        skip_serializing_if = "Option::is_none"
    )]
    pub correct_answer_data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Value>,
    #[serde(default, alias = "correctAnswer", skip_serializing_if = "Option::is_none")]
    pub correct_answer: Option<Value>,
}

impl AuthoredQuestion {
    pub fn raw_input(&self) -> RawQuestionInput {
        RawQuestionInput {
            question_type: self.question_type.clone(),
            question_config: self.question_config.clone(),
            correct_answer_data: self.correct_answer_data.clone(),
            options: self.options.clone(),
            correct_answer: self.correct_answer.clone(),
        }
    }

    pub fn normalize(&self) -> StoredQuestion {
        StoredQuestion {
            id: self.id.clone(),
            prompt: Some(self.prompt.clone()).filter(|prompt| !prompt.is_empty()),
            points: self.points,
            payload: normalize_question_payload(&self.raw_input()),
        }
    }
}

/// A set of authored questions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionSet {
    #[serde(rename = "question_set")]
    pub header: QuestionSetHeader,
    #[serde(default)]
    pub questions: Vec<AuthoredQuestion>,
}

/// A question set after normalization, ready to persist or grade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedQuestionSet {
    #[serde(rename = "question_set")]
    pub header: QuestionSetHeader,
    #[serde(default)]
    pub questions: Vec<StoredQuestion>,
}

fn is_json(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "json")
}

fn is_question_set_file(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext == "toml" || ext == "json")
}

/// Parse a single question-set file. `.json` files are JSON, anything else TOML.
pub fn parse_question_set(path: &Path) -> Result<QuestionSet> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read question set file: {}", path.display()))?;

    parse_question_set_str(&content, path)
}

/// Parse question-set content; the format follows `source_path`'s extension.
pub fn parse_question_set_str(content: &str, source_path: &Path) -> Result<QuestionSet> {
    let set: QuestionSet = if is_json(source_path) {
        serde_json::from_str(content)
            .with_context(|| format!("failed to parse JSON: {}", source_path.display()))?
    } else {
        toml::from_str(content)
            .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?
    };

    tracing::debug!(
        set = %set.header.id,
        questions = set.questions.len(),
        "parsed question set from {}",
        source_path.display()
    );
    Ok(set)
}

/// Recursively load all `.toml` and `.json` question sets from a directory.
pub fn load_question_directory(dir: &Path) -> Result<Vec<QuestionSet>> {
    let mut sets = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut paths = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .map(|entry| entry.map(|entry| entry.path()))
        .collect::<std::io::Result<Vec<_>>>()?;
    paths.sort();

    for path in paths {
        if path.is_dir() {
            sets.extend(load_question_directory(&path)?);
        } else if is_question_set_file(&path) {
            match parse_question_set(&path) {
                Ok(set) => sets.push(set),
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }

    Ok(sets)
}

/// Load a question-set file, or every question set below a directory.
pub fn load_question_sets(path: &Path) -> Result<Vec<QuestionSet>> {
    if path.is_dir() {
        load_question_directory(path)
    } else {
        Ok(vec![parse_question_set(path)?])
    }
}

/// Normalize every question of a set.
pub fn normalize_question_set(set: &QuestionSet) -> NormalizedQuestionSet {
    NormalizedQuestionSet {
        header: set.header.clone(),
        questions: set.questions.iter().map(AuthoredQuestion::normalize).collect(),
    }
}

/// A problem found while checking a question set.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The question ID (if applicable).
    pub question_id: Option<String>,
    /// Warning message.
    pub message: String,
}

/// Check a question set for common authoring mistakes.
pub fn validate_question_set(set: &QuestionSet) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    let mut seen_ids = HashSet::new();
    for question in &set.questions {
        if !seen_ids.insert(&question.id) {
            warnings.push(ValidationWarning {
                question_id: Some(question.id.clone()),
                message: format!("duplicate question ID: {}", question.id),
            });
        }
    }

    for question in &set.questions {
        if question.prompt.trim().is_empty() {
            warnings.push(ValidationWarning {
                question_id: Some(question.id.clone()),
                message: "prompt is empty".into(),
            });
        }
    }

    for question in &set.questions {
        let stored = question.normalize();
        warnings.extend(answer_key_issues(&stored).into_iter().map(|message| {
            ValidationWarning {
                question_id: Some(question.id.clone()),
                message,
            }
        }));
    }

    warnings
}

fn answer_key_issues(question: &StoredQuestion) -> Vec<String> {
    let payload = &question.payload;
    let mut issues = Vec::new();

    if let QuestionType::Custom(slug) = &payload.question_type {
        issues.push(format!("custom question type '{slug}' cannot be auto-graded"));
        return issues;
    }

    if let Some(options) = payload.question_config.options() {
        if options.len() < 2 {
            issues.push(format!(
                "{} needs at least 2 options, found {}",
                payload.question_type,
                options.len()
            ));
        }
    }

    match &payload.correct_answer_data {
        Some(CorrectAnswerData::MultiSelect(key)) if key.correct_indices.is_empty() => {
            issues.push("no correct options selected".into());
        }
        Some(CorrectAnswerData::TextInput(key))
            if key.accepted_answers.is_empty() && key.keywords.is_empty() =>
        {
            issues.push("no accepted answers or keywords".into());
        }
        Some(CorrectAnswerData::Matching(key)) if key.correct_pairs.is_empty() => {
            issues.push("no correct pairs".into());
        }
        Some(CorrectAnswerData::FillBlank(key)) => {
            for (id, accepted) in &key.blanks {
                if accepted.is_empty() {
                    issues.push(format!("blank '{id}' has no accepted answers"));
                }
            }
        }
        _ => {}
    }

    issues
}
