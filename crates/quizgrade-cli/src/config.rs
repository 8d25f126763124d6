//! quizgrade configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// How command results are printed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Top-level quizgrade configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizgradeConfig {
    /// Award credit between 0 and 100 percent.
    #[serde(default = "default_true")]
    pub partial_credit_enabled: bool,
    /// Points for questions that do not set their own.
    #[serde(default = "default_points")]
    pub default_points: f64,
    #[serde(default)]
    pub output_format: OutputFormat,
}

fn default_true() -> bool {
    true
}

fn default_points() -> f64 {
    1.0
}

impl Default for QuizgradeConfig {
    fn default() -> Self {
        Self {
            partial_credit_enabled: true,
            default_points: default_points(),
            output_format: OutputFormat::default(),
        }
    }
}

/// Parse a boolean environment flag.
fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Load config from an explicit path, or search the default locations.
///
/// Search order:
/// 1. `quizgrade.toml` in the current directory
/// 2. `~/.config/quizgrade/config.toml`
///
/// `QUIZGRADE_PARTIAL_CREDIT` overrides `partial_credit_enabled`.
pub fn load_config_from(path: Option<&Path>) -> Result<QuizgradeConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("quizgrade.toml");
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
            tracing::debug!("loading config from {}", path.display());
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<QuizgradeConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => QuizgradeConfig::default(),
    };

    if let Ok(value) = std::env::var("QUIZGRADE_PARTIAL_CREDIT") {
        match parse_flag(&value) {
            Some(enabled) => config.partial_credit_enabled = enabled,
            None => tracing::warn!("ignoring invalid QUIZGRADE_PARTIAL_CREDIT={value}"),
        }
    }

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("quizgrade"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = QuizgradeConfig::default();
        assert!(config.partial_credit_enabled);
        assert_eq!(config.default_points, 1.0);
        assert_eq!(config.output_format, OutputFormat::Text);
    }

    #[test]
    fn parse_partial_config() {
        let config: QuizgradeConfig = toml::from_str(
            r#"
partial_credit_enabled = false
output_format = "json"
"#,
        )
        .unwrap();
        assert!(!config.partial_credit_enabled);
        assert_eq!(config.default_points, 1.0);
        assert_eq!(config.output_format, OutputFormat::Json);
    }

    #[test]
    fn load_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "default_points = 5.0\n").unwrap();

        let config = load_config_from(Some(&path)).unwrap();
        assert_eq!(config.default_points, 5.0);
    }

    #[test]
    fn missing_explicit_path_is_an_error() {
        let err = load_config_from(Some(Path::new("does-not-exist.toml"))).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn env_flag_values() {
        assert_eq!(parse_flag("TRUE"), Some(true));
        assert_eq!(parse_flag(" 0 "), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }
}
