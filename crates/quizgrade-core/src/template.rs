//! Fill-in-the-blank template parsing.
//!
//! Templates mark blanks with `{{id}}` placeholders. The generic token
//! `{{blank}}` is unlabeled and is mapped onto declared blanks by position.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::{Captures, Regex};

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{([^}]+)\}\}").expect("invalid placeholder regex"));

/// One segment of a parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplatePart {
    /// Literal text shown to the learner.
    Text(String),
    /// An input slot for the blank with this id.
    Blank { id: String },
}

/// The id of the `index`-th unlabeled blank.
pub fn generic_blank_id(index: usize) -> String {
    format!("blank_{index}")
}

/// Split a template into text and blank parts.
///
/// `declared` lists known blank ids in order; generic `{{blank}}` tokens take
/// them positionally and fall back to `blank_{n}`. A placeholder holding only
/// whitespace stays literal text. A template without any parts yields a single
/// (possibly empty) text part.
pub fn parse_template(template: &str, declared: &[String]) -> Vec<TemplatePart> {
    let mut parts = Vec::new();
    let mut cursor = 0;
    let mut generic_index = 0;

    for caps in PLACEHOLDER.captures_iter(template) {
        let (Some(whole), Some(token)) = (caps.get(0), caps.get(1)) else {
            continue;
        };

        if whole.start() > cursor {
            parts.push(TemplatePart::Text(template[cursor..whole.start()].to_string()));
        }

        let token = token.as_str().trim();
        if token.eq_ignore_ascii_case("blank") {
            let id = declared
                .get(generic_index)
                .filter(|id| !id.is_empty())
                .cloned()
                .unwrap_or_else(|| generic_blank_id(generic_index));
            parts.push(TemplatePart::Blank { id });
            generic_index += 1;
        } else if token.is_empty() {
            parts.push(TemplatePart::Text(whole.as_str().to_string()));
        } else {
            parts.push(TemplatePart::Blank {
                id: token.to_string(),
            });
        }

        cursor = whole.end();
    }

    if cursor < template.len() {
        parts.push(TemplatePart::Text(template[cursor..].to_string()));
    }

    if parts.is_empty() {
        parts.push(TemplatePart::Text(template.to_string()));
    }
    parts
}

/// Blank ids in order of first appearance, without duplicates.
pub fn extract_blank_ids(template: &str, declared: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    parse_template(template, declared)
        .into_iter()
        .filter_map(|part| match part {
            TemplatePart::Blank { id } if seen.insert(id.clone()) => Some(id),
            _ => None,
        })
        .collect()
}

/// Rewrite every generic `{{blank}}` token to `{{id}}`.
///
/// Ids are assigned exactly as [`parse_template`] assigns them: the n-th
/// generic token takes `declared[n]`, else `blank_{n}`. Named placeholders are
/// left untouched.
pub fn replace_generic_placeholders(template: &str, declared: &[String]) -> String {
    let mut generic_index = 0;
    PLACEHOLDER
        .replace_all(template, |caps: &Captures<'_>| {
            let whole = caps.get(0).map_or("", |m| m.as_str());
            let token = caps.get(1).map_or("", |m| m.as_str().trim());
            if !token.eq_ignore_ascii_case("blank") {
                return whole.to_string();
            }
            let id = declared
                .get(generic_index)
                .filter(|id| !id.is_empty())
                .cloned()
                .unwrap_or_else(|| generic_blank_id(generic_index));
            generic_index += 1;
            format!("{{{{{id}}}}}")
        })
        .into_owned()
}

/// Build a minimal template with one placeholder per blank.
pub fn placeholder_template(blank_ids: &[String]) -> String {
    blank_ids
        .iter()
        .map(|id| format!("{{{{{id}}}}}"))
        .collect::<Vec<_>>()
        .join(" ")
}
