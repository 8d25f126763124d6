//! Question-schema normalization.
//!
//! Converts loosely-typed or legacy authoring input into the canonical
//! per-type config and answer key. Normalization never fails: missing or
//! wrong-typed fields are coerced or defaulted. Feeding canonical output back
//! in yields the same output.

use std::collections::{BTreeMap, HashSet};

use chrono::{Datelike, Utc};
use serde_json::{Map, Value};

use crate::model::{
    CorrectAnswerData, FillBlankAnswer, FillBlankConfig, FillBlankDefinition, MatchingAnswer,
    MatchingConfig, MultiSelectAnswer, MultiSelectConfig, MultipleChoiceAnswer,
    MultipleChoiceConfig, NormalizedQuestionPayload, NumericRangeAnswer, NumericRangeConfig,
    PartialCreditRange, QuestionConfig, QuestionType, RawQuestionInput, TextInputAnswer,
    TextInputConfig, ToleranceType, TrueFalseAnswer, TrueFalseConfig, YearRangeAnswer,
    YearRangeConfig,
};
use crate::template::{
    extract_blank_ids, generic_blank_id, placeholder_template, replace_generic_placeholders,
};

type Record = Map<String, Value>;

// ---------------------------------------------------------------------------
// Loose-value coercion
// ---------------------------------------------------------------------------

/// Treat JSON `null` as absent.
fn present(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| !v.is_null())
}

/// The first non-null value among `keys`.
fn pick<'a>(record: Option<&'a Record>, keys: &[&str]) -> Option<&'a Value> {
    let record = record?;
    keys.iter()
        .find_map(|key| record.get(*key).filter(|v| !v.is_null()))
}

fn value_to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// Trimmed text of a value, empty when absent.
fn text_of(value: Option<&Value>) -> String {
    value.map(value_to_text).unwrap_or_default().trim().to_string()
}

/// A string field, only if it actually holds a string.
fn string_field(value: Option<&Value>) -> Option<String> {
    value.and_then(Value::as_str).map(str::to_string)
}

fn to_string_array(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| value_to_text(item).trim().to_string())
            .filter(|item| !item.is_empty())
            .collect(),
        Some(scalar @ (Value::String(_) | Value::Number(_))) => {
            let text = value_to_text(scalar).trim().to_string();
            if text.is_empty() {
                Vec::new()
            } else {
                vec![text]
            }
        }
        _ => Vec::new(),
    }
}

fn to_number(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) if !s.trim().is_empty() => {
            s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
        }
        _ => None,
    }
}

fn to_boolean(value: Option<&Value>) -> Option<bool> {
    match value? {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        Value::Number(n) => match n.as_f64() {
            Some(v) if v == 1.0 => Some(true),
            Some(v) if v == 0.0 => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Order-preserving dedup; the first occurrence wins.
fn unique_strings(values: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .into_iter()
        .filter(|value| seen.insert(value.clone()))
        .collect()
}

fn push_unique(column: &mut Vec<String>, value: &str) {
    if !value.is_empty() && !column.iter().any(|item| item == value) {
        column.push(value.to_string());
    }
}

/// Round half-way cases toward positive infinity.
fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

fn to_count(value: f64, floor: u32) -> u32 {
    round_half_up(value).max(f64::from(floor)) as u32
}

// ---------------------------------------------------------------------------
// Question type
// ---------------------------------------------------------------------------

/// Resolve a raw question-type value onto a canonical slug.
///
/// Matching is case-insensitive and accepts common aliases. Missing or blank
/// input defaults to multiple choice; anything unrecognized becomes a custom type.
pub fn normalize_question_type(raw: Option<&Value>) -> QuestionType {
    let raw = present(raw).map(value_to_text).unwrap_or_default();
    let raw = raw.trim().to_lowercase();
    match raw.as_str() {
        "" => QuestionType::MultipleChoice,
        "multiple choice" | "multiple-choice" | "multi_choice" | "mcq" => {
            QuestionType::MultipleChoice
        }
        "truefalse" | "boolean" => QuestionType::TrueFalse,
        "text" | "free_text" | "short_answer" | "shortanswer" => QuestionType::TextInput,
        "year" => QuestionType::YearRange,
        "number" | "numeric" | "number_range" => QuestionType::NumericRange,
        "match" | "matching_pairs" => QuestionType::Matching,
        "fill_blanks" | "fill_in_blank" | "fill-in-the-blank" => QuestionType::FillBlank,
        "multi-select" | "multi select" | "multiple_select" => QuestionType::MultiSelect,
        other => QuestionType::from_slug(other),
    }
}

// ---------------------------------------------------------------------------
// Payload normalization
// ---------------------------------------------------------------------------

/// Normalize authoring input, using the current UTC year as the last-resort
/// answer for year questions.
pub fn normalize_question_payload(input: &RawQuestionInput) -> NormalizedQuestionPayload {
    normalize_question_payload_at(input, i64::from(Utc::now().year()))
}

/// Normalize authoring input with an explicit fallback year.
pub fn normalize_question_payload_at(
    input: &RawQuestionInput,
    fallback_year: i64,
) -> NormalizedQuestionPayload {
    let question_type = normalize_question_type(input.question_type.as_ref());
    let config = input.question_config.as_ref().and_then(Value::as_object);
    let answer = input.correct_answer_data.as_ref().and_then(Value::as_object);

    match question_type {
        QuestionType::MultipleChoice => normalize_multiple_choice(config, answer, input),
        QuestionType::TrueFalse => normalize_true_false(config, answer, input),
        QuestionType::TextInput => normalize_text_input(config, answer),
        QuestionType::YearRange => normalize_year_range(config, answer, input, fallback_year),
        QuestionType::NumericRange => normalize_numeric_range(config, answer, input),
        QuestionType::Matching => normalize_matching(config, answer),
        QuestionType::FillBlank => normalize_fill_blank(config, answer),
        QuestionType::MultiSelect => normalize_multi_select(config, answer),
        QuestionType::Custom(_) => normalize_custom(question_type, config, answer, input),
    }
}

fn typed_payload(
    question_type: QuestionType,
    question_config: QuestionConfig,
    correct_answer_data: CorrectAnswerData,
) -> NormalizedQuestionPayload {
    NormalizedQuestionPayload {
        question_type,
        question_config,
        correct_answer_data: Some(correct_answer_data),
        options: None,
        correct_answer: None,
    }
}

fn normalize_multiple_choice(
    config: Option<&Record>,
    answer: Option<&Record>,
    input: &RawQuestionInput,
) -> NormalizedQuestionPayload {
    let options = unique_strings(to_string_array(
        pick(config, &["options", "choices"]).or_else(|| present(input.options.as_ref())),
    ));

    let mut resolved = to_number(
        pick(answer, &["correctIndex", "correctAnswer", "answerIndex"])
            .or_else(|| present(input.correct_answer.as_ref())),
    );
    if resolved.is_none() {
        if let Some(text) = pick(answer, &["correctOption"]).and_then(Value::as_str) {
            resolved = Some(
                options
                    .iter()
                    .position(|option| option == text)
                    .map_or(-1.0, |index| index as f64),
            );
        }
    }

    let correct_index = match resolved {
        _ if options.is_empty() => 0,
        Some(index) => (round_half_up(index) as i64).clamp(0, options.len() as i64 - 1),
        None => {
            tracing::debug!("no correct option resolved, defaulting to the first option");
            0
        }
    };

    NormalizedQuestionPayload {
        question_type: QuestionType::MultipleChoice,
        question_config: QuestionConfig::MultipleChoice(MultipleChoiceConfig {
            options: options.clone(),
            shuffle_options: to_boolean(pick(config, &["shuffleOptions"])).unwrap_or(false),
        }),
        correct_answer_data: Some(CorrectAnswerData::MultipleChoice(MultipleChoiceAnswer {
            correct_index,
        })),
        options: Some(options),
        correct_answer: Some(correct_index as f64),
    }
}

fn normalize_true_false(
    config: Option<&Record>,
    answer: Option<&Record>,
    input: &RawQuestionInput,
) -> NormalizedQuestionPayload {
    let legacy = match to_number(present(input.correct_answer.as_ref())) {
        Some(v) if v == 1.0 => Some(true),
        Some(v) if v == 0.0 => Some(false),
        _ => None,
    };
    let correct_value = to_boolean(pick(answer, &["correctValue", "isTrue", "answer"]))
        .or(legacy)
        .unwrap_or(true);

    let defaults = TrueFalseConfig::default();
    typed_payload(
        QuestionType::TrueFalse,
        QuestionConfig::TrueFalse(TrueFalseConfig {
            true_label: string_field(pick(config, &["trueLabel"])).unwrap_or(defaults.true_label),
            false_label: string_field(pick(config, &["falseLabel"]))
                .unwrap_or(defaults.false_label),
        }),
        CorrectAnswerData::TrueFalse(TrueFalseAnswer {
            correct_value: Some(correct_value),
        }),
    )
}

fn normalize_text_input(
    config: Option<&Record>,
    answer: Option<&Record>,
) -> NormalizedQuestionPayload {
    let accepted_answers = unique_strings(to_string_array(
        pick(answer, &["acceptedAnswers", "answers", "correctAnswers"])
            .or_else(|| pick(answer, &["exactMatch"]).filter(|v| v.is_string())),
    ));
    let keywords = unique_strings(to_string_array(
        pick(answer, &["keywords"]).or_else(|| pick(config, &["acceptedKeywords"])),
    ));
    let keyword_match_threshold = to_number(pick(answer, &["keywordMatchThreshold"]))
        .map(|v| to_count(v, 0))
        .filter(|&threshold| threshold > 0);

    typed_payload(
        QuestionType::TextInput,
        QuestionConfig::TextInput(TextInputConfig {
            case_sensitive: to_boolean(pick(config, &["caseSensitive"])).unwrap_or(false),
            trim_whitespace: to_boolean(pick(config, &["trimWhitespace"])).unwrap_or(true),
            placeholder: string_field(pick(config, &["placeholder"])),
            max_length: to_number(pick(config, &["maxLength"]))
                .filter(|&v| v > 0.0)
                .map(|v| to_count(v, 0)),
        }),
        CorrectAnswerData::TextInput(TextInputAnswer {
            accepted_answers,
            keywords,
            keyword_match_threshold,
        }),
    )
}

/// Well-formed tolerance tiers, sorted by ascending tolerance.
fn partial_credit_ranges(
    answer: Option<&Record>,
    keep_tolerance_type: bool,
) -> Vec<PartialCreditRange> {
    let Some(entries) = pick(answer, &["partialCreditRanges"]).and_then(Value::as_array) else {
        return Vec::new();
    };

    let mut ranges: Vec<PartialCreditRange> = entries
        .iter()
        .filter_map(Value::as_object)
        .filter_map(|entry| {
            let tolerance = to_number(entry.get("tolerance"))?;
            let credit_percent = to_number(entry.get("creditPercent"))?;
            let tolerance_type = match entry.get("toleranceType").and_then(Value::as_str) {
                Some("absolute") if keep_tolerance_type => Some(ToleranceType::Absolute),
                Some("percentage") if keep_tolerance_type => Some(ToleranceType::Percentage),
                _ => None,
            };
            Some(PartialCreditRange {
                tolerance: tolerance.max(0.0),
                tolerance_type,
                credit_percent: credit_percent.clamp(0.0, 100.0),
            })
        })
        .collect();
    ranges.sort_by(|a, b| a.tolerance.total_cmp(&b.tolerance));
    ranges
}

fn normalize_year_range(
    config: Option<&Record>,
    answer: Option<&Record>,
    input: &RawQuestionInput,
    fallback_year: i64,
) -> NormalizedQuestionPayload {
    let as_year = |v: f64| round_half_up(v) as i64;
    let correct_year = to_number(pick(answer, &["correctYear", "exactYear", "year"]))
        .or_else(|| to_number(present(input.correct_answer.as_ref())))
        .map(as_year)
        .unwrap_or_else(|| {
            tracing::debug!(fallback_year, "no correct year resolved, using fallback year");
            fallback_year
        });

    typed_payload(
        QuestionType::YearRange,
        QuestionConfig::YearRange(YearRangeConfig {
            tolerance: to_number(pick(config, &["tolerance", "toleranceYears"]))
                .map(|v| as_year(v).max(0)),
            min_year: to_number(pick(config, &["minYear", "min"])).map(as_year),
            max_year: to_number(pick(config, &["maxYear", "max"])).map(as_year),
            placeholder: string_field(pick(config, &["placeholder"])),
        }),
        CorrectAnswerData::YearRange(YearRangeAnswer {
            correct_year: Some(correct_year),
            partial_credit_ranges: partial_credit_ranges(answer, false),
        }),
    )
}

fn normalize_numeric_range(
    config: Option<&Record>,
    answer: Option<&Record>,
    input: &RawQuestionInput,
) -> NormalizedQuestionPayload {
    let mut tolerance = to_number(pick(config, &["tolerance"]));
    let mut tolerance_type = match pick(config, &["toleranceType"]).and_then(Value::as_str) {
        Some("absolute") => Some(ToleranceType::Absolute),
        Some("percentage") => Some(ToleranceType::Percentage),
        _ => None,
    };
    let tolerance_percent = to_number(
        pick(config, &["tolerancePercent"]).or_else(|| pick(answer, &["tolerancePercent"])),
    );
    if tolerance.is_none() && tolerance_percent.is_some() {
        tolerance = tolerance_percent;
        tolerance_type = Some(ToleranceType::Percentage);
    }

    let correct_value = to_number(pick(answer, &["correctValue", "exactValue", "value"]))
        .or_else(|| to_number(present(input.correct_answer.as_ref())))
        .unwrap_or(0.0);

    typed_payload(
        QuestionType::NumericRange,
        QuestionConfig::NumericRange(NumericRangeConfig {
            tolerance: tolerance.map(|t| t.max(0.0)),
            tolerance_type: tolerance_type.unwrap_or_default(),
            min: to_number(pick(config, &["min", "minValue"])),
            max: to_number(pick(config, &["max", "maxValue"])),
            step: to_number(pick(config, &["step"])).filter(|&step| step > 0.0),
            unit: string_field(pick(config, &["unit"])),
            placeholder: string_field(pick(config, &["placeholder"])),
        }),
        CorrectAnswerData::NumericRange(NumericRangeAnswer {
            correct_value: Some(correct_value),
            partial_credit_ranges: partial_credit_ranges(answer, true),
        }),
    )
}

// ---------------------------------------------------------------------------
// Matching
// ---------------------------------------------------------------------------

/// Decide whether the numeric entries at `position` of each `[left, right]`
/// tuple are 1-based column indices.
///
/// True only when at least one numeric value exists and every one of them
/// lies in `1..=column_len` (so none is `0`).
pub fn detect_one_based_indexing(entries: &[Value], position: usize, column_len: usize) -> bool {
    if column_len == 0 {
        return false;
    }
    let values: Vec<i64> = entries
        .iter()
        .filter_map(Value::as_array)
        .filter_map(|tuple| tuple.get(position))
        .filter_map(|value| to_number(Some(value)))
        .map(|value| round_half_up(value) as i64)
        .collect();

    !values.is_empty()
        && values
            .iter()
            .all(|&value| value >= 1 && value <= column_len as i64)
}

fn resolve_list_index(value: &Value, column_len: usize, prefer_one_based: bool) -> Option<usize> {
    let numeric = to_number(Some(value))?;
    if column_len == 0 {
        return None;
    }
    let rounded = round_half_up(numeric) as i64;
    let len = column_len as i64;

    if prefer_one_based && (1..=len).contains(&rounded) {
        return usize::try_from(rounded - 1).ok();
    }
    if (0..len).contains(&rounded) {
        return usize::try_from(rounded).ok();
    }
    if !prefer_one_based && (1..=len).contains(&rounded) {
        return usize::try_from(rounded - 1).ok();
    }
    None
}

/// Resolve a pair side to a column item.
///
/// JSON numbers are column indices and are dropped when out of range. Text
/// matching an existing item is taken literally, numeric text is tried as an
/// index, and any other text is a new literal item.
fn resolve_list_value(value: &Value, column: &[String], prefer_one_based: bool) -> Option<String> {
    let by_index = |value: &Value| {
        resolve_list_index(value, column.len(), prefer_one_based)
            .and_then(|index| column.get(index).cloned())
    };

    match value {
        Value::Null => None,
        Value::Number(_) => by_index(value),
        other => {
            let text = value_to_text(other).trim().to_string();
            if text.is_empty() {
                None
            } else if column.contains(&text) {
                Some(text)
            } else {
                by_index(other).or(Some(text))
            }
        }
    }
}

fn normalize_matching(
    config: Option<&Record>,
    answer: Option<&Record>,
) -> NormalizedQuestionPayload {
    let mut left_column = unique_strings(to_string_array(pick(
        config,
        &["leftColumn", "leftItems", "left"],
    )));
    let mut right_column = unique_strings(to_string_array(pick(
        config,
        &["rightColumn", "rightItems", "right"],
    )));

    if let Some(pairs) = pick(config, &["pairs"]).and_then(Value::as_array) {
        for pair in pairs.iter().filter_map(Value::as_object) {
            push_unique(&mut left_column, &text_of(pick(Some(pair), &["left", "term"])));
            push_unique(
                &mut right_column,
                &text_of(pick(Some(pair), &["right", "match", "definition"])),
            );
        }
    }

    let raw_pairs = pick(answer, &["correctPairs", "pairs", "matches"]);
    let tuples = raw_pairs
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();
    let one_based_left = detect_one_based_indexing(tuples, 0, left_column.len());
    let one_based_right = detect_one_based_indexing(tuples, 1, right_column.len());

    let mut resolved: Vec<(Option<String>, Option<String>)> = Vec::new();
    match raw_pairs {
        Some(Value::Array(entries)) => {
            for entry in entries {
                let (left, right) = match entry {
                    Value::Array(tuple) if tuple.len() >= 2 => (Some(&tuple[0]), Some(&tuple[1])),
                    Value::Object(pair) => (
                        pick(Some(pair), &["left", "leftItem", "from"]),
                        pick(Some(pair), &["right", "rightItem", "to"]),
                    ),
                    _ => continue,
                };
                resolved.push((
                    left.and_then(|v| resolve_list_value(v, &left_column, one_based_left)),
                    right.and_then(|v| resolve_list_value(v, &right_column, one_based_right)),
                ));
            }
        }
        Some(Value::Object(map)) => {
            for (left, right) in map {
                resolved.push((
                    resolve_list_value(&Value::String(left.clone()), &left_column, false),
                    resolve_list_value(right, &right_column, false),
                ));
            }
        }
        _ => {}
    }

    let mut correct_pairs = BTreeMap::new();
    let mut order = Vec::new();
    for (left, right) in resolved {
        if let (Some(left), Some(right)) = (left, right) {
            if correct_pairs.insert(left.clone(), right).is_none() {
                order.push(left);
            }
        }
    }

    if correct_pairs.is_empty() && left_column.len() == right_column.len() {
        for (left, right) in left_column.iter().zip(&right_column) {
            correct_pairs.insert(left.clone(), right.clone());
        }
    }

    for left in &order {
        push_unique(&mut left_column, left);
        if let Some(right) = correct_pairs.get(left) {
            push_unique(&mut right_column, right);
        }
    }

    typed_payload(
        QuestionType::Matching,
        QuestionConfig::Matching(MatchingConfig {
            left_column,
            right_column,
            shuffle_right: to_boolean(pick(config, &["shuffleRight"])).unwrap_or(true),
            left_column_label: string_field(pick(config, &["leftColumnLabel"])),
            right_column_label: string_field(pick(config, &["rightColumnLabel"])),
        }),
        CorrectAnswerData::Matching(MatchingAnswer {
            correct_pairs,
            partial_credit_per_pair: to_boolean(pick(answer, &["partialCreditPerPair"])),
        }),
    )
}

// ---------------------------------------------------------------------------
// Fill in the blank
// ---------------------------------------------------------------------------

fn normalize_fill_blank(
    config: Option<&Record>,
    answer: Option<&Record>,
) -> NormalizedQuestionPayload {
    let raw_template = text_of(pick(config, &["template"]));

    let config_blanks: Vec<FillBlankDefinition> = pick(config, &["blanks"])
        .and_then(Value::as_array)
        .map(|blanks| {
            blanks
                .iter()
                .enumerate()
                .map(|(index, blank)| {
                    let record = blank.as_object();
                    let id = pick(record, &["id"])
                        .map(value_to_text)
                        .unwrap_or_else(|| generic_blank_id(index))
                        .trim()
                        .to_string();
                    FillBlankDefinition {
                        id,
                        accepted_answers: unique_strings(to_string_array(pick(
                            record,
                            &["acceptedAnswers", "answers", "answer"],
                        ))),
                    }
                })
                .collect()
        })
        .unwrap_or_default();

    // Answer-key entries override config entries for the same id.
    let mut accepted_by_id: Vec<(String, Vec<String>)> = Vec::new();
    let mut upsert = |id: &str, answers: Vec<String>| {
        match accepted_by_id.iter().position(|(existing, _)| existing == id) {
            Some(index) => accepted_by_id[index].1 = answers,
            None => accepted_by_id.push((id.to_string(), answers)),
        }
    };
    for blank in config_blanks.iter().filter(|blank| !blank.id.is_empty()) {
        upsert(&blank.id, blank.accepted_answers.clone());
    }
    if let Some(answer_blanks) =
        pick(answer, &["blanks", "correctBlanks"]).and_then(Value::as_object)
    {
        for (id, answers) in answer_blanks {
            upsert(id, unique_strings(to_string_array(Some(answers))));
        }
    }

    let declared: Vec<String> = config_blanks.iter().map(|blank| blank.id.clone()).collect();
    let mut blank_ids = extract_blank_ids(&raw_template, &declared);
    if blank_ids.is_empty() {
        blank_ids = unique_strings(
            declared.iter().filter(|id| !id.is_empty()).cloned().collect(),
        );
    }
    if blank_ids.is_empty() {
        blank_ids = accepted_by_id.iter().map(|(id, _)| id.clone()).collect();
    }
    if blank_ids.is_empty() {
        blank_ids = vec![generic_blank_id(0)];
    }

    let template = if raw_template.is_empty() {
        placeholder_template(&blank_ids)
    } else {
        replace_generic_placeholders(&raw_template, &declared)
    };

    let blanks: Vec<FillBlankDefinition> = blank_ids
        .iter()
        .enumerate()
        .map(|(index, id)| {
            let accepted_answers = accepted_by_id
                .iter()
                .find(|(existing, _)| existing == id)
                .map(|(_, answers)| answers)
                .or_else(|| {
                    config_blanks
                        .iter()
                        .find(|blank| &blank.id == id)
                        .map(|blank| &blank.accepted_answers)
                })
                .or_else(|| config_blanks.get(index).map(|blank| &blank.accepted_answers))
                .cloned()
                .unwrap_or_default();
            FillBlankDefinition {
                id: id.clone(),
                accepted_answers,
            }
        })
        .collect();

    let answer_blanks = blanks
        .iter()
        .map(|blank| (blank.id.clone(), blank.accepted_answers.clone()))
        .collect();

    typed_payload(
        QuestionType::FillBlank,
        QuestionConfig::FillBlank(FillBlankConfig {
            template,
            blanks,
            case_sensitive: to_boolean(pick(config, &["caseSensitive"])).unwrap_or(false),
        }),
        CorrectAnswerData::FillBlank(FillBlankAnswer {
            blanks: answer_blanks,
        }),
    )
}

// ---------------------------------------------------------------------------
// Multi select and custom types
// ---------------------------------------------------------------------------

fn normalize_multi_select(
    config: Option<&Record>,
    answer: Option<&Record>,
) -> NormalizedQuestionPayload {
    let options = unique_strings(to_string_array(pick(config, &["options", "choices"])));

    let raw_indices = pick(answer, &["correctIndices"])
        .and_then(Value::as_array)
        .or_else(|| pick(answer, &["indices"]).and_then(Value::as_array));

    let mut seen = HashSet::new();
    let mut correct_indices: Vec<i64> = raw_indices
        .map(|indices| {
            indices
                .iter()
                .filter_map(|value| to_number(Some(value)))
                .map(|value| round_half_up(value) as i64)
                .filter(|index| seen.insert(*index))
                .filter(|&index| index >= 0 && index < options.len() as i64)
                .collect()
        })
        .unwrap_or_default();

    if correct_indices.is_empty() {
        if let Some(texts) = pick(answer, &["correctAnswers"]).filter(|v| v.is_array()) {
            for text in to_string_array(Some(texts)) {
                if let Some(index) = options.iter().position(|option| *option == text) {
                    let index = index as i64;
                    if !correct_indices.contains(&index) {
                        correct_indices.push(index);
                    }
                }
            }
        }
    }

    typed_payload(
        QuestionType::MultiSelect,
        QuestionConfig::MultiSelect(MultiSelectConfig {
            options,
            shuffle_options: to_boolean(pick(config, &["shuffleOptions"])),
            min_selections: to_number(pick(config, &["minSelections"])).map(|v| to_count(v, 0)),
            max_selections: to_number(pick(config, &["maxSelections"])).map(|v| to_count(v, 1)),
        }),
        CorrectAnswerData::MultiSelect(MultiSelectAnswer {
            correct_indices,
            partial_credit: to_boolean(pick(answer, &["partialCredit"])),
        }),
    )
}

fn normalize_custom(
    question_type: QuestionType,
    config: Option<&Record>,
    answer: Option<&Record>,
    input: &RawQuestionInput,
) -> NormalizedQuestionPayload {
    tracing::debug!(%question_type, "passing custom question type through unchanged");
    let options = present(input.options.as_ref())
        .filter(|v| v.is_array())
        .map(|options| to_string_array(Some(options)));

    NormalizedQuestionPayload {
        question_type,
        question_config: QuestionConfig::Custom(config.cloned().unwrap_or_default()),
        correct_answer_data: answer
            .filter(|data| !data.is_empty())
            .cloned()
            .map(CorrectAnswerData::Custom),
        options,
        correct_answer: to_number(present(input.correct_answer.as_ref())),
    }
}
