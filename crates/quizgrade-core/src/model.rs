//! Core data model types for quizgrade.
//!
//! Question configs and answer keys are strict per-type shapes. They are
//! serialized without a tag because the question type always travels next to
//! them, so decoding goes through [`QuestionConfig::from_value`] and
//! [`CorrectAnswerData::from_value`] with the type in hand.

use std::collections::BTreeMap;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::SchemaError;

// ---------------------------------------------------------------------------
// Question types
// ---------------------------------------------------------------------------

/// The kind of a quiz question.
///
/// The eight built-in kinds are graded by this crate. Any other slug is kept
/// verbatim as [`QuestionType::Custom`] and is never auto-graded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum QuestionType {
    #[default]
    MultipleChoice,
    TrueFalse,
    TextInput,
    YearRange,
    NumericRange,
    Matching,
    FillBlank,
    MultiSelect,
    Custom(String),
}

impl QuestionType {
    /// All built-in question types, in declaration order.
    pub const BUILT_IN: [QuestionType; 8] = [
        QuestionType::MultipleChoice,
        QuestionType::TrueFalse,
        QuestionType::TextInput,
        QuestionType::YearRange,
        QuestionType::NumericRange,
        QuestionType::Matching,
        QuestionType::FillBlank,
        QuestionType::MultiSelect,
    ];

    /// Map an exact canonical slug onto a question type.
    ///
    /// Aliases such as `"mcq"` are resolved by
    /// [`normalize_question_type`](crate::normalizer::normalize_question_type),
    /// not here.
    pub fn from_slug(slug: &str) -> Self {
        match slug {
            "multiple_choice" => QuestionType::MultipleChoice,
            "true_false" => QuestionType::TrueFalse,
            "text_input" => QuestionType::TextInput,
            "year_range" => QuestionType::YearRange,
            "numeric_range" => QuestionType::NumericRange,
            "matching" => QuestionType::Matching,
            "fill_blank" => QuestionType::FillBlank,
            "multi_select" => QuestionType::MultiSelect,
            other => QuestionType::Custom(other.to_string()),
        }
    }

    /// The slug for this question type.
    pub fn as_str(&self) -> &str {
        match self {
            QuestionType::MultipleChoice => "multiple_choice",
            QuestionType::TrueFalse => "true_false",
            QuestionType::TextInput => "text_input",
            QuestionType::YearRange => "year_range",
            QuestionType::NumericRange => "numeric_range",
            QuestionType::Matching => "matching",
            QuestionType::FillBlank => "fill_blank",
            QuestionType::MultiSelect => "multi_select",
            QuestionType::Custom(slug) => slug,
        }
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, QuestionType::Custom(_))
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuestionType {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(QuestionType::from_slug(s))
    }
}

impl From<String> for QuestionType {
    fn from(slug: String) -> Self {
        match QuestionType::from_slug(&slug) {
            QuestionType::Custom(_) => QuestionType::Custom(slug),
            builtin => builtin,
        }
    }
}

impl From<QuestionType> for String {
    fn from(question_type: QuestionType) -> Self {
        match question_type {
            QuestionType::Custom(slug) => slug,
            builtin => builtin.as_str().to_string(),
        }
    }
}

/// How a numeric tolerance is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToleranceType {
    /// The tolerance is an absolute distance from the expected value.
    #[default]
    Absolute,
    /// The tolerance is a percentage of the expected value's magnitude.
    Percentage,
}

impl ToleranceType {
    /// Resolve a tolerance into an absolute distance around `expected`.
    pub fn resolve(self, tolerance: f64, expected: f64) -> f64 {
        match self {
            ToleranceType::Absolute => tolerance,
            ToleranceType::Percentage => tolerance * expected.abs() / 100.0,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_true_label() -> String {
    "True".to_string()
}

fn default_false_label() -> String {
    "False".to_string()
}

// ---------------------------------------------------------------------------
// Question configs (authoring parameters, never the answer)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MultipleChoiceConfig {
    pub options: Vec<String>,
    pub shuffle_options: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrueFalseConfig {
    #[serde(default = "default_true_label")]
    pub true_label: String,
    #[serde(default = "default_false_label")]
    pub false_label: String,
}

impl Default for TrueFalseConfig {
    fn default() -> Self {
        Self {
            true_label: default_true_label(),
            false_label: default_false_label(),
        }
    }
}

/// Text answers are trimmed and matched case-insensitively unless configured otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextInputConfig {
    #[serde(default)]
    pub case_sensitive: bool,
    #[serde(default = "default_true")]
    pub trim_whitespace: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u32>,
}

impl Default for TextInputConfig {
    fn default() -> Self {
        Self {
            case_sensitive: false,
            trim_whitespace: true,
            placeholder: None,
            max_length: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct YearRangeConfig {
    /// Years either side of the answer that still earn decaying credit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tolerance: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_year: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_year: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NumericRangeConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tolerance: Option<f64>,
    pub tolerance_type: ToleranceType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchingConfig {
    #[serde(default)]
    pub left_column: Vec<String>,
    #[serde(default)]
    pub right_column: Vec<String>,
    #[serde(default = "default_true")]
    pub shuffle_right: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left_column_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right_column_label: Option<String>,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            left_column: Vec::new(),
            right_column: Vec::new(),
            shuffle_right: true,
            left_column_label: None,
            right_column_label: None,
        }
    }
}

/// One blank of a fill-in-the-blank template.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FillBlankDefinition {
    pub id: String,
    pub accepted_answers: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FillBlankConfig {
    /// Text with `{{id}}` placeholders.
    pub template: String,
    pub blanks: Vec<FillBlankDefinition>,
    pub case_sensitive: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MultiSelectConfig {
    pub options: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shuffle_options: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_selections: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_selections: Option<u32>,
}

/// Authoring parameters for a question, one shape per question type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum QuestionConfig {
    MultipleChoice(MultipleChoiceConfig),
    TrueFalse(TrueFalseConfig),
    TextInput(TextInputConfig),
    YearRange(YearRangeConfig),
    NumericRange(NumericRangeConfig),
    Matching(MatchingConfig),
    FillBlank(FillBlankConfig),
    MultiSelect(MultiSelectConfig),
    Custom(Map<String, Value>),
}

impl QuestionConfig {
    /// Decode a stored config for the given question type.
    ///
    /// `null` decodes as the type's default config.
    pub fn from_value(question_type: &QuestionType, value: Value) -> Result<Self, SchemaError> {
        let value = match value {
            Value::Null => Value::Object(Map::new()),
            other => other,
        };
        let invalid = |source| SchemaError::InvalidConfig {
            question_type: question_type.to_string(),
            source,
        };

        Ok(match question_type {
            QuestionType::MultipleChoice => {
                Self::MultipleChoice(serde_json::from_value(value).map_err(invalid)?)
            }
            QuestionType::TrueFalse => {
                Self::TrueFalse(serde_json::from_value(value).map_err(invalid)?)
            }
            QuestionType::TextInput => {
                Self::TextInput(serde_json::from_value(value).map_err(invalid)?)
            }
            QuestionType::YearRange => {
                Self::YearRange(serde_json::from_value(value).map_err(invalid)?)
            }
            QuestionType::NumericRange => {
                Self::NumericRange(serde_json::from_value(value).map_err(invalid)?)
            }
            QuestionType::Matching => {
                Self::Matching(serde_json::from_value(value).map_err(invalid)?)
            }
            QuestionType::FillBlank => {
                Self::FillBlank(serde_json::from_value(value).map_err(invalid)?)
            }
            QuestionType::MultiSelect => {
                Self::MultiSelect(serde_json::from_value(value).map_err(invalid)?)
            }
            QuestionType::Custom(_) => Self::Custom(match value {
                Value::Object(map) => map,
                _ => Map::new(),
            }),
        })
    }

    pub fn text_input(&self) -> Option<&TextInputConfig> {
        match self {
            Self::TextInput(config) => Some(config),
            _ => None,
        }
    }

    pub fn year_range(&self) -> Option<&YearRangeConfig> {
        match self {
            Self::YearRange(config) => Some(config),
            _ => None,
        }
    }

    pub fn numeric_range(&self) -> Option<&NumericRangeConfig> {
        match self {
            Self::NumericRange(config) => Some(config),
            _ => None,
        }
    }

    pub fn matching(&self) -> Option<&MatchingConfig> {
        match self {
            Self::Matching(config) => Some(config),
            _ => None,
        }
    }

    pub fn fill_blank(&self) -> Option<&FillBlankConfig> {
        match self {
            Self::FillBlank(config) => Some(config),
            _ => None,
        }
    }

    /// The option list, for the types that have one.
    pub fn options(&self) -> Option<&[String]> {
        match self {
            Self::MultipleChoice(config) => Some(&config.options),
            Self::MultiSelect(config) => Some(&config.options),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Answer keys
// ---------------------------------------------------------------------------

/// One tolerance tier: a difference within `tolerance` earns `credit_percent`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialCreditRange {
    pub tolerance: f64,
    /// Only consulted for numeric questions; absent means absolute.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tolerance_type: Option<ToleranceType>,
    pub credit_percent: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultipleChoiceAnswer {
    #[serde(default)]
    pub correct_index: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrueFalseAnswer {
    #[serde(default, alias = "isTrue", skip_serializing_if = "Option::is_none")]
    pub correct_value: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextInputAnswer {
    pub accepted_answers: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
    /// Minimum keyword hits for partial credit; defaults to half the keywords, rounded up.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword_match_threshold: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearRangeAnswer {
    #[serde(
        default,
        alias = "exactYear",
        alias = "year",
        skip_serializing_if = "Option::is_none"
    )]
    pub correct_year: Option<i64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub partial_credit_ranges: Vec<PartialCreditRange>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NumericRangeAnswer {
    #[serde(
        default,
        alias = "exactValue",
        alias = "value",
        skip_serializing_if = "Option::is_none"
    )]
    pub correct_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub partial_credit_ranges: Vec<PartialCreditRange>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchingAnswer {
    /// Left item to right item.
    #[serde(default)]
    pub correct_pairs: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partial_credit_per_pair: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FillBlankAnswer {
    /// Blank id to accepted answers.
    #[serde(default)]
    pub blanks: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiSelectAnswer {
    #[serde(default)]
    pub correct_indices: Vec<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partial_credit: Option<bool>,
}

/// The answer key for a question, one shape per question type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CorrectAnswerData {
    MultipleChoice(MultipleChoiceAnswer),
    TrueFalse(TrueFalseAnswer),
    TextInput(TextInputAnswer),
    YearRange(YearRangeAnswer),
    NumericRange(NumericRangeAnswer),
    Matching(MatchingAnswer),
    FillBlank(FillBlankAnswer),
    MultiSelect(MultiSelectAnswer),
    Custom(Map<String, Value>),
}

impl CorrectAnswerData {
    /// Decode a stored answer key for the given question type.
    ///
    /// `null`, and an empty object for custom types, decode as "no answer key".
    pub fn from_value(
        question_type: &QuestionType,
        value: Value,
    ) -> Result<Option<Self>, SchemaError> {
        if value.is_null() {
            return Ok(None);
        }
        let invalid = |source| SchemaError::InvalidAnswerKey {
            question_type: question_type.to_string(),
            source,
        };

        let data = match question_type {
            QuestionType::MultipleChoice => {
                Self::MultipleChoice(serde_json::from_value(value).map_err(invalid)?)
            }
            QuestionType::TrueFalse => {
                Self::TrueFalse(serde_json::from_value(value).map_err(invalid)?)
            }
            QuestionType::TextInput => {
                Self::TextInput(serde_json::from_value(value).map_err(invalid)?)
            }
            QuestionType::YearRange => {
                Self::YearRange(serde_json::from_value(value).map_err(invalid)?)
            }
            QuestionType::NumericRange => {
                Self::NumericRange(serde_json::from_value(value).map_err(invalid)?)
            }
            QuestionType::Matching => {
                Self::Matching(serde_json::from_value(value).map_err(invalid)?)
            }
            QuestionType::FillBlank => {
                Self::FillBlank(serde_json::from_value(value).map_err(invalid)?)
            }
            QuestionType::MultiSelect => {
                Self::MultiSelect(serde_json::from_value(value).map_err(invalid)?)
            }
            QuestionType::Custom(_) => match value {
                Value::Object(map) if !map.is_empty() => Self::Custom(map),
                _ => return Ok(None),
            },
        };
        Ok(Some(data))
    }
}

// ---------------------------------------------------------------------------
// Learner submissions
// ---------------------------------------------------------------------------

/// A submission in the current format, tagged with the question-type slug in `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum TypedAnswer {
    MultipleChoice {
        #[serde(deserialize_with = "whole_number")]
        selected_index: i64,
    },
    TrueFalse { selected_value: bool },
    TextInput { text: String },
    YearRange { year: f64 },
    NumericRange { value: f64 },
    Matching { pairs: BTreeMap<String, String> },
    FillBlank { blanks: BTreeMap<String, String> },
    MultiSelect {
        #[serde(deserialize_with = "whole_numbers")]
        selected_indices: Vec<i64>,
    },
    Custom { data: Value },
}

fn as_whole_number(value: f64) -> Option<i64> {
    (value.is_finite() && value.fract() == 0.0).then_some(value as i64)
}

/// An index sent as `1` or `1.0`.
fn whole_number<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    as_whole_number(value)
        .ok_or_else(|| de::Error::custom(format!("expected a whole number, found {value}")))
}

fn whole_numbers<'de, D>(deserializer: D) -> Result<Vec<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Vec::<f64>::deserialize(deserializer)?
        .into_iter()
        .map(|value| {
            as_whole_number(value)
                .ok_or_else(|| de::Error::custom(format!("expected a whole number, found {value}")))
        })
        .collect()
}

/// A learner's submitted answer.
///
/// Bare primitives are the legacy formats shipped before typed configs:
/// an option index or a number, a boolean, or free text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserAnswer {
    Typed(TypedAnswer),
    Number(f64),
    Boolean(bool),
    Text(String),
}

impl UserAnswer {
    /// Decode a raw JSON submission for a question of the given type.
    ///
    /// Objects without a `kind` tag get the question's own slug attached.
    /// `null` means no answer was given.
    pub fn from_submission(
        question_type: &QuestionType,
        value: Value,
    ) -> Result<Option<Self>, SchemaError> {
        let unsupported = |shape| SchemaError::UnsupportedShape {
            question_type: question_type.to_string(),
            shape,
        };

        match value {
            Value::Null => Ok(None),
            Value::Bool(b) => Ok(Some(UserAnswer::Boolean(b))),
            Value::Number(n) => n
                .as_f64()
                .map(|v| Some(UserAnswer::Number(v)))
                .ok_or_else(|| unsupported("number")),
            Value::String(s) => Ok(Some(UserAnswer::Text(s))),
            Value::Array(_) => Err(unsupported("array")),
            Value::Object(mut map) => {
                if !map.contains_key("kind") {
                    if question_type.is_custom() {
                        return Ok(Some(UserAnswer::Typed(TypedAnswer::Custom {
                            data: Value::Object(map),
                        })));
                    }
                    map.insert(
                        "kind".to_string(),
                        Value::String(question_type.as_str().to_string()),
                    );
                }
                serde_json::from_value(Value::Object(map))
                    .map(|answer| Some(UserAnswer::Typed(answer)))
                    .map_err(|source| SchemaError::MalformedAnswer {
                        question_type: question_type.to_string(),
                        source,
                    })
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Grading output
// ---------------------------------------------------------------------------

/// The verdict for one answer.
///
/// `credit_percent` is always within `[0, 100]`, and `is_correct` implies
/// full credit. Full credit does not imply `is_correct`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_correct: bool,
    pub credit_percent: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
}

impl ValidationResult {
    /// Fully correct, full credit.
    pub fn correct() -> Self {
        Self {
            is_correct: true,
            credit_percent: 100.0,
            feedback: None,
        }
    }

    /// Incorrect, no credit, no feedback.
    pub fn incorrect() -> Self {
        Self {
            is_correct: false,
            credit_percent: 0.0,
            feedback: None,
        }
    }

    /// Incorrect, no credit, with an explanation.
    pub fn rejected(feedback: impl Into<String>) -> Self {
        Self::incorrect().with_feedback(feedback)
    }

    /// Not correct, but earning some credit.
    pub fn partial(credit_percent: f64, feedback: impl Into<String>) -> Self {
        Self {
            is_correct: false,
            credit_percent,
            feedback: Some(feedback.into()),
        }
    }

    /// Binary verdict: full credit when correct, nothing otherwise.
    pub fn binary(is_correct: bool) -> Self {
        if is_correct {
            Self::correct()
        } else {
            Self::incorrect()
        }
    }

    pub fn with_feedback(mut self, feedback: impl Into<String>) -> Self {
        self.feedback = Some(feedback.into());
        self
    }

    /// Returns `true` if the credit lies strictly between 0 and 100.
    pub fn is_partial(&self) -> bool {
        self.credit_percent > 0.0 && self.credit_percent < 100.0
    }
}

// ---------------------------------------------------------------------------
// Question payloads
// ---------------------------------------------------------------------------

/// Loosely-typed authoring input, as it arrives from a form or an import.
///
/// Every field is optional and may hold any JSON shape; the normalizer
/// coerces what it can.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawQuestionInput {
    #[serde(default, alias = "question_type", skip_serializing_if = "Option::is_none")]
    pub question_type: Option<Value>,
    #[serde(default, alias = "question_config", skip_serializing_if = "Option::is_none")]
    pub question_config: Option<Value>,
    #[serde(
        default,
        alias = "correct_answer_data",
        skip_serializing_if = "Option::is_none"
    )]
    pub correct_answer_data: Option<Value>,
    /// Legacy flat option list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Value>,
    /// Legacy flat answer (an option index for multiple choice).
    #[serde(default, alias = "correct_answer", skip_serializing_if = "Option::is_none")]
    pub correct_answer: Option<Value>,
}

/// Canonical question data produced by the normalizer.
///
/// `options` and `correct_answer` are deprecated flat mirrors, filled only
/// for multiple choice and passed through for custom types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "StoredPayload")]
pub struct NormalizedQuestionPayload {
    pub question_type: QuestionType,
    pub question_config: QuestionConfig,
    pub correct_answer_data: Option<CorrectAnswerData>,
    pub options: Option<Vec<String>>,
    pub correct_answer: Option<f64>,
}

impl NormalizedQuestionPayload {
    /// Turn canonical data back into authoring input, e.g. for re-normalization.
    pub fn to_raw_input(&self) -> RawQuestionInput {
        RawQuestionInput {
            question_type: Some(Value::String(self.question_type.to_string())),
            question_config: serde_json::to_value(&self.question_config).ok(),
            correct_answer_data: self
                .correct_answer_data
                .as_ref()
                .and_then(|data| serde_json::to_value(data).ok()),
            options: self
                .options
                .as_ref()
                .and_then(|options| serde_json::to_value(options).ok()),
            correct_answer: self
                .correct_answer
                .and_then(|answer| serde_json::to_value(answer).ok()),
        }
    }
}

/// Persisted payload shape; the untagged parts are decoded with the type in hand.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredPayload {
    #[serde(default)]
    question_type: QuestionType,
    #[serde(default)]
    question_config: Value,
    #[serde(default)]
    correct_answer_data: Value,
    #[serde(default)]
    options: Option<Vec<String>>,
    #[serde(default)]
    correct_answer: Option<f64>,
}

impl TryFrom<StoredPayload> for NormalizedQuestionPayload {
    type Error = SchemaError;

    fn try_from(stored: StoredPayload) -> Result<Self, Self::Error> {
        let question_config =
            QuestionConfig::from_value(&stored.question_type, stored.question_config)?;
        let correct_answer_data =
            CorrectAnswerData::from_value(&stored.question_type, stored.correct_answer_data)?;
        Ok(Self {
            question_type: stored.question_type,
            question_config,
            correct_answer_data,
            options: stored.options,
            correct_answer: stored.correct_answer,
        })
    }
}

/// A persisted question row: canonical payload plus identity and weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredQuestion {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<f64>,
    #[serde(flatten)]
    pub payload: NormalizedQuestionPayload,
}
