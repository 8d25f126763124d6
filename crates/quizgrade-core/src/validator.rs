//! Answer grading.
//!
//! [`validate_answer`] grades one submission against a canonical answer key
//! and never fails: every problem is reported as a zero-credit
//! [`ValidationResult`] with feedback.

use std::borrow::Cow;
use std::collections::BTreeSet;

use crate::model::{
    CorrectAnswerData, FillBlankAnswer, FillBlankConfig, MatchingAnswer, MatchingConfig,
    MultiSelectAnswer, MultipleChoiceAnswer, NumericRangeAnswer, NumericRangeConfig,
    PartialCreditRange, QuestionConfig, QuestionType, TextInputAnswer, TextInputConfig,
    ToleranceType, TrueFalseAnswer, TypedAnswer, UserAnswer, ValidationResult, YearRangeAnswer,
    YearRangeConfig,
};

pub const NO_ANSWER_PROVIDED: &str = "No answer provided";
pub const NO_CORRECT_ANSWER: &str = "No correct answer configured";
pub const INVALID_ANSWER_FORMAT: &str = "Invalid answer format";
pub const UNKNOWN_QUESTION_TYPE: &str = "Unknown question type";
pub const ANSWER_KEY_MISMATCH: &str = "Answer key does not match question type";

/// Largest credit a keyword-only text answer can earn.
const KEYWORD_CREDIT_CAP: f64 = 75.0;

/// Differences below this count as an exact numeric match.
const NUMERIC_EPSILON: f64 = 0.0001;

/// Grade a submission.
///
/// With `partial_credit_enabled` off, any credit strictly between 0 and 100
/// is dropped to 0 while `is_correct` is left alone.
pub fn validate_answer(
    question_type: &QuestionType,
    user_answer: Option<&UserAnswer>,
    correct_answer_data: Option<&CorrectAnswerData>,
    config: &QuestionConfig,
    partial_credit_enabled: bool,
) -> ValidationResult {
    let Some(user_answer) = user_answer else {
        return ValidationResult::rejected(NO_ANSWER_PROVIDED);
    };
    let Some(answer_key) = correct_answer_data else {
        return ValidationResult::rejected(NO_CORRECT_ANSWER);
    };

    let result = match (question_type, answer_key) {
        (QuestionType::MultipleChoice, CorrectAnswerData::MultipleChoice(key)) => {
            validate_multiple_choice(user_answer, key)
        }
        (QuestionType::TrueFalse, CorrectAnswerData::TrueFalse(key)) => {
            validate_true_false(user_answer, key)
        }
        (QuestionType::TextInput, CorrectAnswerData::TextInput(key)) => {
            let config: Cow<'_, TextInputConfig> =
                config.text_input().map(Cow::Borrowed).unwrap_or_default();
            validate_text_input(user_answer, key, &config)
        }
        (QuestionType::YearRange, CorrectAnswerData::YearRange(key)) => {
            let config: Cow<'_, YearRangeConfig> =
                config.year_range().map(Cow::Borrowed).unwrap_or_default();
            validate_year_range(user_answer, key, &config)
        }
        (QuestionType::NumericRange, CorrectAnswerData::NumericRange(key)) => {
            let config: Cow<'_, NumericRangeConfig> =
                config.numeric_range().map(Cow::Borrowed).unwrap_or_default();
            validate_numeric_range(user_answer, key, &config)
        }
        (QuestionType::Matching, CorrectAnswerData::Matching(key)) => {
            let config: Cow<'_, MatchingConfig> =
                config.matching().map(Cow::Borrowed).unwrap_or_default();
            validate_matching(user_answer, key, &config)
        }
        (QuestionType::FillBlank, CorrectAnswerData::FillBlank(key)) => {
            let config: Cow<'_, FillBlankConfig> =
                config.fill_blank().map(Cow::Borrowed).unwrap_or_default();
            validate_fill_blank(user_answer, key, &config)
        }
        (QuestionType::MultiSelect, CorrectAnswerData::MultiSelect(key)) => {
            validate_multi_select(user_answer, key)
        }
        (QuestionType::Custom(slug), _) => {
            tracing::debug!(question_type = %slug, "no grader for custom question type");
            ValidationResult::rejected(UNKNOWN_QUESTION_TYPE)
        }
        (question_type, _) => {
            tracing::warn!(%question_type, "answer key shape does not match question type");
            ValidationResult::rejected(ANSWER_KEY_MISMATCH)
        }
    };

    apply_credit_policy(result, partial_credit_enabled)
}

/// Grade a pre-migration question that only stores a flat numeric answer.
pub fn validate_legacy_answer(user_answer: Option<f64>, correct_answer: f64) -> ValidationResult {
    match user_answer {
        None => ValidationResult::rejected(NO_ANSWER_PROVIDED),
        Some(answer) => ValidationResult::binary(answer == correct_answer),
    }
}

fn apply_credit_policy(
    mut result: ValidationResult,
    partial_credit_enabled: bool,
) -> ValidationResult {
    result.credit_percent = if result.credit_percent.is_nan() {
        0.0
    } else {
        result.credit_percent.clamp(0.0, 100.0)
    };
    if !partial_credit_enabled && result.is_partial() {
        result.credit_percent = 0.0;
    }
    result
}

// ---------------------------------------------------------------------------
// Per-type graders
// ---------------------------------------------------------------------------

fn validate_multiple_choice(answer: &UserAnswer, key: &MultipleChoiceAnswer) -> ValidationResult {
    let selected = match answer {
        UserAnswer::Number(n) => *n,
        UserAnswer::Typed(TypedAnswer::MultipleChoice { selected_index }) => *selected_index as f64,
        _ => return ValidationResult::rejected(INVALID_ANSWER_FORMAT),
    };
    ValidationResult::binary(selected == key.correct_index as f64)
}

fn validate_true_false(answer: &UserAnswer, key: &TrueFalseAnswer) -> ValidationResult {
    let selected = match answer {
        UserAnswer::Boolean(b) => *b,
        UserAnswer::Typed(TypedAnswer::TrueFalse { selected_value }) => *selected_value,
        _ => return ValidationResult::rejected(INVALID_ANSWER_FORMAT),
    };
    ValidationResult::binary(selected == key.correct_value.unwrap_or(false))
}

fn validate_text_input(
    answer: &UserAnswer,
    key: &TextInputAnswer,
    config: &TextInputConfig,
) -> ValidationResult {
    let text = match answer {
        UserAnswer::Text(text) => text.as_str(),
        UserAnswer::Typed(TypedAnswer::TextInput { text }) => text.as_str(),
        _ => return ValidationResult::rejected(INVALID_ANSWER_FORMAT),
    };

    let normalize = |value: &str| {
        let value = if config.trim_whitespace { value.trim() } else { value };
        if config.case_sensitive {
            value.to_string()
        } else {
            value.to_lowercase()
        }
    };
    let text = normalize(text);

    if key.accepted_answers.iter().any(|accepted| normalize(accepted) == text) {
        return ValidationResult::correct();
    }

    let keywords: Vec<String> = key
        .keywords
        .iter()
        .map(|keyword| normalize(keyword))
        .filter(|keyword| !keyword.is_empty())
        .collect();
    if keywords.is_empty() {
        return ValidationResult::incorrect();
    }

    let total = keywords.len();
    let matched = keywords
        .iter()
        .filter(|keyword| text.contains(keyword.as_str()))
        .count();
    let threshold = key
        .keyword_match_threshold
        .filter(|&threshold| threshold > 0)
        .map_or_else(|| total.div_ceil(2), |threshold| threshold as usize);

    if matched >= threshold {
        let credit = (matched as f64 / total as f64 * 100.0).min(KEYWORD_CREDIT_CAP);
        return ValidationResult::partial(
            credit,
            format!("Partial credit: matched {matched} of {total} key concepts"),
        );
    }

    ValidationResult::incorrect()
}

/// Tiers in ascending tolerance order; the tightest match wins.
fn sorted_ranges(ranges: &[PartialCreditRange]) -> Vec<&PartialCreditRange> {
    let mut sorted: Vec<&PartialCreditRange> = ranges.iter().collect();
    sorted.sort_by(|a, b| a.tolerance.total_cmp(&b.tolerance));
    sorted
}

/// Credit that decays linearly from 100 to 50 across the tolerance.
fn linear_decay(difference: f64, tolerance: f64) -> f64 {
    (100.0 - (difference / tolerance) * 50.0).max(0.0)
}

fn off_by_years(difference: f64) -> String {
    let plural = if difference > 1.0 { "s" } else { "" };
    format!("Off by {difference} year{plural}")
}

fn validate_year_range(
    answer: &UserAnswer,
    key: &YearRangeAnswer,
    config: &YearRangeConfig,
) -> ValidationResult {
    let year = match answer {
        UserAnswer::Number(n) => *n,
        UserAnswer::Typed(TypedAnswer::YearRange { year }) => *year,
        _ => return ValidationResult::rejected(INVALID_ANSWER_FORMAT),
    };

    if let Some(min_year) = config.min_year {
        if year < min_year as f64 {
            return ValidationResult::rejected(format!("Year must be at least {min_year}"));
        }
    }
    if let Some(max_year) = config.max_year {
        if year > max_year as f64 {
            return ValidationResult::rejected(format!("Year must be at most {max_year}"));
        }
    }

    let Some(expected) = key.correct_year else {
        return ValidationResult::rejected("No correct year configured");
    };

    let difference = (year - expected as f64).abs();
    if difference == 0.0 {
        return ValidationResult::correct();
    }

    if let Some(range) = sorted_ranges(&key.partial_credit_ranges)
        .into_iter()
        .find(|range| difference <= range.tolerance)
    {
        return ValidationResult::partial(range.credit_percent, off_by_years(difference));
    }

    let tolerance = config.tolerance.unwrap_or(0) as f64;
    if tolerance > 0.0 && difference <= tolerance {
        return ValidationResult::partial(
            linear_decay(difference, tolerance),
            off_by_years(difference),
        );
    }

    ValidationResult::rejected(format!("The correct year was {expected}"))
}

fn validate_numeric_range(
    answer: &UserAnswer,
    key: &NumericRangeAnswer,
    config: &NumericRangeConfig,
) -> ValidationResult {
    let value = match answer {
        UserAnswer::Number(n) => *n,
        UserAnswer::Typed(TypedAnswer::NumericRange { value }) => *value,
        _ => return ValidationResult::rejected(INVALID_ANSWER_FORMAT),
    };

    if let Some(min) = config.min {
        if value < min {
            return ValidationResult::rejected(format!("Value must be at least {min}"));
        }
    }
    if let Some(max) = config.max {
        if value > max {
            return ValidationResult::rejected(format!("Value must be at most {max}"));
        }
    }

    let Some(expected) = key.correct_value else {
        return ValidationResult::rejected("No correct value configured");
    };

    let difference = (value - expected).abs();
    if difference < NUMERIC_EPSILON {
        return ValidationResult::correct();
    }

    let close = || format!("Close! Off by {difference:.2}");

    if let Some(range) = sorted_ranges(&key.partial_credit_ranges)
        .into_iter()
        .find(|range| {
            let allowed = range
                .tolerance_type
                .unwrap_or_default()
                .resolve(range.tolerance, expected);
            difference <= allowed
        })
    {
        return ValidationResult::partial(range.credit_percent, close());
    }

    let tolerance = config.tolerance.unwrap_or(0.0);
    if tolerance > 0.0 {
        let allowed = config.tolerance_type.resolve(tolerance, expected);
        if difference <= allowed {
            return ValidationResult::partial(linear_decay(difference, allowed), close());
        }
    }

    let unit = config
        .unit
        .as_deref()
        .filter(|unit| !unit.is_empty())
        .map(|unit| format!(" {unit}"))
        .unwrap_or_default();
    ValidationResult::rejected(format!("The correct answer was {expected}{unit}"))
}

fn validate_matching(
    answer: &UserAnswer,
    key: &MatchingAnswer,
    config: &MatchingConfig,
) -> ValidationResult {
    let UserAnswer::Typed(TypedAnswer::Matching { pairs }) = answer else {
        return ValidationResult::rejected(INVALID_ANSWER_FORMAT);
    };

    let total = if config.left_column.is_empty() {
        key.correct_pairs.len()
    } else {
        config.left_column.len()
    };
    if total == 0 {
        return ValidationResult::rejected("No matching pairs configured");
    }

    let correct = pairs
        .iter()
        .filter(|(left, right)| key.correct_pairs.get(*left) == Some(*right))
        .count();

    if correct == total {
        return ValidationResult::correct();
    }

    let feedback = format!("{correct} of {total} pairs correct");
    if key.partial_credit_per_pair != Some(false) && correct > 0 {
        ValidationResult::partial(correct as f64 / total as f64 * 100.0, feedback)
    } else {
        ValidationResult::rejected(feedback)
    }
}

fn validate_fill_blank(
    answer: &UserAnswer,
    key: &FillBlankAnswer,
    config: &FillBlankConfig,
) -> ValidationResult {
    let UserAnswer::Typed(TypedAnswer::FillBlank { blanks }) = answer else {
        return ValidationResult::rejected(INVALID_ANSWER_FORMAT);
    };

    let total = key.blanks.len();
    if total == 0 {
        return ValidationResult::rejected("No blanks configured");
    }

    let normalize = |value: &str| {
        let value = value.trim();
        if config.case_sensitive {
            value.to_string()
        } else {
            value.to_lowercase()
        }
    };

    let correct = key
        .blanks
        .iter()
        .filter(|(id, accepted)| {
            let Some(given) = blanks.get(*id).filter(|given| !given.is_empty()) else {
                return false;
            };
            let given = normalize(given);
            accepted
                .iter()
                .map(|candidate| candidate.trim())
                .filter(|candidate| !candidate.is_empty())
                .any(|candidate| normalize(candidate) == given)
        })
        .count();

    if correct == total {
        ValidationResult::correct()
    } else if correct > 0 {
        ValidationResult::partial(
            correct as f64 / total as f64 * 100.0,
            format!("{correct} of {total} blanks correct"),
        )
    } else {
        ValidationResult::incorrect()
    }
}

fn validate_multi_select(answer: &UserAnswer, key: &MultiSelectAnswer) -> ValidationResult {
    let UserAnswer::Typed(TypedAnswer::MultiSelect { selected_indices }) = answer else {
        return ValidationResult::rejected(INVALID_ANSWER_FORMAT);
    };

    let selected: BTreeSet<i64> = selected_indices.iter().copied().collect();
    let expected: BTreeSet<i64> = key.correct_indices.iter().copied().collect();

    let correct = selected.intersection(&expected).count();
    let incorrect = selected.difference(&expected).count();
    let missed = expected.difference(&selected).count();

    if incorrect == 0 && missed == 0 {
        return ValidationResult::correct();
    }

    if key.partial_credit == Some(false) {
        return ValidationResult::rejected(format!(
            "Selected {correct} of {} correct options",
            expected.len()
        ));
    }

    let credit = if expected.is_empty() {
        0.0
    } else {
        let penalties = (incorrect + missed) as f64 * 0.5;
        ((correct as f64 - penalties) / expected.len() as f64 * 100.0).max(0.0)
    };
    ValidationResult::partial(
        credit,
        format!("{correct} correct, {incorrect} incorrect, {missed} missed"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MultipleChoiceConfig, MultiSelectConfig};
    use std::collections::BTreeMap;

    fn grade(
        question_type: QuestionType,
        answer: UserAnswer,
        key: CorrectAnswerData,
        config: QuestionConfig,
    ) -> ValidationResult {
        validate_answer(&question_type, Some(&answer), Some(&key), &config, true)
    }

    fn year_key(correct_year: i64) -> CorrectAnswerData {
        CorrectAnswerData::YearRange(YearRangeAnswer {
            correct_year: Some(correct_year),
            partial_credit_ranges: vec![],
        })
    }

    fn year_config(tolerance: Option<i64>) -> QuestionConfig {
        QuestionConfig::YearRange(YearRangeConfig {
            tolerance,
            ..Default::default()
        })
    }

    fn numeric_key(value: f64) -> CorrectAnswerData {
        CorrectAnswerData::NumericRange(NumericRangeAnswer {
            correct_value: Some(value),
            partial_credit_ranges: vec![],
        })
    }

    fn keyword_key() -> CorrectAnswerData {
        CorrectAnswerData::TextInput(TextInputAnswer {
            accepted_answers: vec!["The mitochondria produces energy".into()],
            keywords: vec![
                "mitochondria".into(),
                "energy".into(),
                "atp".into(),
                "cell".into(),
                "respiration".into(),
            ],
            keyword_match_threshold: None,
        })
    }

    fn pairs(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
        entries
            .iter()
            .map(|(l, r)| (l.to_string(), r.to_string()))
            .collect()
    }

    #[test]
    fn missing_answer_and_key() {
        let config = QuestionConfig::MultipleChoice(MultipleChoiceConfig::default());
        let key = CorrectAnswerData::MultipleChoice(MultipleChoiceAnswer { correct_index: 0 });
        let result = validate_answer(
            &QuestionType::MultipleChoice,
            None,
            Some(&key),
            &config,
            true,
        );
        assert_eq!(result, ValidationResult::rejected(NO_ANSWER_PROVIDED));

        let answer = UserAnswer::Number(0.0);
        let result = validate_answer(
            &QuestionType::MultipleChoice,
            Some(&answer),
            None,
            &config,
            true,
        );
        assert_eq!(result, ValidationResult::rejected(NO_CORRECT_ANSWER));
    }

    #[test]
    fn multiple_choice_typed_and_legacy() {
        let config = QuestionConfig::MultipleChoice(MultipleChoiceConfig {
            options: vec!["Paris".into(), "London".into(), "Berlin".into()],
            shuffle_options: false,
        });
        let key = CorrectAnswerData::MultipleChoice(MultipleChoiceAnswer { correct_index: 0 });

        let right = grade(
            QuestionType::MultipleChoice,
            UserAnswer::Typed(TypedAnswer::MultipleChoice { selected_index: 0 }),
            key.clone(),
            config.clone(),
        );
        assert!(right.is_correct);
        assert_eq!(right.credit_percent, 100.0);

        let wrong = grade(
            QuestionType::MultipleChoice,
            UserAnswer::Typed(TypedAnswer::MultipleChoice { selected_index: 1 }),
            key.clone(),
            config.clone(),
        );
        assert_eq!(wrong, ValidationResult::incorrect());

        let legacy = grade(
            QuestionType::MultipleChoice,
            UserAnswer::Number(0.0),
            key.clone(),
            config.clone(),
        );
        assert!(legacy.is_correct);

        let bad = grade(
            QuestionType::MultipleChoice,
            UserAnswer::Text("Paris".into()),
            key,
            config,
        );
        assert_eq!(bad, ValidationResult::rejected(INVALID_ANSWER_FORMAT));
    }

    #[test]
    fn true_false_defaults_expected_to_false() {
        let config = QuestionConfig::TrueFalse(Default::default());
        let unset = CorrectAnswerData::TrueFalse(TrueFalseAnswer { correct_value: None });
        assert!(grade(
            QuestionType::TrueFalse,
            UserAnswer::Boolean(false),
            unset.clone(),
            config.clone(),
        )
        .is_correct);
        assert!(!grade(
            QuestionType::TrueFalse,
            UserAnswer::Typed(TypedAnswer::TrueFalse { selected_value: true }),
            unset,
            config,
        )
        .is_correct);
    }

    #[test]
    fn text_input_exact_match_respects_config() {
        let key = CorrectAnswerData::TextInput(TextInputAnswer {
            accepted_answers: vec!["Paris".into()],
            ..Default::default()
        });
        let relaxed = QuestionConfig::TextInput(TextInputConfig::default());
        assert!(grade(
            QuestionType::TextInput,
            UserAnswer::Text("  paris ".into()),
            key.clone(),
            relaxed,
        )
        .is_correct);

        let strict = QuestionConfig::TextInput(TextInputConfig {
            case_sensitive: true,
            trim_whitespace: false,
            ..Default::default()
        });
        let result = grade(
            QuestionType::TextInput,
            UserAnswer::Text("Paris ".into()),
            key.clone(),
            strict.clone(),
        );
        assert_eq!(result, ValidationResult::incorrect());
        assert!(grade(
            QuestionType::TextInput,
            UserAnswer::Typed(TypedAnswer::TextInput { text: "Paris".into() }),
            key,
            strict,
        )
        .is_correct);
    }

    #[test]
    fn text_input_keyword_partial_credit() {
        let config = QuestionConfig::TextInput(TextInputConfig::default());
        let answer = UserAnswer::Text("Cell respiration makes ATP".into());

        let result = grade(QuestionType::TextInput, answer.clone(), keyword_key(), config.clone());
        assert!(!result.is_correct);
        assert_eq!(result.credit_percent, 60.0);
        assert_eq!(
            result.feedback.as_deref(),
            Some("Partial credit: matched 3 of 5 key concepts")
        );

        let disabled = validate_answer(
            &QuestionType::TextInput,
            Some(&answer),
            Some(&keyword_key()),
            &config,
            false,
        );
        assert!(!disabled.is_correct);
        assert_eq!(disabled.credit_percent, 0.0);
    }

    #[test]
    fn text_input_keyword_credit_is_capped() {
        let config = QuestionConfig::TextInput(TextInputConfig::default());
        let answer = UserAnswer::Text("mitochondria energy atp cell respiration".into());
        let result = grade(QuestionType::TextInput, answer, keyword_key(), config);
        assert_eq!(result.credit_percent, KEYWORD_CREDIT_CAP);
        assert!(!result.is_correct);
    }

    #[test]
    fn text_input_below_keyword_threshold() {
        let config = QuestionConfig::TextInput(TextInputConfig::default());
        let answer = UserAnswer::Text("energy".into());
        assert_eq!(
            grade(QuestionType::TextInput, answer, keyword_key(), config),
            ValidationResult::incorrect()
        );
    }

    #[test]
    fn text_input_ignores_blank_keywords() {
        let config = QuestionConfig::TextInput(TextInputConfig::default());
        let key = CorrectAnswerData::TextInput(TextInputAnswer {
            accepted_answers: vec![],
            keywords: vec!["light".into(), "".into(), "  ".into(), "oxygen".into()],
            keyword_match_threshold: None,
        });
        let answer = UserAnswer::Text("light".into());
        let result = grade(QuestionType::TextInput, answer, key, config);
        assert_eq!(result.credit_percent, 50.0);
        assert_eq!(
            result.feedback.as_deref(),
            Some("Partial credit: matched 1 of 2 key concepts")
        );
    }

    #[test]
    fn year_range_linear_decay() {
        let result = grade(
            QuestionType::YearRange,
            UserAnswer::Typed(TypedAnswer::YearRange { year: 1993.0 }),
            year_key(1990),
            year_config(Some(5)),
        );
        assert!(!result.is_correct);
        assert_eq!(result.credit_percent, 70.0);
        assert_eq!(result.feedback.as_deref(), Some("Off by 3 years"));

        let one_off = grade(
            QuestionType::YearRange,
            UserAnswer::Number(1991.0),
            year_key(1990),
            year_config(Some(5)),
        );
        assert_eq!(one_off.feedback.as_deref(), Some("Off by 1 year"));
    }

    #[test]
    fn year_range_bounds_and_reveal() {
        let config = QuestionConfig::YearRange(YearRangeConfig {
            min_year: Some(1900),
            max_year: Some(2000),
            ..Default::default()
        });
        let early = grade(
            QuestionType::YearRange,
            UserAnswer::Number(1850.0),
            year_key(1990),
            config.clone(),
        );
        assert_eq!(early, ValidationResult::rejected("Year must be at least 1900"));

        let late = grade(
            QuestionType::YearRange,
            UserAnswer::Number(2010.0),
            year_key(1990),
            config.clone(),
        );
        assert_eq!(late, ValidationResult::rejected("Year must be at most 2000"));

        let far = grade(
            QuestionType::YearRange,
            UserAnswer::Number(1950.0),
            year_key(1990),
            config,
        );
        assert_eq!(far, ValidationResult::rejected("The correct year was 1990"));
    }

    #[test]
    fn year_range_tightest_tier_wins() {
        let key = CorrectAnswerData::YearRange(YearRangeAnswer {
            correct_year: Some(1815),
            partial_credit_ranges: vec![
                PartialCreditRange {
                    tolerance: 10.0,
                    tolerance_type: None,
                    credit_percent: 25.0,
                },
                PartialCreditRange {
                    tolerance: 2.0,
                    tolerance_type: None,
                    credit_percent: 80.0,
                },
            ],
        });
        let near = grade(
            QuestionType::YearRange,
            UserAnswer::Number(1817.0),
            key.clone(),
            year_config(None),
        );
        assert_eq!(near.credit_percent, 80.0);
        let far = grade(
            QuestionType::YearRange,
            UserAnswer::Number(1808.0),
            key,
            year_config(None),
        );
        assert_eq!(far.credit_percent, 25.0);
    }

    #[test]
    fn numeric_range_percentage_tolerance() {
        let config = QuestionConfig::NumericRange(NumericRangeConfig {
            tolerance: Some(10.0),
            tolerance_type: ToleranceType::Percentage,
            ..Default::default()
        });
        let result = grade(
            QuestionType::NumericRange,
            UserAnswer::Typed(TypedAnswer::NumericRange { value: 215.0 }),
            numeric_key(200.0),
            config,
        );
        assert!(!result.is_correct);
        assert_eq!(result.credit_percent, 62.5);
        assert_eq!(result.feedback.as_deref(), Some("Close! Off by 15.00"));
    }

    #[test]
    fn numeric_range_bounds() {
        let config = QuestionConfig::NumericRange(NumericRangeConfig {
            min: Some(0.0),
            max: Some(100.0),
            tolerance: Some(50.0),
            ..Default::default()
        });

        let below = grade(
            QuestionType::NumericRange,
            UserAnswer::Number(-1.0),
            numeric_key(20.0),
            config.clone(),
        );
        assert!(!below.is_correct);
        assert_eq!(below.credit_percent, 0.0);
        assert_eq!(below.feedback.as_deref(), Some("Value must be at least 0"));

        let above = grade(
            QuestionType::NumericRange,
            UserAnswer::Number(100.5),
            numeric_key(20.0),
            config.clone(),
        );
        assert_eq!(above.credit_percent, 0.0);
        assert_eq!(above.feedback.as_deref(), Some("Value must be at most 100"));

        let inside = grade(
            QuestionType::NumericRange,
            UserAnswer::Number(100.0),
            numeric_key(100.0),
            config,
        );
        assert!(inside.is_correct);
    }

    #[test]
    fn numeric_range_exact_within_epsilon() {
        let config = QuestionConfig::NumericRange(NumericRangeConfig::default());
        let result = grade(
            QuestionType::NumericRange,
            UserAnswer::Number(9.81004),
            numeric_key(9.81),
            config,
        );
        assert!(result.is_correct);
    }

    #[test]
    fn numeric_range_reveals_answer_with_unit() {
        let config = QuestionConfig::NumericRange(NumericRangeConfig {
            tolerance: Some(1.0),
            unit: Some("km".into()),
            ..Default::default()
        });
        let result = grade(
            QuestionType::NumericRange,
            UserAnswer::Number(50.0),
            numeric_key(42.0),
            config,
        );
        assert_eq!(result, ValidationResult::rejected("The correct answer was 42 km"));
    }

    #[test]
    fn numeric_range_percentage_tier() {
        let key = CorrectAnswerData::NumericRange(NumericRangeAnswer {
            correct_value: Some(1000.0),
            partial_credit_ranges: vec![PartialCreditRange {
                tolerance: 5.0,
                tolerance_type: Some(ToleranceType::Percentage),
                credit_percent: 40.0,
            }],
        });
        let config = QuestionConfig::NumericRange(NumericRangeConfig::default());
        let result = grade(QuestionType::NumericRange, UserAnswer::Number(1040.0), key, config);
        assert_eq!(result.credit_percent, 40.0);
    }

    #[test]
    fn matching_partial_and_disabled() {
        let config = QuestionConfig::Matching(MatchingConfig {
            left_column: vec!["A".into(), "B".into(), "C".into(), "D".into()],
            right_column: vec!["1".into(), "2".into(), "3".into(), "4".into()],
            ..Default::default()
        });
        let mut key = MatchingAnswer {
            correct_pairs: pairs(&[("A", "1"), ("B", "2"), ("C", "3"), ("D", "4")]),
            partial_credit_per_pair: None,
        };
        let answer = UserAnswer::Typed(TypedAnswer::Matching {
            pairs: pairs(&[("A", "1"), ("B", "3"), ("C", "2")]),
        });

        let result = grade(
            QuestionType::Matching,
            answer.clone(),
            CorrectAnswerData::Matching(key.clone()),
            config.clone(),
        );
        assert_eq!(result.credit_percent, 25.0);
        assert_eq!(result.feedback.as_deref(), Some("1 of 4 pairs correct"));

        key.partial_credit_per_pair = Some(false);
        let result = grade(
            QuestionType::Matching,
            answer,
            CorrectAnswerData::Matching(key),
            config,
        );
        assert_eq!(result, ValidationResult::rejected("1 of 4 pairs correct"));
    }

    #[test]
    fn matching_without_pairs() {
        let key = CorrectAnswerData::Matching(MatchingAnswer::default());
        let answer = UserAnswer::Typed(TypedAnswer::Matching { pairs: BTreeMap::new() });
        let result = grade(
            QuestionType::Matching,
            answer,
            key,
            QuestionConfig::Matching(MatchingConfig::default()),
        );
        assert_eq!(result, ValidationResult::rejected("No matching pairs configured"));
    }

    #[test]
    fn fill_blank_proportional_credit() {
        let key = CorrectAnswerData::FillBlank(FillBlankAnswer {
            blanks: [
                ("noun".to_string(), vec!["sky".to_string()]),
                ("color".to_string(), vec!["blue".to_string(), " azure ".to_string()]),
            ]
            .into_iter()
            .collect(),
        });
        let config = QuestionConfig::FillBlank(FillBlankConfig::default());

        let all = UserAnswer::Typed(TypedAnswer::FillBlank {
            blanks: pairs(&[("noun", " Sky"), ("color", "AZURE")]),
        });
        assert!(grade(QuestionType::FillBlank, all, key.clone(), config.clone()).is_correct);

        let half = UserAnswer::Typed(TypedAnswer::FillBlank {
            blanks: pairs(&[("noun", "sky"), ("color", "")]),
        });
        let result = grade(QuestionType::FillBlank, half, key, config);
        assert_eq!(result.credit_percent, 50.0);
        assert_eq!(result.feedback.as_deref(), Some("1 of 2 blanks correct"));
    }

    #[test]
    fn multi_select_penalizes_extra_selection() {
        let key = CorrectAnswerData::MultiSelect(MultiSelectAnswer {
            correct_indices: vec![0, 2],
            partial_credit: None,
        });
        let config = QuestionConfig::MultiSelect(MultiSelectConfig::default());
        let result = grade(
            QuestionType::MultiSelect,
            UserAnswer::Typed(TypedAnswer::MultiSelect { selected_indices: vec![0, 1, 2] }),
            key.clone(),
            config.clone(),
        );
        assert!(!result.is_correct);
        assert_eq!(result.credit_percent, 75.0);
        assert_eq!(result.feedback.as_deref(), Some("2 correct, 1 incorrect, 0 missed"));

        let exact = grade(
            QuestionType::MultiSelect,
            UserAnswer::Typed(TypedAnswer::MultiSelect { selected_indices: vec![2, 0, 2] }),
            key,
            config,
        );
        assert!(exact.is_correct);
    }

    #[test]
    fn multi_select_without_partial_credit() {
        let key = CorrectAnswerData::MultiSelect(MultiSelectAnswer {
            correct_indices: vec![0, 2],
            partial_credit: Some(false),
        });
        let result = grade(
            QuestionType::MultiSelect,
            UserAnswer::Typed(TypedAnswer::MultiSelect { selected_indices: vec![0] }),
            key,
            QuestionConfig::MultiSelect(MultiSelectConfig::default()),
        );
        assert_eq!(result, ValidationResult::rejected("Selected 1 of 2 correct options"));
    }

    #[test]
    fn custom_and_mismatched_types_get_zero() {
        let custom = QuestionType::Custom("essay".into());
        let key = CorrectAnswerData::Custom(Default::default());
        let result = grade(
            custom,
            UserAnswer::Text("anything".into()),
            key,
            QuestionConfig::Custom(Default::default()),
        );
        assert_eq!(result, ValidationResult::rejected(UNKNOWN_QUESTION_TYPE));

        let result = grade(
            QuestionType::YearRange,
            UserAnswer::Number(1990.0),
            numeric_key(1990.0),
            year_config(None),
        );
        assert_eq!(result, ValidationResult::rejected(ANSWER_KEY_MISMATCH));
    }

    #[test]
    fn credit_stays_in_bounds_and_correct_means_full() {
        let cases = vec![
            grade(
                QuestionType::YearRange,
                UserAnswer::Number(1994.9),
                year_key(1990),
                year_config(Some(5)),
            ),
            grade(
                QuestionType::YearRange,
                UserAnswer::Number(f64::NAN),
                year_key(1990),
                year_config(Some(5)),
            ),
            grade(
                QuestionType::NumericRange,
                UserAnswer::Number(-1e300),
                numeric_key(0.0),
                QuestionConfig::NumericRange(NumericRangeConfig::default()),
            ),
            grade(
                QuestionType::MultiSelect,
                UserAnswer::Typed(TypedAnswer::MultiSelect { selected_indices: vec![3, 4, 5] }),
                CorrectAnswerData::MultiSelect(MultiSelectAnswer {
                    correct_indices: vec![0],
                    partial_credit: None,
                }),
                QuestionConfig::MultiSelect(MultiSelectConfig::default()),
            ),
            grade(
                QuestionType::MultiSelect,
                UserAnswer::Typed(TypedAnswer::MultiSelect { selected_indices: vec![1] }),
                CorrectAnswerData::MultiSelect(MultiSelectAnswer {
                    correct_indices: vec![],
                    partial_credit: None,
                }),
                QuestionConfig::MultiSelect(MultiSelectConfig::default()),
            ),
            grade(
                QuestionType::TextInput,
                UserAnswer::Text("cell energy".into()),
                keyword_key(),
                QuestionConfig::TextInput(TextInputConfig::default()),
            ),
        ];
        for result in cases {
            assert!((0.0..=100.0).contains(&result.credit_percent), "{result:?}");
            if result.is_correct {
                assert_eq!(result.credit_percent, 100.0);
            }
        }
    }

    #[test]
    fn legacy_answers() {
        assert_eq!(
            validate_legacy_answer(None, 1.0),
            ValidationResult::rejected(NO_ANSWER_PROVIDED)
        );
        assert!(validate_legacy_answer(Some(1.0), 1.0).is_correct);
        assert_eq!(validate_legacy_answer(Some(2.0), 1.0), ValidationResult::incorrect());
    }
}
