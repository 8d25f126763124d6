//! Grading of stored question rows against raw JSON submissions.
//!
//! Bridges the serialization boundary: decodes each submission with the
//! question's type in hand, routes pre-migration rows to the legacy grader and
//! scales the verdict by the question's point value.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::{QuestionType, StoredQuestion, TypedAnswer, UserAnswer, ValidationResult};
use crate::validator::{validate_answer, validate_legacy_answer, INVALID_ANSWER_FORMAT};

/// Points a question is worth when none (or a non-positive value) is stored.
pub const DEFAULT_POINTS: f64 = 1.0;

/// The graded outcome of one question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionOutcome {
    pub question_id: String,
    pub question_type: QuestionType,
    pub is_correct: bool,
    pub credit_percent: f64,
    pub points_earned: f64,
    pub points_possible: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
}

impl QuestionOutcome {
    fn new(question: &StoredQuestion, points_possible: f64, result: ValidationResult) -> Self {
        let question_type = if is_legacy_row(question) {
            QuestionType::MultipleChoice
        } else {
            question.payload.question_type.clone()
        };
        Self {
            question_id: question.id.clone(),
            question_type,
            is_correct: result.is_correct,
            credit_percent: result.credit_percent,
            points_earned: points_possible * result.credit_percent / 100.0,
            points_possible,
            feedback: result.feedback,
        }
    }
}

/// A row predating typed answer keys: flat `options` and a `correctAnswer`
/// index but no answer key. Such rows grade as multiple choice whatever type
/// they were stored with.
pub fn is_legacy_row(question: &StoredQuestion) -> bool {
    let payload = &question.payload;
    payload.correct_answer_data.is_none()
        && payload.options.is_some()
        && payload.correct_answer.is_some()
}

/// Grade one stored question. `submission` is the learner's raw JSON answer.
pub fn grade_question(
    question: &StoredQuestion,
    submission: Option<&Value>,
    partial_credit_enabled: bool,
) -> QuestionOutcome {
    let points = question
        .points
        .filter(|&points| points > 0.0)
        .unwrap_or(DEFAULT_POINTS);
    let payload = &question.payload;
    let legacy = is_legacy_row(question);
    let multiple_choice = QuestionType::MultipleChoice;
    let question_type = if legacy {
        &multiple_choice
    } else {
        &payload.question_type
    };

    let answer = match submission {
        None => None,
        Some(value) => match UserAnswer::from_submission(question_type, value.clone()) {
            Ok(answer) => answer,
            Err(e) => {
                tracing::debug!(question_id = %question.id, "rejecting submission: {e}");
                return QuestionOutcome::new(
                    question,
                    points,
                    ValidationResult::rejected(INVALID_ANSWER_FORMAT),
                );
            }
        },
    };

    let result = match payload.correct_answer {
        Some(correct_answer) if legacy => {
            tracing::debug!(question_id = %question.id, "grading legacy row");
            match answer {
                None => validate_legacy_answer(None, correct_answer),
                Some(UserAnswer::Number(n)) => validate_legacy_answer(Some(n), correct_answer),
                Some(UserAnswer::Typed(TypedAnswer::MultipleChoice { selected_index })) => {
                    validate_legacy_answer(Some(selected_index as f64), correct_answer)
                }
                Some(_) => ValidationResult::rejected(INVALID_ANSWER_FORMAT),
            }
        }
        _ => validate_answer(
            &payload.question_type,
            answer.as_ref(),
            payload.correct_answer_data.as_ref(),
            &payload.question_config,
            partial_credit_enabled,
        ),
    };

    QuestionOutcome::new(question, points, result)
}

/// Grade every question; `answers` maps question ids to raw submissions.
///
/// Questions without an entry are graded as unanswered.
pub fn grade_questions(
    questions: &[StoredQuestion],
    answers: &BTreeMap<String, Value>,
    partial_credit_enabled: bool,
) -> Vec<QuestionOutcome> {
    questions
        .iter()
        .map(|question| grade_question(question, answers.get(&question.id), partial_credit_enabled))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RawQuestionInput;
    use crate::normalizer::normalize_question_payload_at;
    use crate::validator::NO_ANSWER_PROVIDED;
    use serde_json::json;

    fn stored(id: &str, points: Option<f64>, raw: Value) -> StoredQuestion {
        let raw: RawQuestionInput = serde_json::from_value(raw).unwrap();
        StoredQuestion {
            id: id.into(),
            prompt: None,
            points,
            payload: normalize_question_payload_at(&raw, 2024),
        }
    }

    fn legacy_row() -> StoredQuestion {
        serde_json::from_value(json!({
            "id": "legacy",
            "questionType": "multiple_choice",
            "options": ["a", "b", "c"],
            "correctAnswer": 2
        }))
        .unwrap()
    }

    #[test]
    fn scales_points_by_credit() {
        let question = stored(
            "year",
            Some(4.0),
            json!({
                "questionType": "year",
                "questionConfig": {"tolerance": 5},
                "correctAnswerData": {"correctYear": 1990}
            }),
        );
        let outcome = grade_question(&question, Some(&json!({"year": 1993})), true);
        assert_eq!(outcome.credit_percent, 70.0);
        assert_eq!(outcome.points_earned, 2.8);
        assert_eq!(outcome.points_possible, 4.0);
        assert_eq!(outcome.question_type, QuestionType::YearRange);
    }

    #[test]
    fn non_positive_points_fall_back_to_default() {
        let question = stored(
            "tf",
            Some(0.0),
            json!({"questionType": "true_false", "correctAnswerData": {"correctValue": true}}),
        );
        let outcome = grade_question(&question, Some(&json!(true)), true);
        assert!(outcome.is_correct);
        assert_eq!(outcome.points_possible, DEFAULT_POINTS);
        assert_eq!(outcome.points_earned, DEFAULT_POINTS);
    }

    #[test]
    fn legacy_row_uses_flat_answer() {
        let question = legacy_row();
        assert!(is_legacy_row(&question));
        assert!(grade_question(&question, Some(&json!(2)), true).is_correct);
        assert!(grade_question(&question, Some(&json!({"selectedIndex": 2})), true).is_correct);
        assert!(!grade_question(&question, Some(&json!(0)), true).is_correct);

        let unanswered = grade_question(&question, None, true);
        assert_eq!(unanswered.feedback.as_deref(), Some(NO_ANSWER_PROVIDED));
    }

    #[test]
    fn legacy_row_ignores_stored_type() {
        let question: StoredQuestion = serde_json::from_value(json!({
            "id": "imported",
            "questionType": "poll",
            "options": ["a", "b"],
            "correctAnswer": 1
        }))
        .unwrap();
        assert!(is_legacy_row(&question));

        let outcome = grade_question(&question, Some(&json!({"selectedIndex": 1})), true);
        assert!(outcome.is_correct);
        assert_eq!(outcome.question_type, QuestionType::MultipleChoice);
    }

    #[test]
    fn integral_float_submissions() {
        let year = stored(
            "year",
            None,
            json!({
                "questionType": "year_range",
                "correctAnswerData": {"correctYear": 1990}
            }),
        );
        let outcome = grade_question(&year, Some(&json!({"year": 1990.0})), true);
        assert!(outcome.is_correct);
        assert_eq!(outcome.credit_percent, 100.0);

        let choice = stored(
            "mc",
            None,
            json!({
                "questionType": "multiple_choice",
                "questionConfig": {"options": ["a", "b", "c"]},
                "correctAnswerData": {"correctIndex": 1}
            }),
        );
        assert!(grade_question(&choice, Some(&json!({"selectedIndex": 1.0})), true).is_correct);

        let fractional = grade_question(&choice, Some(&json!({"selectedIndex": 1.5})), true);
        assert_eq!(fractional.feedback.as_deref(), Some(INVALID_ANSWER_FORMAT));
    }

    #[test]
    fn malformed_submission_is_invalid_format() {
        let question = stored(
            "ms",
            None,
            json!({
                "questionType": "multi_select",
                "questionConfig": {"options": ["a", "b"]},
                "correctAnswerData": {"correctIndices": [0]}
            }),
        );
        let outcome = grade_question(&question, Some(&json!({"selectedIndices": "zero"})), true);
        assert_eq!(outcome.feedback.as_deref(), Some(INVALID_ANSWER_FORMAT));
        assert_eq!(outcome.points_earned, 0.0);

        let outcome = grade_question(&question, Some(&json!([0])), true);
        assert_eq!(outcome.feedback.as_deref(), Some(INVALID_ANSWER_FORMAT));
    }

    #[test]
    fn grades_all_questions_in_order() {
        let questions = vec![
            legacy_row(),
            stored(
                "ms",
                Some(2.0),
                json!({
                    "questionType": "multi_select",
                    "questionConfig": {"options": ["a", "b", "c"]},
                    "correctAnswerData": {"correctIndices": [0, 2]}
                }),
            ),
        ];
        let answers = BTreeMap::from([(
            "ms".to_string(),
            json!({"kind": "multi_select", "selectedIndices": [0, 1, 2]}),
        )]);

        let outcomes = grade_questions(&questions, &answers, false);
        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].question_id, "legacy");
        assert_eq!(outcomes[0].feedback.as_deref(), Some(NO_ANSWER_PROVIDED));
        assert_eq!(outcomes[1].credit_percent, 0.0);
        assert!(!outcomes[1].is_correct);
    }
}
