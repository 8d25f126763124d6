//! Decoding errors at the serialization boundary.
//!
//! Grading and normalization never fail; these errors only arise when typed
//! data is decoded from JSON with the wrong shape for its question type.

use thiserror::Error;

/// Errors raised while decoding stored question data or learner submissions.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// A stored question config does not match the shape for its type.
    #[error("invalid question config for {question_type}: {source}")]
    InvalidConfig {
        question_type: String,
        #[source]
        source: serde_json::Error,
    },

    /// A stored answer key does not match the shape for its type.
    #[error("invalid answer key for {question_type}: {source}")]
    InvalidAnswerKey {
        question_type: String,
        #[source]
        source: serde_json::Error,
    },

    /// A learner submission could not be decoded for its question type.
    #[error("malformed {question_type} answer: {source}")]
    MalformedAnswer {
        question_type: String,
        #[source]
        source: serde_json::Error,
    },

    /// A learner submission had a JSON shape no answer variant accepts.
    #[error("unsupported {question_type} answer shape: {shape}")]
    UnsupportedShape {
        question_type: String,
        shape: &'static str,
    },
}

impl SchemaError {
    /// The question-type slug the failing data was decoded for.
    pub fn question_type(&self) -> &str {
        match self {
            SchemaError::InvalidConfig { question_type, .. }
            | SchemaError::InvalidAnswerKey { question_type, .. }
            | SchemaError::MalformedAnswer { question_type, .. }
            | SchemaError::UnsupportedShape { question_type, .. } => question_type,
        }
    }

    /// Returns `true` if the error came from a learner submission rather than stored data.
    pub fn is_submission_error(&self) -> bool {
        matches!(
            self,
            SchemaError::MalformedAnswer { .. } | SchemaError::UnsupportedShape { .. }
        )
    }
}
