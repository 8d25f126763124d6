//! quizgrade-core: question-schema normalization and answer grading.
//!
//! This crate canonicalizes loosely-typed quiz question data into strict
//! per-type shapes and grades learner submissions against them. Everything
//! here is synchronous and side-effect free apart from question-set file
//! loading in [`bank`].

pub mod bank;
pub mod error;
pub mod grading;
pub mod model;
pub mod normalizer;
pub mod template;
pub mod validator;
