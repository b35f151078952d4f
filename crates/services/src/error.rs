//! Shared error types for the services crate.

use thiserror::Error;

use drill_core::model::AttemptError;
use drill_core::params::ParamsError;
use drill_core::rational::RationalError;

/// Errors emitted by `QuestionEngine`.
///
/// A missing parameter record is not an error here: the engine substitutes the
/// compiled-in record. `Params` only surfaces records that fail validation.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GenerationError {
    #[error(transparent)]
    Params(#[from] ParamsError),
    #[error(transparent)]
    Rational(#[from] RationalError),
}

/// Errors emitted while loading an external parameter document.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ParameterLoadError {
    #[error("parameter document is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Params(#[from] ParamsError),
}

/// Errors emitted by `TestSession`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TestSessionError {
    #[error("no questions available for test")]
    Empty,
    #[error("test already completed")]
    Completed,
    #[error("test timer has run out")]
    Expired,
    #[error("answer is blank")]
    EmptyAnswer,
    #[error(transparent)]
    Attempt(#[from] AttemptError),
}

/// Errors emitted by `PracticeService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PracticeError {
    #[error(transparent)]
    Generation(#[from] GenerationError),
    #[error(transparent)]
    Session(#[from] TestSessionError),
}
