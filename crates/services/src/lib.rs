//! Question generation and timed-test orchestration on top of `drill_core`.

#![forbid(unsafe_code)]

pub mod batch;
pub mod error;
pub mod generator;
pub mod parameters;
pub mod practice;

pub use drill_core::Clock;

pub use batch::QuestionBatch;
pub use error::{GenerationError, ParameterLoadError, PracticeError, TestSessionError};
pub use generator::QuestionEngine;
pub use parameters::{load_parameter_table, parameter_source, parameter_table_to_json};
pub use practice::{AnswerResult, CompletedTest, PracticeService, TestProgress, TestSession};
