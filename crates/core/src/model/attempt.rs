use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::AttemptId;
use crate::model::level::Level;
use crate::model::question::Question;

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum AttemptError {
    #[error("test length must be > 0")]
    EmptyTest,

    #[error("{answered} answers recorded for a test of {total} questions")]
    TooManyAnswers { answered: usize, total: u32 },

    #[error("time values must be non-negative and finite, got {provided}")]
    InvalidDuration { provided: f64 },

    #[error("recorded correct count {recorded} does not match the {counted} graded answers")]
    CorrectCountMismatch { recorded: u32, counted: u32 },

    #[error("answer {index} is marked {recorded} but grades as {graded}")]
    GradeMismatch {
        index: usize,
        recorded: bool,
        graded: bool,
    },
}

/// A question together with the learner's response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnsweredQuestion {
    #[serde(flatten)]
    pub question: Question,
    pub submitted_answer: String,
    pub is_correct: bool,
    pub time_taken_seconds: f64,
}

impl AnsweredQuestion {
    /// Grade `submitted` against the question's canonical answer.
    #[must_use]
    pub fn grade(question: Question, submitted: impl Into<String>, time_taken_seconds: f64) -> Self {
        let submitted_answer = submitted.into();
        let is_correct = question.check_answer(&submitted_answer);
        Self {
            question,
            submitted_answer,
            is_correct,
            time_taken_seconds,
        }
    }
}

/// Record of one completed timed test.
///
/// The answered list may be shorter than `total_questions` when the timer ran
/// out; unanswered questions count as incorrect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "TestAttemptDraft")]
pub struct TestAttempt {
    id: AttemptId,
    date: DateTime<Utc>,
    level: Level,
    correct_count: u32,
    total_questions: u32,
    time_taken: f64,
    time_remaining: u32,
    answered_questions: Vec<AnsweredQuestion>,
}

/// Stored shape of an attempt; re-validated through `TestAttempt::new`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TestAttemptDraft {
    id: AttemptId,
    date: DateTime<Utc>,
    level: Level,
    correct_count: u32,
    total_questions: u32,
    time_taken: f64,
    time_remaining: u32,
    answered_questions: Vec<AnsweredQuestion>,
}

impl TryFrom<TestAttemptDraft> for TestAttempt {
    type Error = AttemptError;

    fn try_from(draft: TestAttemptDraft) -> Result<Self, Self::Error> {
        for (index, answer) in draft.answered_questions.iter().enumerate() {
            let graded = answer.question.check_answer(&answer.submitted_answer);
            if graded != answer.is_correct {
                return Err(AttemptError::GradeMismatch {
                    index,
                    recorded: answer.is_correct,
                    graded,
                });
            }
        }

        let attempt = Self::new(
            draft.level,
            draft.answered_questions,
            draft.total_questions,
            draft.time_remaining,
            draft.time_taken,
            draft.date,
        )?;
        if attempt.correct_count != draft.correct_count {
            return Err(AttemptError::CorrectCountMismatch {
                recorded: draft.correct_count,
                counted: attempt.correct_count,
            });
        }

        Ok(Self {
            id: draft.id,
            ..attempt
        })
    }
}

impl TestAttempt {
    /// Assemble an attempt, deriving the correct count from the answers.
    ///
    /// # Errors
    ///
    /// - `EmptyTest` if `total_questions` is zero
    /// - `TooManyAnswers` if more answers than questions were recorded
    /// - `InvalidDuration` if `time_taken` is negative or not finite
    pub fn new(
        level: Level,
        answered_questions: Vec<AnsweredQuestion>,
        total_questions: u32,
        time_remaining: u32,
        time_taken: f64,
        date: DateTime<Utc>,
    ) -> Result<Self, AttemptError> {
        if total_questions == 0 {
            return Err(AttemptError::EmptyTest);
        }
        let answered = answered_questions.len();
        if u32::try_from(answered).map_or(true, |n| n > total_questions) {
            return Err(AttemptError::TooManyAnswers {
                answered,
                total: total_questions,
            });
        }
        if !time_taken.is_finite() || time_taken < 0.0 {
            return Err(AttemptError::InvalidDuration {
                provided: time_taken,
            });
        }

        let correct = answered_questions.iter().filter(|a| a.is_correct).count();
        // Bounded by `answered`, which fits in u32 (checked above).
        let correct_count = u32::try_from(correct).unwrap_or(total_questions);

        Ok(Self {
            id: AttemptId::new_random(),
            date,
            level,
            correct_count,
            total_questions,
            time_taken,
            time_remaining,
            answered_questions,
        })
    }

    #[must_use]
    pub fn id(&self) -> AttemptId {
        self.id
    }

    #[must_use]
    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    #[must_use]
    pub fn level(&self) -> Level {
        self.level
    }

    #[must_use]
    pub fn correct_count(&self) -> u32 {
        self.correct_count
    }

    #[must_use]
    pub fn total_questions(&self) -> u32 {
        self.total_questions
    }

    /// Seconds left on the test timer when the test ended.
    #[must_use]
    pub fn time_remaining(&self) -> u32 {
        self.time_remaining
    }

    /// Wall-clock seconds spent on the test.
    #[must_use]
    pub fn time_taken(&self) -> f64 {
        self.time_taken
    }

    #[must_use]
    pub fn answered_questions(&self) -> &[AnsweredQuestion] {
        &self.answered_questions
    }

    /// Share of correct answers, 0–100.
    #[must_use]
    pub fn percentage(&self) -> f64 {
        f64::from(self.correct_count) * 100.0 / f64::from(self.total_questions)
    }

    /// Level-weighted score: correct answers plus 25 for every level below this one.
    #[must_use]
    pub fn cumulative_score(&self) -> u32 {
        const POINTS_PER_LEVEL: u32 = 25;
        let levels_below = u32::from(self.level.value().saturating_sub(1));
        self.correct_count
            .saturating_add(levels_below.saturating_mul(POINTS_PER_LEVEL))
    }
}
