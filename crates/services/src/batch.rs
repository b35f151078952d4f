use std::collections::HashSet;

use rand::Rng;

use drill_core::model::{Level, Question};

use crate::error::GenerationError;
use crate::generator::QuestionEngine;

/// Questions for one test, plus how hard the engine had to look for them.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionBatch {
    questions: Vec<Question>,
    unique_count: usize,
    attempts: usize,
}

impl QuestionBatch {
    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn into_questions(self) -> Vec<Question> {
        self.questions
    }

    /// Questions with distinct canonical keys, all placed before any repeats.
    #[must_use]
    pub fn unique_count(&self) -> usize {
        self.unique_count
    }

    /// Draws spent on the uniqueness search.
    #[must_use]
    pub fn attempts(&self) -> usize {
        self.attempts
    }

    /// True when the search ran out and repeats were used to fill the batch.
    #[must_use]
    pub fn duplicates_allowed(&self) -> bool {
        self.unique_count < self.questions.len()
    }
}

impl QuestionEngine {
    /// Generate exactly `size` questions for `level`, preferring distinct ones.
    ///
    /// Draws until `size` questions with distinct canonical keys are found or
    /// `size * uniqueness_attempts_per_question` draws have been spent. Running
    /// out is not an error: the rest of the batch is filled with fresh draws
    /// that may repeat, and a warning is logged.
    ///
    /// # Errors
    ///
    /// Propagates `GenerationError` from single-question generation.
    pub fn generate_batch<R: Rng>(
        &self,
        level: Level,
        size: usize,
        rng: &mut R,
    ) -> Result<QuestionBatch, GenerationError> {
        let per_question = usize::try_from(self.settings().uniqueness_attempts_per_question())
            .unwrap_or(usize::MAX);
        let max_attempts = size.saturating_mul(per_question);

        let mut questions = Vec::with_capacity(size);
        let mut seen = HashSet::with_capacity(size);
        let mut attempts = 0;

        while questions.len() < size && attempts < max_attempts {
            let question = self.generate_question(level, rng)?;
            attempts += 1;
            if seen.insert(question.canonical_key()) {
                questions.push(question);
            }
        }

        let unique_count = questions.len();
        if unique_count < size {
            tracing::warn!(
                %level,
                size,
                unique = unique_count,
                attempts,
                "ran out of unique questions, allowing duplicates"
            );
            while questions.len() < size {
                questions.push(self.generate_question(level, rng)?);
            }
        }

        Ok(QuestionBatch {
            questions,
            unique_count,
            attempts,
        })
    }

    /// Questions for one timed test at `level`, drawn from the thread RNG.
    ///
    /// Always returns exactly `question_count` questions.
    ///
    /// # Errors
    ///
    /// Propagates `GenerationError` from single-question generation.
    pub fn generate_test_questions(&self, level: Level) -> Result<Vec<Question>, GenerationError> {
        let size = usize::try_from(self.settings().question_count()).unwrap_or(usize::MAX);
        let batch = self.generate_batch(level, size, &mut rand::rng())?;
        tracing::info!(
            %level,
            questions = batch.questions().len(),
            unique = batch.unique_count(),
            "generated test questions"
        );
        Ok(batch.into_questions())
    }
}
