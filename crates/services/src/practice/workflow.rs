use rand::Rng;

use drill_core::model::{AnsweredQuestion, LearnerProgress, Level, Question, TestAttempt};
use drill_core::progression::{ProgressionOutcome, ProgressionRules};

use crate::Clock;
use crate::error::PracticeError;
use crate::generator::QuestionEngine;
use super::session::TestSession;

/// Result of answering a single question in a test.
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerResult {
    pub answer: AnsweredQuestion,
    pub is_complete: bool,
}

/// A graded attempt and the progression it caused.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletedTest {
    pub attempt: TestAttempt,
    pub outcome: ProgressionOutcome,
}

/// Orchestrates test start, answering, and progression.
#[derive(Debug, Clone)]
pub struct PracticeService {
    clock: Clock,
    engine: QuestionEngine,
    rules: ProgressionRules,
}

impl PracticeService {
    #[must_use]
    pub fn new(clock: Clock, engine: QuestionEngine) -> Self {
        Self {
            clock,
            engine,
            rules: ProgressionRules::default(),
        }
    }

    #[must_use]
    pub fn with_rules(mut self, rules: ProgressionRules) -> Self {
        self.rules = rules;
        self
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn engine(&self) -> &QuestionEngine {
        &self.engine
    }

    #[must_use]
    pub fn rules(&self) -> &ProgressionRules {
        &self.rules
    }

    /// Start a timed test at `level` with freshly generated questions.
    ///
    /// # Errors
    ///
    /// Returns `PracticeError` if generation fails.
    pub fn start_test(&self, level: Level) -> Result<TestSession, PracticeError> {
        let questions = self.engine.generate_test_questions(level)?;
        self.open_session(level, questions)
    }

    /// Like `start_test`, drawing from a caller-supplied RNG.
    ///
    /// # Errors
    ///
    /// Returns `PracticeError` if generation fails.
    pub fn start_test_with_rng<R: Rng>(
        &self,
        level: Level,
        rng: &mut R,
    ) -> Result<TestSession, PracticeError> {
        let size = usize::try_from(self.engine.settings().question_count()).unwrap_or(usize::MAX);
        let batch = self.engine.generate_batch(level, size, rng)?;
        self.open_session(level, batch.into_questions())
    }

    fn open_session(
        &self,
        level: Level,
        questions: Vec<Question>,
    ) -> Result<TestSession, PracticeError> {
        let session = TestSession::new(
            level,
            questions,
            self.engine.settings().duration_secs(),
            self.clock.now(),
        )?;
        tracing::info!(%level, questions = session.total_questions(), "test started");
        Ok(session)
    }

    /// Grade an answer to the current question at the clock's current time.
    ///
    /// # Errors
    ///
    /// Returns `PracticeError::Session` for blank input or a finished test.
    pub fn answer_current(
        &self,
        session: &mut TestSession,
        submitted: &str,
    ) -> Result<AnswerResult, PracticeError> {
        let now = self.clock.now();
        let answer = session.submit_answer(submitted, now)?.clone();
        Ok(AnswerResult {
            answer,
            is_complete: session.is_complete(now),
        })
    }

    /// Close the test, apply the progression rules, and record the result.
    ///
    /// # Errors
    ///
    /// Returns `PracticeError::Session` if the attempt cannot be built.
    pub fn complete_test(
        &self,
        progress: &mut LearnerProgress,
        session: TestSession,
    ) -> Result<CompletedTest, PracticeError> {
        let attempt = session.finish(self.clock.now())?;
        let previous = progress.level();
        let outcome = progress.record(&self.rules, &attempt);

        tracing::info!(
            level = %attempt.level(),
            correct = attempt.correct_count(),
            total = attempt.total_questions(),
            time_remaining = attempt.time_remaining(),
            "test completed"
        );
        if outcome.leveled_up {
            tracing::info!(from = %previous, to = %outcome.level, advancement = ?outcome.advancement, "level up");
        }

        Ok(CompletedTest { attempt, outcome })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use drill_core::progression::{Advancement, ProgressionState};
    use drill_core::settings::TestSettings;
    use drill_core::time::{fixed_clock, fixed_now};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn service() -> PracticeService {
        PracticeService::new(fixed_clock(), QuestionEngine::default())
    }

    #[test]
    fn start_test_uses_configured_shape() {
        let settings = TestSettings::new(10, 120, 50).unwrap();
        let svc = PracticeService::new(fixed_clock(), QuestionEngine::default().with_settings(settings));
        let session = svc.start_test(Level::new(2).unwrap()).unwrap();
        assert_eq!(session.total_questions(), 10);
        assert_eq!(session.time_remaining(fixed_now()), 120);
    }

    #[test]
    fn perfect_quick_test_skips_two_levels() {
        let svc = service();
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        let mut session = svc.start_test_with_rng(Level::new(5).unwrap(), &mut rng).unwrap();

        let mut last = None;
        while let Some(question) = session.current_question() {
            let answer = question.correct_answer().to_owned();
            last = Some(svc.answer_current(&mut session, &answer).unwrap());
        }
        assert!(last.unwrap().is_complete);

        let mut progress = LearnerProgress::new(ProgressionState::new(Level::new(5).unwrap(), 2));
        let done = svc.complete_test(&mut progress, session).unwrap();

        assert_eq!(done.attempt.correct_count(), 25);
        assert_eq!(done.outcome.advancement, Advancement::SuperFastTrack);
        assert_eq!(progress.level().value(), 7);
        assert_eq!(progress.state().streak, 0);
    }

    #[test]
    fn timed_out_test_is_a_failed_attempt() {
        let svc = service();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let session = svc.start_test_with_rng(Level::MIN, &mut rng).unwrap();

        let late = svc.clone().with_clock(Clock::fixed(fixed_now() + Duration::seconds(400)));
        let mut progress = LearnerProgress::default();
        let done = late.complete_test(&mut progress, session).unwrap();

        assert_eq!(done.attempt.correct_count(), 0);
        assert_eq!(done.attempt.time_remaining(), 0);
        assert_eq!(done.outcome.advancement, Advancement::Failed);
        assert!(!done.outcome.leveled_up);
        assert_eq!(progress.recent_tests().len(), 1);
    }
}
