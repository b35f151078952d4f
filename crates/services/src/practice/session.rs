use chrono::{DateTime, Utc};

use drill_core::model::{AnsweredQuestion, Level, Question, TestAttempt};
use drill_core::time::{Countdown, seconds_between};

use crate::error::TestSessionError;
use super::progress::TestProgress;

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// In-memory timed test at a single level.
///
/// Steps through the questions in order, grading each answer on submission.
/// The test is over once every question is answered or the timer runs out;
/// `finish` turns it into a `TestAttempt` either way.
#[derive(Debug, Clone)]
pub struct TestSession {
    level: Level,
    questions: Vec<Question>,
    answers: Vec<AnsweredQuestion>,
    countdown: Countdown,
    question_started_at: DateTime<Utc>,
}

impl TestSession {
    /// Start a test over `questions`.
    ///
    /// `started_at` should come from the services layer clock to keep time deterministic.
    ///
    /// # Errors
    ///
    /// Returns `TestSessionError::Empty` if no questions are provided.
    pub fn new(
        level: Level,
        questions: Vec<Question>,
        duration_secs: u32,
        started_at: DateTime<Utc>,
    ) -> Result<Self, TestSessionError> {
        if questions.is_empty() {
            return Err(TestSessionError::Empty);
        }

        Ok(Self {
            level,
            answers: Vec::with_capacity(questions.len()),
            questions,
            countdown: Countdown::start(started_at, duration_secs),
            question_started_at: started_at,
        })
    }

    #[must_use]
    pub fn level(&self) -> Level {
        self.level
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.countdown.started_at()
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn answers(&self) -> &[AnsweredQuestion] {
        &self.answers
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.answers.len()
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.questions.len().saturating_sub(self.answers.len())
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.answers.len())
    }

    #[must_use]
    pub fn time_remaining(&self, now: DateTime<Utc>) -> u32 {
        self.countdown.remaining_secs(now)
    }

    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.countdown.is_expired(now)
    }

    #[must_use]
    pub fn is_complete(&self, now: DateTime<Utc>) -> bool {
        self.remaining() == 0 || self.is_expired(now)
    }

    #[must_use]
    pub fn progress(&self, now: DateTime<Utc>) -> TestProgress {
        TestProgress {
            total: self.total_questions(),
            answered: self.answered_count(),
            remaining: self.remaining(),
            time_remaining_secs: self.time_remaining(now),
            is_complete: self.is_complete(now),
        }
    }

    /// Grade `submitted` against the current question and move on.
    ///
    /// `answered_at` should come from the services layer clock.
    ///
    /// # Errors
    ///
    /// Returns `TestSessionError::EmptyAnswer` for blank input,
    /// `TestSessionError::Expired` once the timer has run out, and
    /// `TestSessionError::Completed` when every question is answered.
    pub fn submit_answer(
        &mut self,
        submitted: &str,
        answered_at: DateTime<Utc>,
    ) -> Result<&AnsweredQuestion, TestSessionError> {
        let submitted = submitted.trim();
        if submitted.is_empty() {
            return Err(TestSessionError::EmptyAnswer);
        }
        if self.is_expired(answered_at) {
            return Err(TestSessionError::Expired);
        }
        let Some(question) = self.current_question().cloned() else {
            return Err(TestSessionError::Completed);
        };

        let time_taken = seconds_between(self.question_started_at, answered_at);
        self.answers
            .push(AnsweredQuestion::grade(question, submitted, time_taken));
        self.question_started_at = answered_at;

        self.answers.last().ok_or(TestSessionError::Completed)
    }

    /// Close the test and build its attempt record.
    ///
    /// Unanswered questions count as incorrect. Time remaining is zero when the
    /// timer ran out.
    ///
    /// # Errors
    ///
    /// Returns `TestSessionError::Attempt` if the attempt record is inconsistent.
    pub fn finish(self, finished_at: DateTime<Utc>) -> Result<TestAttempt, TestSessionError> {
        let total = u32::try_from(self.questions.len()).unwrap_or(u32::MAX);
        let attempt = TestAttempt::new(
            self.level,
            self.answers,
            total,
            self.countdown.remaining_secs(finished_at),
            self.countdown.elapsed_secs(finished_at),
            finished_at,
        )?;
        Ok(attempt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use drill_core::model::Operation;
    use drill_core::time::fixed_now;

    fn questions(n: i64) -> Vec<Question> {
        (1..=n)
            .map(|i| Question::integer(Operation::Add, i, 1).unwrap())
            .collect()
    }

    fn session(n: i64) -> TestSession {
        TestSession::new(Level::new(4).unwrap(), questions(n), 180, fixed_now()).unwrap()
    }

    #[test]
    fn new_rejects_empty_test() {
        let err = TestSession::new(Level::MIN, Vec::new(), 180, fixed_now()).unwrap_err();
        assert!(matches!(err, TestSessionError::Empty));
    }

    #[test]
    fn answers_are_graded_in_order() {
        let mut session = session(3);
        let t1 = fixed_now() + Duration::seconds(4);
        let t2 = t1 + Duration::milliseconds(2_500);

        let first = session.submit_answer(" 2 ", t1).unwrap();
        assert!(first.is_correct);
        assert_eq!(first.submitted_answer, "2");
        assert!((first.time_taken_seconds - 4.0).abs() < 1e-9);

        let second = session.submit_answer("7", t2).unwrap();
        assert!(!second.is_correct);
        assert!((second.time_taken_seconds - 2.5).abs() < 1e-9);

        assert_eq!(session.answered_count(), 2);
        assert_eq!(session.current_question().unwrap().correct_answer(), "4");
    }

    #[test]
    fn blank_and_late_answers_are_rejected() {
        let mut session = session(2);
        assert!(matches!(
            session.submit_answer("   ", fixed_now()),
            Err(TestSessionError::EmptyAnswer)
        ));

        let late = fixed_now() + Duration::seconds(181);
        assert!(matches!(
            session.submit_answer("2", late),
            Err(TestSessionError::Expired)
        ));
        assert!(session.is_complete(late));
        assert_eq!(session.answered_count(), 0);
    }

    #[test]
    fn answering_past_the_end_is_rejected() {
        let mut session = session(1);
        session.submit_answer("2", fixed_now()).unwrap();
        assert!(session.is_complete(fixed_now()));
        assert!(matches!(
            session.submit_answer("2", fixed_now()),
            Err(TestSessionError::Completed)
        ));
    }

    #[test]
    fn finish_counts_unanswered_as_wrong() {
        let mut session = session(3);
        session.submit_answer("2", fixed_now() + Duration::seconds(5)).unwrap();

        let timed_out = fixed_now() + Duration::seconds(200);
        let attempt = session.finish(timed_out).unwrap();
        assert_eq!(attempt.correct_count(), 1);
        assert_eq!(attempt.total_questions(), 3);
        assert_eq!(attempt.time_remaining(), 0);
        assert_eq!(attempt.answered_questions().len(), 1);
    }

    #[test]
    fn progress_reports_time_left() {
        let session = session(5);
        let now = fixed_now() + Duration::seconds(30);
        let progress = session.progress(now);
        assert_eq!(progress.total, 5);
        assert_eq!(progress.remaining, 5);
        assert_eq!(progress.time_remaining_secs, 150);
        assert!(!progress.is_complete);
    }
}
