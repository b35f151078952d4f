use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::attempt::TestAttempt;
use crate::model::level::Level;
use crate::progression::{ProgressionOutcome, ProgressionRules, ProgressionState};

/// Number of recent results kept on a learner profile.
pub const RECENT_RESULTS_KEPT: usize = 3;

/// Compact summary of one attempt, kept on the learner profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentResult {
    pub level: Level,
    pub score: f64,
    pub correct_count: u32,
    pub time_remaining: u32,
    pub date: DateTime<Utc>,
}

impl From<&TestAttempt> for RecentResult {
    fn from(attempt: &TestAttempt) -> Self {
        Self {
            level: attempt.level(),
            score: attempt.percentage(),
            correct_count: attempt.correct_count(),
            time_remaining: attempt.time_remaining(),
            date: attempt.date(),
        }
    }
}

/// Progression state plus the most recent results, newest first.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearnerProgress {
    #[serde(flatten)]
    state: ProgressionState,
    #[serde(default)]
    recent_tests: Vec<RecentResult>,
}

impl LearnerProgress {
    #[must_use]
    pub fn new(state: ProgressionState) -> Self {
        Self {
            state,
            recent_tests: Vec::new(),
        }
    }

    #[must_use]
    pub fn state(&self) -> ProgressionState {
        self.state
    }

    #[must_use]
    pub fn level(&self) -> Level {
        self.state.level
    }

    #[must_use]
    pub fn recent_tests(&self) -> &[RecentResult] {
        &self.recent_tests
    }

    /// Apply the progression rules for `attempt` and push it onto the history.
    pub fn record(&mut self, rules: &ProgressionRules, attempt: &TestAttempt) -> ProgressionOutcome {
        let outcome = self.state.advance(rules, attempt);
        self.state = outcome.state();
        self.recent_tests.insert(0, RecentResult::from(attempt));
        self.recent_tests.truncate(RECENT_RESULTS_KEPT);
        outcome
    }
}
