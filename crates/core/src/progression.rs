use serde::{Deserialize, Serialize};

use crate::model::{Level, TestAttempt};
use crate::settings::SettingsError;

//
// ─── RULES ─────────────────────────────────────────────────────────────────────
//

/// Thresholds that drive level changes after a test.
///
/// # Examples
///
/// ```
/// # use drill_core::progression::ProgressionRules;
/// let rules = ProgressionRules::default();
/// assert_eq!(rules.pass_threshold(), 22);
/// assert_eq!(rules.super_fast_track_secs(), 60);
/// assert_eq!(rules.fast_track_secs(), 20);
/// assert_eq!(rules.streak_target(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ProgressionRulesDraft")]
pub struct ProgressionRules {
    pass_threshold: u32,
    super_fast_track_secs: u32,
    fast_track_secs: u32,
    streak_target: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct ProgressionRulesDraft {
    pass_threshold: u32,
    super_fast_track_secs: u32,
    fast_track_secs: u32,
    streak_target: u32,
}

impl Default for ProgressionRulesDraft {
    fn default() -> Self {
        let rules = ProgressionRules::default();
        Self {
            pass_threshold: rules.pass_threshold,
            super_fast_track_secs: rules.super_fast_track_secs,
            fast_track_secs: rules.fast_track_secs,
            streak_target: rules.streak_target,
        }
    }
}

impl TryFrom<ProgressionRulesDraft> for ProgressionRules {
    type Error = SettingsError;

    fn try_from(draft: ProgressionRulesDraft) -> Result<Self, Self::Error> {
        Self::new(
            draft.pass_threshold,
            draft.super_fast_track_secs,
            draft.fast_track_secs,
            draft.streak_target,
        )
    }
}

impl ProgressionRules {
    pub const PASS_THRESHOLD: u32 = 22;
    pub const SUPER_FAST_TRACK_SECS: u32 = 60;
    pub const FAST_TRACK_SECS: u32 = 20;
    pub const STREAK_TARGET: u32 = 3;

    /// Creates custom progression rules.
    ///
    /// # Errors
    ///
    /// - `InvalidPassThreshold` if `pass_threshold` is zero
    /// - `InvalidFastTrackWindow` unless `fast_track_secs < super_fast_track_secs`
    /// - `InvalidStreakTarget` if `streak_target` is zero
    pub fn new(
        pass_threshold: u32,
        super_fast_track_secs: u32,
        fast_track_secs: u32,
        streak_target: u32,
    ) -> Result<Self, SettingsError> {
        if pass_threshold == 0 {
            return Err(SettingsError::InvalidPassThreshold);
        }
        if fast_track_secs >= super_fast_track_secs {
            return Err(SettingsError::InvalidFastTrackWindow {
                fast: fast_track_secs,
                super_fast: super_fast_track_secs,
            });
        }
        if streak_target == 0 {
            return Err(SettingsError::InvalidStreakTarget);
        }

        Ok(Self {
            pass_threshold,
            super_fast_track_secs,
            fast_track_secs,
            streak_target,
        })
    }

    /// Minimum correct answers for a pass (absolute count, not a ratio).
    #[must_use]
    pub fn pass_threshold(&self) -> u32 {
        self.pass_threshold
    }

    /// Passing with more than this many seconds left grants two levels.
    #[must_use]
    pub fn super_fast_track_secs(&self) -> u32 {
        self.super_fast_track_secs
    }

    /// Passing with more than this many seconds left grants one level.
    #[must_use]
    pub fn fast_track_secs(&self) -> u32 {
        self.fast_track_secs
    }

    /// Consecutive slow passes needed for a standard level-up.
    #[must_use]
    pub fn streak_target(&self) -> u32 {
        self.streak_target
    }
}

impl Default for ProgressionRules {
    fn default() -> Self {
        Self {
            pass_threshold: Self::PASS_THRESHOLD,
            super_fast_track_secs: Self::SUPER_FAST_TRACK_SECS,
            fast_track_secs: Self::FAST_TRACK_SECS,
            streak_target: Self::STREAK_TARGET,
        }
    }
}

//
// ─── STATE ─────────────────────────────────────────────────────────────────────
//

/// Per-learner progression state: level plus consecutive slow-pass streak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressionState {
    #[serde(rename = "currentLevel")]
    pub level: Level,
    #[serde(rename = "consecutiveFastTrackCount")]
    pub streak: u32,
}

/// Scores from a finished test that progression depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TestScore {
    pub correct: u32,
    pub total: u32,
    pub time_remaining_secs: u32,
}

impl From<&TestAttempt> for TestScore {
    fn from(attempt: &TestAttempt) -> Self {
        Self {
            correct: attempt.correct_count(),
            total: attempt.total_questions(),
            time_remaining_secs: attempt.time_remaining(),
        }
    }
}

/// Which rule fired for a test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Advancement {
    Failed,
    SuperFastTrack,
    FastTrack,
    StreakCompleted,
    StreakExtended,
}

/// New state after a test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressionOutcome {
    pub level: Level,
    pub streak: u32,
    /// True only when the level actually increased.
    pub leveled_up: bool,
    pub advancement: Advancement,
}

impl ProgressionOutcome {
    #[must_use]
    pub fn state(&self) -> ProgressionState {
        ProgressionState {
            level: self.level,
            streak: self.streak,
        }
    }
}

impl ProgressionState {
    #[must_use]
    pub fn new(level: Level, streak: u32) -> Self {
        Self { level, streak }
    }

    /// Apply the progression rules to a completed attempt.
    #[must_use]
    pub fn advance(&self, rules: &ProgressionRules, attempt: &TestAttempt) -> ProgressionOutcome {
        advance(rules, *self, TestScore::from(attempt))
    }
}

/// Pure level transition for one finished test.
///
/// - Below the pass threshold: level kept, streak reset.
/// - Pass with time to spare: +2 (super fast track) or +1 (fast track), streak reset.
/// - Slow pass: streak grows; reaching the streak target grants +1 and resets it.
///
/// The level never decreases and never exceeds [`Level::MAX`].
///
/// # Examples
///
/// ```
/// # use drill_core::model::Level;
/// # use drill_core::progression::{advance, ProgressionRules, ProgressionState, TestScore};
/// let state = ProgressionState::new(Level::new(3)?, 0);
/// let score = TestScore { correct: 24, total: 25, time_remaining_secs: 75 };
/// let outcome = advance(&ProgressionRules::default(), state, score);
/// assert_eq!(outcome.level.value(), 5);
/// assert!(outcome.leveled_up);
/// # Ok::<(), drill_core::model::LevelError>(())
/// ```
#[must_use]
pub fn advance(
    rules: &ProgressionRules,
    state: ProgressionState,
    score: TestScore,
) -> ProgressionOutcome {
    let (steps, streak, advancement) = if score.correct < rules.pass_threshold {
        (0, 0, Advancement::Failed)
    } else if score.time_remaining_secs > rules.super_fast_track_secs {
        (2, 0, Advancement::SuperFastTrack)
    } else if score.time_remaining_secs > rules.fast_track_secs {
        (1, 0, Advancement::FastTrack)
    } else {
        let streak = state.streak.saturating_add(1);
        if streak >= rules.streak_target {
            (1, 0, Advancement::StreakCompleted)
        } else {
            (0, streak, Advancement::StreakExtended)
        }
    };

    let level = state.level.raised_by(steps);
    ProgressionOutcome {
        level,
        streak,
        leveled_up: level > state.level,
        advancement,
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
