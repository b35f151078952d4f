use serde::{Deserialize, Serialize};
use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SettingsError {
    #[error("question count must be > 0")]
    InvalidQuestionCount,

    #[error("test duration must be between 10 and 3600 seconds")]
    InvalidDuration,

    #[error("uniqueness attempts per question must be > 0")]
    InvalidUniquenessAttempts,

    #[error("pass threshold must be > 0")]
    InvalidPassThreshold,

    #[error("fast track window ({fast}s) must be shorter than super fast track window ({super_fast}s)")]
    InvalidFastTrackWindow { fast: u32, super_fast: u32 },

    #[error("streak target must be > 0")]
    InvalidStreakTarget,
}

//
// ─── TEST SETTINGS ─────────────────────────────────────────────────────────────
//

/// Shape of a timed test.
///
/// Defaults: 25 questions, 180 seconds, and up to 50 draws per question
/// while searching for unique questions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TestSettingsDraft")]
pub struct TestSettings {
    question_count: u32,
    duration_secs: u32,
    uniqueness_attempts_per_question: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct TestSettingsDraft {
    question_count: u32,
    duration_secs: u32,
    uniqueness_attempts_per_question: u32,
}

impl Default for TestSettingsDraft {
    fn default() -> Self {
        Self {
            question_count: TestSettings::QUESTION_COUNT,
            duration_secs: TestSettings::DURATION_SECS,
            uniqueness_attempts_per_question: TestSettings::UNIQUENESS_ATTEMPTS_PER_QUESTION,
        }
    }
}

impl TryFrom<TestSettingsDraft> for TestSettings {
    type Error = SettingsError;

    fn try_from(draft: TestSettingsDraft) -> Result<Self, Self::Error> {
        Self::new(
            draft.question_count,
            draft.duration_secs,
            draft.uniqueness_attempts_per_question,
        )
    }
}

impl TestSettings {
    pub const QUESTION_COUNT: u32 = 25;
    pub const DURATION_SECS: u32 = 180;
    pub const UNIQUENESS_ATTEMPTS_PER_QUESTION: u32 = 50;

    /// Creates custom test settings.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` if a count is zero or the duration is out of bounds.
    pub fn new(
        question_count: u32,
        duration_secs: u32,
        uniqueness_attempts_per_question: u32,
    ) -> Result<Self, SettingsError> {
        if question_count == 0 {
            return Err(SettingsError::InvalidQuestionCount);
        }
        if !(10..=3600).contains(&duration_secs) {
            return Err(SettingsError::InvalidDuration);
        }
        if uniqueness_attempts_per_question == 0 {
            return Err(SettingsError::InvalidUniquenessAttempts);
        }

        Ok(Self {
            question_count,
            duration_secs,
            uniqueness_attempts_per_question,
        })
    }

    #[must_use]
    pub fn question_count(&self) -> u32 {
        self.question_count
    }

    #[must_use]
    pub fn duration_secs(&self) -> u32 {
        self.duration_secs
    }

    #[must_use]
    pub fn uniqueness_attempts_per_question(&self) -> u32 {
        self.uniqueness_attempts_per_question
    }
}

impl Default for TestSettings {
    fn default() -> Self {
        Self {
            question_count: Self::QUESTION_COUNT,
            duration_secs: Self::DURATION_SECS,
            uniqueness_attempts_per_question: Self::UNIQUENESS_ATTEMPTS_PER_QUESTION,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_test() {
        let settings = TestSettings::default();
        assert_eq!(settings.question_count(), 25);
        assert_eq!(settings.duration_secs(), 180);
        assert_eq!(settings.uniqueness_attempts_per_question(), 50);
    }

    #[test]
    fn new_rejects_zero_and_out_of_bounds() {
        assert_eq!(TestSettings::new(0, 180, 50), Err(SettingsError::InvalidQuestionCount));
        assert_eq!(TestSettings::new(25, 5, 50), Err(SettingsError::InvalidDuration));
        assert_eq!(
            TestSettings::new(25, 180, 0),
            Err(SettingsError::InvalidUniquenessAttempts)
        );
    }

    #[test]
    fn deserialize_fills_missing_fields_and_validates() {
        let settings: TestSettings = serde_json::from_str(r#"{"question_count": 10}"#).unwrap();
        assert_eq!(settings.question_count(), 10);
        assert_eq!(settings.duration_secs(), TestSettings::DURATION_SECS);

        assert!(serde_json::from_str::<TestSettings>(r#"{"duration_secs": 1}"#).is_err());
    }
}
