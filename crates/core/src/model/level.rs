use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LevelError {
    #[error("level must be between {min} and {max}, got {provided}")]
    OutOfRange { provided: i64, min: u8, max: u8 },
}

/// Difficulty level of a learner, always within `1..=20`.
///
/// Levels up to [`Level::LAST_INTEGER_ONLY`] draw integer questions only;
/// higher levels mix in fraction questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Level(u8);

impl Level {
    pub const MIN: Level = Level(1);
    pub const MAX: Level = Level(20);
    pub const LAST_INTEGER_ONLY: Level = Level(10);
    pub const LAST_UNSIGNED: Level = Level(5);

    /// # Errors
    ///
    /// Returns `LevelError::OutOfRange` if `value` is outside `1..=20`.
    pub fn new(value: i64) -> Result<Self, LevelError> {
        match u8::try_from(value) {
            Ok(raw) if (Self::MIN.0..=Self::MAX.0).contains(&raw) => Ok(Self(raw)),
            _ => Err(LevelError::OutOfRange {
                provided: value,
                min: Self::MIN.0,
                max: Self::MAX.0,
            }),
        }
    }

    #[must_use]
    pub fn value(self) -> u8 {
        self.0
    }

    /// True for levels above 10, which may produce fraction questions.
    #[must_use]
    pub fn uses_fractions(self) -> bool {
        self > Self::LAST_INTEGER_ONLY
    }

    /// True from level 6 on: negative operands, signed subtraction results,
    /// and negative divisors.
    #[must_use]
    pub fn uses_signed_numbers(self) -> bool {
        self > Self::LAST_UNSIGNED
    }

    /// Raise the level by `steps`, stopping at [`Level::MAX`].
    #[must_use]
    pub fn raised_by(self, steps: u8) -> Self {
        Self(self.0.saturating_add(steps).min(Self::MAX.0))
    }

    /// Zero-based position of this level in a table covering `first..=20`.
    pub(crate) fn offset_from(self, first: Level) -> Option<usize> {
        self.0.checked_sub(first.0).map(usize::from)
    }
}

impl Default for Level {
    fn default() -> Self {
        Self::MIN
    }
}

impl TryFrom<i64> for Level {
    type Error = LevelError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Level> for u8 {
    fn from(level: Level) -> Self {
        level.0
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
