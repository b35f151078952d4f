//! Per-level tuning records for question generation.
//!
//! Integer records cover levels 1–20; fraction records cover levels 11–20 and
//! are consulted first for those levels. A [`ParameterSource`] hands records to
//! the generator; [`FallbackParameters`] is the compiled-in default and
//! [`ParameterTable`] wraps an externally configured document.

mod fallback;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

use crate::model::{Level, Operation};

pub use fallback::{
    FALLBACK_FRACTION_LEVELS, FALLBACK_INTEGER_LEVELS, FallbackParameters,
    PARAMETER_TABLE_VERSION,
};

/// First level that has a fraction record.
pub const FIRST_FRACTION_LEVEL: u8 = 11;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamTable {
    Integer,
    Fraction,
}

impl fmt::Display for ParamTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamTable::Integer => f.write_str("integer"),
            ParamTable::Fraction => f.write_str("fraction"),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum ParamsError {
    #[error("no {table} parameters for level {level}")]
    NotFound { table: ParamTable, level: u8 },

    #[error("{table} parameters list level {level}, which is outside the table")]
    LevelOutOfRange { table: ParamTable, level: u8 },

    #[error("{table} parameters list level {level} more than once")]
    DuplicateLevel { table: ParamTable, level: u8 },

    #[error("level {level} thresholds must satisfy 0 <= add <= sub <= mul <= 1, got {add}, {sub}, {mul}")]
    InvalidThresholds { level: u8, add: f64, sub: f64, mul: f64 },

    #[error("level {level} integer-question threshold must be in [0, 1], got {provided}")]
    InvalidIntegerShare { level: u8, provided: f64 },

    #[error("level {level} range `{field}` has min {min} > max {max}")]
    InvalidRange { level: u8, field: &'static str, min: i64, max: i64 },

    #[error("level {level} field `{field}` must be > 0, got {provided}")]
    NonPositive { level: u8, field: &'static str, provided: i64 },

    #[error("level {level} field `{field}` must be non-zero")]
    ZeroMultiplier { level: u8, field: &'static str },
}

//
// ─── OPERATION DISTRIBUTION ────────────────────────────────────────────────────
//

/// Cumulative operation distribution: `[0, add)` → add, `[add, sub)` → subtract,
/// `[sub, mul)` → multiply, `[mul, 1)` → divide.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OperationThresholds {
    add: f64,
    sub: f64,
    mul: f64,
}

impl OperationThresholds {
    /// # Errors
    ///
    /// Returns `ParamsError::InvalidThresholds` unless `0 <= add <= sub <= mul <= 1`.
    pub fn new(level: u8, add: f64, sub: f64, mul: f64) -> Result<Self, ParamsError> {
        let ordered = 0.0 <= add && add <= sub && sub <= mul && mul <= 1.0;
        if !ordered {
            return Err(ParamsError::InvalidThresholds { level, add, sub, mul });
        }
        Ok(Self { add, sub, mul })
    }

    /// Pick the operation for a uniform draw `x` in `[0, 1)`.
    #[must_use]
    pub fn select(&self, x: f64) -> Operation {
        if x < self.add {
            Operation::Add
        } else if x < self.sub {
            Operation::Subtract
        } else if x < self.mul {
            Operation::Multiply
        } else {
            Operation::Divide
        }
    }
}

//
// ─── RECORDS ───────────────────────────────────────────────────────────────────
//

/// Integer-question parameters for one level.
///
/// Field names match the external configuration document.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntegerLevelParams {
    pub level: u8,
    pub addition_threshold: f64,
    pub subtraction_threshold: f64,
    pub multiplication_threshold: f64,
    pub addition_min: i64,
    pub addition_max: i64,
    pub difference_min: i64,
    pub difference_max: i64,
    pub mult_factor_min: i64,
    pub mult_factor_max: i64,
    pub div_factor_min: i64,
    pub div_factor_max: i64,
    pub div_factor_extra: i64,
}

impl IntegerLevelParams {
    /// # Errors
    ///
    /// Returns `ParamsError::InvalidThresholds` for a malformed record.
    pub fn operations(&self) -> Result<OperationThresholds, ParamsError> {
        OperationThresholds::new(
            self.level,
            self.addition_threshold,
            self.subtraction_threshold,
            self.multiplication_threshold,
        )
    }

    /// Check every invariant of the record.
    ///
    /// # Errors
    ///
    /// Returns the first `ParamsError` found.
    pub fn validate(&self) -> Result<(), ParamsError> {
        self.operations()?;
        let ranges = [
            ("addition", self.addition_min, self.addition_max),
            ("difference", self.difference_min, self.difference_max),
            ("mult_factor", self.mult_factor_min, self.mult_factor_max),
            ("div_factor", self.div_factor_min, self.div_factor_max),
        ];
        for (field, min, max) in ranges {
            if min > max {
                return Err(ParamsError::InvalidRange {
                    level: self.level,
                    field,
                    min,
                    max,
                });
            }
        }
        // The division base is drawn from [1, div_factor_max].
        if self.div_factor_max < 1 {
            return Err(ParamsError::NonPositive {
                level: self.level,
                field: "div_factor_max",
                provided: self.div_factor_max,
            });
        }
        if self.div_factor_extra == 0 {
            return Err(ParamsError::ZeroMultiplier {
                level: self.level,
                field: "div_factor_extra",
            });
        }
        Ok(())
    }
}

/// Fraction-question parameters for one level above 10.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FractionLevelParams {
    pub level: u8,
    /// Draws below this value produce an integer question instead.
    pub integer_operation_threshold: f64,
    pub addition_threshold: f64,
    pub subtraction_threshold: f64,
    pub multiplication_threshold: f64,
    pub numerator_max: i64,
}

impl FractionLevelParams {
    /// # Errors
    ///
    /// Returns `ParamsError::InvalidThresholds` for a malformed record.
    pub fn operations(&self) -> Result<OperationThresholds, ParamsError> {
        OperationThresholds::new(
            self.level,
            self.addition_threshold,
            self.subtraction_threshold,
            self.multiplication_threshold,
        )
    }

    /// # Errors
    ///
    /// Returns the first `ParamsError` found.
    pub fn validate(&self) -> Result<(), ParamsError> {
        if !(0.0..=1.0).contains(&self.integer_operation_threshold) {
            return Err(ParamsError::InvalidIntegerShare {
                level: self.level,
                provided: self.integer_operation_threshold,
            });
        }
        self.operations()?;
        if self.numerator_max < 1 {
            return Err(ParamsError::NonPositive {
                level: self.level,
                field: "numerator_max",
                provided: self.numerator_max,
            });
        }
        Ok(())
    }
}

//
// ─── SOURCE ────────────────────────────────────────────────────────────────────
//

/// Lookup of level parameters, injected into the question engine.
pub trait ParameterSource: Send + Sync {
    /// Integer record for any level 1–20.
    ///
    /// # Errors
    ///
    /// Returns `ParamsError::NotFound` if the source has no record for `level`.
    fn integer_params(&self, level: Level) -> Result<IntegerLevelParams, ParamsError>;

    /// Fraction record for levels 11–20.
    ///
    /// # Errors
    ///
    /// Returns `ParamsError::NotFound` if the source has no record for `level`.
    fn fraction_params(&self, level: Level) -> Result<FractionLevelParams, ParamsError>;
}

/// Level parameters as stored in the external configuration document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestConfig {
    #[serde(default)]
    pub integer_levels: Vec<IntegerLevelParams>,
    #[serde(default)]
    pub fraction_levels: Vec<FractionLevelParams>,
}

/// Validated, level-indexed parameter table.
///
/// Levels absent from the configuration are reported as `NotFound` on lookup so
/// the engine can substitute the compiled-in record.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterTable {
    integer: BTreeMap<u8, IntegerLevelParams>,
    fraction: BTreeMap<u8, FractionLevelParams>,
}

impl ParameterTable {
    /// Validate a configuration document.
    ///
    /// # Errors
    ///
    /// Returns `ParamsError` for out-of-range or duplicate levels and for any
    /// record that fails validation.
    pub fn from_config(config: TestConfig) -> Result<Self, ParamsError> {
        let mut integer = BTreeMap::new();
        for record in config.integer_levels {
            if Level::new(i64::from(record.level)).is_err() {
                return Err(ParamsError::LevelOutOfRange {
                    table: ParamTable::Integer,
                    level: record.level,
                });
            }
            record.validate()?;
            if integer.insert(record.level, record).is_some() {
                return Err(ParamsError::DuplicateLevel {
                    table: ParamTable::Integer,
                    level: record.level,
                });
            }
        }

        let mut fraction = BTreeMap::new();
        for record in config.fraction_levels {
            if !(FIRST_FRACTION_LEVEL..=Level::MAX.value()).contains(&record.level) {
                return Err(ParamsError::LevelOutOfRange {
                    table: ParamTable::Fraction,
                    level: record.level,
                });
            }
            record.validate()?;
            if fraction.insert(record.level, record).is_some() {
                return Err(ParamsError::DuplicateLevel {
                    table: ParamTable::Fraction,
                    level: record.level,
                });
            }
        }

        Ok(Self { integer, fraction })
    }

    /// Table holding exactly the compiled-in records.
    #[must_use]
    pub fn fallback() -> Self {
        Self {
            integer: FALLBACK_INTEGER_LEVELS.iter().map(|p| (p.level, *p)).collect(),
            fraction: FALLBACK_FRACTION_LEVELS.iter().map(|p| (p.level, *p)).collect(),
        }
    }

    /// Records that lookups would report as `NotFound`.
    #[must_use]
    pub fn missing_levels(&self) -> Vec<(ParamTable, u8)> {
        let mut missing = Vec::new();
        for level in Level::MIN.value()..=Level::MAX.value() {
            if !self.integer.contains_key(&level) {
                missing.push((ParamTable::Integer, level));
            }
            if level >= FIRST_FRACTION_LEVEL && !self.fraction.contains_key(&level) {
                missing.push((ParamTable::Fraction, level));
            }
        }
        missing
    }

    /// Convert back into the document shape, ordered by level.
    #[must_use]
    pub fn to_config(&self) -> TestConfig {
        TestConfig {
            integer_levels: self.integer.values().copied().collect(),
            fraction_levels: self.fraction.values().copied().collect(),
        }
    }
}

impl ParameterSource for ParameterTable {
    fn integer_params(&self, level: Level) -> Result<IntegerLevelParams, ParamsError> {
        self.integer
            .get(&level.value())
            .copied()
            .ok_or(ParamsError::NotFound {
                table: ParamTable::Integer,
                level: level.value(),
            })
    }

    fn fraction_params(&self, level: Level) -> Result<FractionLevelParams, ParamsError> {
        self.fraction
            .get(&level.value())
            .copied()
            .ok_or(ParamsError::NotFound {
                table: ParamTable::Fraction,
                level: level.value(),
            })
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
