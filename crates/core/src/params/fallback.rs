use crate::model::Level;

use super::{
    FIRST_FRACTION_LEVEL, FractionLevelParams, IntegerLevelParams, ParamTable, ParameterSource,
    ParamsError,
};

/// Version of the compiled-in tables. Bump together with the external
/// configuration document whenever a value changes.
pub const PARAMETER_TABLE_VERSION: u32 = 1;

const fn int(
    level: u8,
    thresholds: [f64; 3],
    addition: (i64, i64),
    difference: (i64, i64),
    mult_factor: (i64, i64),
    div_factor: (i64, i64),
    div_factor_extra: i64,
) -> IntegerLevelParams {
    IntegerLevelParams {
        level,
        addition_threshold: thresholds[0],
        subtraction_threshold: thresholds[1],
        multiplication_threshold: thresholds[2],
        addition_min: addition.0,
        addition_max: addition.1,
        difference_min: difference.0,
        difference_max: difference.1,
        mult_factor_min: mult_factor.0,
        mult_factor_max: mult_factor.1,
        div_factor_min: div_factor.0,
        div_factor_max: div_factor.1,
        div_factor_extra,
    }
}

const fn frac(level: u8, integer_share: f64, thresholds: [f64; 3], numerator_max: i64) -> FractionLevelParams {
    FractionLevelParams {
        level,
        integer_operation_threshold: integer_share,
        addition_threshold: thresholds[0],
        subtraction_threshold: thresholds[1],
        multiplication_threshold: thresholds[2],
        numerator_max,
    }
}

/// Integer parameters for levels 1–20, indexed by `level - 1`.
#[rustfmt::skip]
pub const FALLBACK_INTEGER_LEVELS: [IntegerLevelParams; 20] = [
    //   level  add / sub / mul thresholds   addition    difference  mult factor  div factor  extra
    int( 1, [0.6, 0.8, 0.95], (0, 25), (0, 12), (1, 9), (1, 5), 2),
    int( 2, [0.4, 0.75, 0.95], (0, 25), (0, 12), (1, 9), (1, 5), 2),
    int( 3, [0.4, 0.7, 0.9], (0, 25), (0, 12), (1, 9), (1, 5), 2),
    int( 4, [0.35, 0.6, 0.8], (0, 35), (0, 17), (1, 12), (1, 9), 1),
    int( 5, [0.25, 0.5, 0.75], (0, 35), (0, 17), (1, 12), (1, 9), 1),
    int( 6, [0.6, 0.8, 0.95], (-25, 25), (-12, 12), (-9, 9), (-9, 9), 1),
    int( 7, [0.45, 0.75, 0.95], (-25, 25), (-12, 12), (-9, 9), (-9, 9), 1),
    int( 8, [0.4, 0.7, 0.9], (-35, 35), (-20, 20), (-12, 12), (-9, 9), 1),
    int( 9, [0.35, 0.6, 0.8], (-40, 40), (-25, 25), (-12, 12), (-9, 9), 1),
    int(10, [0.25, 0.5, 0.75], (-45, 45), (-25, 25), (-15, 15), (-9, 9), 1),
    int(11, [0.25, 0.5, 0.75], (-50, 50), (-30, 30), (-15, 15), (-12, 12), 1),
    int(12, [0.25, 0.5, 0.75], (-50, 50), (-30, 30), (-15, 15), (-12, 12), 1),
    int(13, [0.25, 0.5, 0.75], (-55, 55), (-35, 35), (-15, 15), (-12, 12), 1),
    int(14, [0.25, 0.5, 0.75], (-55, 55), (-35, 35), (-15, 15), (-12, 12), 1),
    int(15, [0.25, 0.5, 0.75], (-60, 60), (-40, 40), (-15, 15), (-12, 12), 1),
    int(16, [0.25, 0.5, 0.75], (-60, 60), (-40, 40), (-15, 15), (-12, 12), 1),
    int(17, [0.25, 0.5, 0.75], (-65, 65), (-55, 55), (-15, 15), (-12, 12), 1),
    int(18, [0.25, 0.5, 0.75], (-70, 70), (-60, 60), (-20, 20), (-15, 15), 1),
    int(19, [0.25, 0.5, 0.75], (-70, 70), (-60, 60), (-20, 20), (-15, 15), 1),
    int(20, [0.25, 0.5, 0.75], (-75, 75), (-65, 65), (-20, 20), (-15, 15), 1),
];

/// Fraction parameters for levels 11–20, indexed by `level - 11`.
#[rustfmt::skip]
pub const FALLBACK_FRACTION_LEVELS: [FractionLevelParams; 10] = [
    //    level  integer share  add / sub / mul thresholds  numerator max
    frac(11, 0.8, [0.15, 0.3, 0.8], 5),
    frac(12, 0.8, [0.2, 0.35, 0.75], 5),
    frac(13, 0.75, [0.2, 0.35, 0.75], 6),
    frac(14, 0.75, [0.25, 0.5, 0.75], 6),
    frac(15, 0.7, [0.25, 0.5, 0.75], 7),
    frac(16, 0.7, [0.25, 0.5, 0.75], 8),
    frac(17, 0.65, [0.25, 0.5, 0.75], 9),
    frac(18, 0.65, [0.3, 0.6, 0.8], 10),
    frac(19, 0.6, [0.3, 0.6, 0.8], 12),
    frac(20, 0.6, [0.35, 0.7, 0.8], 15),
];

/// Compiled-in parameter source; always has a record for every valid level.
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackParameters;

impl FallbackParameters {
    #[must_use]
    pub fn integer(level: Level) -> IntegerLevelParams {
        // Level is 1..=20 and the table has 20 rows.
        let index = level.offset_from(Level::MIN).unwrap_or(0);
        FALLBACK_INTEGER_LEVELS[index.min(FALLBACK_INTEGER_LEVELS.len() - 1)]
    }

    /// Fraction record for `level`, or `None` for levels 1–10.
    #[must_use]
    pub fn fraction(level: Level) -> Option<FractionLevelParams> {
        let first = Level::new(i64::from(FIRST_FRACTION_LEVEL)).ok()?;
        let index = level.offset_from(first)?;
        FALLBACK_FRACTION_LEVELS.get(index).copied()
    }
}

impl ParameterSource for FallbackParameters {
    fn integer_params(&self, level: Level) -> Result<IntegerLevelParams, ParamsError> {
        Ok(Self::integer(level))
    }

    fn fraction_params(&self, level: Level) -> Result<FractionLevelParams, ParamsError> {
        Self::fraction(level).ok_or(ParamsError::NotFound {
            table: ParamTable::Fraction,
            level: level.value(),
        })
    }
}
