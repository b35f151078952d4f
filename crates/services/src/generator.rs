use std::sync::Arc;

use rand::Rng;

use drill_core::model::{Level, Operation, Question};
use drill_core::params::{
    FallbackParameters, FractionLevelParams, IntegerLevelParams, OperationThresholds,
    ParamsError, ParameterSource,
};
use drill_core::rational::{Rational, RationalError};
use drill_core::settings::TestSettings;

use crate::error::GenerationError;

/// Chance of a negative divisor once a level allows negative numbers.
const NEGATIVE_DIVISOR_PROBABILITY: f64 = 0.45;

//
// ─── ENGINE ────────────────────────────────────────────────────────────────────
//

/// Generates questions for a level from an injected parameter source.
///
/// Levels the source has no record for are served from the compiled-in
/// tables, with a warning.
#[derive(Clone)]
pub struct QuestionEngine {
    params: Arc<dyn ParameterSource>,
    settings: TestSettings,
}

impl QuestionEngine {
    #[must_use]
    pub fn new(params: Arc<dyn ParameterSource>) -> Self {
        Self {
            params,
            settings: TestSettings::default(),
        }
    }

    #[must_use]
    pub fn with_settings(mut self, settings: TestSettings) -> Self {
        self.settings = settings;
        self
    }

    #[must_use]
    pub fn settings(&self) -> &TestSettings {
        &self.settings
    }

    /// Generate one question for `level`.
    ///
    /// Levels above 10 first draw against the fraction record's integer share;
    /// a draw at or above it yields a fraction question, anything below falls
    /// through to the integer record.
    ///
    /// # Errors
    ///
    /// Returns `GenerationError::Params` if the source hands back a malformed
    /// record, or `GenerationError::Rational` if an answer cannot be computed.
    pub fn generate_question<R: Rng>(
        &self,
        level: Level,
        rng: &mut R,
    ) -> Result<Question, GenerationError> {
        if level.uses_fractions() {
            let fraction = self.fraction_params(level)?;
            let x: f64 = rng.random();
            if x >= fraction.integer_operation_threshold {
                let question = fraction_question(&fraction, rng)?;
                tracing::debug!(%level, key = %question.canonical_key(), "generated fraction question");
                return Ok(question);
            }
        }

        let params = self.integer_params(level)?;
        let question = integer_question(level, &params, rng)?;
        tracing::debug!(%level, key = %question.canonical_key(), "generated integer question");
        Ok(question)
    }

    fn integer_params(&self, level: Level) -> Result<IntegerLevelParams, GenerationError> {
        let params = match self.params.integer_params(level) {
            Ok(params) => params,
            Err(ParamsError::NotFound { table, .. }) => {
                tracing::warn!(%level, %table, "parameters missing, using compiled-in record");
                FallbackParameters::integer(level)
            }
            Err(err) => return Err(err.into()),
        };
        params.validate()?;
        Ok(params)
    }

    fn fraction_params(&self, level: Level) -> Result<FractionLevelParams, GenerationError> {
        let params = match self.params.fraction_params(level) {
            Ok(params) => params,
            Err(err @ ParamsError::NotFound { table, .. }) => {
                tracing::warn!(%level, %table, "parameters missing, using compiled-in record");
                FallbackParameters::fraction(level).ok_or(err)?
            }
            Err(err) => return Err(err.into()),
        };
        params.validate()?;
        Ok(params)
    }
}

impl Default for QuestionEngine {
    fn default() -> Self {
        Self::new(Arc::new(FallbackParameters))
    }
}

impl std::fmt::Debug for QuestionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuestionEngine")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

//
// ─── INTEGER QUESTIONS ─────────────────────────────────────────────────────────
//

fn integer_question<R: Rng>(
    level: Level,
    params: &IntegerLevelParams,
    rng: &mut R,
) -> Result<Question, GenerationError> {
    let operation = sample_operation(&params.operations()?, rng);

    let question = match operation {
        Operation::Add => {
            let left = draw_nonzero(rng, params.addition_min, params.addition_max);
            let right = draw_nonzero(rng, params.addition_min, params.addition_max);
            Question::integer(Operation::Add, left, right)?
        }
        Operation::Subtract => {
            let first = draw_nonzero(rng, params.difference_min, params.difference_max);
            let second = draw_nonzero(rng, params.difference_min, params.difference_max);
            if level.uses_signed_numbers() {
                Question::integer(Operation::Subtract, first, second)?
            } else {
                // Shown as `(a + b) - b` so the answer is `a`.
                let minuend = first.checked_add(second).ok_or(RationalError::Overflow)?;
                Question::integer_with_answer(Operation::Subtract, minuend, second, first)
            }
        }
        Operation::Multiply => {
            let left = draw(rng, params.mult_factor_min, params.mult_factor_max);
            let right = draw(rng, params.mult_factor_min, params.mult_factor_max);
            Question::integer(Operation::Multiply, left, right)?
        }
        Operation::Divide => {
            let (dividend, divisor) = even_division(level, params, rng)?;
            Question::integer(Operation::Divide, dividend, divisor)?
        }
    };

    Ok(question)
}

/// Dividend and divisor with a whole quotient of `extra * factor * sign`.
fn even_division<R: Rng>(
    level: Level,
    params: &IntegerLevelParams,
    rng: &mut R,
) -> Result<(i64, i64), RationalError> {
    let sign = if level.uses_signed_numbers() && rng.random_bool(NEGATIVE_DIVISOR_PROBABILITY) {
        -1
    } else {
        1
    };
    let base = draw(rng, 1, params.div_factor_max);
    let factor = draw(rng, params.div_factor_min, params.div_factor_max);

    let dividend = base
        .checked_mul(params.div_factor_extra)
        .and_then(|v| v.checked_mul(factor))
        .ok_or(RationalError::Overflow)?;
    Ok((dividend, base * sign))
}

//
// ─── FRACTION QUESTIONS ────────────────────────────────────────────────────────
//

fn fraction_question<R: Rng>(
    params: &FractionLevelParams,
    rng: &mut R,
) -> Result<Question, GenerationError> {
    let operation = sample_operation(&params.operations()?, rng);
    let left = draw_proper_fraction(rng, params.numerator_max)?;
    let right = draw_proper_fraction(rng, params.numerator_max)?;
    Ok(Question::fraction(operation, left, right)?)
}

/// Fraction with numerator in `[1, max]` and denominator `numerator + [1, max]`.
fn draw_proper_fraction<R: Rng>(rng: &mut R, numerator_max: i64) -> Result<Rational, RationalError> {
    let numerator = draw(rng, 1, numerator_max);
    let denominator = numerator
        .checked_add(draw(rng, 1, numerator_max))
        .ok_or(RationalError::Overflow)?;
    Rational::new(numerator, denominator)
}

//
// ─── DRAWS ─────────────────────────────────────────────────────────────────────
//

fn sample_operation<R: Rng>(thresholds: &OperationThresholds, rng: &mut R) -> Operation {
    thresholds.select(rng.random())
}

/// Uniform integer in `[min, max]`. Callers guarantee `min <= max`.
fn draw<R: Rng>(rng: &mut R, min: i64, max: i64) -> i64 {
    rng.random_range(min..=max)
}

/// Uniform integer in `[min, max]` excluding zero, unless zero is the only value.
fn draw_nonzero<R: Rng>(rng: &mut R, min: i64, max: i64) -> i64 {
    if min > 0 || max < 0 || (min == 0 && max == 0) {
        return draw(rng, min, max);
    }
    // Zero is in range: draw from one fewer slot and step over it.
    let value = draw(rng, min, max - 1);
    if value >= 0 { value + 1 } else { value }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drill_core::model::{QuestionKind, Value};
    use drill_core::params::{FALLBACK_FRACTION_LEVELS, FALLBACK_INTEGER_LEVELS, ParameterTable, TestConfig};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn level(n: i64) -> Level {
        Level::new(n).unwrap()
    }

    fn ints(question: &Question) -> (i64, i64) {
        match question.operands() {
            [Value::Integer(a), Value::Integer(b)] => (*a, *b),
            other => panic!("expected integer operands, got {other:?}"),
        }
    }

    #[test]
    fn draw_nonzero_skips_zero_when_range_allows() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..2_000 {
            let v = draw_nonzero(&mut rng, -2, 2);
            assert!((-2..=2).contains(&v));
            assert_ne!(v, 0);
        }
        for _ in 0..200 {
            let v = draw_nonzero(&mut rng, 0, 1);
            assert_eq!(v, 1);
        }
        for _ in 0..200 {
            assert_eq!(draw_nonzero(&mut rng, -1, 0), -1);
        }
    }

    #[test]
    fn draw_nonzero_allows_zero_only_range() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        assert_eq!(draw_nonzero(&mut rng, 0, 0), 0);
    }

    #[test]
    fn draw_nonzero_reaches_both_ends() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let seen: std::collections::HashSet<i64> =
            (0..2_000).map(|_| draw_nonzero(&mut rng, -3, 3)).collect();
        assert_eq!(seen.len(), 6);
    }

    #[test]
    fn early_subtraction_never_goes_negative() {
        let mut params = FALLBACK_INTEGER_LEVELS[2];
        // Force subtraction.
        params.addition_threshold = 0.0;
        params.subtraction_threshold = 1.0;
        params.multiplication_threshold = 1.0;

        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..500 {
            let q = integer_question(level(3), &params, &mut rng).unwrap();
            let (minuend, subtrahend) = ints(&q);
            assert_eq!(q.operation(), Operation::Subtract);
            assert!(minuend >= subtrahend);
            assert_eq!(q.raw_answer(), Value::Integer(minuend - subtrahend));
            assert!((1..=12).contains(&(minuend - subtrahend)));
        }
    }

    #[test]
    fn divisions_always_come_out_even() {
        let mut params = FALLBACK_INTEGER_LEVELS[9];
        params.addition_threshold = 0.0;
        params.subtraction_threshold = 0.0;
        params.multiplication_threshold = 0.0;

        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut negative_divisors = 0;
        for _ in 0..500 {
            let q = integer_question(level(10), &params, &mut rng).unwrap();
            let (dividend, divisor) = ints(&q);
            assert_ne!(divisor, 0);
            assert_eq!(dividend % divisor, 0);
            assert_eq!(q.raw_answer(), Value::Integer(dividend / divisor));
            if divisor < 0 {
                negative_divisors += 1;
            }
        }
        assert!(negative_divisors > 0);
    }

    #[test]
    fn low_levels_keep_divisors_positive() {
        let mut params = FALLBACK_INTEGER_LEVELS[0];
        params.multiplication_threshold = 0.0;
        params.subtraction_threshold = 0.0;
        params.addition_threshold = 0.0;

        let mut rng = ChaCha8Rng::seed_from_u64(9);
        for _ in 0..200 {
            let q = integer_question(level(1), &params, &mut rng).unwrap();
            let (dividend, divisor) = ints(&q);
            assert!(divisor > 0);
            // extra = 2 at level 1
            assert_eq!(dividend % (2 * divisor), 0);
        }
    }

    #[test]
    fn fraction_operands_are_proper() {
        let params = FALLBACK_FRACTION_LEVELS[9];
        let mut rng = ChaCha8Rng::seed_from_u64(13);
        for _ in 0..500 {
            let q = fraction_question(&params, &mut rng).unwrap();
            assert_eq!(q.kind(), QuestionKind::Fraction);
            for operand in q.operands() {
                let Value::Fraction(r) = operand else {
                    panic!("expected fraction operand");
                };
                assert!(r.numerator() > 0);
                assert!(r.denominator() > r.numerator());
            }
        }
    }

    #[test]
    fn integer_only_share_yields_integer_questions() {
        let mut fraction = FALLBACK_FRACTION_LEVELS[0];
        fraction.integer_operation_threshold = 1.0;
        let config = TestConfig {
            integer_levels: FALLBACK_INTEGER_LEVELS.to_vec(),
            fraction_levels: vec![fraction],
        };
        let engine = QuestionEngine::new(Arc::new(ParameterTable::from_config(config).unwrap()));

        let mut rng = ChaCha8Rng::seed_from_u64(17);
        for _ in 0..200 {
            let q = engine.generate_question(level(11), &mut rng).unwrap();
            assert_eq!(q.kind(), QuestionKind::Integer);
        }
    }

    #[test]
    fn missing_records_fall_back_to_compiled_tables() {
        let engine = QuestionEngine::new(Arc::new(ParameterTable::from_config(TestConfig::default()).unwrap()));

        let mut rng = ChaCha8Rng::seed_from_u64(19);
        for n in [1, 6, 11, 20] {
            engine.generate_question(level(n), &mut rng).unwrap();
        }
    }

    struct BrokenSource;

    impl ParameterSource for BrokenSource {
        fn integer_params(&self, level: Level) -> Result<IntegerLevelParams, ParamsError> {
            let mut record = FallbackParameters::integer(level);
            record.addition_min = 10;
            record.addition_max = -10;
            Ok(record)
        }

        fn fraction_params(&self, level: Level) -> Result<FractionLevelParams, ParamsError> {
            FallbackParameters.fraction_params(level)
        }
    }

    #[test]
    fn malformed_records_are_rejected_before_drawing() {
        let engine = QuestionEngine::new(Arc::new(BrokenSource));
        let mut rng = ChaCha8Rng::seed_from_u64(23);
        let err = engine.generate_question(level(4), &mut rng).unwrap_err();
        assert!(matches!(
            err,
            GenerationError::Params(ParamsError::InvalidRange { field: "addition", .. })
        ));
    }
}
