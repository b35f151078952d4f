use std::collections::HashSet;
use std::sync::Arc;

use drill_core::model::{Level, Operation, Question, QuestionKind, Value};
use drill_core::params::{
    FallbackParameters, FractionLevelParams, IntegerLevelParams, ParamTable, ParameterSource,
    ParamsError,
};
use drill_services::QuestionEngine;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn integers(question: &Question) -> (i64, i64) {
    match question.operands() {
        [Value::Integer(a), Value::Integer(b)] => (*a, *b),
        other => panic!("expected integer operands, got {other:?}"),
    }
}

/// Same integer record at every level, no fraction records.
struct SingleRecord(IntegerLevelParams);

impl ParameterSource for SingleRecord {
    fn integer_params(&self, level: Level) -> Result<IntegerLevelParams, ParamsError> {
        Ok(IntegerLevelParams {
            level: level.value(),
            ..self.0
        })
    }

    fn fraction_params(&self, level: Level) -> Result<FractionLevelParams, ParamsError> {
        Err(ParamsError::NotFound {
            table: ParamTable::Fraction,
            level: level.value(),
        })
    }
}

fn addition_only(min: i64, max: i64) -> IntegerLevelParams {
    IntegerLevelParams {
        level: 1,
        addition_threshold: 1.0,
        subtraction_threshold: 1.0,
        multiplication_threshold: 1.0,
        addition_min: min,
        addition_max: max,
        difference_min: min,
        difference_max: max,
        mult_factor_min: min,
        mult_factor_max: max,
        div_factor_min: 1,
        div_factor_max: 1,
        div_factor_extra: 1,
    }
}

#[test]
fn integer_operands_stay_in_level_ranges() {
    init_tracing();
    let engine = QuestionEngine::default();
    let mut rng = ChaCha8Rng::seed_from_u64(2024);

    for n in 1..=20 {
        let level = Level::new(n).unwrap();
        let params = FallbackParameters::integer(level);

        for _ in 0..1_000 {
            let q = engine.generate_question(level, &mut rng).unwrap();
            if q.kind() == QuestionKind::Fraction {
                assert!(level.uses_fractions(), "{q:?}");
                continue;
            }
            let (a, b) = integers(&q);
            match q.operation() {
                Operation::Add => {
                    let range = params.addition_min..=params.addition_max;
                    assert!(range.contains(&a) && range.contains(&b), "{q:?}");
                    assert!(a != 0 && b != 0);
                }
                Operation::Subtract => {
                    let range = params.difference_min..=params.difference_max;
                    assert!(range.contains(&b), "{q:?}");
                    if level.uses_signed_numbers() {
                        assert!(range.contains(&a), "{q:?}");
                    } else {
                        // (answer + b) - b with the answer drawn from the range
                        assert!(range.contains(&(a - b)), "{q:?}");
                    }
                }
                Operation::Multiply => {
                    let range = params.mult_factor_min..=params.mult_factor_max;
                    assert!(range.contains(&a) && range.contains(&b), "{q:?}");
                }
                Operation::Divide => {
                    assert_ne!(b, 0);
                    assert_eq!(a % b, 0, "{q:?}");
                }
            }
        }
    }
}

#[test]
fn every_division_comes_out_even() {
    let engine = QuestionEngine::default();
    let mut rng = ChaCha8Rng::seed_from_u64(77);

    for n in 1..=20 {
        let level = Level::new(n).unwrap();
        for _ in 0..300 {
            let q = engine.generate_question(level, &mut rng).unwrap();
            if q.kind() == QuestionKind::Integer && q.operation() == Operation::Divide {
                let (dividend, divisor) = integers(&q);
                assert_eq!(dividend % divisor, 0);
                assert_eq!(q.raw_answer(), Value::Integer(dividend / divisor));
            }
        }
    }
}

#[test]
fn fraction_operands_are_proper_and_answers_reduced() {
    let engine = QuestionEngine::default();
    let mut rng = ChaCha8Rng::seed_from_u64(31);
    let mut fractions = 0;

    for n in 11..=20 {
        let level = Level::new(n).unwrap();
        let numerator_max = FallbackParameters::fraction(level).unwrap().numerator_max;
        for _ in 0..300 {
            let q = engine.generate_question(level, &mut rng).unwrap();
            if q.kind() != QuestionKind::Fraction {
                continue;
            }
            fractions += 1;
            for operand in q.operands() {
                let Value::Fraction(r) = operand else {
                    panic!("fraction question with integer operand: {q:?}");
                };
                assert!(r.numerator() > 0 && r.denominator() > r.numerator());
                assert!(r.denominator() <= 2 * numerator_max);
            }
            let expected = q
                .operation()
                .apply(q.operands()[0].as_rational(), q.operands()[1].as_rational())
                .unwrap();
            assert_eq!(q.correct_answer(), expected.to_string());
        }
    }
    assert!(fractions > 0);
}

#[test]
fn permissive_table_yields_distinct_batch() {
    let engine = QuestionEngine::new(Arc::new(SingleRecord(addition_only(-1_000, 1_000))));
    let mut rng = ChaCha8Rng::seed_from_u64(8);

    let batch = engine.generate_batch(Level::new(3).unwrap(), 25, &mut rng).unwrap();
    assert_eq!(batch.questions().len(), 25);
    assert!(!batch.duplicates_allowed());

    let keys: HashSet<String> = batch.questions().iter().map(Question::canonical_key).collect();
    assert_eq!(keys.len(), 25);
}

#[test]
fn exhausted_table_fills_with_duplicates() {
    init_tracing();
    // Only `1 + 1` exists.
    let engine = QuestionEngine::new(Arc::new(SingleRecord(addition_only(1, 1))));
    let mut rng = ChaCha8Rng::seed_from_u64(4);

    let batch = engine.generate_batch(Level::MIN, 25, &mut rng).unwrap();
    assert_eq!(batch.questions().len(), 25);
    assert_eq!(batch.unique_count(), 1);
    assert_eq!(batch.attempts(), 25 * 50);
    assert!(batch.duplicates_allowed());
    assert!(batch.questions().iter().all(|q| q.canonical_key() == "add:1,1"));
}

#[test]
fn test_questions_are_always_full_length() {
    let engine = QuestionEngine::new(Arc::new(SingleRecord(addition_only(1, 2))));
    for n in [1, 10, 11, 20] {
        let questions = engine.generate_test_questions(Level::new(n).unwrap()).unwrap();
        assert_eq!(questions.len(), 25);
    }
}
