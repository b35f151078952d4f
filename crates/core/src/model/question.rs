use serde::{Deserialize, Serialize};
use std::fmt;

use thiserror::Error;

use crate::model::ids::QuestionId;
use crate::rational::{Rational, RationalError};

//
// ─── OPERATION ─────────────────────────────────────────────────────────────────
//

/// Arithmetic operation of a question.
///
/// Serialized with the short tags (`add`, `sub`, `mul`, `div`) used in
/// uniqueness keys and stored attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    #[serde(rename = "add")]
    Add,
    #[serde(rename = "sub")]
    Subtract,
    #[serde(rename = "mul")]
    Multiply,
    #[serde(rename = "div")]
    Divide,
}

impl Operation {
    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            Operation::Add => "add",
            Operation::Subtract => "sub",
            Operation::Multiply => "mul",
            Operation::Divide => "div",
        }
    }

    /// Operator as rendered in question text (math markup).
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            Operation::Add => "+",
            Operation::Subtract => "-",
            Operation::Multiply => "\\times",
            Operation::Divide => "\\div",
        }
    }

    #[must_use]
    pub fn is_commutative(self) -> bool {
        matches!(self, Operation::Add | Operation::Multiply)
    }

    /// Apply the operation to two exact values.
    ///
    /// # Errors
    ///
    /// Returns `RationalError::DivisionByZero` for a zero divisor and
    /// `RationalError::Overflow` if the result does not fit.
    pub fn apply(self, left: Rational, right: Rational) -> Result<Rational, RationalError> {
        match self {
            Operation::Add => left.checked_add(right),
            Operation::Subtract => left.checked_sub(right),
            Operation::Multiply => left.checked_mul(right),
            Operation::Divide => left.checked_div(right),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

//
// ─── VALUES ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionKind {
    Integer,
    Fraction,
}

/// Operand or answer value: a plain integer or a `{num, den}` fraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Integer(i64),
    Fraction(Rational),
}

impl Value {
    #[must_use]
    pub fn as_rational(&self) -> Rational {
        match self {
            Value::Integer(n) => Rational::from_integer(*n),
            Value::Fraction(r) => *r,
        }
    }

    #[must_use]
    pub fn to_latex(&self) -> String {
        match self {
            Value::Integer(n) => n.to_string(),
            Value::Fraction(r) => r.to_latex(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(n) => write!(f, "{n}"),
            Value::Fraction(r) => write!(f, "{r}"),
        }
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// A single generated arithmetic question.
///
/// Integer questions hold integer operands and an integer answer. Fraction
/// questions hold fraction operands; their reduced answer may still be a whole
/// number, in which case it is shown and accepted as the bare integer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "QuestionDraft")]
pub struct Question {
    id: QuestionId,
    question_text: String,
    #[serde(rename = "type")]
    kind: QuestionKind,
    correct_answer: String,
    raw_answer: Value,
    #[serde(rename = "operationType")]
    operation: Operation,
    operands: [Value; 2],
}

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("{kind:?} question cannot hold operands {operands:?}")]
    KindMismatch { kind: QuestionKind, operands: [Value; 2] },

    #[error("stored {field} `{stored}` does not match the operands (expected `{expected}`)")]
    Inconsistent {
        field: &'static str,
        stored: String,
        expected: String,
    },

    #[error(transparent)]
    Rational(#[from] RationalError),
}

/// Stored shape of a question, checked against its operands on the way in.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuestionDraft {
    id: QuestionId,
    question_text: String,
    #[serde(rename = "type")]
    kind: QuestionKind,
    correct_answer: String,
    raw_answer: Value,
    #[serde(rename = "operationType")]
    operation: Operation,
    operands: [Value; 2],
}

impl TryFrom<QuestionDraft> for Question {
    type Error = QuestionError;

    fn try_from(draft: QuestionDraft) -> Result<Self, Self::Error> {
        let matches_kind = draft.operands.iter().all(|operand| {
            matches!(
                (draft.kind, operand),
                (QuestionKind::Integer, Value::Integer(_))
                    | (QuestionKind::Fraction, Value::Fraction(_))
            )
        });
        if !matches_kind {
            return Err(QuestionError::KindMismatch {
                kind: draft.kind,
                operands: draft.operands,
            });
        }

        let rebuilt = Self::build(draft.kind, draft.operation, draft.operands)?;
        if draft.raw_answer != rebuilt.raw_answer {
            return Err(QuestionError::Inconsistent {
                field: "rawAnswer",
                stored: format!("{:?}", draft.raw_answer),
                expected: format!("{:?}", rebuilt.raw_answer),
            });
        }
        let texts = [
            ("correctAnswer", draft.correct_answer, &rebuilt.correct_answer),
            ("questionText", draft.question_text, &rebuilt.question_text),
        ];
        for (field, stored, expected) in texts {
            if stored != *expected {
                return Err(QuestionError::Inconsistent {
                    field,
                    stored,
                    expected: expected.clone(),
                });
            }
        }

        Ok(Self {
            id: draft.id,
            ..rebuilt
        })
    }
}

impl Question {
    /// Build an integer question; the answer is computed from the operands.
    ///
    /// # Errors
    ///
    /// Returns `RationalError::DivisionByZero` for a zero divisor, or
    /// `RationalError::Overflow` if the answer is not representable. A division
    /// whose quotient is not whole is still accepted and stored as a fraction
    /// answer; the generator never produces one.
    pub fn integer(operation: Operation, left: i64, right: i64) -> Result<Self, RationalError> {
        Self::build(
            QuestionKind::Integer,
            operation,
            [Value::Integer(left), Value::Integer(right)],
        )
    }

    /// Build a fraction question; operands are already reduced by `Rational`.
    ///
    /// # Errors
    ///
    /// Returns `RationalError::DivisionByZero` when dividing by a zero fraction.
    pub fn fraction(
        operation: Operation,
        left: Rational,
        right: Rational,
    ) -> Result<Self, RationalError> {
        Self::build(
            QuestionKind::Fraction,
            operation,
            [Value::Fraction(left), Value::Fraction(right)],
        )
    }

    /// Integer question whose answer was fixed by the caller.
    ///
    /// Used where the displayed operands are derived from the answer, such as
    /// early-level subtraction built as `(a + b) - b`.
    #[must_use]
    pub fn integer_with_answer(
        operation: Operation,
        left: i64,
        right: i64,
        answer: i64,
    ) -> Self {
        let operands = [Value::Integer(left), Value::Integer(right)];
        Self::assemble(QuestionKind::Integer, operation, operands, Value::Integer(answer))
    }

    fn build(
        kind: QuestionKind,
        operation: Operation,
        operands: [Value; 2],
    ) -> Result<Self, RationalError> {
        let result = operation.apply(operands[0].as_rational(), operands[1].as_rational())?;
        let raw_answer = match kind {
            QuestionKind::Integer if result.is_integer() => Value::Integer(result.numerator()),
            _ => Value::Fraction(result),
        };
        Ok(Self::assemble(kind, operation, operands, raw_answer))
    }

    fn assemble(
        kind: QuestionKind,
        operation: Operation,
        operands: [Value; 2],
        raw_answer: Value,
    ) -> Self {
        let question_text = format!(
            "{} {} {}",
            operands[0].to_latex(),
            operation.symbol(),
            operands[1].to_latex()
        );
        Self {
            id: QuestionId::new_random(),
            question_text,
            kind,
            correct_answer: raw_answer.to_string(),
            raw_answer,
            operation,
            operands,
        }
    }

    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    /// Question rendered as math markup, e.g. `\frac{1}{2} + \frac{1}{3}`.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.question_text
    }

    #[must_use]
    pub fn kind(&self) -> QuestionKind {
        self.kind
    }

    /// Canonical answer text: `"n"` or reduced `"n/d"`.
    #[must_use]
    pub fn correct_answer(&self) -> &str {
        &self.correct_answer
    }

    #[must_use]
    pub fn raw_answer(&self) -> Value {
        self.raw_answer
    }

    #[must_use]
    pub fn operation(&self) -> Operation {
        self.operation
    }

    #[must_use]
    pub fn operands(&self) -> &[Value; 2] {
        &self.operands
    }

    /// Deduplication fingerprint, e.g. `add:3,4` or `div:1/2,2/3`.
    ///
    /// Operands are sorted for commutative operations so `3 + 4` and `4 + 3`
    /// share a key. Fractions use their reduced text and integers their plain
    /// text. A whole-valued fraction such as `2/1` prints as `2` and shares an
    /// integer's key text. Generated fraction operands are always proper, so
    /// generated questions never collide this way.
    #[must_use]
    pub fn canonical_key(&self) -> String {
        let mut parts: Vec<String> = self.operands.iter().map(Value::to_string).collect();
        if self.operation.is_commutative() {
            parts.sort();
        }
        format!("{}:{}", self.operation.tag(), parts.join(","))
    }

    /// True when the learner must enter a numerator and a denominator.
    #[must_use]
    pub fn expects_fraction_input(&self) -> bool {
        self.correct_answer.contains('/')
    }

    /// Compare a submitted answer with the canonical answer.
    ///
    /// Whitespace is ignored; fractions must be given in lowest terms.
    #[must_use]
    pub fn check_answer(&self, submitted: &str) -> bool {
        let normalized: String = submitted.chars().filter(|c| !c.is_whitespace()).collect();
        !normalized.is_empty() && normalized == self.correct_answer
    }
}
