use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};
use std::str::FromStr;
use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RationalError {
    #[error("denominator cannot be zero")]
    InvalidFraction,

    #[error("division by zero")]
    DivisionByZero,

    #[error("arithmetic overflow")]
    Overflow,

    #[error("cannot parse `{0}` as a number or fraction")]
    Parse(String),
}

//
// ─── RATIONAL ──────────────────────────────────────────────────────────────────
//

/// Exact fraction kept in lowest terms with a strictly positive denominator.
///
/// Every constructor and every arithmetic operation reduces its result, so two
/// values are equal exactly when their numerator/denominator pairs are equal.
///
/// # Examples
///
/// ```
/// # use drill_core::rational::Rational;
/// let half = Rational::new(2, 4)?;
/// assert_eq!(half.numerator(), 1);
/// assert_eq!(half.denominator(), 2);
/// assert_eq!(half.to_string(), "1/2");
/// assert_eq!(half.to_latex(), "\\frac{1}{2}");
/// # Ok::<(), drill_core::rational::RationalError>(())
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RationalParts", into = "RationalParts")]
pub struct Rational {
    numerator: i64,
    denominator: i64,
}

/// Wire shape `{ "num": n, "den": d }`, validated on the way in.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct RationalParts {
    num: i64,
    den: i64,
}

impl TryFrom<RationalParts> for Rational {
    type Error = RationalError;

    fn try_from(parts: RationalParts) -> Result<Self, Self::Error> {
        Self::new(parts.num, parts.den)
    }
}

impl From<Rational> for RationalParts {
    fn from(value: Rational) -> Self {
        Self {
            num: value.numerator,
            den: value.denominator,
        }
    }
}

impl Rational {
    pub const ZERO: Rational = Rational {
        numerator: 0,
        denominator: 1,
    };

    /// Build a reduced fraction.
    ///
    /// # Errors
    ///
    /// Returns `RationalError::InvalidFraction` when `denominator` is zero and
    /// `RationalError::Overflow` when the sign cannot be normalized.
    pub fn new(numerator: i64, denominator: i64) -> Result<Self, RationalError> {
        if denominator == 0 {
            return Err(RationalError::InvalidFraction);
        }

        let (mut numerator, mut denominator) = (numerator, denominator);
        if denominator < 0 {
            numerator = numerator.checked_neg().ok_or(RationalError::Overflow)?;
            denominator = denominator.checked_neg().ok_or(RationalError::Overflow)?;
        }

        let common = gcd(numerator.unsigned_abs(), denominator.unsigned_abs());
        // `common` divides `denominator`, which fits in i64, so it does too.
        let common = i64::try_from(common).map_err(|_| RationalError::Overflow)?;

        Ok(Self {
            numerator: numerator / common,
            denominator: denominator / common,
        })
    }

    #[must_use]
    pub fn from_integer(value: i64) -> Self {
        Self {
            numerator: value,
            denominator: 1,
        }
    }

    #[must_use]
    pub fn numerator(&self) -> i64 {
        self.numerator
    }

    #[must_use]
    pub fn denominator(&self) -> i64 {
        self.denominator
    }

    #[must_use]
    pub fn is_integer(&self) -> bool {
        self.denominator == 1
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.numerator == 0
    }

    /// # Errors
    ///
    /// Returns `RationalError::Overflow` if an intermediate product overflows.
    pub fn checked_add(self, other: Self) -> Result<Self, RationalError> {
        let left = mul(self.numerator, other.denominator)?;
        let right = mul(other.numerator, self.denominator)?;
        let numerator = left.checked_add(right).ok_or(RationalError::Overflow)?;
        Self::new(numerator, mul(self.denominator, other.denominator)?)
    }

    /// # Errors
    ///
    /// Returns `RationalError::Overflow` if an intermediate product overflows.
    pub fn checked_sub(self, other: Self) -> Result<Self, RationalError> {
        let left = mul(self.numerator, other.denominator)?;
        let right = mul(other.numerator, self.denominator)?;
        let numerator = left.checked_sub(right).ok_or(RationalError::Overflow)?;
        Self::new(numerator, mul(self.denominator, other.denominator)?)
    }

    /// # Errors
    ///
    /// Returns `RationalError::Overflow` if an intermediate product overflows.
    pub fn checked_mul(self, other: Self) -> Result<Self, RationalError> {
        Self::new(
            mul(self.numerator, other.numerator)?,
            mul(self.denominator, other.denominator)?,
        )
    }

    /// Divide by `other` (multiply by its reciprocal).
    ///
    /// # Errors
    ///
    /// Returns `RationalError::DivisionByZero` when `other` is zero.
    pub fn checked_div(self, other: Self) -> Result<Self, RationalError> {
        if other.is_zero() {
            return Err(RationalError::DivisionByZero);
        }
        Self::new(
            mul(self.numerator, other.denominator)?,
            mul(self.denominator, other.numerator)?,
        )
    }

    /// Render as math markup: the bare integer, or `\frac{n}{d}`.
    #[must_use]
    pub fn to_latex(&self) -> String {
        if self.is_integer() {
            self.numerator.to_string()
        } else {
            format!("\\frac{{{}}}{{{}}}", self.numerator, self.denominator)
        }
    }
}

fn mul(a: i64, b: i64) -> Result<i64, RationalError> {
    a.checked_mul(b).ok_or(RationalError::Overflow)
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    // gcd(0, 0) only happens for 0/0, which `new` rejects first.
    a.max(1)
}

// ─── Operators ─────────────────────────────────────────────────────────────────
//
// Operator forms panic on i64 overflow, like the primitive integer operators.
// Generated operands stay far below that bound; use the `checked_*` methods for
// untrusted input.

impl Add for Rational {
    type Output = Rational;

    fn add(self, rhs: Self) -> Self::Output {
        self.checked_add(rhs).expect("rational addition overflowed")
    }
}

impl Sub for Rational {
    type Output = Rational;

    fn sub(self, rhs: Self) -> Self::Output {
        self.checked_sub(rhs).expect("rational subtraction overflowed")
    }
}

impl Mul for Rational {
    type Output = Rational;

    fn mul(self, rhs: Self) -> Self::Output {
        self.checked_mul(rhs).expect("rational multiplication overflowed")
    }
}

impl Neg for Rational {
    type Output = Rational;

    fn neg(self) -> Self::Output {
        Self {
            numerator: -self.numerator,
            denominator: self.denominator,
        }
    }
}

impl From<i64> for Rational {
    fn from(value: i64) -> Self {
        Self::from_integer(value)
    }
}

// ─── Display / Debug / FromStr ─────────────────────────────────────────────────

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_integer() {
            write!(f, "{}", self.numerator)
        } else {
            write!(f, "{}/{}", self.numerator, self.denominator)
        }
    }
}

impl fmt::Debug for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rational({}/{})", self.numerator, self.denominator)
    }
}

impl FromStr for Rational {
    type Err = RationalError;

    /// Parses `"n"` or `"n/d"`, ignoring surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse_err = || RationalError::Parse(s.to_string());
        let trimmed = s.trim();
        match trimmed.split_once('/') {
            Some((num, den)) => {
                let num = num.trim().parse::<i64>().map_err(|_| parse_err())?;
                let den = den.trim().parse::<i64>().map_err(|_| parse_err())?;
                Self::new(num, den)
            }
            None => trimmed
                .parse::<i64>()
                .map(Self::from_integer)
                .map_err(|_| parse_err()),
        }
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────
