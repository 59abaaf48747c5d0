//! Exact decimal ratios used to scale fee amounts.

use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::{One, Zero};
use std::fmt;

/// A non-negative decimal number held as an exact ratio of two integers.
///
/// Multipliers such as fee boosts and tip percentages are configured as
/// decimals (`1.5`, `0.15`). Converting them through binary floating point
/// would turn `0.15` into `0.1499999...`, so they are parsed from their
/// shortest decimal representation instead.
#[derive(Clone, PartialEq, Eq)]
pub struct ExactDecimal {
    numerator: BigUint,
    denominator: BigUint,
}

impl ExactDecimal {
    /// The value one.
    pub fn one() -> Self {
        Self {
            numerator: BigUint::one(),
            denominator: BigUint::one(),
        }
    }

    /// Parse a plain decimal string such as `"12"`, `"0.15"` or `"1.000"`.
    pub fn parse(s: &str) -> crate::Result<Self> {
        let s = s.trim();
        let (whole, fraction) = match s.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (s, ""),
        };

        if whole.is_empty() && fraction.is_empty() {
            return Err(crate::Error::InvalidAmount(format!("empty decimal: {s:?}")));
        }
        if !whole.chars().all(|c| c.is_ascii_digit())
            || !fraction.chars().all(|c| c.is_ascii_digit())
        {
            return Err(crate::Error::InvalidAmount(format!(
                "not a non-negative decimal: {s:?}"
            )));
        }

        let digits = format!("{whole}{fraction}");
        let numerator = BigUint::parse_bytes(digits.as_bytes(), 10)
            .ok_or_else(|| crate::Error::InvalidAmount(format!("invalid decimal: {s:?}")))?;
        let denominator = BigUint::from(10u32).pow(fraction.len() as u32);

        Ok(Self::reduced(numerator, denominator))
    }

    /// Convert a finite, non-negative float through its shortest decimal form.
    pub fn from_f64(value: f64) -> crate::Result<Self> {
        if !value.is_finite() || value < 0.0 {
            return Err(crate::Error::InvalidAmount(format!(
                "expected a finite non-negative number, got {value}"
            )));
        }
        // `Display` for f64 never uses exponent notation.
        Self::parse(&value.to_string())
    }

    fn reduced(numerator: BigUint, denominator: BigUint) -> Self {
        if numerator.is_zero() {
            return Self {
                numerator,
                denominator: BigUint::one(),
            };
        }
        let gcd = numerator.gcd(&denominator);
        Self {
            numerator: numerator / &gcd,
            denominator: denominator / gcd,
        }
    }

    pub fn numerator(&self) -> &BigUint {
        &self.numerator
    }

    pub fn denominator(&self) -> &BigUint {
        &self.denominator
    }

    /// Whether the value is exactly one.
    pub fn is_one(&self) -> bool {
        self.numerator == self.denominator
    }

    /// Whether the value is at least one.
    pub fn is_at_least_one(&self) -> bool {
        self.numerator >= self.denominator
    }

    /// `ceil(value × self)`.
    pub fn mul_ceil(&self, value: &BigUint) -> BigUint {
        Integer::div_ceil(&(value * &self.numerator), &self.denominator)
    }

    /// `floor(value × self)`.
    pub fn mul_floor(&self, value: &BigUint) -> BigUint {
        (value * &self.numerator) / &self.denominator
    }
}

impl fmt::Debug for ExactDecimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ExactDecimal({}/{})", self.numerator, self.denominator)
    }
}
