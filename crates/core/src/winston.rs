//! Fee amounts in the network's minor unit and its display unit.

use crate::decimal::ExactDecimal;
use num_bigint::BigUint;
use num_traits::Zero;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};
use std::str::FromStr;

/// Winston per AR.
pub const WINSTON_PER_AR: u64 = 1_000_000_000_000;

/// Decimal places in an AR amount.
const AR_DECIMALS: usize = 12;

/// An amount in winston, the smallest indivisible unit of the network's
/// native token. Arbitrary precision; never a float.
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Winston(BigUint);

impl Winston {
    pub fn zero() -> Self {
        Self(BigUint::zero())
    }

    pub fn new(amount: BigUint) -> Self {
        Self(amount)
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn as_biguint(&self) -> &BigUint {
        &self.0
    }

    /// Subtract, failing instead of going below zero.
    pub fn minus(&self, other: &Winston) -> crate::Result<Winston> {
        if other.0 > self.0 {
            return Err(crate::Error::WinstonUnderflow {
                minuend: self.to_string(),
                subtrahend: other.to_string(),
            });
        }
        Ok(Self(&self.0 - &other.0))
    }

    /// Multiply by a whole number.
    pub fn times(&self, factor: u64) -> Winston {
        Self(&self.0 * factor)
    }

    /// `ceil(self × ratio)`.
    pub fn times_ceil(&self, ratio: &ExactDecimal) -> Winston {
        Self(ratio.mul_ceil(&self.0))
    }

    /// `floor(self × ratio)`.
    pub fn times_floor(&self, ratio: &ExactDecimal) -> Winston {
        Self(ratio.mul_floor(&self.0))
    }

    pub fn max(self, other: Winston) -> Winston {
        std::cmp::max(self, other)
    }
}

impl From<u64> for Winston {
    fn from(amount: u64) -> Self {
        Self(BigUint::from(amount))
    }
}

impl Add for Winston {
    type Output = Winston;

    fn add(self, other: Winston) -> Winston {
        Self(self.0 + other.0)
    }
}

impl<'a> Add<&'a Winston> for &'a Winston {
    type Output = Winston;

    fn add(self, other: &'a Winston) -> Winston {
        Winston(&self.0 + &other.0)
    }
}

impl AddAssign<&Winston> for Winston {
    fn add_assign(&mut self, other: &Winston) {
        self.0 += &other.0;
    }
}

impl Sum for Winston {
    fn sum<I: Iterator<Item = Winston>>(iter: I) -> Self {
        iter.fold(Winston::zero(), Add::add)
    }
}

impl FromStr for Winston {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(crate::Error::InvalidAmount(format!(
                "winston must be a non-negative integer, got {s:?}"
            )));
        }
        BigUint::parse_bytes(s.as_bytes(), 10)
            .map(Self)
            .ok_or_else(|| crate::Error::InvalidAmount(format!("invalid winston amount: {s:?}")))
    }
}

impl fmt::Debug for Winston {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Winston({})", self.0)
    }
}

impl fmt::Display for Winston {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// Serialized as a decimal string so amounts survive JSON number limits.
impl Serialize for Winston {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_str_radix(10))
    }
}

impl<'de> Deserialize<'de> for Winston {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// An amount in AR, the display unit. Backed by an exact winston amount.
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ar(Winston);

impl Ar {
    pub fn from_winston(winston: Winston) -> Self {
        Self(winston)
    }

    pub fn to_winston(&self) -> Winston {
        self.0.clone()
    }

    /// Parse a decimal AR amount with at most 12 fractional digits.
    pub fn parse(s: &str) -> crate::Result<Self> {
        let fraction_digits = s.split_once('.').map_or(0, |(_, f)| f.len());
        if fraction_digits > AR_DECIMALS {
            return Err(crate::Error::InvalidAmount(format!(
                "AR amounts have at most {AR_DECIMALS} decimal places, got {s:?}"
            )));
        }
        let decimal = ExactDecimal::parse(s)?;
        // Exact because the fractional part fits within the winston scale.
        let winston = decimal.mul_floor(&BigUint::from(WINSTON_PER_AR));
        Ok(Self(Winston(winston)))
    }
}

impl fmt::Debug for Ar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ar({self})")
    }
}

impl fmt::Display for Ar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scale = BigUint::from(WINSTON_PER_AR);
        let whole = &self.0.0 / &scale;
        let fraction = &self.0.0 % &scale;
        if fraction.is_zero() {
            return write!(f, "{whole}");
        }
        let fraction = format!("{:0>width$}", fraction.to_string(), width = AR_DECIMALS);
        write!(f, "{whole}.{}", fraction.trim_end_matches('0'))
    }
}
