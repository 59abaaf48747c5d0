//! Multiplier applied to estimated network fees.

use crate::decimal::ExactDecimal;
use crate::winston::Winston;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A fee boost of at least 1.0.
///
/// Boosting rounds up: `ceil(reward × multiple)`. A multiple of exactly 1.0
/// leaves rewards untouched without running the boost arithmetic.
#[derive(Clone, PartialEq)]
pub struct FeeMultiple {
    value: f64,
    ratio: ExactDecimal,
}

impl FeeMultiple {
    /// Validate and build a fee multiple.
    pub fn new(value: f64) -> crate::Result<Self> {
        if !value.is_finite() || value < 1.0 {
            return Err(crate::Error::InvalidFeeMultiple(format!(
                "fee multiple must be a finite number >= 1.0, got {value}"
            )));
        }
        let ratio = ExactDecimal::from_f64(value)
            .map_err(|e| crate::Error::InvalidFeeMultiple(e.to_string()))?;
        Ok(Self { value, ratio })
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn ratio(&self) -> &ExactDecimal {
        &self.ratio
    }

    /// Whether applying this multiple changes a reward.
    pub fn is_boosting(&self) -> bool {
        !self.ratio.is_one()
    }

    /// The boosted reward for submission.
    pub fn boosted_reward(&self, reward: &Winston) -> Winston {
        self.boost_with(reward, |reward, ratio| reward.times_ceil(ratio))
    }

    /// Apply `boost` only when this multiple is boosting; otherwise return
    /// `reward` unchanged without calling it.
    pub fn boost_with<F>(&self, reward: &Winston, boost: F) -> Winston
    where
        F: FnOnce(&Winston, &ExactDecimal) -> Winston,
    {
        if self.is_boosting() {
            boost(reward, &self.ratio)
        } else {
            reward.clone()
        }
    }
}

impl Default for FeeMultiple {
    fn default() -> Self {
        Self {
            value: 1.0,
            ratio: ExactDecimal::one(),
        }
    }
}

impl fmt::Debug for FeeMultiple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FeeMultiple({})", self.value)
    }
}

impl fmt::Display for FeeMultiple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl TryFrom<f64> for FeeMultiple {
    type Error = crate::Error;

    fn try_from(value: f64) -> crate::Result<Self> {
        Self::new(value)
    }
}

impl Serialize for FeeMultiple {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.value)
    }
}

impl<'de> Deserialize<'de> for FeeMultiple {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = f64::deserialize(deserializer)?;
        Self::new(value).map_err(serde::de::Error::custom)
    }
}
