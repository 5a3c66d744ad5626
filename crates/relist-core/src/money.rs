//! Currency amount type with fixed-point precision.
//!
//! [`Money`] represents a GBP amount with 2 decimal places of precision.
//! Internally stored as integer pence to avoid floating-point drift; all
//! arithmetic is overflow-checked and fee computation rounds half-up to
//! the penny.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

use crate::CoreError;

/// Pence per pound.
pub const PENCE_PER_POUND: u64 = 100;

/// A currency amount in a single fixed currency, stored as integer pence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money(u64);

impl Money {
    /// Zero amount constant.
    pub const ZERO: Self = Self(0);

    /// Maximum representable amount.
    pub const MAX: Self = Self(u64::MAX);

    /// Creates an amount from pence.
    #[must_use]
    pub const fn from_pence(pence: u64) -> Self {
        Self(pence)
    }

    /// Creates an amount from whole pounds.
    #[must_use]
    pub const fn from_pounds(pounds: u64) -> Self {
        Self(pounds * PENCE_PER_POUND)
    }

    /// Returns the amount in pence.
    #[must_use]
    pub const fn pence(self) -> u64 {
        self.0
    }

    /// Returns true if this amount is zero.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Checked addition. Returns `None` on overflow.
    #[must_use]
    pub const fn checked_add(self, rhs: Self) -> Option<Self> {
        match self.0.checked_add(rhs.0) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Checked subtraction. Returns `None` on underflow.
    #[must_use]
    pub const fn checked_sub(self, rhs: Self) -> Option<Self> {
        match self.0.checked_sub(rhs.0) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Checked multiplication by a scalar (e.g. a ticket quantity).
    #[must_use]
    pub const fn checked_mul(self, rhs: u64) -> Option<Self> {
        match self.0.checked_mul(rhs) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Saturating addition.
    #[must_use]
    pub const fn saturating_add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }

    /// Saturating subtraction (clamps at zero).
    #[must_use]
    pub const fn saturating_sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }

    /// Multiplies by a permille rate, rounding half-up to the penny.
    ///
    /// Fee schedules are expressed in permille (10% = 100‰, 2.5% = 25‰) so
    /// that the computation stays in integer space. The `+ 500` before the
    /// division implements round-half-up on the discarded thousandths.
    ///
    /// # Examples
    /// ```
    /// use relist_core::Money;
    ///
    /// // 10% of £28.00 = £2.80
    /// assert_eq!(Money::from_pence(2800).permille_half_up(100), Money::from_pence(280));
    ///
    /// // 2.5% of £28.00 = £0.70
    /// assert_eq!(Money::from_pence(2800).permille_half_up(25), Money::from_pence(70));
    /// ```
    #[must_use]
    pub const fn permille_half_up(self, rate: u32) -> Self {
        let numerator = self.0 as u128 * rate as u128 + 500;
        let pence = numerator / 1000;
        if pence > u64::MAX as u128 {
            Self(u64::MAX)
        } else {
            Self(pence as u64)
        }
    }

    /// Multiplies by a percentage, rounding down to the penny.
    ///
    /// Used for price ceilings (150% of the original price) where the
    /// conservative direction is to never admit a price above the limit.
    #[must_use]
    pub const fn percent_floor(self, percent: u32) -> Self {
        let numerator = self.0 as u128 * percent as u128;
        let pence = numerator / 100;
        if pence > u64::MAX as u128 {
            Self(u64::MAX)
        } else {
            Self(pence as u64)
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / PENCE_PER_POUND;
        let frac = self.0 % PENCE_PER_POUND;
        write!(f, "{whole}.{frac:02}")
    }
}

impl FromStr for Money {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.starts_with('-') {
            return Err(CoreError::InvalidAmount("negative values not allowed".into()));
        }

        let parts: Vec<&str> = s.split('.').collect();
        match parts.len() {
            1 => {
                let whole: u64 = parts[0]
                    .parse()
                    .map_err(|_| CoreError::InvalidAmount(format!("invalid number: {s}")))?;
                whole
                    .checked_mul(PENCE_PER_POUND)
                    .map(Money)
                    .ok_or_else(|| CoreError::InvalidAmount("overflow".into()))
            }
            2 => {
                let whole: u64 = if parts[0].is_empty() {
                    0
                } else {
                    parts[0]
                        .parse()
                        .map_err(|_| CoreError::InvalidAmount(format!("invalid number: {s}")))?
                };
                let frac_str = parts[1];
                if frac_str.is_empty() || frac_str.len() > 2 {
                    return Err(CoreError::InvalidAmount(format!(
                        "expected at most 2 decimal places: {s}"
                    )));
                }
                let frac: u64 = frac_str
                    .parse()
                    .map_err(|_| CoreError::InvalidAmount(format!("invalid number: {s}")))?;
                // ".5" means 50 pence, ".05" means 5 pence
                let frac_pence = if frac_str.len() == 1 { frac * 10 } else { frac };
                whole
                    .checked_mul(PENCE_PER_POUND)
                    .and_then(|w| w.checked_add(frac_pence))
                    .map(Money)
                    .ok_or_else(|| CoreError::InvalidAmount("overflow".into()))
            }
            _ => Err(CoreError::InvalidAmount(format!("invalid amount: {s}"))),
        }
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}
