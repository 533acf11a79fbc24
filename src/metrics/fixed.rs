use std::fmt;

use serde::{Serialize, Serializer};

/// Value with two implied decimal places, e.g. `1234` renders as `12.34`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Hundredths(u64);

/// Value with one implied decimal place, e.g. `505` renders as `50.5`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Tenths(u64);

impl Hundredths {
    pub const ZERO: Self = Self(0);

    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// `numerator / denominator`, rounded half up. Zero when the denominator is zero.
    #[must_use]
    pub fn ratio(numerator: u128, denominator: u128) -> Self {
        Self(scaled_ratio(numerator, denominator, 100))
    }

    /// `part / whole * 100`, rounded half up.
    #[must_use]
    pub fn percent(part: u64, whole: u64) -> Self {
        Self::ratio(u128::from(part).saturating_mul(100), u128::from(whole))
    }
}

impl Tenths {
    pub const ZERO: Self = Self(0);

    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// `part / whole * 100`, rounded half up.
    #[must_use]
    pub fn percent(part: u64, whole: u64) -> Self {
        Self(scaled_ratio(
            u128::from(part).saturating_mul(100),
            u128::from(whole),
            10,
        ))
    }
}

fn scaled_ratio(numerator: u128, denominator: u128, scale: u128) -> u64 {
    let half = denominator.checked_div(2).unwrap_or(0);
    let value = numerator
        .saturating_mul(scale)
        .saturating_add(half)
        .checked_div(denominator)
        .unwrap_or(0);
    u64::try_from(value).unwrap_or(u64::MAX)
}

impl fmt::Display for Hundredths {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0.checked_div(100).unwrap_or(0);
        let frac = self.0.checked_rem(100).unwrap_or(0);
        write!(f, "{}.{:02}", whole, frac)
    }
}

impl fmt::Display for Tenths {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0.checked_div(10).unwrap_or(0);
        let frac = self.0.checked_rem(10).unwrap_or(0);
        write!(f, "{}.{}", whole, frac)
    }
}

impl Serialize for Hundredths {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl Serialize for Tenths {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}
