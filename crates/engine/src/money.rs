use std::{fmt, str::FromStr};

use crate::EngineError;

/// Signed money amount represented as **integer cents**.
///
/// Use this type for monetary arithmetic in the engine (expense totals, split
/// sums, tolerances) to avoid floating-point drift. Storage and the wire
/// format keep the raw `i64` (`amount_minor`).
///
/// # Examples
///
/// ```rust
/// use engine::MoneyCents;
///
/// let amount = MoneyCents::new(12_34);
/// assert_eq!(amount.cents(), 1234);
/// assert_eq!(amount.to_string(), "12.34");
/// ```
///
/// Parsing from user input (accepts `.` or `,` as decimal separator; rejects >
/// 2 decimals):
///
/// ```rust
/// use engine::MoneyCents;
///
/// assert_eq!("10".parse::<MoneyCents>().unwrap().cents(), 1000);
/// assert_eq!("10,5".parse::<MoneyCents>().unwrap().cents(), 1050);
/// assert!("12.345".parse::<MoneyCents>().is_err());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct MoneyCents(i64);

impl MoneyCents {
    pub const ZERO: MoneyCents = MoneyCents(0);

    /// Creates a new amount from integer cents.
    #[must_use]
    pub const fn new(cents: i64) -> Self {
        Self(cents)
    }

    /// Returns the raw value in cents.
    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    /// Returns `true` if the amount is positive.
    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Returns `true` if the amount is negative.
    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Distance between two amounts, always non-negative.
    #[must_use]
    pub const fn abs_diff(self, other: MoneyCents) -> u64 {
        self.0.abs_diff(other.0)
    }

    /// Checked addition (returns `None` on overflow).
    #[must_use]
    pub fn checked_add(self, rhs: MoneyCents) -> Option<MoneyCents> {
        self.0.checked_add(rhs.0).map(MoneyCents)
    }

    /// Like [`str::parse`], but fractional digits past the cents are dropped
    /// instead of rejected: `"0.005"` is zero cents, `"1.239"` is 123.
    pub fn parse_truncated(s: &str) -> Result<Self, EngineError> {
        parse_cents(s, Decimals::Truncate)
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Decimals {
    Strict,
    Truncate,
}

impl fmt::Display for MoneyCents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let units = abs / 100;
        let cents = abs % 100;
        write!(f, "{sign}{units}.{cents:02}")
    }
}

impl FromStr for MoneyCents {
    type Err = EngineError;

    /// Parses a decimal string into cents.
    ///
    /// Accepts `.` or `,` as decimal separator and an optional leading `+`/`-`.
    ///
    /// Validation rules:
    /// - max 2 fractional digits (rejects `12.345`)
    /// - rejects empty/invalid strings
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_cents(s, Decimals::Strict)
    }
}

fn parse_cents(s: &str, decimals: Decimals) -> Result<MoneyCents, EngineError> {
    let empty = || EngineError::InvalidAmount("empty amount".to_string());
    let invalid = || EngineError::InvalidAmount("invalid amount".to_string());
    let overflow = || EngineError::InvalidAmount("amount too large".to_string());

    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err(empty());
    }

    let (negative, rest) = if let Some(stripped) = trimmed.strip_prefix('-') {
        (true, stripped)
    } else if let Some(stripped) = trimmed.strip_prefix('+') {
        (false, stripped)
    } else {
        (false, trimmed)
    };

    let rest = rest.trim();
    if rest.is_empty() {
        return Err(empty());
    }

    let rest = rest.replace(',', ".");
    let mut parts = rest.split('.');
    let units_str = parts.next().ok_or_else(invalid)?;
    let cents_str = parts.next();

    if parts.next().is_some() {
        return Err(invalid());
    }

    if units_str.is_empty() || !units_str.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }

    let units: i64 = units_str.parse().map_err(|_| invalid())?;

    let cents: i64 = match cents_str {
        None | Some("") => 0,
        Some(frac) => {
            if !frac.chars().all(|c| c.is_ascii_digit()) {
                return Err(invalid());
            }
            if frac.len() > 2 && decimals == Decimals::Strict {
                return Err(EngineError::InvalidAmount("too many decimals".to_string()));
            }
            let frac = &frac[..frac.len().min(2)];
            match frac.len() {
                1 => frac.parse::<i64>().map_err(|_| invalid())? * 10,
                _ => frac.parse::<i64>().map_err(|_| invalid())?,
            }
        }
    };

    let total = units
        .checked_mul(100)
        .and_then(|v| v.checked_add(cents))
        .ok_or_else(overflow)?;

    let signed = if negative {
        total.checked_neg().ok_or_else(overflow)?
    } else {
        total
    };

    Ok(MoneyCents(signed))
}
