//! Split arithmetic.
//!
//! Paid and owed splits are reconciled independently against the expense
//! amount: each side must sum to the amount within the configured tolerance.
//! Expenses flagged as incomplete skip the sum checks but still need at least
//! one split, non-negative amounts and member-only participants.
//!
//! Membership is checked by the engine between [`SplitTotals::from_splits`]
//! and [`SplitTotals::check_against`]; [`reconcile_splits`] runs the purely
//! arithmetic part in one go.

use crate::{EngineError, Expense, ExpenseSplit, MoneyCents, ResultEngine};

pub(crate) const NO_SPLITS: &str = "no splits provided";
pub(crate) const NEGATIVE_SPLIT: &str = "split amount must be >= 0";
pub(crate) const PAID_MISMATCH: &str = "paid split total does not match expense amount";
pub(crate) const OWED_MISMATCH: &str = "owed split total does not match expense amount";

/// Maximum accepted distance between a split total and the expense amount.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SplitTolerance(MoneyCents);

impl SplitTolerance {
    /// One cent.
    pub const DEFAULT: SplitTolerance = SplitTolerance(MoneyCents::new(1));

    pub const fn new(tolerance: MoneyCents) -> Self {
        Self(tolerance)
    }

    /// Read the tolerance from a configured decimal string such as `"0.01"`.
    ///
    /// Amounts are whole cents, so digits past the cents are truncated:
    /// `"0.005"` means no tolerance at all. Missing, unparseable or negative
    /// values fall back to [`SplitTolerance::DEFAULT`].
    pub fn from_setting(value: Option<&str>) -> Self {
        value
            .filter(|raw| !raw.trim_start().starts_with('-'))
            .and_then(|raw| MoneyCents::parse_truncated(raw).ok())
            .map_or(Self::DEFAULT, Self)
    }

    pub fn cents(self) -> MoneyCents {
        self.0
    }

    fn accepts(self, expected: MoneyCents, actual: MoneyCents) -> bool {
        expected.abs_diff(actual) <= self.0.cents().unsigned_abs()
    }
}

impl Default for SplitTolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Per-side sums of an expense's splits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SplitTotals {
    pub paid: MoneyCents,
    pub owed: MoneyCents,
}

impl SplitTotals {
    /// Partition splits into paid and owed totals.
    ///
    /// Rejects an empty split set and negative amounts. A user listed twice on
    /// the same side counts twice.
    pub fn from_splits(splits: &[ExpenseSplit]) -> ResultEngine<Self> {
        if splits.is_empty() {
            return Err(EngineError::InvalidSplit(NO_SPLITS.to_string()));
        }

        let mut totals = Self::default();
        for split in splits {
            let amount = split.amount();
            if amount.is_negative() {
                return Err(EngineError::InvalidSplit(NEGATIVE_SPLIT.to_string()));
            }
            let side = if split.is_paid {
                &mut totals.paid
            } else {
                &mut totals.owed
            };
            *side = side
                .checked_add(amount)
                .ok_or_else(|| EngineError::InvalidAmount("split total overflow".to_string()))?;
        }
        Ok(totals)
    }

    /// Compare both sides against the expense amount. Paid is checked first.
    pub fn check_against(self, amount: MoneyCents, tolerance: SplitTolerance) -> ResultEngine<()> {
        if !tolerance.accepts(amount, self.paid) {
            return Err(EngineError::InvalidSplit(PAID_MISMATCH.to_string()));
        }
        if !tolerance.accepts(amount, self.owed) {
            return Err(EngineError::InvalidSplit(OWED_MISMATCH.to_string()));
        }
        Ok(())
    }
}

/// Arithmetic reconciliation of an expense, without the membership gate.
pub fn reconcile_splits(expense: &Expense, tolerance: SplitTolerance) -> ResultEngine<SplitTotals> {
    let totals = SplitTotals::from_splits(&expense.splits)?;
    if !expense.is_incomplete() {
        totals.check_against(expense.amount(), tolerance)?;
    }
    Ok(totals)
}
