use sea_orm::ConnectionTrait;

use crate::{EngineError, Expense, ResultEngine, SplitTolerance, SplitTotals};

use super::{Engine, membership::all_members};

const NOT_A_MEMBER: &str = "split user not in group";

impl Engine {
    /// Validate an expense and its splits before storage.
    ///
    /// Checks, in order: at least one split, no negative split amount, every
    /// split user is a member of the expense's group, then (unless the
    /// expense is flagged incomplete) paid and owed totals each match the
    /// amount within the configured tolerance. Nothing is written.
    pub async fn reconcile_expense(&self, expense: Expense) -> ResultEngine<Expense> {
        reconcile_with(&self.database, &expense, self.split_tolerance).await?;
        Ok(expense)
    }
}

pub(super) async fn reconcile_with<C: ConnectionTrait>(
    db: &C,
    expense: &Expense,
    tolerance: SplitTolerance,
) -> ResultEngine<SplitTotals> {
    let result = reconcile_steps(db, expense, tolerance).await;
    if let Err(err) = &result {
        tracing::debug!("expense {} rejected: {err}", expense.id);
    }
    result
}

async fn reconcile_steps<C: ConnectionTrait>(
    db: &C,
    expense: &Expense,
    tolerance: SplitTolerance,
) -> ResultEngine<SplitTotals> {
    if !expense.amount().is_positive() {
        return Err(EngineError::InvalidAmount(
            "amount_minor must be > 0".to_string(),
        ));
    }

    let totals = SplitTotals::from_splits(&expense.splits)?;

    if !all_members(db, &expense.split_users(), expense.group_id).await? {
        return Err(EngineError::InvalidSplit(NOT_A_MEMBER.to_string()));
    }

    if !expense.is_incomplete() {
        totals.check_against(expense.amount(), tolerance)?;
    }
    Ok(totals)
}
