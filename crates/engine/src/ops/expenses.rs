use sea_orm::{
    ActiveValue, ConnectionTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{
    EngineError, Expense, ExpenseDraft, ExpenseSplit, ResultEngine, expense_splits, expenses,
    groups, util::now_utc,
};

use super::{
    Engine,
    membership::{member_exists, require_group, require_group_member},
    splits::reconcile_with,
    with_tx,
};

impl Engine {
    /// Persist a new expense and all of its splits in one transaction.
    ///
    /// `created_at` is stamped here. No validation happens: callers are
    /// expected to run [`Engine::reconcile_expense`] first.
    pub async fn insert_expense(&self, mut expense: Expense) -> ResultEngine<Expense> {
        expense.created_at = now_utc();
        with_tx!(self, |db_tx| {
            write_expense(&db_tx, &expense).await?;
            Ok(expense)
        })
    }

    /// Overwrite the mutable fields of a stored expense and replace its whole
    /// split set, in one transaction.
    ///
    /// `group_id`, `created_by` and `created_at` keep their stored values.
    pub async fn replace_expense(&self, expense: Expense) -> ResultEngine<Expense> {
        with_tx!(self, |db_tx| {
            overwrite_expense(&db_tx, &expense).await?;
            load_expense(&db_tx, expense.id).await
        })
    }

    /// Return an expense with its splits.
    pub async fn expense(&self, expense_id: Uuid) -> ResultEngine<Expense> {
        load_expense(&self.database, expense_id).await
    }

    /// Delete an expense and its splits in one transaction.
    pub async fn purge_expense(&self, expense_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| { remove_expense(&db_tx, expense_id).await })
    }

    /// Record a new expense on behalf of `actor`, who must be a member of the
    /// target group.
    pub async fn create_expense(&self, draft: ExpenseDraft, actor: Uuid) -> ResultEngine<Expense> {
        let expense = Expense::new(draft, actor)?;
        let tolerance = self.split_tolerance;
        with_tx!(self, |db_tx| {
            require_group_member(&db_tx, expense.group_id, actor).await?;
            reconcile_with(&db_tx, &expense, tolerance).await?;
            write_expense(&db_tx, &expense).await?;
            tracing::debug!("expense {} added to group {}", expense.id, expense.group_id);
            Ok(expense)
        })
    }

    /// Replace an expense on behalf of `actor`.
    ///
    /// Only the expense creator or the group admin may do this. The draft's
    /// group is ignored: the expense stays in the group it was created in and
    /// the new splits are checked against that group.
    pub async fn update_expense(
        &self,
        expense_id: Uuid,
        draft: ExpenseDraft,
        actor: Uuid,
    ) -> ResultEngine<Expense> {
        let tolerance = self.split_tolerance;
        with_tx!(self, |db_tx| {
            let stored = Expense::try_from(find_expense_model(&db_tx, expense_id).await?)?;
            let group = require_group(&db_tx, stored.group_id).await?;
            ensure_can_edit(&stored, &group, actor)?;

            let mut expense = Expense::new(draft, stored.created_by)?;
            expense.id = stored.id;
            expense.group_id = stored.group_id;
            expense.created_at = stored.created_at;

            reconcile_with(&db_tx, &expense, tolerance).await?;
            overwrite_expense(&db_tx, &expense).await?;
            tracing::debug!("expense {} replaced", expense.id);
            Ok(expense)
        })
    }

    /// Return an expense if `actor` is a member of its group.
    pub async fn expense_for(&self, expense_id: Uuid, actor: Uuid) -> ResultEngine<Expense> {
        let expense = load_expense(&self.database, expense_id).await?;
        if !member_exists(&self.database, actor, expense.group_id).await? {
            return Err(EngineError::Forbidden(
                "user is not a group member".to_string(),
            ));
        }
        Ok(expense)
    }

    /// Delete an expense on behalf of its creator or the group admin.
    pub async fn delete_expense(&self, expense_id: Uuid, actor: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let stored = Expense::try_from(find_expense_model(&db_tx, expense_id).await?)?;
            let group = require_group(&db_tx, stored.group_id).await?;
            ensure_can_edit(&stored, &group, actor)?;
            remove_expense(&db_tx, expense_id).await?;
            tracing::debug!("expense {expense_id} deleted");
            Ok(())
        })
    }
}

fn ensure_can_edit(expense: &Expense, group: &groups::Model, actor: Uuid) -> ResultEngine<()> {
    if expense.created_by == actor || group.created_by == actor.to_string() {
        return Ok(());
    }
    Err(EngineError::Forbidden(
        "only the expense creator or the group admin can change this expense".to_string(),
    ))
}

async fn find_expense_model<C: ConnectionTrait>(
    db: &C,
    expense_id: Uuid,
) -> ResultEngine<expenses::Model> {
    expenses::Entity::find_by_id(expense_id.to_string())
        .one(db)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound("expense not exists".to_string()))
}

async fn load_expense<C: ConnectionTrait>(db: &C, expense_id: Uuid) -> ResultEngine<Expense> {
    let mut expense = Expense::try_from(find_expense_model(db, expense_id).await?)?;
    expense.splits = expense_splits::Entity::find()
        .filter(expense_splits::Column::ExpenseId.eq(expense_id.to_string()))
        .order_by_asc(expense_splits::Column::Position)
        .all(db)
        .await?
        .into_iter()
        .map(ExpenseSplit::try_from)
        .collect::<ResultEngine<Vec<_>>>()?;
    Ok(expense)
}

async fn write_expense<C: ConnectionTrait>(db: &C, expense: &Expense) -> ResultEngine<()> {
    expenses::ActiveModel::from(expense).insert(db).await?;
    write_splits(db, expense.id, &expense.splits).await
}

async fn write_splits<C: ConnectionTrait>(
    db: &C,
    expense_id: Uuid,
    splits: &[ExpenseSplit],
) -> ResultEngine<()> {
    if splits.is_empty() {
        return Ok(());
    }
    let models = splits
        .iter()
        .enumerate()
        .map(|(position, split)| split.active_model(expense_id, position as i32));
    expense_splits::Entity::insert_many(models)
        .exec_without_returning(db)
        .await?;
    Ok(())
}

async fn overwrite_expense<C: ConnectionTrait>(db: &C, expense: &Expense) -> ResultEngine<()> {
    let mut active = expenses::ActiveModel::from(expense);
    active.id = ActiveValue::NotSet;
    active.group_id = ActiveValue::NotSet;
    active.created_by = ActiveValue::NotSet;
    active.created_at = ActiveValue::NotSet;

    let updated = expenses::Entity::update_many()
        .set(active)
        .filter(expenses::Column::Id.eq(expense.id.to_string()))
        .exec(db)
        .await?;
    if updated.rows_affected == 0 {
        return Err(EngineError::KeyNotFound("expense not exists".to_string()));
    }

    expense_splits::Entity::delete_many()
        .filter(expense_splits::Column::ExpenseId.eq(expense.id.to_string()))
        .exec(db)
        .await?;
    write_splits(db, expense.id, &expense.splits).await
}

async fn remove_expense<C: ConnectionTrait>(db: &C, expense_id: Uuid) -> ResultEngine<()> {
    expense_splits::Entity::delete_many()
        .filter(expense_splits::Column::ExpenseId.eq(expense_id.to_string()))
        .exec(db)
        .await?;
    let deleted = expenses::Entity::delete_by_id(expense_id.to_string())
        .exec(db)
        .await?;
    if deleted.rows_affected == 0 {
        return Err(EngineError::KeyNotFound("expense not exists".to_string()));
    }
    Ok(())
}
