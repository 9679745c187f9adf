use chrono::{DateTime, Utc};
use sea_orm::{FromQueryResult, Statement, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine,
    util::{from_epoch, parse_uuid},
};

use super::{Engine, membership::require_group_member};

/// What one expense means for one user: how much they paid, how much they
/// owe and the difference.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseNetSpending {
    pub expense_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub total_minor: i64,
    pub paid_minor: i64,
    pub owed_minor: i64,
    /// `paid_minor - owed_minor`; never zero in results.
    pub net_minor: i64,
}

#[derive(Debug, FromQueryResult)]
struct NetSpendingRow {
    expense_id: String,
    title: String,
    description: Option<String>,
    created_at: i64,
    total_minor: i64,
    paid_minor: i64,
    owed_minor: i64,
}

impl TryFrom<NetSpendingRow> for ExpenseNetSpending {
    type Error = EngineError;

    fn try_from(row: NetSpendingRow) -> Result<Self, Self::Error> {
        Ok(Self {
            expense_id: parse_uuid(&row.expense_id, "expense")?,
            title: row.title,
            description: row.description,
            created_at: from_epoch(row.created_at, "expense")?,
            total_minor: row.total_minor,
            paid_minor: row.paid_minor,
            owed_minor: row.owed_minor,
            net_minor: row.paid_minor - row.owed_minor,
        })
    }
}

// SQLite dialect (`?` placeholders); the engine only runs on SQLite.
// Expenses without a split for the user still join (LEFT JOIN) and then
// drop out with a zero net.
const NET_SPENDING_SQL: &str = "
SELECT e.id AS expense_id,
       e.title AS title,
       e.description AS description,
       e.created_at AS created_at,
       e.amount_minor AS total_minor,
       COALESCE(SUM(CASE WHEN s.is_paid THEN s.amount_minor ELSE 0 END), 0) AS paid_minor,
       COALESCE(SUM(CASE WHEN NOT s.is_paid THEN s.amount_minor ELSE 0 END), 0) AS owed_minor
FROM expenses e
LEFT JOIN expense_splits s ON s.expense_id = e.id AND s.user_id = ?
WHERE e.group_id = ?
GROUP BY e.id, e.title, e.description, e.created_at, e.amount_minor
HAVING COALESCE(SUM(CASE WHEN s.is_paid THEN s.amount_minor ELSE 0 END), 0)
     - COALESCE(SUM(CASE WHEN NOT s.is_paid THEN s.amount_minor ELSE 0 END), 0) != 0
ORDER BY e.created_at DESC, e.id ASC;";

impl Engine {
    /// Net spending of `user_id` for every expense of `group_id` that touches
    /// them, newest first. Expenses where the user paid exactly what they owe
    /// (or has no split at all) are left out.
    pub async fn net_spending(
        &self,
        group_id: Uuid,
        user_id: Uuid,
    ) -> ResultEngine<Vec<ExpenseNetSpending>> {
        let backend = self.database.get_database_backend();
        let rows = NetSpendingRow::find_by_statement(Statement::from_sql_and_values(
            backend,
            NET_SPENDING_SQL,
            vec![user_id.to_string().into(), group_id.to_string().into()],
        ))
        .all(&self.database)
        .await?;

        rows.into_iter().map(ExpenseNetSpending::try_from).collect()
    }

    /// [`Engine::net_spending`] for the requesting member of the group.
    pub async fn group_net_spending(
        &self,
        group_id: Uuid,
        actor: Uuid,
    ) -> ResultEngine<Vec<ExpenseNetSpending>> {
        require_group_member(&self.database, group_id, actor).await?;
        self.net_spending(group_id, actor).await
    }
}
