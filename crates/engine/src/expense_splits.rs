//! Expense splits.
//!
//! A split is one user's portion of an expense: either what the user paid
//! (`is_paid = true`) or what the user owes (`is_paid = false`). Amounts are
//! magnitudes in minor units, so they are never negative.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, MoneyCents, util::parse_uuid};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseSplit {
    pub user_id: Uuid,
    pub amount_minor: i64,
    pub is_paid: bool,
}

impl ExpenseSplit {
    pub fn paid(user_id: Uuid, amount_minor: i64) -> Self {
        Self {
            user_id,
            amount_minor,
            is_paid: true,
        }
    }

    pub fn owed(user_id: Uuid, amount_minor: i64) -> Self {
        Self {
            user_id,
            amount_minor,
            is_paid: false,
        }
    }

    pub fn amount(&self) -> MoneyCents {
        MoneyCents::new(self.amount_minor)
    }

    pub(crate) fn active_model(&self, expense_id: Uuid, position: i32) -> ActiveModel {
        ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4().to_string()),
            expense_id: ActiveValue::Set(expense_id.to_string()),
            user_id: ActiveValue::Set(self.user_id.to_string()),
            amount_minor: ActiveValue::Set(self.amount_minor),
            is_paid: ActiveValue::Set(self.is_paid),
            position: ActiveValue::Set(position),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "expense_splits")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub expense_id: String,
    pub user_id: String,
    pub amount_minor: i64,
    pub is_paid: bool,
    /// Order in which the splits were submitted.
    pub position: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::expenses::Entity",
        from = "Column::ExpenseId",
        to = "super::expenses::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Expenses,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Users,
}

impl Related<super::expenses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Expenses.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for ExpenseSplit {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            user_id: parse_uuid(&model.user_id, "user")?,
            amount_minor: model.amount_minor,
            is_paid: model.is_paid,
        })
    }
}
