//! Expense primitives.
//!
//! An `Expense` belongs to one group and carries its full set of
//! [`ExpenseSplit`]s. Updates replace the mutable fields and the whole split
//! set; `group_id`, `created_by` and `created_at` never change after insert.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError, ExpenseSplit, MoneyCents, ResultEngine,
    util::{from_epoch, normalize_optional_text, normalize_required_text, now_utc, parse_uuid},
};

/// Where an expense happened.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    fn validate(self) -> ResultEngine<Self> {
        if !(-90.0..=90.0).contains(&self.latitude) || !(-180.0..=180.0).contains(&self.longitude)
        {
            return Err(EngineError::InvalidInput(
                "location is out of range".to_string(),
            ));
        }
        Ok(self)
    }
}

/// Caller-supplied content of an expense, before the engine assigns identity
/// and timestamps.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExpenseDraft {
    pub group_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub amount_minor: i64,
    #[serde(default)]
    pub incomplete_amount: bool,
    #[serde(default)]
    pub incomplete_split: bool,
    pub location: Option<GeoPoint>,
    pub splits: Vec<ExpenseSplit>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: Uuid,
    pub group_id: Uuid,
    pub created_by: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub amount_minor: i64,
    pub incomplete_amount: bool,
    pub incomplete_split: bool,
    pub location: Option<GeoPoint>,
    pub created_at: DateTime<Utc>,
    pub splits: Vec<ExpenseSplit>,
}

impl Expense {
    /// Build a new expense from a draft, validating title, amount and
    /// location. Splits are checked later by reconciliation.
    pub fn new(draft: ExpenseDraft, created_by: Uuid) -> ResultEngine<Self> {
        if draft.amount_minor <= 0 {
            return Err(EngineError::InvalidAmount(
                "amount_minor must be > 0".to_string(),
            ));
        }
        let location = draft.location.map(GeoPoint::validate).transpose()?;
        Ok(Self {
            id: Uuid::new_v4(),
            group_id: draft.group_id,
            created_by,
            title: normalize_required_text(&draft.title, "title")?,
            description: normalize_optional_text(draft.description.as_deref()),
            amount_minor: draft.amount_minor,
            incomplete_amount: draft.incomplete_amount,
            incomplete_split: draft.incomplete_split,
            location,
            created_at: now_utc(),
            splits: draft.splits,
        })
    }

    pub fn amount(&self) -> MoneyCents {
        MoneyCents::new(self.amount_minor)
    }

    /// Exempt from sum reconciliation.
    pub fn is_incomplete(&self) -> bool {
        self.incomplete_amount || self.incomplete_split
    }

    /// Distinct split users, in first-seen order.
    pub fn split_users(&self) -> Vec<Uuid> {
        let mut users: Vec<Uuid> = Vec::with_capacity(self.splits.len());
        for split in &self.splits {
            if !users.contains(&split.user_id) {
                users.push(split.user_id);
            }
        }
        users
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub group_id: String,
    pub created_by: String,
    pub title: String,
    pub description: Option<String>,
    pub amount_minor: i64,
    pub incomplete_amount: bool,
    pub incomplete_split: bool,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::groups::Entity",
        from = "Column::GroupId",
        to = "super::groups::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Groups,
    #[sea_orm(has_many = "super::expense_splits::Entity")]
    Splits,
}

impl Related<super::groups::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Groups.def()
    }
}

impl Related<super::expense_splits::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Splits.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Expense> for ActiveModel {
    fn from(expense: &Expense) -> Self {
        Self {
            id: ActiveValue::Set(expense.id.to_string()),
            group_id: ActiveValue::Set(expense.group_id.to_string()),
            created_by: ActiveValue::Set(expense.created_by.to_string()),
            title: ActiveValue::Set(expense.title.clone()),
            description: ActiveValue::Set(expense.description.clone()),
            amount_minor: ActiveValue::Set(expense.amount_minor),
            incomplete_amount: ActiveValue::Set(expense.incomplete_amount),
            incomplete_split: ActiveValue::Set(expense.incomplete_split),
            latitude: ActiveValue::Set(expense.location.map(|p| p.latitude)),
            longitude: ActiveValue::Set(expense.location.map(|p| p.longitude)),
            created_at: ActiveValue::Set(expense.created_at.timestamp()),
        }
    }
}

impl TryFrom<Model> for Expense {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let location = match (model.latitude, model.longitude) {
            (Some(latitude), Some(longitude)) => Some(GeoPoint {
                latitude,
                longitude,
            }),
            _ => None,
        };
        Ok(Self {
            id: parse_uuid(&model.id, "expense")?,
            group_id: parse_uuid(&model.group_id, "group")?,
            created_by: parse_uuid(&model.created_by, "user")?,
            title: model.title,
            description: model.description,
            amount_minor: model.amount_minor,
            incomplete_amount: model.incomplete_amount,
            incomplete_split: model.incomplete_split,
            location,
            created_at: from_epoch(model.created_at, "expense")?,
            splits: Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(amount_minor: i64) -> ExpenseDraft {
        ExpenseDraft {
            group_id: Uuid::new_v4(),
            title: "  Dinner ".to_string(),
            description: Some("   ".to_string()),
            amount_minor,
            incomplete_amount: false,
            incomplete_split: false,
            location: None,
            splits: Vec::new(),
        }
    }

    #[test]
    fn new_trims_text_and_keeps_amount() {
        let expense = Expense::new(draft(10_000), Uuid::new_v4()).unwrap();
        assert_eq!(expense.title, "Dinner");
        assert_eq!(expense.description, None);
        assert_eq!(expense.amount(), MoneyCents::new(10_000));
    }

    #[test]
    fn new_rejects_non_positive_amounts() {
        for amount in [0, -1] {
            let err = Expense::new(draft(amount), Uuid::new_v4()).unwrap_err();
            assert!(matches!(err, EngineError::InvalidAmount(_)));
        }
    }

    #[test]
    fn new_rejects_blank_title_and_bad_location() {
        let mut blank = draft(100);
        blank.title = " ".to_string();
        assert!(matches!(
            Expense::new(blank, Uuid::new_v4()),
            Err(EngineError::InvalidInput(_))
        ));

        let mut far = draft(100);
        far.location = Some(GeoPoint {
            latitude: 91.0,
            longitude: 0.0,
        });
        assert!(matches!(
            Expense::new(far, Uuid::new_v4()),
            Err(EngineError::InvalidInput(_))
        ));
    }

    #[test]
    fn split_users_are_distinct() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let mut d = draft(100);
        d.splits = vec![
            ExpenseSplit::paid(a, 100),
            ExpenseSplit::owed(a, 50),
            ExpenseSplit::owed(b, 50),
        ];
        let expense = Expense::new(d, a).unwrap();
        assert_eq!(expense.split_users(), vec![a, b]);
    }
}
