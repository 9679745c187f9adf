//! Groups and their member roster.
//!
//! The creator of a group is its permanent admin: the only user allowed to
//! manage membership, and one that can never be removed from it.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine,
    util::{from_epoch, normalize_optional_text, normalize_required_text, now_utc, parse_uuid},
};

/// A member as listed in a group snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMember {
    pub user_id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub is_guest: bool,
    pub joined_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    /// Filled only by lookups that load the roster.
    pub members: Vec<GroupMember>,
}

impl Group {
    pub fn new(name: &str, description: Option<&str>, created_by: Uuid) -> ResultEngine<Self> {
        Ok(Self {
            id: Uuid::new_v4(),
            name: normalize_required_text(name, "group name")?,
            description: normalize_optional_text(description),
            created_by,
            created_at: now_utc(),
            members: Vec::new(),
        })
    }

    pub fn is_admin(&self, user_id: Uuid) -> bool {
        self.created_by == user_id
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "groups")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub created_by: String,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::CreatedBy",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Creator,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Creator.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Group> for ActiveModel {
    fn from(group: &Group) -> Self {
        Self {
            id: ActiveValue::Set(group.id.to_string()),
            name: ActiveValue::Set(group.name.clone()),
            description: ActiveValue::Set(group.description.clone()),
            created_by: ActiveValue::Set(group.created_by.to_string()),
            created_at: ActiveValue::Set(group.created_at.timestamp()),
        }
    }
}

impl TryFrom<Model> for Group {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "group")?,
            name: model.name,
            description: model.description,
            created_by: parse_uuid(&model.created_by, "user")?,
            created_at: from_epoch(model.created_at, "group")?,
            members: Vec::new(),
        })
    }
}
