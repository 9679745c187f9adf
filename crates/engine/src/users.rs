//! Users table.
//!
//! Registered users carry an email and an Argon2 credential; guests carry
//! neither and can only appear as split participants.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine,
    util::{from_epoch, normalize_email, normalize_user_name, now_utc, parse_uuid},
};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub is_guest: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    #[sea_orm(unique)]
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub is_guest: bool,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl User {
    /// A user that logs in with `email`. Name and email are validated and
    /// normalized.
    pub fn registered(name: &str, email: &str) -> ResultEngine<Self> {
        Ok(Self {
            id: Uuid::new_v4(),
            name: normalize_user_name(name)?,
            email: Some(normalize_email(email)?),
            is_guest: false,
            created_at: now_utc(),
        })
    }

    /// A name-only participant without credentials.
    pub fn guest(name: &str) -> ResultEngine<Self> {
        Ok(Self {
            id: Uuid::new_v4(),
            name: normalize_user_name(name)?,
            email: None,
            is_guest: true,
            created_at: now_utc(),
        })
    }

    pub(crate) fn active_model(&self, password_hash: Option<String>) -> ActiveModel {
        ActiveModel {
            id: ActiveValue::Set(self.id.to_string()),
            name: ActiveValue::Set(self.name.clone()),
            email: ActiveValue::Set(self.email.clone()),
            password_hash: ActiveValue::Set(password_hash),
            is_guest: ActiveValue::Set(self.is_guest),
            created_at: ActiveValue::Set(self.created_at.timestamp()),
        }
    }
}

impl TryFrom<Model> for User {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "user")?,
            name: model.name,
            email: model.email,
            is_guest: model.is_guest,
            created_at: from_epoch(model.created_at, "user")?,
        })
    }
}
