use sea_orm::{ConnectionTrait, QueryFilter, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine, User,
    password::{hash_password, verify_password},
    users,
    util::normalize_email,
};

use super::{Engine, with_tx};

const BAD_CREDENTIALS: &str = "invalid email or password";

impl Engine {
    /// Register a user with an email and password.
    pub async fn register_user(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> ResultEngine<User> {
        let user = User::registered(name, email)?;
        let password_hash = hash_password(password)?;
        let email = user.email.clone().unwrap_or_default();
        let model = user.active_model(Some(password_hash));
        with_tx!(self, |db_tx| {
            if find_by_email(&db_tx, &email).await?.is_some() {
                return Err(EngineError::ExistingKey(email));
            }
            model.insert(&db_tx).await?;
            tracing::debug!("user {} registered", user.id);
            Ok(user)
        })
    }

    /// Create a guest: a user with a name only, who cannot log in.
    pub async fn create_guest(&self, name: &str) -> ResultEngine<User> {
        let user = User::guest(name)?;
        user.active_model(None).insert(&self.database).await?;
        Ok(user)
    }

    /// Check an email/password pair. Unknown emails and wrong passwords fail
    /// the same way.
    pub async fn authenticate(&self, email: &str, password: &str) -> ResultEngine<User> {
        let unauthorized = || EngineError::Unauthorized(BAD_CREDENTIALS.to_string());
        let email = normalize_email(email).map_err(|_| unauthorized())?;
        let model = find_by_email(&self.database, &email)
            .await?
            .ok_or_else(unauthorized)?;
        let verified = model
            .password_hash
            .as_deref()
            .is_some_and(|hash| verify_password(password, hash));
        if !verified {
            return Err(unauthorized());
        }
        User::try_from(model)
    }

    /// Return a user by id.
    pub async fn user(&self, user_id: Uuid) -> ResultEngine<User> {
        find_user(&self.database, user_id).await
    }
}

pub(super) async fn find_user<C: ConnectionTrait>(db: &C, user_id: Uuid) -> ResultEngine<User> {
    users::Entity::find_by_id(user_id.to_string())
        .one(db)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))
        .and_then(User::try_from)
}

async fn find_by_email<C: ConnectionTrait>(
    db: &C,
    email: &str,
) -> ResultEngine<Option<users::Model>> {
    users::Entity::find()
        .filter(users::Column::Email.eq(email))
        .one(db)
        .await
        .map_err(Into::into)
}
