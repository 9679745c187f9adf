use std::collections::HashSet;

use sea_orm::{ConnectionTrait, PaginatorTrait, QueryFilter, prelude::*};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, group_members, groups};

use super::Engine;

impl Engine {
    /// Return `true` if `user_id` belongs to `group_id`.
    pub async fn is_member(&self, user_id: Uuid, group_id: Uuid) -> ResultEngine<bool> {
        member_exists(&self.database, user_id, group_id).await
    }

    /// Return `true` if every user in `user_ids` belongs to `group_id`.
    ///
    /// Duplicates are ignored; an empty list is trivially satisfied.
    pub async fn all_members_of(&self, user_ids: &[Uuid], group_id: Uuid) -> ResultEngine<bool> {
        all_members(&self.database, user_ids, group_id).await
    }
}

pub(super) async fn member_exists<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
    group_id: Uuid,
) -> ResultEngine<bool> {
    let row = group_members::Entity::find_by_id((group_id.to_string(), user_id.to_string()))
        .one(db)
        .await?;
    Ok(row.is_some())
}

pub(super) async fn all_members<C: ConnectionTrait>(
    db: &C,
    user_ids: &[Uuid],
    group_id: Uuid,
) -> ResultEngine<bool> {
    let unique: HashSet<String> = user_ids.iter().map(Uuid::to_string).collect();
    if unique.is_empty() {
        return Ok(true);
    }
    let expected = unique.len() as u64;

    // (group_id, user_id) is the primary key, so each member matches one row.
    let found = group_members::Entity::find()
        .filter(group_members::Column::GroupId.eq(group_id.to_string()))
        .filter(group_members::Column::UserId.is_in(unique))
        .count(db)
        .await?;

    Ok(found == expected)
}

pub(super) async fn require_group<C: ConnectionTrait>(
    db: &C,
    group_id: Uuid,
) -> ResultEngine<groups::Model> {
    groups::Entity::find_by_id(group_id.to_string())
        .one(db)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound("group not exists".to_string()))
}

/// Load the group and check that `user_id` belongs to it.
pub(super) async fn require_group_member<C: ConnectionTrait>(
    db: &C,
    group_id: Uuid,
    user_id: Uuid,
) -> ResultEngine<groups::Model> {
    let group = require_group(db, group_id).await?;
    if !member_exists(db, user_id, group_id).await? {
        return Err(EngineError::Forbidden("user is not a group member".to_string()));
    }
    Ok(group)
}

/// Load the group and check that `user_id` created it.
pub(super) async fn require_group_admin<C: ConnectionTrait>(
    db: &C,
    group_id: Uuid,
    user_id: Uuid,
) -> ResultEngine<groups::Model> {
    let group = require_group(db, group_id).await?;
    if group.created_by != user_id.to_string() {
        return Err(EngineError::Forbidden(
            "only the group admin can do this".to_string(),
        ));
    }
    Ok(group)
}
