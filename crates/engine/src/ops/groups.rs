use std::collections::HashSet;

use sea_orm::{
    ActiveValue, ConnectionTrait, QueryFilter, QueryOrder, Statement, TransactionTrait,
    prelude::*,
};
use uuid::Uuid;

use crate::{
    EngineError, Group, GroupMember, ResultEngine, User, group_members, groups, users,
    util::{from_epoch, now_utc, parse_uuid},
};

use super::{
    Engine,
    membership::{require_group, require_group_admin, require_group_member},
    users::find_user,
    with_tx,
};

impl Engine {
    /// Create a group; the creator becomes its first member and permanent
    /// admin.
    pub async fn create_group(
        &self,
        name: &str,
        description: Option<&str>,
        creator: Uuid,
    ) -> ResultEngine<Group> {
        let mut group = Group::new(name, description, creator)?;
        let group_model: groups::ActiveModel = (&group).into();
        with_tx!(self, |db_tx| {
            let user = find_user(&db_tx, creator).await?;
            group_model.insert(&db_tx).await?;
            insert_member(&db_tx, group.id, creator, group.created_at.timestamp()).await?;
            group.members.push(GroupMember {
                user_id: user.id,
                name: user.name,
                email: user.email,
                is_guest: user.is_guest,
                joined_at: group.created_at,
            });
            tracing::debug!("group {} created by {creator}", group.id);
            Ok(group)
        })
    }

    /// Return a group with its members, if `actor` is one of them.
    pub async fn group(&self, group_id: Uuid, actor: Uuid) -> ResultEngine<Group> {
        let model = require_group_member(&self.database, group_id, actor).await?;
        let mut group = Group::try_from(model)?;
        group.members = load_members(&self.database, group_id).await?;
        Ok(group)
    }

    /// Groups `user_id` belongs to, newest first.
    pub async fn groups_of_member(&self, user_id: Uuid) -> ResultEngine<Vec<Group>> {
        let group_ids: Vec<String> = group_members::Entity::find()
            .filter(group_members::Column::UserId.eq(user_id.to_string()))
            .all(&self.database)
            .await?
            .into_iter()
            .map(|m| m.group_id)
            .collect();
        if group_ids.is_empty() {
            return Ok(Vec::new());
        }

        groups::Entity::find()
            .filter(groups::Column::Id.is_in(group_ids))
            .order_by_desc(groups::Column::CreatedAt)
            .order_by_asc(groups::Column::Id)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Group::try_from)
            .collect()
    }

    /// Groups created by `user_id`, newest first.
    pub async fn groups_created_by(&self, user_id: Uuid) -> ResultEngine<Vec<Group>> {
        groups::Entity::find()
            .filter(groups::Column::CreatedBy.eq(user_id.to_string()))
            .order_by_desc(groups::Column::CreatedAt)
            .order_by_asc(groups::Column::Id)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Group::try_from)
            .collect()
    }

    /// Add existing users to a group (admin only).
    ///
    /// Unknown ids are skipped and users already in the group are left
    /// alone. Returns the requested ids that resolved to a user, in request
    /// order; fails if none did.
    pub async fn add_group_members(
        &self,
        group_id: Uuid,
        user_ids: &[Uuid],
        actor: Uuid,
    ) -> ResultEngine<Vec<Uuid>> {
        if user_ids.is_empty() {
            return Err(EngineError::InvalidInput("no user ids provided".to_string()));
        }
        with_tx!(self, |db_tx| {
            require_group_admin(&db_tx, group_id, actor).await?;

            let requested = dedup(user_ids);
            let known: HashSet<String> = users::Entity::find()
                .filter(users::Column::Id.is_in(requested.iter().map(Uuid::to_string)))
                .all(&db_tx)
                .await?
                .into_iter()
                .map(|m| m.id)
                .collect();
            let valid: Vec<Uuid> = requested
                .into_iter()
                .filter(|id| known.contains(&id.to_string()))
                .collect();
            if valid.is_empty() {
                return Err(EngineError::InvalidInput(
                    "no valid users to add".to_string(),
                ));
            }

            let already: HashSet<String> = group_members::Entity::find()
                .filter(group_members::Column::GroupId.eq(group_id.to_string()))
                .filter(group_members::Column::UserId.is_in(valid.iter().map(Uuid::to_string)))
                .all(&db_tx)
                .await?
                .into_iter()
                .map(|m| m.user_id)
                .collect();

            let joined_at = now_utc().timestamp();
            for user_id in &valid {
                if !already.contains(&user_id.to_string()) {
                    insert_member(&db_tx, group_id, *user_id, joined_at).await?;
                }
            }
            Ok(valid)
        })
    }

    /// Remove members from a group (admin only).
    ///
    /// The admin can never be removed, whoever asks.
    pub async fn remove_group_members(
        &self,
        group_id: Uuid,
        user_ids: &[Uuid],
        actor: Uuid,
    ) -> ResultEngine<()> {
        if user_ids.is_empty() {
            return Err(EngineError::InvalidInput("no user ids provided".to_string()));
        }
        with_tx!(self, |db_tx| {
            let group = require_group(&db_tx, group_id).await?;
            let admin = parse_uuid(&group.created_by, "user")?;
            if user_ids.contains(&admin) {
                return Err(EngineError::Forbidden(
                    "cannot remove group admin".to_string(),
                ));
            }
            if admin != actor {
                return Err(EngineError::Forbidden(
                    "only the group admin can do this".to_string(),
                ));
            }

            group_members::Entity::delete_many()
                .filter(group_members::Column::GroupId.eq(group_id.to_string()))
                .filter(group_members::Column::UserId.is_in(user_ids.iter().map(Uuid::to_string)))
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }

    /// Create a guest and add it to the group (admin only).
    pub async fn add_group_guest(
        &self,
        group_id: Uuid,
        name: &str,
        actor: Uuid,
    ) -> ResultEngine<User> {
        let guest = User::guest(name)?;
        let guest_model = guest.active_model(None);
        with_tx!(self, |db_tx| {
            require_group_admin(&db_tx, group_id, actor).await?;
            guest_model.insert(&db_tx).await?;
            insert_member(&db_tx, group_id, guest.id, guest.created_at.timestamp()).await?;
            Ok(guest)
        })
    }

    /// Delete a group with its expenses, splits and memberships (admin only).
    pub async fn delete_group(&self, group_id: Uuid, actor: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            require_group_admin(&db_tx, group_id, actor).await?;

            let backend = self.database.get_database_backend();
            let group_db_id = group_id.to_string();
            // SQLite dialect, like the rest of the raw SQL in the engine.
            let cascade = [
                "DELETE FROM expense_splits WHERE expense_id IN (SELECT id FROM expenses WHERE group_id = ?);",
                "DELETE FROM expenses WHERE group_id = ?;",
                "DELETE FROM group_members WHERE group_id = ?;",
                "DELETE FROM \"groups\" WHERE id = ?;",
            ];
            for sql in cascade {
                db_tx
                    .execute(Statement::from_sql_and_values(
                        backend,
                        sql,
                        vec![group_db_id.clone().into()],
                    ))
                    .await?;
            }
            tracing::debug!("group {group_id} deleted");
            Ok(())
        })
    }
}

fn dedup(ids: &[Uuid]) -> Vec<Uuid> {
    let mut seen = HashSet::new();
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}

async fn insert_member<C: ConnectionTrait>(
    db: &C,
    group_id: Uuid,
    user_id: Uuid,
    joined_at: i64,
) -> ResultEngine<()> {
    group_members::ActiveModel {
        group_id: ActiveValue::Set(group_id.to_string()),
        user_id: ActiveValue::Set(user_id.to_string()),
        joined_at: ActiveValue::Set(joined_at),
    }
    .insert(db)
    .await?;
    Ok(())
}

async fn load_members<C: ConnectionTrait>(db: &C, group_id: Uuid) -> ResultEngine<Vec<GroupMember>> {
    let rows = group_members::Entity::find()
        .filter(group_members::Column::GroupId.eq(group_id.to_string()))
        .find_also_related(users::Entity)
        .order_by_asc(group_members::Column::JoinedAt)
        .order_by_asc(group_members::Column::UserId)
        .all(db)
        .await?;

    rows.into_iter()
        .filter_map(|(membership, user)| user.map(|user| (membership, user)))
        .map(|(membership, user)| {
            Ok(GroupMember {
                user_id: parse_uuid(&user.id, "user")?,
                name: user.name,
                email: user.email,
                is_guest: user.is_guest,
                joined_at: from_epoch(membership.joined_at, "membership")?,
            })
        })
        .collect()
}
