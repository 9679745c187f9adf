//! Group API endpoints

use api_types::{
    group::{GroupList, GroupMemberView, GroupNew, GroupView, GuestNew, MembersAdded, MembersChange},
    user::UserView,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{Group, User};
use uuid::Uuid;

use crate::{ServerError, server::ServerState, users::user_view};

fn group_view(group: Group) -> GroupView {
    GroupView {
        id: group.id,
        name: group.name,
        description: group.description,
        created_by: group.created_by,
        created_at: group.created_at,
        members: group
            .members
            .into_iter()
            .map(|member| GroupMemberView {
                user_id: member.user_id,
                name: member.name,
                email: member.email,
                guest: member.is_guest,
                joined_at: member.joined_at,
            })
            .collect(),
    }
}

fn group_list(groups: Vec<Group>) -> GroupList {
    GroupList {
        groups: groups.into_iter().map(group_view).collect(),
    }
}

/// Handle requests for creating a new group
pub async fn create(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<GroupNew>,
) -> Result<(StatusCode, Json<GroupView>), ServerError> {
    let group = state
        .engine
        .create_group(&payload.name, payload.description.as_deref(), user.id)
        .await?;

    Ok((StatusCode::CREATED, Json(group_view(group))))
}

/// Handle requests for listing the groups the user belongs to
pub async fn mine(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<GroupList>, ServerError> {
    let groups = state.engine.groups_of_member(user.id).await?;
    Ok(Json(group_list(groups)))
}

/// Handle requests for listing the groups the user administers
pub async fn administered(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<GroupList>, ServerError> {
    let groups = state.engine.groups_created_by(user.id).await?;
    Ok(Json(group_list(groups)))
}

pub async fn get(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(group_id): Path<Uuid>,
) -> Result<Json<GroupView>, ServerError> {
    let group = state.engine.group(group_id, user.id).await?;
    Ok(Json(group_view(group)))
}

pub async fn remove(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(group_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_group(group_id, user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Handle requests for adding registered users to a group
pub async fn add_members(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(group_id): Path<Uuid>,
    Json(payload): Json<MembersChange>,
) -> Result<Json<MembersAdded>, ServerError> {
    let user_ids = state
        .engine
        .add_group_members(group_id, &payload.user_ids, user.id)
        .await?;
    Ok(Json(MembersAdded { user_ids }))
}

pub async fn remove_members(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(group_id): Path<Uuid>,
    Json(payload): Json<MembersChange>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .remove_group_members(group_id, &payload.user_ids, user.id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Handle requests for adding a guest (a member without an account)
pub async fn add_guest(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(group_id): Path<Uuid>,
    Json(payload): Json<GuestNew>,
) -> Result<(StatusCode, Json<UserView>), ServerError> {
    let guest = state
        .engine
        .add_group_guest(group_id, &payload.name, user.id)
        .await?;
    Ok((StatusCode::CREATED, Json(user_view(guest))))
}
