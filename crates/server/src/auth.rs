//! Registration and login endpoints

use api_types::auth::{Login, Register, Session};
use axum::{Json, extract::State, http::StatusCode};

use crate::{ServerError, server::ServerState, users::user_view};

/// Handle requests for registering a new user
pub async fn register(
    State(state): State<ServerState>,
    Json(payload): Json<Register>,
) -> Result<(StatusCode, Json<Session>), ServerError> {
    let user = state
        .engine
        .register_user(&payload.name, &payload.email, &payload.password)
        .await?;
    let token = state.identity.issue(user.id)?;

    Ok((
        StatusCode::CREATED,
        Json(Session {
            token,
            user: user_view(user),
        }),
    ))
}

/// Handle requests for exchanging credentials for a token
pub async fn login(
    State(state): State<ServerState>,
    Json(payload): Json<Login>,
) -> Result<Json<Session>, ServerError> {
    let user = state
        .engine
        .authenticate(&payload.email, &payload.password)
        .await?;
    let token = state.identity.issue(user.id)?;

    Ok(Json(Session {
        token,
        user: user_view(user),
    }))
}
