//! User API endpoints

use api_types::user::UserView;
use axum::{Extension, Json};
use engine::User;

pub(crate) fn user_view(user: User) -> UserView {
    UserView {
        id: user.id,
        name: user.name,
        email: user.email,
        guest: user.is_guest,
        created_at: user.created_at,
    }
}

/// Handle requests for the authenticated user
pub async fn me(Extension(user): Extension<User>) -> Json<UserView> {
    Json(user_view(user))
}
