use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::{EngineError, ErrorKind};

use serde::Serialize;
pub use identity::{Identity, IdentityError, MAX_TOKEN_TTL_HOURS};
pub use server::{ServerState, router, run, run_with_listener};

mod auth;
mod expenses;
mod groups;
mod identity;
mod server;
mod users;

pub mod types {
    pub mod auth {
        pub use api_types::auth::{Login, Register, Session};
    }

    pub mod user {
        pub use api_types::user::UserView;
    }

    pub mod group {
        pub use api_types::group::{
            GroupList, GroupMemberView, GroupNew, GroupView, GuestNew, MembersAdded,
            MembersChange,
        };
    }

    pub mod expense {
        pub use api_types::expense::{
            ExpenseNew, ExpenseUpdate, ExpenseView, Location, NetSpendingList, NetSpendingView,
            Split,
        };
    }
}

pub enum ServerError {
    Engine(EngineError),
    Identity(IdentityError),
}

const INTERNAL: &str = "internal server error";

#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err.kind() {
        ErrorKind::Validation => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::Authorization => StatusCode::FORBIDDEN,
        ErrorKind::Authentication => StatusCode::UNAUTHORIZED,
        ErrorKind::Internal | ErrorKind::Persistence => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            INTERNAL.to_string()
        }
        EngineError::Internal(msg) => {
            tracing::error!("engine failure: {msg}");
            INTERNAL.to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => (status_for_engine_error(&err), message_for_engine_error(err)),
            ServerError::Identity(err) => {
                tracing::error!("cannot issue token: {err}");
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL.to_string())
            }
        };

        (status, Json(Error { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

impl From<IdentityError> for ServerError {
    fn from(value: IdentityError) -> Self {
        Self::Identity(value)
    }
}
