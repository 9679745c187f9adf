use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};

use std::{net::SocketAddr, sync::Arc};

use crate::{Identity, auth, expenses, groups, users};
use engine::{Engine, EngineError};

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub identity: Arc<Identity>,
}

impl ServerState {
    pub fn new(engine: Engine, identity: Identity) -> Self {
        Self {
            engine: Arc::new(engine),
            identity: Arc::new(identity),
        }
    }
}

/// Resolve the bearer token to a stored user and hand it to the handler as an
/// `Extension<engine::User>`.
async fn authenticate(
    auth_header: Option<TypedHeader<Authorization<Bearer>>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(TypedHeader(Authorization(bearer))) = auth_header else {
        return Err(StatusCode::UNAUTHORIZED);
    };

    let user_id = state.identity.verify(bearer.token()).map_err(|err| {
        tracing::debug!("rejected token: {err}");
        StatusCode::UNAUTHORIZED
    })?;

    let user = match state.engine.user(user_id).await {
        Ok(user) => user,
        Err(EngineError::KeyNotFound(_)) => return Err(StatusCode::UNAUTHORIZED),
        Err(err) => {
            tracing::error!("failed to load token user {user_id}: {err}");
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

pub fn router(state: ServerState) -> Router {
    let public = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login));

    let private = Router::new()
        .route("/users/me", get(users::me))
        .route("/groups", post(groups::create))
        .route("/groups/me", get(groups::mine))
        .route("/groups/admin", get(groups::administered))
        .route("/groups/{id}", get(groups::get).delete(groups::remove))
        .route(
            "/groups/{id}/members",
            post(groups::add_members).delete(groups::remove_members),
        )
        .route("/groups/{id}/guests", post(groups::add_guest))
        .route("/groups/{id}/expenses/me", get(expenses::net_spending))
        .route("/expenses", post(expenses::create))
        .route(
            "/expenses/{id}",
            get(expenses::get)
                .put(expenses::update)
                .delete(expenses::remove),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), authenticate));

    public.merge(private).with_state(state)
}

pub async fn run(engine: Engine, identity: Identity, addr: SocketAddr) {
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener on {addr}: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, identity, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Engine,
    identity: Identity,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(ServerState::new(engine, identity))).await
}
