use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{dto::PublicUser, extractors::AuthUser},
    error::ApiError,
    posts::handlers::parse_id,
    state::AppState,
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/:id", delete(delete_user))
}

/// Any authenticated caller may list every user.
#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
    AuthUser(_): AuthUser,
) -> Result<Json<Vec<PublicUser>>, ApiError> {
    let users = state.store.list_users().await?;
    Ok(Json(users.into_iter().map(PublicUser::from).collect()))
}

/// Any authenticated caller may delete any user; the user's posts go with it.
// TODO: restrict to self-deletion once clients stop relying on deleting other accounts.
#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    AuthUser(caller_id): AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id, "user")?;
    if caller_id != id {
        warn!(caller = %caller_id, target = %id, "deleting another user's account");
    }

    if !state.store.delete_user(id).await? {
        return Err(ApiError::NotFound("user"));
    }
    info!(user_id = %id, "user deleted with its posts");
    Ok(StatusCode::NO_CONTENT)
}
