use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header::LOCATION, HeaderMap, HeaderValue, StatusCode},
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use super::{dto::PostRequest, guard::authorize_post_mutation, repo_types::Post};
use crate::{auth::extractors::AuthUser, error::ApiError, state::AppState};

pub fn post_routes() -> Router<AppState> {
    Router::new()
        .route("/posts", get(list_posts).post(create_post))
        .route(
            "/posts/:id",
            get(get_post).put(update_post).delete(delete_post),
        )
}

pub(crate) fn parse_id(raw: &str, resource: &'static str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::InvalidId(resource))
}

#[instrument(skip(state))]
pub async fn list_posts(
    State(state): State<AppState>,
    AuthUser(_): AuthUser,
) -> Result<Json<Vec<Post>>, ApiError> {
    Ok(Json(state.store.list_posts().await?))
}

#[instrument(skip(state))]
pub async fn get_post(
    State(state): State<AppState>,
    AuthUser(_): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Post>, ApiError> {
    let id = parse_id(&id, "post")?;
    let post = state
        .store
        .get_post(id)
        .await?
        .ok_or(ApiError::NotFound("post"))?;
    Ok(Json(post))
}

#[instrument(skip(state, payload))]
pub async fn create_post(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    payload: Result<Json<PostRequest>, JsonRejection>,
) -> Result<(StatusCode, HeaderMap, Json<Post>), ApiError> {
    let Json(payload) = payload.map_err(|_| ApiError::InvalidBody)?;
    payload.validate()?;

    let post = state
        .store
        .create_post(user_id, &payload.title, &payload.body)
        .await?;
    info!(post_id = %post.id, owner_id = %user_id, "post created");

    let mut headers = HeaderMap::new();
    if let Ok(location) = HeaderValue::from_str(&format!("/api/posts/{}", post.id)) {
        headers.insert(LOCATION, location);
    }
    Ok((StatusCode::CREATED, headers, Json(post)))
}

#[instrument(skip(state, payload))]
pub async fn update_post(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
    payload: Result<Json<PostRequest>, JsonRejection>,
) -> Result<Json<Post>, ApiError> {
    let id = parse_id(&id, "post")?;
    let Json(payload) = payload.map_err(|_| ApiError::InvalidBody)?;
    payload.validate()?;

    authorize_post_mutation(state.store.as_ref(), id, caller).await?;

    // Deleted between the ownership read and the write.
    let post = state
        .store
        .update_post(id, &payload.title, &payload.body)
        .await?
        .ok_or(ApiError::NotFound("post"))?;
    info!(post_id = %id, "post updated");
    Ok(Json(post))
}

#[instrument(skip(state))]
pub async fn delete_post(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id, "post")?;
    authorize_post_mutation(state.store.as_ref(), id, caller).await?;

    if !state.store.delete_post(id).await? {
        return Err(ApiError::NotFound("post"));
    }
    info!(post_id = %id, "post deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_id_rejects_non_uuid() {
        assert!(matches!(parse_id("42", "post"), Err(ApiError::InvalidId("post"))));
        let id = Uuid::new_v4();
        assert_eq!(parse_id(&id.to_string(), "post").unwrap(), id);
    }
}
