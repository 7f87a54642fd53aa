//! Ownership enforcement for post mutations.
//!
//! Existence is checked before ownership, so a missing post (404) and someone
//! else's post (403) stay distinguishable.

use tracing::warn;
use uuid::Uuid;

use super::repo_types::Post;
use crate::{auth::extractors::AuthUser, error::ApiError, store::Store};

/// Resources with a single owner allowed to mutate them.
pub trait OwnedResource {
    fn owner_id(&self) -> Uuid;
}

impl OwnedResource for Post {
    fn owner_id(&self) -> Uuid {
        self.owner_id
    }
}

impl OwnedResource for Uuid {
    fn owner_id(&self) -> Uuid {
        *self
    }
}

pub fn ensure_owner<R: OwnedResource>(resource: &R, caller: AuthUser) -> Result<(), ApiError> {
    let AuthUser(caller_id) = caller;
    if resource.owner_id() == caller_id {
        Ok(())
    } else {
        warn!(caller = %caller_id, owner = %resource.owner_id(), "ownership check failed");
        Err(ApiError::Forbidden)
    }
}

/// Looks up the post's owner and checks it against the caller.
pub async fn authorize_post_mutation(
    store: &dyn Store,
    post_id: Uuid,
    caller: AuthUser,
) -> Result<(), ApiError> {
    let owner = store
        .post_owner(post_id)
        .await?
        .ok_or(ApiError::NotFound("post"))?;
    ensure_owner(&owner, caller)
}
