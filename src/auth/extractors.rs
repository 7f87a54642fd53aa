use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::warn;
use uuid::Uuid;

use super::jwt::JwtKeys;
use crate::error::ApiError;

/// Authenticated caller, attached to the request by [`require_auth`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser(pub Uuid);

/// Resolves the bearer credential in `headers` to a caller identity.
pub fn authenticate(headers: &HeaderMap, keys: &JwtKeys) -> Result<AuthUser, ApiError> {
    let header = headers.get(AUTHORIZATION).ok_or(ApiError::MissingCredential)?;
    let token = header
        .to_str()
        .ok()
        .and_then(|h| h.strip_prefix("Bearer "))
        .ok_or(ApiError::MalformedCredential)?;

    let claims = keys.decode(token).map_err(|e| {
        warn!(reason = %e, "rejected credential");
        ApiError::from(e)
    })?;
    Ok(AuthUser(claims.sub))
}

/// Route layer for everything except health, register and login.
pub async fn require_auth(
    State(keys): State<JwtKeys>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = authenticate(request.headers(), &keys)?;
    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthUser>() {
            return Ok(*user);
        }
        let user = authenticate(&parts.headers, &JwtKeys::from_ref(state))?;
        parts.extensions.insert(user);
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn keys() -> JwtKeys {
        JwtKeys::new(b"dev-secret", 3600)
    }

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn missing_header() {
        let err = authenticate(&HeaderMap::new(), &keys()).unwrap_err();
        assert!(matches!(err, ApiError::MissingCredential));
    }

    #[test]
    fn wrong_scheme() {
        let token = keys().issue(Uuid::new_v4()).unwrap();
        for value in [format!("Basic {token}"), token.clone(), format!("bearer{token}")] {
            let err = authenticate(&headers(&value), &keys()).unwrap_err();
            assert!(matches!(err, ApiError::MalformedCredential), "{value}");
        }
    }

    #[test]
    fn bad_tokens_collapse_to_unauthenticated() {
        let forged = JwtKeys::new(b"other-secret", 3600).issue(Uuid::new_v4()).unwrap();
        let expired = keys().issue_at(Uuid::new_v4(), 1_000).unwrap();
        for token in [forged, expired, "garbage".to_string()] {
            let err = authenticate(&headers(&format!("Bearer {token}")), &keys()).unwrap_err();
            assert!(matches!(err, ApiError::Unauthenticated));
        }
    }

    #[test]
    fn valid_token_yields_subject() {
        let user_id = Uuid::new_v4();
        let token = keys().issue(user_id).unwrap();
        let user = authenticate(&headers(&format!("Bearer {token}")), &keys()).unwrap();
        assert_eq!(user, AuthUser(user_id));
    }
}
