//! Every failure a handler can return, and the one table that decides what
//! the client gets to see for it.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::{auth::jwt::TokenError, store::StoreError};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("invalid {0}")]
    InvalidField(&'static str),
    #[error("invalid request body")]
    InvalidBody,
    #[error("invalid {0} id")]
    InvalidId(&'static str),
    #[error("username or email already exists")]
    DuplicateIdentity,
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("authorization header is required")]
    MissingCredential,
    #[error("invalid authorization format")]
    MalformedCredential,
    #[error("invalid or expired token")]
    Unauthenticated,
    #[error("you can only modify your own posts")]
    Forbidden,
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("service temporarily unavailable")]
    StoreUnavailable(String),
    #[error("internal server error")]
    Internal(#[source] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    code: &'static str,
}

impl ApiError {
    /// Status and stable code per kind.
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::MissingField(_) => (StatusCode::BAD_REQUEST, "missing_field"),
            ApiError::InvalidField(_) => (StatusCode::BAD_REQUEST, "invalid_field"),
            ApiError::InvalidBody => (StatusCode::BAD_REQUEST, "invalid_body"),
            ApiError::InvalidId(_) => (StatusCode::BAD_REQUEST, "invalid_id"),
            ApiError::DuplicateIdentity => (StatusCode::BAD_REQUEST, "duplicate_identity"),
            ApiError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "invalid_credentials"),
            ApiError::MissingCredential => (StatusCode::UNAUTHORIZED, "missing_credential"),
            ApiError::MalformedCredential => (StatusCode::UNAUTHORIZED, "malformed_credential"),
            ApiError::Unauthenticated => (StatusCode::UNAUTHORIZED, "unauthenticated"),
            ApiError::Forbidden => (StatusCode::FORBIDDEN, "forbidden"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            ApiError::StoreUnavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "store_unavailable"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status_and_code().0
    }

    pub fn internal(e: impl Into<anyhow::Error>) -> Self {
        ApiError::Internal(e.into())
    }
}

/// Which check failed stays server-side.
impl From<TokenError> for ApiError {
    fn from(_: TokenError) -> Self {
        ApiError::Unauthenticated
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Duplicate => ApiError::DuplicateIdentity,
            StoreError::Unavailable(msg) => ApiError::StoreUnavailable(msg),
            StoreError::UnknownOwner => ApiError::NotFound("user"),
            StoreError::Database(e) => ApiError::Internal(e.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        match &self {
            ApiError::Internal(cause) => error!(error = ?cause, "request failed"),
            ApiError::StoreUnavailable(cause) => error!(error = %cause, "store unavailable"),
            _ => {}
        }
        let body = Json(ErrorBody {
            error: self.to_string(),
            code,
        });
        (status, body).into_response()
    }
}
