use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};

use super::{
    dto::{LoginRequest, RegisterRequest},
    jwt::JwtKeys,
    password::{hash_password, verify_password, PasswordError},
    repo_types::User,
};
use crate::{error::ApiError, store::Store};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Argon2id PHC string with default parameters that no password matches.
/// Verified against when the login email has no account.
const UNKNOWN_ACCOUNT_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$c29tZXNhbHRzb21lc2FsdA$AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";

/// One argon2 verification whether or not the account exists.
fn check_password(plain: &str, stored: Option<&str>) -> Result<bool, PasswordError> {
    match stored {
        Some(hash) => verify_password(plain, hash),
        None => verify_password(plain, UNKNOWN_ACCOUNT_HASH).map(|_| false),
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Creates the account and issues its first credential.
pub async fn register(
    store: &dyn Store,
    keys: &JwtKeys,
    req: RegisterRequest,
) -> Result<(User, String), ApiError> {
    let username = req.username.trim().to_string();
    let email = normalize_email(&req.email);

    if username.is_empty() {
        return Err(ApiError::MissingField("username"));
    }
    if email.is_empty() {
        return Err(ApiError::MissingField("email"));
    }
    if req.password.is_empty() {
        return Err(ApiError::MissingField("password"));
    }
    if !is_valid_email(&email) {
        warn!(email = %email, "invalid email");
        return Err(ApiError::InvalidField("email"));
    }

    if store.identity_taken(&username, &email).await? {
        warn!(username = %username, email = %email, "username or email already registered");
        return Err(ApiError::DuplicateIdentity);
    }

    let password = req.password;
    let hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(ApiError::internal)?
        .map_err(ApiError::internal)?;

    // A concurrent registration can still win the race; the unique constraint reports it as Duplicate.
    let user = store.create_user(&username, &email, &hash).await?;
    let token = keys.issue(user.id).map_err(ApiError::internal)?;

    info!(user_id = %user.id, username = %user.username, "user registered");
    Ok((user, token))
}

/// Unknown email and wrong password are indistinguishable to the caller.
pub async fn login(
    store: &dyn Store,
    keys: &JwtKeys,
    req: LoginRequest,
) -> Result<(User, String), ApiError> {
    let email = normalize_email(&req.email);
    if email.is_empty() {
        return Err(ApiError::MissingField("email"));
    }
    if req.password.is_empty() {
        return Err(ApiError::MissingField("password"));
    }

    let user = store.find_user_by_email(&email).await?;

    let password = req.password;
    let stored = user.as_ref().map(|u| u.password_hash.clone());
    let ok = tokio::task::spawn_blocking(move || check_password(&password, stored.as_deref()))
        .await
        .map_err(ApiError::internal)?
        .map_err(ApiError::internal)?;

    let user = match user {
        Some(user) if ok => user,
        Some(user) => {
            warn!(user_id = %user.id, "login invalid password");
            return Err(ApiError::InvalidCredentials);
        }
        None => {
            warn!(email = %email, "login unknown email");
            return Err(ApiError::InvalidCredentials);
        }
    };

    let token = keys.issue(user.id).map_err(ApiError::internal)?;
    info!(user_id = %user.id, "user logged in");
    Ok((user, token))
}
