//! # Auth
//!
//! Single-admin session handling. Credentials come from the environment and
//! the secrets mount; a successful login mints a UUID v4 token stored in
//! redis under a TTL, and every admin handler resolves that token before
//! touching the roster.
//!
//! There is exactly one role. Either the caller holds a live session and can
//! do everything the panel offers, or it gets 401.

use axum::http::{header::AUTHORIZATION, HeaderMap};
use redis::{aio::ConnectionManager, AsyncCommands};
use uuid::Uuid;

use crate::{config::Config, error::AppError};

pub const SESSION_TTL_SECONDS: u64 = 8 * 60 * 60;

fn session_key(token: &str) -> String {
    format!("sessao:{token}")
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// Checks the credentials and opens a session. The token is the only proof
/// of identity the frontend holds on to.
pub async fn authenticate(
    conn: &mut ConnectionManager,
    config: &Config,
    email: &str,
    password: &str,
) -> Result<String, AppError> {
    if email != config.admin_email || password != config.admin_password {
        return Err(AppError::Auth);
    }

    let token = Uuid::new_v4().to_string();
    let _: () = conn
        .set_ex(session_key(&token), email, SESSION_TTL_SECONDS)
        .await?;

    Ok(token)
}

/// Resolves the bearer token to the logged-in admin, or 401 when the token
/// is missing, unknown or expired.
pub async fn current_session(
    conn: &mut ConnectionManager,
    headers: &HeaderMap,
) -> Result<String, AppError> {
    let token = bearer_token(headers).ok_or(AppError::Auth)?;

    let email: Option<String> = conn.get(session_key(token)).await?;
    email.ok_or(AppError::Auth)
}

/// Drops the session. Idempotent: logging out twice is not an error.
pub async fn end_session(
    conn: &mut ConnectionManager,
    headers: &HeaderMap,
) -> Result<(), AppError> {
    if let Some(token) = bearer_token(headers) {
        let _: i64 = conn.del(session_key(token)).await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn test_bearer_token_parsing() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc-123"));
        assert_eq!(bearer_token(&headers), Some("abc-123"));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc-123"));
        assert_eq!(bearer_token(&headers), None);
    }
}
