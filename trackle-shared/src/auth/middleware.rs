/// Request authentication
///
/// [`authenticate`] is the single entry point the API middleware calls
/// for protected routes: it parses the `Authorization` header, validates
/// the access token, and checks the token's session generation against
/// the user row. A token minted before the user's last logout carries a
/// stale generation and is rejected exactly like a forged one.
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::auth::jwt::validate_access_token;
use crate::models::user::User;

/// Identity attached to a request once authentication succeeds
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub email: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Unauthorized request")]
    MissingCredentials,
    #[error("Expected a Bearer token")]
    InvalidFormat,
    #[error("Invalid or expired token")]
    InvalidToken,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Pull the token out of an `Authorization: Bearer <token>` header value.
pub fn extract_bearer(header: Option<&str>) -> Result<&str, AuthError> {
    let header = header.ok_or(AuthError::MissingCredentials)?;

    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::InvalidFormat)
}

/// Authenticate a request from its `Authorization` header value.
///
/// Returns the caller's identity, or an error that the API layer maps to
/// a 401 response. Token problems and stale generations are reported
/// identically so the response does not reveal why a token was refused.
pub async fn authenticate(
    pool: &SqlitePool,
    secret: &str,
    auth_header: Option<&str>,
) -> Result<AuthContext, AuthError> {
    let token = extract_bearer(auth_header)?;

    let claims = validate_access_token(token, secret).map_err(|_| AuthError::InvalidToken)?;

    match User::token_generation(pool, claims.sub).await? {
        Some(current) if claims.generation == current => Ok(AuthContext {
            user_id: claims.sub,
            email: claims.email,
        }),
        Some(current) => {
            tracing::debug!(
                user_id = %claims.sub,
                token_generation = claims.generation,
                current_generation = current,
                "rejected token from a revoked session"
            );
            Err(AuthError::InvalidToken)
        }
        None => {
            tracing::debug!(user_id = %claims.sub, "rejected token for unknown user");
            Err(AuthError::InvalidToken)
        }
    }
}
