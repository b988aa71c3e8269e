/// JWT token creation and validation
///
/// Trackle issues two kinds of HS256-signed tokens: short-lived access
/// tokens that authenticate API requests and long-lived refresh tokens
/// that are handed to the client as an HttpOnly cookie. Access tokens
/// carry the user's email; refresh tokens carry only the subject.
///
/// Every token embeds the user's session generation. Logout bumps the
/// generation stored on the user row, which invalidates all previously
/// issued tokens without keeping a server-side token list.
///
/// # Example
///
/// ```
/// use chrono::Duration;
/// use trackle_shared::auth::jwt::{create_token, validate_access_token, Claims, TokenType};
/// use uuid::Uuid;
///
/// let secret = "test-secret-key-at-least-32-chars!";
/// let user_id = Uuid::new_v4();
///
/// let claims = Claims::new(user_id, Some("ada@example.com".into()), 0, TokenType::Access);
/// let token = create_token(&claims, secret).unwrap();
///
/// let validated = validate_access_token(&token, secret).unwrap();
/// assert_eq!(validated.sub, user_id);
/// ```
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Issuer claim stamped into every token
const ISSUER: &str = "trackle";

/// Token type, encoded into the claims so an access token can never be
/// replayed where a refresh token is expected (or vice versa)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

impl TokenType {
    /// Default lifetime for this token type
    pub fn default_expiration(&self) -> Duration {
        match self {
            TokenType::Access => Duration::hours(24),
            TokenType::Refresh => Duration::days(30),
        }
    }
}

/// Claims carried by every Trackle token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id)
    pub sub: Uuid,
    /// Issuer
    pub iss: String,
    /// Issued-at (unix seconds)
    pub iat: i64,
    /// Expiration (unix seconds)
    pub exp: i64,
    /// Not-before (unix seconds)
    pub nbf: i64,
    /// User email, present on access tokens only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Session generation the token was minted under
    pub generation: i64,
    /// Access or refresh
    pub token_type: TokenType,
}

impl Claims {
    /// Create claims with the default lifetime for the token type.
    pub fn new(sub: Uuid, email: Option<String>, generation: i64, token_type: TokenType) -> Self {
        Self::with_expiration(sub, email, generation, token_type, token_type.default_expiration())
    }

    /// Create claims with an explicit lifetime.
    pub fn with_expiration(
        sub: Uuid,
        email: Option<String>,
        generation: i64,
        token_type: TokenType,
        expires_in: Duration,
    ) -> Self {
        let now = Utc::now();
        Self {
            sub,
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: (now + expires_in).timestamp(),
            nbf: now.timestamp(),
            email,
            generation,
            token_type,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("failed to sign token: {0}")]
    Signing(String),
    /// Any verification failure. The cause is logged at debug level and
    /// deliberately not exposed, so a caller cannot distinguish a bad
    /// signature from an expired or malformed token.
    #[error("Invalid or expired token")]
    Invalid,
}

/// Sign `claims` into a compact JWT.
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, TokenError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key).map_err(|e| TokenError::Signing(e.to_string()))
}

/// Decode and verify a token's signature, issuer, expiry, and not-before.
///
/// All failures collapse into [`TokenError::Invalid`].
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, TokenError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.validate_exp = true;
    validation.validate_nbf = true;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| {
        tracing::debug!(error = %e, "token validation failed");
        TokenError::Invalid
    })?;

    Ok(token_data.claims)
}

/// Validate a token and require it to be an access token.
pub fn validate_access_token(token: &str, secret: &str) -> Result<Claims, TokenError> {
    let claims = validate_token(token, secret)?;

    if claims.token_type != TokenType::Access {
        tracing::debug!("refresh token presented where an access token was expected");
        return Err(TokenError::Invalid);
    }

    Ok(claims)
}

/// Validate a token and require it to be a refresh token.
pub fn validate_refresh_token(token: &str, secret: &str) -> Result<Claims, TokenError> {
    let claims = validate_token(token, secret)?;

    if claims.token_type != TokenType::Refresh {
        tracing::debug!("access token presented where a refresh token was expected");
        return Err(TokenError::Invalid);
    }

    Ok(claims)
}
