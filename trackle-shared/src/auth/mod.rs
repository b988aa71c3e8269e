/// Authentication module
///
/// Provides JWT token management, password hashing, and the request
/// authentication check used by the API middleware.
pub mod jwt;
pub mod middleware;
pub mod password;

pub use jwt::{create_token, validate_access_token, validate_refresh_token, Claims, TokenError, TokenType};
pub use middleware::{authenticate, AuthContext, AuthError};
pub use password::{hash_password, verify_password, PasswordError};
