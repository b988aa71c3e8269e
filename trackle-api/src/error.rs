/// API error taxonomy
///
/// Handlers return [`ApiError`] and let the `IntoResponse` impl render
/// the shared envelope with a null `data` field. Internal failures are
/// logged with their detail and masked in the response body.
use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use trackle_shared::auth::jwt::TokenError;
use trackle_shared::auth::middleware::AuthError;
use trackle_shared::auth::password::PasswordError;
use trackle_shared::models::project::PROJECT_LIMIT;
use trackle_shared::models::user::SetPasswordError;

use crate::avatar::UploadError;
use crate::response::ApiResponse;

pub type ApiResult<T> = Result<T, ApiError>;

/// One field that failed validation
#[derive(Debug, Clone, Serialize)]
pub struct ValidationErrorDetail {
    pub field: String,
    pub message: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{}", format_details(.0))]
    Validation(Vec<ValidationErrorDetail>),

    #[error("{0}")]
    BadRequest(String),

    #[error("User already exists")]
    DuplicateEmail,

    #[error("A user can have at most {} projects", PROJECT_LIMIT)]
    ProjectLimit,

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    PermissionDenied(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Upload(String),

    #[error("{0}")]
    Internal(String),
}

fn format_details(details: &[ValidationErrorDetail]) -> String {
    if details.is_empty() {
        return "Validation failed".to_string();
    }

    details
        .iter()
        .map(|detail| detail.message.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_)
            | ApiError::BadRequest(_)
            | ApiError::DuplicateEmail
            | ApiError::ProjectLimit => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::PermissionDenied(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Upload(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let message = match &self {
            ApiError::Internal(detail) => {
                tracing::error!(error = %detail, "internal server error");
                "Internal server error".to_string()
            }
            ApiError::Upload(detail) => {
                tracing::error!(error = %detail, "avatar upload failed");
                "Failed to upload avatar".to_string()
            }
            other => other.to_string(),
        };

        ApiResponse::new(status, serde_json::Value::Null, message).into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource not found".to_string()),
            sqlx::Error::Database(db_err)
                if db_err.message().contains("UNIQUE constraint failed: users.email") =>
            {
                ApiError::DuplicateEmail
            }
            _ => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Database(db_err) => ApiError::from(db_err),
            other => ApiError::Unauthorized(other.to_string()),
        }
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Signing(detail) => ApiError::Internal(detail),
            invalid @ TokenError::Invalid => ApiError::Unauthorized(invalid.to_string()),
        }
    }
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<SetPasswordError> for ApiError {
    fn from(err: SetPasswordError) -> Self {
        match err {
            SetPasswordError::Hash(hash_err) => ApiError::from(hash_err),
            SetPasswordError::Database(db_err) => ApiError::from(db_err),
        }
    }
}

impl From<UploadError> for ApiError {
    fn from(err: UploadError) -> Self {
        ApiError::Upload(err.to_string())
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        tracing::debug!(error = %err, "failed to read multipart form");
        ApiError::BadRequest("Invalid multipart form data".to_string())
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let details = errors
            .field_errors()
            .iter()
            .flat_map(|(field, field_errors)| {
                let field = field.to_string();
                field_errors
                    .iter()
                    .map(move |error| ValidationErrorDetail {
                        field: field.clone(),
                        message: error
                            .message
                            .as_ref()
                            .map(|message| message.to_string())
                            .unwrap_or_else(|| format!("{field} is invalid")),
                    })
                    .collect::<Vec<_>>()
            })
            .collect();

        ApiError::Validation(details)
    }
}
