/// User routes: signup, login, logout, and the per-user task report
///
/// Signup is a multipart form because it carries the avatar file next
/// to the account fields. Login additionally hands the refresh token to
/// the browser as an HttpOnly cookie; logout clears it and revokes the
/// whole session by bumping the user's token generation.
use axum::extract::{Multipart, Path, State};
use axum::http::{header, StatusCode};
use axum::response::{AppendHeaders, IntoResponse};
use axum::{Extension, Json};
use bytes::Bytes;
use chrono::Duration;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use trackle_shared::auth::jwt::{create_token, Claims, TokenType};
use trackle_shared::auth::middleware::AuthContext;
use trackle_shared::auth::password::{hash_password, verify_password};
use trackle_shared::models::task::{Task, TaskSummary, TaskWithProject};
use trackle_shared::models::user::{CreateUser, User};

use crate::app::AppState;
use crate::error::{ApiError, ApiResult, ValidationErrorDetail};
use crate::response::ApiResponse;

#[derive(Debug, Default, Validate)]
struct SignupForm {
    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    name: String,
    #[validate(email(message = "Invalid email format"))]
    email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    password: String,
    #[validate(length(min = 1, max = 56, message = "Country is required"))]
    country: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Signup and login payload: the public user plus a fresh token pair
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AuthPayload {
    user: User,
    access_token: String,
    refresh_token: String,
}

/// POST /api/users/signup (multipart/form-data)
pub async fn signup(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<impl IntoResponse> {
    let mut form = SignupForm::default();
    let mut avatar: Option<(String, Bytes)> = None;

    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };

        match name.as_str() {
            "name" => form.name = field.text().await?,
            "email" => form.email = field.text().await?,
            "password" => form.password = field.text().await?,
            "country" => form.country = field.text().await?,
            "avatar" => {
                let filename = field.file_name().unwrap_or("avatar").to_string();
                avatar = Some((filename, field.bytes().await?));
            }
            _ => {}
        }
    }

    form.validate()?;

    let Some((filename, data)) = avatar else {
        return Err(ApiError::Validation(vec![ValidationErrorDetail {
            field: "avatar".to_string(),
            message: "Avatar file is required".to_string(),
        }]));
    };

    if User::find_by_email(&state.db, &form.email).await?.is_some() {
        return Err(ApiError::DuplicateEmail);
    }

    let avatar_url = state.avatars.upload(&filename, data).await?;

    let password_hash = hash_password(&form.password)?;
    let user = User::create(
        &state.db,
        CreateUser {
            name: form.name,
            email: form.email,
            password_hash,
            country: form.country,
            avatar_url,
        },
    )
    .await?;

    let (access_token, refresh_token) = issue_tokens(&state, &user)?;
    User::store_tokens(&state.db, user.id, &access_token, &refresh_token).await?;

    tracing::info!(user_id = %user.id, "user registered");

    Ok(ApiResponse::new(
        StatusCode::CREATED,
        AuthPayload {
            user,
            access_token,
            refresh_token,
        },
        "User registered successfully",
    ))
}

/// POST /api/users/login
///
/// An unknown email and a wrong password produce the same 401, so the
/// response does not reveal which accounts exist.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    request.validate()?;

    let user = User::find_by_email(&state.db, &request.email)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid email or password".to_string()))?;

    if !verify_password(&request.password, &user.password_hash)? {
        return Err(ApiError::Unauthorized("Invalid email or password".to_string()));
    }

    let (access_token, refresh_token) = issue_tokens(&state, &user)?;

    tracing::info!(user_id = %user.id, "user logged in");

    let cookie = refresh_cookie(&state, Some(&refresh_token));

    Ok((
        AppendHeaders([(header::SET_COOKIE, cookie)]),
        ApiResponse::ok(
            AuthPayload {
                user,
                access_token,
                refresh_token,
            },
            "Login successful",
        ),
    ))
}

/// POST /api/users/logout
pub async fn logout(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<impl IntoResponse> {
    let revoked = User::revoke_tokens(&state.db, auth.user_id).await?;
    if !revoked {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    tracing::info!(user_id = %auth.user_id, "user logged out");

    Ok((
        AppendHeaders([(header::SET_COOKIE, refresh_cookie(&state, None))]),
        ApiResponse::ok(serde_json::Value::Null, "User logged out"),
    ))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserTasksReport {
    pub summary: TaskSummary,
    pub tasks: Vec<TaskWithProject>,
}

/// GET /api/users/:user_id/tasks
///
/// The report is scoped by the path id, not by the caller.
pub async fn user_tasks(
    State(state): State<AppState>,
    Extension(_auth): Extension<AuthContext>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<ApiResponse<UserTasksReport>> {
    let tasks = Task::list_for_owner_with_project(&state.db, user_id).await?;
    let summary = TaskSummary::from_statuses(tasks.iter().map(|t| t.task.status));

    Ok(ApiResponse::ok(
        UserTasksReport { summary, tasks },
        "User tasks fetched successfully",
    ))
}

fn issue_tokens(state: &AppState, user: &User) -> Result<(String, String), ApiError> {
    let jwt = &state.config.jwt;

    let access_claims = Claims::with_expiration(
        user.id,
        Some(user.email.clone()),
        user.token_generation,
        TokenType::Access,
        Duration::hours(jwt.access_ttl_hours),
    );
    let refresh_claims = Claims::with_expiration(
        user.id,
        None,
        user.token_generation,
        TokenType::Refresh,
        Duration::days(jwt.refresh_ttl_days),
    );

    let access = create_token(&access_claims, &jwt.secret)?;
    let refresh = create_token(&refresh_claims, &jwt.secret)?;

    Ok((access, refresh))
}

/// Build the `refreshToken` cookie. `None` clears it (logout).
fn refresh_cookie(state: &AppState, token: Option<&str>) -> String {
    let max_age = match token {
        Some(_) => state.config.jwt.refresh_ttl_days * 24 * 60 * 60,
        None => 0,
    };

    let mut cookie = format!(
        "refreshToken={}; HttpOnly; Path=/; Max-Age={max_age}; SameSite=Strict",
        token.unwrap_or("")
    );

    if state.config.api.production {
        cookie.push_str("; Secure");
    }

    cookie
}
