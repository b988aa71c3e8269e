/// User model and database operations
///
/// A user owns projects and tasks. The row also carries session state:
/// the most recently issued token pair and a `token_generation` counter
/// that increments on logout, invalidating every token minted before it.
///
/// # Example
///
/// ```no_run
/// use trackle_shared::models::user::{CreateUser, User};
///
/// # async fn example(pool: sqlx::SqlitePool) -> Result<(), sqlx::Error> {
/// let user = User::create(
///     &pool,
///     CreateUser {
///         name: "Ada Lovelace".to_string(),
///         email: "ada@example.com".to_string(),
///         password_hash: "$argon2id$...".to_string(),
///         country: "United Kingdom".to_string(),
///         avatar_url: "/uploads/ada.png".to_string(),
///     },
/// )
/// .await?;
/// assert_eq!(user.email, "ada@example.com");
/// # Ok(())
/// # }
/// ```
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::auth::password::{hash_password, PasswordError};

/// User role. Every account starts as `User`; the other roles exist for
/// future administrative surfaces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
    Moderator,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
            Role::Moderator => "moderator",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    /// Stored lowercase; the column also compares case-insensitively
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub country: String,
    pub role: Role,
    pub avatar_url: String,
    /// Ids of the user's projects, maintained alongside the projects table
    pub project_ids: Json<Vec<Uuid>>,
    #[serde(skip_serializing, default)]
    pub access_token: Option<String>,
    #[serde(skip_serializing, default)]
    pub refresh_token: Option<String>,
    #[serde(skip_serializing, default)]
    pub token_generation: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Data for creating a new user
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub country: String,
    pub avatar_url: String,
}

#[derive(Debug, thiserror::Error)]
pub enum SetPasswordError {
    #[error(transparent)]
    Hash(#[from] PasswordError),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl User {
    /// Insert a new user with the default role and no projects.
    pub async fn create(pool: &SqlitePool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let now = Utc::now();

        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (
                id, name, email, password_hash, country, role,
                avatar_url, project_ids, token_generation, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, 0, ?, ?)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(data.name)
        .bind(data.email.trim().to_lowercase())
        .bind(data.password_hash)
        .bind(data.country)
        .bind(Role::User)
        .bind(data.avatar_url)
        .bind(Json(Vec::<Uuid>::new()))
        .bind(now)
        .bind(now)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_email(pool: &SqlitePool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
            .bind(email.trim().to_lowercase())
            .fetch_optional(pool)
            .await
    }

    /// Current session generation, or `None` if the user does not exist.
    pub async fn token_generation(pool: &SqlitePool, id: Uuid) -> Result<Option<i64>, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT token_generation FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Record the token pair most recently issued to this user.
    pub async fn store_tokens(
        pool: &SqlitePool,
        id: Uuid,
        access_token: &str,
        refresh_token: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET access_token = ?, refresh_token = ?, updated_at = ? WHERE id = ?",
        )
        .bind(access_token)
        .bind(refresh_token)
        .bind(Utc::now())
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Log the user out everywhere: clear the stored token pair and bump
    /// the session generation so outstanding tokens stop validating.
    pub async fn revoke_tokens(pool: &SqlitePool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET access_token = NULL,
                refresh_token = NULL,
                token_generation = token_generation + 1,
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(Utc::now())
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Add a project id to the user's project list.
    pub async fn attach_project(
        pool: &SqlitePool,
        user_id: Uuid,
        project_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let ids = sqlx::query_scalar::<_, Json<Vec<Uuid>>>(
            "SELECT project_ids FROM users WHERE id = ?",
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        let Some(Json(mut ids)) = ids else {
            return Ok(false);
        };

        if !ids.contains(&project_id) {
            ids.push(project_id);
        }

        let result = sqlx::query("UPDATE users SET project_ids = ?, updated_at = ? WHERE id = ?")
            .bind(Json(ids))
            .bind(Utc::now())
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Remove a project id from the user's project list.
    pub async fn detach_project(
        pool: &SqlitePool,
        user_id: Uuid,
        project_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let ids = sqlx::query_scalar::<_, Json<Vec<Uuid>>>(
            "SELECT project_ids FROM users WHERE id = ?",
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        let Some(Json(mut ids)) = ids else {
            return Ok(false);
        };

        ids.retain(|id| *id != project_id);

        let result = sqlx::query("UPDATE users SET project_ids = ?, updated_at = ? WHERE id = ?")
            .bind(Json(ids))
            .bind(Utc::now())
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Hash and store a new password. This is the only write path for
    /// `password_hash` after the account exists.
    pub async fn set_password(
        pool: &SqlitePool,
        id: Uuid,
        new_password: &str,
    ) -> Result<bool, SetPasswordError> {
        let hash = hash_password(new_password)?;

        let result = sqlx::query("UPDATE users SET password_hash = ?, updated_at = ? WHERE id = ?")
            .bind(hash)
            .bind(Utc::now())
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
