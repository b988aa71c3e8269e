/// Project routes
///
/// All three handlers run behind the auth guard, so the owner id always
/// comes from the verified [`AuthContext`] extension, never from the
/// request body.
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use trackle_shared::auth::middleware::AuthContext;
use trackle_shared::models::project::{CreateProject, Project, ProjectWithTasks, PROJECT_LIMIT};
use trackle_shared::models::user::User;

use crate::app::AppState;
use crate::error::{ApiError, ApiResult, ValidationErrorDetail};
use crate::response::ApiResponse;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    #[validate(length(max = 200, message = "Title must be at most 200 characters"))]
    pub title: String,
    pub description: Option<String>,
}

/// POST /api/projects
pub async fn create_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(request): Json<CreateProjectRequest>,
) -> ApiResult<ApiResponse<Project>> {
    request.validate()?;

    let title = request.title.trim().to_string();
    if title.is_empty() {
        return Err(ApiError::Validation(vec![ValidationErrorDetail {
            field: "title".to_string(),
            message: "Title is required".to_string(),
        }]));
    }

    // Checked outside a transaction; two racing requests can overshoot
    // the cap by one.
    let count = Project::count_for_owner(&state.db, auth.user_id).await?;
    if count >= PROJECT_LIMIT {
        return Err(ApiError::ProjectLimit);
    }

    let project = Project::create(
        &state.db,
        CreateProject {
            user_id: auth.user_id,
            title,
            description: request.description,
        },
    )
    .await?;

    User::attach_project(&state.db, auth.user_id, project.id).await?;

    tracing::info!(user_id = %auth.user_id, project_id = %project.id, "project created");

    Ok(ApiResponse::new(
        StatusCode::CREATED,
        project,
        "Project created successfully",
    ))
}

/// GET /api/projects
pub async fn list_projects(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<ApiResponse<Vec<ProjectWithTasks>>> {
    let projects = Project::list_with_tasks(&state.db, auth.user_id).await?;

    Ok(ApiResponse::ok(projects, "Projects fetched successfully"))
}

/// DELETE /api/projects/:project_id
///
/// Tasks under the project are left in place and keep their dangling
/// project id; the per-user report still lists them.
pub async fn delete_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<ApiResponse<serde_json::Value>> {
    let deleted = Project::delete_for_owner(&state.db, project_id, auth.user_id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Project not found".to_string()));
    }

    User::detach_project(&state.db, auth.user_id, project_id).await?;

    tracing::info!(user_id = %auth.user_id, project_id = %project_id, "project deleted");

    Ok(ApiResponse::ok(
        serde_json::Value::Null,
        "Project deleted successfully",
    ))
}
