/// Task routes
///
/// Mutations are scoped by (task id, caller id) in a single query, so a
/// task owned by someone else looks exactly like a missing one.
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use trackle_shared::auth::middleware::AuthContext;
use trackle_shared::models::task::{CreateTask, Task, TaskPatch, TaskStatus};

use crate::app::AppState;
use crate::error::{ApiError, ApiResult, ValidationErrorDetail};
use crate::response::ApiResponse;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    #[validate(length(max = 200, message = "Title must be at most 200 characters"))]
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    #[validate(length(min = 1, max = 200, message = "Title cannot be empty"))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub due_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct TaskList {
    pub count: usize,
    pub tasks: Vec<Task>,
}

/// POST /api/tasks/projects/:project_id/tasks
pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(project_id): Path<Uuid>,
    Json(request): Json<CreateTaskRequest>,
) -> ApiResult<ApiResponse<Task>> {
    request.validate()?;

    let title = request.title.trim().to_string();
    if title.is_empty() {
        return Err(ApiError::Validation(vec![ValidationErrorDetail {
            field: "title".to_string(),
            message: "Title is required".to_string(),
        }]));
    }

    let task = Task::create(
        &state.db,
        CreateTask {
            project_id,
            user_id: auth.user_id,
            title,
            description: request.description,
            due_date: request.due_date,
        },
    )
    .await?;

    tracing::info!(user_id = %auth.user_id, task_id = %task.id, "task created");

    Ok(ApiResponse::new(
        StatusCode::CREATED,
        task,
        "Task created successfully",
    ))
}

/// GET /api/tasks/projects/:project_id/tasks
pub async fn list_project_tasks(
    State(state): State<AppState>,
    // Listing is scoped by the project id in the path, not the caller.
    Extension(_auth): Extension<AuthContext>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<ApiResponse<TaskList>> {
    let tasks = Task::list_for_project(&state.db, project_id).await?;

    Ok(ApiResponse::ok(
        TaskList {
            count: tasks.len(),
            tasks,
        },
        "Tasks fetched successfully",
    ))
}

/// GET /api/tasks/:task_id
pub async fn get_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(task_id): Path<Uuid>,
) -> ApiResult<ApiResponse<Task>> {
    let task = Task::find_by_id_and_owner(&state.db, task_id, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(ApiResponse::ok(task, "Task fetched successfully"))
}

/// PUT /api/tasks/:task_id
pub async fn update_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(task_id): Path<Uuid>,
    Json(request): Json<UpdateTaskRequest>,
) -> ApiResult<ApiResponse<Task>> {
    request.validate()?;

    let title = match request.title {
        Some(raw) => {
            let trimmed = raw.trim().to_string();
            if trimmed.is_empty() {
                return Err(ApiError::Validation(vec![ValidationErrorDetail {
                    field: "title".to_string(),
                    message: "Title cannot be empty".to_string(),
                }]));
            }
            Some(trimmed)
        }
        None => None,
    };

    let patch = TaskPatch {
        title,
        description: request.description,
        status: request.status,
        due_date: request.due_date,
    };

    let task = Task::update_for_owner(&state.db, task_id, auth.user_id, patch)
        .await?
        .ok_or_else(|| ApiError::PermissionDenied("Permission denied".to_string()))?;

    Ok(ApiResponse::ok(task, "Task updated successfully"))
}

/// DELETE /api/tasks/:task_id
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(task_id): Path<Uuid>,
) -> ApiResult<ApiResponse<serde_json::Value>> {
    let deleted = Task::delete_for_owner(&state.db, task_id, auth.user_id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Task not found or unauthorized".to_string()));
    }

    tracing::info!(user_id = %auth.user_id, task_id = %task_id, "task deleted");

    Ok(ApiResponse::ok(
        serde_json::Value::Null,
        "Task deleted successfully",
    ))
}

/// PATCH /api/tasks/complete/:task_id
///
/// Always restamps `completedAt`, even when the task is already done.
pub async fn complete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(task_id): Path<Uuid>,
) -> ApiResult<ApiResponse<Task>> {
    let task = Task::complete_for_owner(&state.db, task_id, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(ApiResponse::ok(task, "Task marked as completed"))
}

/// PATCH /api/tasks/reset/:task_id
pub async fn reset_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(task_id): Path<Uuid>,
) -> ApiResult<ApiResponse<Task>> {
    let task = Task::reset_for_owner(&state.db, task_id, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(ApiResponse::ok(task, "Task reset"))
}
