/// Task model and database operations
///
/// Tasks move between three states: `todo`, `in-progress`, and
/// `completed`. The `completed_at` timestamp exists exactly while a task
/// is in the completed state; [`stamp_completion`] is the single rule
/// that keeps the two fields consistent during updates.
///
/// Reads and writes that act on a single task are scoped to the owning
/// user in the SQL itself, so a miss and a foreign task look the same to
/// the caller.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use uuid::Uuid;

/// Lifecycle state of a task
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "kebab-case")]
#[sqlx(rename_all = "kebab-case")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Completed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in-progress",
            TaskStatus::Completed => "completed",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    /// Owning project; may point at a project that has since been deleted
    pub project_id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub due_date: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Data for creating a new task
#[derive(Debug, Clone)]
pub struct CreateTask {
    pub project_id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
}

/// Partial update applied by [`Task::update_for_owner`]. `None` fields
/// keep their current value.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub due_date: Option<DateTime<Utc>>,
}

/// Completion timestamp after a state change.
///
/// Entering the completed state stamps the current time unless a stamp
/// already exists; leaving it clears the stamp; any other transition
/// keeps whatever was there.
pub fn stamp_completion(
    from: TaskStatus,
    to: TaskStatus,
    completed_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    match to {
        TaskStatus::Completed => completed_at.or(Some(now)),
        _ if from == TaskStatus::Completed => None,
        _ => completed_at,
    }
}

/// Per-state task counts for a user's report
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSummary {
    pub total: i64,
    pub todo: i64,
    pub in_progress: i64,
    pub completed: i64,
}

impl TaskSummary {
    pub fn from_statuses(statuses: impl IntoIterator<Item = TaskStatus>) -> Self {
        let mut summary = Self::default();

        for status in statuses {
            summary.total += 1;
            match status {
                TaskStatus::Todo => summary.todo += 1,
                TaskStatus::InProgress => summary.in_progress += 1,
                TaskStatus::Completed => summary.completed += 1,
            }
        }

        summary
    }
}

/// A task joined with the title of its project, for the per-user report.
/// `project_title` is `None` when the project no longer exists.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TaskWithProject {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub task: Task,
    pub project_title: Option<String>,
}

impl Task {
    /// Insert a new task. Tasks always start in `todo`; the project id
    /// is recorded as given, without checking that the project exists.
    pub async fn create(pool: &SqlitePool, data: CreateTask) -> Result<Self, sqlx::Error> {
        let now = Utc::now();

        sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (
                id, project_id, user_id, title, description,
                status, due_date, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, 'todo', ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(data.project_id)
        .bind(data.user_id)
        .bind(data.title)
        .bind(data.description)
        .bind(data.due_date)
        .bind(now)
        .bind(now)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id_and_owner(
        pool: &SqlitePool,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>("SELECT * FROM tasks WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Apply a partial update to a task the caller owns. Status changes
    /// run through [`stamp_completion`] so `completed_at` stays in step.
    ///
    /// Returns `None` when no task matches the id and owner.
    pub async fn update_for_owner(
        pool: &SqlitePool,
        id: Uuid,
        user_id: Uuid,
        patch: TaskPatch,
    ) -> Result<Option<Self>, sqlx::Error> {
        let Some(task) = Self::find_by_id_and_owner(pool, id, user_id).await? else {
            return Ok(None);
        };

        let now = Utc::now();
        let status = patch.status.unwrap_or(task.status);
        let completed_at = stamp_completion(task.status, status, task.completed_at, now);

        sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET title = ?, description = ?, status = ?, due_date = ?,
                completed_at = ?, updated_at = ?
            WHERE id = ? AND user_id = ?
            RETURNING *
            "#,
        )
        .bind(patch.title.unwrap_or(task.title))
        .bind(patch.description.or(task.description))
        .bind(status)
        .bind(patch.due_date.or(task.due_date))
        .bind(completed_at)
        .bind(now)
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }

    /// Mark a task completed, refreshing `completed_at` to now even if
    /// the task was already completed.
    pub async fn complete_for_owner(
        pool: &SqlitePool,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let now = Utc::now();

        sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET status = 'completed', completed_at = ?, updated_at = ?
            WHERE id = ? AND user_id = ?
            RETURNING *
            "#,
        )
        .bind(now)
        .bind(now)
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }

    /// Send a task back to `todo` and clear its completion timestamp.
    pub async fn reset_for_owner(
        pool: &SqlitePool,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET status = 'todo', completed_at = NULL, updated_at = ?
            WHERE id = ? AND user_id = ?
            RETURNING *
            "#,
        )
        .bind(Utc::now())
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }

    pub async fn delete_for_owner(
        pool: &SqlitePool,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// All tasks under a project, newest first.
    pub async fn list_for_project(
        pool: &SqlitePool,
        project_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(
            "SELECT * FROM tasks WHERE project_id = ? ORDER BY created_at DESC",
        )
        .bind(project_id)
        .fetch_all(pool)
        .await
    }

    /// All of a user's tasks joined with their project titles, newest
    /// first. Tasks whose project was deleted are included with a null
    /// title.
    pub async fn list_for_owner_with_project(
        pool: &SqlitePool,
        user_id: Uuid,
    ) -> Result<Vec<TaskWithProject>, sqlx::Error> {
        sqlx::query_as::<_, TaskWithProject>(
            r#"
            SELECT t.*, p.title AS project_title
            FROM tasks t
            LEFT JOIN projects p ON p.id = t.project_id
            WHERE t.user_id = ?
            ORDER BY t.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }
}
