/// Project model and database operations
///
/// Projects group tasks. Each user may own at most [`PROJECT_LIMIT`]
/// projects; the route layer enforces the cap with [`Project::count_for_owner`]
/// before inserting.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::models::task::{Task, TaskStatus};

/// Maximum number of projects a single user may own
pub const PROJECT_LIMIT: i64 = 4;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Data for creating a new project
#[derive(Debug, Clone)]
pub struct CreateProject {
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
}

/// A project bundled with its tasks and derived completion percentage,
/// as returned by the project listing
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectWithTasks {
    #[serde(flatten)]
    pub project: Project,
    pub tasks: Vec<Task>,
    pub progress: u8,
}

impl ProjectWithTasks {
    pub fn assemble(project: Project, tasks: Vec<Task>) -> Self {
        let progress = progress(&tasks);
        Self {
            project,
            tasks,
            progress,
        }
    }
}

/// Percentage of tasks in the completed state, rounded to the nearest
/// whole number. A project with no tasks reports 0.
pub fn progress(tasks: &[Task]) -> u8 {
    if tasks.is_empty() {
        return 0;
    }

    let completed = tasks
        .iter()
        .filter(|task| task.status == TaskStatus::Completed)
        .count();

    ((completed as f64 / tasks.len() as f64) * 100.0).round() as u8
}

impl Project {
    pub async fn create(pool: &SqlitePool, data: CreateProject) -> Result<Self, sqlx::Error> {
        let now = Utc::now();

        sqlx::query_as::<_, Project>(
            r#"
            INSERT INTO projects (id, user_id, title, description, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(data.user_id)
        .bind(data.title)
        .bind(data.description)
        .bind(now)
        .bind(now)
        .fetch_one(pool)
        .await
    }

    /// Number of projects the user currently owns.
    pub async fn count_for_owner(pool: &SqlitePool, user_id: Uuid) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM projects WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(pool)
            .await
    }

    /// The user's projects, newest first.
    pub async fn list_for_owner(pool: &SqlitePool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Project>(
            "SELECT * FROM projects WHERE user_id = ? ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// The user's projects with their tasks and completion percentage,
    /// newest first.
    pub async fn list_with_tasks(
        pool: &SqlitePool,
        user_id: Uuid,
    ) -> Result<Vec<ProjectWithTasks>, sqlx::Error> {
        let projects = Self::list_for_owner(pool, user_id).await?;

        let mut out = Vec::with_capacity(projects.len());
        for project in projects {
            let tasks = Task::list_for_project(pool, project.id).await?;
            out.push(ProjectWithTasks::assemble(project, tasks));
        }

        Ok(out)
    }

    /// Delete a project if the caller owns it. Tasks under the project
    /// are left untouched.
    pub async fn delete_for_owner(
        pool: &SqlitePool,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM projects WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
