/// Data models
///
/// Each model owns its table: the struct mirrors the columns and the
/// inherent methods are the only place SQL for that table is written.
pub mod project;
pub mod task;
pub mod user;

pub use project::{Project, ProjectWithTasks, PROJECT_LIMIT};
pub use task::{Task, TaskStatus, TaskSummary, TaskWithProject};
pub use user::{Role, User};
