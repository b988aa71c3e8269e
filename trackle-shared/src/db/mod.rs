/// Database module
///
/// Provides SQLite connection pooling, migrations, and pool utilities.
pub mod migrations;
pub mod pool;

pub use migrations::run_migrations;
pub use pool::{close_pool, create_pool, health_check, DatabaseConfig};
