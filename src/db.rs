use sqlx::mysql::{MySqlPool, MySqlPoolOptions};
use std::time::Duration;

/// Connects the pool with a bounded acquire timeout so callers get a
/// `Timeout` instead of hanging when the database is saturated.
pub async fn init_db(database_url: &str) -> MySqlPool {
    MySqlPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url)
        .await
        .expect("Failed to connect to database")
}
