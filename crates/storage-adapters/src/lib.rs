//! # storage-adapters
//!
//! SQLite persistence for Whispering Walls: the data mapping between the
//! relational model and the `domains` models, plus the transactional vote
//! transition the port contract requires.

mod schema;
mod sqlite;

pub use schema::ensure_schema;
pub use sqlite::SqliteWhisperStore;

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::debug;

/// Opens a SQLite pool with foreign keys enforced on every connection.
///
/// In-memory databases are pinned to a single never-reaped connection;
/// each pooled connection would otherwise see its own empty database, and
/// an idle reap would drop the data outright.
pub async fn connect(database_url: &str) -> anyhow::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let mut pool_options = SqlitePoolOptions::new();
    if database_url.contains(":memory:") {
        pool_options = pool_options
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None);
    } else {
        pool_options = pool_options.max_connections(5);
    }
    let pool = pool_options.connect_with(options).await?;
    debug!(url = database_url, "database pool ready");
    Ok(pool)
}
