//! Vector index database migrations
//!
//! SQL migrations are embedded as strings and executed when the index is opened.

use recollect_core::Result;
use rusqlite::Connection;

/// Vector tables SQL (001)
pub const VECTOR_TABLES_SQL: &str = include_str!("001_vector_tables.sql");

/// Run all vector index migrations
pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch(VECTOR_TABLES_SQL)?;
    Ok(())
}
