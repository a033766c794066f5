//! Record log database migrations
//!
//! SQL migrations are embedded as strings and executed when the database is opened.

use rusqlite::Connection;
use crate::error::Result;

/// Exchanges table SQL (001)
pub const EXCHANGES_SQL: &str = include_str!("001_exchanges.sql");

/// Run all record log migrations
pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch(EXCHANGES_SQL)?;
    Ok(())
}
