//! Scoped database sessions.
//!
//! A [`Session`] is a unit of work: one pooled connection with one open
//! transaction. Nothing persists until [`Session::commit`], and the session's
//! own reads see its pending writes. Dropping a session that was neither
//! committed nor rolled back discards its writes and returns the connection
//! to the pool, so release is guaranteed on every exit path, including `?`
//! propagation and panics.

use std::ops::{Deref, DerefMut};

use r2d2::PooledConnection;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;
use thiserror::Error;

use crate::pool::DbPool;

/// Errors that can occur while beginning or finishing a session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Failed to check out a connection from the pool.
    #[error("failed to check out a database connection: {0}")]
    Checkout(#[from] r2d2::Error),

    /// A transaction-control statement failed.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}

/// A pooled connection with an open transaction.
///
/// Derefs to [`rusqlite::Connection`], so ledger operations apply to a
/// session directly. `commit` and `rollback` consume the session; a
/// finished session cannot be touched again.
pub struct Session {
    conn: PooledConnection<SqliteConnectionManager>,
    open: bool,
}

impl Session {
    /// Checks out a connection and opens a deferred transaction on it.
    ///
    /// rusqlite's default is autocommit per statement; the explicit open
    /// transaction is what makes commit an intentional act rather than a
    /// side effect of each write.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Checkout` if the pool has no connection to
    /// give within its timeout, or `SessionError::Database` if the BEGIN
    /// statement fails.
    pub fn begin(pool: &DbPool) -> Result<Self, SessionError> {
        let conn = pool.get()?;
        conn.execute_batch("BEGIN DEFERRED;")?;
        Ok(Self { conn, open: true })
    }

    /// Commits the session's transaction and returns the connection to the
    /// pool.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Database` if the COMMIT statement fails; the
    /// session then attempts a rollback on the way out.
    pub fn commit(mut self) -> Result<(), SessionError> {
        self.conn.execute_batch("COMMIT;")?;
        self.open = false;
        Ok(())
    }

    /// Discards the session's writes and returns the connection to the pool.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Database` if the ROLLBACK statement fails.
    pub fn rollback(mut self) -> Result<(), SessionError> {
        self.conn.execute_batch("ROLLBACK;")?;
        self.open = false;
        Ok(())
    }
}

impl Deref for Session {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        &self.conn
    }
}

impl DerefMut for Session {
    fn deref_mut(&mut self) -> &mut Connection {
        &mut self.conn
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        // is_autocommit is false only while a transaction is still open;
        // some failure modes (notably a failed COMMIT) end the transaction
        // on their own, and rolling back twice would be an error.
        if self.open && !self.conn.is_autocommit() {
            if let Err(e) = self.conn.execute_batch("ROLLBACK;") {
                tracing::warn!(error = %e, "failed to roll back abandoned session");
            }
        }
    }
}
