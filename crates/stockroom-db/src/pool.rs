//! Connection pool creation and configuration.

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::OpenFlags;
use thiserror::Error;

use crate::config::DatabaseUrl;

/// Runtime tunables for SQLite connection behavior.
///
/// These are static settings, not a tuning policy: the pool never resizes
/// itself and there is no retry logic around checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DbRuntimeSettings {
    /// Busy timeout for SQLite connections, in milliseconds.
    pub busy_timeout_ms: u64,

    /// Maximum number of pooled SQLite connections.
    pub pool_max_size: u32,
}

impl Default for DbRuntimeSettings {
    fn default() -> Self {
        Self {
            busy_timeout_ms: 5_000,
            pool_max_size: 8,
        }
    }
}

/// A type alias for the SQLite connection pool.
pub type DbPool = Pool<SqliteConnectionManager>;

/// Errors that can occur when creating the database pool.
#[derive(Debug, Error)]
pub enum PoolError {
    /// Failed to build the connection pool.
    #[error("failed to create database connection pool: {0}")]
    PoolInit(#[from] r2d2::Error),
}

/// Creates a new SQLite connection pool for the given endpoint, with WAL
/// mode and foreign keys enabled.
///
/// Connections are opened with `SQLITE_OPEN_FULL_MUTEX` (serialized
/// threading mode): the pool may hand a connection to whichever thread
/// asks for it, while each session is still used by one caller at a time.
///
/// In-memory pools are capped at a single connection. The in-memory
/// manager opens one named shared-cache database that all pooled
/// connections would reach, but shared-cache connections contend at
/// table granularity (`SQLITE_LOCKED`) instead of reading a stable
/// snapshot the way WAL-mode file readers do. A single connection keeps
/// in-memory sessions serialized: while one session is open, another
/// `Session::begin` waits out the pool's checkout timeout (30 seconds by
/// default) and then fails with a checkout error.
///
/// # Errors
///
/// Returns `PoolError::PoolInit` if the connection pool cannot be created;
/// this is where a connection failure (unreadable path, denied permissions)
/// first surfaces.
pub fn create_pool(url: &DatabaseUrl, settings: DbRuntimeSettings) -> Result<DbPool, PoolError> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_FULL_MUTEX;

    let manager = match url {
        DatabaseUrl::File(path) => SqliteConnectionManager::file(path),
        DatabaseUrl::Memory => SqliteConnectionManager::memory(),
    }
    .with_flags(flags)
    .with_init(move |conn| {
        // Set WAL mode and verify it was accepted. In-memory databases
        // report "memory" which is expected and acceptable.
        let journal_mode: String =
            conn.query_row("PRAGMA journal_mode = WAL;", [], |row| row.get(0))?;
        if journal_mode != "wal" && journal_mode != "memory" {
            return Err(rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_ERROR),
                Some(format!(
                    "failed to set WAL journal mode, got: {}",
                    journal_mode
                )),
            ));
        }
        conn.execute_batch(&format!(
            "PRAGMA foreign_keys = ON;
             PRAGMA busy_timeout = {};",
            settings.busy_timeout_ms
        ))
    });

    let max_size = match url {
        DatabaseUrl::File(_) => settings.pool_max_size,
        DatabaseUrl::Memory => 1,
    };

    let pool = Pool::builder().max_size(max_size).build(manager)?;

    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_in_memory_pool() {
        let settings = DbRuntimeSettings {
            busy_timeout_ms: 2_500,
            pool_max_size: 3,
        };

        let pool =
            create_pool(&DatabaseUrl::Memory, settings).expect("pool creation should succeed");
        let conn = pool.get().expect("should get a connection");

        // In-memory databases report "memory" instead of "wal".
        let mode: String = conn
            .query_row("PRAGMA journal_mode;", [], |row| row.get(0))
            .expect("should query journal_mode");
        assert_eq!(mode, "memory");

        // Verify foreign keys are enabled
        let fk: i32 = conn
            .query_row("PRAGMA foreign_keys;", [], |row| row.get(0))
            .expect("should query foreign_keys");
        assert_eq!(fk, 1, "foreign keys should be enabled");

        // Verify busy timeout is configured
        let busy_timeout: i32 = conn
            .query_row("PRAGMA busy_timeout;", [], |row| row.get(0))
            .expect("should query busy_timeout");
        assert_eq!(busy_timeout, 2_500, "busy timeout should match settings");
    }

    #[test]
    fn in_memory_pool_holds_one_shared_database() {
        let pool = create_pool(&DatabaseUrl::Memory, DbRuntimeSettings::default())
            .expect("pool creation should succeed");

        // The requested max size of 8 must be overridden so sessions
        // take turns on the one connection instead of contending on
        // shared-cache table locks.
        assert_eq!(pool.max_size(), 1);
    }

    #[test]
    fn create_file_pool_uses_wal_and_settings() {
        let dir = tempfile::tempdir().expect("should create temp dir");
        let url = DatabaseUrl::File(dir.path().join("stock.db"));
        let settings = DbRuntimeSettings {
            busy_timeout_ms: 1_000,
            pool_max_size: 4,
        };

        let pool = create_pool(&url, settings).expect("pool creation should succeed");
        assert_eq!(pool.max_size(), 4, "file pools keep the configured size");

        let conn = pool.get().expect("should get a connection");
        let mode: String = conn
            .query_row("PRAGMA journal_mode;", [], |row| row.get(0))
            .expect("should query journal_mode");
        assert_eq!(mode, "wal");
    }
}
