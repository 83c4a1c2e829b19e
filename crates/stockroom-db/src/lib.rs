//! Database layer for the Stockroom inventory ledger.
//!
//! Provides `DATABASE_URL` parsing, SQLite connection pooling (via `r2d2`),
//! WAL-mode initialization, embedded SQL migrations, and the [`Session`]
//! unit-of-work type. Every table in the ledger schema is created through
//! versioned migrations managed by this crate.
//!
//! # Design decisions
//!
//! - **SQLite with WAL mode**: the ledger is an embedded single-file store,
//!   with no external database process required. WAL mode allows concurrent
//!   readers with a single writer.
//! - **`r2d2` connection pool**: provides bounded connection reuse without
//!   manual lifetime management. Connections are opened in serialized
//!   threading mode so the pool may hand them to any thread.
//! - **Embedded migrations**: SQL files are compiled into the binary via
//!   `include_str!` and are the only definition of the persisted schema,
//!   so the schema cannot drift from the code that depends on it.
//! - **Sessions over raw connections**: callers work in explicit
//!   commit-or-discard units. A dropped [`Session`] rolls back, so a
//!   connection is never returned to the pool mid-transaction.

mod config;
mod migrations;
mod pool;
mod session;

pub use config::{
    database_url_from_env, ConfigError, DatabaseUrl, DATABASE_URL_VAR, DEFAULT_DATABASE_URL,
};
pub use migrations::{run_migrations, MigrationError};
pub use pool::{create_pool, DbPool, DbRuntimeSettings, PoolError};
pub use session::{Session, SessionError};
