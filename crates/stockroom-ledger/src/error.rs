//! Error types for ledger operations.

/// Errors that can occur during ledger operations.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// A database operation failed.
    ///
    /// Constraint violations (duplicate names or contacts, a missing
    /// counterparty, a malformed transaction row) surface here exactly as
    /// SQLite reports them.
    #[error("ledger database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// No row of the given entity kind has the given ID.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The entity kind, e.g. `"product"`.
        entity: &'static str,
        /// The ID that was looked up.
        id: i64,
    },
}
