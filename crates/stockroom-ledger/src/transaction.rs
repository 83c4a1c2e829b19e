//! Transaction records, the counterparty model, and their operations.

use chrono::{DateTime, NaiveDateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

use crate::error::LedgerError;

/// Format of SQLite's `datetime('now')`, which assigns the stored
/// timestamps. Always UTC.
const SQLITE_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// The party a transaction settles against.
///
/// Stored as a `type` discriminator plus two nullable foreign-key columns,
/// of which exactly one is set. The enum carries the one ID that matches
/// the discriminator, so application code never sees a mismatched pair;
/// the schema enforces the same rule on raw writes with a CHECK constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "lowercase")]
pub enum Counterparty {
    /// A purchase from the supplier with this ID.
    Supplier(i64),
    /// A sale to the customer with this ID.
    Customer(i64),
}

impl Counterparty {
    /// Returns the storage discriminator for this counterparty.
    pub fn kind(self) -> &'static str {
        match self {
            Self::Supplier(_) => "supplier",
            Self::Customer(_) => "customer",
        }
    }

    fn supplier_id(self) -> Option<i64> {
        match self {
            Self::Supplier(id) => Some(id),
            Self::Customer(_) => None,
        }
    }

    fn customer_id(self) -> Option<i64> {
        match self {
            Self::Supplier(_) => None,
            Self::Customer(id) => Some(id),
        }
    }
}

/// Error returned when a stored counterparty triple is inconsistent.
#[derive(Debug, Clone)]
pub struct ParseCounterpartyError(pub String);

impl std::fmt::Display for ParseCounterpartyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid counterparty row: {}", self.0)
    }
}

impl std::error::Error for ParseCounterpartyError {}

/// A ledger transaction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    /// Internal database ID.
    pub id: i64,
    /// The party this entry settles against.
    pub counterparty: Counterparty,
    /// Monetary amount. Sign conventions are the caller's business.
    pub amount: f64,
    /// Optional free-form note.
    pub description: Option<String>,
    /// Creation time, storage-assigned unless supplied at create.
    pub timestamp: DateTime<Utc>,
}

/// Parameters for creating a new transaction.
///
/// `timestamp` may be omitted; the stored row then carries the schema
/// default, `datetime('now')`. A supplied value is stored at the same
/// one-second granularity as that default, so sub-second precision is
/// dropped. The returned row reports the stored value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTransactionParams {
    pub counterparty: Counterparty,
    pub amount: f64,
    pub description: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
}

/// Parameters for updating an existing transaction.
///
/// As at create, a supplied `timestamp` is stored at one-second
/// granularity.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateTransactionParams {
    pub counterparty: Option<Counterparty>,
    pub amount: Option<f64>,
    pub description: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
}

/// Creates a new transaction and returns the stored row.
///
/// Only the foreign-key column matching the counterparty is written; the
/// other stays NULL. A counterparty ID with no matching supplier/customer
/// row is rejected by foreign-key enforcement.
pub fn create_transaction(
    conn: &Connection,
    params: &CreateTransactionParams,
) -> Result<Transaction, LedgerError> {
    let mut columns = vec!["type", "amount", "description"];
    let mut values: Vec<Box<dyn rusqlite::types::ToSql>> = vec![
        Box::new(params.counterparty.kind()),
        Box::new(params.amount),
        Box::new(params.description.clone()),
    ];

    match params.counterparty {
        Counterparty::Supplier(id) => {
            columns.push("supplier_id");
            values.push(Box::new(id));
        }
        Counterparty::Customer(id) => {
            columns.push("customer_id");
            values.push(Box::new(id));
        }
    }

    if let Some(timestamp) = params.timestamp {
        columns.push("timestamp");
        values.push(Box::new(
            timestamp.format(SQLITE_DATETIME_FORMAT).to_string(),
        ));
    }

    let placeholders: Vec<String> = (1..=values.len()).map(|i| format!("?{}", i)).collect();
    let sql = format!(
        "INSERT INTO transactions ({}) VALUES ({})
         RETURNING id, type, supplier_id, customer_id, amount, description, timestamp",
        columns.join(", "),
        placeholders.join(", ")
    );

    let sql_params: Vec<&dyn rusqlite::types::ToSql> = values.iter().map(|v| v.as_ref()).collect();
    let transaction = conn.query_row(&sql, sql_params.as_slice(), map_row_to_transaction)?;
    Ok(transaction)
}

/// Retrieves a transaction by ID.
pub fn get_transaction(conn: &Connection, id: i64) -> Result<Transaction, LedgerError> {
    conn.query_row(
        "SELECT id, type, supplier_id, customer_id, amount, description, timestamp
         FROM transactions WHERE id = ?1",
        [id],
        map_row_to_transaction,
    )
    .optional()?
    .ok_or(LedgerError::NotFound {
        entity: "transaction",
        id,
    })
}

/// Lists all transactions, newest first.
pub fn list_transactions(conn: &Connection) -> Result<Vec<Transaction>, LedgerError> {
    let mut stmt = conn.prepare(
        "SELECT id, type, supplier_id, customer_id, amount, description, timestamp
         FROM transactions ORDER BY timestamp DESC, id DESC",
    )?;

    let rows = stmt.query_map([], map_row_to_transaction)?;
    let mut transactions = Vec::new();
    for row in rows {
        transactions.push(row?);
    }
    Ok(transactions)
}

/// Lists the transactions settling against a given supplier, newest first.
///
/// An unknown supplier ID yields an empty list, same as a supplier with no
/// transactions.
pub fn list_transactions_for_supplier(
    conn: &Connection,
    supplier_id: i64,
) -> Result<Vec<Transaction>, LedgerError> {
    let mut stmt = conn.prepare(
        "SELECT id, type, supplier_id, customer_id, amount, description, timestamp
         FROM transactions WHERE supplier_id = ?1 ORDER BY timestamp DESC, id DESC",
    )?;

    let rows = stmt.query_map([supplier_id], map_row_to_transaction)?;
    let mut transactions = Vec::new();
    for row in rows {
        transactions.push(row?);
    }
    Ok(transactions)
}

/// Lists the transactions settling against a given customer, newest first.
pub fn list_transactions_for_customer(
    conn: &Connection,
    customer_id: i64,
) -> Result<Vec<Transaction>, LedgerError> {
    let mut stmt = conn.prepare(
        "SELECT id, type, supplier_id, customer_id, amount, description, timestamp
         FROM transactions WHERE customer_id = ?1 ORDER BY timestamp DESC, id DESC",
    )?;

    let rows = stmt.query_map([customer_id], map_row_to_transaction)?;
    let mut transactions = Vec::new();
    for row in rows {
        transactions.push(row?);
    }
    Ok(transactions)
}

/// Updates an existing transaction using a single atomic UPDATE statement.
///
/// Only fields that are `Some` in `updates` are modified. A changed
/// counterparty rewrites the whole discriminator/foreign-key triple, so a
/// supplier entry rewritten to a customer entry clears `supplier_id` in
/// the same statement.
pub fn update_transaction(
    conn: &Connection,
    id: i64,
    updates: &UpdateTransactionParams,
) -> Result<(), LedgerError> {
    let mut set_parts: Vec<String> = Vec::new();
    let mut values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();
    let mut idx = 1usize;

    if let Some(counterparty) = updates.counterparty {
        set_parts.push(format!("type = ?{}", idx));
        values.push(Box::new(counterparty.kind()));
        idx += 1;
        set_parts.push(format!("supplier_id = ?{}", idx));
        values.push(Box::new(counterparty.supplier_id()));
        idx += 1;
        set_parts.push(format!("customer_id = ?{}", idx));
        values.push(Box::new(counterparty.customer_id()));
        idx += 1;
    }
    if let Some(amount) = updates.amount {
        set_parts.push(format!("amount = ?{}", idx));
        values.push(Box::new(amount));
        idx += 1;
    }
    if let Some(description) = &updates.description {
        set_parts.push(format!("description = ?{}", idx));
        values.push(Box::new(description.clone()));
        idx += 1;
    }
    if let Some(timestamp) = updates.timestamp {
        set_parts.push(format!("timestamp = ?{}", idx));
        values.push(Box::new(
            timestamp.format(SQLITE_DATETIME_FORMAT).to_string(),
        ));
        idx += 1;
    }

    if set_parts.is_empty() {
        let _ = get_transaction(conn, id)?;
        return Ok(());
    }

    let sql = format!(
        "UPDATE transactions SET {} WHERE id = ?{}",
        set_parts.join(", "),
        idx
    );
    values.push(Box::new(id));

    let sql_params: Vec<&dyn rusqlite::types::ToSql> = values.iter().map(|v| v.as_ref()).collect();
    let count = conn.execute(&sql, sql_params.as_slice())?;
    if count == 0 {
        return Err(LedgerError::NotFound {
            entity: "transaction",
            id,
        });
    }
    Ok(())
}

/// Deletes a transaction.
pub fn delete_transaction(conn: &Connection, id: i64) -> Result<(), LedgerError> {
    let count = conn.execute("DELETE FROM transactions WHERE id = ?1", params![id])?;
    if count == 0 {
        return Err(LedgerError::NotFound {
            entity: "transaction",
            id,
        });
    }
    Ok(())
}

fn map_row_to_transaction(row: &Row) -> rusqlite::Result<Transaction> {
    let kind: String = row.get(1)?;
    let supplier_id: Option<i64> = row.get(2)?;
    let customer_id: Option<i64> = row.get(3)?;

    let counterparty = match (kind.as_str(), supplier_id, customer_id) {
        ("supplier", Some(id), None) => Counterparty::Supplier(id),
        ("customer", None, Some(id)) => Counterparty::Customer(id),
        _ => {
            return Err(rusqlite::Error::FromSqlConversionFailure(
                1,
                rusqlite::types::Type::Text,
                Box::new(ParseCounterpartyError(format!(
                    "type = {:?}, supplier_id = {:?}, customer_id = {:?}",
                    kind, supplier_id, customer_id
                ))),
            ))
        }
    };

    let raw_timestamp: String = row.get(6)?;
    let timestamp = NaiveDateTime::parse_from_str(&raw_timestamp, SQLITE_DATETIME_FORMAT)
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(6, rusqlite::types::Type::Text, Box::new(e))
        })?
        .and_utc();

    Ok(Transaction {
        id: row.get(0)?,
        counterparty,
        amount: row.get(4)?,
        description: row.get(5)?,
        timestamp,
    })
}
