//! Supplier records and their CRUD operations.

use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

use crate::error::LedgerError;

/// A party the business buys from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Supplier {
    /// Internal database ID.
    pub id: i64,
    /// Unique display name.
    pub name: String,
    /// Optional unique contact detail, e.g. a phone number.
    pub contact: Option<String>,
    /// Signed account balance with this supplier.
    pub balance: f64,
}

/// Parameters for creating a new supplier.
///
/// `balance` may be omitted; the stored row then carries the schema
/// default (0.0).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSupplierParams {
    pub name: String,
    pub contact: Option<String>,
    pub balance: Option<f64>,
}

/// Parameters for updating an existing supplier.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateSupplierParams {
    pub name: Option<String>,
    pub contact: Option<String>,
    pub balance: Option<f64>,
}

/// Creates a new supplier and returns the stored row.
pub fn create_supplier(
    conn: &Connection,
    params: &CreateSupplierParams,
) -> Result<Supplier, LedgerError> {
    let mut columns = vec!["name", "contact"];
    let mut values: Vec<Box<dyn rusqlite::types::ToSql>> = vec![
        Box::new(params.name.clone()),
        Box::new(params.contact.clone()),
    ];

    if let Some(balance) = params.balance {
        columns.push("balance");
        values.push(Box::new(balance));
    }

    let placeholders: Vec<String> = (1..=values.len()).map(|i| format!("?{}", i)).collect();
    let sql = format!(
        "INSERT INTO suppliers ({}) VALUES ({})
         RETURNING id, name, contact, balance",
        columns.join(", "),
        placeholders.join(", ")
    );

    let sql_params: Vec<&dyn rusqlite::types::ToSql> = values.iter().map(|v| v.as_ref()).collect();
    let supplier = conn.query_row(&sql, sql_params.as_slice(), map_row_to_supplier)?;
    Ok(supplier)
}

/// Retrieves a supplier by ID.
pub fn get_supplier(conn: &Connection, id: i64) -> Result<Supplier, LedgerError> {
    conn.query_row(
        "SELECT id, name, contact, balance FROM suppliers WHERE id = ?1",
        [id],
        map_row_to_supplier,
    )
    .optional()?
    .ok_or(LedgerError::NotFound {
        entity: "supplier",
        id,
    })
}

/// Looks up a supplier by its unique name.
pub fn find_supplier_by_name(
    conn: &Connection,
    name: &str,
) -> Result<Option<Supplier>, LedgerError> {
    let supplier = conn
        .query_row(
            "SELECT id, name, contact, balance FROM suppliers WHERE name = ?1",
            [name],
            map_row_to_supplier,
        )
        .optional()?;
    Ok(supplier)
}

/// Lists all suppliers, ordered by name.
pub fn list_suppliers(conn: &Connection) -> Result<Vec<Supplier>, LedgerError> {
    let mut stmt =
        conn.prepare("SELECT id, name, contact, balance FROM suppliers ORDER BY name ASC")?;

    let rows = stmt.query_map([], map_row_to_supplier)?;
    let mut suppliers = Vec::new();
    for row in rows {
        suppliers.push(row?);
    }
    Ok(suppliers)
}

/// Updates an existing supplier using a single atomic UPDATE statement.
///
/// Only fields that are `Some` in `updates` are modified; `None` fields are
/// left untouched.
pub fn update_supplier(
    conn: &Connection,
    id: i64,
    updates: &UpdateSupplierParams,
) -> Result<(), LedgerError> {
    let mut set_parts: Vec<String> = Vec::new();
    let mut values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();
    let mut idx = 1usize;

    if let Some(name) = &updates.name {
        set_parts.push(format!("name = ?{}", idx));
        values.push(Box::new(name.clone()));
        idx += 1;
    }
    if let Some(contact) = &updates.contact {
        set_parts.push(format!("contact = ?{}", idx));
        values.push(Box::new(contact.clone()));
        idx += 1;
    }
    if let Some(balance) = updates.balance {
        set_parts.push(format!("balance = ?{}", idx));
        values.push(Box::new(balance));
        idx += 1;
    }

    if set_parts.is_empty() {
        let _ = get_supplier(conn, id)?;
        return Ok(());
    }

    let sql = format!(
        "UPDATE suppliers SET {} WHERE id = ?{}",
        set_parts.join(", "),
        idx
    );
    values.push(Box::new(id));

    let sql_params: Vec<&dyn rusqlite::types::ToSql> = values.iter().map(|v| v.as_ref()).collect();
    let count = conn.execute(&sql, sql_params.as_slice())?;
    if count == 0 {
        return Err(LedgerError::NotFound {
            entity: "supplier",
            id,
        });
    }
    Ok(())
}

/// Deletes a supplier.
///
/// Rejected with a foreign-key violation while transactions still
/// reference the supplier.
pub fn delete_supplier(conn: &Connection, id: i64) -> Result<(), LedgerError> {
    let count = conn.execute("DELETE FROM suppliers WHERE id = ?1", params![id])?;
    if count == 0 {
        return Err(LedgerError::NotFound {
            entity: "supplier",
            id,
        });
    }
    Ok(())
}

fn map_row_to_supplier(row: &Row) -> rusqlite::Result<Supplier> {
    Ok(Supplier {
        id: row.get(0)?,
        name: row.get(1)?,
        contact: row.get(2)?,
        balance: row.get(3)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockroom_db::run_migrations;

    fn setup_db() -> Connection {
        let conn = Connection::open_in_memory().expect("failed to open in-memory db");
        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .expect("failed to enable foreign keys");
        run_migrations(&conn).expect("failed to run migrations");
        conn
    }

    #[test]
    fn test_supplier_crud() {
        let conn = setup_db();

        let params = CreateSupplierParams {
            name: "Acme".to_string(),
            contact: Some("555-0100".to_string()),
            balance: None,
        };

        // Create: balance defaults to 0.0
        let supplier = create_supplier(&conn, &params).expect("create failed");
        assert_eq!(supplier.name, "Acme");
        assert_eq!(supplier.contact, Some("555-0100".to_string()));
        assert_eq!(supplier.balance, 0.0);

        // Get / find by name
        let fetched = get_supplier(&conn, supplier.id).expect("get failed");
        assert_eq!(fetched, supplier);
        let found = find_supplier_by_name(&conn, "Acme").expect("find failed");
        assert_eq!(found, Some(supplier.clone()));

        // Update: a negative balance is accepted, no business rules here
        let updates = UpdateSupplierParams {
            balance: Some(-250.0),
            ..Default::default()
        };
        update_supplier(&conn, supplier.id, &updates).expect("update failed");
        let updated = get_supplier(&conn, supplier.id).expect("get updated failed");
        assert_eq!(updated.balance, -250.0);
        assert_eq!(updated.contact, Some("555-0100".to_string()));

        // Delete
        delete_supplier(&conn, supplier.id).expect("delete failed");
        let err = get_supplier(&conn, supplier.id).unwrap_err();
        match err {
            LedgerError::NotFound { entity, .. } => assert_eq!(entity, "supplier"),
            _ => panic!("unexpected error type"),
        }
    }

    #[test]
    fn test_duplicate_contact_rejected() {
        let conn = setup_db();

        let first = CreateSupplierParams {
            name: "Acme".to_string(),
            contact: Some("555-0100".to_string()),
            balance: None,
        };
        create_supplier(&conn, &first).expect("first create failed");

        let second = CreateSupplierParams {
            name: "Globex".to_string(),
            contact: Some("555-0100".to_string()),
            balance: None,
        };
        let err =
            create_supplier(&conn, &second).expect_err("duplicate contact should be rejected");
        match err {
            LedgerError::Database(rusqlite::Error::SqliteFailure(e, _)) => {
                assert_eq!(e.code, rusqlite::ErrorCode::ConstraintViolation)
            }
            other => panic!("expected constraint violation, got {:?}", other),
        }

        let suppliers = list_suppliers(&conn).expect("list failed");
        assert_eq!(suppliers.len(), 1, "rejected insert should persist no row");
    }

    #[test]
    fn test_contact_is_optional_and_not_unique_when_absent() {
        let conn = setup_db();

        // SQLite treats NULLs as distinct for UNIQUE columns, so two
        // contact-less suppliers may coexist.
        for name in ["Acme", "Globex"] {
            let params = CreateSupplierParams {
                name: name.to_string(),
                contact: None,
                balance: None,
            };
            create_supplier(&conn, &params).expect("create failed");
        }

        let suppliers = list_suppliers(&conn).expect("list failed");
        assert_eq!(suppliers.len(), 2);
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let conn = setup_db();

        let params = CreateSupplierParams {
            name: "Acme".to_string(),
            contact: None,
            balance: None,
        };
        create_supplier(&conn, &params).expect("first create failed");

        let err = create_supplier(&conn, &params).expect_err("duplicate name should be rejected");
        match err {
            LedgerError::Database(rusqlite::Error::SqliteFailure(e, _)) => {
                assert_eq!(e.code, rusqlite::ErrorCode::ConstraintViolation)
            }
            other => panic!("expected constraint violation, got {:?}", other),
        }
    }
}
