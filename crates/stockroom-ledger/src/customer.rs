//! Customer records and their CRUD operations.

use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

use crate::error::LedgerError;

/// A party the business sells to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Customer {
    /// Internal database ID.
    pub id: i64,
    /// Unique display name.
    pub name: String,
    /// Optional unique contact detail, e.g. a phone number.
    pub contact: Option<String>,
    /// Signed account balance with this customer.
    pub balance: f64,
    /// Optional postal address.
    pub address: Option<String>,
}

/// Parameters for creating a new customer.
///
/// `balance` may be omitted; the stored row then carries the schema
/// default (0.0).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCustomerParams {
    pub name: String,
    pub contact: Option<String>,
    pub balance: Option<f64>,
    pub address: Option<String>,
}

/// Parameters for updating an existing customer.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateCustomerParams {
    pub name: Option<String>,
    pub contact: Option<String>,
    pub balance: Option<f64>,
    pub address: Option<String>,
}

/// Creates a new customer and returns the stored row.
pub fn create_customer(
    conn: &Connection,
    params: &CreateCustomerParams,
) -> Result<Customer, LedgerError> {
    let mut columns = vec!["name", "contact", "address"];
    let mut values: Vec<Box<dyn rusqlite::types::ToSql>> = vec![
        Box::new(params.name.clone()),
        Box::new(params.contact.clone()),
        Box::new(params.address.clone()),
    ];

    if let Some(balance) = params.balance {
        columns.push("balance");
        values.push(Box::new(balance));
    }

    let placeholders: Vec<String> = (1..=values.len()).map(|i| format!("?{}", i)).collect();
    let sql = format!(
        "INSERT INTO customers ({}) VALUES ({})
         RETURNING id, name, contact, balance, address",
        columns.join(", "),
        placeholders.join(", ")
    );

    let sql_params: Vec<&dyn rusqlite::types::ToSql> = values.iter().map(|v| v.as_ref()).collect();
    let customer = conn.query_row(&sql, sql_params.as_slice(), map_row_to_customer)?;
    Ok(customer)
}

/// Retrieves a customer by ID.
pub fn get_customer(conn: &Connection, id: i64) -> Result<Customer, LedgerError> {
    conn.query_row(
        "SELECT id, name, contact, balance, address FROM customers WHERE id = ?1",
        [id],
        map_row_to_customer,
    )
    .optional()?
    .ok_or(LedgerError::NotFound {
        entity: "customer",
        id,
    })
}

/// Looks up a customer by its unique name.
pub fn find_customer_by_name(
    conn: &Connection,
    name: &str,
) -> Result<Option<Customer>, LedgerError> {
    let customer = conn
        .query_row(
            "SELECT id, name, contact, balance, address FROM customers WHERE name = ?1",
            [name],
            map_row_to_customer,
        )
        .optional()?;
    Ok(customer)
}

/// Lists all customers, ordered by name.
pub fn list_customers(conn: &Connection) -> Result<Vec<Customer>, LedgerError> {
    let mut stmt = conn
        .prepare("SELECT id, name, contact, balance, address FROM customers ORDER BY name ASC")?;

    let rows = stmt.query_map([], map_row_to_customer)?;
    let mut customers = Vec::new();
    for row in rows {
        customers.push(row?);
    }
    Ok(customers)
}

/// Updates an existing customer using a single atomic UPDATE statement.
///
/// Only fields that are `Some` in `updates` are modified; `None` fields are
/// left untouched.
pub fn update_customer(
    conn: &Connection,
    id: i64,
    updates: &UpdateCustomerParams,
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
    if let Some(address) = &updates.address {
        set_parts.push(format!("address = ?{}", idx));
        values.push(Box::new(address.clone()));
        idx += 1;
    }

    if set_parts.is_empty() {
        let _ = get_customer(conn, id)?;
        return Ok(());
    }

    let sql = format!(
        "UPDATE customers SET {} WHERE id = ?{}",
        set_parts.join(", "),
        idx
    );
    values.push(Box::new(id));

    let sql_params: Vec<&dyn rusqlite::types::ToSql> = values.iter().map(|v| v.as_ref()).collect();
    let count = conn.execute(&sql, sql_params.as_slice())?;
    if count == 0 {
        return Err(LedgerError::NotFound {
            entity: "customer",
            id,
        });
    }
    Ok(())
}

/// Deletes a customer.
///
/// Rejected with a foreign-key violation while transactions still
/// reference the customer.
pub fn delete_customer(conn: &Connection, id: i64) -> Result<(), LedgerError> {
    let count = conn.execute("DELETE FROM customers WHERE id = ?1", params![id])?;
    if count == 0 {
        return Err(LedgerError::NotFound {
            entity: "customer",
            id,
        });
    }
    Ok(())
}

fn map_row_to_customer(row: &Row) -> rusqlite::Result<Customer> {
    Ok(Customer {
        id: row.get(0)?,
        name: row.get(1)?,
        contact: row.get(2)?,
        balance: row.get(3)?,
        address: row.get(4)?,
    })
}
