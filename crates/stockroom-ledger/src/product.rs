//! Product records and their CRUD operations.

use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

use crate::error::LedgerError;

/// A product in the inventory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    /// Internal database ID.
    pub id: i64,
    /// Unique display name.
    pub name: String,
    /// Optional free-form description.
    pub description: Option<String>,
    /// Units on hand.
    pub quantity: i64,
    /// Unit price.
    pub price: f64,
}

/// Parameters for creating a new product.
///
/// `quantity` and `price` may be omitted; the stored row then carries the
/// schema defaults (0 and 0.0).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProductParams {
    pub name: String,
    pub description: Option<String>,
    pub quantity: Option<i64>,
    pub price: Option<f64>,
}

/// Parameters for updating an existing product.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateProductParams {
    pub name: Option<String>,
    pub description: Option<String>,
    pub quantity: Option<i64>,
    pub price: Option<f64>,
}

/// Creates a new product and returns the stored row.
///
/// Omitted `quantity`/`price` are left to the schema defaults rather than
/// filled in here, so the database stays the single source of default
/// values.
pub fn create_product(
    conn: &Connection,
    params: &CreateProductParams,
) -> Result<Product, LedgerError> {
    let mut columns = vec!["name", "description"];
    let mut values: Vec<Box<dyn rusqlite::types::ToSql>> = vec![
        Box::new(params.name.clone()),
        Box::new(params.description.clone()),
    ];

    if let Some(quantity) = params.quantity {
        columns.push("quantity");
        values.push(Box::new(quantity));
    }
    if let Some(price) = params.price {
        columns.push("price");
        values.push(Box::new(price));
    }

    let placeholders: Vec<String> = (1..=values.len()).map(|i| format!("?{}", i)).collect();
    let sql = format!(
        "INSERT INTO products ({}) VALUES ({})
         RETURNING id, name, description, quantity, price",
        columns.join(", "),
        placeholders.join(", ")
    );

    let sql_params: Vec<&dyn rusqlite::types::ToSql> = values.iter().map(|v| v.as_ref()).collect();
    let product = conn.query_row(&sql, sql_params.as_slice(), map_row_to_product)?;
    Ok(product)
}

/// Retrieves a product by ID.
pub fn get_product(conn: &Connection, id: i64) -> Result<Product, LedgerError> {
    conn.query_row(
        "SELECT id, name, description, quantity, price FROM products WHERE id = ?1",
        [id],
        map_row_to_product,
    )
    .optional()?
    .ok_or(LedgerError::NotFound {
        entity: "product",
        id,
    })
}

/// Looks up a product by its unique name.
pub fn find_product_by_name(
    conn: &Connection,
    name: &str,
) -> Result<Option<Product>, LedgerError> {
    let product = conn
        .query_row(
            "SELECT id, name, description, quantity, price FROM products WHERE name = ?1",
            [name],
            map_row_to_product,
        )
        .optional()?;
    Ok(product)
}

/// Lists all products, ordered by name.
pub fn list_products(conn: &Connection) -> Result<Vec<Product>, LedgerError> {
    let mut stmt = conn.prepare(
        "SELECT id, name, description, quantity, price FROM products ORDER BY name ASC",
    )?;

    let rows = stmt.query_map([], map_row_to_product)?;
    let mut products = Vec::new();
    for row in rows {
        products.push(row?);
    }
    Ok(products)
}

/// Updates an existing product using a single atomic UPDATE statement.
///
/// Only fields that are `Some` in `updates` are modified; `None` fields are
/// left untouched.
pub fn update_product(
    conn: &Connection,
    id: i64,
    updates: &UpdateProductParams,
) -> Result<(), LedgerError> {
    let mut set_parts: Vec<String> = Vec::new();
    let mut values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();
    let mut idx = 1usize;

    if let Some(name) = &updates.name {
        set_parts.push(format!("name = ?{}", idx));
        values.push(Box::new(name.clone()));
        idx += 1;
    }
    if let Some(description) = &updates.description {
        set_parts.push(format!("description = ?{}", idx));
        values.push(Box::new(description.clone()));
        idx += 1;
    }
    if let Some(quantity) = updates.quantity {
        set_parts.push(format!("quantity = ?{}", idx));
        values.push(Box::new(quantity));
        idx += 1;
    }
    if let Some(price) = updates.price {
        set_parts.push(format!("price = ?{}", idx));
        values.push(Box::new(price));
        idx += 1;
    }

    if set_parts.is_empty() {
        // No fields to update; still report a missing row.
        let _ = get_product(conn, id)?;
        return Ok(());
    }

    let sql = format!(
        "UPDATE products SET {} WHERE id = ?{}",
        set_parts.join(", "),
        idx
    );
    values.push(Box::new(id));

    let sql_params: Vec<&dyn rusqlite::types::ToSql> = values.iter().map(|v| v.as_ref()).collect();
    let count = conn.execute(&sql, sql_params.as_slice())?;
    if count == 0 {
        return Err(LedgerError::NotFound {
            entity: "product",
            id,
        });
    }
    Ok(())
}

/// Deletes a product.
pub fn delete_product(conn: &Connection, id: i64) -> Result<(), LedgerError> {
    let count = conn.execute("DELETE FROM products WHERE id = ?1", params![id])?;
    if count == 0 {
        return Err(LedgerError::NotFound {
            entity: "product",
            id,
        });
    }
    Ok(())
}

fn map_row_to_product(row: &Row) -> rusqlite::Result<Product> {
    Ok(Product {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        quantity: row.get(3)?,
        price: row.get(4)?,
    })
}
