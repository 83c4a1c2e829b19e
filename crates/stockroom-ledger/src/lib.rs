//! Entity model and operations for the Stockroom inventory ledger.
//!
//! Implements the four ledger entities (products, suppliers, customers,
//! and the transactions between them) as plain structs with explicit CRUD
//! functions over a [`rusqlite::Connection`]. There is no business logic
//! here: no stock-adjustment rules, no balance computation. The schema
//! (owned by `stockroom-db`) and these operations are the whole model.
//!
//! Relationships are explicit queries, not navigable object graphs: to walk
//! from a supplier to its transactions, call
//! [`list_transactions_for_supplier`]. Nothing is loaded behind the
//! caller's back.
//!
//! # Usage
//!
//! Operations take `&Connection` and therefore apply directly to a
//! `stockroom_db::Session`, which derefs to one:
//!
//! ```rust,ignore
//! use stockroom_db::Session;
//! use stockroom_ledger::{create_supplier, CreateSupplierParams};
//!
//! let session = Session::begin(&pool)?;
//! let supplier = create_supplier(
//!     &session,
//!     &CreateSupplierParams {
//!         name: "Acme".to_string(),
//!         contact: Some("555-0100".to_string()),
//!         balance: None,
//!     },
//! )?;
//! session.commit()?;
//! ```

mod customer;
mod error;
mod product;
mod supplier;
mod transaction;

pub use customer::{
    create_customer, delete_customer, find_customer_by_name, get_customer, list_customers,
    update_customer, CreateCustomerParams, Customer, UpdateCustomerParams,
};
pub use error::LedgerError;
pub use product::{
    create_product, delete_product, find_product_by_name, get_product, list_products,
    update_product, CreateProductParams, Product, UpdateProductParams,
};
pub use supplier::{
    create_supplier, delete_supplier, find_supplier_by_name, get_supplier, list_suppliers,
    update_supplier, CreateSupplierParams, Supplier, UpdateSupplierParams,
};
pub use transaction::{
    create_transaction, delete_transaction, get_transaction, list_transactions,
    list_transactions_for_customer, list_transactions_for_supplier, update_transaction,
    Counterparty, CreateTransactionParams, ParseCounterpartyError, Transaction,
    UpdateTransactionParams,
};
