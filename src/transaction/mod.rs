//! Transaction management for the finance tracker.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and `TransactionBuilder` for creating transactions
//! - Database functions for storing, querying, and mutating transactions
//! - The filter applied by the transactions page
//! - View handlers for transaction-related web pages

mod category;
mod create_endpoint;
mod delete_endpoint;
mod edit_endpoints;
mod filter;
mod model;
mod new_transaction_page;
mod store;
mod transactions_page;

pub use category::{EXPENSE_CATEGORIES, INCOME_CATEGORIES};
pub use create_endpoint::create_transaction_endpoint;
pub use delete_endpoint::delete_transaction_endpoint;
pub use edit_endpoints::{toggle_reconciled_endpoint, update_amount_endpoint};
pub use filter::{TransactionFilter, filter_transactions};
pub use model::{Transaction, TransactionBuilder, TransactionId, TransactionKind};
pub use new_transaction_page::get_new_transaction_page;
pub use store::{
    create_transaction, create_transaction_table, delete_transaction, get_transaction,
    list_transactions, set_transaction_reconciled, update_transaction_amount,
};
pub use transactions_page::get_transactions_page;
