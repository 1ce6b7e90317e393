//! Database functions for storing, querying, and mutating transactions.
//!
//! Every query is scoped by the owning user's ID. A row that belongs to a
//! different user is indistinguishable from a row that does not exist.

use rusqlite::{Connection, Row};

use crate::{Error, auth::UserID};

use super::model::{Transaction, TransactionBuilder, TransactionId};

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                date TEXT NOT NULL,
                amount REAL NOT NULL CHECK (amount >= 0),
                kind TEXT NOT NULL CHECK (kind IN ('income', 'expense')),
                category TEXT NOT NULL,
                description TEXT NOT NULL,
                is_reconciled INTEGER NOT NULL DEFAULT 0,
                user_id INTEGER NOT NULL,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    // Covering index for the newest-first listing on the transactions page.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_user_date ON \"transaction\"(user_id, date);",
        (),
    )?;

    Ok(())
}

/// Create a new transaction in the database from a builder.
///
/// The caller is expected to have called [TransactionBuilder::validate]
/// first; the database will still reject negative amounts via a CHECK
/// constraint.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn create_transaction(
    builder: TransactionBuilder,
    user_id: UserID,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(
            "INSERT INTO \"transaction\" (date, amount, kind, category, description, is_reconciled, user_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             RETURNING id, date, amount, kind, category, description, is_reconciled, user_id",
        )?
        .query_one(
            (
                builder.date,
                builder.amount,
                builder.kind,
                builder.category,
                builder.description,
                builder.is_reconciled,
                user_id.as_i64(),
            ),
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Retrieve a transaction owned by `user_id` from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a transaction owned by `user_id`,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_transaction(
    id: TransactionId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(
            "SELECT id, date, amount, kind, category, description, is_reconciled, user_id \
             FROM \"transaction\" WHERE id = :id AND user_id = :user_id",
        )?
        .query_one(
            &[(":id", &id), (":user_id", &user_id.as_i64())],
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Retrieve all of `user_id`'s transactions, ordered by date descending
/// (newest first). Ties on the date are broken by the ID, so the most
/// recently created transaction comes first.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn list_transactions(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(
            "SELECT id, date, amount, kind, category, description, is_reconciled, user_id \
             FROM \"transaction\" WHERE user_id = :user_id \
             ORDER BY date DESC, id DESC",
        )?
        .query_map(&[(":user_id", &user_id.as_i64())], map_transaction_row)?
        .map(|transaction_result| transaction_result.map_err(Error::SqlError))
        .collect()
}

/// Set the amount on one of `user_id`'s transactions.
///
/// # Errors
/// This function will return a:
/// - [Error::NegativeAmount] if `amount` is below zero,
/// - [Error::UpdateMissingTransaction] if `id` does not refer to a transaction owned by `user_id`,
/// - or [Error::SqlError] there is some other SQL error.
pub fn update_transaction_amount(
    id: TransactionId,
    user_id: UserID,
    amount: f64,
    connection: &Connection,
) -> Result<(), Error> {
    if amount < 0.0 {
        return Err(Error::NegativeAmount(amount));
    }

    let rows_affected = connection.execute(
        "UPDATE \"transaction\" SET amount = :amount WHERE id = :id AND user_id = :user_id",
        rusqlite::named_params! {
            ":amount": amount,
            ":id": id,
            ":user_id": user_id.as_i64(),
        },
    )?;

    match rows_affected {
        0 => Err(Error::UpdateMissingTransaction),
        _ => Ok(()),
    }
}

/// Set the reconciled flag on one of `user_id`'s transactions.
///
/// # Errors
/// This function will return a:
/// - [Error::UpdateMissingTransaction] if `id` does not refer to a transaction owned by `user_id`,
/// - or [Error::SqlError] there is some other SQL error.
pub fn set_transaction_reconciled(
    id: TransactionId,
    user_id: UserID,
    is_reconciled: bool,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE \"transaction\" SET is_reconciled = :is_reconciled \
         WHERE id = :id AND user_id = :user_id",
        rusqlite::named_params! {
            ":is_reconciled": is_reconciled,
            ":id": id,
            ":user_id": user_id.as_i64(),
        },
    )?;

    match rows_affected {
        0 => Err(Error::UpdateMissingTransaction),
        _ => Ok(()),
    }
}

/// Delete one of `user_id`'s transactions.
///
/// # Errors
/// This function will return a:
/// - [Error::DeleteMissingTransaction] if `id` does not refer to a transaction owned by `user_id`,
/// - or [Error::SqlError] there is some other SQL error.
pub fn delete_transaction(
    id: TransactionId,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM \"transaction\" WHERE id = :id AND user_id = :user_id",
        rusqlite::named_params! {
            ":id": id,
            ":user_id": user_id.as_i64(),
        },
    )?;

    match rows_affected {
        0 => Err(Error::DeleteMissingTransaction),
        _ => Ok(()),
    }
}

/// Map a database row to a Transaction.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    Ok(Transaction {
        id: row.get(0)?,
        date: row.get(1)?,
        amount: row.get(2)?,
        kind: row.get(3)?,
        category: row.get(4)?,
        description: row.get(5)?,
        is_reconciled: row.get(6)?,
        user_id: UserID::new(row.get(7)?),
    })
}
