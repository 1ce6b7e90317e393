//! Defines the core transaction data model.

use std::fmt::Display;

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{Error, auth::UserID};

/// The ID of a transaction in the application database.
pub type TransactionId = i64;

/// Whether a transaction brought money in or sent money out.
///
/// The amount on a transaction is always a non-negative magnitude, so the
/// kind is the only place the direction of the money flow is recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money coming in, e.g. salary.
    Income,
    /// Money going out, e.g. rent.
    Expense,
}

impl TransactionKind {
    /// The kind as the lowercase string stored in the database and used in
    /// query strings.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl ToSql for TransactionKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(FromSqlError::Other(
                format!("invalid transaction kind {other:?}").into(),
            )),
        }
    }
}

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// When the transaction happened.
    pub date: Date,
    /// The amount of money spent or earned, always non-negative.
    pub amount: f64,
    /// Whether the transaction is income or an expense.
    pub kind: TransactionKind,
    /// The category the transaction belongs to, e.g. "Rent", "Salary".
    pub category: String,
    /// A text description of what the transaction was for.
    pub description: String,
    /// Whether the transaction has been matched against a bank record.
    pub is_reconciled: bool,
    /// The user that owns this transaction.
    pub user_id: UserID,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability.
    pub fn build(
        kind: TransactionKind,
        amount: f64,
        date: Date,
        category: &str,
    ) -> TransactionBuilder {
        TransactionBuilder {
            kind,
            amount,
            date,
            category: category.to_owned(),
            description: String::new(),
            is_reconciled: false,
        }
    }
}

/// A builder for creating [Transaction] instances.
///
/// The builder holds everything except the transaction ID and owner, which
/// are assigned when the transaction is inserted into the database.
#[derive(Debug, PartialEq, Clone)]
pub struct TransactionBuilder {
    /// Whether the transaction is income or an expense.
    pub kind: TransactionKind,

    /// The monetary amount of the transaction.
    ///
    /// Amounts are magnitudes: `150.00` is a salary deposit when the kind is
    /// income, and a rent payment of the same size when the kind is expense.
    /// Negative values are rejected by [TransactionBuilder::validate].
    pub amount: f64,

    /// The date when the transaction occurred.
    ///
    /// This represents the actual transaction date (when money moved), not
    /// when it was recorded in the app.
    pub date: Date,

    /// The category of the transaction, e.g. "Groceries", "Transport", "Rent".
    ///
    /// Categories are suggested from a fixed list per kind but any label is
    /// accepted.
    pub category: String,

    /// A human-readable description of the transaction.
    pub description: String,

    /// Whether the transaction has been matched against a bank record.
    ///
    /// New transactions start out unreconciled.
    pub is_reconciled: bool,
}

impl TransactionBuilder {
    /// Set the description for the transaction.
    pub fn description(mut self, description: &str) -> Self {
        self.description = description.to_owned();
        self
    }

    /// Check that the builder describes a valid transaction.
    ///
    /// `today` is the current date in the user's timezone.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NegativeAmount] if the amount is below zero,
    /// - or [Error::FutureDate] if the date is after `today`.
    pub fn validate(&self, today: Date) -> Result<(), Error> {
        if self.amount < 0.0 {
            return Err(Error::NegativeAmount(self.amount));
        }

        if self.date > today {
            return Err(Error::FutureDate(self.date));
        }

        Ok(())
    }
}

#[cfg(test)]
mod transaction_kind_tests {
    use super::TransactionKind;

    #[test]
    fn round_trips_through_strings() {
        assert_eq!(TransactionKind::Income.as_str(), "income");
        assert_eq!(TransactionKind::Expense.as_str(), "expense");
    }

    #[test]
    fn deserializes_from_lowercase() {
        let kind: TransactionKind = serde_json::from_str("\"income\"").unwrap();
        assert_eq!(kind, TransactionKind::Income);

        let kind: TransactionKind = serde_json::from_str("\"expense\"").unwrap();
        assert_eq!(kind, TransactionKind::Expense);
    }
}
