//! The statement matcher interface and its stub implementation.

use std::time::Duration;

use time::{Date, macros::date};

use crate::transaction::Transaction;

/// Whether a statement line was matched against one of the user's
/// transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStatus {
    /// The statement line corresponds to a recorded transaction.
    Matched,
    /// No recorded transaction was found for the statement line.
    Unmatched,
}

/// The outcome of comparing one bank statement line against the user's
/// records.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    /// The statement line's description.
    pub description: String,
    /// The statement line's date.
    pub date: Date,
    /// The amount on the bank's side.
    pub bank_amount: f64,
    /// The amount on the user's side, if a matching transaction was found.
    pub user_amount: Option<f64>,
    /// Whether the line was matched.
    pub status: MatchStatus,
}

/// An uploaded bank statement file.
///
/// Only the metadata is kept. The stub matcher never reads the contents.
#[derive(Debug, Clone, PartialEq)]
pub struct StatementUpload {
    /// The name of the uploaded file.
    pub file_name: String,
    /// The size of the uploaded file in bytes.
    pub size_bytes: usize,
}

/// Matches an uploaded bank statement against the user's transactions.
pub trait StatementMatcher {
    /// How long processing a statement takes before results are available.
    fn processing_delay(&self) -> Duration;

    /// Compare the statement against `transactions` and report per-line
    /// results.
    fn match_statement(
        &self,
        upload: &StatementUpload,
        transactions: &[Transaction],
    ) -> Vec<MatchResult>;
}

/// A stand-in matcher that ignores the uploaded file and always reports the
/// same two statement lines: one matched salary payment and one unmatched
/// ATM withdrawal.
#[derive(Debug, Clone, Copy, Default)]
pub struct StubMatcher;

impl StatementMatcher for StubMatcher {
    fn processing_delay(&self) -> Duration {
        Duration::from_secs(2)
    }

    fn match_statement(
        &self,
        _upload: &StatementUpload,
        _transactions: &[Transaction],
    ) -> Vec<MatchResult> {
        vec![
            MatchResult {
                description: "Salary Payment".to_owned(),
                date: date!(2024 - 01 - 15),
                bank_amount: 1500.0,
                user_amount: Some(1500.0),
                status: MatchStatus::Matched,
            },
            MatchResult {
                description: "ATM Withdrawal".to_owned(),
                date: date!(2024 - 01 - 14),
                bank_amount: 250.0,
                user_amount: None,
                status: MatchStatus::Unmatched,
            },
        ]
    }
}
