//! Matching transactions against uploaded bank statements.
//!
//! There is no real statement parsing or matching here. The whole feature is
//! backed by [StubMatcher], a deliberately fake strategy that reports a
//! fixed result set after a fixed processing delay. The only persistent
//! effect is flipping a transaction's reconciled flag.

mod matcher;
mod page;

pub use matcher::{MatchResult, MatchStatus, StatementMatcher, StatementUpload, StubMatcher};
pub use page::{get_reconcile_page, match_transaction_endpoint, upload_statement_endpoint};
