//! The filter applied to the in-memory transaction list on the transactions page.

use serde::Deserialize;

use super::model::{Transaction, TransactionKind};

/// The filter selected on the transactions page.
///
/// A `None` field means "all", i.e. the predicate passes everything through.
/// The three predicates are ANDed together.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TransactionFilter {
    /// Keep only transactions of this kind.
    pub kind: Option<TransactionKind>,
    /// Keep only transactions with exactly this category.
    pub category: Option<String>,
    /// Keep only transactions whose description or category contains this
    /// string, compared case-insensitively.
    pub search: Option<String>,
}

impl TransactionFilter {
    /// Whether `transaction` passes all three predicates.
    pub fn matches(&self, transaction: &Transaction) -> bool {
        let matches_kind = self
            .kind
            .map(|kind| transaction.kind == kind)
            .unwrap_or(true);

        let matches_category = self
            .category
            .as_deref()
            .map(|category| transaction.category == category)
            .unwrap_or(true);

        let matches_search = self
            .search
            .as_deref()
            .map(|search| {
                let search = search.to_lowercase();
                transaction.description.to_lowercase().contains(&search)
                    || transaction.category.to_lowercase().contains(&search)
            })
            .unwrap_or(true);

        matches_kind && matches_category && matches_search
    }
}

/// Keep the transactions that pass `filter`, preserving their order.
pub fn filter_transactions(
    transactions: &[Transaction],
    filter: &TransactionFilter,
) -> Vec<Transaction> {
    transactions
        .iter()
        .filter(|transaction| filter.matches(transaction))
        .cloned()
        .collect()
}

#[cfg(test)]
mod filter_tests {
    use time::macros::date;

    use crate::{
        auth::UserID,
        transaction::{Transaction, TransactionKind},
    };

    use super::{TransactionFilter, filter_transactions};

    fn transaction(kind: TransactionKind, category: &str, description: &str) -> Transaction {
        Transaction {
            id: 1,
            date: date!(2024 - 01 - 01),
            amount: 100.0,
            kind,
            category: category.to_owned(),
            description: description.to_owned(),
            is_reconciled: false,
            user_id: UserID::new(1),
        }
    }

    fn test_transactions() -> Vec<Transaction> {
        vec![
            transaction(TransactionKind::Income, "Salary", "Monthly salary"),
            transaction(TransactionKind::Expense, "Rent", "Jan rent"),
            transaction(TransactionKind::Expense, "Groceries", "Weekly shop"),
        ]
    }

    #[test]
    fn empty_filter_passes_everything_through() {
        let transactions = test_transactions();

        let filtered = filter_transactions(&transactions, &TransactionFilter::default());

        assert_eq!(filtered, transactions);
    }

    #[test]
    fn filters_by_kind() {
        let transactions = test_transactions();
        let filter = TransactionFilter {
            kind: Some(TransactionKind::Expense),
            ..Default::default()
        };

        let filtered = filter_transactions(&transactions, &filter);

        assert_eq!(filtered.len(), 2);
        assert!(filtered.iter().all(|t| t.kind == TransactionKind::Expense));
    }

    #[test]
    fn filters_by_category() {
        let transactions = test_transactions();
        let filter = TransactionFilter {
            category: Some("Rent".to_owned()),
            ..Default::default()
        };

        let filtered = filter_transactions(&transactions, &filter);

        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].category, "Rent");
    }

    #[test]
    fn search_matches_description_or_category_case_insensitively() {
        let transactions = test_transactions();

        let by_description = filter_transactions(
            &transactions,
            &TransactionFilter {
                search: Some("WEEKLY".to_owned()),
                ..Default::default()
            },
        );
        assert_eq!(by_description.len(), 1);
        assert_eq!(by_description[0].description, "Weekly shop");

        let by_category = filter_transactions(
            &transactions,
            &TransactionFilter {
                search: Some("sala".to_owned()),
                ..Default::default()
            },
        );
        assert_eq!(by_category.len(), 1);
        assert_eq!(by_category[0].category, "Salary");
    }

    #[test]
    fn predicates_are_anded() {
        let transactions = test_transactions();
        let filter = TransactionFilter {
            kind: Some(TransactionKind::Expense),
            category: Some("Rent".to_owned()),
            search: Some("jan".to_owned()),
        };

        let filtered = filter_transactions(&transactions, &filter);

        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].description, "Jan rent");

        let contradictory = TransactionFilter {
            kind: Some(TransactionKind::Income),
            category: Some("Rent".to_owned()),
            search: None,
        };

        assert_eq!(filter_transactions(&transactions, &contradictory), vec![]);
    }

    #[test]
    fn deserializes_from_query_string() {
        let filter: TransactionFilter =
            serde_html_form::from_str("kind=expense&category=Rent&search=jan").unwrap();

        assert_eq!(
            filter,
            TransactionFilter {
                kind: Some(TransactionKind::Expense),
                category: Some("Rent".to_owned()),
                search: Some("jan".to_owned()),
            }
        );
    }

    #[test]
    fn filter_is_idempotent() {
        let transactions = test_transactions();
        let filter = TransactionFilter {
            kind: Some(TransactionKind::Expense),
            search: Some("rent".to_owned()),
            ..Default::default()
        };

        let once = filter_transactions(&transactions, &filter);
        let twice = filter_transactions(&once, &filter);

        assert_eq!(once, twice);
    }
}
