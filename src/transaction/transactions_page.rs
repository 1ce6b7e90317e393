//! The transactions page: a filterable, newest-first list of the user's
//! transactions with inline edit, reconcile, and delete actions.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;
use unicode_segmentation::UnicodeSegmentation;

use crate::{
    AppState, Error,
    auth::UserID,
    endpoints,
    html::{
        BADGE_BLUE_STYLE, BADGE_GRAY_STYLE, BADGE_GREEN_STYLE, BADGE_RED_STYLE,
        BUTTON_DELETE_STYLE, BUTTON_SECONDARY_STYLE, FORM_TEXT_INPUT_STYLE, base, format_currency,
        link,
    },
    navigation::NavBar,
    transaction::{
        Transaction, TransactionFilter, TransactionKind, filter_transactions, list_transactions,
    },
};

/// The state needed for the transactions page.
#[derive(Debug, Clone)]
pub struct TransactionsPageState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for TransactionsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The filter controls as they arrive in the query string.
///
/// The selects submit the literal string "all" for the pass-through option
/// and the search box submits an empty string when cleared, so both are
/// normalized away here.
#[derive(Debug, Default, Deserialize)]
pub struct FilterQuery {
    kind: Option<String>,
    category: Option<String>,
    search: Option<String>,
}

impl FilterQuery {
    fn into_filter(self) -> TransactionFilter {
        let kind = match self.kind.as_deref() {
            Some("income") => Some(TransactionKind::Income),
            Some("expense") => Some(TransactionKind::Expense),
            _ => None,
        };

        let category = self
            .category
            .filter(|category| !category.is_empty() && category != "all");

        let search = self
            .search
            .map(|search| search.trim().to_owned())
            .filter(|search| !search.is_empty());

        TransactionFilter {
            kind,
            category,
            search,
        }
    }
}

/// Display the user's transaction history with the filter controls applied.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn get_transactions_page(
    State(state): State<TransactionsPageState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<FilterQuery>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let transactions = list_transactions(user_id, &connection)?;

    // The category select lists every category the user has actually used.
    let mut categories: Vec<String> = transactions
        .iter()
        .map(|transaction| transaction.category.clone())
        .collect();
    categories.sort();
    categories.dedup();

    let filter = query.into_filter();
    let filtered = filter_transactions(&transactions, &filter);

    Ok(transactions_view(&filtered, &categories, &filter).into_response())
}

fn transactions_view(
    transactions: &[Transaction],
    categories: &[String],
    filter: &TransactionFilter,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::TRANSACTIONS_VIEW).into_html();

    let content = html! {
        (nav_bar)

        div class="flex flex-col px-2 lg:px-6 py-4 mx-auto max-w-screen-lg text-gray-900 dark:text-white"
        {
            h2 class="text-xl font-bold mb-4" { "Transaction History" }

            (filter_form(categories, filter))

            @if transactions.is_empty() {
                p class="text-center text-gray-500 dark:text-gray-400 py-8"
                {
                    "No transactions found. Add one "
                    (link(endpoints::NEW_TRANSACTION_VIEW, "here"))
                    "."
                }
            } @else {
                ul class="space-y-3"
                {
                    @for transaction in transactions {
                        (transaction_row(transaction))
                    }
                }
            }
        }
    };

    base("Transactions", &[], &content)
}

fn filter_form(categories: &[String], filter: &TransactionFilter) -> Markup {
    let selected_kind = filter.kind.map(TransactionKind::as_str).unwrap_or("all");
    let selected_category = filter.category.as_deref().unwrap_or("all");
    let search = filter.search.as_deref().unwrap_or("");

    html! {
        form
            method="get"
            action=(endpoints::TRANSACTIONS_VIEW)
            class="flex flex-col sm:flex-row gap-2 mb-4"
        {
            input
                type="search"
                name="search"
                placeholder="Search transactions..."
                value=(search)
                class=(FORM_TEXT_INPUT_STYLE);

            select name="kind" class=(FORM_TEXT_INPUT_STYLE)
            {
                option value="all" selected[selected_kind == "all"] { "All Types" }
                option value="income" selected[selected_kind == "income"] { "Income" }
                option value="expense" selected[selected_kind == "expense"] { "Expense" }
            }

            select name="category" class=(FORM_TEXT_INPUT_STYLE)
            {
                option value="all" selected[selected_category == "all"] { "All Categories" }

                @for category in categories {
                    option value=(category) selected[category == selected_category] { (category) }
                }
            }

            button type="submit" class=(BUTTON_SECONDARY_STYLE) { "Filter" }
        }
    }
}

/// Renders a single transaction as a list row with its inline actions.
///
/// The row is also returned by the amount and reconcile endpoints so HTMX can
/// swap an updated row in place.
pub(super) fn transaction_row(transaction: &Transaction) -> Markup {
    let amount_style = match transaction.kind {
        TransactionKind::Income => "font-bold text-green-600 dark:text-green-400",
        TransactionKind::Expense => "font-bold text-red-600 dark:text-red-400",
    };
    let kind_badge = match transaction.kind {
        TransactionKind::Income => BADGE_GREEN_STYLE,
        TransactionKind::Expense => BADGE_RED_STYLE,
    };
    let (reconciled_badge, reconciled_label) = if transaction.is_reconciled {
        (BADGE_GREEN_STYLE, "Matched")
    } else {
        (BADGE_GRAY_STYLE, "Unmatched")
    };
    let toggle_label = if transaction.is_reconciled {
        "Mark Unmatched"
    } else {
        "Mark Matched"
    };

    let amount_url = endpoints::format_endpoint(endpoints::UPDATE_TRANSACTION_AMOUNT, transaction.id);
    let toggle_url =
        endpoints::format_endpoint(endpoints::TOGGLE_TRANSACTION_RECONCILED, transaction.id);
    let delete_url = endpoints::format_endpoint(endpoints::DELETE_TRANSACTION, transaction.id);

    html! {
        li
            id=(format!("transaction-{}", transaction.id))
            class="flex flex-col sm:flex-row sm:items-center justify-between gap-2 p-4
                border border-gray-200 dark:border-gray-700 rounded-lg
                bg-white dark:bg-gray-800"
        {
            div class="flex-1 min-w-0"
            {
                div class="flex items-center gap-2 mb-1"
                {
                    span class=(kind_badge) { (transaction.kind) }
                    span class=(BADGE_BLUE_STYLE) { (transaction.category) }
                    span class=(reconciled_badge) { (reconciled_label) }
                }

                p class="font-medium" { (truncate_description(&transaction.description)) }
                p class="text-sm text-gray-500 dark:text-gray-400" { (transaction.date) }
            }

            div class="flex items-center gap-2 flex-wrap"
            {
                span class=(amount_style) { (format_currency(transaction.amount)) }

                form
                    hx-put=(amount_url)
                    hx-target="closest li"
                    hx-swap="outerHTML"
                    hx-target-error="#alert-container"
                    class="flex items-center gap-2"
                {
                    input
                        type="number"
                        name="amount"
                        step="0.01"
                        min="0"
                        value=(format!("{:.2}", transaction.amount))
                        class={ "w-24 " (FORM_TEXT_INPUT_STYLE) };

                    button type="submit" class=(BUTTON_SECONDARY_STYLE) { "Save" }
                }

                button
                    hx-put=(toggle_url)
                    hx-target="closest li"
                    hx-swap="outerHTML"
                    hx-target-error="#alert-container"
                    class=(BUTTON_SECONDARY_STYLE)
                {
                    (toggle_label)
                }

                button
                    hx-delete=(delete_url)
                    hx-target="closest li"
                    hx-swap="outerHTML"
                    hx-target-error="#alert-container"
                    hx-confirm="Delete this transaction?"
                    class=(BUTTON_DELETE_STYLE)
                {
                    "Delete"
                }
            }
        }
    }
}

fn truncate_description(description: &str) -> String {
    const MAX_GRAPHEMES: usize = 60;

    let graphemes: Vec<&str> = description.graphemes(true).collect();

    if graphemes.len() <= MAX_GRAPHEMES {
        description.to_owned()
    } else {
        format!("{}…", graphemes[..MAX_GRAPHEMES - 1].concat())
    }
}
