//! The bank matching page: statement upload, match results, and the endpoint
//! that marks a transaction as reconciled.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    alert::Alert,
    auth::UserID,
    endpoints,
    html::{
        BADGE_GREEN_STYLE, BADGE_RED_STYLE, BUTTON_PRIMARY_STYLE, BUTTON_SECONDARY_STYLE,
        CARD_STYLE, FORM_TEXT_INPUT_STYLE, base, format_currency, loading_spinner,
    },
    navigation::NavBar,
    reconcile::{
        MatchResult, MatchStatus, StatementMatcher, StatementUpload, StubMatcher,
    },
    transaction::{TransactionId, list_transactions, set_transaction_reconciled},
};

/// The state needed for the bank matching page.
#[derive(Clone)]
pub struct ReconcileState {
    /// The database connection for reading and updating transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The matcher used to process uploaded statements.
    pub matcher: Arc<dyn StatementMatcher + Send + Sync>,
}

impl FromRef<AppState> for ReconcileState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            matcher: Arc::new(StubMatcher),
        }
    }
}

/// Display the bank statement upload page.
pub async fn get_reconcile_page() -> Response {
    let nav_bar = NavBar::new(endpoints::RECONCILE_VIEW).into_html();

    let content = html! {
        (nav_bar)

        div class="flex flex-col px-2 lg:px-6 py-4 mx-auto max-w-screen-md text-gray-900 dark:text-white"
        {
            h2 class="text-xl font-bold mb-4" { "Bank Statement Upload" }

            form
                hx-post=(endpoints::RECONCILE_UPLOAD)
                enctype="multipart/form-data"
                hx-disabled-elt="#statement, #submit-button"
                hx-indicator="#indicator"
                hx-target="#match-results"
                hx-target-error="#alert-container"
                class="space-y-4"
            {
                div
                    class="border-2 border-dashed border-gray-300 dark:border-gray-600
                        rounded-lg p-6 text-center"
                {
                    p class="text-lg font-medium mb-1" { "Upload Bank Statement" }
                    p class="text-sm text-gray-500 dark:text-gray-400 mb-4"
                    {
                        "Supports CSV, PDF, and Excel files"
                    }

                    input
                        id="statement"
                        type="file"
                        name="statement"
                        accept=".csv,.pdf,.xlsx,.xls"
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                button
                    type="submit"
                    id="submit-button"
                    class=(BUTTON_PRIMARY_STYLE)
                {
                    span class="inline htmx-indicator" id="indicator" { (loading_spinner()) }
                    " Process Statement"
                }
            }

            div id="match-results" class="mt-6" {}
        }
    };

    base("Bank Matching", &[], &content).into_response()
}

/// Route handler for processing an uploaded bank statement.
///
/// The upload's contents are never inspected: after the matcher's fixed
/// processing delay the stub result set is rendered. The delay stands in
/// for asynchronous parsing work.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn upload_statement_endpoint(
    State(state): State<ReconcileState>,
    Extension(user_id): Extension<UserID>,
    mut multipart: Multipart,
) -> Result<Response, Response> {
    let upload = parse_statement_upload(&mut multipart).await.map_err(|error| {
        tracing::debug!("Failed to parse statement upload: {error}");
        (
            StatusCode::BAD_REQUEST,
            Alert::ErrorSimple {
                message: "Choose a statement file to upload.".to_owned(),
            }
            .into_html(),
        )
            .into_response()
    })?;

    tokio::time::sleep(state.matcher.processing_delay()).await;

    let transactions = {
        let connection = state.db_connection.lock().map_err(|error| {
            tracing::error!("could not acquire database lock: {error}");
            Error::DatabaseLockError.into_alert_response()
        })?;

        list_transactions(user_id, &connection).map_err(|error| error.into_alert_response())?
    };

    let results = state.matcher.match_statement(&upload, &transactions);

    // The original flow matches unmatched lines against the user's most
    // recent transaction.
    let newest_transaction_id = transactions.first().map(|transaction| transaction.id);

    Ok(match_results_view(&upload, &results, newest_transaction_id).into_response())
}

/// Route handler that marks a transaction as matched against a bank record.
///
/// Returns the unmatched stub statement line re-rendered as matched, which
/// HTMX swaps over the result card that triggered the request.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn match_transaction_endpoint(
    State(state): State<ReconcileState>,
    Extension(user_id): Extension<UserID>,
    Path(transaction_id): Path<TransactionId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    if let Err(error) = set_transaction_reconciled(transaction_id, user_id, true, &connection) {
        return error.into_alert_response();
    }

    // The stub only ever reports one unmatched line, so that is the card
    // being replaced.
    let matched = state
        .matcher
        .match_statement(
            &StatementUpload {
                file_name: String::new(),
                size_bytes: 0,
            },
            &[],
        )
        .into_iter()
        .find(|result| result.status == MatchStatus::Unmatched)
        .map(|result| MatchResult {
            user_amount: Some(result.bank_amount),
            status: MatchStatus::Matched,
            ..result
        });

    match matched {
        Some(result) => result_card(&result, None).into_response(),
        None => Alert::Success {
            message: "Transaction Matched".to_owned(),
            details: "Transaction has been successfully matched with bank record.".to_owned(),
        }
        .into_response(),
    }
}

async fn parse_statement_upload(multipart: &mut Multipart) -> Result<StatementUpload, Error> {
    let field = multipart
        .next_field()
        .await
        .map_err(|error| Error::MultipartError(error.to_string()))?
        .ok_or_else(|| Error::MultipartError("no file in upload".to_owned()))?;

    let file_name = field.file_name().unwrap_or("statement").to_owned();
    let bytes = field
        .bytes()
        .await
        .map_err(|error| Error::MultipartError(error.to_string()))?;

    Ok(StatementUpload {
        file_name,
        size_bytes: bytes.len(),
    })
}

fn match_results_view(
    upload: &StatementUpload,
    results: &[MatchResult],
    newest_transaction_id: Option<TransactionId>,
) -> Markup {
    let matched = results
        .iter()
        .filter(|result| result.status == MatchStatus::Matched)
        .count();
    let unmatched = results.len() - matched;

    html! {
        div class="space-y-4"
        {
            div class="bg-blue-50 dark:bg-blue-900/20 p-4 rounded-lg"
            {
                p class="font-medium" { "Selected File: " (upload.file_name) }
                p class="text-sm text-gray-600 dark:text-gray-400"
                {
                    "Size: " (format!("{:.2}", upload.size_bytes as f64 / 1024.0 / 1024.0)) " MB"
                }
            }

            (Alert::Success {
                message: "Bank Statement Processed".to_owned(),
                details: format!(
                    "Found {} transactions. {matched} matched, {unmatched} unmatched.",
                    results.len()
                ),
            }.into_html())

            h3 class="text-lg font-semibold" { "Matching Results" }

            ul class="space-y-4"
            {
                @for result in results {
                    (result_card(result, newest_transaction_id))
                }
            }
        }
    }
}

fn result_card(result: &MatchResult, newest_transaction_id: Option<TransactionId>) -> Markup {
    let (badge_style, badge_label) = match result.status {
        MatchStatus::Matched => (BADGE_GREEN_STYLE, "matched"),
        MatchStatus::Unmatched => (BADGE_RED_STYLE, "unmatched"),
    };

    html! {
        li class={ "flex items-center justify-between gap-4 " (CARD_STYLE) }
        {
            div class="flex-1"
            {
                span class=(badge_style) { (badge_label) }

                p class="font-medium mt-2" { (result.description) }
                p class="text-sm text-gray-500 dark:text-gray-400" { (result.date) }
                p class="text-sm"
                {
                    "Bank: " (format_currency(result.bank_amount))

                    @if let Some(user_amount) = result.user_amount {
                        " | Your Record: " (format_currency(user_amount))
                    }
                }
            }

            @if result.status == MatchStatus::Unmatched {
                @if let Some(transaction_id) = newest_transaction_id {
                    button
                        hx-post=(endpoints::format_endpoint(endpoints::RECONCILE_MATCH, transaction_id))
                        hx-target="closest li"
                        hx-swap="outerHTML"
                        hx-target-error="#alert-container"
                        class=(BUTTON_SECONDARY_STYLE)
                    {
                        "Match with Transaction"
                    }
                }
            }
        }
    }
}


#[cfg(test)]
mod match_results_view_tests {
    use scraper::{Html, Selector};
    use time::macros::date;

    use crate::reconcile::{MatchResult, MatchStatus, StatementUpload};

    use super::match_results_view;

    fn test_results() -> Vec<MatchResult> {
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

    fn test_upload() -> StatementUpload {
        StatementUpload {
            file_name: "statement.csv".to_owned(),
            size_bytes: 2 * 1024 * 1024,
        }
    }

    #[test]
    fn shows_file_info_and_summary() {
        let html = match_results_view(&test_upload(), &test_results(), Some(1)).into_string();

        assert!(html.contains("Selected File: statement.csv"));
        assert!(html.contains("Size: 2.00 MB"));
        assert!(html.contains("Found 2 transactions. 1 matched, 1 unmatched."));
    }

    #[test]
    fn unmatched_result_gets_match_button() {
        let html = match_results_view(&test_upload(), &test_results(), Some(7)).into_string();
        let document = Html::parse_fragment(&html);

        let button_selector = Selector::parse("button[hx-post]").unwrap();
        let buttons: Vec<_> = document.select(&button_selector).collect();
        assert_eq!(buttons.len(), 1, "only the unmatched row gets a button");
        assert_eq!(
            buttons[0].value().attr("hx-post"),
            Some("/api/reconcile/7")
        );
    }

    #[test]
    fn no_match_button_without_transactions() {
        let html = match_results_view(&test_upload(), &test_results(), None).into_string();
        let document = Html::parse_fragment(&html);

        let button_selector = Selector::parse("button[hx-post]").unwrap();
        assert_eq!(document.select(&button_selector).count(), 0);
    }
}
