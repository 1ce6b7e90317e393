//! Dashboard HTTP handlers and view rendering.
//!
//! This module contains:
//! - Route handlers for displaying the dashboard and the report partial
//! - The CSV download endpoint
//! - HTML view functions for the summary cards and category analysis

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;
use time::{Date, OffsetDateTime};

use crate::{
    AppState, Error,
    auth::UserID,
    endpoints,
    html::{
        CARD_STYLE, FORM_TEXT_INPUT_STYLE, HeadElement, LINK_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, format_currency, format_currency_rounded, link,
    },
    navigation::NavBar,
    report::{
        CategoryBreakdown, PeriodBucket, SummaryTotals,
        charts::{build_dashboard_charts, charts_view},
        csv::export_csv,
        window::{ReportWindow, windowed_report},
    },
    timezone::get_local_offset,
    transaction::{Transaction, list_transactions},
};

use super::aggregation::{ReportPeriod, bucket_by_period, category_breakdown, summary_totals};

/// The state needed for displaying the dashboard page.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Asia/Kolkata".
    pub local_timezone: String,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The report controls as they arrive in the query string.
#[derive(Debug, Default, Deserialize)]
pub struct WindowQuery {
    /// The window preset to display.
    pub window: Option<ReportWindow>,
    /// The calendar granularity for the period summary table.
    pub period: Option<ReportPeriod>,
}

/// Everything the report section needs to render.
struct ReportData {
    window: ReportWindow,
    period: ReportPeriod,
    buckets: Vec<PeriodBucket>,
    totals: SummaryTotals,
    breakdown: Vec<CategoryBreakdown>,
    period_buckets: Vec<PeriodBucket>,
}

fn build_report_data(
    transactions: &[Transaction],
    window: ReportWindow,
    period: ReportPeriod,
    today: Date,
) -> ReportData {
    let buckets = windowed_report(transactions, window, today);

    // Totals and the category breakdown cover the same window as the charts.
    let start = window.start(today);
    let in_window: Vec<Transaction> = transactions
        .iter()
        .filter(|transaction| transaction.date >= start)
        .cloned()
        .collect();

    ReportData {
        window,
        period,
        buckets,
        totals: summary_totals(&in_window),
        breakdown: category_breakdown(&in_window),
        // The period table covers the user's whole history, not the window.
        period_buckets: bucket_by_period(transactions, period),
    }
}

fn resolve_today(local_timezone: &str) -> Result<Date, Error> {
    let local_offset = get_local_offset(local_timezone)
        .ok_or_else(|| Error::InvalidTimezoneError(local_timezone.to_owned()))?;

    Ok(OffsetDateTime::now_utc().to_offset(local_offset).date())
}

/// Display a page with an overview of the user's finances for the selected
/// window.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<WindowQuery>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let transactions = list_transactions(user_id, &connection)?;
    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW);

    if transactions.is_empty() {
        return Ok(dashboard_no_data_view(nav_bar).into_response());
    }

    let today = resolve_today(&state.local_timezone)?;
    let window = query.window.unwrap_or_else(ReportWindow::default_window);
    let period = query.period.unwrap_or_else(ReportPeriod::default_period);
    let data = build_report_data(&transactions, window, period, today);

    Ok(dashboard_view(nav_bar, &data).into_response())
}

/// Return the report section for the selected window, used by HTMX when the
/// window select changes.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn get_report_partial(
    State(state): State<DashboardState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<WindowQuery>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let transactions = match list_transactions(user_id, &connection) {
        Ok(transactions) => transactions,
        Err(error) => return error.into_alert_response(),
    };

    let today = match resolve_today(&state.local_timezone) {
        Ok(today) => today,
        Err(error) => return error.into_alert_response(),
    };

    let window = query.window.unwrap_or_else(ReportWindow::default_window);
    let period = query.period.unwrap_or_else(ReportPeriod::default_period);
    let data = build_report_data(&transactions, window, period, today);

    report_content(&data).into_response()
}

/// Download the transactions in the selected window as a CSV file.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn export_csv_endpoint(
    State(state): State<DashboardState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<WindowQuery>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let transactions = list_transactions(user_id, &connection)?;
    let today = resolve_today(&state.local_timezone)?;
    let window = query.window.unwrap_or_else(ReportWindow::default_window);

    let start = window.start(today);
    let in_window: Vec<Transaction> = transactions
        .into_iter()
        .filter(|transaction| transaction.date >= start)
        .collect();

    let csv = export_csv(&in_window)?;
    let filename = format!(
        "financial-report-{}-{}.csv",
        window.as_query_value(),
        today
    );

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv".to_owned()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        csv,
    )
        .into_response())
}

/// Renders the dashboard page when no transaction data exists.
fn dashboard_no_data_view(nav_bar: NavBar) -> Markup {
    let nav_bar = nav_bar.into_html();
    let new_transaction_link = link(endpoints::NEW_TRANSACTION_VIEW, "adding one");

    let content = html!(
        (nav_bar)

        div class="flex flex-col items-center px-6 py-8 mx-auto text-gray-900 dark:text-white"
        {
            h2 class="text-xl font-bold"
            {
                "Nothing here yet..."
            }

            p
            {
                "Reports and charts will show up here once you add some transactions.
                Start by " (new_transaction_link) "."
            }
        }
    );

    base("Dashboard", &[], &content)
}

/// Renders the main dashboard page with cards, charts, and the window selector.
fn dashboard_view(nav_bar: NavBar, data: &ReportData) -> Markup {
    let nav_bar = nav_bar.into_html();

    let content = html!(
        (nav_bar)

        div
            class="flex flex-col items-center px-2 lg:px-6 lg:py-8 mx-auto
                max-w-screen-xl text-gray-900 dark:text-white"
        {
            (report_content(data))
        }
    );

    let scripts = [HeadElement::ScriptLink(
        "/static/echarts.6.0.0.min.js".to_owned(),
    )];

    base("Dashboard", &scripts, &content)
}

/// Renders the report section: window controls, summary cards, charts, and
/// the category analysis. This is the fragment swapped by HTMX on window
/// changes.
fn report_content(data: &ReportData) -> Markup {
    let charts = build_dashboard_charts(&data.buckets, data.window.label());
    let export_url = format!(
        "{}?window={}",
        endpoints::EXPORT_CSV,
        data.window.as_query_value()
    );

    html!(
        div id="report-content" class="w-full"
        {
            div class="flex flex-wrap items-center justify-between gap-2 mb-4"
            {
                h2 class="text-xl font-bold" { "Financial Reports" }

                div class="flex items-center gap-2"
                {
                    form
                        hx-get=(endpoints::REPORT_PARTIAL)
                        hx-trigger="change"
                        hx-target="#report-content"
                        hx-swap="outerHTML"
                        hx-target-error="#alert-container"
                        class="flex items-center gap-2"
                    {
                        select
                            name="window"
                            aria-label="Report window"
                            class=(FORM_TEXT_INPUT_STYLE)
                        {
                            @for window in [
                                ReportWindow::Last7Days,
                                ReportWindow::LastMonth,
                                ReportWindow::LastYear,
                            ] {
                                option
                                    value=(window.as_query_value())
                                    selected[window == data.window]
                                {
                                    (window.label())
                                }
                            }
                        }

                        select
                            name="period"
                            aria-label="Summary table granularity"
                            class=(FORM_TEXT_INPUT_STYLE)
                        {
                            @for period in [
                                ReportPeriod::Daily,
                                ReportPeriod::Weekly,
                                ReportPeriod::Monthly,
                                ReportPeriod::Yearly,
                            ] {
                                option
                                    value=(period.as_query_value())
                                    selected[period == data.period]
                                {
                                    (period.label())
                                }
                            }
                        }
                    }

                    a href=(export_url) class=(LINK_STYLE) { "Download Report" }
                }
            }

            (summary_cards(&data.totals, data.window.label()))

            (charts_view(&charts))

            (period_summary_table(&data.period_buckets, data.period))

            (category_analysis(&data.breakdown))
        }
    )
}

/// Renders a table with one row per calendar bucket, covering the user's
/// whole history at the selected granularity.
fn period_summary_table(buckets: &[PeriodBucket], period: ReportPeriod) -> Markup {
    if buckets.is_empty() {
        return html! {};
    }

    let net_style = |net: f64| {
        if net >= 0.0 {
            "text-green-600 dark:text-green-400"
        } else {
            "text-red-600 dark:text-red-400"
        }
    };

    html!(
        section class="w-full mb-8"
        {
            h3 class="text-xl font-semibold mb-4"
            {
                (period.label()) " Summary"
            }

            div class="overflow-x-auto rounded-lg shadow"
            {
                table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
                {
                    thead class=(TABLE_HEADER_STYLE)
                    {
                        tr
                        {
                            th scope="col" class=(TABLE_CELL_STYLE) { "Period" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Income" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Expenses" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Net" }
                        }
                    }
                    tbody
                    {
                        @for bucket in buckets {
                            tr class=(TABLE_ROW_STYLE)
                            {
                                th
                                    scope="row"
                                    class={(TABLE_CELL_STYLE) " font-medium text-gray-900 dark:text-white"}
                                {
                                    (bucket.label)
                                }
                                td class={(TABLE_CELL_STYLE) " text-green-600 dark:text-green-400"}
                                {
                                    (format_currency(bucket.income))
                                }
                                td class={(TABLE_CELL_STYLE) " text-red-600 dark:text-red-400"}
                                {
                                    (format_currency(bucket.expenses))
                                }
                                td class={(TABLE_CELL_STYLE) " " (net_style(bucket.net))}
                                {
                                    (format_currency(bucket.net))
                                }
                            }
                        }
                    }
                }
            }
        }
    )
}

fn summary_cards(totals: &SummaryTotals, window_label: &str) -> Markup {
    let net_style = if totals.net >= 0.0 {
        "text-2xl font-bold text-green-600 dark:text-green-400"
    } else {
        "text-2xl font-bold text-red-600 dark:text-red-400"
    };

    html!(
        section class="grid grid-cols-1 md:grid-cols-4 gap-4 w-full mb-4"
        {
            div class=(CARD_STYLE)
            {
                div class="text-2xl font-bold text-green-600 dark:text-green-400"
                {
                    (format_currency(totals.total_income))
                }
                p class="text-sm text-gray-600 dark:text-gray-400"
                {
                    "Total Income (" (window_label) ")"
                }
            }

            div class=(CARD_STYLE)
            {
                div class="text-2xl font-bold text-red-600 dark:text-red-400"
                {
                    (format_currency(totals.total_expenses))
                }
                p class="text-sm text-gray-600 dark:text-gray-400"
                {
                    "Total Expenses (" (window_label) ")"
                }
            }

            div class=(CARD_STYLE)
            {
                div class=(net_style)
                {
                    (format_currency(totals.net))
                }
                p class="text-sm text-gray-600 dark:text-gray-400"
                {
                    (format!("{:.1}", totals.savings_rate)) "% savings rate"
                }
            }

            div class=(CARD_STYLE)
            {
                div class="text-2xl font-bold text-purple-600 dark:text-purple-400"
                {
                    (format_currency_rounded(totals.avg_daily_expense))
                }
                p class="text-sm text-gray-600 dark:text-gray-400"
                {
                    "Avg Daily Expense, based on 30 days"
                }
            }
        }
    )
}

fn category_analysis(breakdown: &[CategoryBreakdown]) -> Markup {
    if breakdown.is_empty() {
        return html! {};
    }

    html!(
        section class="w-full mb-8"
        {
            h3 class="text-xl font-semibold mb-4" { "Category-wise Expenses" }

            ul class="space-y-3"
            {
                @for entry in breakdown {
                    li class={ "flex items-center justify-between " (CARD_STYLE) }
                    {
                        div
                        {
                            p class="font-medium" { (entry.category) }
                            p class="text-sm text-gray-500 dark:text-gray-400"
                            {
                                (format!("{:.1}", entry.percentage)) "% of total expenses"
                            }
                        }

                        div class="text-right"
                        {
                            p class="font-bold text-lg" { (format_currency(entry.amount)) }
                            (percentage_bar(entry.percentage))
                        }
                    }
                }
            }
        }
    )
}

fn percentage_bar(percentage: f64) -> Markup {
    let clamped = percentage.clamp(0.0, 100.0);

    html! {
        div
            class="w-20 bg-gray-200 dark:bg-gray-700 rounded-full h-2"
            role="progressbar"
            aria-valuenow=(format!("{clamped:.0}"))
            aria-valuemin="0"
            aria-valuemax="100"
        {
            @if clamped > 0.0 {
                div
                    class="bg-blue-600 dark:bg-blue-500 h-2 rounded-full"
                    style=(format!("width: {clamped:.1}%"))
                {}
            }
        }
    }
}

#[cfg(test)]
mod dashboard_page_tests {
    use std::{
        str::FromStr,
        sync::{Arc, Mutex},
    };

    use axum::{
        Extension,
        extract::{Query, State},
        http::{StatusCode, header},
    };
    use email_address::EmailAddress;
    use rusqlite::Connection;
    use scraper::{Html, Selector};
    use time::{Duration, OffsetDateTime};

    use crate::{
        auth::{PasswordHash, UserID, create_user},
        db::initialize,
        report::ReportWindow,
        test_utils::{assert_valid_html, parse_html_document, parse_html_fragment},
        transaction::{Transaction, TransactionKind, create_transaction},
    };

    use super::{
        DashboardState, WindowQuery, export_csv_endpoint, get_dashboard_page, get_report_partial,
    };

    fn get_test_state() -> (DashboardState, UserID) {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();

        let user = create_user(
            EmailAddress::from_str("foo@bar.baz").unwrap(),
            PasswordHash::new_unchecked("hunter2"),
            &conn,
        )
        .unwrap();

        (
            DashboardState {
                db_connection: Arc::new(Mutex::new(conn)),
                local_timezone: "Etc/UTC".to_owned(),
            },
            user.id,
        )
    }

    fn insert_test_transactions(state: &DashboardState, user_id: UserID) {
        let connection = state.db_connection.lock().unwrap();
        let today = OffsetDateTime::now_utc().date();

        create_transaction(
            Transaction::build(TransactionKind::Income, 1000.0, today, "Salary")
                .description("Monthly salary"),
            user_id,
            &connection,
        )
        .unwrap();
        create_transaction(
            Transaction::build(
                TransactionKind::Expense,
                400.0,
                today - Duration::days(2),
                "Rent",
            )
            .description("Jan rent"),
            user_id,
            &connection,
        )
        .unwrap();
    }

    #[tokio::test]
    async fn dashboard_page_loads_successfully() {
        let (state, user_id) = get_test_state();
        insert_test_transactions(&state, user_id);

        let response = get_dashboard_page(
            State(state),
            Extension(user_id),
            Query(WindowQuery::default()),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        assert_element_exists(&html, "#income-expenses-chart");
        assert_element_exists(&html, "#net-balance-chart");
        assert_element_exists(&html, "select[name=window]");
        assert_element_exists(&html, "select[name=period]");
        assert_element_exists(&html, "#report-content");
        assert_element_exists(&html, "table");
    }

    #[tokio::test]
    async fn displays_prompt_text_on_no_data() {
        let (state, user_id) = get_test_state();

        let response = get_dashboard_page(
            State(state),
            Extension(user_id),
            Query(WindowQuery::default()),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        let text: String = html.root_element().text().collect();
        assert!(text.contains("Nothing here yet"));
    }

    #[tokio::test]
    async fn report_partial_marks_selected_window() {
        let (state, user_id) = get_test_state();
        insert_test_transactions(&state, user_id);

        let response = get_report_partial(
            State(state),
            Extension(user_id),
            Query(WindowQuery {
                window: Some(ReportWindow::Last7Days),
                period: None,
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;

        let selector = Selector::parse("option[value=\"7days\"]").unwrap();
        let option = html.select(&selector).next().expect("expected 7days option");
        assert!(
            option.value().attr("selected").is_some(),
            "the 7days option should be selected"
        );
    }

    #[tokio::test]
    async fn csv_export_sets_download_headers() {
        let (state, user_id) = get_test_state();
        insert_test_transactions(&state, user_id);

        let response = export_csv_endpoint(
            State(state),
            Extension(user_id),
            Query(WindowQuery {
                window: Some(ReportWindow::LastYear),
                period: None,
            }),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/csv"
        );
        let disposition = response
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .unwrap()
            .to_str()
            .unwrap();
        assert!(disposition.starts_with("attachment; filename=\"financial-report-1year-"));

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = String::from_utf8_lossy(&body);
        assert!(text.starts_with("Date,Type,Category,Description,Amount,Reconciled\n"));
        assert!(text.contains("Monthly salary"));
    }

    #[track_caller]
    fn assert_element_exists(html: &Html, selector: &str) {
        let selector = Selector::parse(selector).unwrap();
        assert!(
            html.select(&selector).next().is_some(),
            "expected an element matching {selector:?}"
        );
    }
}
