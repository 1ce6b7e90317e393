//! Chart generation for the dashboard.
//!
//! Each chart is generated as JSON configuration for the ECharts library and
//! rendered into a container div by a small initialization script. The
//! script is emitted inline next to the containers so HTMX swaps re-run it
//! when the report window changes.

use charming::{
    Chart,
    component::{Axis, Grid, Legend, Title},
    element::{
        AxisLabel, AxisPointer, AxisPointerType, AxisType, JsFunction, Tooltip, Trigger,
    },
    series::{Bar, Line},
};
use maud::{Markup, PreEscaped, html};

use super::aggregation::PeriodBucket;

/// A dashboard chart with its HTML container ID and ECharts configuration.
pub(super) struct DashboardChart {
    /// The HTML element ID to use for the chart (kebab-case)
    pub id: &'static str,
    /// The ECharts configuration as a JSON string
    pub options: String,
}

/// Renders the chart containers and the script that initializes them.
///
/// The initialization script is inline so that it runs again whenever HTMX
/// swaps a fresh report partial into the page.
pub(super) fn charts_view(charts: &[DashboardChart]) -> Markup {
    let script_content = charts
        .iter()
        .map(|chart| {
            format!(
                r#"(function() {{
                    const chartDom = document.getElementById("{}");
                    const chart = echarts.init(chartDom);
                    const option = {};
                    chart.setOption(option);

                    window.addEventListener('resize', chart.resize);

                    const darkModeMediaQuery = window.matchMedia('(prefers-color-scheme: dark)');
                    const updateTheme = () => {{
                        const isDarkMode = darkModeMediaQuery.matches;
                        chart.setTheme(isDarkMode ? 'dark' : 'default');
                    }}
                    darkModeMediaQuery.addEventListener('change', updateTheme);
                    updateTheme();
                }})();"#,
                chart.id, chart.options
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    html!(
        section
            id="charts"
            class="w-full mx-auto mb-4"
        {
            div class="grid grid-cols-1 xl:grid-cols-2 gap-4"
            {
                @for chart in charts {
                    div
                        id=(chart.id)
                        class="min-h-[380px] rounded dark:bg-gray-100"
                    {}
                }
            }

            script { (PreEscaped(script_content)) }
        }
    )
}

/// Build the two dashboard charts from the windowed report series.
pub(super) fn build_dashboard_charts(
    buckets: &[PeriodBucket],
    window_label: &str,
) -> [DashboardChart; 2] {
    [
        DashboardChart {
            id: "income-expenses-chart",
            options: income_expenses_chart(buckets, window_label).to_string(),
        },
        DashboardChart {
            id: "net-balance-chart",
            options: net_balance_chart(buckets, window_label).to_string(),
        },
    ]
}

fn income_expenses_chart(buckets: &[PeriodBucket], window_label: &str) -> Chart {
    let labels: Vec<String> = buckets.iter().map(|bucket| bucket.label.clone()).collect();
    let income: Vec<f64> = buckets.iter().map(|bucket| bucket.income).collect();
    let expenses: Vec<f64> = buckets.iter().map(|bucket| bucket.expenses).collect();

    Chart::new()
        .title(
            Title::new()
                .text("Income vs Expenses Trend")
                .subtext(window_label.to_owned()),
        )
        .tooltip(currency_tooltip())
        .legend(Legend::new().top("5%"))
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("3%")
                .contain_label(true),
        )
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .axis_label(AxisLabel::new().formatter(currency_formatter())),
        )
        .series(Bar::new().name("Income").data(income))
        .series(Bar::new().name("Expenses").data(expenses))
}

fn net_balance_chart(buckets: &[PeriodBucket], window_label: &str) -> Chart {
    let labels: Vec<String> = buckets.iter().map(|bucket| bucket.label.clone()).collect();
    let net: Vec<f64> = buckets.iter().map(|bucket| bucket.net).collect();

    Chart::new()
        .title(
            Title::new()
                .text("Net Balance Trend")
                .subtext(window_label.to_owned()),
        )
        .tooltip(currency_tooltip())
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("3%")
                .contain_label(true),
        )
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .axis_label(AxisLabel::new().formatter(currency_formatter())),
        )
        .series(Line::new().name("Net Balance").data(net))
}

#[inline]
fn currency_formatter() -> JsFunction {
    JsFunction::new_with_args(
        "number",
        "const currencyFormatter = new Intl.NumberFormat('en-IN', {
              style: 'currency',
              currency: 'INR',
              maximumFractionDigits: 0
            });
            return (number) ? currencyFormatter.format(number) : \"-\";",
    )
}

/// Creates a tooltip configuration for currency values
fn currency_tooltip() -> Tooltip {
    Tooltip::new()
        .trigger(Trigger::Axis)
        .value_formatter(currency_formatter())
        .axis_pointer(AxisPointer::new().type_(AxisPointerType::Shadow))
}
