//! Sliding report windows for the dashboard.
//!
//! Unlike [super::bucket_by_period], which only emits buckets for periods
//! that contain data, the windowed report pre-generates a fixed, ordered
//! list of buckets covering the selected window and fills them in. Buckets
//! with no matching transactions stay at zero so charts always show the
//! full window.

use serde::Deserialize;
use time::{Date, Duration, Month, Weekday};

use crate::transaction::Transaction;

use super::aggregation::PeriodBucket;

/// The window preset selected on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum ReportWindow {
    /// Seven one-day buckets ending today.
    #[serde(rename = "7days")]
    Last7Days,
    /// Four one-week buckets.
    #[serde(rename = "1month")]
    LastMonth,
    /// Twelve calendar-month buckets ending with the current month.
    #[serde(rename = "1year")]
    LastYear,
}

impl ReportWindow {
    /// The window shown when the user has not picked one.
    pub fn default_window() -> Self {
        Self::LastMonth
    }

    /// The value used in query strings for this window.
    pub fn as_query_value(self) -> &'static str {
        match self {
            Self::Last7Days => "7days",
            Self::LastMonth => "1month",
            Self::LastYear => "1year",
        }
    }

    /// The human-readable label for this window.
    pub fn label(self) -> &'static str {
        match self {
            Self::Last7Days => "Last 7 Days",
            Self::LastMonth => "Last Month",
            Self::LastYear => "Last Year",
        }
    }

    /// The first date included in the window, relative to `today`.
    pub fn start(self, today: Date) -> Date {
        match self {
            Self::Last7Days => today - Duration::days(7),
            Self::LastMonth => subtract_months(today, 1),
            Self::LastYear => subtract_months(today, 12),
        }
    }
}

/// Compute the windowed report series for the dashboard charts.
///
/// Transactions before the window start are ignored. Every bucket in the
/// window appears in the output, in chronological order, even when empty.
pub fn windowed_report(
    transactions: &[Transaction],
    window: ReportWindow,
    today: Date,
) -> Vec<PeriodBucket> {
    let start = window.start(today);
    let in_window: Vec<&Transaction> = transactions
        .iter()
        .filter(|transaction| transaction.date >= start)
        .collect();

    match window {
        ReportWindow::Last7Days => daily_buckets(&in_window, today),
        ReportWindow::LastMonth => weekly_buckets(&in_window, today),
        ReportWindow::LastYear => monthly_buckets(&in_window, today),
    }
}

fn daily_buckets(transactions: &[&Transaction], today: Date) -> Vec<PeriodBucket> {
    (0..7)
        .rev()
        .map(|days_ago| {
            let date = today - Duration::days(days_ago);
            let mut bucket = PeriodBucket::empty(format!(
                "{} {} {}",
                weekday_abbrev(date.weekday()),
                date.day(),
                month_abbrev(date.month()),
            ));

            for transaction in transactions {
                if transaction.date == date {
                    bucket.add(transaction);
                }
            }

            bucket
        })
        .collect()
}

// Week N (1-based) starts (5 - N) * 7 days before today and spans 7 days,
// so the fourth week ends the day before today.
fn weekly_buckets(transactions: &[&Transaction], today: Date) -> Vec<PeriodBucket> {
    (1..=4)
        .map(|week_number| {
            let start = today - Duration::days((5 - week_number) * 7);
            let end = start + Duration::days(6);
            let mut bucket = PeriodBucket::empty(format!("Week {week_number}"));

            for transaction in transactions {
                if transaction.date >= start && transaction.date <= end {
                    bucket.add(transaction);
                }
            }

            bucket
        })
        .collect()
}

fn monthly_buckets(transactions: &[&Transaction], today: Date) -> Vec<PeriodBucket> {
    (0..12)
        .rev()
        .map(|months_ago| {
            let month_date = subtract_months(today, months_ago);
            let mut bucket = PeriodBucket::empty(format!(
                "{} {:02}",
                month_abbrev(month_date.month()),
                month_date.year() % 100,
            ));

            for transaction in transactions {
                if transaction.date.year() == month_date.year()
                    && transaction.date.month() == month_date.month()
                {
                    bucket.add(transaction);
                }
            }

            bucket
        })
        .collect()
}

/// The date `months` calendar months before `date`, with the day clamped to
/// the target month's length (e.g. March 31 minus one month is February 28
/// or 29).
fn subtract_months(date: Date, months: i64) -> Date {
    let total_months = date.year() as i64 * 12 + (date.month() as u8 as i64 - 1) - months;
    let year = total_months.div_euclid(12) as i32;
    let month = month_from_number(total_months.rem_euclid(12) as u8 + 1);
    let day = date.day().min(last_day_of_month(year, month));

    Date::from_calendar_date(year, month, day).expect("clamped day is always valid")
}

fn last_day_of_month(year: i32, month: Month) -> u8 {
    match month {
        Month::January
        | Month::March
        | Month::May
        | Month::July
        | Month::August
        | Month::October
        | Month::December => 31,
        Month::April | Month::June | Month::September | Month::November => 30,
        Month::February => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
    }
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
}

fn month_from_number(month: u8) -> Month {
    match month {
        1 => Month::January,
        2 => Month::February,
        3 => Month::March,
        4 => Month::April,
        5 => Month::May,
        6 => Month::June,
        7 => Month::July,
        8 => Month::August,
        9 => Month::September,
        10 => Month::October,
        11 => Month::November,
        12 => Month::December,
        _ => panic!("invalid month number {month}"),
    }
}

pub(super) fn month_abbrev(month: Month) -> &'static str {
    match month {
        Month::January => "Jan",
        Month::February => "Feb",
        Month::March => "Mar",
        Month::April => "Apr",
        Month::May => "May",
        Month::June => "Jun",
        Month::July => "Jul",
        Month::August => "Aug",
        Month::September => "Sep",
        Month::October => "Oct",
        Month::November => "Nov",
        Month::December => "Dec",
    }
}

fn weekday_abbrev(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Monday => "Mon",
        Weekday::Tuesday => "Tue",
        Weekday::Wednesday => "Wed",
        Weekday::Thursday => "Thu",
        Weekday::Friday => "Fri",
        Weekday::Saturday => "Sat",
        Weekday::Sunday => "Sun",
    }
}


#[cfg(test)]
mod windowed_report_tests {
    use time::{Duration, macros::date};

    use crate::{
        report::aggregation::test_fixtures::transaction,
        transaction::TransactionKind,
    };

    use super::{ReportWindow, windowed_report};

    #[test]
    fn last_seven_days_always_has_seven_buckets() {
        let today = date!(2024 - 01 - 15);

        let buckets = windowed_report(&[], ReportWindow::Last7Days, today);

        assert_eq!(buckets.len(), 7);
        assert!(
            buckets
                .iter()
                .all(|bucket| bucket.income == 0.0 && bucket.expenses == 0.0 && bucket.net == 0.0)
        );
        assert_eq!(buckets[6].label, "Mon 15 Jan");
        assert_eq!(buckets[0].label, "Tue 9 Jan");
    }

    #[test]
    fn last_seven_days_assigns_transactions_to_their_day() {
        let today = date!(2024 - 01 - 15);
        let transactions = vec![
            transaction(TransactionKind::Income, 100.0, today, "Salary"),
            transaction(
                TransactionKind::Expense,
                40.0,
                today - Duration::days(2),
                "Food",
            ),
            // Outside the window, must be ignored.
            transaction(
                TransactionKind::Expense,
                999.0,
                today - Duration::days(10),
                "Rent",
            ),
        ];

        let buckets = windowed_report(&transactions, ReportWindow::Last7Days, today);

        assert_eq!(buckets[6].income, 100.0);
        assert_eq!(buckets[4].expenses, 40.0);
        let total_expenses: f64 = buckets.iter().map(|bucket| bucket.expenses).sum();
        assert_eq!(total_expenses, 40.0);
    }

    #[test]
    fn last_month_has_four_labelled_weeks() {
        let today = date!(2024 - 01 - 31);

        let buckets = windowed_report(&[], ReportWindow::LastMonth, today);

        let labels: Vec<&str> = buckets.iter().map(|bucket| bucket.label.as_str()).collect();
        assert_eq!(labels, vec!["Week 1", "Week 2", "Week 3", "Week 4"]);
    }

    #[test]
    fn last_month_assigns_transactions_to_their_week() {
        let today = date!(2024 - 01 - 31);
        // Week 4 spans the 7 days ending yesterday.
        let transactions = vec![
            transaction(
                TransactionKind::Expense,
                50.0,
                today - Duration::days(1),
                "Food",
            ),
            transaction(
                TransactionKind::Expense,
                20.0,
                today - Duration::days(8),
                "Food",
            ),
        ];

        let buckets = windowed_report(&transactions, ReportWindow::LastMonth, today);

        assert_eq!(buckets[3].expenses, 50.0);
        assert_eq!(buckets[2].expenses, 20.0);
    }

    #[test]
    fn last_year_has_twelve_months_ending_with_current_month() {
        let today = date!(2024 - 03 - 15);

        let buckets = windowed_report(&[], ReportWindow::LastYear, today);

        assert_eq!(buckets.len(), 12);
        assert_eq!(buckets[0].label, "Apr 23");
        assert_eq!(buckets[11].label, "Mar 24");
    }

    #[test]
    fn last_year_matches_by_calendar_month() {
        let today = date!(2024 - 03 - 15);
        let transactions = vec![
            transaction(
                TransactionKind::Income,
                1000.0,
                date!(2024 - 03 - 01),
                "Salary",
            ),
            transaction(
                TransactionKind::Expense,
                200.0,
                date!(2023 - 12 - 25),
                "Shopping",
            ),
        ];

        let buckets = windowed_report(&transactions, ReportWindow::LastYear, today);

        assert_eq!(buckets[11].income, 1000.0);
        let december = buckets
            .iter()
            .find(|bucket| bucket.label == "Dec 23")
            .unwrap();
        assert_eq!(december.expenses, 200.0);
    }

    #[test]
    fn every_windowed_bucket_keeps_the_net_invariant() {
        let today = date!(2024 - 06 - 10);
        let transactions = vec![
            transaction(TransactionKind::Income, 10.0, today, "Salary"),
            transaction(
                TransactionKind::Expense,
                4.0,
                today - Duration::days(3),
                "Food",
            ),
            transaction(
                TransactionKind::Income,
                7.0,
                today - Duration::days(20),
                "Freelance",
            ),
        ];

        for window in [
            ReportWindow::Last7Days,
            ReportWindow::LastMonth,
            ReportWindow::LastYear,
        ] {
            for bucket in windowed_report(&transactions, window, today) {
                assert_eq!(bucket.net, bucket.income - bucket.expenses);
            }
        }
    }
}
