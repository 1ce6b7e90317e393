//! Pure aggregation functions over the in-memory transaction list.
//!
//! Everything in this file is deterministic and side-effect free: the same
//! transaction slice always produces the same buckets, breakdowns, and
//! totals. Handlers call these synchronously on every render.

use std::collections::HashMap;

use serde::Deserialize;
use time::{Date, Duration};

use crate::transaction::{Transaction, TransactionKind};

/// The calendar granularity used to group transactions into buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportPeriod {
    /// One bucket per calendar day.
    Daily,
    /// One bucket per week, starting on Sunday.
    Weekly,
    /// One bucket per calendar month.
    Monthly,
    /// One bucket per calendar year.
    Yearly,
}

impl ReportPeriod {
    /// The granularity shown when the user has not picked one.
    pub fn default_period() -> Self {
        Self::Monthly
    }

    /// The value used in query strings for this granularity.
    pub fn as_query_value(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }

    /// The human-readable label for this granularity.
    pub fn label(self) -> &'static str {
        match self {
            Self::Daily => "Daily",
            Self::Weekly => "Weekly",
            Self::Monthly => "Monthly",
            Self::Yearly => "Yearly",
        }
    }
}

/// The income, expense, and net totals for one time bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodBucket {
    /// The label identifying the bucket, e.g. "2024-01" for a monthly bucket.
    pub label: String,
    /// Sum of income amounts in the bucket.
    pub income: f64,
    /// Sum of expense amounts in the bucket.
    pub expenses: f64,
    /// `income - expenses`.
    pub net: f64,
}

impl PeriodBucket {
    pub(super) fn empty(label: String) -> Self {
        Self {
            label,
            income: 0.0,
            expenses: 0.0,
            net: 0.0,
        }
    }

    pub(super) fn add(&mut self, transaction: &Transaction) {
        match transaction.kind {
            TransactionKind::Income => self.income += transaction.amount,
            TransactionKind::Expense => self.expenses += transaction.amount,
        }
        self.net = self.income - self.expenses;
    }
}

/// Group transactions into calendar buckets of the given granularity.
///
/// Bucket keys are chosen so that their lexicographic order is also their
/// chronological order: ISO dates for daily and weekly buckets (a week is
/// keyed by the Sunday that starts it), `YYYY-MM` for monthly buckets, and
/// `YYYY` for yearly buckets. The output is sorted ascending by key.
///
/// Periods with no transactions produce no bucket; an empty input produces
/// an empty output.
pub fn bucket_by_period(transactions: &[Transaction], period: ReportPeriod) -> Vec<PeriodBucket> {
    let mut buckets: HashMap<String, PeriodBucket> = HashMap::new();

    for transaction in transactions {
        let key = period_key(transaction.date, period);
        buckets
            .entry(key.clone())
            .or_insert_with(|| PeriodBucket::empty(key))
            .add(transaction);
    }

    let mut buckets: Vec<PeriodBucket> = buckets.into_values().collect();
    buckets.sort_by(|a, b| a.label.cmp(&b.label));
    buckets
}

fn period_key(date: Date, period: ReportPeriod) -> String {
    match period {
        ReportPeriod::Daily => date.to_string(),
        ReportPeriod::Weekly => week_start(date).to_string(),
        ReportPeriod::Monthly => format!("{:04}-{:02}", date.year(), date.month() as u8),
        ReportPeriod::Yearly => format!("{:04}", date.year()),
    }
}

/// The Sunday that starts the week containing `date`.
fn week_start(date: Date) -> Date {
    date - Duration::days(date.weekday().number_days_from_sunday() as i64)
}

/// One category's share of the total expenses.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryBreakdown {
    /// The category label.
    pub category: String,
    /// Sum of expense amounts in the category.
    pub amount: f64,
    /// The category's share of total expenses, 0 to 100.
    ///
    /// When there are no expenses at all this is 0, never NaN.
    pub percentage: f64,
}

/// Group expense transactions by category and compute each category's share
/// of the total.
///
/// Income transactions are ignored. The output is sorted descending by
/// amount, with ties broken alphabetically so the order is deterministic.
pub fn category_breakdown(transactions: &[Transaction]) -> Vec<CategoryBreakdown> {
    let mut totals: HashMap<&str, f64> = HashMap::new();

    for transaction in transactions {
        if transaction.kind == TransactionKind::Expense {
            *totals.entry(transaction.category.as_str()).or_insert(0.0) += transaction.amount;
        }
    }

    let total_expenses: f64 = totals.values().sum();

    let mut breakdown: Vec<CategoryBreakdown> = totals
        .into_iter()
        .map(|(category, amount)| CategoryBreakdown {
            category: category.to_owned(),
            amount,
            percentage: if total_expenses == 0.0 {
                0.0
            } else {
                amount / total_expenses * 100.0
            },
        })
        .collect();

    breakdown.sort_by(|a, b| {
        b.amount
            .partial_cmp(&a.amount)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.category.cmp(&b.category))
    });
    breakdown
}

/// Average daily expense assumes a 30 day month regardless of the report
/// range.
const AVG_DAILY_EXPENSE_DIVISOR: f64 = 30.0;

/// The headline numbers shown on the dashboard summary cards.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryTotals {
    /// Sum of all income amounts.
    pub total_income: f64,
    /// Sum of all expense amounts.
    pub total_expenses: f64,
    /// `total_income - total_expenses`.
    pub net: f64,
    /// `total_expenses / 30`.
    pub avg_daily_expense: f64,
    /// The net as a share of income, 0 when there is no income.
    pub savings_rate: f64,
}

/// Compute the summary totals over the whole transaction slice.
pub fn summary_totals(transactions: &[Transaction]) -> SummaryTotals {
    let mut total_income = 0.0;
    let mut total_expenses = 0.0;

    for transaction in transactions {
        match transaction.kind {
            TransactionKind::Income => total_income += transaction.amount,
            TransactionKind::Expense => total_expenses += transaction.amount,
        }
    }

    let net = total_income - total_expenses;
    let savings_rate = if total_income == 0.0 {
        0.0
    } else {
        net / total_income * 100.0
    };

    SummaryTotals {
        total_income,
        total_expenses,
        net,
        avg_daily_expense: total_expenses / AVG_DAILY_EXPENSE_DIVISOR,
        savings_rate,
    }
}

#[cfg(test)]
pub(super) mod test_fixtures {
    use time::Date;

    use crate::{
        auth::UserID,
        transaction::{Transaction, TransactionKind},
    };

    pub fn transaction(
        kind: TransactionKind,
        amount: f64,
        date: Date,
        category: &str,
    ) -> Transaction {
        Transaction {
            id: 1,
            date,
            amount,
            kind,
            category: category.to_owned(),
            description: String::new(),
            is_reconciled: false,
            user_id: UserID::new(1),
        }
    }
}

#[cfg(test)]
mod bucket_by_period_tests {
    use time::macros::date;

    use crate::transaction::TransactionKind;

    use super::{ReportPeriod, bucket_by_period, test_fixtures::transaction};

    #[test]
    fn daily_buckets_are_keyed_by_iso_date() {
        let transactions = vec![
            transaction(
                TransactionKind::Income,
                1000.0,
                date!(2024 - 01 - 01),
                "Salary",
            ),
            transaction(
                TransactionKind::Expense,
                400.0,
                date!(2024 - 01 - 01),
                "Rent",
            ),
            transaction(
                TransactionKind::Expense,
                100.0,
                date!(2024 - 01 - 02),
                "Food",
            ),
        ];

        let buckets = bucket_by_period(&transactions, ReportPeriod::Daily);

        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].label, "2024-01-01");
        assert_eq!(buckets[0].income, 1000.0);
        assert_eq!(buckets[0].expenses, 400.0);
        assert_eq!(buckets[0].net, 600.0);
        assert_eq!(buckets[1].label, "2024-01-02");
        assert_eq!(buckets[1].net, -100.0);
    }

    #[test]
    fn weekly_buckets_start_on_sunday() {
        // 2024-01-15 is a Monday, so its week is keyed by Sunday 2024-01-14.
        let transactions = vec![
            transaction(
                TransactionKind::Expense,
                50.0,
                date!(2024 - 01 - 15),
                "Food",
            ),
            // A Saturday in the same week.
            transaction(
                TransactionKind::Expense,
                25.0,
                date!(2024 - 01 - 20),
                "Food",
            ),
            // The following Sunday starts a new week.
            transaction(
                TransactionKind::Expense,
                10.0,
                date!(2024 - 01 - 21),
                "Food",
            ),
        ];

        let buckets = bucket_by_period(&transactions, ReportPeriod::Weekly);

        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].label, "2024-01-14");
        assert_eq!(buckets[0].expenses, 75.0);
        assert_eq!(buckets[1].label, "2024-01-21");
        assert_eq!(buckets[1].expenses, 10.0);
    }

    #[test]
    fn monthly_and_yearly_buckets_use_padded_keys() {
        let transactions = vec![
            transaction(
                TransactionKind::Income,
                10.0,
                date!(2023 - 12 - 31),
                "Salary",
            ),
            transaction(
                TransactionKind::Income,
                20.0,
                date!(2024 - 02 - 01),
                "Salary",
            ),
        ];

        let monthly = bucket_by_period(&transactions, ReportPeriod::Monthly);
        let labels: Vec<&str> = monthly.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["2023-12", "2024-02"]);

        let yearly = bucket_by_period(&transactions, ReportPeriod::Yearly);
        let labels: Vec<&str> = yearly.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["2023", "2024"]);
    }

    #[test]
    fn net_is_income_minus_expenses_for_every_bucket() {
        let transactions = vec![
            transaction(
                TransactionKind::Income,
                1000.0,
                date!(2024 - 01 - 01),
                "Salary",
            ),
            transaction(
                TransactionKind::Expense,
                400.0,
                date!(2024 - 01 - 05),
                "Rent",
            ),
            transaction(
                TransactionKind::Expense,
                100.0,
                date!(2024 - 02 - 02),
                "Food",
            ),
            transaction(
                TransactionKind::Income,
                50.0,
                date!(2024 - 02 - 20),
                "Freelance",
            ),
        ];

        for period in [
            ReportPeriod::Daily,
            ReportPeriod::Weekly,
            ReportPeriod::Monthly,
            ReportPeriod::Yearly,
        ] {
            for bucket in bucket_by_period(&transactions, period) {
                assert_eq!(
                    bucket.net,
                    bucket.income - bucket.expenses,
                    "net must equal income - expenses for bucket {}",
                    bucket.label
                );
            }
        }
    }

    #[test]
    fn bucket_income_sums_to_total_income() {
        let transactions = vec![
            transaction(
                TransactionKind::Income,
                1000.0,
                date!(2024 - 01 - 01),
                "Salary",
            ),
            transaction(
                TransactionKind::Income,
                250.0,
                date!(2024 - 03 - 15),
                "Freelance",
            ),
            transaction(
                TransactionKind::Expense,
                400.0,
                date!(2024 - 02 - 05),
                "Rent",
            ),
        ];
        let total_income = super::summary_totals(&transactions).total_income;

        for period in [
            ReportPeriod::Daily,
            ReportPeriod::Weekly,
            ReportPeriod::Monthly,
            ReportPeriod::Yearly,
        ] {
            let bucket_sum: f64 = bucket_by_period(&transactions, period)
                .iter()
                .map(|bucket| bucket.income)
                .sum();
            assert_eq!(
                bucket_sum, total_income,
                "bucket income for {period:?} should sum to the overall total"
            );
        }
    }

    #[test]
    fn empty_input_produces_no_buckets() {
        assert_eq!(bucket_by_period(&[], ReportPeriod::Daily), vec![]);
        assert_eq!(bucket_by_period(&[], ReportPeriod::Monthly), vec![]);
    }
}


#[cfg(test)]
mod summary_totals_tests {
    use time::macros::date;

    use crate::transaction::TransactionKind;

    use super::{summary_totals, test_fixtures::transaction};

    #[test]
    fn computes_totals_for_worked_example() {
        let transactions = vec![
            transaction(
                TransactionKind::Income,
                1000.0,
                date!(2024 - 01 - 01),
                "Salary",
            ),
            transaction(
                TransactionKind::Expense,
                400.0,
                date!(2024 - 01 - 01),
                "Rent",
            ),
            transaction(
                TransactionKind::Expense,
                100.0,
                date!(2024 - 01 - 02),
                "Food",
            ),
        ];

        let totals = summary_totals(&transactions);

        assert_eq!(totals.total_income, 1000.0);
        assert_eq!(totals.total_expenses, 500.0);
        assert_eq!(totals.net, 500.0);
        assert_eq!(totals.avg_daily_expense, 500.0 / 30.0);
        assert_eq!(totals.savings_rate, 50.0);
    }

    #[test]
    fn empty_input_produces_zero_totals() {
        let totals = summary_totals(&[]);

        assert_eq!(totals.total_income, 0.0);
        assert_eq!(totals.total_expenses, 0.0);
        assert_eq!(totals.net, 0.0);
        assert_eq!(totals.avg_daily_expense, 0.0);
        assert_eq!(totals.savings_rate, 0.0);
        assert!(totals.savings_rate.is_finite());
    }

    #[test]
    fn savings_rate_is_guarded_against_zero_income() {
        let transactions = vec![transaction(
            TransactionKind::Expense,
            400.0,
            date!(2024 - 01 - 01),
            "Rent",
        )];

        let totals = summary_totals(&transactions);

        assert_eq!(totals.savings_rate, 0.0);
        assert!(totals.savings_rate.is_finite());
    }
}
