//! The suggested category lists shown in the new transaction form.
//!
//! These are suggestions only. The data layer accepts any category label.

/// Suggested categories for income transactions.
pub const INCOME_CATEGORIES: [&str; 5] = [
    "Salary",
    "Business",
    "Investments",
    "Freelance",
    "Other Income",
];

/// Suggested categories for expense transactions.
pub const EXPENSE_CATEGORIES: [&str; 9] = [
    "Rent",
    "Groceries",
    "Utilities",
    "Transport",
    "Healthcare",
    "Entertainment",
    "Shopping",
    "Education",
    "Other Expenses",
];
