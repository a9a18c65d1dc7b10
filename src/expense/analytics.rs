//! Spending summaries over a date window.
//!
//! The summary is a pure reduction over the fetched rows, computed fresh on
//! every request. Nothing is cached or maintained incrementally, and there
//! is no shared accumulator state, so the reduction is trivially testable
//! and safe under concurrent requests.

use std::collections::BTreeMap;

use serde::Serialize;
use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

use crate::expense::Expense;

/// Format for the month grouping key, e.g. "2024-03".
const MONTH_KEY_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]");

/// Aggregate totals for a set of expenses.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    /// The sum of all amounts in the window; 0 when nothing matched.
    pub total_expenses: f64,
    /// Category display name mapped to the summed amount for that category.
    ///
    /// Categories with no matching expenses are absent, not zero.
    pub expenses_by_category: BTreeMap<String, f64>,
    /// Month key ("YYYY-MM") mapped to the summed amount for that month.
    ///
    /// Months with no matching expenses are absent; callers must not assume
    /// a contiguous month sequence.
    pub expenses_by_month: BTreeMap<String, f64>,
}

impl AnalyticsSummary {
    /// The summary of an empty expense set.
    pub fn empty() -> Self {
        Self {
            total_expenses: 0.0,
            expenses_by_category: BTreeMap::new(),
            expenses_by_month: BTreeMap::new(),
        }
    }
}

/// Reduce a set of expenses into their aggregate totals.
///
/// Each expense contributes its amount to the grand total, to the bucket of
/// its category's display name, and to the bucket of its calendar month.
pub fn summarize(expenses: &[Expense]) -> AnalyticsSummary {
    let mut summary = AnalyticsSummary::empty();

    for expense in expenses {
        summary.total_expenses += expense.amount;

        *summary
            .expenses_by_category
            .entry(expense.category.name.to_string())
            .or_insert(0.0) += expense.amount;

        *summary
            .expenses_by_month
            .entry(month_key(expense.date))
            .or_insert(0.0) += expense.amount;
    }

    summary
}

/// Truncate a date to its "YYYY-MM" grouping key.
fn month_key(date: Date) -> String {
    date.format(MONTH_KEY_FORMAT).unwrap()
}
