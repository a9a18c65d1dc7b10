//! Expense management for the expense-tracking application.
//!
//! This module contains everything related to expenses:
//! - The `Expense` model, draft validation, and owner-scoped CRUD queries
//! - The typed filter predicates behind the list endpoint
//! - The pure analytics reduction and its endpoint

mod analytics;
mod analytics_endpoint;
mod core;
mod create_endpoint;
mod item_endpoints;
mod list_endpoint;
mod query;

pub use analytics::{AnalyticsSummary, summarize};
pub use analytics_endpoint::expense_analytics_endpoint;
pub use core::{Expense, ExpenseData, ExpenseId, PaymentMethod, create_expense_table};
pub use create_endpoint::create_expense_endpoint;
pub use item_endpoints::{
    delete_expense_endpoint, get_expense_endpoint, update_expense_endpoint,
};
pub use list_endpoint::list_expenses_endpoint;
pub use query::{ExpenseFilter, list_expenses};
