//! Filtered expense queries.
//!
//! Filters arrive as optional query parameters, are compiled into an
//! explicit list of typed predicates by a pure function, and only then
//! rendered to SQL. Every predicate must match for a row to be returned
//! (AND semantics), and every query is scoped to the owning user.

use rusqlite::{Connection, params_from_iter, types::Value};
use serde::Deserialize;
use time::Date;

use crate::{
    Error,
    category::CategoryId,
    expense::{
        Expense,
        core::{EXPENSE_COLUMNS, map_expense_row},
    },
    user::UserId,
};

/// The optional filters accepted by the expense list endpoint.
///
/// All present fields must match. Date bounds are inclusive on both ends.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseFilter {
    /// Earliest date to include.
    pub start_date: Option<Date>,
    /// Latest date to include.
    pub end_date: Option<Date>,
    /// Only include expenses in this category.
    pub category_id: Option<CategoryId>,
    /// Only include expenses paid with this method (exact match).
    pub payment_method: Option<String>,
    /// Only include expenses whose name or description contains this token
    /// (case-insensitive).
    pub search: Option<String>,
}

/// A single compiled filter predicate.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Predicate {
    /// The expense date is on or after the given date.
    DateOnOrAfter(Date),
    /// The expense date is on or before the given date.
    DateOnOrBefore(Date),
    /// The expense references the given category.
    CategoryIs(CategoryId),
    /// The payment method equals the given string.
    PaymentMethodIs(String),
    /// The token occurs (case-insensitively) in the name or description.
    SearchContains(String),
}

/// Compile a filter into its list of predicates.
///
/// Absent fields and blank strings compile to no predicate, so an empty
/// filter matches everything.
pub(crate) fn build_query_spec(filter: &ExpenseFilter) -> Vec<Predicate> {
    let mut spec = Vec::new();

    if let Some(start_date) = filter.start_date {
        spec.push(Predicate::DateOnOrAfter(start_date));
    }

    if let Some(end_date) = filter.end_date {
        spec.push(Predicate::DateOnOrBefore(end_date));
    }

    if let Some(category_id) = filter.category_id {
        spec.push(Predicate::CategoryIs(category_id));
    }

    if let Some(payment_method) = &filter.payment_method {
        let payment_method = payment_method.trim();
        if !payment_method.is_empty() {
            spec.push(Predicate::PaymentMethodIs(payment_method.to_owned()));
        }
    }

    if let Some(search) = &filter.search {
        let search = search.trim();
        if !search.is_empty() {
            spec.push(Predicate::SearchContains(search.to_owned()));
        }
    }

    spec
}

impl Predicate {
    /// Render the predicate as a SQL fragment and its bound parameters.
    fn to_sql(&self) -> (&'static str, Vec<Value>) {
        match self {
            Predicate::DateOnOrAfter(date) => {
                ("expense.date >= ?", vec![Value::Text(date.to_string())])
            }
            Predicate::DateOnOrBefore(date) => {
                ("expense.date <= ?", vec![Value::Text(date.to_string())])
            }
            Predicate::CategoryIs(category_id) => {
                ("expense.category_id = ?", vec![Value::Integer(*category_id)])
            }
            Predicate::PaymentMethodIs(payment_method) => (
                "expense.payment_method = ?",
                vec![Value::Text(payment_method.clone())],
            ),
            Predicate::SearchContains(token) => (
                "(instr(lower(expense.name), lower(?)) > 0 \
                 OR instr(lower(coalesce(expense.description, '')), lower(?)) > 0)",
                vec![Value::Text(token.clone()), Value::Text(token.clone())],
            ),
        }
    }
}

/// Get the expenses owned by `user_id` that match every predicate compiled
/// from `filter`, ordered by date descending.
///
/// Ties on the date are broken by ID ascending to keep the order stable
/// after updates. An empty result is returned as an empty vector, never an
/// error.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails or a row cannot be mapped.
pub fn list_expenses(
    filter: &ExpenseFilter,
    user_id: UserId,
    connection: &Connection,
) -> Result<Vec<Expense>, Error> {
    let spec = build_query_spec(filter);

    let mut clauses = vec!["expense.user_id = ?"];
    let mut parameters = vec![Value::Integer(user_id.as_i64())];
    for predicate in &spec {
        let (clause, mut values) = predicate.to_sql();
        clauses.push(clause);
        parameters.append(&mut values);
    }

    let query = format!(
        "SELECT {EXPENSE_COLUMNS} FROM expense
         INNER JOIN category ON expense.category_id = category.id
         WHERE {}
         ORDER BY expense.date DESC, expense.id ASC",
        clauses.join(" AND ")
    );

    connection
        .prepare(&query)?
        .query_map(params_from_iter(parameters), map_expense_row)?
        .map(|maybe_expense| maybe_expense.map_err(Error::SqlError))
        .collect()
}
