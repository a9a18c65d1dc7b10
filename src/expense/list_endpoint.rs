//! The expense list endpoint.

use axum::{
    Json,
    extract::{Query, State},
};

use crate::{
    AppState, Error,
    auth::Claims,
    expense::{Expense, ExpenseFilter, query::list_expenses},
};

/// Handler for listing the authenticated user's expenses.
///
/// Query parameters map to [ExpenseFilter] fields and combine with AND
/// semantics. The result is ordered by date descending (ID ascending on
/// ties) and is an empty array when nothing matches.
pub async fn list_expenses_endpoint(
    State(state): State<AppState>,
    claims: Claims,
    Query(filter): Query<ExpenseFilter>,
) -> Result<Json<Vec<Expense>>, Error> {
    let connection = state.connection()?;
    let expenses = list_expenses(&filter, claims.sub, &connection)?;

    Ok(Json(expenses))
}
