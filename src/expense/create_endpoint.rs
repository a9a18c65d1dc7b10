//! The expense creation endpoint.

use axum::{Json, extract::State, http::StatusCode};

use crate::{
    AppState, Error,
    auth::Claims,
    expense::{Expense, ExpenseData, core::create_expense},
};

/// Handler for creating an expense.
///
/// The expense is owned by the authenticated user; the owner is taken from
/// the verified token, never from the body. The created record is returned
/// with its category embedded.
///
/// # Errors
/// Returns a 422 response for an empty name, a non-finite amount, an empty
/// payment method, or a category that is not one of the user's own.
pub async fn create_expense_endpoint(
    State(state): State<AppState>,
    claims: Claims,
    Json(draft): Json<ExpenseData>,
) -> Result<(StatusCode, Json<Expense>), Error> {
    let connection = state.connection()?;
    let expense = create_expense(draft, claims.sub, &connection)?;

    Ok((StatusCode::CREATED, Json(expense)))
}
