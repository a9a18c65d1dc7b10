//! Endpoints operating on a single expense: get, replace, delete.
//!
//! All three run the same owner-scoped lookup, so an expense owned by
//! another user and a nonexistent expense produce the same 404 response.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    AppState, Error,
    auth::Claims,
    expense::{
        Expense, ExpenseData, ExpenseId,
        core::{delete_expense, get_expense, update_expense},
    },
};

/// Handler for fetching a single expense.
///
/// # Errors
/// Returns [Error::NotFound] if the expense does not exist or belongs to
/// another user.
pub async fn get_expense_endpoint(
    State(state): State<AppState>,
    claims: Claims,
    Path(expense_id): Path<ExpenseId>,
) -> Result<Json<Expense>, Error> {
    let connection = state.connection()?;
    let expense = get_expense(expense_id, claims.sub, &connection)?;

    Ok(Json(expense))
}

/// Handler for replacing an expense.
///
/// The full draft is required; partial updates are not supported.
///
/// # Errors
/// Returns [Error::NotFound] if the expense does not exist or belongs to
/// another user, or a draft validation error.
pub async fn update_expense_endpoint(
    State(state): State<AppState>,
    claims: Claims,
    Path(expense_id): Path<ExpenseId>,
    Json(draft): Json<ExpenseData>,
) -> Result<Json<Expense>, Error> {
    let connection = state.connection()?;
    let expense = update_expense(expense_id, draft, claims.sub, &connection)?;

    Ok(Json(expense))
}

/// Handler for deleting an expense.
///
/// Deletion is not idempotent: a second delete of the same ID responds with
/// 404.
///
/// # Errors
/// Returns [Error::NotFound] if the expense does not exist or belongs to
/// another user.
pub async fn delete_expense_endpoint(
    State(state): State<AppState>,
    claims: Claims,
    Path(expense_id): Path<ExpenseId>,
) -> Result<StatusCode, Error> {
    let connection = state.connection()?;
    delete_expense(expense_id, claims.sub, &connection)?;

    Ok(StatusCode::NO_CONTENT)
}
