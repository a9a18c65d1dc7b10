//! The spending-analytics endpoint.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use time::Date;

use crate::{
    AppState, Error,
    auth::Claims,
    expense::{AnalyticsSummary, ExpenseFilter, query::list_expenses, summarize},
};

/// Query parameters for the analytics endpoint. Both bounds are required
/// and inclusive.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsParams {
    /// Earliest date to include.
    pub start_date: Date,
    /// Latest date to include.
    pub end_date: Date,
}

/// Handler for the spending summary over a date window.
///
/// A window whose start is after its end yields the zero summary rather
/// than an error.
pub async fn expense_analytics_endpoint(
    State(state): State<AppState>,
    claims: Claims,
    Query(params): Query<AnalyticsParams>,
) -> Result<Json<AnalyticsSummary>, Error> {
    let filter = ExpenseFilter {
        start_date: Some(params.start_date),
        end_date: Some(params.end_date),
        ..ExpenseFilter::default()
    };

    let expenses = {
        let connection = state.connection()?;
        list_expenses(&filter, claims.sub, &connection)?
    };

    Ok(Json(summarize(&expenses)))
}
