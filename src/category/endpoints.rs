//! Category creation and listing endpoints.

use axum::{Json, extract::State, http::StatusCode};

use crate::{
    AppState, Error,
    auth::Claims,
    category::{Category, CategoryData, CategoryName, create_category, get_all_categories},
};

/// Handler for creating a category.
///
/// The category is owned by the authenticated user.
///
/// # Errors
/// This function will return a:
/// - [Error::EmptyCategoryName] if the name is empty,
/// - or [Error::DuplicateCategoryName] if the user already has a category
///   with this name.
pub async fn create_category_endpoint(
    State(state): State<AppState>,
    claims: Claims,
    Json(new_category): Json<CategoryData>,
) -> Result<(StatusCode, Json<Category>), Error> {
    let name = CategoryName::new(&new_category.name)?;

    let connection = state.connection()?;
    let category = create_category(name, claims.sub, &connection)?;

    Ok((StatusCode::CREATED, Json(category)))
}

/// Handler for listing the authenticated user's categories.
pub async fn list_categories_endpoint(
    State(state): State<AppState>,
    claims: Claims,
) -> Result<Json<Vec<Category>>, Error> {
    let connection = state.connection()?;
    let categories = get_all_categories(claims.sub, &connection)?;

    Ok(Json(categories))
}
