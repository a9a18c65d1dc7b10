//! Category management for the expense-tracking application.
//!
//! This module contains everything related to categories:
//! - The `Category` model and validated `CategoryName` type
//! - Database functions for storing and querying categories
//! - The JSON endpoints for creating and listing categories

mod db;
mod domain;
mod endpoints;

pub use db::{create_category, create_category_table, get_all_categories, get_category};
pub use domain::{Category, CategoryData, CategoryId, CategoryName};
pub use endpoints::{create_category_endpoint, list_categories_endpoint};
