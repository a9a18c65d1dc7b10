//! Spendlog is a personal expense-tracking service.
//!
//! This library provides a JSON REST API where users register, record
//! expenses tagged with a category and payment method, and query aggregate
//! spending analytics over a date window. Data is stored in SQLite.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde_json::json;
use tokio::signal;

mod app_state;
mod auth;
mod category;
mod db;
pub mod endpoints;
mod expense;
mod logging;
mod password;
mod routing;
mod user;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use auth::Claims;
pub use category::{Category, CategoryId, CategoryName};
pub use db::initialize as initialize_db;
pub use expense::{AnalyticsSummary, Expense, ExpenseFilter, ExpenseId, PaymentMethod, summarize};
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use password::{PasswordHash, ValidatedPassword};
pub use routing::build_router;
pub use user::{User, UserId};

/// An async task that waits for either the ctrl+c or terminate signal,
/// whichever comes first, and then signals the server to shut down
/// gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The user provided an email and password combination that does not
    /// match a registered user.
    ///
    /// An unknown email and a wrong password both produce this variant so
    /// that the two cases cannot be told apart by the client.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The request is missing a bearer token, or the token failed
    /// verification (bad signature, malformed, or expired).
    #[error("missing or invalid access token")]
    InvalidToken,

    /// The token signing library failed to produce a token.
    ///
    /// The error string should only be logged for debugging on the server.
    #[error("could not create an access token: {0}")]
    TokenCreation(String),

    /// The user provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general error type indicating an internal server
    /// error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// The email address used to register already belongs to a user.
    #[error("the email address is already registered")]
    DuplicateEmail,

    /// The user already has a category with this name.
    #[error("the category \"{0}\" already exists")]
    DuplicateCategoryName(String),

    /// An empty string was used as a display name during registration.
    #[error("name must not be empty")]
    EmptyUserName,

    /// An empty string was used to create a category name.
    #[error("category name must not be empty")]
    EmptyCategoryName,

    /// An empty string was used as an expense name.
    #[error("expense name must not be empty")]
    EmptyExpenseName,

    /// An empty string was used as a payment method.
    #[error("payment method must not be empty")]
    EmptyPaymentMethod,

    /// The expense amount was NaN or infinite.
    #[error("amount must be a finite number")]
    NonFiniteAmount,

    /// The category ID attached to an expense did not resolve to a category
    /// owned by the acting user.
    ///
    /// A category owned by another user produces the same error as a
    /// category that does not exist, so the error reveals nothing about
    /// other tenants' data.
    #[error("the category ID {0} does not refer to one of your categories")]
    InvalidCategory(CategoryId),

    /// The requested record was not found.
    ///
    /// A record owned by another user is reported with this same error, so
    /// clients cannot probe for the existence of other users' records.
    #[error("the requested resource could not be found")]
    NotFound,

    /// Could not acquire the database lock.
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                    && desc.ends_with("user.email") =>
            {
                Error::DuplicateEmail
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl Error {
    /// The HTTP status code that the error is reported with.
    fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidCredentials | Error::InvalidToken => StatusCode::UNAUTHORIZED,
            Error::NotFound => StatusCode::NOT_FOUND,
            Error::DuplicateEmail | Error::DuplicateCategoryName(_) => StatusCode::CONFLICT,
            Error::TooWeak(_)
            | Error::EmptyUserName
            | Error::EmptyCategoryName
            | Error::EmptyExpenseName
            | Error::EmptyPaymentMethod
            | Error::NonFiniteAmount
            | Error::InvalidCategory(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Error::TokenCreation(_)
            | Error::HashingError(_)
            | Error::DatabaseLockError
            | Error::SqlError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Internal details are logged server-side and never shown to the
        // client.
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("An unexpected error occurred: {self}");
            "internal server error".to_owned()
        } else {
            self.to_string()
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
