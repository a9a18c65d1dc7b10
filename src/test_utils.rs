//! Shared helpers for tests.

use axum::http::StatusCode;
use axum_test::TestServer;
use rusqlite::Connection;
use serde_json::{Value, json};

use crate::{
    AppState, PasswordHash, build_router, endpoints,
    user::{User, create_user},
};

/// The signing secret used by test servers.
pub const TEST_SECRET: &str = "nafstenoas";

/// A password that passes strength validation.
pub const TEST_PASSWORD: &str = "asomewhatlongpassword1";

/// Create an [AppState] backed by an in-memory database.
pub fn get_test_state() -> AppState {
    let connection =
        Connection::open_in_memory().expect("Could not open in-memory SQLite database");

    AppState::new(connection, TEST_SECRET).expect("Could not create app state")
}

/// Create a [TestServer] running the full application router against an
/// in-memory database.
pub fn get_test_server() -> TestServer {
    TestServer::new(build_router(get_test_state()))
}

/// Insert a user directly into the database, bypassing the HTTP layer.
///
/// The password hash is unchecked; use [TEST_PASSWORD] with the HTTP
/// helpers when the password needs to verify.
pub fn insert_test_user(connection: &Connection, email: &str) -> User {
    create_user(
        email.parse().expect("Could not parse test email"),
        "Test User",
        PasswordHash::new_unchecked("hunter2"),
        connection,
    )
    .expect("Could not insert test user")
}

/// Register a user over HTTP and return their access token.
pub async fn sign_up_test_user(server: &TestServer, email: &str) -> String {
    let response = server
        .post(endpoints::SIGN_UP)
        .json(&json!({
            "email": email,
            "name": "Test User",
            "password": TEST_PASSWORD,
        }))
        .await;

    response.assert_status(StatusCode::CREATED);

    response.json::<Value>()["accessToken"]
        .as_str()
        .expect("Sign-up response did not contain an access token")
        .to_string()
}

/// Create a category over HTTP and return its ID.
pub async fn create_test_category(server: &TestServer, token: &str, name: &str) -> i64 {
    let response = server
        .post(endpoints::CATEGORIES)
        .authorization_bearer(token)
        .json(&json!({ "name": name }))
        .await;

    response.assert_status(StatusCode::CREATED);

    response.json::<Value>()["id"]
        .as_i64()
        .expect("Category response did not contain an ID")
}

/// Create an expense over HTTP and return the response body.
pub async fn create_test_expense(
    server: &TestServer,
    token: &str,
    name: &str,
    amount: f64,
    date: &str,
    category_id: i64,
    payment_method: &str,
) -> Value {
    let response = server
        .post(endpoints::EXPENSES)
        .authorization_bearer(token)
        .json(&json!({
            "name": name,
            "amount": amount,
            "date": date,
            "categoryId": category_id,
            "paymentMethod": payment_method,
        }))
        .await;

    response.assert_status(StatusCode::CREATED);

    response.json::<Value>()
}
