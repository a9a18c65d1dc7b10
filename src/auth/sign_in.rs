//! The sign-in endpoint.

use axum::{Json, extract::State};
use email_address::EmailAddress;
use serde::Deserialize;

use crate::{
    AppState, Error,
    auth::{AuthResponse, build_auth_response},
    user::get_user_by_email,
};

/// The credentials entered during sign-in.
#[derive(Debug, Deserialize)]
pub struct Credentials {
    /// Email entered during sign-in.
    pub email: EmailAddress,
    /// Password entered during sign-in.
    pub password: String,
}

/// Handler for sign-in requests.
///
/// An unknown email and a wrong password both produce the same
/// [Error::InvalidCredentials] response so that the two cases cannot be
/// told apart by the client.
///
/// # Errors
///
/// This function will return an error in a few situations.
/// - The email does not belong to a registered user.
/// - The password is not correct.
/// - An internal error occurred when verifying the password.
pub async fn sign_in(
    State(state): State<AppState>,
    Json(credentials): Json<Credentials>,
) -> Result<Json<AuthResponse>, Error> {
    let user = {
        let connection = state.connection()?;
        get_user_by_email(&credentials.email, &connection).map_err(|error| match error {
            Error::NotFound => Error::InvalidCredentials,
            error => error,
        })?
    };

    let password_is_correct = user
        .password_hash
        .verify(&credentials.password)
        .map_err(|error| Error::HashingError(error.to_string()))?;

    if !password_is_correct {
        return Err(Error::InvalidCredentials);
    }

    build_auth_response(&user, &state).map(Json)
}

#[cfg(test)]
mod sign_in_tests {
    use axum::http::StatusCode;
    use serde_json::{Value, json};

    use crate::{
        endpoints,
        test_utils::{get_test_server, sign_up_test_user},
    };

    #[tokio::test]
    async fn sign_in_succeeds_with_valid_credentials() {
        let server = get_test_server();
        sign_up_test_user(&server, "foo@bar.baz").await;

        let response = server
            .post(endpoints::SIGN_IN)
            .json(&json!({
                "email": "foo@bar.baz",
                "password": "asomewhatlongpassword1",
            }))
            .await;

        response.assert_status_ok();
        let body = response.json::<Value>();
        assert!(
            !body["accessToken"].as_str().unwrap_or_default().is_empty(),
            "expected a non-empty access token"
        );
        assert_eq!(body["user"]["email"], "foo@bar.baz");
    }

    #[tokio::test]
    async fn sign_in_fails_with_missing_body() {
        let server = get_test_server();

        let response = server
            .post(endpoints::SIGN_IN)
            .content_type("application/json")
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_are_indistinguishable() {
        let server = get_test_server();
        sign_up_test_user(&server, "foo@bar.baz").await;

        let wrong_password_response = server
            .post(endpoints::SIGN_IN)
            .json(&json!({
                "email": "foo@bar.baz",
                "password": "definitelyNotTheCorrectPassword",
            }))
            .await;

        let unknown_email_response = server
            .post(endpoints::SIGN_IN)
            .json(&json!({
                "email": "nobody@bar.baz",
                "password": "definitelyNotTheCorrectPassword",
            }))
            .await;

        wrong_password_response.assert_status(StatusCode::UNAUTHORIZED);
        unknown_email_response.assert_status(StatusCode::UNAUTHORIZED);
        assert_eq!(
            wrong_password_response.text(),
            unknown_email_response.text(),
            "both failure modes must produce an identical response body"
        );
    }
}
