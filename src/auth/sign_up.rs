//! The registration endpoint.

use axum::{Json, extract::State, http::StatusCode};
use email_address::EmailAddress;
use serde::Deserialize;

use crate::{
    AppState, Error,
    auth::{AuthResponse, build_auth_response},
    password::PasswordHash,
    user::create_user,
};

/// The JSON body accepted by the sign-up endpoint.
#[derive(Debug, Deserialize)]
pub struct SignUpData {
    /// The email address to register. Must not already be in use.
    pub email: EmailAddress,
    /// The display name shown in the client.
    pub name: String,
    /// The plain-text password. Checked for strength before hashing.
    pub password: String,
}

/// Handler for registration requests.
///
/// On success the new user is stored with a salted password hash and an
/// access token is returned alongside the user's public profile.
///
/// # Errors
///
/// This function will return a:
/// - [Error::EmptyUserName] if the display name is empty,
/// - [Error::TooWeak] if the password is too easy to guess,
/// - or [Error::DuplicateEmail] if the email address is already registered.
pub async fn sign_up(
    State(state): State<AppState>,
    Json(new_user): Json<SignUpData>,
) -> Result<(StatusCode, Json<AuthResponse>), Error> {
    if new_user.name.trim().is_empty() {
        return Err(Error::EmptyUserName);
    }

    let password_hash =
        PasswordHash::from_raw_password(&new_user.password, PasswordHash::DEFAULT_COST)?;

    let user = {
        let connection = state.connection()?;
        create_user(new_user.email, new_user.name.trim(), password_hash, &connection)?
    };

    let response = build_auth_response(&user, &state)?;

    Ok((StatusCode::CREATED, Json(response)))
}
