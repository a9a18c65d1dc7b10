//! Authentication for the REST API.
//!
//! This module contains the sign-up and sign-in endpoints and the signed
//! bearer tokens they issue. Token verification happens in the [Claims]
//! extractor, which protected route handlers take as an argument.

mod sign_in;
mod sign_up;
mod token;

use serde::Serialize;

use crate::{
    AppState, Error,
    user::{User, UserProfile},
};

pub use sign_in::sign_in;
pub use sign_up::sign_up;
pub use token::{Claims, DEFAULT_TOKEN_DURATION, decode_token, encode_token};

/// The body returned after a successful sign-up or sign-in.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    /// A signed bearer token authenticating subsequent requests.
    pub access_token: String,
    /// The public profile of the authenticated user.
    pub user: UserProfile,
}

/// Issue an access token for `user` and assemble the auth response body.
pub(crate) fn build_auth_response(user: &User, state: &AppState) -> Result<AuthResponse, Error> {
    let access_token = encode_token(
        user.id,
        user.email.as_ref(),
        state.token_duration(),
        state.encoding_key(),
    )?;

    Ok(AuthResponse {
        access_token,
        user: UserProfile::from(user),
    })
}
