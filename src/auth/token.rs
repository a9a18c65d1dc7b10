//! Signed bearer tokens and the extractor that authenticates requests.

use axum::{
    RequestPartsExt,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, TokenData, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::{AppState, Error, user::UserId};

/// The duration for which a freshly issued access token is valid.
pub const DEFAULT_TOKEN_DURATION: Duration = Duration::hours(24);

/// The contents of a signed access token.
///
/// Route handlers take a `Claims` argument to require authentication; the
/// extractor verifies the `Authorization: Bearer` header and rejects the
/// request with a 401 response if the token is missing, malformed, expired
/// or has a bad signature. The acting user is always identified by
/// [Claims::sub], never by anything in the request body.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// The ID of the authenticated user.
    pub sub: UserId,
    /// The email address the token was issued for.
    pub email: String,
    /// When the token was issued (Unix seconds).
    pub iat: i64,
    /// When the token expires (Unix seconds).
    pub exp: i64,
}

/// Create a signed access token binding the identity of `user_id`.
///
/// # Errors
/// Returns [Error::TokenCreation] if the signing library fails.
pub fn encode_token(
    user_id: UserId,
    email: &str,
    valid_for: Duration,
    encoding_key: &EncodingKey,
) -> Result<String, Error> {
    let now = OffsetDateTime::now_utc();
    let claims = Claims {
        sub: user_id,
        email: email.to_owned(),
        iat: now.unix_timestamp(),
        exp: (now + valid_for).unix_timestamp(),
    };

    encode(&Header::default(), &claims, encoding_key)
        .map_err(|error| Error::TokenCreation(error.to_string()))
}

/// Verify the signature and expiry of a bearer token and decode its claims.
///
/// # Errors
/// Returns [Error::InvalidToken] if the token is malformed, expired, or was
/// not signed with the matching key.
pub fn decode_token(token: &str, decoding_key: &DecodingKey) -> Result<TokenData<Claims>, Error> {
    decode(token, decoding_key, &Validation::default()).map_err(|_| Error::InvalidToken)
}

impl<S> FromRequestParts<S> for Claims
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|_| Error::InvalidToken)?;

        let state = AppState::from_ref(state);
        let token_data = decode_token(bearer.token(), state.decoding_key())?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod token_tests {
    use jsonwebtoken::{DecodingKey, EncodingKey};
    use time::Duration;

    use crate::{Error, user::UserId};

    use super::{decode_token, encode_token};

    fn get_test_keys() -> (EncodingKey, DecodingKey) {
        (
            EncodingKey::from_secret(b"nafstenoas"),
            DecodingKey::from_secret(b"nafstenoas"),
        )
    }

    #[test]
    fn decode_returns_encoded_claims() {
        let (encoding_key, decoding_key) = get_test_keys();
        let user_id = UserId::new(42);

        let token = encode_token(user_id, "foo@bar.baz", Duration::hours(1), &encoding_key)
            .expect("Could not encode token");
        let claims = decode_token(&token, &decoding_key)
            .expect("Could not decode token")
            .claims;

        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.email, "foo@bar.baz");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn decode_fails_with_wrong_key() {
        let (encoding_key, _) = get_test_keys();
        let other_decoding_key = DecodingKey::from_secret(b"adifferentsecret");

        let token = encode_token(
            UserId::new(1),
            "foo@bar.baz",
            Duration::hours(1),
            &encoding_key,
        )
        .expect("Could not encode token");

        let result = decode_token(&token, &other_decoding_key);

        assert_eq!(result.err(), Some(Error::InvalidToken));
    }

    #[test]
    fn decode_fails_with_expired_token() {
        let (encoding_key, decoding_key) = get_test_keys();

        // Expired an hour ago, well past the default validation leeway.
        let token = encode_token(
            UserId::new(1),
            "foo@bar.baz",
            Duration::hours(-1),
            &encoding_key,
        )
        .expect("Could not encode token");

        let result = decode_token(&token, &decoding_key);

        assert_eq!(result.err(), Some(Error::InvalidToken));
    }

    #[test]
    fn decode_fails_with_garbage_token() {
        let (_, decoding_key) = get_test_keys();

        let result = decode_token("not.a.token", &decoding_key);

        assert_eq!(result.err(), Some(Error::InvalidToken));
    }
}
