//! authenticated-caller extraction.
//!
//! authentication itself is an external collaborator: this extractor
//! only represents its boundary. it reads a bearer token that carries a
//! verified user id, which is where a real token verifier (jwt, session
//! lookup) plugs in. every bid and every room join requires a verified
//! identity, so handlers take [`AuthedUser`] as an argument.

use axum::{extract::FromRequestParts, http::header, http::request::Parts};

use gavel_types::UserId;

use super::error::ApiError;

/// the verified identity of the calling user.
#[derive(Debug, Clone, Copy)]
pub struct AuthedUser(pub UserId);

impl<S> FromRequestParts<S> for AuthedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError::unauthorized("Invalid authorization header"))?;

        let id: u64 = token
            .trim()
            .parse()
            .map_err(|_| ApiError::unauthorized("Invalid bearer token"))?;

        Ok(AuthedUser(UserId(id)))
    }
}
