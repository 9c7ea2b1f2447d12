use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts, HeaderMap},
};
use tracing::warn;

use super::jwt::{JwtKeys, INVALID_CREDENTIALS};
use crate::{errors::AppError, state::AppState, users::repo_types::User};

/// Token from an `Authorization: Bearer <token>` header; the scheme is
/// matched case-insensitively.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// The user the bearer token resolves to.
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)
            .ok_or_else(|| AppError::unauthorized("Not authenticated"))?;

        let claims = JwtKeys::from_ref(state).decode_token(token)?;

        let user = state
            .users
            .find_by_email(&claims.sub)
            .await?
            .ok_or_else(|| {
                warn!(subject = %claims.sub, "token subject has no user");
                AppError::unauthorized(INVALID_CREDENTIALS)
            })?;

        Ok(CurrentUser(user))
    }
}
