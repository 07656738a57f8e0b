use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use crate::auth::token::verify_token;
use crate::db::models::User;
use crate::error::AppError;
use crate::state::AppState;

/// The user behind a verified `Authorization: Bearer` token.
///
/// Extracting it rejects the request with 401 when the header is missing,
/// the token fails verification, or the user no longer exists.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user: User,
}

/// Pull the token out of an `Authorization` header value.
pub fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Auth("Missing bearer token".into()))?;

        let token =
            bearer_token(header).ok_or_else(|| AppError::Auth("Malformed bearer token".into()))?;

        let user_id = verify_token(token, &state.config.jwt_secret)?;

        let user = state
            .user_repo
            .find_by_id(&user_id)
            .await?
            .ok_or_else(|| AppError::Auth("User no longer exists".into()))?;

        tracing::debug!(user = %user.username, "Authenticated request");
        Ok(Self { user })
    }
}
