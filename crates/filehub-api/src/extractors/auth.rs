//! Bearer-token authentication for owner routes.
//!
//! Token issuance lives outside this service; only the signature, expiry,
//! and subject of an incoming token are checked here.

use std::ops::Deref;

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use filehub_core::error::AppError;
use filehub_service::context::RequestContext;

use crate::error::ApiError;
use crate::state::AppState;

/// The caller of an owner route.
#[derive(Debug, Clone)]
pub struct AuthUser(pub RequestContext);

impl Deref for AuthUser {
    type Target = RequestContext;

    fn deref(&self) -> &RequestContext {
        &self.0
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
        let token = bearer_token(parts)?;
        let claims = state.jwt_decoder.decode(token)?;
        let ctx = RequestContext::new(claims.user_id(), claims.role);

        tracing::debug!(user_id = %ctx.user_id, role = %ctx.role, "Request authenticated");
        Ok(Self(ctx))
    }
}

/// The credential of an `Authorization: Bearer <token>` header.
fn bearer_token(parts: &Parts) -> Result<&str, AppError> {
    let value = parts
        .headers
        .get(AUTHORIZATION)
        .ok_or_else(|| AppError::unauthorized("Missing Authorization header"))?
        .to_str()
        .map_err(|_| AppError::unauthorized("Authorization header is not valid text"))?;

    match value.split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty() => {
            Ok(token.trim())
        }
        _ => Err(AppError::unauthorized("Expected a Bearer token")),
    }
}
