//! Owner identity for dashboard and content-management routes.
//!
//! Authentication itself happens upstream; the gateway forwards the signed-in
//! owner as the `X-Owner-Id` header. Pay routes never read it.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use paylink_core::AppError;

use crate::error::HttpAppError;

pub const OWNER_HEADER: &str = "x-owner-id";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerContext {
    pub owner_id: String,
}

impl<S> FromRequestParts<S> for OwnerContext
where
    S: Send + Sync,
{
    type Rejection = HttpAppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let owner_id = parts
            .headers
            .get(OWNER_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| AppError::Unauthorized("Sign in to manage your content".to_string()))?;

        Ok(OwnerContext {
            owner_id: owner_id.to_string(),
        })
    }
}
