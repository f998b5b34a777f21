//! Public pay page. No owner identity is required here.

use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use paylink_core::models::{LockedContent, PurchaseRequest, UnlockedContent};
use std::sync::Arc;
use uuid::Uuid;

#[utoipa::path(
    get,
    path = "/api/v1/pay/{id}",
    tag = "pay",
    params(
        ("id" = Uuid, Path, description = "Content ID from the share link")
    ),
    responses(
        (status = 200, description = "Locked preview; counts as a view", body = LockedContent),
        (status = 404, description = "Content not found or not for sale", body = ErrorResponse)
    )
)]
pub async fn view_content(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let preview = state.checkout.view(id).await?;
    Ok(Json(preview))
}

#[utoipa::path(
    post,
    path = "/api/v1/pay/{id}",
    tag = "pay",
    request_body = PurchaseRequest,
    params(
        ("id" = Uuid, Path, description = "Content ID from the share link")
    ),
    responses(
        (status = 200, description = "Payment recorded and files unlocked", body = UnlockedContent),
        (status = 400, description = "Missing email or stale price", body = ErrorResponse),
        (status = 402, description = "Payment failed", body = ErrorResponse),
        (status = 404, description = "Content not found or not for sale", body = ErrorResponse)
    )
)]
pub async fn purchase_content(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<PurchaseRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let unlocked = state
        .checkout
        .purchase(id, &request.buyer_email, request.amount)
        .await?;
    Ok(Json(unlocked))
}
