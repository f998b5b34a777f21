//! Owner-side content management: upload, list, inspect, edit.

use crate::auth::OwnerContext;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;
use crate::utils::upload::extract_upload_request;
use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use paylink_core::models::{
    ContentItem, ContentResponse, EarningsAudit, Payment, PublishedContent, UpdateContentRequest,
};
use paylink_core::AppError;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

fn to_response(state: &AppState, content: ContentItem) -> ContentResponse {
    ContentResponse {
        share_link: state.links.pay_link(content.id),
        content,
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/content",
    tag = "content",
    request_body(
        content_type = "multipart/form-data",
        description = "One or more `file` fields plus title, description, price, currency and optional text_content"
    ),
    params(
        ("X-Owner-Id" = String, Header, description = "Signed-in owner")
    ),
    responses(
        (status = 201, description = "Content published", body = PublishedContent),
        (status = 400, description = "Invalid upload", body = ErrorResponse),
        (status = 401, description = "Owner missing", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 502, description = "Storage unavailable", body = ErrorResponse)
    )
)]
pub async fn upload_content(
    State(state): State<Arc<AppState>>,
    owner: OwnerContext,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let request = extract_upload_request(multipart).await?;
    let published = state.uploads.publish(&owner.owner_id, request).await?;
    Ok((StatusCode::CREATED, Json(published)))
}

#[derive(Deserialize, ToSchema, utoipa::IntoParams)]
pub struct ListContentQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    50
}

#[utoipa::path(
    get,
    path = "/api/v1/content",
    tag = "content",
    params(
        ListContentQuery,
        ("X-Owner-Id" = String, Header, description = "Signed-in owner")
    ),
    responses(
        (status = 200, description = "Owner's content, newest first", body = Vec<ContentResponse>),
        (status = 401, description = "Owner missing", body = ErrorResponse)
    )
)]
pub async fn list_content(
    State(state): State<Arc<AppState>>,
    owner: OwnerContext,
    Query(query): Query<ListContentQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let limit = query.limit.clamp(1, 100);

    let items = state
        .ledger
        .list_for_owner(&owner.owner_id, Some(limit))
        .await?;

    let responses: Vec<ContentResponse> =
        items.into_iter().map(|c| to_response(&state, c)).collect();
    Ok(Json(responses))
}

#[utoipa::path(
    get,
    path = "/api/v1/content/{id}",
    tag = "content",
    params(
        ("id" = Uuid, Path, description = "Content ID"),
        ("X-Owner-Id" = String, Header, description = "Signed-in owner")
    ),
    responses(
        (status = 200, description = "Content found", body = ContentResponse),
        (status = 404, description = "Content not found", body = ErrorResponse)
    )
)]
pub async fn get_content(
    State(state): State<Arc<AppState>>,
    owner: OwnerContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let content = state.ledger.get_for_owner(&owner.owner_id, id).await?;
    Ok(Json(to_response(&state, content)))
}

#[utoipa::path(
    patch,
    path = "/api/v1/content/{id}",
    tag = "content",
    request_body = UpdateContentRequest,
    params(
        ("id" = Uuid, Path, description = "Content ID"),
        ("X-Owner-Id" = String, Header, description = "Signed-in owner")
    ),
    responses(
        (status = 200, description = "Content updated", body = ContentResponse),
        (status = 400, description = "Invalid change", body = ErrorResponse),
        (status = 404, description = "Content not found", body = ErrorResponse)
    )
)]
pub async fn update_content(
    State(state): State<Arc<AppState>>,
    owner: OwnerContext,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<UpdateContentRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    request.validate().map_err(AppError::from)?;

    let updated = state
        .ledger
        .update_details(&owner.owner_id, id, request.into())
        .await?;

    Ok(Json(to_response(&state, updated)))
}

#[utoipa::path(
    get,
    path = "/api/v1/content/{id}/payments",
    tag = "content",
    params(
        ("id" = Uuid, Path, description = "Content ID"),
        ("X-Owner-Id" = String, Header, description = "Signed-in owner")
    ),
    responses(
        (status = 200, description = "Payments, newest first", body = Vec<Payment>),
        (status = 404, description = "Content not found", body = ErrorResponse)
    )
)]
pub async fn list_payments(
    State(state): State<Arc<AppState>>,
    owner: OwnerContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let payments = state.ledger.payments_for(&owner.owner_id, id).await?;
    Ok(Json(payments))
}

#[utoipa::path(
    get,
    path = "/api/v1/content/{id}/audit",
    tag = "content",
    params(
        ("id" = Uuid, Path, description = "Content ID"),
        ("X-Owner-Id" = String, Header, description = "Signed-in owner")
    ),
    responses(
        (status = 200, description = "Recorded earnings against the payment sum", body = EarningsAudit),
        (status = 404, description = "Content not found", body = ErrorResponse)
    )
)]
pub async fn audit_earnings(
    State(state): State<Arc<AppState>>,
    owner: OwnerContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    state.ledger.get_for_owner(&owner.owner_id, id).await?;
    let audit = state.ledger.audit_earnings(id).await?;
    Ok(Json(audit))
}
