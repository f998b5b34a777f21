use crate::auth::OwnerContext;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use paylink_core::models::DashboardStats;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Deserialize, utoipa::IntoParams)]
pub struct DashboardQuery {
    /// How many recent items to include; defaults to the configured value
    pub limit: Option<i64>,
}

#[utoipa::path(
    get,
    path = "/api/v1/dashboard",
    tag = "dashboard",
    params(
        DashboardQuery,
        ("X-Owner-Id" = String, Header, description = "Signed-in owner")
    ),
    responses(
        (status = 200, description = "Aggregate stats and recent content", body = DashboardStats),
        (status = 401, description = "Owner missing", body = ErrorResponse)
    )
)]
pub async fn get_dashboard(
    State(state): State<Arc<AppState>>,
    owner: OwnerContext,
    Query(query): Query<DashboardQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let limit = query
        .limit
        .unwrap_or_else(|| state.config.dashboard_recent_limit())
        .clamp(1, 100);

    let stats = state.ledger.dashboard(&owner.owner_id, limit).await?;
    Ok(Json(stats))
}
