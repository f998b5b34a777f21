//! OpenAPI documentation, served at `/api/openapi.json` and rendered at `/docs`.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use paylink_core::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Paylink API",
        version = "0.1.0",
        description = "Upload content, set a price, share a pay link, and unlock the files once the buyer pays. Owner endpoints read the signed-in owner from the X-Owner-Id header."
    ),
    paths(
        // Owner content
        handlers::content::upload_content,
        handlers::content::list_content,
        handlers::content::get_content,
        handlers::content::update_content,
        handlers::content::list_payments,
        handlers::content::audit_earnings,
        // Dashboard
        handlers::dashboard::get_dashboard,
        // Pay page
        handlers::pay::view_content,
        handlers::pay::purchase_content,
        // Health
        handlers::health::health_check,
    ),
    components(
        schemas(
            models::ContentItem,
            models::ContentFile,
            models::ContentStatus,
            models::ContentKind,
            models::Currency,
            models::AccessState,
            models::PaymentStatus,
            error::ErrorResponse,
        )
    ),
    tags(
        (name = "content", description = "Upload, list and edit priced content"),
        (name = "dashboard", description = "Owner earnings, views and conversion"),
        (name = "pay", description = "Public pay page: locked preview and purchase"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;
