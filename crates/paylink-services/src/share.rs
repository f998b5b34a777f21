//! Share link and QR code URL construction.

use uuid::Uuid;

const QR_CODE_ENDPOINT: &str = "https://api.qrserver.com/v1/create-qr-code/";
const QR_CODE_SIZE: &str = "200x200";

/// Builds the public URLs a creator hands out for a content item
#[derive(Debug, Clone)]
pub struct ShareLinks {
    public_base_url: String,
}

impl ShareLinks {
    pub fn new(public_base_url: impl Into<String>) -> Self {
        let public_base_url = public_base_url.into().trim_end_matches('/').to_string();
        Self { public_base_url }
    }

    /// `{public_base_url}/pay/{id}`
    pub fn pay_link(&self, content_id: Uuid) -> String {
        format!("{}/pay/{}", self.public_base_url, content_id)
    }

    /// Image URL of a QR code encoding the pay link
    pub fn qr_code_url(&self, content_id: Uuid) -> String {
        format!(
            "{}?size={}&data={}",
            QR_CODE_ENDPOINT,
            QR_CODE_SIZE,
            urlencoding::encode(&self.pay_link(content_id))
        )
    }
}
