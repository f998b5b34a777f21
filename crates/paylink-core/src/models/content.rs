use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Currencies a price can be quoted in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Usd,
    Eur,
    Gbp,
    Cad,
    Aud,
}

impl Currency {
    pub const ALL: [Currency; 5] = [
        Currency::Usd,
        Currency::Eur,
        Currency::Gbp,
        Currency::Cad,
        Currency::Aud,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Gbp => "GBP",
            Currency::Cad => "CAD",
            Currency::Aud => "AUD",
        }
    }
}

impl FromStr for Currency {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_uppercase();
        Currency::ALL
            .into_iter()
            .find(|c| c.code() == code)
            .ok_or_else(|| anyhow::anyhow!("Unsupported currency: {}", s))
    }
}

impl Display for Currency {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.code())
    }
}

/// Publication status of a content item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ContentStatus {
    Active,
    Draft,
}

impl ContentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentStatus::Active => "active",
            ContentStatus::Draft => "draft",
        }
    }
}

impl FromStr for ContentStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(ContentStatus::Active),
            "draft" => Ok(ContentStatus::Draft),
            _ => Err(anyhow::anyhow!("Invalid content status: {}", s)),
        }
    }
}

/// What kind of content a link sells, inferred from the uploaded files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Image,
    Video,
    Text,
    Files,
}

impl ContentKind {
    /// A batch made only of images is `Image`, only of videos is `Video`,
    /// only of `text/*` files is `Text`; anything else is `Files`.
    pub fn infer<'a>(content_types: impl IntoIterator<Item = &'a str>) -> ContentKind {
        let mut kind: Option<ContentKind> = None;
        for content_type in content_types {
            let ct = content_type.to_lowercase();
            let this = if ct.starts_with("image/") {
                ContentKind::Image
            } else if ct.starts_with("video/") {
                ContentKind::Video
            } else if ct.starts_with("text/") {
                ContentKind::Text
            } else {
                return ContentKind::Files;
            };
            match kind {
                None => kind = Some(this),
                Some(k) if k == this => {}
                Some(_) => return ContentKind::Files,
            }
        }
        kind.unwrap_or(ContentKind::Files)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Image => "image",
            ContentKind::Video => "video",
            ContentKind::Text => "text",
            ContentKind::Files => "files",
        }
    }
}

impl FromStr for ContentKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "image" => Ok(ContentKind::Image),
            "video" => Ok(ContentKind::Video),
            "text" => Ok(ContentKind::Text),
            "files" => Ok(ContentKind::Files),
            _ => Err(anyhow::anyhow!("Invalid content kind: {}", s)),
        }
    }
}

/// A file that has already been written to the object store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ContentFile {
    pub name: String,
    pub url: String,
    pub size_bytes: i64,
    pub content_type: String,
    pub storage_key: String,
}

/// A monetizable content record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ContentItem {
    pub id: Uuid,
    pub owner_id: String,
    pub title: String,
    pub description: String,
    pub kind: ContentKind,
    pub files: Vec<ContentFile>,
    pub price: Decimal,
    pub currency: Currency,
    pub views: i64,
    pub earnings: Decimal,
    pub status: ContentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input to `ContentLedger::create`
#[derive(Debug, Clone)]
pub struct NewContent {
    pub title: String,
    pub description: String,
    pub kind: ContentKind,
    pub files: Vec<ContentFile>,
    pub price: Decimal,
    pub currency: Currency,
}

/// Owner edits; `None` leaves a field unchanged
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub status: Option<ContentStatus>,
}

impl ContentPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.status.is_none()
    }
}

/// Filter for listing content records, newest first
#[derive(Debug, Clone, Default)]
pub struct ContentQuery {
    pub owner_id: Option<String>,
    pub status: Option<ContentStatus>,
    pub limit: Option<i64>,
}

/// Request DTO for editing a content item
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct UpdateContentRequest {
    #[serde(default)]
    #[validate(length(
        min = 1,
        max = 200,
        message = "Title must be between 1 and 200 characters"
    ))]
    pub title: Option<String>,
    #[serde(default)]
    #[validate(length(max = 5000, message = "Description must be at most 5000 characters"))]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub status: Option<ContentStatus>,
}

impl From<UpdateContentRequest> for ContentPatch {
    fn from(req: UpdateContentRequest) -> Self {
        ContentPatch {
            title: req.title,
            description: req.description,
            price: req.price,
            status: req.status,
        }
    }
}

/// Owner-facing view of a content item
#[derive(Debug, Serialize, ToSchema)]
pub struct ContentResponse {
    #[serde(flatten)]
    pub content: ContentItem,
    pub share_link: String,
}

/// Result of publishing an upload
#[derive(Debug, Serialize, ToSchema)]
pub struct PublishedContent {
    pub content: ContentItem,
    pub share_link: String,
    pub qr_code_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_codes_round_trip() {
        for currency in Currency::ALL {
            assert_eq!(currency.code().parse::<Currency>().unwrap(), currency);
        }
        assert_eq!("usd".parse::<Currency>().unwrap(), Currency::Usd);
        assert!("JPY".parse::<Currency>().is_err());
    }

    #[test]
    fn currency_serializes_as_code() {
        assert_eq!(serde_json::to_string(&Currency::Gbp).unwrap(), "\"GBP\"");
    }

    #[test]
    fn kind_inference() {
        assert_eq!(
            ContentKind::infer(["image/png", "image/jpeg"]),
            ContentKind::Image
        );
        assert_eq!(ContentKind::infer(["video/mp4"]), ContentKind::Video);
        assert_eq!(ContentKind::infer(["text/plain"]), ContentKind::Text);
        assert_eq!(
            ContentKind::infer(["image/png", "video/mp4"]),
            ContentKind::Files
        );
        assert_eq!(ContentKind::infer(["application/pdf"]), ContentKind::Files);
        assert_eq!(ContentKind::infer(std::iter::empty()), ContentKind::Files);
    }

    #[test]
    fn empty_patch() {
        assert!(ContentPatch::default().is_empty());
        let patch = ContentPatch {
            status: Some(ContentStatus::Draft),
            ..Default::default()
        };
        assert!(!patch.is_empty());
    }
}
