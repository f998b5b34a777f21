//! Upload publishing
//!
//! validate → upload every file concurrently → create the content record →
//! return the share link. The record is only written once every blob is stored.

use std::sync::Arc;

use bytes::Bytes;
use futures::future::join_all;
use paylink_core::models::{ContentFile, ContentKind, NewContent, PublishedContent};
use paylink_core::validation::{parse_currency, parse_price};
use paylink_core::AppError;
use paylink_storage::{generate_content_key, Storage, StoredObject};

use crate::ledger::ContentLedger;
use crate::share::ShareLinks;

/// Name given to the file synthesized from pasted text
pub const TEXT_CONTENT_FILE_NAME: &str = "content.txt";

/// A file received from the uploader, not yet stored
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub name: String,
    pub content_type: String,
    pub data: Bytes,
}

/// Raw upload form. Price and currency are kept as typed so they can be
/// validated here.
#[derive(Debug, Clone, Default)]
pub struct UploadRequest {
    pub title: String,
    pub description: String,
    pub price: String,
    pub currency: String,
    pub files: Vec<UploadFile>,
    pub text_content: Option<String>,
}

#[derive(Debug, Clone, Copy)]
pub struct UploadLimits {
    pub max_file_size_bytes: usize,
    pub max_files: usize,
}

#[derive(Clone)]
pub struct UploadService {
    storage: Arc<dyn Storage>,
    ledger: Arc<ContentLedger>,
    links: ShareLinks,
    limits: UploadLimits,
}

impl UploadService {
    pub fn new(
        storage: Arc<dyn Storage>,
        ledger: Arc<ContentLedger>,
        links: ShareLinks,
        limits: UploadLimits,
    ) -> Self {
        Self {
            storage,
            ledger,
            links,
            limits,
        }
    }

    #[tracing::instrument(skip(self, request), fields(file_count = request.files.len()))]
    pub async fn publish(
        &self,
        owner_id: &str,
        request: UploadRequest,
    ) -> Result<PublishedContent, AppError> {
        if owner_id.trim().is_empty() {
            return Err(AppError::Unauthorized("Owner is required".to_string()));
        }

        let price = parse_price(&request.price)?;
        let currency = parse_currency(&request.currency)?;

        let mut files = request.files;
        if let Some(text) = request.text_content.filter(|t| !t.trim().is_empty()) {
            files.push(UploadFile {
                name: TEXT_CONTENT_FILE_NAME.to_string(),
                content_type: "text/plain".to_string(),
                data: Bytes::from(text),
            });
        }
        self.validate_files(&files)?;

        let kind = ContentKind::infer(files.iter().map(|f| f.content_type.as_str()));

        let start = std::time::Instant::now();
        let stored = self.store_all(files).await?;

        tracing::info!(
            file_count = stored.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "All files stored"
        );

        let new_content = NewContent {
            title: request.title,
            description: request.description.trim().to_string(),
            kind,
            files: stored.clone(),
            price,
            currency,
        };

        let content = match self.ledger.create(owner_id, new_content).await {
            Ok(content) => content,
            Err(e) => {
                tracing::error!(error = %e, "Failed to create content record after upload");
                let keys: Vec<String> = stored.into_iter().map(|f| f.storage_key).collect();
                self.cleanup(keys).await;
                return Err(e);
            }
        };

        Ok(PublishedContent {
            share_link: self.links.pay_link(content.id),
            qr_code_url: self.links.qr_code_url(content.id),
            content,
        })
    }

    fn validate_files(&self, files: &[UploadFile]) -> Result<(), AppError> {
        if files.is_empty() {
            return Err(AppError::Validation(
                "At least one file or some text content is required".to_string(),
            ));
        }
        if files.len() > self.limits.max_files {
            return Err(AppError::Validation(format!(
                "Too many files: {} (maximum {})",
                files.len(),
                self.limits.max_files
            )));
        }
        for file in files {
            if file.data.len() > self.limits.max_file_size_bytes {
                return Err(AppError::PayloadTooLarge(format!(
                    "File '{}' exceeds the maximum size of {} MB",
                    file.name,
                    self.limits.max_file_size_bytes / (1024 * 1024)
                )));
            }
        }
        Ok(())
    }

    /// Fan out one upload per file, then wait for all of them. On any failure
    /// the blobs that did land are removed and the first error is returned.
    async fn store_all(&self, files: Vec<UploadFile>) -> Result<Vec<ContentFile>, AppError> {
        let uploads = files.into_iter().map(|file| {
            let storage = Arc::clone(&self.storage);
            async move {
                let key = generate_content_key(&file.name);
                let size_bytes = file.data.len() as i64;
                let result = storage
                    .upload(&key, &file.content_type, file.data, false)
                    .await;
                result.map(|StoredObject { key, url }| ContentFile {
                    name: file.name,
                    url,
                    size_bytes,
                    content_type: file.content_type,
                    storage_key: key,
                })
            }
        });

        let results = join_all(uploads).await;

        let mut stored = Vec::with_capacity(results.len());
        let mut first_error = None;
        for result in results {
            match result {
                Ok(file) => stored.push(file),
                Err(e) => {
                    tracing::error!(error = %e, "File upload failed");
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            None => Ok(stored),
            Some(e) => {
                self.cleanup(stored.into_iter().map(|f| f.storage_key).collect())
                    .await;
                Err(e.into())
            }
        }
    }

    /// Delete blobs of an abandoned upload. Failures are only logged.
    async fn cleanup(&self, keys: Vec<String>) {
        if keys.is_empty() {
            return;
        }
        let deletes = keys.iter().map(|key| self.storage.delete(key));
        for (key, result) in keys.iter().zip(join_all(deletes).await) {
            if let Err(e) = result {
                tracing::warn!(key = %key, error = %e, "Failed to remove orphaned upload");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paylink_core::models::Currency;
    use paylink_db::InMemoryRecordStore;
    use paylink_storage::InMemoryStorage;
    use rust_decimal::Decimal;

    struct Fixture {
        storage: InMemoryStorage,
        ledger: Arc<ContentLedger>,
        service: UploadService,
    }

    fn fixture() -> Fixture {
        let storage = InMemoryStorage::new("memory://blobs");
        let ledger = Arc::new(ContentLedger::new(Arc::new(InMemoryRecordStore::new())));
        let service = UploadService::new(
            Arc::new(storage.clone()),
            ledger.clone(),
            ShareLinks::new("https://paylink.example"),
            UploadLimits {
                max_file_size_bytes: 16,
                max_files: 3,
            },
        );
        Fixture {
            storage,
            ledger,
            service,
        }
    }

    fn file(name: &str, content_type: &str) -> UploadFile {
        UploadFile {
            name: name.to_string(),
            content_type: content_type.to_string(),
            data: Bytes::from_static(b"data"),
        }
    }

    fn request(files: Vec<UploadFile>) -> UploadRequest {
        UploadRequest {
            title: "Trip".to_string(),
            description: String::new(),
            price: "9.99".to_string(),
            currency: "usd".to_string(),
            files,
            text_content: None,
        }
    }

    #[tokio::test]
    async fn publish_stores_files_and_creates_content() {
        let fx = fixture();
        let published = fx
            .service
            .publish(
                "alice",
                request(vec![file("a.png", "image/png"), file("b.jpg", "image/jpeg")]),
            )
            .await
            .unwrap();

        let content = &published.content;
        assert_eq!(content.kind, ContentKind::Image);
        assert_eq!(content.price, Decimal::new(999, 2));
        assert_eq!(content.currency, Currency::Usd);
        assert_eq!(content.files.len(), 2);
        assert_eq!(content.files[0].name, "a.png");
        assert!(content.files[0].storage_key.starts_with("content/"));
        assert_eq!(
            published.share_link,
            format!("https://paylink.example/pay/{}", content.id)
        );
        assert!(published.qr_code_url.contains("create-qr-code"));
        assert_eq!(fx.storage.len().await, 2);
        assert_eq!(fx.ledger.get(content.id).await.unwrap(), *content);
    }

    #[tokio::test]
    async fn text_content_becomes_a_file() {
        let fx = fixture();
        let mut req = request(Vec::new());
        req.title = String::new();
        req.text_content = Some("hello".to_string());

        let published = fx.service.publish("alice", req).await.unwrap();
        let content = published.content;
        assert_eq!(content.kind, ContentKind::Text);
        assert_eq!(content.title, TEXT_CONTENT_FILE_NAME);
        assert_eq!(content.files[0].content_type, "text/plain");
        assert_eq!(
            fx.storage.download(&content.files[0].storage_key).await.unwrap(),
            b"hello"
        );
    }

    #[tokio::test]
    async fn validation_happens_before_any_upload() {
        let fx = fixture();

        let mut bad_price = request(vec![file("a.png", "image/png")]);
        bad_price.price = "-1".to_string();
        assert!(matches!(
            fx.service.publish("alice", bad_price).await,
            Err(AppError::Validation(_))
        ));

        let mut bad_currency = request(vec![file("a.png", "image/png")]);
        bad_currency.currency = "JPY".to_string();
        assert!(matches!(
            fx.service.publish("alice", bad_currency).await,
            Err(AppError::Validation(_))
        ));

        let mut blank_text = request(Vec::new());
        blank_text.text_content = Some("   ".to_string());
        assert!(matches!(
            fx.service.publish("alice", blank_text).await,
            Err(AppError::Validation(_))
        ));

        let too_many = request(vec![
            file("a", "image/png"),
            file("b", "image/png"),
            file("c", "image/png"),
            file("d", "image/png"),
        ]);
        assert!(matches!(
            fx.service.publish("alice", too_many).await,
            Err(AppError::Validation(_))
        ));

        let mut big = file("big.bin", "application/octet-stream");
        big.data = Bytes::from(vec![0u8; 17]);
        assert!(matches!(
            fx.service.publish("alice", request(vec![big])).await,
            Err(AppError::PayloadTooLarge(_))
        ));

        assert!(fx.storage.is_empty().await);
        assert!(fx.ledger.list_for_owner("alice", None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_upload_leaves_no_record_and_no_blobs() {
        let fx = fixture();
        fx.storage.fail_uploads_named("broken.png").await;

        let result = fx
            .service
            .publish(
                "alice",
                request(vec![
                    file("a.png", "image/png"),
                    file("broken.png", "image/png"),
                    file("c.png", "image/png"),
                ]),
            )
            .await;

        assert!(matches!(result, Err(AppError::Storage(_))));
        assert!(fx.storage.is_empty().await);
        assert!(fx.ledger.list_for_owner("alice", None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn duplicate_file_names_get_distinct_keys() {
        let fx = fixture();
        let published = fx
            .service
            .publish(
                "alice",
                request(vec![file("a.pdf", "application/pdf"), file("a.pdf", "application/pdf")]),
            )
            .await
            .unwrap();
        let files = published.content.files;
        assert_ne!(files[0].storage_key, files[1].storage_key);
        assert_eq!(published.content.kind, ContentKind::Files);
    }
}
