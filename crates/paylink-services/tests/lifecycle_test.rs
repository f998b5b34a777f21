use std::sync::Arc;

use bytes::Bytes;
use paylink_core::models::AccessState;
use paylink_db::InMemoryRecordStore;
use paylink_services::{
    CheckoutService, ContentLedger, ShareLinks, SimulatedGateway, UploadFile, UploadLimits,
    UploadRequest, UploadService,
};
use paylink_storage::{InMemoryStorage, Storage};
use rust_decimal::Decimal;
use uuid::Uuid;

#[tokio::test]
async fn upload_share_pay_unlock() {
    let storage = InMemoryStorage::new("memory://blobs");
    let ledger = Arc::new(ContentLedger::new(Arc::new(InMemoryRecordStore::new())));
    let uploads = UploadService::new(
        Arc::new(storage.clone()),
        ledger.clone(),
        ShareLinks::new("https://paylink.example"),
        UploadLimits {
            max_file_size_bytes: 1024,
            max_files: 5,
        },
    );
    let checkout = CheckoutService::new(ledger.clone(), Arc::new(SimulatedGateway::from_millis(0)));

    let published = uploads
        .publish(
            "alice",
            UploadRequest {
                title: "Beat pack".to_string(),
                description: "Three loops".to_string(),
                price: "4.50".to_string(),
                currency: "GBP".to_string(),
                files: vec![UploadFile {
                    name: "loop.wav".to_string(),
                    content_type: "audio/wav".to_string(),
                    data: Bytes::from_static(b"RIFF"),
                }],
                text_content: None,
            },
        )
        .await
        .unwrap();

    let id: Uuid = published
        .share_link
        .rsplit('/')
        .next()
        .unwrap()
        .parse()
        .unwrap();
    assert_eq!(id, published.content.id);

    let preview = checkout.view(id).await.unwrap();
    assert_eq!(preview.access, AccessState::Locked);
    assert_eq!(preview.price, Decimal::new(45, 1));

    let unlocked = checkout
        .purchase(id, "fan@example.com", preview.price)
        .await
        .unwrap();
    assert!(unlocked.access.is_unlocked());
    assert_eq!(unlocked.files.len(), 1);

    let url = &unlocked.files[0].url;
    let key = url.trim_start_matches("memory://blobs/");
    assert_eq!(storage.download(key).await.unwrap(), b"RIFF");

    let stats = ledger.dashboard("alice", 10).await.unwrap();
    assert_eq!(stats.total_views, 1);
    assert_eq!(stats.total_payments, 1);
    assert_eq!(stats.total_earnings, Decimal::new(45, 1));
    assert!((stats.conversion_rate - 100.0).abs() < 1e-9);
}
