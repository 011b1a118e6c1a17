//! End-to-end properties of the document store.

use document_store::{
    content_if_acceptable, get, migrate, put, query, sha256_hex, Document, DocumentFilter,
    StoreError, DEFAULT_CONTENT_TYPE, EMPTY_CONTENT_HASH,
};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

async fn setup() -> SqlitePool {
    let options = SqliteConnectOptions::new()
        .filename(":memory:")
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .unwrap();
    migrate(&pool).await.unwrap();
    pool
}

async fn all_documents(db: &SqlitePool) -> Vec<Document> {
    query(db, &DocumentFilter::default(), None, None).await.unwrap()
}

#[tokio::test]
async fn put_computes_sha256_hex() {
    let db = setup().await;

    let id = put(&db, Some("text/plain"), b"hello").await.unwrap();
    let doc = get(&db, id).await.unwrap();

    assert_eq!(doc.hash, sha256_hex(b"hello"));
    assert_eq!(doc.hash.len(), 64);
    assert_eq!(doc.content_type, "text/plain");
}

#[tokio::test]
async fn empty_content_gets_the_known_digest() {
    let db = setup().await;

    let id = put(&db, Some("application/octet-stream"), b"").await.unwrap();
    let doc = get(&db, id).await.unwrap();

    assert_eq!(doc.hash, EMPTY_CONTENT_HASH);
    assert!(doc.content.is_empty());
}

#[tokio::test]
async fn identical_content_resolves_to_one_identity() {
    let db = setup().await;

    let first = put(&db, Some("text/plain"), b"same bytes").await.unwrap();
    let second = put(&db, Some("image/png"), b"same bytes").await.unwrap();

    assert_eq!(first, second);

    // the first writer's declared type wins
    let doc = get(&db, first).await.unwrap();
    assert_eq!(doc.content_type, "text/plain");
    assert_eq!(all_documents(&db).await.len(), 1);
}

#[tokio::test]
async fn put_is_idempotent() {
    let db = setup().await;

    let mut ids = Vec::new();
    for _ in 0..5 {
        ids.push(put(&db, Some("text/plain"), b"repeated").await.unwrap());
    }

    assert!(ids.iter().all(|id| *id == ids[0]));
    assert_eq!(all_documents(&db).await.len(), 1);
}

#[tokio::test]
async fn content_round_trips() {
    let db = setup().await;
    let payload: Vec<u8> = (0..=255u8).cycle().take(10_000).collect();

    let id = put(&db, Some("application/octet-stream"), &payload)
        .await
        .unwrap();
    let doc = get(&db, id).await.unwrap();

    assert_eq!(doc.content, payload);
}

#[tokio::test]
async fn missing_type_defaults_to_octet_stream() {
    let db = setup().await;

    let id = put(&db, None, b"untyped").await.unwrap();
    let doc = get(&db, id).await.unwrap();

    assert_eq!(doc.content_type, DEFAULT_CONTENT_TYPE);
}

#[tokio::test]
async fn get_unknown_id_is_not_found() {
    let db = setup().await;

    let error = get(&db, 4711).await.unwrap_err();
    assert!(matches!(error, StoreError::NotFound(4711)));
}

#[tokio::test]
async fn negotiation_honors_wildcards() {
    let db = setup().await;
    let id = put(&db, Some("image/png"), b"not really a png").await.unwrap();

    let (content_type, content) = content_if_acceptable(&db, id, "image/*").await.unwrap();
    assert_eq!(content_type, "image/png");
    assert_eq!(content, b"not really a png");

    let (_, content) = content_if_acceptable(&db, id, "*/*").await.unwrap();
    assert_eq!(content, b"not really a png");
}

#[tokio::test]
async fn negotiation_mismatch_is_not_acceptable() {
    let db = setup().await;
    let id = put(&db, Some("text/plain"), b"plain text").await.unwrap();

    let error = content_if_acceptable(&db, id, "image/*").await.unwrap_err();
    assert!(matches!(error, StoreError::NotAcceptable { .. }));

    // distinct from a lookup miss
    let error = content_if_acceptable(&db, 4711, "image/*").await.unwrap_err();
    assert!(matches!(error, StoreError::NotFound(4711)));
}

#[tokio::test]
async fn concurrent_identical_puts_converge() {
    let db = setup().await;

    let (left, right) = tokio::join!(
        put(&db, Some("text/plain"), b"raced bytes"),
        put(&db, Some("text/plain"), b"raced bytes"),
    );

    assert_eq!(left.unwrap(), right.unwrap());
    assert_eq!(all_documents(&db).await.len(), 1);
}

#[tokio::test]
async fn query_filters_combine_with_and() {
    let db = setup().await;
    let plain = put(&db, Some("text/plain"), b"alpha").await.unwrap();
    let png = put(&db, Some("image/png"), b"beta-longer").await.unwrap();
    put(&db, Some("text/plain"), b"gamma-longest-of-all")
        .await
        .unwrap();

    let filter = DocumentFilter {
        content_type: Some("text/plain".to_string()),
        max_size: Some(5),
        ..Default::default()
    };
    let matched = query(&db, &filter, None, None).await.unwrap();
    assert_eq!(matched.len(), 1);
    assert_eq!(matched[0].id(), plain);

    let filter = DocumentFilter {
        hash: Some(sha256_hex(b"beta-longer")),
        ..Default::default()
    };
    let matched = query(&db, &filter, None, None).await.unwrap();
    assert_eq!(matched.len(), 1);
    assert_eq!(matched[0].id(), png);
}

#[tokio::test]
async fn query_orders_by_id_and_paginates() {
    let db = setup().await;
    for i in 0..6u8 {
        put(&db, Some("text/plain"), &[i]).await.unwrap();
    }

    let all = all_documents(&db).await;
    assert_eq!(all.len(), 6);
    assert!(all.windows(2).all(|pair| pair[0].id() < pair[1].id()));

    let page = query(&db, &DocumentFilter::default(), Some(2), Some(3))
        .await
        .unwrap();
    assert_eq!(page.len(), 3);
    assert_eq!(page[0].id(), all[2].id());
    assert_eq!(page[2].id(), all[4].id());
}

#[tokio::test]
async fn query_by_creation_time_range() {
    let db = setup().await;
    let id = put(&db, Some("text/plain"), b"timed").await.unwrap();
    let created = get(&db, id).await.unwrap().base.created;

    let hit = DocumentFilter {
        min_created: Some(created),
        max_created: Some(created),
        ..Default::default()
    };
    assert_eq!(query(&db, &hit, None, None).await.unwrap().len(), 1);

    let miss = DocumentFilter {
        min_created: Some(created + 1),
        ..Default::default()
    };
    assert!(query(&db, &miss, None, None).await.unwrap().is_empty());
}

#[tokio::test]
async fn survives_reconnect_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("documents.db");

    let options = SqliteConnectOptions::new()
        .filename(&path)
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options.clone())
        .await
        .unwrap();
    migrate(&pool).await.unwrap();
    let id = put(&pool, Some("text/plain"), b"durable").await.unwrap();
    pool.close().await;

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .unwrap();
    let doc = get(&pool, id).await.unwrap();
    assert_eq!(doc.content, b"durable");
    assert_eq!(doc.base.version, 1);
}
