//! Integration tests for the document endpoints.

mod common;

use http::StatusCode;

use cookbook_server::http_server::api::v0::documents::{GetDocumentRequest, ListDocumentsRequest};
use cookbook_server::http_server::api::v0::people::UpsertPersonRequest;
use cookbook_server::{ApiError, Group, PersonName};
use document_store::sha256_hex;

#[tokio::test]
async fn upload_deduplicates_and_reports_metadata() {
    let server = common::spawn().await;
    let client = server.admin_client();

    let first = client
        .upload_document("text/plain", b"hello cookbook".to_vec())
        .await
        .unwrap();
    let second = client
        .upload_document("image/png", b"hello cookbook".to_vec())
        .await
        .unwrap();
    assert_eq!(first, second);

    let document = client.call(GetDocumentRequest { id: first }).await.unwrap();
    assert_eq!(document.hash, sha256_hex(b"hello cookbook"));
    // first writer's type wins
    assert_eq!(document.content_type, "text/plain");
    assert_eq!(document.base.version, 1);
}

#[tokio::test]
async fn raw_fetch_negotiates_content_type() {
    let server = common::spawn().await;
    let client = server.admin_client();

    let id = client
        .upload_document("text/plain", b"negotiated".to_vec())
        .await
        .unwrap();

    let (content_type, content) = client.document_content(id, "text/*").await.unwrap();
    assert_eq!(content_type, "text/plain");
    assert_eq!(content, b"negotiated");

    let error = client.document_content(id, "image/*").await.unwrap_err();
    assert!(matches!(
        error,
        ApiError::HttpStatus(StatusCode::NOT_ACCEPTABLE, _)
    ));

    let error = client.document_content(999_999, "text/*").await.unwrap_err();
    assert!(matches!(
        error,
        ApiError::HttpStatus(StatusCode::NOT_FOUND, _)
    ));
}

#[tokio::test]
async fn json_uploads_are_refused() {
    let server = common::spawn().await;
    let client = server.admin_client();

    let error = client
        .upload_document("application/json", b"{}".to_vec())
        .await
        .unwrap_err();
    assert!(matches!(
        error,
        ApiError::HttpStatus(StatusCode::UNSUPPORTED_MEDIA_TYPE, _)
    ));
}

#[tokio::test]
async fn only_administrators_may_upload() {
    let server = common::spawn().await;
    let admin = server.admin_client();

    let template = UpsertPersonRequest {
        id: 0,
        version: 1,
        email: "cook@example.org".to_string(),
        group: Group::User,
        name: PersonName {
            title: None,
            family: "Cook".to_string(),
            given: "Carla".to_string(),
        },
        address: Default::default(),
        phones: Vec::new(),
        set_password: Some("kitchen".to_string()),
    };
    admin.call(template).await.unwrap();

    let user = server.client("cook@example.org", "kitchen");
    let error = user
        .upload_document("text/plain", b"nope".to_vec())
        .await
        .unwrap_err();
    assert!(matches!(
        error,
        ApiError::HttpStatus(StatusCode::FORBIDDEN, _)
    ));
}

#[tokio::test]
async fn query_filters_and_paginates() {
    let server = common::spawn().await;
    let client = server.admin_client();

    let text_id = client
        .upload_document("text/plain", b"short".to_vec())
        .await
        .unwrap();
    client
        .upload_document("text/plain", b"a much longer text payload".to_vec())
        .await
        .unwrap();
    client
        .upload_document("audio/ogg", b"oggdata".to_vec())
        .await
        .unwrap();

    let request = ListDocumentsRequest {
        content_type: Some("text/plain".to_string()),
        max_size: Some(5),
        ..Default::default()
    };
    let matched = client.call(request).await.unwrap();
    assert_eq!(matched.len(), 1);
    assert_eq!(matched[0].id(), text_id);

    let request = ListDocumentsRequest {
        hash: Some(sha256_hex(b"oggdata")),
        ..Default::default()
    };
    let matched = client.call(request).await.unwrap();
    assert_eq!(matched.len(), 1);
    assert_eq!(matched[0].content_type, "audio/ogg");

    // seeded avatar + three uploads, ordered by id
    let all = client.call(ListDocumentsRequest::default()).await.unwrap();
    assert_eq!(all.len(), 4);
    assert!(all.windows(2).all(|pair| pair[0].id() < pair[1].id()));

    let request = ListDocumentsRequest {
        result_offset: Some(1),
        result_size: Some(2),
        ..Default::default()
    };
    let page = client.call(request).await.unwrap();
    assert_eq!(page.len(), 2);
    assert_eq!(page[0].id(), all[1].id());
}

#[tokio::test]
async fn unauthenticated_requests_are_challenged() {
    let server = common::spawn().await;

    let response = reqwest::get(server.url.join("/api/v0/documents").unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response
            .headers()
            .get(http::header::WWW_AUTHENTICATE)
            .unwrap(),
        "Basic"
    );
}
