//! Document upload endpoint.
//!
//! Accepts arbitrary bytes with a declared `Content-Type` and answers with
//! the plain-text id of the deduplicated document. Uploading bytes that are
//! already stored returns the existing id.

use axum::body::Bytes;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Extension;
use http::header::CONTENT_TYPE;
use http::{HeaderMap, StatusCode};

use document_store::StoreError;

use crate::http_server::api::v0::store_status;
use crate::http_server::auth::Requester;
use crate::state::ServiceState;

pub async fn handler(
    State(state): State<ServiceState>,
    Extension(requester): Extension<Requester>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, CreateDocumentError> {
    if !requester.is_admin() {
        return Err(CreateDocumentError::Forbidden);
    }

    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok());

    // structured JSON belongs on the entity endpoints, not in blob storage
    if content_type.is_some_and(is_json) {
        return Err(CreateDocumentError::UnsupportedMediaType);
    }

    let id = document_store::put(state.database(), content_type, &body).await?;

    Ok((StatusCode::OK, id.to_string()))
}

fn is_json(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .map(str::trim)
        .is_some_and(|essence| essence.eq_ignore_ascii_case("application/json"))
}

#[derive(Debug, thiserror::Error)]
pub enum CreateDocumentError {
    #[error("only administrators may upload documents")]
    Forbidden,
    #[error("refusing to store application/json content")]
    UnsupportedMediaType,
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl IntoResponse for CreateDocumentError {
    fn into_response(self) -> Response {
        match self {
            CreateDocumentError::Forbidden => {
                (StatusCode::FORBIDDEN, self.to_string()).into_response()
            }
            CreateDocumentError::UnsupportedMediaType => {
                (StatusCode::UNSUPPORTED_MEDIA_TYPE, self.to_string()).into_response()
            }
            CreateDocumentError::Store(e) => (store_status(&e), e.to_string()).into_response(),
        }
    }
}
