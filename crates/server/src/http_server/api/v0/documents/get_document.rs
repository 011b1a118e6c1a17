//! Fetch-by-id endpoint.
//!
//! `Accept: application/json` yields the metadata record; any other Accept
//! header negotiates the raw content against the stored media type.

use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use http::header::{ACCEPT, CONTENT_TYPE};
use http::{HeaderMap, StatusCode};
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use document_store::{Document, StoreError};

use crate::http_server::api::client::ApiRequest;
use crate::http_server::api::v0::store_status;
use crate::state::ServiceState;

/// Request for a document's metadata record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetDocumentRequest {
    pub id: i64,
}

pub async fn handler(
    State(state): State<ServiceState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Result<Response, GetDocumentError> {
    let accept = headers
        .get(ACCEPT)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("*/*");

    if accept.trim() == "application/json" {
        let document = document_store::get(state.database(), id).await?;
        return Ok((StatusCode::OK, Json(document)).into_response());
    }

    let (content_type, content) =
        document_store::content_if_acceptable(state.database(), id, accept).await?;

    Ok((StatusCode::OK, [(CONTENT_TYPE, content_type)], content).into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum GetDocumentError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl IntoResponse for GetDocumentError {
    fn into_response(self) -> Response {
        match self {
            GetDocumentError::Store(e) => (store_status(&e), e.to_string()).into_response(),
        }
    }
}

// Client implementation - builds request for this operation
impl ApiRequest for GetDocumentRequest {
    type Response = Document;

    fn build_request(self, base_url: &Url, client: &Client) -> RequestBuilder {
        let full_url = base_url
            .join(&format!("/api/v0/documents/{}", self.id))
            .unwrap();
        client.get(full_url).header(ACCEPT, "application/json")
    }
}
