//! Filtered document query endpoint.

use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use http::StatusCode;
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use document_store::{Document, DocumentFilter, StoreError};

use crate::http_server::api::client::ApiRequest;
use crate::http_server::api::v0::store_status;
use crate::state::ServiceState;

/// Query parameters; absent means unconstrained.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListDocumentsRequest {
    #[serde(rename = "result-offset", skip_serializing_if = "Option::is_none")]
    pub result_offset: Option<i64>,
    #[serde(rename = "result-size", skip_serializing_if = "Option::is_none")]
    pub result_size: Option<i64>,
    #[serde(rename = "min-created", skip_serializing_if = "Option::is_none")]
    pub min_created: Option<i64>,
    #[serde(rename = "max-created", skip_serializing_if = "Option::is_none")]
    pub max_created: Option<i64>,
    #[serde(rename = "min-modified", skip_serializing_if = "Option::is_none")]
    pub min_modified: Option<i64>,
    #[serde(rename = "max-modified", skip_serializing_if = "Option::is_none")]
    pub max_modified: Option<i64>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    #[serde(rename = "min-size", skip_serializing_if = "Option::is_none")]
    pub min_size: Option<i64>,
    #[serde(rename = "max-size", skip_serializing_if = "Option::is_none")]
    pub max_size: Option<i64>,
}

pub async fn handler(
    State(state): State<ServiceState>,
    Query(params): Query<ListDocumentsRequest>,
) -> Result<impl IntoResponse, ListDocumentsError> {
    let filter = DocumentFilter {
        min_created: params.min_created,
        max_created: params.max_created,
        min_modified: params.min_modified,
        max_modified: params.max_modified,
        content_type: params.content_type,
        hash: params.hash,
        min_size: params.min_size,
        max_size: params.max_size,
    };

    let documents = document_store::query(
        state.database(),
        &filter,
        params.result_offset,
        params.result_size,
    )
    .await?;

    Ok((StatusCode::OK, Json(documents)))
}

#[derive(Debug, thiserror::Error)]
pub enum ListDocumentsError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl IntoResponse for ListDocumentsError {
    fn into_response(self) -> Response {
        match self {
            ListDocumentsError::Store(e) => (store_status(&e), e.to_string()).into_response(),
        }
    }
}

// Client implementation - builds request for this operation
impl ApiRequest for ListDocumentsRequest {
    type Response = Vec<Document>;

    fn build_request(self, base_url: &Url, client: &Client) -> RequestBuilder {
        let full_url = base_url.join("/api/v0/documents").unwrap();
        client.get(full_url).query(&self)
    }
}
