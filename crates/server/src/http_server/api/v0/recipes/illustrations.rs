//! Recipe illustration endpoints: documents associated many-to-many.

use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use http::StatusCode;
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use document_store::StoreError;

use crate::http_server::api::client::ApiRequest;
use crate::http_server::auth::Requester;
use crate::state::ServiceState;

use super::may_modify;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetIllustrationsRequest {
    pub recipe_id: i64,
}

/// Replace a recipe's illustration references wholesale; ids of documents
/// that do not exist are dropped silently.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetIllustrationsRequest {
    pub recipe_id: i64,
    pub document_ids: Vec<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetIllustrationsResponse {
    pub id: i64,
}

pub async fn get_handler(
    State(state): State<ServiceState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, RecipeIllustrationsError> {
    let db = state.database();
    db.get_recipe(id)
        .await?
        .ok_or(RecipeIllustrationsError::NotFound(id))?;

    let references = db.recipe_illustration_references(id).await?;

    Ok((StatusCode::OK, Json(references)))
}

pub async fn put_handler(
    State(state): State<ServiceState>,
    Extension(requester): Extension<Requester>,
    Path(id): Path<i64>,
    Json(document_ids): Json<Vec<i64>>,
) -> Result<impl IntoResponse, RecipeIllustrationsError> {
    let db = state.database();
    let recipe = db
        .get_recipe(id)
        .await?
        .ok_or(RecipeIllustrationsError::NotFound(id))?;

    if !may_modify(&recipe, &requester) {
        return Err(RecipeIllustrationsError::Forbidden);
    }

    let mut existing = Vec::with_capacity(document_ids.len());
    for document_id in document_ids {
        match document_store::get(db, document_id).await {
            Ok(document) => existing.push(document.id()),
            Err(StoreError::NotFound(_)) => continue,
            Err(e) => return Err(RecipeIllustrationsError::Store(e)),
        }
    }

    db.set_recipe_illustrations(id, &existing).await?;

    Ok((StatusCode::OK, Json(SetIllustrationsResponse { id })))
}

#[derive(Debug, thiserror::Error)]
pub enum RecipeIllustrationsError {
    #[error("no recipe with id {0}")]
    NotFound(i64),
    #[error("recipes may only be changed by their owner or an administrator")]
    Forbidden,
    #[error("store error: {0}")]
    Store(StoreError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl IntoResponse for RecipeIllustrationsError {
    fn into_response(self) -> Response {
        let status = match &self {
            RecipeIllustrationsError::NotFound(_) => StatusCode::NOT_FOUND,
            RecipeIllustrationsError::Forbidden => StatusCode::FORBIDDEN,
            RecipeIllustrationsError::Store(_) | RecipeIllustrationsError::Database(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, self.to_string()).into_response()
    }
}

// Client implementations - build requests for these operations
impl ApiRequest for GetIllustrationsRequest {
    type Response = Vec<i64>;

    fn build_request(self, base_url: &Url, client: &Client) -> RequestBuilder {
        let full_url = base_url
            .join(&format!(
                "/api/v0/recipes/{}/illustration-references",
                self.recipe_id
            ))
            .unwrap();
        client.get(full_url)
    }
}

impl ApiRequest for SetIllustrationsRequest {
    type Response = SetIllustrationsResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> RequestBuilder {
        let full_url = base_url
            .join(&format!(
                "/api/v0/recipes/{}/illustration-references",
                self.recipe_id
            ))
            .unwrap();
        client.put(full_url).json(&self.document_ids)
    }
}
