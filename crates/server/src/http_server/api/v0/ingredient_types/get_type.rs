//! Get ingredient type endpoint.

use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use http::StatusCode;
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use super::IngredientTypeInfo;
use crate::http_server::api::client::ApiRequest;
use crate::state::ServiceState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetIngredientTypeRequest {
    pub id: i64,
}

pub async fn handler(
    State(state): State<ServiceState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, GetIngredientTypeError> {
    let ingredient_type = state
        .database()
        .get_ingredient_type(id)
        .await?
        .ok_or(GetIngredientTypeError::NotFound(id))?;

    Ok((
        StatusCode::OK,
        Json(IngredientTypeInfo::from(ingredient_type)),
    ))
}

#[derive(Debug, thiserror::Error)]
pub enum GetIngredientTypeError {
    #[error("no ingredient type with id {0}")]
    NotFound(i64),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl IntoResponse for GetIngredientTypeError {
    fn into_response(self) -> Response {
        let status = match &self {
            GetIngredientTypeError::NotFound(_) => StatusCode::NOT_FOUND,
            GetIngredientTypeError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, self.to_string()).into_response()
    }
}

// Client implementation - builds request for this operation
impl ApiRequest for GetIngredientTypeRequest {
    type Response = IngredientTypeInfo;

    fn build_request(self, base_url: &Url, client: &Client) -> RequestBuilder {
        let full_url = base_url
            .join(&format!("/api/v0/ingredient-types/{}", self.id))
            .unwrap();
        client.get(full_url)
    }
}
