//! Get recipe endpoint.

use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use http::StatusCode;
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use super::{recipe_info, RecipeInfo};
use crate::http_server::api::client::ApiRequest;
use crate::state::ServiceState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetRecipeRequest {
    pub id: i64,
}

pub async fn handler(
    State(state): State<ServiceState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, GetRecipeError> {
    let recipe = state
        .database()
        .get_recipe(id)
        .await?
        .ok_or(GetRecipeError::NotFound(id))?;
    let info = recipe_info(state.database(), recipe).await?;

    Ok((StatusCode::OK, Json(info)))
}

#[derive(Debug, thiserror::Error)]
pub enum GetRecipeError {
    #[error("no recipe with id {0}")]
    NotFound(i64),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl IntoResponse for GetRecipeError {
    fn into_response(self) -> Response {
        let status = match &self {
            GetRecipeError::NotFound(_) => StatusCode::NOT_FOUND,
            GetRecipeError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, self.to_string()).into_response()
    }
}

// Client implementation - builds request for this operation
impl ApiRequest for GetRecipeRequest {
    type Response = RecipeInfo;

    fn build_request(self, base_url: &Url, client: &Client) -> RequestBuilder {
        let full_url = base_url
            .join(&format!("/api/v0/recipes/{}", self.id))
            .unwrap();
        client.get(full_url)
    }
}
