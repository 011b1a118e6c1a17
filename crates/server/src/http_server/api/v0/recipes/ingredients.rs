//! Recipe ingredient endpoints: list and wholesale replacement.

use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use http::StatusCode;
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use crate::database::models::{Ingredient, IngredientTemplate, IngredientUpdateError};
use crate::http_server::api::client::ApiRequest;
use crate::http_server::auth::Requester;
use crate::state::ServiceState;

use super::may_modify;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetIngredientsRequest {
    pub recipe_id: i64,
}

/// Replace a recipe's ingredient set; templates with id 0 create new
/// ingredients, anything submitted without survives the call only if listed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetIngredientsRequest {
    pub recipe_id: i64,
    pub ingredients: Vec<IngredientTemplate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetIngredientsResponse {
    pub id: i64,
}

pub async fn get_handler(
    State(state): State<ServiceState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, RecipeIngredientsError> {
    let db = state.database();
    db.get_recipe(id)
        .await?
        .ok_or(RecipeIngredientsError::NotFound(id))?;

    let ingredients = db.ingredients_for_recipe(id).await?;

    Ok((StatusCode::OK, Json(ingredients)))
}

pub async fn put_handler(
    State(state): State<ServiceState>,
    Extension(requester): Extension<Requester>,
    Path(id): Path<i64>,
    Json(templates): Json<Vec<IngredientTemplate>>,
) -> Result<impl IntoResponse, RecipeIngredientsError> {
    let db = state.database();
    let recipe = db
        .get_recipe(id)
        .await?
        .ok_or(RecipeIngredientsError::NotFound(id))?;

    if !may_modify(&recipe, &requester) {
        return Err(RecipeIngredientsError::Forbidden);
    }
    if templates.iter().any(|t| t.amount <= 0.0) {
        return Err(RecipeIngredientsError::NonPositiveAmount);
    }

    db.replace_recipe_ingredients(id, &templates).await?;

    Ok((StatusCode::OK, Json(SetIngredientsResponse { id })))
}

#[derive(Debug, thiserror::Error)]
pub enum RecipeIngredientsError {
    #[error("no recipe with id {0}")]
    NotFound(i64),
    #[error("recipes may only be changed by their owner or an administrator")]
    Forbidden,
    #[error("ingredient amounts must be positive")]
    NonPositiveAmount,
    #[error("ingredient update error: {0}")]
    Update(#[from] IngredientUpdateError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl IntoResponse for RecipeIngredientsError {
    fn into_response(self) -> Response {
        let status = match &self {
            RecipeIngredientsError::NotFound(_) => StatusCode::NOT_FOUND,
            RecipeIngredientsError::Forbidden => StatusCode::FORBIDDEN,
            RecipeIngredientsError::NonPositiveAmount => StatusCode::BAD_REQUEST,
            RecipeIngredientsError::Update(e) => match e {
                IngredientUpdateError::UnknownType(_)
                | IngredientUpdateError::UnknownIngredient(_) => StatusCode::NOT_FOUND,
                IngredientUpdateError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            RecipeIngredientsError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, self.to_string()).into_response()
    }
}

// Client implementations - build requests for these operations
impl ApiRequest for GetIngredientsRequest {
    type Response = Vec<Ingredient>;

    fn build_request(self, base_url: &Url, client: &Client) -> RequestBuilder {
        let full_url = base_url
            .join(&format!("/api/v0/recipes/{}/ingredients", self.recipe_id))
            .unwrap();
        client.get(full_url)
    }
}

impl ApiRequest for SetIngredientsRequest {
    type Response = SetIngredientsResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> RequestBuilder {
        let full_url = base_url
            .join(&format!("/api/v0/recipes/{}/ingredients", self.recipe_id))
            .unwrap();
        client.put(full_url).json(&self.ingredients)
    }
}
