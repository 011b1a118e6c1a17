//! Insert-or-update endpoint for recipes.
//!
//! Any authenticated person may create a recipe and becomes its owner;
//! updating someone else's recipe takes administrator privileges.

use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use http::StatusCode;
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use document_store::StoreError;

use crate::database::models::{Recipe, RecipeCategory};
use crate::database::{is_unique_violation, DEFAULT_AVATAR_ID};
use crate::http_server::api::client::ApiRequest;
use crate::http_server::auth::Requester;
use crate::state::ServiceState;

use super::may_modify;

/// Recipe template; id 0 inserts, anything else updates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpsertRecipeRequest {
    #[serde(default)]
    pub id: i64,
    #[serde(default = "default_version")]
    pub version: i64,
    pub title: String,
    #[serde(default = "default_category")]
    pub category: RecipeCategory,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub instruction: Option<String>,
}

fn default_version() -> i64 {
    1
}

fn default_category() -> RecipeCategory {
    RecipeCategory::MainCourse
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpsertRecipeResponse {
    pub id: i64,
}

pub async fn handler(
    State(state): State<ServiceState>,
    Extension(requester): Extension<Requester>,
    Json(template): Json<UpsertRecipeRequest>,
) -> Result<impl IntoResponse, UpsertRecipeError> {
    let db = state.database();
    let now = chrono::Utc::now().timestamp_millis();

    let mut recipe = if template.id == 0 {
        match document_store::get(db, DEFAULT_AVATAR_ID).await {
            Ok(_) => {}
            Err(StoreError::NotFound(_)) => return Err(UpsertRecipeError::NoDefaultAvatar),
            Err(e) => return Err(UpsertRecipeError::Store(e)),
        }
        Recipe::new(&template.title, requester.id, DEFAULT_AVATAR_ID)
    } else {
        let recipe = db
            .get_recipe(template.id)
            .await?
            .ok_or(UpsertRecipeError::NotFound(template.id))?;
        if !may_modify(&recipe, &requester) {
            return Err(UpsertRecipeError::Forbidden);
        }
        recipe
    };

    recipe.base.version = template.version;
    recipe.base.modified = now;
    recipe.title = template.title;
    recipe.category = template.category;
    recipe.description = template.description;
    recipe.instruction = template.instruction;

    let id = if template.id == 0 {
        db.insert_recipe(&recipe).await.map_err(unique_to_conflict)?
    } else {
        db.update_recipe(&recipe).await.map_err(unique_to_conflict)?;
        recipe.base.id
    };

    Ok((StatusCode::OK, Json(UpsertRecipeResponse { id })))
}

fn unique_to_conflict(error: sqlx::Error) -> UpsertRecipeError {
    if is_unique_violation(&error) {
        UpsertRecipeError::TitleTaken
    } else {
        UpsertRecipeError::Database(error)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum UpsertRecipeError {
    #[error("recipes may only be changed by their owner or an administrator")]
    Forbidden,
    #[error("the default avatar document is missing")]
    NoDefaultAvatar,
    #[error("no recipe with id {0}")]
    NotFound(i64),
    #[error("title is already in use")]
    TitleTaken,
    #[error("store error: {0}")]
    Store(StoreError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl IntoResponse for UpsertRecipeError {
    fn into_response(self) -> Response {
        let status = match &self {
            UpsertRecipeError::Forbidden => StatusCode::FORBIDDEN,
            UpsertRecipeError::NoDefaultAvatar => StatusCode::SERVICE_UNAVAILABLE,
            UpsertRecipeError::NotFound(_) => StatusCode::NOT_FOUND,
            UpsertRecipeError::TitleTaken => StatusCode::CONFLICT,
            UpsertRecipeError::Store(_) | UpsertRecipeError::Database(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, self.to_string()).into_response()
    }
}

// Client implementation - builds request for this operation
impl ApiRequest for UpsertRecipeRequest {
    type Response = UpsertRecipeResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> RequestBuilder {
        let full_url = base_url.join("/api/v0/recipes").unwrap();
        client.post(full_url).json(&self)
    }
}
