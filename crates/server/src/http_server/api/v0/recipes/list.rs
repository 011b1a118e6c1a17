//! Filtered recipe query endpoint.

use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use http::StatusCode;
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use super::{recipe_info, RecipeInfo};
use crate::database::models::{RecipeCategory, RecipeFilter};
use crate::http_server::api::client::ApiRequest;
use crate::state::ServiceState;

/// Query parameters; absent means unconstrained. The diet flags select
/// recipes whose ingredients all carry (or all lack) the flag.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListRecipesRequest {
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
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<RecipeCategory>,
    #[serde(
        rename = "description-fragment",
        skip_serializing_if = "Option::is_none"
    )]
    pub description_fragment: Option<String>,
    #[serde(
        rename = "instruction-fragment",
        skip_serializing_if = "Option::is_none"
    )]
    pub instruction_fragment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pescatarian: Option<bool>,
    #[serde(
        rename = "lacto-ovo-vegetarian",
        skip_serializing_if = "Option::is_none"
    )]
    pub lacto_ovo_vegetarian: Option<bool>,
    #[serde(rename = "lacto-vegetarian", skip_serializing_if = "Option::is_none")]
    pub lacto_vegetarian: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vegan: Option<bool>,
    #[serde(rename = "owner-email", skip_serializing_if = "Option::is_none")]
    pub owner_email: Option<String>,
}

pub async fn handler(
    State(state): State<ServiceState>,
    Query(params): Query<ListRecipesRequest>,
) -> Result<impl IntoResponse, ListRecipesError> {
    let filter = RecipeFilter {
        min_created: params.min_created,
        max_created: params.max_created,
        min_modified: params.min_modified,
        max_modified: params.max_modified,
        title: params.title,
        category: params.category,
        description_fragment: params.description_fragment,
        instruction_fragment: params.instruction_fragment,
        pescatarian: params.pescatarian,
        lacto_ovo_vegetarian: params.lacto_ovo_vegetarian,
        lacto_vegetarian: params.lacto_vegetarian,
        vegan: params.vegan,
        owner_email: params.owner_email,
    };

    let db = state.database();
    let recipes = db
        .query_recipes(&filter, params.result_offset, params.result_size)
        .await?;

    let infos =
        futures::future::try_join_all(recipes.into_iter().map(|recipe| recipe_info(db, recipe)))
            .await?;

    Ok((StatusCode::OK, Json(infos)))
}

#[derive(Debug, thiserror::Error)]
pub enum ListRecipesError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl IntoResponse for ListRecipesError {
    fn into_response(self) -> Response {
        match self {
            ListRecipesError::Database(e) => {
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
            }
        }
    }
}

// Client implementation - builds request for this operation
impl ApiRequest for ListRecipesRequest {
    type Response = Vec<RecipeInfo>;

    fn build_request(self, base_url: &Url, client: &Client) -> RequestBuilder {
        let full_url = base_url.join("/api/v0/recipes").unwrap();
        client.get(full_url).query(&self)
    }
}
