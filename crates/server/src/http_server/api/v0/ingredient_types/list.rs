//! Filtered ingredient type query endpoint.

use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use http::StatusCode;
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use super::IngredientTypeInfo;
use crate::database::models::IngredientTypeFilter;
use crate::http_server::api::client::ApiRequest;
use crate::state::ServiceState;

/// Query parameters; absent means unconstrained.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListIngredientTypesRequest {
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
    pub alias: Option<String>,
    #[serde(
        rename = "description-fragment",
        skip_serializing_if = "Option::is_none"
    )]
    pub description_fragment: Option<String>,
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
}

pub async fn handler(
    State(state): State<ServiceState>,
    Query(params): Query<ListIngredientTypesRequest>,
) -> Result<impl IntoResponse, ListIngredientTypesError> {
    let filter = IngredientTypeFilter {
        min_created: params.min_created,
        max_created: params.max_created,
        min_modified: params.min_modified,
        max_modified: params.max_modified,
        alias: params.alias,
        description_fragment: params.description_fragment,
        pescatarian: params.pescatarian,
        lacto_ovo_vegetarian: params.lacto_ovo_vegetarian,
        lacto_vegetarian: params.lacto_vegetarian,
        vegan: params.vegan,
    };

    let types = state
        .database()
        .query_ingredient_types(&filter, params.result_offset, params.result_size)
        .await?;
    let infos: Vec<IngredientTypeInfo> = types.into_iter().map(Into::into).collect();

    Ok((StatusCode::OK, Json(infos)))
}

#[derive(Debug, thiserror::Error)]
pub enum ListIngredientTypesError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl IntoResponse for ListIngredientTypesError {
    fn into_response(self) -> Response {
        match self {
            ListIngredientTypesError::Database(e) => {
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
            }
        }
    }
}

// Client implementation - builds request for this operation
impl ApiRequest for ListIngredientTypesRequest {
    type Response = Vec<IngredientTypeInfo>;

    fn build_request(self, base_url: &Url, client: &Client) -> RequestBuilder {
        let full_url = base_url.join("/api/v0/ingredient-types").unwrap();
        client.get(full_url).query(&self)
    }
}
