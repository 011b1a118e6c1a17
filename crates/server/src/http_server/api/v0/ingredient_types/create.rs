//! Insert-or-update endpoint for ingredient types. Administrators only.

use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use http::StatusCode;
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use document_store::StoreError;

use crate::database::models::{DietFlags, IngredientType};
use crate::database::{is_unique_violation, DEFAULT_AVATAR_ID};
use crate::http_server::api::client::ApiRequest;
use crate::http_server::auth::Requester;
use crate::state::ServiceState;

/// Ingredient type template; id 0 inserts, anything else updates. The
/// submitted diet flags are closed under the implication chain before
/// storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpsertIngredientTypeRequest {
    #[serde(default)]
    pub id: i64,
    #[serde(default = "default_version")]
    pub version: i64,
    pub alias: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(flatten)]
    pub diet: DietFlags,
}

fn default_version() -> i64 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpsertIngredientTypeResponse {
    pub id: i64,
}

pub async fn handler(
    State(state): State<ServiceState>,
    Extension(requester): Extension<Requester>,
    Json(template): Json<UpsertIngredientTypeRequest>,
) -> Result<impl IntoResponse, UpsertIngredientTypeError> {
    if !requester.is_admin() {
        return Err(UpsertIngredientTypeError::Forbidden);
    }

    let db = state.database();
    let now = chrono::Utc::now().timestamp_millis();

    let mut ingredient_type = if template.id == 0 {
        match document_store::get(db, DEFAULT_AVATAR_ID).await {
            Ok(_) => {}
            Err(StoreError::NotFound(_)) => {
                return Err(UpsertIngredientTypeError::NoDefaultAvatar)
            }
            Err(e) => return Err(UpsertIngredientTypeError::Store(e)),
        }
        IngredientType::new(&template.alias, DEFAULT_AVATAR_ID)
    } else {
        db.get_ingredient_type(template.id)
            .await?
            .ok_or(UpsertIngredientTypeError::NotFound(template.id))?
    };

    ingredient_type.base.version = template.version;
    ingredient_type.base.modified = now;
    ingredient_type.alias = template.alias;
    ingredient_type.description = template.description;
    ingredient_type.diet = template.diet.normalized();

    let id = if template.id == 0 {
        db.insert_ingredient_type(&ingredient_type)
            .await
            .map_err(unique_to_conflict)?
    } else {
        db.update_ingredient_type(&ingredient_type)
            .await
            .map_err(unique_to_conflict)?;
        ingredient_type.base.id
    };

    Ok((StatusCode::OK, Json(UpsertIngredientTypeResponse { id })))
}

fn unique_to_conflict(error: sqlx::Error) -> UpsertIngredientTypeError {
    if is_unique_violation(&error) {
        UpsertIngredientTypeError::AliasTaken
    } else {
        UpsertIngredientTypeError::Database(error)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum UpsertIngredientTypeError {
    #[error("only administrators may manage ingredient types")]
    Forbidden,
    #[error("the default avatar document is missing")]
    NoDefaultAvatar,
    #[error("no ingredient type with id {0}")]
    NotFound(i64),
    #[error("alias is already in use")]
    AliasTaken,
    #[error("store error: {0}")]
    Store(StoreError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl IntoResponse for UpsertIngredientTypeError {
    fn into_response(self) -> Response {
        let status = match &self {
            UpsertIngredientTypeError::Forbidden => StatusCode::FORBIDDEN,
            UpsertIngredientTypeError::NoDefaultAvatar => StatusCode::SERVICE_UNAVAILABLE,
            UpsertIngredientTypeError::NotFound(_) => StatusCode::NOT_FOUND,
            UpsertIngredientTypeError::AliasTaken => StatusCode::CONFLICT,
            UpsertIngredientTypeError::Store(_) | UpsertIngredientTypeError::Database(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, self.to_string()).into_response()
    }
}

// Client implementation - builds request for this operation
impl ApiRequest for UpsertIngredientTypeRequest {
    type Response = UpsertIngredientTypeResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> RequestBuilder {
        let full_url = base_url.join("/api/v0/ingredient-types").unwrap();
        client.post(full_url).json(&self)
    }
}
