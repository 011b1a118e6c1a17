//! Recipe avatar endpoints: negotiated fetch and owner re-upload.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use http::header::{ACCEPT, CONTENT_TYPE};
use http::{HeaderMap, StatusCode};
use serde::{Deserialize, Serialize};

use document_store::StoreError;

use crate::http_server::api::v0::store_status;
use crate::http_server::auth::Requester;
use crate::state::ServiceState;

use super::may_modify;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateRecipeAvatarResponse {
    pub id: i64,
}

pub async fn get_handler(
    State(state): State<ServiceState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Result<Response, RecipeAvatarError> {
    let recipe = state
        .database()
        .get_recipe(id)
        .await?
        .ok_or(RecipeAvatarError::NotFound(id))?;

    let accept = headers
        .get(ACCEPT)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("image/*");
    let (content_type, content) =
        document_store::content_if_acceptable(state.database(), recipe.avatar_id, accept).await?;

    Ok((StatusCode::OK, [(CONTENT_TYPE, content_type)], content).into_response())
}

pub async fn put_handler(
    State(state): State<ServiceState>,
    Extension(requester): Extension<Requester>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, RecipeAvatarError> {
    let db = state.database();
    let mut recipe = db
        .get_recipe(id)
        .await?
        .ok_or(RecipeAvatarError::NotFound(id))?;

    if !may_modify(&recipe, &requester) {
        return Err(RecipeAvatarError::Forbidden);
    }

    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("application/octet-stream");
    if !document_store::is_acceptable(content_type, "image/*") {
        return Err(RecipeAvatarError::NotAnImage(content_type.to_string()));
    }

    let document_id = document_store::put(db, Some(content_type), &body).await?;

    recipe.avatar_id = document_id;
    recipe.base.modified = chrono::Utc::now().timestamp_millis();
    db.update_recipe(&recipe).await?;

    Ok((
        StatusCode::OK,
        Json(UpdateRecipeAvatarResponse { id: document_id }),
    ))
}

#[derive(Debug, thiserror::Error)]
pub enum RecipeAvatarError {
    #[error("no recipe with id {0}")]
    NotFound(i64),
    #[error("recipes may only be changed by their owner or an administrator")]
    Forbidden,
    #[error("avatar content must be an image, got {0}")]
    NotAnImage(String),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl IntoResponse for RecipeAvatarError {
    fn into_response(self) -> Response {
        let status = match &self {
            RecipeAvatarError::NotFound(_) => StatusCode::NOT_FOUND,
            RecipeAvatarError::Forbidden => StatusCode::FORBIDDEN,
            RecipeAvatarError::NotAnImage(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            RecipeAvatarError::Store(e) => store_status(e),
            RecipeAvatarError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, self.to_string()).into_response()
    }
}
