//! Ingredient type avatar endpoints: negotiated fetch and admin re-upload.
//!
//! Uploaded images go through the document store, so re-uploading a known
//! image re-points the avatar at the existing document.

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

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateAvatarResponse {
    pub id: i64,
}

pub async fn get_handler(
    State(state): State<ServiceState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Result<Response, AvatarError> {
    let ingredient_type = state
        .database()
        .get_ingredient_type(id)
        .await?
        .ok_or(AvatarError::NotFound(id))?;

    let accept = headers
        .get(ACCEPT)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("image/*");
    let (content_type, content) =
        document_store::content_if_acceptable(state.database(), ingredient_type.avatar_id, accept)
            .await?;

    Ok((StatusCode::OK, [(CONTENT_TYPE, content_type)], content).into_response())
}

pub async fn put_handler(
    State(state): State<ServiceState>,
    Extension(requester): Extension<Requester>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, AvatarError> {
    let db = state.database();
    let mut ingredient_type = db
        .get_ingredient_type(id)
        .await?
        .ok_or(AvatarError::NotFound(id))?;

    if !requester.is_admin() {
        return Err(AvatarError::Forbidden);
    }

    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("application/octet-stream");
    if !document_store::is_acceptable(content_type, "image/*") {
        return Err(AvatarError::NotAnImage(content_type.to_string()));
    }

    let document_id = document_store::put(db, Some(content_type), &body).await?;

    ingredient_type.avatar_id = document_id;
    ingredient_type.base.modified = chrono::Utc::now().timestamp_millis();
    db.update_ingredient_type(&ingredient_type).await?;

    Ok((StatusCode::OK, Json(UpdateAvatarResponse { id: document_id })))
}

#[derive(Debug, thiserror::Error)]
pub enum AvatarError {
    #[error("no ingredient type with id {0}")]
    NotFound(i64),
    #[error("only administrators may change ingredient type avatars")]
    Forbidden,
    #[error("avatar content must be an image, got {0}")]
    NotAnImage(String),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl IntoResponse for AvatarError {
    fn into_response(self) -> Response {
        let status = match &self {
            AvatarError::NotFound(_) => StatusCode::NOT_FOUND,
            AvatarError::Forbidden => StatusCode::FORBIDDEN,
            AvatarError::NotAnImage(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            AvatarError::Store(e) => store_status(e),
            AvatarError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, self.to_string()).into_response()
    }
}
