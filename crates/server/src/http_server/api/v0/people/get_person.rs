//! Get person endpoint; id 0 resolves to the authenticated requester.

use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use http::StatusCode;
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use super::{person_info, PersonInfo};
use crate::http_server::api::client::ApiRequest;
use crate::http_server::auth::Requester;
use crate::state::ServiceState;

/// Request for one person; id 0 means "whoever I am".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetPersonRequest {
    pub id: i64,
}

pub async fn handler(
    State(state): State<ServiceState>,
    Extension(requester): Extension<Requester>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, GetPersonError> {
    let id = if id == 0 { requester.id } else { id };

    let person = state
        .database()
        .get_person(id)
        .await?
        .ok_or(GetPersonError::NotFound(id))?;
    let info = person_info(state.database(), person).await?;

    Ok((StatusCode::OK, Json(info)))
}

#[derive(Debug, thiserror::Error)]
pub enum GetPersonError {
    #[error("no person with id {0}")]
    NotFound(i64),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl IntoResponse for GetPersonError {
    fn into_response(self) -> Response {
        let status = match &self {
            GetPersonError::NotFound(_) => StatusCode::NOT_FOUND,
            GetPersonError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, self.to_string()).into_response()
    }
}

// Client implementation - builds request for this operation
impl ApiRequest for GetPersonRequest {
    type Response = PersonInfo;

    fn build_request(self, base_url: &Url, client: &Client) -> RequestBuilder {
        let full_url = base_url
            .join(&format!("/api/v0/people/{}", self.id))
            .unwrap();
        client.get(full_url)
    }
}
