//! Filtered person query endpoint.

use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use http::StatusCode;
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use super::{person_info, PersonInfo};
use crate::database::models::{Group, PersonFilter};
use crate::http_server::api::client::ApiRequest;
use crate::state::ServiceState;

/// Query parameters; absent means unconstrained.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListPeopleRequest {
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
    pub email: Option<String>,
    #[serde(rename = "email-fragment", skip_serializing_if = "Option::is_none")]
    pub email_fragment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<Group>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub surname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postcode: Option<String>,
}

pub async fn handler(
    State(state): State<ServiceState>,
    Query(params): Query<ListPeopleRequest>,
) -> Result<impl IntoResponse, ListPeopleError> {
    let filter = PersonFilter {
        min_created: params.min_created,
        max_created: params.max_created,
        min_modified: params.min_modified,
        max_modified: params.max_modified,
        email: params.email,
        email_fragment: params.email_fragment,
        group: params.group,
        title: params.title,
        surname: params.surname,
        forename: params.forename,
        street: params.street,
        city: params.city,
        country: params.country,
        postcode: params.postcode,
    };

    let db = state.database();
    let people = db
        .query_people(&filter, params.result_offset, params.result_size)
        .await?;

    let infos =
        futures::future::try_join_all(people.into_iter().map(|person| person_info(db, person)))
            .await?;

    Ok((StatusCode::OK, Json(infos)))
}

#[derive(Debug, thiserror::Error)]
pub enum ListPeopleError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl IntoResponse for ListPeopleError {
    fn into_response(self) -> Response {
        match self {
            ListPeopleError::Database(e) => {
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
            }
        }
    }
}

// Client implementation - builds request for this operation
impl ApiRequest for ListPeopleRequest {
    type Response = Vec<PersonInfo>;

    fn build_request(self, base_url: &Url, client: &Client) -> RequestBuilder {
        let full_url = base_url.join("/api/v0/people").unwrap();
        client.get(full_url).query(&self)
    }
}
