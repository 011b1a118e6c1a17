//! Insert-or-update endpoint for people. Administrators only.

use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use http::{HeaderMap, StatusCode};
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use document_store::StoreError;

use crate::database::models::{Address, Group, Person, PersonName};
use crate::database::{is_unique_violation, DEFAULT_AVATAR_ID};
use crate::http_server::api::client::ApiRequest;
use crate::http_server::auth::Requester;
use crate::state::ServiceState;

/// Header carrying a new password; kept out of the JSON body so templates
/// can be logged and echoed without leaking credentials.
pub const SET_PASSWORD_HEADER: &str = "x-set-password";

/// Person template; id 0 inserts, anything else updates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpsertPersonRequest {
    #[serde(default)]
    pub id: i64,
    #[serde(default = "default_version")]
    pub version: i64,
    pub email: String,
    #[serde(default = "default_group")]
    pub group: Group,
    pub name: PersonName,
    pub address: Address,
    #[serde(default)]
    pub phones: Vec<String>,
    /// Client side only, sent as the `X-Set-Password` header.
    #[serde(skip)]
    pub set_password: Option<String>,
}

fn default_version() -> i64 {
    1
}

fn default_group() -> Group {
    Group::User
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpsertPersonResponse {
    pub id: i64,
}

pub async fn handler(
    State(state): State<ServiceState>,
    Extension(requester): Extension<Requester>,
    headers: HeaderMap,
    Json(template): Json<UpsertPersonRequest>,
) -> Result<impl IntoResponse, UpsertPersonError> {
    if !requester.is_admin() {
        return Err(UpsertPersonError::Forbidden);
    }

    let password = headers
        .get(SET_PASSWORD_HEADER)
        .and_then(|value| value.to_str().ok());
    if password.is_some_and(|p| p.len() < 3) {
        return Err(UpsertPersonError::PasswordTooShort);
    }

    let db = state.database();
    let now = chrono::Utc::now().timestamp_millis();

    let mut person = if template.id == 0 {
        // a fresh person starts with the system default avatar
        match document_store::get(db, DEFAULT_AVATAR_ID).await {
            Ok(_) => {}
            Err(StoreError::NotFound(_)) => return Err(UpsertPersonError::NoDefaultAvatar),
            Err(e) => return Err(UpsertPersonError::Store(e)),
        }
        Person::new(&template.email, DEFAULT_AVATAR_ID)
    } else {
        db.get_person(template.id)
            .await?
            .ok_or(UpsertPersonError::NotFound(template.id))?
    };

    person.base.version = template.version;
    person.base.modified = now;
    person.email = template.email;
    person.group = template.group;
    person.name = template.name;
    person.address = template.address;
    if let Some(password) = password {
        person.password_hash = document_store::sha256_hex(password.as_bytes());
    }

    let id = if template.id == 0 {
        db.insert_person(&person, &template.phones)
            .await
            .map_err(unique_to_conflict)?
    } else {
        db.update_person(&person, &template.phones)
            .await
            .map_err(unique_to_conflict)?;
        person.base.id
    };

    Ok((StatusCode::OK, Json(UpsertPersonResponse { id })))
}

fn unique_to_conflict(error: sqlx::Error) -> UpsertPersonError {
    if is_unique_violation(&error) {
        UpsertPersonError::EmailTaken
    } else {
        UpsertPersonError::Database(error)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum UpsertPersonError {
    #[error("only administrators may manage people")]
    Forbidden,
    #[error("password must be at least 3 characters")]
    PasswordTooShort,
    #[error("the default avatar document is missing")]
    NoDefaultAvatar,
    #[error("no person with id {0}")]
    NotFound(i64),
    #[error("email is already in use")]
    EmailTaken,
    #[error("store error: {0}")]
    Store(StoreError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl IntoResponse for UpsertPersonError {
    fn into_response(self) -> Response {
        let status = match &self {
            UpsertPersonError::Forbidden => StatusCode::FORBIDDEN,
            UpsertPersonError::PasswordTooShort => StatusCode::BAD_REQUEST,
            UpsertPersonError::NoDefaultAvatar => StatusCode::SERVICE_UNAVAILABLE,
            UpsertPersonError::NotFound(_) => StatusCode::NOT_FOUND,
            UpsertPersonError::EmailTaken => StatusCode::CONFLICT,
            UpsertPersonError::Store(_) | UpsertPersonError::Database(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, self.to_string()).into_response()
    }
}

// Client implementation - builds request for this operation
impl ApiRequest for UpsertPersonRequest {
    type Response = UpsertPersonResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> RequestBuilder {
        let full_url = base_url.join("/api/v0/people").unwrap();
        let mut builder = client.post(full_url);
        if let Some(password) = &self.set_password {
            builder = builder.header(SET_PASSWORD_HEADER, password);
        }
        builder.json(&self)
    }
}
