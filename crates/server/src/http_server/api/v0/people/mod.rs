//! Person endpoints.

use axum::routing::get;
use axum::Router;
use serde::{Deserialize, Serialize};

use crate::database::models::{Address, Group, Person, PersonName};
use crate::database::Database;
use crate::state::ServiceState;

mod create;
mod get_person;
mod list;

pub use create::{UpsertPersonRequest, UpsertPersonResponse};
pub use get_person::GetPersonRequest;
pub use list::ListPeopleRequest;

pub fn router(state: ServiceState) -> Router<ServiceState> {
    Router::new()
        .route("/", get(list::handler).post(create::handler))
        .route("/:id", get(get_person::handler))
        .with_state(state)
}

/// Person as reported by the API: no password hash, with the avatar and
/// owned-recipe references inlined.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonInfo {
    pub id: i64,
    pub version: i64,
    pub created: i64,
    pub modified: i64,
    pub email: String,
    pub group: Group,
    pub name: PersonName,
    pub address: Address,
    pub phones: Vec<String>,
    pub avatar_reference: i64,
    pub recipe_references: Vec<i64>,
}

pub(super) async fn person_info(db: &Database, person: Person) -> Result<PersonInfo, sqlx::Error> {
    let phones = db.person_phones(person.base.id).await?;
    let recipe_references = db.person_recipe_references(person.base.id).await?;

    Ok(PersonInfo {
        id: person.base.id,
        version: person.base.version,
        created: person.base.created,
        modified: person.base.modified,
        email: person.email,
        group: person.group,
        name: person.name,
        address: person.address,
        phones,
        avatar_reference: person.avatar_id,
        recipe_references,
    })
}
