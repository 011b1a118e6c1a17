//! Ingredient type endpoints.

use axum::routing::get;
use axum::Router;
use serde::{Deserialize, Serialize};

use crate::database::models::{DietFlags, IngredientType};
use crate::state::ServiceState;

mod avatar;
mod create;
mod get_type;
mod list;

pub use avatar::UpdateAvatarResponse;
pub use create::{UpsertIngredientTypeRequest, UpsertIngredientTypeResponse};
pub use get_type::GetIngredientTypeRequest;
pub use list::ListIngredientTypesRequest;

pub fn router(state: ServiceState) -> Router<ServiceState> {
    Router::new()
        .route("/", get(list::handler).post(create::handler))
        .route("/:id", get(get_type::handler))
        .route(
            "/:id/avatar",
            get(avatar::get_handler).put(avatar::put_handler),
        )
        .with_state(state)
}

/// Ingredient type as reported by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngredientTypeInfo {
    pub id: i64,
    pub version: i64,
    pub created: i64,
    pub modified: i64,
    pub alias: String,
    pub description: Option<String>,
    #[serde(flatten)]
    pub diet: DietFlags,
    pub avatar_reference: i64,
}

impl From<IngredientType> for IngredientTypeInfo {
    fn from(ingredient_type: IngredientType) -> Self {
        Self {
            id: ingredient_type.base.id,
            version: ingredient_type.base.version,
            created: ingredient_type.base.created,
            modified: ingredient_type.base.modified,
            alias: ingredient_type.alias,
            description: ingredient_type.description,
            diet: ingredient_type.diet,
            avatar_reference: ingredient_type.avatar_id,
        }
    }
}
