//! Recipe endpoints.

use axum::routing::get;
use axum::Router;
use serde::{Deserialize, Serialize};

use crate::database::models::{DietFlags, Recipe, RecipeCategory};
use crate::database::Database;
use crate::http_server::auth::Requester;
use crate::state::ServiceState;

mod avatar;
mod create;
mod get_recipe;
mod illustrations;
mod ingredients;
mod list;

pub use avatar::UpdateRecipeAvatarResponse;
pub use create::{UpsertRecipeRequest, UpsertRecipeResponse};
pub use get_recipe::GetRecipeRequest;
pub use illustrations::{GetIllustrationsRequest, SetIllustrationsRequest};
pub use ingredients::{GetIngredientsRequest, SetIngredientsRequest};
pub use list::ListRecipesRequest;

pub fn router(state: ServiceState) -> Router<ServiceState> {
    Router::new()
        .route("/", get(list::handler).post(create::handler))
        .route("/:id", get(get_recipe::handler))
        .route(
            "/:id/avatar",
            get(avatar::get_handler).put(avatar::put_handler),
        )
        .route(
            "/:id/ingredients",
            get(ingredients::get_handler).put(ingredients::put_handler),
        )
        .route(
            "/:id/illustration-references",
            get(illustrations::get_handler).put(illustrations::put_handler),
        )
        .with_state(state)
}

/// Recipe as reported by the API, with references and derived diet flags
/// inlined.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeInfo {
    pub id: i64,
    pub version: i64,
    pub created: i64,
    pub modified: i64,
    pub title: String,
    pub category: RecipeCategory,
    pub description: Option<String>,
    pub instruction: Option<String>,
    pub avatar_reference: i64,
    pub owner_reference: Option<i64>,
    pub ingredient_references: Vec<i64>,
    pub illustration_references: Vec<i64>,
    #[serde(flatten)]
    pub diet: DietFlags,
}

pub(super) async fn recipe_info(db: &Database, recipe: Recipe) -> Result<RecipeInfo, sqlx::Error> {
    let ingredient_references = db
        .ingredients_for_recipe(recipe.base.id)
        .await?
        .into_iter()
        .map(|ingredient| ingredient.base.id)
        .collect();
    let illustration_references = db.recipe_illustration_references(recipe.base.id).await?;
    let diet = db.recipe_diet(recipe.base.id).await?;

    Ok(RecipeInfo {
        id: recipe.base.id,
        version: recipe.base.version,
        created: recipe.base.created,
        modified: recipe.base.modified,
        title: recipe.title,
        category: recipe.category,
        description: recipe.description,
        instruction: recipe.instruction,
        avatar_reference: recipe.avatar_id,
        owner_reference: recipe.owner_id,
        ingredient_references,
        illustration_references,
        diet,
    })
}

/// An authenticated caller may modify a recipe when they own it, when it is
/// ownerless, or when they are an administrator.
pub(super) fn may_modify(recipe: &Recipe, requester: &Requester) -> bool {
    requester.is_admin() || recipe.owner_id.map_or(true, |owner| owner == requester.id)
}
