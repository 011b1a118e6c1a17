// Service modules
pub mod config;
pub(crate) mod database;
pub mod http_server;
pub mod state;

// Re-exports for consumers (CLI, integration tests)
pub use config::Config;
pub use database::models::{
    Address, DietFlags, Group, Ingredient, IngredientTemplate, IngredientType, Person, PersonName,
    Recipe, RecipeCategory, Unit, DEFAULT_PASSWORD,
};
pub use database::{Database, DEFAULT_AVATAR_ID, SEED_ADMIN_EMAIL};
pub use http_server::api::{ApiClient, ApiError, ApiRequest};
pub use state::{ServiceState, StateSetupError};

/// Build info reported by the version endpoint.
pub fn build_info() -> http_server::health::BuildInfo {
    http_server::health::BuildInfo {
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }
}
