//! Entity row structs and their query methods on [`crate::database::Database`].

mod ingredient;
mod ingredient_type;
mod person;
mod recipe;

pub use ingredient::{Ingredient, IngredientTemplate, IngredientUpdateError, Unit};
pub use ingredient_type::{DietFlags, IngredientType, IngredientTypeFilter};
pub use person::{Address, Group, Person, PersonFilter, PersonName, DEFAULT_PASSWORD};
pub use recipe::{Recipe, RecipeCategory, RecipeFilter};
