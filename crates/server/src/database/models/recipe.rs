use document_store::EntityBase;
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::database::models::DietFlags;
use crate::database::Database;

/// Recipe category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecipeCategory {
    MainCourse,
    Appetizer,
    Snack,
    Dessert,
    Breakfast,
    Buffet,
    Barbeque,
    Adolescent,
    Infant,
}

impl RecipeCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecipeCategory::MainCourse => "MAIN_COURSE",
            RecipeCategory::Appetizer => "APPETIZER",
            RecipeCategory::Snack => "SNACK",
            RecipeCategory::Dessert => "DESSERT",
            RecipeCategory::Breakfast => "BREAKFAST",
            RecipeCategory::Buffet => "BUFFET",
            RecipeCategory::Barbeque => "BARBEQUE",
            RecipeCategory::Adolescent => "ADOLESCENT",
            RecipeCategory::Infant => "INFANT",
        }
    }
}

impl std::str::FromStr for RecipeCategory {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "APPETIZER" => RecipeCategory::Appetizer,
            "SNACK" => RecipeCategory::Snack,
            "DESSERT" => RecipeCategory::Dessert,
            "BREAKFAST" => RecipeCategory::Breakfast,
            "BUFFET" => RecipeCategory::Buffet,
            "BARBEQUE" => RecipeCategory::Barbeque,
            "ADOLESCENT" => RecipeCategory::Adolescent,
            "INFANT" => RecipeCategory::Infant,
            _ => RecipeCategory::MainCourse,
        })
    }
}

/// A recipe row.
#[derive(Debug, Clone, Serialize)]
pub struct Recipe {
    #[serde(flatten)]
    pub base: EntityBase,
    pub title: String,
    pub category: RecipeCategory,
    pub description: Option<String>,
    pub instruction: Option<String>,
    pub avatar_id: i64,
    pub owner_id: Option<i64>,
}

impl Recipe {
    /// A fresh recipe owned by `owner_id` with the default category.
    pub fn new(title: &str, owner_id: i64, avatar_id: i64) -> Self {
        Self {
            base: EntityBase::fresh(chrono::Utc::now().timestamp_millis()),
            title: title.to_string(),
            category: RecipeCategory::MainCourse,
            description: None,
            instruction: None,
            avatar_id,
            owner_id: Some(owner_id),
        }
    }
}

/// Optional AND-combined recipe query filters. The diet flags use
/// all-ingredients semantics: a recipe qualifies when every one of its
/// ingredients' types carries the flag (vacuously for no ingredients).
#[derive(Debug, Clone, Default)]
pub struct RecipeFilter {
    pub min_created: Option<i64>,
    pub max_created: Option<i64>,
    pub min_modified: Option<i64>,
    pub max_modified: Option<i64>,
    pub title: Option<String>,
    pub category: Option<RecipeCategory>,
    pub description_fragment: Option<String>,
    pub instruction_fragment: Option<String>,
    pub pescatarian: Option<bool>,
    pub lacto_ovo_vegetarian: Option<bool>,
    pub lacto_vegetarian: Option<bool>,
    pub vegan: Option<bool>,
    pub owner_email: Option<String>,
}

const RECIPE_COLUMNS: &str = r#"
    id, version, created, modified, title, category, description,
    instruction, avatar_id, owner_id
"#;

impl Database {
    /// Insert a recipe, returning the new id.
    pub async fn insert_recipe(&self, recipe: &Recipe) -> Result<i64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO recipe (
                version, created, modified, title, category, description,
                instruction, avatar_id, owner_id
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(recipe.base.version)
        .bind(recipe.base.created)
        .bind(recipe.base.modified)
        .bind(&recipe.title)
        .bind(recipe.category.as_str())
        .bind(recipe.description.as_deref())
        .bind(recipe.instruction.as_deref())
        .bind(recipe.avatar_id)
        .bind(recipe.owner_id)
        .execute(&**self)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Update a recipe row.
    pub async fn update_recipe(&self, recipe: &Recipe) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE recipe
            SET version = ?1, modified = ?2, title = ?3, category = ?4,
                description = ?5, instruction = ?6, avatar_id = ?7, owner_id = ?8
            WHERE id = ?9
            "#,
        )
        .bind(recipe.base.version)
        .bind(recipe.base.modified)
        .bind(&recipe.title)
        .bind(recipe.category.as_str())
        .bind(recipe.description.as_deref())
        .bind(recipe.instruction.as_deref())
        .bind(recipe.avatar_id)
        .bind(recipe.owner_id)
        .bind(recipe.base.id)
        .execute(&**self)
        .await?;

        Ok(())
    }

    /// Get a recipe by id.
    pub async fn get_recipe(&self, id: i64) -> Result<Option<Recipe>, sqlx::Error> {
        let row = sqlx::query(&format!(
            "SELECT {RECIPE_COLUMNS} FROM recipe WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&**self)
        .await?;

        Ok(row.map(|r| row_to_recipe(&r)))
    }

    /// Query recipes matching `filter`, ordered by id, with pagination.
    pub async fn query_recipes(
        &self,
        filter: &RecipeFilter,
        offset: Option<i64>,
        limit: Option<i64>,
    ) -> Result<Vec<Recipe>, sqlx::Error> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {RECIPE_COLUMNS} FROM recipe AS r
            WHERE (?1 IS NULL OR r.created >= ?1)
              AND (?2 IS NULL OR r.created <= ?2)
              AND (?3 IS NULL OR r.modified >= ?3)
              AND (?4 IS NULL OR r.modified <= ?4)
              AND (?5 IS NULL OR r.title = ?5)
              AND (?6 IS NULL OR r.category = ?6)
              AND (?7 IS NULL OR r.description LIKE '%' || ?7 || '%')
              AND (?8 IS NULL OR r.instruction LIKE '%' || ?8 || '%')
              AND (?9 IS NULL OR (NOT EXISTS (
                    SELECT 1 FROM ingredient AS i
                    JOIN ingredient_type AS t ON t.id = i.type_id
                    WHERE i.recipe_id = r.id AND t.pescatarian = 0)) = ?9)
              AND (?10 IS NULL OR (NOT EXISTS (
                    SELECT 1 FROM ingredient AS i
                    JOIN ingredient_type AS t ON t.id = i.type_id
                    WHERE i.recipe_id = r.id AND t.lacto_ovo_vegetarian = 0)) = ?10)
              AND (?11 IS NULL OR (NOT EXISTS (
                    SELECT 1 FROM ingredient AS i
                    JOIN ingredient_type AS t ON t.id = i.type_id
                    WHERE i.recipe_id = r.id AND t.lacto_vegetarian = 0)) = ?11)
              AND (?12 IS NULL OR (NOT EXISTS (
                    SELECT 1 FROM ingredient AS i
                    JOIN ingredient_type AS t ON t.id = i.type_id
                    WHERE i.recipe_id = r.id AND t.vegan = 0)) = ?12)
              AND (?13 IS NULL OR EXISTS (
                    SELECT 1 FROM person AS p
                    WHERE p.id = r.owner_id AND p.email = ?13))
            ORDER BY r.id ASC
            LIMIT ?14 OFFSET ?15
            "#
        ))
        .bind(filter.min_created)
        .bind(filter.max_created)
        .bind(filter.min_modified)
        .bind(filter.max_modified)
        .bind(filter.title.as_deref())
        .bind(filter.category.map(|c| c.as_str()))
        .bind(filter.description_fragment.as_deref())
        .bind(filter.instruction_fragment.as_deref())
        .bind(filter.pescatarian)
        .bind(filter.lacto_ovo_vegetarian)
        .bind(filter.lacto_vegetarian)
        .bind(filter.vegan)
        .bind(filter.owner_email.as_deref())
        .bind(limit.unwrap_or(-1))
        .bind(offset.unwrap_or(0))
        .fetch_all(&**self)
        .await?;

        Ok(rows.iter().map(row_to_recipe).collect())
    }

    /// Diet flags a recipe satisfies, each true when all of the recipe's
    /// ingredient types carry it.
    pub async fn recipe_diet(&self, id: i64) -> Result<DietFlags, sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT
                NOT EXISTS (SELECT 1 FROM ingredient AS i
                    JOIN ingredient_type AS t ON t.id = i.type_id
                    WHERE i.recipe_id = ?1 AND t.pescatarian = 0) AS pescatarian,
                NOT EXISTS (SELECT 1 FROM ingredient AS i
                    JOIN ingredient_type AS t ON t.id = i.type_id
                    WHERE i.recipe_id = ?1 AND t.lacto_ovo_vegetarian = 0) AS lacto_ovo_vegetarian,
                NOT EXISTS (SELECT 1 FROM ingredient AS i
                    JOIN ingredient_type AS t ON t.id = i.type_id
                    WHERE i.recipe_id = ?1 AND t.lacto_vegetarian = 0) AS lacto_vegetarian,
                NOT EXISTS (SELECT 1 FROM ingredient AS i
                    JOIN ingredient_type AS t ON t.id = i.type_id
                    WHERE i.recipe_id = ?1 AND t.vegan = 0) AS vegan
            "#,
        )
        .bind(id)
        .fetch_one(&**self)
        .await?;

        Ok(DietFlags {
            pescatarian: row.get::<i64, _>("pescatarian") != 0,
            lacto_ovo_vegetarian: row.get::<i64, _>("lacto_ovo_vegetarian") != 0,
            lacto_vegetarian: row.get::<i64, _>("lacto_vegetarian") != 0,
            vegan: row.get::<i64, _>("vegan") != 0,
        })
    }

    /// Ids of the documents illustrating a recipe, ascending.
    pub async fn recipe_illustration_references(&self, id: i64) -> Result<Vec<i64>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT document_id FROM recipe_illustration
            WHERE recipe_id = ?1
            ORDER BY document_id ASC
            "#,
        )
        .bind(id)
        .fetch_all(&**self)
        .await?;

        Ok(rows.iter().map(|r| r.get("document_id")).collect())
    }

    /// Replace a recipe's illustration associations wholesale.
    pub async fn set_recipe_illustrations(
        &self,
        id: i64,
        document_ids: &[i64],
    ) -> Result<(), sqlx::Error> {
        let mut tx = self.begin().await?;

        sqlx::query("DELETE FROM recipe_illustration WHERE recipe_id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        for document_id in document_ids {
            sqlx::query(
                "INSERT OR IGNORE INTO recipe_illustration (recipe_id, document_id) VALUES (?1, ?2)",
            )
            .bind(id)
            .bind(document_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}

fn row_to_recipe(row: &SqliteRow) -> Recipe {
    Recipe {
        base: EntityBase {
            id: row.get("id"),
            version: row.get("version"),
            created: row.get("created"),
            modified: row.get("modified"),
        },
        title: row.get("title"),
        category: row
            .get::<String, _>("category")
            .parse()
            .unwrap_or(RecipeCategory::MainCourse),
        description: row.get("description"),
        instruction: row.get("instruction"),
        avatar_id: row.get("avatar_id"),
        owner_id: row.get("owner_id"),
    }
}
