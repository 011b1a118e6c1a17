use document_store::EntityBase;
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use thiserror::Error;

use crate::database::Database;

/// Measurement unit of an ingredient amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Unit {
    Litre,
    Gram,
    Teaspoon,
    Tablespoon,
    Pinch,
    Cup,
    Can,
    Tube,
    Bushel,
    Piece,
}

impl Unit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::Litre => "LITRE",
            Unit::Gram => "GRAM",
            Unit::Teaspoon => "TEASPOON",
            Unit::Tablespoon => "TABLESPOON",
            Unit::Pinch => "PINCH",
            Unit::Cup => "CUP",
            Unit::Can => "CAN",
            Unit::Tube => "TUBE",
            Unit::Bushel => "BUSHEL",
            Unit::Piece => "PIECE",
        }
    }
}

impl std::str::FromStr for Unit {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "LITRE" => Unit::Litre,
            "GRAM" => Unit::Gram,
            "TEASPOON" => Unit::Teaspoon,
            "TABLESPOON" => Unit::Tablespoon,
            "PINCH" => Unit::Pinch,
            "CUP" => Unit::Cup,
            "CAN" => Unit::Can,
            "TUBE" => Unit::Tube,
            "BUSHEL" => Unit::Bushel,
            _ => Unit::Piece,
        })
    }
}

/// An ingredient row, tied to its recipe for life.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ingredient {
    #[serde(flatten)]
    pub base: EntityBase,
    pub amount: f64,
    pub unit: Unit,
    pub recipe_id: i64,
    pub type_id: i64,
}

/// Submitted state for one ingredient of a recipe; id 0 creates a new row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngredientTemplate {
    #[serde(default)]
    pub id: i64,
    #[serde(default = "default_version")]
    pub version: i64,
    pub amount: f64,
    pub unit: Unit,
    pub type_reference: i64,
}

fn default_version() -> i64 {
    1
}

/// Errors from replacing a recipe's ingredient set.
#[derive(Debug, Error)]
pub enum IngredientUpdateError {
    #[error("no ingredient type with id {0}")]
    UnknownType(i64),

    #[error("no ingredient with id {0} in this recipe")]
    UnknownIngredient(i64),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Database {
    /// A recipe's ingredients, ordered by id.
    pub async fn ingredients_for_recipe(
        &self,
        recipe_id: i64,
    ) -> Result<Vec<Ingredient>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT id, version, created, modified, amount, unit, recipe_id, type_id
            FROM ingredient
            WHERE recipe_id = ?1
            ORDER BY id ASC
            "#,
        )
        .bind(recipe_id)
        .fetch_all(&**self)
        .await?;

        Ok(rows.iter().map(row_to_ingredient).collect())
    }

    /// Replace a recipe's ingredient set: templates with id 0 are inserted,
    /// the rest updated in place, and ingredients absent from the submitted
    /// set are removed. Runs as one transaction.
    pub async fn replace_recipe_ingredients(
        &self,
        recipe_id: i64,
        templates: &[IngredientTemplate],
    ) -> Result<(), IngredientUpdateError> {
        let now = chrono::Utc::now().timestamp_millis();
        let mut tx = self.begin().await?;
        let mut kept = Vec::with_capacity(templates.len());

        for template in templates {
            let type_exists =
                sqlx::query("SELECT 1 FROM ingredient_type WHERE id = ?1")
                    .bind(template.type_reference)
                    .fetch_optional(&mut *tx)
                    .await?
                    .is_some();
            if !type_exists {
                return Err(IngredientUpdateError::UnknownType(template.type_reference));
            }

            if template.id == 0 {
                let result = sqlx::query(
                    r#"
                    INSERT INTO ingredient (version, created, modified, amount, unit, recipe_id, type_id)
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                    "#,
                )
                .bind(template.version)
                .bind(now)
                .bind(now)
                .bind(template.amount)
                .bind(template.unit.as_str())
                .bind(recipe_id)
                .bind(template.type_reference)
                .execute(&mut *tx)
                .await?;
                kept.push(result.last_insert_rowid());
            } else {
                let result = sqlx::query(
                    r#"
                    UPDATE ingredient
                    SET version = ?1, modified = ?2, amount = ?3, unit = ?4, type_id = ?5
                    WHERE id = ?6 AND recipe_id = ?7
                    "#,
                )
                .bind(template.version)
                .bind(now)
                .bind(template.amount)
                .bind(template.unit.as_str())
                .bind(template.type_reference)
                .bind(template.id)
                .bind(recipe_id)
                .execute(&mut *tx)
                .await?;
                if result.rows_affected() == 0 {
                    return Err(IngredientUpdateError::UnknownIngredient(template.id));
                }
                kept.push(template.id);
            }
        }

        if kept.is_empty() {
            sqlx::query("DELETE FROM ingredient WHERE recipe_id = ?1")
                .bind(recipe_id)
                .execute(&mut *tx)
                .await?;
        } else {
            let placeholders = kept
                .iter()
                .enumerate()
                .map(|(i, _)| format!("?{}", i + 2))
                .collect::<Vec<_>>()
                .join(", ");
            let sql = format!(
                "DELETE FROM ingredient WHERE recipe_id = ?1 AND id NOT IN ({placeholders})"
            );
            let mut query = sqlx::query(&sql).bind(recipe_id);
            for id in &kept {
                query = query.bind(id);
            }
            query.execute(&mut *tx).await?;
        }

        tx.commit().await?;
        Ok(())
    }
}

fn row_to_ingredient(row: &SqliteRow) -> Ingredient {
    Ingredient {
        base: EntityBase {
            id: row.get("id"),
            version: row.get("version"),
            created: row.get("created"),
            modified: row.get("modified"),
        },
        amount: row.get("amount"),
        unit: row.get::<String, _>("unit").parse().unwrap_or(Unit::Piece),
        recipe_id: row.get("recipe_id"),
        type_id: row.get("type_id"),
    }
}
