use document_store::EntityBase;
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::database::Database;

/// Diet classification flags. The flags form an implication chain: vegan
/// implies lacto-vegetarian implies lacto-ovo-vegetarian implies
/// pescatarian.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DietFlags {
    #[serde(default)]
    pub pescatarian: bool,
    #[serde(default)]
    pub lacto_ovo_vegetarian: bool,
    #[serde(default)]
    pub lacto_vegetarian: bool,
    #[serde(default)]
    pub vegan: bool,
}

impl DietFlags {
    /// Close the flags under the implication chain, so the strongest
    /// submitted flag carries all weaker ones.
    pub fn normalized(self) -> Self {
        Self {
            pescatarian: self.pescatarian
                || self.lacto_ovo_vegetarian
                || self.lacto_vegetarian
                || self.vegan,
            lacto_ovo_vegetarian: self.lacto_ovo_vegetarian || self.lacto_vegetarian || self.vegan,
            lacto_vegetarian: self.lacto_vegetarian || self.vegan,
            vegan: self.vegan,
        }
    }
}

/// An ingredient type row.
#[derive(Debug, Clone, Serialize)]
pub struct IngredientType {
    #[serde(flatten)]
    pub base: EntityBase,
    pub alias: String,
    pub description: Option<String>,
    #[serde(flatten)]
    pub diet: DietFlags,
    pub avatar_id: i64,
}

impl IngredientType {
    pub fn new(alias: &str, avatar_id: i64) -> Self {
        Self {
            base: EntityBase::fresh(chrono::Utc::now().timestamp_millis()),
            alias: alias.to_string(),
            description: None,
            diet: DietFlags::default(),
            avatar_id,
        }
    }
}

/// Optional AND-combined ingredient type query filters.
#[derive(Debug, Clone, Default)]
pub struct IngredientTypeFilter {
    pub min_created: Option<i64>,
    pub max_created: Option<i64>,
    pub min_modified: Option<i64>,
    pub max_modified: Option<i64>,
    pub alias: Option<String>,
    pub description_fragment: Option<String>,
    pub pescatarian: Option<bool>,
    pub lacto_ovo_vegetarian: Option<bool>,
    pub lacto_vegetarian: Option<bool>,
    pub vegan: Option<bool>,
}

const INGREDIENT_TYPE_COLUMNS: &str = r#"
    id, version, created, modified, alias, description, pescatarian,
    lacto_ovo_vegetarian, lacto_vegetarian, vegan, avatar_id
"#;

impl Database {
    /// Insert an ingredient type, returning the new id.
    pub async fn insert_ingredient_type(
        &self,
        ingredient_type: &IngredientType,
    ) -> Result<i64, sqlx::Error> {
        let diet = ingredient_type.diet.normalized();
        let result = sqlx::query(
            r#"
            INSERT INTO ingredient_type (
                version, created, modified, alias, description, pescatarian,
                lacto_ovo_vegetarian, lacto_vegetarian, vegan, avatar_id
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(ingredient_type.base.version)
        .bind(ingredient_type.base.created)
        .bind(ingredient_type.base.modified)
        .bind(&ingredient_type.alias)
        .bind(ingredient_type.description.as_deref())
        .bind(diet.pescatarian)
        .bind(diet.lacto_ovo_vegetarian)
        .bind(diet.lacto_vegetarian)
        .bind(diet.vegan)
        .bind(ingredient_type.avatar_id)
        .execute(&**self)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Update an ingredient type row.
    pub async fn update_ingredient_type(
        &self,
        ingredient_type: &IngredientType,
    ) -> Result<(), sqlx::Error> {
        let diet = ingredient_type.diet.normalized();
        sqlx::query(
            r#"
            UPDATE ingredient_type
            SET version = ?1, modified = ?2, alias = ?3, description = ?4,
                pescatarian = ?5, lacto_ovo_vegetarian = ?6,
                lacto_vegetarian = ?7, vegan = ?8, avatar_id = ?9
            WHERE id = ?10
            "#,
        )
        .bind(ingredient_type.base.version)
        .bind(ingredient_type.base.modified)
        .bind(&ingredient_type.alias)
        .bind(ingredient_type.description.as_deref())
        .bind(diet.pescatarian)
        .bind(diet.lacto_ovo_vegetarian)
        .bind(diet.lacto_vegetarian)
        .bind(diet.vegan)
        .bind(ingredient_type.avatar_id)
        .bind(ingredient_type.base.id)
        .execute(&**self)
        .await?;

        Ok(())
    }

    /// Get an ingredient type by id.
    pub async fn get_ingredient_type(
        &self,
        id: i64,
    ) -> Result<Option<IngredientType>, sqlx::Error> {
        let row = sqlx::query(&format!(
            "SELECT {INGREDIENT_TYPE_COLUMNS} FROM ingredient_type WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&**self)
        .await?;

        Ok(row.map(|r| row_to_ingredient_type(&r)))
    }

    /// Query ingredient types matching `filter`, ordered by id.
    pub async fn query_ingredient_types(
        &self,
        filter: &IngredientTypeFilter,
        offset: Option<i64>,
        limit: Option<i64>,
    ) -> Result<Vec<IngredientType>, sqlx::Error> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {INGREDIENT_TYPE_COLUMNS} FROM ingredient_type
            WHERE (?1 IS NULL OR created >= ?1)
              AND (?2 IS NULL OR created <= ?2)
              AND (?3 IS NULL OR modified >= ?3)
              AND (?4 IS NULL OR modified <= ?4)
              AND (?5 IS NULL OR alias = ?5)
              AND (?6 IS NULL OR description LIKE '%' || ?6 || '%')
              AND (?7 IS NULL OR pescatarian = ?7)
              AND (?8 IS NULL OR lacto_ovo_vegetarian = ?8)
              AND (?9 IS NULL OR lacto_vegetarian = ?9)
              AND (?10 IS NULL OR vegan = ?10)
            ORDER BY id ASC
            LIMIT ?11 OFFSET ?12
            "#
        ))
        .bind(filter.min_created)
        .bind(filter.max_created)
        .bind(filter.min_modified)
        .bind(filter.max_modified)
        .bind(filter.alias.as_deref())
        .bind(filter.description_fragment.as_deref())
        .bind(filter.pescatarian)
        .bind(filter.lacto_ovo_vegetarian)
        .bind(filter.lacto_vegetarian)
        .bind(filter.vegan)
        .bind(limit.unwrap_or(-1))
        .bind(offset.unwrap_or(0))
        .fetch_all(&**self)
        .await?;

        Ok(rows.iter().map(row_to_ingredient_type).collect())
    }
}

fn row_to_ingredient_type(row: &SqliteRow) -> IngredientType {
    IngredientType {
        base: EntityBase {
            id: row.get("id"),
            version: row.get("version"),
            created: row.get("created"),
            modified: row.get("modified"),
        },
        alias: row.get("alias"),
        description: row.get("description"),
        diet: DietFlags {
            pescatarian: row.get::<i64, _>("pescatarian") != 0,
            lacto_ovo_vegetarian: row.get::<i64, _>("lacto_ovo_vegetarian") != 0,
            lacto_vegetarian: row.get::<i64, _>("lacto_vegetarian") != 0,
            vegan: row.get::<i64, _>("vegan") != 0,
        },
        avatar_id: row.get("avatar_id"),
    }
}
