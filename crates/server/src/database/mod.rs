//! SQLite database wrapper: connection pool, schema migrations, seed data.
//!
//! The schema composes the shared base columns (id, version, created,
//! modified) into every entity table; there is no inheritance tree. The
//! document table itself is owned by the `document-store` crate, which also
//! enforces the hash uniqueness the whole system relies on.

pub mod models;

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use thiserror::Error;
use tracing::info;
use url::Url;

/// Identity of the seeded system default avatar document, resolved by
/// entity constructors when no avatar is chosen.
pub const DEFAULT_AVATAR_ID: i64 = 1;

/// Seed avatar content: a 1x1 transparent PNG.
const DEFAULT_AVATAR_PNG: &[u8] = &[
    0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0x00, 0x00, 0x0d, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1f,
    0x15, 0xc4, 0x89, 0x00, 0x00, 0x00, 0x0d, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9c, 0x63, 0xf8,
    0xff, 0xff, 0x3f, 0x00, 0x05, 0xfe, 0x02, 0xfe, 0xa7, 0x35, 0x81, 0x84, 0x00, 0x00, 0x00,
    0x00, 0x49, 0x45, 0x4e, 0x44, 0xae, 0x42, 0x60, 0x82,
];

/// Email of the seeded administrator.
pub const SEED_ADMIN_EMAIL: &str = "admin@cookbook.local";

/// Whether a database error reports a violated `UNIQUE` constraint, e.g. a
/// taken email or recipe title.
pub(crate) fn is_unique_violation(error: &sqlx::Error) -> bool {
    error
        .as_database_error()
        .is_some_and(|e| e.is_unique_violation())
}

/// Database connection pool for all entities.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl std::ops::Deref for Database {
    type Target = SqlitePool;

    fn deref(&self) -> &Self::Target {
        &self.pool
    }
}

/// Errors that can occur when setting up the database.
#[derive(Debug, Error)]
pub enum DatabaseSetupError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] sqlx::Error),

    #[error("document store error: {0}")]
    DocumentStore(#[from] document_store::StoreError),
}

impl Database {
    /// Connect to the database at `url`, creating the file if missing.
    /// Migrations and seed data are applied automatically.
    pub async fn connect(url: &Url) -> Result<Self, DatabaseSetupError> {
        let in_memory = url.as_str().contains(":memory:");

        let options = SqliteConnectOptions::from_str(url.as_str())?
            .create_if_missing(true)
            .foreign_keys(true);

        // An in-memory SQLite database exists per connection; the pool must
        // hold exactly one so every handle sees the same data.
        let pool = SqlitePoolOptions::new()
            .max_connections(if in_memory { 1 } else { 5 })
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.run_migrations().await?;
        db.seed().await?;

        info!(%url, "database initialized");
        Ok(db)
    }

    /// Create all entity tables. Idempotent.
    async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        document_store::migrate(&self.pool).await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS person (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                version INTEGER NOT NULL,
                created INTEGER NOT NULL,
                modified INTEGER NOT NULL,
                email TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                group_alias TEXT NOT NULL,
                title TEXT,
                surname TEXT NOT NULL,
                forename TEXT NOT NULL,
                street TEXT NOT NULL,
                city TEXT NOT NULL,
                country TEXT NOT NULL,
                postcode TEXT NOT NULL,
                avatar_id INTEGER NOT NULL REFERENCES document (id)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS person_phone (
                person_id INTEGER NOT NULL REFERENCES person (id),
                phone TEXT NOT NULL,
                UNIQUE (person_id, phone)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS ingredient_type (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                version INTEGER NOT NULL,
                created INTEGER NOT NULL,
                modified INTEGER NOT NULL,
                alias TEXT NOT NULL UNIQUE,
                description TEXT,
                pescatarian INTEGER NOT NULL,
                lacto_ovo_vegetarian INTEGER NOT NULL,
                lacto_vegetarian INTEGER NOT NULL,
                vegan INTEGER NOT NULL,
                avatar_id INTEGER NOT NULL REFERENCES document (id)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS recipe (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                version INTEGER NOT NULL,
                created INTEGER NOT NULL,
                modified INTEGER NOT NULL,
                title TEXT NOT NULL UNIQUE,
                category TEXT NOT NULL,
                description TEXT,
                instruction TEXT,
                avatar_id INTEGER NOT NULL REFERENCES document (id),
                owner_id INTEGER REFERENCES person (id)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS recipe_illustration (
                recipe_id INTEGER NOT NULL REFERENCES recipe (id),
                document_id INTEGER NOT NULL REFERENCES document (id),
                UNIQUE (recipe_id, document_id)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS ingredient (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                version INTEGER NOT NULL,
                created INTEGER NOT NULL,
                modified INTEGER NOT NULL,
                amount REAL NOT NULL,
                unit TEXT NOT NULL,
                recipe_id INTEGER NOT NULL REFERENCES recipe (id),
                type_id INTEGER NOT NULL REFERENCES ingredient_type (id)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Seed the default avatar document and an initial administrator so a
    /// fresh database is immediately usable.
    async fn seed(&self) -> Result<(), DatabaseSetupError> {
        use sqlx::Row;

        let row = sqlx::query("SELECT COUNT(*) AS count FROM document")
            .fetch_one(&self.pool)
            .await?;
        let documents: i64 = row.get("count");
        if documents == 0 {
            let id = document_store::put(&self.pool, Some("image/png"), DEFAULT_AVATAR_PNG).await?;
            info!(id, "seeded default avatar document");
        }

        let row = sqlx::query("SELECT COUNT(*) AS count FROM person")
            .fetch_one(&self.pool)
            .await?;
        let people: i64 = row.get("count");
        if people == 0 {
            let admin = models::Person::new_admin(SEED_ADMIN_EMAIL, DEFAULT_AVATAR_ID);
            let id = self.insert_person(&admin, &[]).await?;
            info!(id, email = SEED_ADMIN_EMAIL, "seeded administrator");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::models::{Group, Person, Recipe};
    use super::*;

    async fn connect() -> Database {
        let url = Url::parse("sqlite::memory:").unwrap();
        Database::connect(&url).await.unwrap()
    }

    #[tokio::test]
    async fn seeds_default_avatar_and_admin() {
        let db = connect().await;

        let avatar = document_store::get(&db, DEFAULT_AVATAR_ID).await.unwrap();
        assert_eq!(avatar.content_type, "image/png");

        let admin = db
            .find_person_by_email(SEED_ADMIN_EMAIL)
            .await
            .unwrap()
            .expect("seeded admin");
        assert_eq!(admin.group, Group::Admin);
        assert_eq!(admin.avatar_id, DEFAULT_AVATAR_ID);
    }

    #[tokio::test]
    async fn person_round_trips_with_phones() {
        let db = connect().await;

        let person = Person::new("cook@example.org", DEFAULT_AVATAR_ID);
        let phones = vec!["123".to_string(), "456".to_string()];
        let id = db.insert_person(&person, &phones).await.unwrap();

        let loaded = db.get_person(id).await.unwrap().expect("person");
        assert_eq!(loaded.email, "cook@example.org");
        assert_eq!(loaded.base.version, 1);
        assert_eq!(db.person_phones(id).await.unwrap(), phones);

        let mut update = loaded.clone();
        update.base.version = 2;
        update.email = "chef@example.org".to_string();
        db.update_person(&update, &["789".to_string()]).await.unwrap();

        let loaded = db.get_person(id).await.unwrap().expect("person");
        assert_eq!(loaded.email, "chef@example.org");
        assert_eq!(loaded.base.created, person.base.created);
        assert_eq!(db.person_phones(id).await.unwrap(), vec!["789".to_string()]);
    }

    #[tokio::test]
    async fn duplicate_email_reports_unique_violation() {
        let db = connect().await;

        let person = Person::new("twin@example.org", DEFAULT_AVATAR_ID);
        db.insert_person(&person, &[]).await.unwrap();
        let error = db.insert_person(&person, &[]).await.unwrap_err();
        assert!(is_unique_violation(&error));
    }

    #[tokio::test]
    async fn recipe_diet_is_vacuously_true_without_ingredients() {
        let db = connect().await;
        let admin = db
            .find_person_by_email(SEED_ADMIN_EMAIL)
            .await
            .unwrap()
            .expect("seeded admin");

        let recipe = Recipe::new("Empty Plate", admin.base.id, DEFAULT_AVATAR_ID);
        let id = db.insert_recipe(&recipe).await.unwrap();

        let diet = db.recipe_diet(id).await.unwrap();
        assert!(diet.pescatarian && diet.vegan);
    }
}
