use document_store::EntityBase;
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::database::Database;

/// Password assigned to newly created people until one is set explicitly.
pub const DEFAULT_PASSWORD: &str = "changeit";

/// Privilege group of a person.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Group {
    User,
    Admin,
}

impl Group {
    pub fn as_str(&self) -> &'static str {
        match self {
            Group::User => "USER",
            Group::Admin => "ADMIN",
        }
    }
}

impl std::str::FromStr for Group {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "ADMIN" => Group::Admin,
            _ => Group::User,
        })
    }
}

/// Name value embedded in a person row.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersonName {
    #[serde(default)]
    pub title: Option<String>,
    pub family: String,
    pub given: String,
}

/// Address value embedded in a person row.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub country: String,
    pub postcode: String,
}

/// A person row. The password hash never leaves the server.
#[derive(Debug, Clone, Serialize)]
pub struct Person {
    #[serde(flatten)]
    pub base: EntityBase,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub group: Group,
    pub name: PersonName,
    pub address: Address,
    pub avatar_id: i64,
}

impl Person {
    /// A fresh person with the default password hash and USER privileges.
    pub fn new(email: &str, avatar_id: i64) -> Self {
        Self {
            base: EntityBase::fresh(chrono::Utc::now().timestamp_millis()),
            email: email.to_string(),
            password_hash: document_store::sha256_hex(DEFAULT_PASSWORD.as_bytes()),
            group: Group::User,
            name: PersonName::default(),
            address: Address::default(),
            avatar_id,
        }
    }

    pub fn new_admin(email: &str, avatar_id: i64) -> Self {
        Self {
            group: Group::Admin,
            ..Self::new(email, avatar_id)
        }
    }
}

/// Optional AND-combined person query filters.
#[derive(Debug, Clone, Default)]
pub struct PersonFilter {
    pub min_created: Option<i64>,
    pub max_created: Option<i64>,
    pub min_modified: Option<i64>,
    pub max_modified: Option<i64>,
    pub email: Option<String>,
    pub email_fragment: Option<String>,
    pub group: Option<Group>,
    pub title: Option<String>,
    pub surname: Option<String>,
    pub forename: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub postcode: Option<String>,
}

const PERSON_COLUMNS: &str = r#"
    id, version, created, modified, email, password_hash, group_alias,
    title, surname, forename, street, city, country, postcode, avatar_id
"#;

impl Database {
    /// Insert a person and their phone numbers, returning the new id.
    pub async fn insert_person(
        &self,
        person: &Person,
        phones: &[String],
    ) -> Result<i64, sqlx::Error> {
        let mut tx = self.begin().await?;

        let result = sqlx::query(
            r#"
            INSERT INTO person (
                version, created, modified, email, password_hash, group_alias,
                title, surname, forename, street, city, country, postcode, avatar_id
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
            "#,
        )
        .bind(person.base.version)
        .bind(person.base.created)
        .bind(person.base.modified)
        .bind(&person.email)
        .bind(&person.password_hash)
        .bind(person.group.as_str())
        .bind(person.name.title.as_deref())
        .bind(&person.name.family)
        .bind(&person.name.given)
        .bind(&person.address.street)
        .bind(&person.address.city)
        .bind(&person.address.country)
        .bind(&person.address.postcode)
        .bind(person.avatar_id)
        .execute(&mut *tx)
        .await?;

        let id = result.last_insert_rowid();
        for phone in phones {
            sqlx::query("INSERT OR IGNORE INTO person_phone (person_id, phone) VALUES (?1, ?2)")
                .bind(id)
                .bind(phone)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(id)
    }

    /// Update a person and replace their phone numbers wholesale.
    pub async fn update_person(
        &self,
        person: &Person,
        phones: &[String],
    ) -> Result<(), sqlx::Error> {
        let mut tx = self.begin().await?;

        sqlx::query(
            r#"
            UPDATE person
            SET version = ?1, modified = ?2, email = ?3, password_hash = ?4,
                group_alias = ?5, title = ?6, surname = ?7, forename = ?8,
                street = ?9, city = ?10, country = ?11, postcode = ?12,
                avatar_id = ?13
            WHERE id = ?14
            "#,
        )
        .bind(person.base.version)
        .bind(person.base.modified)
        .bind(&person.email)
        .bind(&person.password_hash)
        .bind(person.group.as_str())
        .bind(person.name.title.as_deref())
        .bind(&person.name.family)
        .bind(&person.name.given)
        .bind(&person.address.street)
        .bind(&person.address.city)
        .bind(&person.address.country)
        .bind(&person.address.postcode)
        .bind(person.avatar_id)
        .bind(person.base.id)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM person_phone WHERE person_id = ?1")
            .bind(person.base.id)
            .execute(&mut *tx)
            .await?;
        for phone in phones {
            sqlx::query("INSERT OR IGNORE INTO person_phone (person_id, phone) VALUES (?1, ?2)")
                .bind(person.base.id)
                .bind(phone)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Get a person by id.
    pub async fn get_person(&self, id: i64) -> Result<Option<Person>, sqlx::Error> {
        let row = sqlx::query(&format!(
            "SELECT {PERSON_COLUMNS} FROM person WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&**self)
        .await?;

        Ok(row.map(|r| row_to_person(&r)))
    }

    /// Find a person by their unique email.
    pub async fn find_person_by_email(&self, email: &str) -> Result<Option<Person>, sqlx::Error> {
        let row = sqlx::query(&format!(
            "SELECT {PERSON_COLUMNS} FROM person WHERE email = ?1"
        ))
        .bind(email)
        .fetch_optional(&**self)
        .await?;

        Ok(row.map(|r| row_to_person(&r)))
    }

    /// Query people matching `filter`, ordered by id, with pagination.
    pub async fn query_people(
        &self,
        filter: &PersonFilter,
        offset: Option<i64>,
        limit: Option<i64>,
    ) -> Result<Vec<Person>, sqlx::Error> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {PERSON_COLUMNS} FROM person
            WHERE (?1 IS NULL OR created >= ?1)
              AND (?2 IS NULL OR created <= ?2)
              AND (?3 IS NULL OR modified >= ?3)
              AND (?4 IS NULL OR modified <= ?4)
              AND (?5 IS NULL OR email = ?5)
              AND (?6 IS NULL OR email LIKE '%' || ?6 || '%')
              AND (?7 IS NULL OR group_alias = ?7)
              AND (?8 IS NULL OR title = ?8)
              AND (?9 IS NULL OR surname = ?9)
              AND (?10 IS NULL OR forename = ?10)
              AND (?11 IS NULL OR street = ?11)
              AND (?12 IS NULL OR city = ?12)
              AND (?13 IS NULL OR country = ?13)
              AND (?14 IS NULL OR postcode = ?14)
            ORDER BY id ASC
            LIMIT ?15 OFFSET ?16
            "#
        ))
        .bind(filter.min_created)
        .bind(filter.max_created)
        .bind(filter.min_modified)
        .bind(filter.max_modified)
        .bind(filter.email.as_deref())
        .bind(filter.email_fragment.as_deref())
        .bind(filter.group.map(|g| g.as_str()))
        .bind(filter.title.as_deref())
        .bind(filter.surname.as_deref())
        .bind(filter.forename.as_deref())
        .bind(filter.street.as_deref())
        .bind(filter.city.as_deref())
        .bind(filter.country.as_deref())
        .bind(filter.postcode.as_deref())
        .bind(limit.unwrap_or(-1))
        .bind(offset.unwrap_or(0))
        .fetch_all(&**self)
        .await?;

        Ok(rows.iter().map(row_to_person).collect())
    }

    /// A person's phone numbers, ordered for stable output.
    pub async fn person_phones(&self, id: i64) -> Result<Vec<String>, sqlx::Error> {
        let rows =
            sqlx::query("SELECT phone FROM person_phone WHERE person_id = ?1 ORDER BY phone ASC")
                .bind(id)
                .fetch_all(&**self)
                .await?;

        Ok(rows.iter().map(|r| r.get("phone")).collect())
    }

    /// Ids of the recipes a person owns, ascending.
    pub async fn person_recipe_references(&self, id: i64) -> Result<Vec<i64>, sqlx::Error> {
        let rows = sqlx::query("SELECT id FROM recipe WHERE owner_id = ?1 ORDER BY id ASC")
            .bind(id)
            .fetch_all(&**self)
            .await?;

        Ok(rows.iter().map(|r| r.get("id")).collect())
    }
}

fn row_to_person(row: &SqliteRow) -> Person {
    Person {
        base: EntityBase {
            id: row.get("id"),
            version: row.get("version"),
            created: row.get("created"),
            modified: row.get("modified"),
        },
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        group: row
            .get::<String, _>("group_alias")
            .parse()
            .unwrap_or(Group::User),
        name: PersonName {
            title: row.get("title"),
            family: row.get("surname"),
            given: row.get("forename"),
        },
        address: Address {
            street: row.get("street"),
            city: row.get("city"),
            country: row.get("country"),
            postcode: row.get("postcode"),
        },
        avatar_id: row.get("avatar_id"),
    }
}
