//! Store operations: deduplicating insert, lookups, negotiated content
//! access and filtered queries.

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use thiserror::Error;
use tracing::{debug, warn};

use crate::document::{Document, DocumentFilter, EntityBase};
use crate::hash::sha256_hex;
use crate::media;

/// Media type recorded when the caller declares none.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Upper bound on stored content, 256 MB.
pub const MAX_CONTENT_SIZE: usize = 0x1000_0000;

/// Upper bound on the declared media type string.
pub const MAX_TYPE_LENGTH: usize = 63;

/// Errors reported by store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no document with id {0}")]
    NotFound(i64),

    #[error("document insert lost a uniqueness race and the retry lookup missed")]
    Conflict,

    #[error("stored type {stored} does not satisfy acceptable range {accept}")]
    NotAcceptable { stored: String, accept: String },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Create the document table. Idempotent; run once at connect time by
/// whichever component owns the pool.
pub async fn migrate(db: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS document (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            version INTEGER NOT NULL,
            created INTEGER NOT NULL,
            modified INTEGER NOT NULL,
            content_type TEXT NOT NULL,
            hash TEXT NOT NULL UNIQUE,
            content BLOB NOT NULL
        )
        "#,
    )
    .execute(db)
    .await?;

    Ok(())
}

/// Store `content` and return the id of its document.
///
/// The content digest is looked up before any write, so byte-identical
/// payloads always resolve to one row and the declared type of the first
/// insert wins. When two puts race, the `UNIQUE` hash column lets exactly
/// one insert through; the loser retries the lookup once and returns the
/// winner's id.
pub async fn put(
    db: &SqlitePool,
    content_type: Option<&str>,
    content: &[u8],
) -> Result<i64, StoreError> {
    if content.len() > MAX_CONTENT_SIZE {
        return Err(StoreError::InvalidInput(format!(
            "content of {} bytes exceeds the {} byte limit",
            content.len(),
            MAX_CONTENT_SIZE
        )));
    }

    let content_type = match content_type.map(str::trim) {
        None | Some("") => DEFAULT_CONTENT_TYPE,
        Some(declared) if declared.len() > MAX_TYPE_LENGTH => {
            return Err(StoreError::InvalidInput(format!(
                "media type longer than {} characters",
                MAX_TYPE_LENGTH
            )));
        }
        Some(declared) => declared,
    };

    let hash = sha256_hex(content);

    // Dedup before any write attempt; a 256MB payload must never be
    // inserted speculatively and rolled back.
    if let Some(id) = find_id_by_hash(db, &hash).await? {
        debug!(id, %hash, "document content already stored");
        return Ok(id);
    }

    let now = chrono::Utc::now().timestamp_millis();
    match insert_document(db, content_type, &hash, content, now).await {
        Ok(id) => {
            debug!(id, %hash, size = content.len(), content_type, "document stored");
            Ok(id)
        }
        Err(e) if is_unique_violation(&e) => {
            // Someone else just created it; a single retry lookup settles
            // the race.
            warn!(%hash, "document insert lost uniqueness race, retrying lookup");
            find_id_by_hash(db, &hash)
                .await?
                .ok_or(StoreError::Conflict)
        }
        Err(e) => Err(e.into()),
    }
}

/// Exact-id lookup.
pub async fn get(db: &SqlitePool, id: i64) -> Result<Document, StoreError> {
    let row = sqlx::query(
        r#"
        SELECT id, version, created, modified, content_type, hash, content
        FROM document
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await?;

    row.map(|r| row_to_document(&r)).ok_or(StoreError::NotFound(id))
}

/// Return the stored type and raw content of a document, provided the
/// stored type satisfies the caller's acceptable media range.
pub async fn content_if_acceptable(
    db: &SqlitePool,
    id: i64,
    accept: &str,
) -> Result<(String, Vec<u8>), StoreError> {
    let document = get(db, id).await?;

    if !media::is_acceptable(&document.content_type, accept) {
        return Err(StoreError::NotAcceptable {
            stored: document.content_type,
            accept: accept.to_string(),
        });
    }

    Ok((document.content_type, document.content))
}

/// Query documents matching `filter`, ordered by id ascending, with
/// offset/limit pagination.
pub async fn query(
    db: &SqlitePool,
    filter: &DocumentFilter,
    offset: Option<i64>,
    limit: Option<i64>,
) -> Result<Vec<Document>, StoreError> {
    let rows = sqlx::query(
        r#"
        SELECT id, version, created, modified, content_type, hash, content
        FROM document
        WHERE (?1 IS NULL OR created >= ?1)
          AND (?2 IS NULL OR created <= ?2)
          AND (?3 IS NULL OR modified >= ?3)
          AND (?4 IS NULL OR modified <= ?4)
          AND (?5 IS NULL OR content_type = ?5)
          AND (?6 IS NULL OR hash = ?6)
          AND (?7 IS NULL OR length(content) >= ?7)
          AND (?8 IS NULL OR length(content) <= ?8)
        ORDER BY id ASC
        LIMIT ?9 OFFSET ?10
        "#,
    )
    .bind(filter.min_created)
    .bind(filter.max_created)
    .bind(filter.min_modified)
    .bind(filter.max_modified)
    .bind(filter.content_type.as_deref())
    .bind(filter.hash.as_deref())
    .bind(filter.min_size)
    .bind(filter.max_size)
    .bind(limit.unwrap_or(-1))
    .bind(offset.unwrap_or(0))
    .fetch_all(db)
    .await?;

    Ok(rows.iter().map(row_to_document).collect())
}

async fn find_id_by_hash(db: &SqlitePool, hash: &str) -> Result<Option<i64>, sqlx::Error> {
    let row = sqlx::query("SELECT id FROM document WHERE hash = ?1")
        .bind(hash)
        .fetch_optional(db)
        .await?;

    Ok(row.map(|r| r.get("id")))
}

async fn insert_document(
    db: &SqlitePool,
    content_type: &str,
    hash: &str,
    content: &[u8],
    now: i64,
) -> Result<i64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO document (version, created, modified, content_type, hash, content)
        VALUES (1, ?1, ?2, ?3, ?4, ?5)
        "#,
    )
    .bind(now)
    .bind(now)
    .bind(content_type)
    .bind(hash)
    .bind(content)
    .execute(db)
    .await?;

    Ok(result.last_insert_rowid())
}

fn is_unique_violation(error: &sqlx::Error) -> bool {
    error
        .as_database_error()
        .is_some_and(|e| e.is_unique_violation())
}

fn row_to_document(row: &SqliteRow) -> Document {
    Document {
        base: EntityBase {
            id: row.get("id"),
            version: row.get("version"),
            created: row.get("created"),
            modified: row.get("modified"),
        },
        content_type: row.get("content_type"),
        hash: row.get("hash"),
        content: row.get("content"),
    }
}
