//! Content-addressed document storage over SQLite.
//!
//! Documents are binary payloads identified by the SHA-256 digest of their
//! content. Storing the same byte sequence twice always resolves to the same
//! row: [`put`] looks the digest up before writing, and a lost insert race is
//! settled by a single retry lookup against the `UNIQUE` hash column.
//!
//! All operations take the connection pool as an explicit parameter; the
//! crate keeps no ambient persistence state.
//!
//! # Example
//!
//! ```rust,no_run
//! use sqlx::sqlite::SqlitePoolOptions;
//!
//! # async fn example() -> Result<(), document_store::StoreError> {
//! let pool = SqlitePoolOptions::new().connect("sqlite::memory:").await?;
//! document_store::migrate(&pool).await?;
//!
//! let id = document_store::put(&pool, Some("text/plain"), b"hello").await?;
//! let doc = document_store::get(&pool, id).await?;
//! assert_eq!(doc.hash, document_store::sha256_hex(b"hello"));
//! # Ok(())
//! # }
//! ```

mod document;
mod hash;
mod media;
mod store;

pub use document::{Document, DocumentFilter, EntityBase};
pub use hash::{sha256_hex, EMPTY_CONTENT_HASH};
pub use media::is_acceptable;
pub use store::{
    content_if_acceptable, get, migrate, put, query, StoreError, DEFAULT_CONTENT_TYPE,
    MAX_CONTENT_SIZE, MAX_TYPE_LENGTH,
};
