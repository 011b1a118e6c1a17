//! The document record and its query filter.

use serde::{Deserialize, Serialize};

/// Administrative fields shared by every persisted entity.
///
/// Embedded as a value in each record rather than inherited: one table per
/// concrete entity, each carrying its own copy of these columns. `created`
/// is set on insert and never mutated; `modified` moves on every update;
/// `version` is a positive counter starting at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityBase {
    pub id: i64,
    pub version: i64,
    /// Epoch milliseconds.
    pub created: i64,
    /// Epoch milliseconds.
    pub modified: i64,
}

impl EntityBase {
    /// Base fields for an entity about to be inserted: the id is assigned
    /// by the database, the version counter starts at 1.
    pub fn fresh(now: i64) -> Self {
        Self {
            id: 0,
            version: 1,
            created: now,
            modified: now,
        }
    }
}

/// A stored binary document.
///
/// `hash` is the lowercase hex SHA-256 digest of `content` and is unique
/// across the table; `content_type`, `hash` and `content` are insert-only.
/// Natural ordering is by `id` ascending.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    #[serde(flatten)]
    pub base: EntityBase,
    #[serde(rename = "type")]
    pub content_type: String,
    pub hash: String,
    /// Raw bytes; excluded from JSON, fetched through content negotiation.
    #[serde(skip)]
    pub content: Vec<u8>,
}

impl Document {
    pub fn id(&self) -> i64 {
        self.base.id
    }

    pub fn size(&self) -> usize {
        self.content.len()
    }
}

/// Optional AND-combined filters for [`crate::query`]. `None` means no
/// constraint on that attribute.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentFilter {
    pub min_created: Option<i64>,
    pub max_created: Option<i64>,
    pub min_modified: Option<i64>,
    pub max_modified: Option<i64>,
    #[serde(rename = "type")]
    pub content_type: Option<String>,
    pub hash: Option<String>,
    pub min_size: Option<i64>,
    pub max_size: Option<i64>,
}
