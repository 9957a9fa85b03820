//! # Catalog Records
//!
//! Typed request and response records for the two resources the service
//! exposes. Responses are parsed strictly at the boundary: a missing or
//! wrongly shaped field is a parse failure, reported separately from any
//! assertion a scenario makes about the values.
//!
//! Quirks of the service's rendering, kept on purpose:
//! - ids live under the `_id` key and are opaque strings,
//! - `price` and `pages` arrive as strings (`"10"`, `"100"`) even though
//!   requests send them as numbers,
//! - a book's `category` is an embedded object on some endpoints and a bare
//!   id on others.

use serde::{Deserialize, Serialize};

// ─── Response Records ────────────────────────────────────────────────────────

/// A book category as the service renders it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Category {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
}

/// A book as the service renders it. `price` and `pages` keep the string
/// rendering so oracle checks compare exactly what went over the wire.
#[derive(Debug, Clone, Deserialize)]
pub struct Book {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub author: String,
    pub description: String,
    pub price: String,
    pub pages: String,
    pub category: CategoryRef,
}

/// A book's category reference: embedded object or bare id, depending on the
/// endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CategoryRef {
    Embedded(Category),
    Id(String),
}

impl CategoryRef {
    /// The referenced category id, whichever form the service used.
    pub fn category_id(&self) -> &str {
        match self {
            CategoryRef::Embedded(category) => &category.id,
            CategoryRef::Id(id) => id,
        }
    }
}

// ─── Request Payloads ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct NewCategory {
    pub title: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryUpdate {
    pub title: String,
}

/// Creation payload for a book. Numeric fields go out as numbers; the
/// service is the one that renders them back as strings. `category` must be
/// an existing category's id.
#[derive(Debug, Clone, Serialize)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub description: String,
    pub price: u64,
    pub pages: u64,
    pub category: String,
}

/// Subset update for a book: only the fields present here may change.
#[derive(Debug, Clone, Serialize)]
pub struct BookUpdate {
    pub title: String,
    pub author: String,
}
