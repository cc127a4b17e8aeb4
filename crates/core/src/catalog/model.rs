//! Catalog records and request DTOs.
//!
//! Records reference each other by identity only (`author_id`, `book_id`,
//! `category_id`); a loaded [`Book`] carries its associations as plain
//! values, never back-pointers. JSON keys keep the catalog's published
//! Spanish names (`nombre`, `titulo`, `categorias`, ...).

use serde::{Deserialize, Serialize};

use crate::patch::{Field, Mergeable};
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// A row from the `authors` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Author {
    pub id: DbId,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "nacionalidad")]
    pub nationality: Option<String>,
}

/// A row from the `categories` table. Reference data: never written by the core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Category {
    pub id: DbId,
    #[serde(rename = "nombre")]
    pub name: String,
}

/// A row from the `books` table, with its category associations attached
/// when loaded through the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Book {
    pub id: DbId,
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "anioPublicacion")]
    pub publication_year: Option<i32>,
    #[serde(rename = "autor")]
    pub author_id: DbId,
    #[serde(rename = "categorias")]
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    pub categories: Vec<BookCategory>,
}

/// A row from the `book_categories` association table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct BookCategory {
    pub id: DbId,
    #[serde(rename = "libro")]
    pub book_id: DbId,
    #[serde(rename = "categoria")]
    pub category_id: DbId,
    #[serde(rename = "prioridad")]
    pub priority: i32,
    #[serde(rename = "addedAt")]
    pub added_at: Timestamp,
    #[serde(rename = "comentario")]
    pub comment: Option<String>,
}

// ---------------------------------------------------------------------------
// Inserts
// ---------------------------------------------------------------------------

/// DTO for creating an author. Also the body of a full author replacement.
#[derive(Debug, Clone, Deserialize)]
pub struct NewAuthor {
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "nacionalidad")]
    pub nationality: Option<String>,
}

/// Book columns written by the creation orchestrator.
#[derive(Debug, Clone)]
pub struct NewBook {
    pub title: String,
    pub publication_year: Option<i32>,
    pub author_id: DbId,
}

/// One association row of a creation batch. `added_at` is stamped when the
/// value is built, not when the store writes it.
#[derive(Debug, Clone)]
pub struct NewBookCategory {
    pub book_id: DbId,
    pub category_id: DbId,
    pub priority: i32,
    pub comment: Option<String>,
    pub added_at: Timestamp,
}

// ---------------------------------------------------------------------------
// Updates
// ---------------------------------------------------------------------------

/// Partial author update. Only fields carrying a value are applied.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthorPatch {
    #[serde(default, rename = "nombre")]
    pub name: Field<String>,
    #[serde(default, rename = "nacionalidad")]
    pub nationality: Field<String>,
}

/// Partial book update. Only fields carrying a value are applied.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookPatch {
    #[serde(default, rename = "titulo")]
    pub title: Field<String>,
    #[serde(default, rename = "anioPublicacion")]
    pub publication_year: Field<i32>,
    #[serde(default, rename = "autor")]
    pub author_id: Field<DbId>,
}

/// Full book replacement. An omitted or `null` year clears it.
#[derive(Debug, Clone, Deserialize)]
pub struct BookReplacement {
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "anioPublicacion")]
    pub publication_year: Option<i32>,
    #[serde(rename = "autor")]
    pub author_id: DbId,
}

impl Mergeable for Author {
    type Patch = AuthorPatch;
    type Replacement = NewAuthor;

    fn merge_patch(&mut self, patch: AuthorPatch) {
        patch.name.merge_into(&mut self.name);
        patch.nationality.merge_into_option(&mut self.nationality);
    }

    fn replace_with(&mut self, replacement: NewAuthor) {
        self.name = replacement.name;
        self.nationality = replacement.nationality;
    }
}

impl Mergeable for Book {
    type Patch = BookPatch;
    type Replacement = BookReplacement;

    fn merge_patch(&mut self, patch: BookPatch) {
        patch.title.merge_into(&mut self.title);
        patch
            .publication_year
            .merge_into_option(&mut self.publication_year);
        patch.author_id.merge_into(&mut self.author_id);
    }

    fn replace_with(&mut self, replacement: BookReplacement) {
        self.title = replacement.title;
        self.publication_year = replacement.publication_year;
        self.author_id = replacement.author_id;
    }
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Optional filters for book listing. All present filters must match.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookFilter {
    /// Case-sensitive substring of the title.
    pub title: Option<String>,
    pub year: Option<i32>,
    #[serde(rename = "author")]
    pub author_id: Option<DbId>,
}

impl BookFilter {
    /// Whether `book` satisfies every present filter.
    pub fn matches(&self, book: &Book) -> bool {
        self.title
            .as_deref()
            .map_or(true, |t| book.title.contains(t))
            && self.year.map_or(true, |y| book.publication_year == Some(y))
            && self.author_id.map_or(true, |a| book.author_id == a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn author(name: &str, nationality: Option<&str>) -> Author {
        Author {
            id: 1,
            name: name.to_string(),
            nationality: nationality.map(str::to_string),
        }
    }

    fn book() -> Book {
        Book {
            id: 10,
            title: "Dune".to_string(),
            publication_year: Some(1965),
            author_id: 7,
            categories: Vec::new(),
        }
    }

    #[test]
    fn author_patch_keeps_omitted_fields() {
        let mut a = author("A", Some("X"));
        let patch: AuthorPatch = serde_json::from_str(r#"{"nombre": "B"}"#).unwrap();
        a.merge_patch(patch);
        assert_eq!(a, author("B", Some("X")));
    }

    #[test]
    fn author_patch_ignores_explicit_null() {
        let mut a = author("A", Some("X"));
        let patch: AuthorPatch = serde_json::from_str(r#"{"nacionalidad": null}"#).unwrap();
        a.merge_patch(patch);
        assert_eq!(a, author("A", Some("X")));
    }

    #[test]
    fn author_patch_is_idempotent() {
        let patch: AuthorPatch =
            serde_json::from_str(r#"{"nombre": "B", "nacionalidad": "Y"}"#).unwrap();
        let mut once = author("A", Some("X"));
        once.merge_patch(patch.clone());
        let mut twice = once.clone();
        twice.merge_patch(patch);
        assert_eq!(once, twice);
    }

    #[test]
    fn author_replace_clears_absent_nationality() {
        let mut a = author("A", Some("X"));
        let replacement: NewAuthor =
            serde_json::from_str(r#"{"nombre": "B", "nacionalidad": null}"#).unwrap();
        a.replace_with(replacement);
        assert_eq!(a, author("B", None));
    }

    #[test]
    fn author_replace_requires_name() {
        let result = serde_json::from_str::<NewAuthor>(r#"{"nacionalidad": "X"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn book_patch_applies_only_present_fields() {
        let mut b = book();
        let patch: BookPatch = serde_json::from_str(r#"{"anioPublicacion": 1966}"#).unwrap();
        b.merge_patch(patch);
        assert_eq!(b.title, "Dune");
        assert_eq!(b.publication_year, Some(1966));
        assert_eq!(b.author_id, 7);
    }

    #[test]
    fn book_patch_moves_author_reference() {
        let mut b = book();
        let patch: BookPatch = serde_json::from_str(r#"{"autor": 9}"#).unwrap();
        b.merge_patch(patch);
        assert_eq!(b.author_id, 9);
    }

    #[test]
    fn book_replace_overwrites_everything() {
        let mut b = book();
        let replacement: BookReplacement =
            serde_json::from_str(r#"{"titulo": "Children of Dune", "autor": 8}"#).unwrap();
        b.replace_with(replacement);
        assert_eq!(b.title, "Children of Dune");
        assert_eq!(b.publication_year, None);
        assert_eq!(b.author_id, 8);
        assert_eq!(b.id, 10);
    }

    #[test]
    fn book_serializes_with_catalog_keys() {
        let json = serde_json::to_value(book()).unwrap();
        assert_eq!(json["titulo"], "Dune");
        assert_eq!(json["anioPublicacion"], 1965);
        assert_eq!(json["autor"], 7);
        assert!(json["categorias"].as_array().unwrap().is_empty());
    }

    #[test]
    fn filter_matches_all_present_criteria() {
        let b = book();
        assert!(BookFilter::default().matches(&b));
        let by_title = BookFilter {
            title: Some("Du".into()),
            ..Default::default()
        };
        assert!(by_title.matches(&b));
        let wrong_year = BookFilter {
            year: Some(1970),
            ..Default::default()
        };
        assert!(!wrong_year.matches(&b));
        let other_author = BookFilter {
            author_id: Some(1),
            ..Default::default()
        };
        assert!(!other_author.matches(&b));
    }
}
