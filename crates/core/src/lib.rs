//! Domain core of the library catalog.
//!
//! Holds the catalog records, the [`catalog::store::CatalogStore`] seam the
//! persistence layer implements, the referential validation gate, the book
//! creation orchestrator and the field-level patch/replace merger.

pub mod catalog;
pub mod error;
pub mod patch;
pub mod roles;
pub mod types;
