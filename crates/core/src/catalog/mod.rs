//! Library catalog domain: records, the store seam, and the operations that
//! carry cross-entity invariants.
//!
//! - [`model`] -- Author, Book, Category and BookCategory records plus DTOs.
//! - [`store`] -- [`store::CatalogStore`], the persistence contract.
//! - [`validation`] -- referential checks run before any mutation.
//! - [`creation`] -- transactional book + association creation.
//! - [`update`] -- full replace and partial merge for authors and books.
//! - [`memory`] -- in-process store implementing the same contract.

pub mod creation;
pub mod memory;
pub mod model;
pub mod store;
pub mod update;
pub mod validation;
