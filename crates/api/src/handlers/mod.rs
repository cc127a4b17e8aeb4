//! Request handlers for the catalog resources.
//!
//! Each submodule provides async handler functions for one resource.
//! Handlers call the [`biblio_core::catalog`] operations or the store on
//! [`crate::state::AppState`] and map errors via [`crate::error::AppError`].

pub mod author;
pub mod book;
pub mod category;
