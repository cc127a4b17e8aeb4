//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that accept
//! `&PgPool` (or an open transaction) as the first argument.

pub mod author_repo;
pub mod book_category_repo;
pub mod book_repo;
pub mod category_repo;

pub use author_repo::AuthorRepo;
pub use book_category_repo::BookCategoryRepo;
pub use book_repo::BookRepo;
pub use category_repo::CategoryRepo;
