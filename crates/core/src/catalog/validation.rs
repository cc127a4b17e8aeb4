//! Referential preconditions checked before any catalog mutation.
//!
//! The checks are read-only and race with concurrent deletes: a category
//! that passes here can disappear before the write lands. That window is
//! accepted; the store's foreign keys are the last line.

use std::collections::HashSet;

use crate::catalog::store::ReferenceLookup;
use crate::error::CoreError;
use crate::types::DbId;

/// Rejection message when the referenced author does not exist.
pub const AUTHOR_MISSING: &str = "author does not exist";

/// Rejection message when at least one referenced category does not exist.
pub const CATEGORIES_MISSING: &str = "one or more categories do not exist";

/// Whether an author with `author_id` exists.
pub async fn author_exists<S>(store: &S, author_id: DbId) -> Result<bool, CoreError>
where
    S: ReferenceLookup + ?Sized,
{
    store.author_exists(author_id).await
}

/// Count the ids in `category_ids` with no matching category.
///
/// Every id is probed, including those after the first miss.
pub async fn count_missing_categories<S>(store: &S, category_ids: &[DbId]) -> Result<usize, CoreError>
where
    S: ReferenceLookup + ?Sized,
{
    let mut missing = 0;
    for &id in category_ids {
        if !store.category_exists(id).await? {
            tracing::debug!(category_id = id, "Referenced category not found");
            missing += 1;
        }
    }
    Ok(missing)
}

/// Whether every id in `category_ids` names an existing category.
pub async fn categories_exist<S>(store: &S, category_ids: &[DbId]) -> Result<bool, CoreError>
where
    S: ReferenceLookup + ?Sized,
{
    Ok(count_missing_categories(store, category_ids).await? == 0)
}

/// First category id listed more than once, if any.
pub fn find_duplicate_category(category_ids: &[DbId]) -> Option<DbId> {
    let mut seen = HashSet::with_capacity(category_ids.len());
    category_ids.iter().copied().find(|id| !seen.insert(*id))
}

/// Fail with [`CoreError::Validation`] unless the author exists.
pub async fn ensure_author_exists<S>(store: &S, author_id: DbId) -> Result<(), CoreError>
where
    S: ReferenceLookup + ?Sized,
{
    if author_exists(store, author_id).await? {
        Ok(())
    } else {
        Err(CoreError::Validation(AUTHOR_MISSING.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use assert_matches::assert_matches;
    use async_trait::async_trait;

    use super::*;

    /// Lookup backed by fixed id lists that counts category probes.
    struct FixedLookup {
        authors: Vec<DbId>,
        categories: Vec<DbId>,
        category_probes: AtomicUsize,
    }

    impl FixedLookup {
        fn new(authors: &[DbId], categories: &[DbId]) -> Self {
            Self {
                authors: authors.to_vec(),
                categories: categories.to_vec(),
                category_probes: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ReferenceLookup for FixedLookup {
        async fn author_exists(&self, id: DbId) -> Result<bool, CoreError> {
            Ok(self.authors.contains(&id))
        }

        async fn category_exists(&self, id: DbId) -> Result<bool, CoreError> {
            self.category_probes.fetch_add(1, Ordering::SeqCst);
            Ok(self.categories.contains(&id))
        }
    }

    struct BrokenLookup;

    #[async_trait]
    impl ReferenceLookup for BrokenLookup {
        async fn author_exists(&self, _id: DbId) -> Result<bool, CoreError> {
            Err(CoreError::Storage("connection reset".into()))
        }

        async fn category_exists(&self, _id: DbId) -> Result<bool, CoreError> {
            Err(CoreError::Storage("connection reset".into()))
        }
    }

    #[tokio::test]
    async fn author_lookup_reports_presence() {
        let lookup = FixedLookup::new(&[7], &[]);
        assert!(author_exists(&lookup, 7).await.unwrap());
        assert!(!author_exists(&lookup, 8).await.unwrap());
    }

    #[tokio::test]
    async fn all_categories_present() {
        let lookup = FixedLookup::new(&[], &[1, 2, 3]);
        assert!(categories_exist(&lookup, &[1, 3]).await.unwrap());
    }

    #[tokio::test]
    async fn empty_category_set_passes() {
        let lookup = FixedLookup::new(&[], &[]);
        assert!(categories_exist(&lookup, &[]).await.unwrap());
    }

    #[tokio::test]
    async fn one_missing_category_fails_the_set() {
        let lookup = FixedLookup::new(&[], &[1, 2]);
        assert!(!categories_exist(&lookup, &[1, 99, 2]).await.unwrap());
    }

    #[tokio::test]
    async fn every_id_is_probed_after_a_miss() {
        let lookup = FixedLookup::new(&[], &[2, 3]);
        let missing = count_missing_categories(&lookup, &[98, 2, 99, 3])
            .await
            .unwrap();
        assert_eq!(missing, 2);
        assert_eq!(lookup.category_probes.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn store_errors_propagate() {
        assert_matches!(
            categories_exist(&BrokenLookup, &[1]).await,
            Err(CoreError::Storage(_))
        );
        assert_matches!(
            author_exists(&BrokenLookup, 1).await,
            Err(CoreError::Storage(_))
        );
    }

    #[tokio::test]
    async fn ensure_author_maps_missing_to_validation() {
        let lookup = FixedLookup::new(&[1], &[]);
        assert!(ensure_author_exists(&lookup, 1).await.is_ok());
        assert_matches!(
            ensure_author_exists(&lookup, 2).await,
            Err(CoreError::Validation(msg)) if msg == AUTHOR_MISSING
        );
    }

    #[test]
    fn duplicate_detection() {
        assert_eq!(find_duplicate_category(&[]), None);
        assert_eq!(find_duplicate_category(&[1, 2, 3]), None);
        assert_eq!(find_duplicate_category(&[1, 2, 1, 2]), Some(1));
    }
}
