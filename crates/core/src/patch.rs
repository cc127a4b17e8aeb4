//! Field-level merge primitives shared by every mutable catalog record.
//!
//! A patch body distinguishes three states per field: the key was omitted,
//! the key was sent as `null`, or the key carried a value. [`Field`] keeps
//! that distinction after deserialization so the merge rules can be stated
//! precisely:
//!
//! - *partial merge* applies only [`Field::Value`]; omitted and `null`
//!   fields leave the existing value untouched;
//! - *full replace* overwrites every mutable field, clearing optional fields
//!   whose incoming value is omitted or `null`.
//!
//! Patch DTOs must annotate each `Field` with `#[serde(default)]` so an
//! omitted key deserializes to [`Field::Missing`].

use serde::{Deserialize, Deserializer};

/// Tri-state value of one field in a patch body.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Field<T> {
    /// The key was not present in the body.
    #[default]
    Missing,
    /// The key was present with an explicit `null`.
    Null,
    /// The key was present with a value.
    Value(T),
}

impl<T> Field<T> {
    /// Borrow the carried value, if any.
    pub fn as_value(&self) -> Option<&T> {
        match self {
            Field::Value(v) => Some(v),
            Field::Missing | Field::Null => None,
        }
    }

    /// Overwrite `target` only when the field carries a value.
    pub fn merge_into(self, target: &mut T) {
        if let Field::Value(v) = self {
            *target = v;
        }
    }

    /// Overwrite an optional `target` only when the field carries a value.
    pub fn merge_into_option(self, target: &mut Option<T>) {
        if let Field::Value(v) = self {
            *target = Some(v);
        }
    }
}

impl<T> From<Option<T>> for Field<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Field::Value(v),
            None => Field::Null,
        }
    }
}

impl<'de, T> Deserialize<'de> for Field<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Field::from)
    }
}

/// A record whose mutable fields can be patched or replaced in place.
///
/// Identity is never touched by either operation.
pub trait Mergeable {
    /// Body of a partial update.
    type Patch;
    /// Body of a full replacement.
    type Replacement;

    /// Apply only the fields `patch` carries a value for.
    fn merge_patch(&mut self, patch: Self::Patch);

    /// Overwrite every mutable field from `replacement`.
    fn replace_with(&mut self, replacement: Self::Replacement);
}
