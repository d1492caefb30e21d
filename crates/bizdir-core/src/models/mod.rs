//! Data models for directory records.
//!
//! This module contains the typed records decoded from the store and the
//! derived views assembled by the aggregator:
//!
//! - `Company`, `Branch`: the directory's core entities
//! - `WorkingDay`, `Product`, `SocialMediaLink`: records scoped to a branch or company
//! - `MergedCompanyView`: one branch joined with its company and scoped records

pub mod company;
pub mod scoped;
pub mod view;

pub use company::{Branch, Company};
pub use scoped::{Product, Scope, Scoped, SocialMediaLink, WorkingDay};
pub use view::{Coordinates, MergedCompanyView};

use serde::{Deserialize, Deserializer};

/// Decode a field that the store may send as `null`, falling back to the type's default.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
