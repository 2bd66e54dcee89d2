//! Domain model for drivers, vehicles and trips.
//!
//! # Responsibility
//! - Define the record shapes shared by storage and the wire contract.
//! - Define create payloads and field-subset patches with their validation.
//!
//! # Invariants
//! - Identities are store-assigned and never part of a create payload or patch.
//! - Wire field names match the relational column names.

use serde::{Deserialize, Deserializer};

pub mod driver;
pub mod province;
pub mod trip;
pub mod validation;
pub mod vehicle;

/// Distinguishes an absent patch field from an explicit `null`.
///
/// Use with `#[serde(default, deserialize_with = "double_option")]`:
/// absent -> `None`, `null` -> `Some(None)`, value -> `Some(Some(v))`.
pub(crate) fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Returns the value when it contains non-whitespace characters.
pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|text| !text.trim().is_empty())
}
