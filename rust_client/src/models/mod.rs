//! Wire types of the FarmMind REST contract.
//!
//! Field names follow the server's snake_case JSON. The server is written
//! against a SQL store and routinely emits `null` for empty collections, so
//! list-valued fields go through [`null_as_default`].

mod macros;

pub mod account;
pub mod calendar;
pub mod catalog;
pub mod doctor;
pub mod irrigation;
pub mod marketplace;
pub mod prices;
pub mod upload;
pub mod weather;

pub use account::*;
pub use calendar::*;
pub use catalog::*;
pub use doctor::*;
pub use irrigation::*;
pub use marketplace::*;
pub use prices::*;
pub use upload::*;
pub use weather::*;

use serde::{Deserialize, Deserializer};

/// Deserialize `null` as `T::default()`.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
