pub mod activity;
pub mod member;
pub mod money;
pub mod payment;
pub mod plan;
pub mod profile;
pub mod settings;

pub use activity::*;
pub use member::*;
pub use money::Money;
pub use payment::*;
pub use plan::*;
pub use profile::*;
pub use settings::*;

use serde::{Deserialize, Deserializer};

/// Reads a column that may be absent or `null` as the type's default.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
