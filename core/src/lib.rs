//! Core types shared by the vulntechx engine crates.

pub mod error;
pub mod slots;

pub use error::Error;
pub use slots::{Slot, SlotPool};

use serde::{Deserialize, Deserializer};

pub const fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// One host and the technology tags detected on it.
///
/// `tech` stays `None` when the field is missing or `null`; such records are
/// skipped by the engine rather than rejected. `null` for `host` or for a
/// single tag reads as the empty string. Any other field, `count` included,
/// is ignored whatever its type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TechRecord {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub host: String,
    #[serde(default, deserialize_with = "nullable_tags")]
    pub tech: Option<Vec<String>>,
}

fn null_as_empty<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(d)?.unwrap_or_default())
}

fn nullable_tags<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Vec<String>>, D::Error> {
    let tags = Option::<Vec<Option<String>>>::deserialize(d)?;
    Ok(tags.map(|v| v.into_iter().map(Option::unwrap_or_default).collect()))
}

/// A fully rendered shell command bound to the host it scans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSpec {
    /// Fed verbatim on the child's stdin.
    pub host: String,
    /// Tag label for logs: the joined tag list or the single tag.
    pub tech: String,
    pub command: String,
}
