//! # Host Record Model
//!
//! One decoded unit of the input stream: a host and the technologies detected on it.

use serde::Deserialize;

/// A host and its raw technology tags, exactly as found in the input.
///
/// On the wire the tag list is called `tech` (the shape `httpxjson` emits);
/// `tags` is accepted too. A missing field is the same as `null`: the host is
/// skipped without a scan. Any other fields (`count`, ...) are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HostRecord {
    pub host: String,
    #[serde(default, rename = "tech", alias = "tags")]
    pub tags: Option<Vec<String>>,
}
