//! Traits used and implemented by leapdna entities.
//!
use serde_json::Value;

/// Projection of an entity onto the leapdna interchange form.
pub trait ToLeapdna {
    /// Build the JSON value for this entity. With `top_level` set, the
    /// block also carries the format version and reserved metadata;
    /// nested blocks omit both.
    fn to_leapdna(&self, top_level: bool) -> Value;
}
