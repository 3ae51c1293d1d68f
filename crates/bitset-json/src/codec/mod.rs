//! JSON encoding/decoding for bit-indexed sets and flagged collections.
//!
//! Codecs are plain functions called at the point of use; nothing is
//! registered globally.

pub mod flagged;
pub mod serde_sparse;
pub mod sparse;

use serde_json::Value;

pub use flagged::{
    decode_flagged, decode_flagged_with_options, encode_flagged, from_json_str, parse_flag_key,
    to_json_string,
};
pub use sparse::{
    decode_bitset, decode_bitset_with_options, decode_indices, encode_bitset, Capacity,
    DecodeOptions, SparseSet,
};

/// JSON type name used in error messages.
pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
