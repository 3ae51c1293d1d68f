//! Sparse JSON encoding for bit-indexed sets and flag-keyed collections of them.
//!
//! # Overview
//!
//! Bit sets in loading and routing problems are large and mostly empty, so a
//! dense one-boolean-per-bit encoding is wasteful and unreadable. This crate
//! writes a set as the ascending array of its set indices, and a mapping from
//! flag to ordered list of sets as a JSON object keyed by the flag's numeric
//! code.
//!
//! # Quick Start
//!
//! ```rust
//! use bitset_json::{BitSet, Capacity, FlaggedCollection, LoadingFlag};
//! use bitset_json::codec::{decode_flagged, encode_bitset, encode_flagged};
//!
//! let set = BitSet::from_indices(10_000, [3, 7, 9]).unwrap();
//! assert_eq!(encode_bitset(&set).to_string(), "[3,7,9]");
//!
//! let mut collection = FlaggedCollection::default();
//! collection.insert(LoadingFlag::LoadingOnly, vec![set]);
//!
//! let json = encode_flagged(&collection);
//! assert_eq!(json.to_string(), r#"{"3":[[3,7,9]]}"#);
//!
//! let decoded = decode_flagged::<LoadingFlag>(&json, Capacity::Exact(10_000)).unwrap();
//! assert_eq!(decoded, collection);
//! ```
//!
//! # Modules
//!
//! - [`model`]: Bit sets, flag enumerations, collections
//! - [`codec`]: JSON encoding/decoding and the serde `with` adapter
//! - [`error`]: Error types
//! - [`limits`]: Resource limits for decoding
//!
//! # Wire Format
//!
//! - Set: `[3,7,9]`, strictly ascending non-negative integers; `[]` when empty.
//! - Collection: `{"3":[[3,7],[]],"12":[[0]]}`, keys in canonical decimal form.
//!
//! Capacity is not written. Decoders take a [`Capacity`] policy: either the
//! caller supplies it, or it is inferred from the largest index.
//!
//! # Security
//!
//! Decoding never repairs input: unsorted, repeated, negative or non-integer
//! indices and non-canonical keys are rejected. Inferred capacities are bounded
//! by [`DecodeOptions::max_inferred_capacity`].

pub mod codec;
pub mod error;
pub mod limits;
pub mod model;

// Re-export commonly used types at crate root
pub use codec::{
    decode_bitset, decode_flagged, encode_bitset, encode_flagged, from_json_str, to_json_string,
    Capacity, DecodeOptions, SparseSet,
};
pub use error::{BitSetError, DecodeError, ErrorCode, FlagTableError};
pub use model::{BitIndexed, BitSet, Flag, FlagTable, FlaggedCollection, LoadingFlag, Ones};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
