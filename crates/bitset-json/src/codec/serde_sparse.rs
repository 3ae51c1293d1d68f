//! serde `with` adapter for [`BitSet`] fields.
//!
//! ```rust
//! use bitset_json::BitSet;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize)]
//! struct Placement {
//!     #[serde(with = "bitset_json::codec::serde_sparse")]
//!     occupied: BitSet,
//! }
//!
//! let placement = Placement {
//!     occupied: BitSet::from_indices(100, [4, 42]).unwrap(),
//! };
//! let text = serde_json::to_string(&placement).unwrap();
//! assert_eq!(text, r#"{"occupied":[4,42]}"#);
//! ```
//!
//! Deserialization infers the capacity (one past the largest index) under the
//! default [`DecodeOptions`]. The field comes back with the same set indices
//! but may be smaller than it was: `occupied` above decodes with size 43, not
//! 100. Fields whose capacity matters should be decoded with
//! [`decode_bitset`](crate::codec::decode_bitset) and [`Capacity::Exact`].

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::codec::sparse::{decode_set, Capacity, DecodeOptions, SparseSet};
use crate::model::{BitIndexed, BitSet};

pub fn serialize<S, Ser>(set: &S, serializer: Ser) -> Result<Ser::Ok, Ser::Error>
where
    S: BitIndexed + ?Sized,
    Ser: Serializer,
{
    SparseSet(set).serialize(serializer)
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<BitSet, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    decode_set(&value, Capacity::Inferred, &DecodeOptions::default()).map_err(D::Error::custom)
}
