//! Sparse JSON encoding for bit-indexed sets.
//!
//! A set is written as the JSON array of its set indices in strictly
//! ascending order: `{3, 7, 9}` becomes `[3,7,9]` and the empty set `[]`.
//! Capacity is not part of the wire form; see [`Capacity`].

use serde::ser::{Serialize, SerializeSeq, Serializer};
use serde_json::Value;

use crate::codec::json_type_name;
use crate::error::DecodeError;
use crate::limits::MAX_INFERRED_CAPACITY;
use crate::model::{BitIndexed, BitSet};

/// How a decoder chooses the capacity of the set it builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capacity {
    /// Caller-supplied capacity. Indices at or past it are rejected.
    Exact(usize),
    /// One past the largest decoded index; zero for an empty array.
    ///
    /// A set whose highest indices were unset when encoded comes back smaller
    /// than it was, so prefer [`Capacity::Exact`] whenever the capacity is known.
    Inferred,
}

/// Options for decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Upper bound for [`Capacity::Inferred`].
    ///
    /// Exact capacities are trusted as given.
    pub max_inferred_capacity: usize,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            max_inferred_capacity: MAX_INFERRED_CAPACITY,
        }
    }
}

impl DecodeOptions {
    /// Creates default decoding options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the upper bound for inferred capacities.
    pub fn with_max_inferred_capacity(mut self, max: usize) -> Self {
        self.max_inferred_capacity = max;
        self
    }
}

// =============================================================================
// ENCODING
// =============================================================================

/// Encodes a set as the JSON array of its set indices.
///
/// Walks the set with `find_first`/`find_next`, so the cost follows the number
/// of set bits, not the capacity.
pub fn encode_bitset<S: BitIndexed + ?Sized>(set: &S) -> Value {
    let mut indices = Vec::with_capacity(set.count_ones());
    let mut next = set.find_first();
    while let Some(index) = next {
        indices.push(Value::from(index as u64));
        next = set.find_next(index);
    }
    Value::Array(indices)
}

/// Serializes a borrowed set as its ascending index array.
///
/// Use this to embed sets in caller-defined serde types without going
/// through an intermediate [`Value`].
pub struct SparseSet<'a, S: ?Sized>(pub &'a S);

impl<S: BitIndexed + ?Sized> Serialize for SparseSet<'_, S> {
    fn serialize<Ser: Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
        let mut seq = serializer.serialize_seq(Some(self.0.count_ones()))?;
        for index in self.0.ones() {
            seq.serialize_element(&(index as u64))?;
        }
        seq.end()
    }
}

// =============================================================================
// DECODING
// =============================================================================

/// Reads the index array without building a set.
///
/// Every element must be a non-negative integer strictly greater than the one
/// before it. Out-of-order or repeated indices are rejected, never repaired.
pub fn decode_indices(value: &Value) -> Result<Vec<usize>, DecodeError> {
    let elements = value.as_array().ok_or(DecodeError::NotAnArray {
        context: "indices",
        found: json_type_name(value),
    })?;

    let mut indices: Vec<usize> = Vec::with_capacity(elements.len());
    for (position, element) in elements.iter().enumerate() {
        let index = read_index(position, element)?;
        if let Some(&previous) = indices.last() {
            if index <= previous {
                return Err(DecodeError::NotAscending {
                    position,
                    previous,
                    index,
                });
            }
        }
        indices.push(index);
    }
    Ok(indices)
}

#[inline]
fn read_index(position: usize, element: &Value) -> Result<usize, DecodeError> {
    let Value::Number(number) = element else {
        return Err(DecodeError::NotAnIndex {
            position,
            found: element.to_string(),
        });
    };
    if let Some(unsigned) = number.as_u64() {
        return usize::try_from(unsigned).map_err(|_| DecodeError::NotAnIndex {
            position,
            found: number.to_string(),
        });
    }
    match number.as_i64() {
        Some(value) => Err(DecodeError::NegativeIndex { position, value }),
        None => Err(DecodeError::NotAnIndex {
            position,
            found: number.to_string(),
        }),
    }
}

/// Decodes an index array into a new [`BitSet`] with default options.
pub fn decode_bitset(value: &Value, capacity: Capacity) -> Result<BitSet, DecodeError> {
    decode_bitset_with_options(value, capacity, &DecodeOptions::default())
}

/// Decodes an index array into a new [`BitSet`] with the given options.
pub fn decode_bitset_with_options(
    value: &Value,
    capacity: Capacity,
    options: &DecodeOptions,
) -> Result<BitSet, DecodeError> {
    decode_set(value, capacity, options)
        .inspect_err(|error| tracing::debug!(%error, ?capacity, "rejected bit set"))
}

pub(crate) fn decode_set(
    value: &Value,
    capacity: Capacity,
    options: &DecodeOptions,
) -> Result<BitSet, DecodeError> {
    let indices = decode_indices(value)?;
    let highest = indices.last().copied();

    let size = match capacity {
        Capacity::Exact(size) => {
            if let Some(index) = highest.filter(|&index| index >= size) {
                return Err(DecodeError::IndexOutOfRange {
                    index,
                    capacity: size,
                });
            }
            size
        }
        Capacity::Inferred => {
            let size = highest.map_or(0, |index| index.saturating_add(1));
            if size > options.max_inferred_capacity {
                return Err(DecodeError::CapacityLimitExceeded {
                    capacity: size,
                    max: options.max_inferred_capacity,
                });
            }
            size
        }
    };

    // Indices are validated ascending and below `size`.
    let mut set = BitSet::with_capacity(size);
    for index in indices {
        set.insert(index);
    }
    Ok(set)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use serde_json::json;

    use super::*;
    use crate::error::ErrorCode;

    fn set(size: usize, indices: &[usize]) -> BitSet {
        BitSet::from_indices(size, indices.iter().copied()).unwrap()
    }

    #[test]
    fn test_encode_wire_example() {
        assert_eq!(encode_bitset(&set(10, &[3, 7, 9])), json!([3, 7, 9]));
        assert_eq!(encode_bitset(&set(10, &[3, 7, 9])).to_string(), "[3,7,9]");
    }

    #[test]
    fn test_empty_set() {
        let empty = BitSet::with_capacity(64);
        assert_eq!(encode_bitset(&empty), json!([]));

        let decoded = decode_bitset(&json!([]), Capacity::Exact(64)).unwrap();
        assert_eq!(decoded, empty);

        let inferred = decode_bitset(&json!([]), Capacity::Inferred).unwrap();
        assert_eq!(inferred.size(), 0);
        assert!(inferred.is_empty());
    }

    #[test]
    fn test_sparsity_independent_of_capacity() {
        let sparse = set(10_000, &[17, 9_998]);
        let encoded = encode_bitset(&sparse);
        assert_eq!(encoded.as_array().unwrap().len(), 2);
        assert_eq!(encoded, json!([17, 9998]));
    }

    #[test]
    fn test_dense_slice_encodes_identically() {
        let mut dense = vec![false; 130];
        dense[0] = true;
        dense[64] = true;
        dense[129] = true;
        assert_eq!(encode_bitset(dense.as_slice()), encode_bitset(&set(130, &[0, 64, 129])));
    }

    #[test]
    fn test_roundtrip_exact() {
        let original = set(200, &[0, 63, 64, 199]);
        let decoded = decode_bitset(&encode_bitset(&original), Capacity::Exact(200)).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_inferred_capacity_drops_trailing_unset() {
        let original = set(200, &[5, 40]);
        let decoded = decode_bitset(&encode_bitset(&original), Capacity::Inferred).unwrap();
        assert_eq!(decoded.size(), 41);
        assert_eq!(decoded.iter().collect::<Vec<_>>(), vec![5, 40]);
    }

    #[test]
    fn test_rejects_disorder() {
        let err = decode_bitset(&json!([5, 3]), Capacity::Exact(10)).unwrap_err();
        assert_eq!(
            err,
            DecodeError::NotAscending {
                position: 1,
                previous: 5,
                index: 3
            }
        );
        assert_eq!(err.code(), ErrorCode::MalformedInput);
    }

    #[test]
    fn test_rejects_duplicates() {
        let err = decode_bitset(&json!([3, 3]), Capacity::Exact(10)).unwrap_err();
        assert!(matches!(err, DecodeError::NotAscending { position: 1, .. }));
        assert_eq!(err.code(), ErrorCode::MalformedInput);
    }

    #[test]
    fn test_rejects_negative() {
        let err = decode_bitset(&json!([-1]), Capacity::Exact(10)).unwrap_err();
        assert_eq!(err, DecodeError::NegativeIndex { position: 0, value: -1 });
        assert_eq!(err.code(), ErrorCode::MalformedInput);
    }

    #[test]
    fn test_rejects_non_integers() {
        for bad in [json!([1.5]), json!([2.0]), json!(["3"]), json!([null]), json!([[1]]), json!([true])] {
            let err = decode_indices(&bad).unwrap_err();
            assert!(matches!(err, DecodeError::NotAnIndex { position: 0, .. }), "{bad}: {err}");
        }
    }

    #[test]
    fn test_rejects_non_array() {
        let err = decode_indices(&json!({"0": 1})).unwrap_err();
        assert_eq!(
            err,
            DecodeError::NotAnArray {
                context: "indices",
                found: "object"
            }
        );
    }

    #[test]
    fn test_rejects_index_past_exact_capacity() {
        let err = decode_bitset(&json!([1, 10]), Capacity::Exact(10)).unwrap_err();
        assert_eq!(err, DecodeError::IndexOutOfRange { index: 10, capacity: 10 });
    }

    #[test]
    fn test_inferred_capacity_limit() {
        let options = DecodeOptions::new().with_max_inferred_capacity(100);
        assert!(decode_bitset_with_options(&json!([99]), Capacity::Inferred, &options).is_ok());

        let err = decode_bitset_with_options(&json!([100]), Capacity::Inferred, &options).unwrap_err();
        assert_eq!(err, DecodeError::CapacityLimitExceeded { capacity: 101, max: 100 });

        let huge = json!([u64::MAX]);
        let err = decode_bitset(&huge, Capacity::Inferred).unwrap_err();
        assert!(matches!(err, DecodeError::CapacityLimitExceeded { .. }));
    }

    #[test]
    fn test_exact_capacity_not_limited() {
        let options = DecodeOptions::new().with_max_inferred_capacity(8);
        let decoded = decode_bitset_with_options(&json!([100]), Capacity::Exact(1000), &options).unwrap();
        assert_eq!(decoded.size(), 1000);
    }

    #[test]
    fn test_sparse_set_serialize() {
        let original = set(50, &[1, 2, 49]);
        let text = serde_json::to_string(&SparseSet(&original)).unwrap();
        assert_eq!(text, "[1,2,49]");
    }

    fn arb_set() -> impl Strategy<Value = BitSet> {
        (0usize..5_000).prop_flat_map(|size| {
            proptest::collection::btree_set(0..size.max(1), 0..=size.min(48))
                .prop_map(move |indices| BitSet::from_indices(size, indices).unwrap())
        })
    }

    proptest! {
        #[test]
        fn prop_roundtrip(original in arb_set()) {
            let encoded = encode_bitset(&original);
            let decoded = decode_bitset(&encoded, Capacity::Exact(original.size())).unwrap();
            prop_assert_eq!(decoded, original);
        }

        #[test]
        fn prop_encoding_is_strictly_ascending(original in arb_set()) {
            let indices = decode_indices(&encode_bitset(&original)).unwrap();
            prop_assert!(indices.windows(2).all(|pair| pair[0] < pair[1]));
        }

        #[test]
        fn prop_length_matches_set_bits(original in arb_set()) {
            let encoded = encode_bitset(&original);
            prop_assert_eq!(encoded.as_array().unwrap().len(), original.count());
        }
    }
}
