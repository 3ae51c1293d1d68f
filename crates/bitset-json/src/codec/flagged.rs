//! JSON encoding for flag-keyed collections of bit sets.
//!
//! A collection is written as a JSON object. Each key is the decimal code of
//! a flag and each value is the array of that flag's sets, in order:
//!
//! ```text
//! {"3": [[3,7], []], "12": [[0]]}
//! ```
//!
//! Key order in the object is unspecified.

use std::collections::HashMap;
use std::fmt;
use std::hash::BuildHasher;

use serde::de::{self, Deserializer, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde_json::{Map, Value};

use crate::codec::json_type_name;
use crate::codec::sparse::{decode_set, encode_bitset, Capacity, DecodeOptions};
use crate::error::DecodeError;
use crate::model::{BitIndexed, Flag, FlaggedCollection};

// =============================================================================
// ENCODING
// =============================================================================

/// Encodes a collection as a JSON object keyed by flag code.
pub fn encode_flagged<F, S, H>(collection: &HashMap<F, Vec<S>, H>) -> Value
where
    F: Flag,
    S: BitIndexed,
    H: BuildHasher,
{
    let mut object = Map::with_capacity(collection.len());
    for (flag, sets) in collection {
        let encoded = sets.iter().map(encode_bitset).collect();
        object.insert(flag.code().to_string(), Value::Array(encoded));
    }
    tracing::trace!(entries = object.len(), "encoded flagged collection");
    Value::Object(object)
}

/// Encodes a collection straight to JSON text.
pub fn to_json_string<F, S, H>(collection: &HashMap<F, Vec<S>, H>) -> String
where
    F: Flag,
    S: BitIndexed,
    H: BuildHasher,
{
    encode_flagged(collection).to_string()
}

// =============================================================================
// DECODING
// =============================================================================

/// Parses an object key as a flag code.
///
/// Only the canonical decimal form is accepted: ASCII digits, no sign, no
/// leading zeros (`"0"` itself is fine), no surrounding whitespace. Canonical
/// keys keep the key-to-code mapping one-to-one, so two keys of one object can
/// never decode to the same flag.
pub fn parse_flag_key(key: &str) -> Result<u64, DecodeError> {
    let bytes = key.as_bytes();
    let canonical = match bytes {
        [] => false,
        [b'0'] => true,
        [b'0', ..] => false,
        _ => bytes.iter().all(u8::is_ascii_digit),
    };
    if !canonical {
        return Err(DecodeError::InvalidFlagKey {
            key: key.to_string(),
        });
    }
    key.parse().map_err(|_| DecodeError::InvalidFlagKey {
        key: key.to_string(),
    })
}

fn resolve_flag<F: Flag>(key: &str) -> Result<F, DecodeError> {
    let code = parse_flag_key(key)?;
    u32::try_from(code)
        .ok()
        .and_then(F::from_code)
        .ok_or(DecodeError::UnknownFlagCode { code })
}

/// Decodes a collection with default options.
pub fn decode_flagged<F: Flag>(
    value: &Value,
    capacity: Capacity,
) -> Result<FlaggedCollection<F>, DecodeError> {
    decode_flagged_with_options(value, capacity, &DecodeOptions::default())
}

/// Decodes a collection with the given options.
///
/// Every set is decoded with the same `capacity` policy. The first failure
/// aborts the whole call; no partial collection is returned.
pub fn decode_flagged_with_options<F: Flag>(
    value: &Value,
    capacity: Capacity,
    options: &DecodeOptions,
) -> Result<FlaggedCollection<F>, DecodeError> {
    decode_entries(value, capacity, options)
        .inspect_err(|error| tracing::debug!(%error, ?capacity, "rejected flagged collection"))
}

/// Parses JSON text and decodes it as a collection.
///
/// Unlike a plain parse into [`Value`], which keeps only the last of several
/// equal keys, a repeated top-level key is rejected with
/// [`DecodeError::DuplicateFlagKey`].
pub fn from_json_str<F: Flag>(
    text: &str,
    capacity: Capacity,
) -> Result<FlaggedCollection<F>, DecodeError> {
    let object = parse_object(text)
        .inspect_err(|error| tracing::debug!(%error, "rejected flagged collection text"))?;
    decode_flagged(&Value::Object(object), capacity)
}

fn parse_object(text: &str) -> Result<Map<String, Value>, DecodeError> {
    let mut deserializer = serde_json::Deserializer::from_str(text);
    let object = (&mut deserializer).deserialize_any(UniqueKeyObject)?;
    deserializer.end()?;
    object
}

/// Reads a top-level object, failing on the first repeated key.
///
/// Shape errors are returned as the visitor's value so the parser still
/// consumes the whole input and syntax errors take precedence.
struct UniqueKeyObject;

impl UniqueKeyObject {
    fn not_an_object<E>(found: &'static str) -> Result<ParsedObject, E> {
        Ok(Err(DecodeError::NotAnObject { found }))
    }
}

type ParsedObject = Result<Map<String, Value>, DecodeError>;

impl<'de> Visitor<'de> for UniqueKeyObject {
    type Value = ParsedObject;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an object of flag collections")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut object = Map::new();
        while let Some((key, value)) = access.next_entry::<String, Value>()? {
            if object.contains_key(&key) {
                while access.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
                return Ok(Err(DecodeError::DuplicateFlagKey { key }));
            }
            object.insert(key, value);
        }
        Ok(Ok(object))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        while access.next_element::<IgnoredAny>()?.is_some() {}
        Self::not_an_object("array")
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Self::not_an_object("null")
    }

    fn visit_bool<E: de::Error>(self, _: bool) -> Result<Self::Value, E> {
        Self::not_an_object("boolean")
    }

    fn visit_i64<E: de::Error>(self, _: i64) -> Result<Self::Value, E> {
        Self::not_an_object("number")
    }

    fn visit_u64<E: de::Error>(self, _: u64) -> Result<Self::Value, E> {
        Self::not_an_object("number")
    }

    fn visit_f64<E: de::Error>(self, _: f64) -> Result<Self::Value, E> {
        Self::not_an_object("number")
    }

    fn visit_str<E: de::Error>(self, _: &str) -> Result<Self::Value, E> {
        Self::not_an_object("string")
    }
}

fn decode_entries<F: Flag>(
    value: &Value,
    capacity: Capacity,
    options: &DecodeOptions,
) -> Result<FlaggedCollection<F>, DecodeError> {
    let object = value.as_object().ok_or(DecodeError::NotAnObject {
        found: json_type_name(value),
    })?;

    let mut collection =
        FlaggedCollection::with_capacity_and_hasher(object.len(), Default::default());
    for (key, entry) in object {
        let flag = resolve_flag::<F>(key)?;
        let elements = entry.as_array().ok_or_else(|| DecodeError::InFlag {
            key: key.clone(),
            source: Box::new(DecodeError::NotAnArray {
                context: "bit sets",
                found: json_type_name(entry),
            }),
        })?;

        let mut sets = Vec::with_capacity(elements.len());
        for (position, element) in elements.iter().enumerate() {
            let set = decode_set(element, capacity, options).map_err(|source| {
                DecodeError::Entry {
                    key: key.clone(),
                    position,
                    source: Box::new(source),
                }
            })?;
            sets.push(set);
        }
        collection.insert(flag, sets);
    }
    Ok(collection)
}
