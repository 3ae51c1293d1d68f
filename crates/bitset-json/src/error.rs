//! Error types for bit-set and flagged-collection decoding.

use thiserror::Error;

/// Error codes surfaced by the decoders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// E001: JSON shape violates the wire contract
    MalformedInput,
    /// E002: Object key does not name a flag member
    UnknownFlagCode,
}

impl ErrorCode {
    /// Returns the error code string (e.g., "E001").
    pub fn code(&self) -> &'static str {
        match self {
            ErrorCode::MalformedInput => "E001",
            ErrorCode::UnknownFlagCode => "E002",
        }
    }
}

/// Error during JSON decoding.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    // === E001: Malformed input ===
    #[error("[E001] invalid JSON text: {0}")]
    InvalidJson(String),

    #[error("[E001] expected array of {context}, found {found}")]
    NotAnArray {
        context: &'static str,
        found: &'static str,
    },

    #[error("[E001] expected object of flag collections, found {found}")]
    NotAnObject { found: &'static str },

    #[error("[E001] element {position} is not an integer index: {found}")]
    NotAnIndex { position: usize, found: String },

    #[error("[E001] element {position} is a negative index: {value}")]
    NegativeIndex { position: usize, value: i64 },

    #[error("[E001] element {position} ({index}) does not follow {previous} in ascending order")]
    NotAscending {
        position: usize,
        previous: usize,
        index: usize,
    },

    #[error("[E001] index {index} out of range (capacity: {capacity})")]
    IndexOutOfRange { index: usize, capacity: usize },

    #[error("[E001] inferred capacity {capacity} exceeds maximum {max}")]
    CapacityLimitExceeded { capacity: usize, max: usize },

    #[error("[E001] flag key {key:?} is not a base-10 non-negative integer")]
    InvalidFlagKey { key: String },

    #[error("[E001] flag key {key:?} appears more than once")]
    DuplicateFlagKey { key: String },

    // === E002: Unknown flag code ===
    #[error("[E002] unknown flag code: {code}")]
    UnknownFlagCode { code: u64 },

    // === Nested ===
    #[error("flag {key:?}: {source}")]
    InFlag {
        key: String,
        #[source]
        source: Box<DecodeError>,
    },

    #[error("flag {key:?}, set {position}: {source}")]
    Entry {
        key: String,
        position: usize,
        #[source]
        source: Box<DecodeError>,
    },
}

impl DecodeError {
    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            DecodeError::UnknownFlagCode { .. } => ErrorCode::UnknownFlagCode,
            DecodeError::InFlag { source, .. } | DecodeError::Entry { source, .. } => {
                source.code()
            }
            _ => ErrorCode::MalformedInput,
        }
    }

    /// Returns the innermost error, unwrapping any `InFlag` or `Entry` context.
    pub fn root(&self) -> &DecodeError {
        match self {
            DecodeError::InFlag { source, .. } | DecodeError::Entry { source, .. } => {
                source.root()
            }
            other => other,
        }
    }
}

impl From<serde_json::Error> for DecodeError {
    fn from(err: serde_json::Error) -> Self {
        DecodeError::InvalidJson(err.to_string())
    }
}

/// Error constructing a [`BitSet`](crate::BitSet) from explicit indices.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BitSetError {
    #[error("index {index} out of range (capacity: {capacity})")]
    IndexOutOfRange { index: usize, capacity: usize },
}

/// Error building a [`FlagTable`](crate::FlagTable).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlagTableError {
    #[error("flag code {code} is shared by more than one member")]
    DuplicateCode { code: u32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(DecodeError::NegativeIndex { position: 0, value: -1 }.code().code(), "E001");
        assert_eq!(DecodeError::UnknownFlagCode { code: 999 }.code().code(), "E002");
    }

    #[test]
    fn test_entry_delegates_code() {
        let err = DecodeError::Entry {
            key: "3".to_string(),
            position: 1,
            source: Box::new(DecodeError::UnknownFlagCode { code: 7 }),
        };
        assert_eq!(err.code(), ErrorCode::UnknownFlagCode);
        assert_eq!(err.root(), &DecodeError::UnknownFlagCode { code: 7 });
    }

    #[test]
    fn test_in_flag_delegates_code() {
        let err = DecodeError::InFlag {
            key: "3".to_string(),
            source: Box::new(DecodeError::NotAnArray { context: "bit sets", found: "object" }),
        };
        assert_eq!(err.code(), ErrorCode::MalformedInput);
        assert!(err.to_string().starts_with("flag \"3\": [E001]"), "{err}");
    }

    #[test]
    fn test_entry_message_names_location() {
        let err = DecodeError::Entry {
            key: "12".to_string(),
            position: 0,
            source: Box::new(DecodeError::NotAscending { position: 1, previous: 5, index: 3 }),
        };
        let msg = err.to_string();
        assert!(msg.starts_with("flag \"12\", set 0: [E001]"), "{msg}");
    }
}
