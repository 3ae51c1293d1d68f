//! Resource limits for decoding untrusted input.
//!
//! The sparse wire form does not carry capacity, so a decoder that infers it
//! from the largest index would otherwise let a single large integer force an
//! arbitrarily large allocation.

/// Maximum capacity a set may be given when capacity is inferred (2^24 bits, 2 MiB).
pub const MAX_INFERRED_CAPACITY: usize = 1 << 24;
