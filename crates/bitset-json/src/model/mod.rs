//! Data model types.
//!
//! - Bit-indexed sets ([`BitIndexed`], [`BitSet`])
//! - Flag enumerations ([`Flag`], [`FlagTable`], [`LoadingFlag`])
//! - Flagged collections (flag to ordered list of sets)

pub mod bitset;
pub mod flag;

use rustc_hash::FxHashMap;

pub use bitset::{BitIndexed, BitSet, Ones};
pub use flag::{Flag, FlagTable, LoadingFlag};

/// Mapping from flag to an ordered list of sets. List order is significant.
pub type FlaggedCollection<F, S = BitSet> = FxHashMap<F, Vec<S>>;
