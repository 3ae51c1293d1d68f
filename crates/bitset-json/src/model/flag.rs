//! Flag enumerations used as collection keys.
//!
//! A flag is serialized through its numeric code. Decoding resolves codes back
//! to members through a [`FlagTable`], which is built once per enumeration and
//! only read afterwards.

use std::fmt;
use std::hash::Hash;

use lazy_static::lazy_static;
use rustc_hash::FxHashMap;

use crate::error::FlagTableError;

/// A closed enumeration with a stable numeric code per member.
pub trait Flag: Copy + Eq + Hash + 'static {
    /// Every member of the enumeration.
    const ALL: &'static [Self];

    /// Returns the member's wire code.
    fn code(self) -> u32;

    /// Resolves a wire code to its member.
    fn from_code(code: u32) -> Option<Self> {
        Self::ALL.iter().copied().find(|flag| flag.code() == code)
    }
}

/// Bijective code-to-member lookup for a [`Flag`] enumeration.
#[derive(Debug, Clone)]
pub struct FlagTable<F> {
    by_code: FxHashMap<u32, F>,
}

impl<F: Flag> FlagTable<F> {
    /// Builds the table from `F::ALL`.
    pub fn new() -> Result<Self, FlagTableError> {
        Self::from_members(F::ALL)
    }

    /// Builds a table from an explicit member list.
    pub fn from_members(members: &[F]) -> Result<Self, FlagTableError> {
        let mut by_code =
            FxHashMap::with_capacity_and_hasher(members.len(), Default::default());
        for &flag in members {
            if by_code.insert(flag.code(), flag).is_some() {
                return Err(FlagTableError::DuplicateCode { code: flag.code() });
            }
        }
        Ok(Self { by_code })
    }

    /// Resolves a wire code to its member.
    #[inline]
    pub fn get(&self, code: u32) -> Option<F> {
        self.by_code.get(&code).copied()
    }

    /// Number of members in the table.
    pub fn len(&self) -> usize {
        self.by_code.len()
    }

    /// Returns true if the table has no members.
    pub fn is_empty(&self) -> bool {
        self.by_code.is_empty()
    }
}

/// Container-loading constraint flags.
///
/// Values are bitmasks; combined members such as [`LoadingFlag::LoadingOnly`]
/// are the union of their parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u32)]
pub enum LoadingFlag {
    NoneSet = 0,
    Complete = 1,
    NoOverlap = 2,
    /// `Complete | NoOverlap`
    LoadingOnly = 3,
    Support = 4,
    Fragility = 8,
    /// `Support | Fragility`
    Stability = 12,
    FullLoad = 15,
}

lazy_static! {
    static ref LOADING_FLAGS: FlagTable<LoadingFlag> =
        // SAFETY: LoadingFlag discriminants are distinct, checked by test_loading_flag_table
        FlagTable::new().expect("LoadingFlag codes are unique");
}

impl LoadingFlag {
    /// Member name as written in source.
    pub fn name(self) -> &'static str {
        match self {
            LoadingFlag::NoneSet => "NoneSet",
            LoadingFlag::Complete => "Complete",
            LoadingFlag::NoOverlap => "NoOverlap",
            LoadingFlag::LoadingOnly => "LoadingOnly",
            LoadingFlag::Support => "Support",
            LoadingFlag::Fragility => "Fragility",
            LoadingFlag::Stability => "Stability",
            LoadingFlag::FullLoad => "FullLoad",
        }
    }

    /// Returns true if every bit of `other` is set in `self`.
    pub fn contains(self, other: LoadingFlag) -> bool {
        self.code() & other.code() == other.code()
    }
}

impl Flag for LoadingFlag {
    const ALL: &'static [Self] = &[
        LoadingFlag::NoneSet,
        LoadingFlag::Complete,
        LoadingFlag::NoOverlap,
        LoadingFlag::LoadingOnly,
        LoadingFlag::Support,
        LoadingFlag::Fragility,
        LoadingFlag::Stability,
        LoadingFlag::FullLoad,
    ];

    #[inline]
    fn code(self) -> u32 {
        self as u32
    }

    fn from_code(code: u32) -> Option<Self> {
        LOADING_FLAGS.get(code)
    }
}

impl fmt::Display for LoadingFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
