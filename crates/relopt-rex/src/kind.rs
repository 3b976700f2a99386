//! Discriminator tags for scalar expressions and the sets that group them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Semantic kind of an expression node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Kind {
    Other = 0,
    Literal,
    InputRef,
    DynamicParam,
    Equals,
    NotEquals,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    And,
    Or,
    Not,
    IsNull,
    IsNotNull,
    Plus,
    Minus,
    Times,
    Divide,
    MinusPrefix,
    Cast,
    OtherFunction,
}

impl Kind {
    pub const fn bit(self) -> u64 {
        1u64 << (self as u8)
    }

    /// True iff this kind is a member of `set`.
    pub fn belongs_to(self, set: KindSet) -> bool {
        set.contains(self)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A closed set of kinds, e.g. "comparison" subsuming `=`, `<`, `>=`, ...
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct KindSet(u64);

impl KindSet {
    pub const EMPTY: KindSet = KindSet(0);

    pub const COMPARISON: KindSet = KindSet::of(&[
        Kind::Equals,
        Kind::NotEquals,
        Kind::LessThan,
        Kind::LessThanOrEqual,
        Kind::GreaterThan,
        Kind::GreaterThanOrEqual,
    ]);

    pub const BINARY_ARITHMETIC: KindSet =
        KindSet::of(&[Kind::Plus, Kind::Minus, Kind::Times, Kind::Divide]);

    pub const ARITHMETIC: KindSet = KindSet::BINARY_ARITHMETIC.with(Kind::MinusPrefix);

    pub const LOGICAL: KindSet = KindSet::of(&[Kind::And, Kind::Or, Kind::Not]);

    pub const NULL_TESTS: KindSet = KindSet::of(&[Kind::IsNull, Kind::IsNotNull]);

    /// Leaf kinds: nodes that never have operands.
    pub const LEAVES: KindSet = KindSet::of(&[Kind::Literal, Kind::InputRef, Kind::DynamicParam]);

    pub const fn of(kinds: &[Kind]) -> KindSet {
        let mut bits = 0u64;
        let mut i = 0;
        while i < kinds.len() {
            bits |= kinds[i].bit();
            i += 1;
        }
        KindSet(bits)
    }

    pub const fn with(self, kind: Kind) -> KindSet {
        KindSet(self.0 | kind.bit())
    }

    pub const fn union(self, other: KindSet) -> KindSet {
        KindSet(self.0 | other.0)
    }

    pub const fn contains(self, kind: Kind) -> bool {
        self.0 & kind.bit() != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl From<Kind> for KindSet {
    fn from(kind: Kind) -> Self {
        KindSet(kind.bit())
    }
}
