//! Trait values and trait kinds.
//!
//! A trait is one physical property of a relational expression (its
//! convention, its collation, ...). Values are immutable, usually
//! pre-allocated and shared by `Arc`, and compared by value: two instances
//! of the same kind with the same logical value are interchangeable.
//!
//! Invariants every `RelTrait` implementation must keep:
//! - `satisfies` is reflexive and a pure function of the two values.
//! - `eq_trait`/`hash_trait` agree with each other and only look at content.

use std::any::Any;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use relopt_core::error::Result;

use crate::converter::ConverterRel;
use crate::rel::RelRef;

/// Identity of a trait kind; names the `RelTraitDef` that owns the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TraitKind(&'static str);

impl TraitKind {
    pub const CONVENTION: TraitKind = TraitKind("convention");
    pub const COLLATION: TraitKind = TraitKind("collation");
    pub const DISTRIBUTION: TraitKind = TraitKind("distribution");

    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub fn name(self) -> &'static str {
        self.0
    }
}

impl fmt::Display for TraitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

pub trait RelTrait: fmt::Debug + fmt::Display + Send + Sync + 'static {
    fn kind(&self) -> TraitKind;

    /// Whether this (provided) value meets `required`. Values of another kind
    /// never satisfy.
    fn satisfies(&self, required: &dyn RelTrait) -> bool;

    fn as_any(&self) -> &dyn Any;

    fn eq_trait(&self, other: &dyn RelTrait) -> bool;

    fn hash_trait(&self, state: &mut dyn Hasher);
}

pub type TraitRef = Arc<dyn RelTrait>;

impl PartialEq for dyn RelTrait {
    fn eq(&self, other: &Self) -> bool {
        self.eq_trait(other)
    }
}

impl Eq for dyn RelTrait {}

impl Hash for dyn RelTrait {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind().hash(state);
        self.hash_trait(state);
    }
}

/// Downcast a trait value to its concrete type.
pub fn downcast_trait<T: RelTrait>(t: &dyn RelTrait) -> Option<&T> {
    t.as_any().downcast_ref::<T>()
}

/// `eq_trait` for value types: equal iff same concrete type and `==`.
pub fn trait_eq<T: RelTrait + PartialEq>(this: &T, other: &dyn RelTrait) -> bool {
    downcast_trait::<T>(other).is_some_and(|o| o == this)
}

/// `hash_trait` for value types.
pub fn trait_hash<T: Hash>(this: &T, mut state: &mut dyn Hasher) {
    this.hash(&mut state);
}

/// Registry/policy object for one trait kind.
///
/// One instance per kind per planning session; registered before the search
/// starts and never removed during it.
pub trait RelTraitDef: fmt::Debug + Send + Sync + 'static {
    fn kind(&self) -> TraitKind;

    /// Value used to pad trait sets of expressions that do not care about
    /// this kind.
    fn default_trait(&self) -> TraitRef;

    /// Whether a converter may bridge `from` to `to`. Must be a pure function
    /// of the two values so callers can memoize it.
    fn can_convert(&self, from: &dyn RelTrait, to: &dyn RelTrait) -> bool;

    /// Wrap `rel` in a converter whose trait of this kind is `to`.
    ///
    /// `Ok(None)` when this kind cannot convert between the two values.
    fn convert(&self, rel: &RelRef, to: &TraitRef) -> Result<Option<RelRef>> {
        let Some(from) = rel.trait_set().get(self.kind()) else {
            return Ok(None);
        };
        if !self.can_convert(from.as_ref(), to.as_ref()) {
            return Ok(None);
        }
        let converter = ConverterRel::new(Arc::clone(rel), Arc::clone(to))?;
        Ok(Some(Arc::new(converter)))
    }
}
