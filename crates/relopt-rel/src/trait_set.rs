//! Fixed-arity tuple of trait values, one slot per registered kind.
//!
//! A trait set is immutable; "changing" a trait yields a new set. Sets are
//! built through `TraitDefRegistry` so all sets in a session share the same
//! slot layout.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use relopt_core::error::{Error, Result};

use crate::collation::RelCollation;
use crate::convention::Convention;
use crate::distribution::RelDistribution;
use crate::traits::{downcast_trait, RelTrait, TraitKind, TraitRef};

#[derive(Clone)]
pub struct RelTraitSet {
    slots: Arc<[TraitRef]>,
}

impl RelTraitSet {
    pub(crate) fn from_slots(slots: Vec<TraitRef>) -> Self {
        Self {
            slots: slots.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TraitRef> {
        self.slots.iter()
    }

    pub fn kinds(&self) -> impl Iterator<Item = TraitKind> + '_ {
        self.slots.iter().map(|t| t.kind())
    }

    pub fn get(&self, kind: TraitKind) -> Option<&TraitRef> {
        self.slots.iter().find(|t| t.kind() == kind)
    }

    pub fn get_as<T: RelTrait>(&self, kind: TraitKind) -> Option<&T> {
        self.get(kind).and_then(|t| downcast_trait::<T>(t.as_ref()))
    }

    pub fn convention(&self) -> Option<&Convention> {
        self.get_as(TraitKind::CONVENTION)
    }

    pub fn collation(&self) -> Option<&RelCollation> {
        self.get_as(TraitKind::COLLATION)
    }

    pub fn distribution(&self) -> Option<&RelDistribution> {
        self.get_as(TraitKind::DISTRIBUTION)
    }

    /// False while the convention is `NONE` (or missing).
    pub fn is_implementable(&self) -> bool {
        self.convention().is_some_and(|c| !c.is_none())
    }

    /// New set with the slot of `t`'s kind replaced by `t`.
    pub fn replace(&self, t: TraitRef) -> Result<RelTraitSet> {
        let kind = t.kind();
        let idx = self
            .slots
            .iter()
            .position(|s| s.kind() == kind)
            .ok_or_else(|| Error::Registry(format!("trait set has no '{kind}' slot")))?;
        if *self.slots[idx] == *t {
            return Ok(self.clone());
        }
        let mut slots = self.slots.to_vec();
        slots[idx] = t;
        Ok(Self::from_slots(slots))
    }

    /// Like [`RelTraitSet::replace`], but a missing slot leaves the set as is.
    pub fn replace_if_present(&self, t: TraitRef) -> RelTraitSet {
        self.replace(t).unwrap_or_else(|_| self.clone())
    }

    /// Replace every slot named by `traits`.
    pub fn replace_all<I>(&self, traits: I) -> Result<RelTraitSet>
    where
        I: IntoIterator<Item = TraitRef>,
    {
        let mut out = self.clone();
        for t in traits {
            out = out.replace(t)?;
        }
        Ok(out)
    }

    pub fn same_layout(&self, other: &RelTraitSet) -> bool {
        self.len() == other.len() && self.kinds().zip(other.kinds()).all(|(a, b)| a == b)
    }

    /// Whether every slot satisfies the corresponding slot of `required`.
    /// Sets with different layouts never satisfy each other.
    pub fn satisfies(&self, required: &RelTraitSet) -> bool {
        self.same_layout(required)
            && self
                .slots
                .iter()
                .zip(required.slots.iter())
                .all(|(have, want)| have.satisfies(want.as_ref()))
    }

    /// Kinds whose values are not equal in the two sets.
    pub fn difference(&self, other: &RelTraitSet) -> Vec<TraitKind> {
        let mut kinds = Vec::new();
        for t in self.slots.iter() {
            match other.get(t.kind()) {
                Some(o) if **o == **t => {}
                _ => kinds.push(t.kind()),
            }
        }
        for o in other.slots.iter() {
            if self.get(o.kind()).is_none() {
                kinds.push(o.kind());
            }
        }
        kinds
    }

    /// Kinds whose provided value does not satisfy the required one.
    pub fn unsatisfied(&self, required: &RelTraitSet) -> Vec<TraitKind> {
        required
            .slots
            .iter()
            .filter(|want| {
                !self
                    .get(want.kind())
                    .is_some_and(|have| have.satisfies(want.as_ref()))
            })
            .map(|want| want.kind())
            .collect()
    }
}

impl PartialEq for RelTraitSet {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.slots, &other.slots) || self.slots == other.slots
    }
}

impl Eq for RelTraitSet {}

impl Hash for RelTraitSet {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for t in self.slots.iter() {
            t.hash(state);
        }
    }
}

/// `CONVENTION.[collation].distribution`, slots joined by dots.
impl fmt::Display for RelTraitSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, t) in self.slots.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{t}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for RelTraitSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RelTraitSet({self})")
    }
}
