//! Session-owned registry of trait kinds.
//!
//! The registry fixes the arity and slot order of every `RelTraitSet` in a
//! planning session. It is populated first, then frozen; once frozen it is
//! read-only and can be shared freely between concurrent searches.

use std::sync::Arc;

use relopt_core::error::{Error, Result};

use crate::trait_set::RelTraitSet;
use crate::traits::{RelTrait, RelTraitDef, TraitKind, TraitRef};

#[derive(Debug, Default)]
pub struct TraitDefRegistry {
    defs: Vec<Arc<dyn RelTraitDef>>,
    frozen: bool,
}

impl TraitDefRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a trait kind. Returns `Ok(false)` if the kind is already present.
    ///
    /// Fails with a configuration error once the registry is frozen.
    pub fn register(&mut self, def: Arc<dyn RelTraitDef>) -> Result<bool> {
        if self.frozen {
            return Err(Error::Config(format!(
                "cannot register trait kind '{}' after planning has started",
                def.kind()
            )));
        }
        if self.slot(def.kind()).is_some() {
            return Ok(false);
        }
        self.defs.push(def);
        Ok(true)
    }

    /// Fix the set of kinds. The convention kind is mandatory: every
    /// expression carries exactly one convention.
    pub fn freeze(&mut self) -> Result<()> {
        if self.slot(TraitKind::CONVENTION).is_none() {
            return Err(Error::Config(
                "the convention trait kind must be registered before planning".to_string(),
            ));
        }
        self.frozen = true;
        Ok(())
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    pub fn kinds(&self) -> impl Iterator<Item = TraitKind> + '_ {
        self.defs.iter().map(|d| d.kind())
    }

    pub fn slot(&self, kind: TraitKind) -> Option<usize> {
        self.defs.iter().position(|d| d.kind() == kind)
    }

    pub fn get(&self, kind: TraitKind) -> Result<&Arc<dyn RelTraitDef>> {
        self.defs
            .iter()
            .find(|d| d.kind() == kind)
            .ok_or_else(|| Error::Registry(format!("trait kind '{kind}' is not registered")))
    }

    pub fn default_value(&self, kind: TraitKind) -> Result<TraitRef> {
        Ok(self.get(kind)?.default_trait())
    }

    pub fn can_convert(
        &self,
        kind: TraitKind,
        from: &dyn RelTrait,
        to: &dyn RelTrait,
    ) -> Result<bool> {
        if from.kind() != kind || to.kind() != kind {
            return Err(Error::Registry(format!(
                "can_convert({kind}) called with {} -> {} values",
                from.kind(),
                to.kind()
            )));
        }
        Ok(self.get(kind)?.can_convert(from, to))
    }

    /// Trait set holding the default value of every registered kind.
    pub fn default_trait_set(&self) -> RelTraitSet {
        RelTraitSet::from_slots(self.defs.iter().map(|d| d.default_trait()).collect())
    }

    /// Trait set with the given values; kinds not mentioned take their
    /// default. Unknown or repeated kinds are rejected.
    pub fn trait_set<I>(&self, traits: I) -> Result<RelTraitSet>
    where
        I: IntoIterator<Item = TraitRef>,
    {
        let mut slots: Vec<Option<TraitRef>> = vec![None; self.defs.len()];
        for t in traits {
            let kind = t.kind();
            let idx = self
                .slot(kind)
                .ok_or_else(|| Error::Registry(format!("trait kind '{kind}' is not registered")))?;
            if slots[idx].is_some() {
                return Err(Error::Registry(format!(
                    "trait kind '{kind}' given more than once"
                )));
            }
            slots[idx] = Some(t);
        }
        let slots = slots
            .into_iter()
            .zip(&self.defs)
            .map(|(t, d)| t.unwrap_or_else(|| d.default_trait()))
            .collect();
        Ok(RelTraitSet::from_slots(slots))
    }

    /// Whether `set` has exactly this registry's slot layout.
    pub fn conforms(&self, set: &RelTraitSet) -> bool {
        set.len() == self.defs.len() && set.kinds().zip(self.kinds()).all(|(a, b)| a == b)
    }
}
