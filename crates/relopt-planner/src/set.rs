//! Equivalence set of relational expressions.
//!
//! Members compute the same rows and differ only in traits. They are
//! deduplicated by digest and grouped into subsets by trait set.

use std::collections::{HashMap, HashSet};

use relopt_core::error::{Error, Result};
use relopt_core::schema::Schema;
use relopt_rel::{rel_digest, RelRef, RelTraitSet};

use crate::resolve::Resolution;
use crate::session::PlanningSession;

#[derive(Debug)]
pub struct RelSet {
    row_type: Schema,
    members: Vec<RelRef>,
    digests: HashSet<String>,
    subsets: HashMap<RelTraitSet, Vec<RelRef>>,
}

impl RelSet {
    pub fn new(first: RelRef) -> Self {
        let mut set = Self {
            row_type: first.row_type().clone(),
            members: Vec::new(),
            digests: HashSet::new(),
            subsets: HashMap::new(),
        };
        set.insert(first);
        set
    }

    /// Add an equivalent expression. Returns `Ok(false)` for a duplicate.
    pub fn add(&mut self, rel: RelRef) -> Result<bool> {
        if rel.row_type() != &self.row_type {
            return Err(Error::Invariant(format!(
                "{} has a different row type than its equivalence set",
                rel.name()
            )));
        }
        Ok(self.insert(rel))
    }

    fn insert(&mut self, rel: RelRef) -> bool {
        if !self.digests.insert(rel_digest(rel.as_ref())) {
            return false;
        }
        self.subsets
            .entry(rel.trait_set().clone())
            .or_default()
            .push(RelRef::clone(&rel));
        self.members.push(rel);
        true
    }

    pub fn row_type(&self) -> &Schema {
        &self.row_type
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn members(&self) -> &[RelRef] {
        &self.members
    }

    /// Members with exactly these traits.
    pub fn subset(&self, traits: &RelTraitSet) -> &[RelRef] {
        self.subsets.get(traits).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn subset_count(&self) -> usize {
        self.subsets.len()
    }

    /// First member, in insertion order, whose traits satisfy `required`.
    pub fn find_satisfying(&self, required: &RelTraitSet) -> Option<&RelRef> {
        self.members
            .iter()
            .find(|m| m.trait_set().satisfies(required))
    }

    /// A member meeting `required`, resolving members through `session` when
    /// none does yet. Converters and enforcers produced on the way join the
    /// set. `Ok(None)` if every member is unsatisfiable.
    pub fn resolve(
        &mut self,
        session: &PlanningSession,
        required: &RelTraitSet,
    ) -> Result<Option<RelRef>> {
        if let Some(found) = self.find_satisfying(required) {
            return Ok(Some(RelRef::clone(found)));
        }
        let candidates = self.members.clone();
        for member in &candidates {
            match session.resolve(member, required)? {
                Resolution::Unsatisfiable { .. } => continue,
                resolved => {
                    if let Some(rel) = resolved.into_rel() {
                        self.add(RelRef::clone(&rel))?;
                        return Ok(Some(rel));
                    }
                }
            }
        }
        Ok(None)
    }
}
