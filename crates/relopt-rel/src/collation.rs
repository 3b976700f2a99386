//! Sort-order trait kind.

use std::any::Any;
use std::fmt;
use std::hash::Hasher;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::traits::{trait_eq, trait_hash, RelTrait, RelTraitDef, TraitKind, TraitRef};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NullDirection {
    First,
    Last,
    Unspecified,
}

/// Ordering on a single field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldCollation {
    pub field: usize,
    pub direction: Direction,
    pub nulls: NullDirection,
}

impl FieldCollation {
    pub fn asc(field: usize) -> Self {
        Self {
            field,
            direction: Direction::Ascending,
            nulls: NullDirection::Unspecified,
        }
    }

    pub fn desc(field: usize) -> Self {
        Self {
            field,
            direction: Direction::Descending,
            nulls: NullDirection::Unspecified,
        }
    }

    pub fn with_nulls(mut self, nulls: NullDirection) -> Self {
        self.nulls = nulls;
        self
    }
}

impl fmt::Display for FieldCollation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.field)?;
        if self.direction == Direction::Descending {
            f.write_str(" DESC")?;
        }
        match self.nulls {
            NullDirection::First => f.write_str(" NULLS FIRST"),
            NullDirection::Last => f.write_str(" NULLS LAST"),
            NullDirection::Unspecified => Ok(()),
        }
    }
}

/// Ordered list of field collations. Empty means "no particular order".
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RelCollation {
    fields: Vec<FieldCollation>,
}

impl RelCollation {
    pub fn new(fields: Vec<FieldCollation>) -> Self {
        Self { fields }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Ascending on each field in turn.
    pub fn of(fields: &[usize]) -> Self {
        Self::new(fields.iter().copied().map(FieldCollation::asc).collect())
    }

    pub fn fields(&self) -> &[FieldCollation] {
        &self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Required order is a prefix of this one.
    pub fn satisfies_collation(&self, required: &RelCollation) -> bool {
        self.fields.starts_with(&required.fields)
    }

    /// Renumber fields through `map`. The result is the longest prefix
    /// whose fields all survive; order past a dropped field is lost.
    pub fn apply_mapping(&self, map: impl Fn(usize) -> Option<usize>) -> RelCollation {
        let fields = self
            .fields
            .iter()
            .map_while(|fc| map(fc.field).map(|field| FieldCollation { field, ..*fc }))
            .collect();
        Self::new(fields)
    }

    pub fn into_trait(self) -> TraitRef {
        Arc::new(self)
    }
}

impl fmt::Display for RelCollation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, fc) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{fc}")?;
        }
        f.write_str("]")
    }
}

impl RelTrait for RelCollation {
    fn kind(&self) -> TraitKind {
        TraitKind::COLLATION
    }

    fn satisfies(&self, required: &dyn RelTrait) -> bool {
        required
            .as_any()
            .downcast_ref::<RelCollation>()
            .is_some_and(|r| self.satisfies_collation(r))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn eq_trait(&self, other: &dyn RelTrait) -> bool {
        trait_eq(self, other)
    }

    fn hash_trait(&self, state: &mut dyn Hasher) {
        trait_hash(self, state);
    }
}

/// Collation changes are realized by a convention's `enforce` (a sort),
/// never by generic converters.
#[derive(Debug, Default)]
pub struct RelCollationTraitDef;

impl RelTraitDef for RelCollationTraitDef {
    fn kind(&self) -> TraitKind {
        TraitKind::COLLATION
    }

    fn default_trait(&self) -> TraitRef {
        RelCollation::empty().into_trait()
    }

    fn can_convert(&self, _from: &dyn RelTrait, _to: &dyn RelTrait) -> bool {
        false
    }
}
