//! Converters: unary nodes that change exactly one trait of their input
//! while producing the same rows.
//!
//! The single-slot law is checked at construction. A converter's output
//! trait set equals its input trait set except, at most, in the slot of the
//! kind it names; a converter naming no kind changes nothing.

use std::any::Any;

use relopt_core::error::{Error, Result};
use relopt_core::id::RelId;
use relopt_core::schema::Schema;

use crate::convention::{Convention, RelCategory};
use crate::plan::ExplainTerms;
use crate::rel::{RelNode, RelRef};
use crate::trait_set::RelTraitSet;
use crate::traits::{downcast_trait, TraitKind, TraitRef};

pub trait Converter: RelNode {
    /// Traits the input must already have.
    fn input_traits(&self) -> &RelTraitSet;

    /// The kind this converter changes; `None` for a no-op converter.
    fn trait_def(&self) -> Option<TraitKind>;

    fn input(&self) -> &RelRef;
}

/// Check that `output` differs from `input` only in the slot of `kind`.
pub fn check_single_slot(
    input: &RelTraitSet,
    output: &RelTraitSet,
    kind: Option<TraitKind>,
) -> Result<()> {
    if !input.same_layout(output) {
        return Err(Error::Converter(format!(
            "trait sets {input} and {output} have different layouts"
        )));
    }
    let changed = input.difference(output);
    match (kind, changed.as_slice()) {
        (_, []) => Ok(()),
        (Some(kind), [only]) if *only == kind => Ok(()),
        (kind, changed) => Err(Error::Converter(format!(
            "converter for {} changes {:?} ({input} -> {output})",
            kind.map_or("no kind", |k| k.name()),
            changed.iter().map(|k| k.name()).collect::<Vec<_>>()
        ))),
    }
}

/// The generic converter synthesized by trait resolution.
#[derive(Debug)]
pub struct ConverterRel {
    id: RelId,
    input: RelRef,
    input_traits: RelTraitSet,
    traits: RelTraitSet,
    kind: Option<TraitKind>,
    category: RelCategory,
}

impl ConverterRel {
    /// Converter whose output replaces the slot of `target`'s kind with
    /// `target`. `NONE` is never a legal target.
    pub fn new(input: RelRef, target: TraitRef) -> Result<Self> {
        let kind = target.kind();
        let traits = input.trait_set().replace(target)?;
        Self::with_traits(input, Some(kind), traits)
    }

    /// Converter that passes its input's traits through unchanged.
    pub fn no_op(input: RelRef) -> Result<Self> {
        let traits = input.trait_set().clone();
        Self::with_traits(input, None, traits)
    }

    /// Converter with an explicit output trait set; rejected unless it
    /// differs from the input's only in the slot of `kind`.
    pub fn with_traits(
        input: RelRef,
        kind: Option<TraitKind>,
        traits: RelTraitSet,
    ) -> Result<Self> {
        let input_traits = input.trait_set().clone();
        check_single_slot(&input_traits, &traits, kind)?;
        if kind == Some(TraitKind::CONVENTION) && traits.convention().is_some_and(|c| c.is_none()) {
            return Err(Error::Converter(format!(
                "cannot convert {} to the NONE convention",
                input.name()
            )));
        }
        let category = traits
            .get(TraitKind::CONVENTION)
            .and_then(|t| downcast_trait::<Convention>(t.as_ref()))
            .map_or(RelCategory::ANY, Convention::interface);
        Ok(Self {
            id: RelId::next(),
            input,
            input_traits,
            traits,
            kind,
            category,
        })
    }
}

impl RelNode for ConverterRel {
    fn id(&self) -> RelId {
        self.id
    }

    fn name(&self) -> &'static str {
        "Converter"
    }

    fn category(&self) -> RelCategory {
        self.category
    }

    fn trait_set(&self) -> &RelTraitSet {
        &self.traits
    }

    fn row_type(&self) -> &Schema {
        self.input.row_type()
    }

    fn inputs(&self) -> Vec<RelRef> {
        vec![RelRef::clone(&self.input)]
    }

    fn explain_terms(&self, terms: &mut ExplainTerms) {
        if let Some(kind) = self.kind {
            terms.item("kind", kind);
        }
    }

    fn as_converter(&self) -> Option<&dyn Converter> {
        Some(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Converter for ConverterRel {
    fn input_traits(&self) -> &RelTraitSet {
        &self.input_traits
    }

    fn trait_def(&self) -> Option<TraitKind> {
        self.kind
    }

    fn input(&self) -> &RelRef {
        &self.input
    }
}
