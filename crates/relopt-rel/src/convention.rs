//! Calling conventions: the trait kind that partitions expressions into
//! physical execution families.
//!
//! Every expression carries exactly one convention. Logical expressions
//! start in [`Convention::none`], which is not implementable and must be
//! converted to something else before a plan can run.
//!
//! Behavior of a convention lives in its [`ConventionPolicy`]. With no
//! method overridden, `enforce` fails with `Error::Unsupported` and every
//! implicit conversion is refused. A configured convention with no
//! enforcement path for a request returns `Ok(None)` instead; the two
//! outcomes stay distinguishable.

use std::any::Any;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use once_cell::sync::Lazy;
use relopt_core::error::{Error, Result};

use crate::factories::RelFactories;
use crate::rel::RelRef;
use crate::trait_set::RelTraitSet;
use crate::traits::{downcast_trait, trait_eq, RelTrait, RelTraitDef, TraitKind, TraitRef};

/// Category of relational expression shapes legal under a convention.
/// Used by plan validators, not by the search hot path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RelCategory(&'static str);

impl RelCategory {
    /// Admits every category.
    pub const ANY: RelCategory = RelCategory("rel");
    /// Plain logical nodes, before any physical implementation is chosen.
    pub const LOGICAL: RelCategory = RelCategory("logical");

    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub fn name(self) -> &'static str {
        self.0
    }

    /// Whether an expression of category `other` is legal here.
    pub fn admits(self, other: RelCategory) -> bool {
        self == RelCategory::ANY || self == other
    }
}

impl fmt::Display for RelCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Behavior of a convention.
pub trait ConventionPolicy: Send + Sync + 'static {
    /// Produce a physical node around `input` that also satisfies the
    /// non-convention slots of `required` (a sort, an exchange, ...).
    ///
    /// `Ok(None)`: enforcement is not allowed or `required` cannot be met.
    /// The default is for unconfigured conventions and fails loudly.
    fn enforce(
        &self,
        convention: &Convention,
        _input: &RelRef,
        _required: &RelTraitSet,
    ) -> Result<Option<RelRef>> {
        Err(Error::Unsupported {
            convention: convention.name().to_string(),
        })
    }

    /// Whether a generic converter may bridge `convention` to `target`.
    fn can_convert_convention(&self, _convention: &Convention, _target: &Convention) -> bool {
        false
    }

    /// Whether abstract converters should be synthesized for non-convention
    /// slot mismatches. Conventions that handle those with their own rules
    /// leave this false.
    fn use_abstract_converters_for_conversion(
        &self,
        _from: &RelTraitSet,
        _to: &RelTraitSet,
    ) -> bool {
        false
    }

    /// Node-construction callbacks for this convention's operators. The
    /// default builds logical nodes.
    fn rel_factories(&self, _convention: &Convention) -> RelFactories {
        RelFactories::default()
    }
}

/// Policy of [`Convention::simple`]: never enforces, never converts.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimplePolicy;

impl ConventionPolicy for SimplePolicy {
    fn enforce(
        &self,
        _convention: &Convention,
        _input: &RelRef,
        _required: &RelTraitSet,
    ) -> Result<Option<RelRef>> {
        Ok(None)
    }
}

/// Policy of a physical convention that enforces distribution with an
/// exchange and collation with a sort, both built by its own factories.
///
/// Conversions and abstract converters are opt-in through the builder
/// methods.
#[derive(Debug, Clone, Default)]
pub struct PhysicalPolicy {
    converts_to: BTreeSet<String>,
    enforce_collation: bool,
    enforce_distribution: bool,
    abstract_converters: bool,
}

impl PhysicalPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allow generic converters from this convention to `target`.
    pub fn converts_to(mut self, target: impl Into<String>) -> Self {
        self.converts_to.insert(target.into());
        self
    }

    pub fn sorts(mut self) -> Self {
        self.enforce_collation = true;
        self
    }

    pub fn exchanges(mut self) -> Self {
        self.enforce_distribution = true;
        self
    }

    pub fn abstract_converters(mut self) -> Self {
        self.abstract_converters = true;
        self
    }
}

impl ConventionPolicy for PhysicalPolicy {
    fn enforce(
        &self,
        convention: &Convention,
        input: &RelRef,
        required: &RelTraitSet,
    ) -> Result<Option<RelRef>> {
        if input.trait_set().convention() != Some(convention) {
            return Ok(None);
        }
        let factories = self.rel_factories(convention);
        let mut rel = Arc::clone(input);
        if let Some(want) = required.distribution() {
            let met = rel
                .trait_set()
                .distribution()
                .is_some_and(|have| have.satisfies_distribution(want));
            if !met {
                if !self.enforce_distribution {
                    return Ok(None);
                }
                rel = (factories.exchange)(rel, want.clone())?;
            }
        }
        if let Some(want) = required.collation() {
            let met = rel
                .trait_set()
                .collation()
                .is_some_and(|have| have.satisfies_collation(want));
            if !met {
                if !self.enforce_collation {
                    return Ok(None);
                }
                rel = (factories.sort)(rel, want.clone())?;
            }
        }
        if !rel.trait_set().satisfies(required) {
            return Ok(None);
        }
        Ok(Some(rel))
    }

    fn can_convert_convention(&self, _convention: &Convention, target: &Convention) -> bool {
        self.converts_to.contains(target.name())
    }

    fn use_abstract_converters_for_conversion(
        &self,
        _from: &RelTraitSet,
        _to: &RelTraitSet,
    ) -> bool {
        self.abstract_converters
    }

    fn rel_factories(&self, convention: &Convention) -> RelFactories {
        RelFactories::for_category(convention.interface())
    }
}

/// Policy that overrides nothing; every default applies.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnconfiguredPolicy;

impl ConventionPolicy for UnconfiguredPolicy {}

pub struct Convention {
    name: String,
    interface: RelCategory,
    policy: Arc<dyn ConventionPolicy>,
}

pub type ConventionRef = Arc<Convention>;

static NONE: Lazy<ConventionRef> =
    Lazy::new(|| Arc::new(Convention::new("NONE", RelCategory::ANY, SimplePolicy)));

impl Convention {
    pub const NONE_NAME: &'static str = "NONE";

    pub fn new(
        name: impl Into<String>,
        interface: RelCategory,
        policy: impl ConventionPolicy,
    ) -> Self {
        Self {
            name: name.into(),
            interface,
            policy: Arc::new(policy),
        }
    }

    /// Convention whose `enforce` returns `Ok(None)` and that opts out of
    /// every conversion.
    pub fn simple(name: impl Into<String>, interface: RelCategory) -> Self {
        Self::new(name, interface, SimplePolicy)
    }

    /// Convention with no behavior configured; `enforce` fails with
    /// `Error::Unsupported`.
    pub fn with_defaults(name: impl Into<String>, interface: RelCategory) -> Self {
        Self::new(name, interface, UnconfiguredPolicy)
    }

    /// The starting convention of every logical expression. Infinite cost;
    /// nothing converts away from or into it.
    pub fn none() -> ConventionRef {
        Arc::clone(&NONE)
    }

    /// Whether this is the [`Convention::none`] value. Another convention
    /// that merely shares the name is not.
    pub fn is_none(&self) -> bool {
        *self == **NONE
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn interface(&self) -> RelCategory {
        self.interface
    }

    pub fn enforce(&self, input: &RelRef, required: &RelTraitSet) -> Result<Option<RelRef>> {
        self.policy.enforce(self, input, required)
    }

    /// Always false with `NONE` on either side, whatever the policy says.
    pub fn can_convert_convention(&self, target: &Convention) -> bool {
        if self.is_none() || target.is_none() {
            return false;
        }
        self.policy.can_convert_convention(self, target)
    }

    pub fn use_abstract_converters_for_conversion(
        &self,
        from: &RelTraitSet,
        to: &RelTraitSet,
    ) -> bool {
        self.policy.use_abstract_converters_for_conversion(from, to)
    }

    pub fn rel_factories(&self) -> RelFactories {
        self.policy.rel_factories(self)
    }
}

impl PartialEq for Convention {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.interface == other.interface
    }
}

impl Eq for Convention {}

impl Hash for Convention {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.interface.hash(state);
    }
}

impl fmt::Display for Convention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl fmt::Debug for Convention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Convention")
            .field("name", &self.name)
            .field("interface", &self.interface)
            .finish_non_exhaustive()
    }
}

impl RelTrait for Convention {
    fn kind(&self) -> TraitKind {
        TraitKind::CONVENTION
    }

    /// Exact equality.
    fn satisfies(&self, required: &dyn RelTrait) -> bool {
        self.eq_trait(required)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn eq_trait(&self, other: &dyn RelTrait) -> bool {
        trait_eq(self, other)
    }

    fn hash_trait(&self, mut state: &mut dyn Hasher) {
        self.hash(&mut state);
    }
}

/// Trait kind for conventions.
///
/// Besides the per-convention `can_convert_convention` opt-in, it keeps a
/// directed graph of conversions contributed by converter rules: `from` can
/// convert to `to` if a path exists.
#[derive(Debug)]
pub struct ConventionTraitDef {
    conventions: BTreeMap<String, ConventionRef>,
    edges: BTreeMap<String, BTreeSet<String>>,
}

impl Default for ConventionTraitDef {
    fn default() -> Self {
        Self::new()
    }
}

impl ConventionTraitDef {
    pub fn new() -> Self {
        let mut conventions = BTreeMap::new();
        conventions.insert(Convention::NONE_NAME.to_string(), Convention::none());
        Self {
            conventions,
            edges: BTreeMap::new(),
        }
    }

    /// Make a convention known. Registering a different convention under a
    /// name already in use is a configuration error.
    pub fn add_convention(&mut self, convention: ConventionRef) -> Result<()> {
        if convention.name() == Convention::NONE_NAME && !Arc::ptr_eq(&convention, &NONE) {
            return Err(Error::Config(format!(
                "the name '{}' is reserved for Convention::none()",
                Convention::NONE_NAME
            )));
        }
        match self.conventions.get(convention.name()) {
            Some(existing) if Arc::ptr_eq(existing, &convention) || **existing == *convention => {
                Ok(())
            }
            Some(_) => Err(Error::Config(format!(
                "convention name '{}' is already registered",
                convention.name()
            ))),
            None => {
                self.conventions
                    .insert(convention.name().to_string(), convention);
                Ok(())
            }
        }
    }

    /// Record that a converter rule can turn `from` into `to`.
    pub fn add_conversion(&mut self, from: &ConventionRef, to: &ConventionRef) -> Result<()> {
        if from.is_none() || to.is_none() {
            return Err(Error::Config(format!(
                "conversion {from} -> {to} involves NONE, which is not implementable"
            )));
        }
        self.add_convention(Arc::clone(from))?;
        self.add_convention(Arc::clone(to))?;
        self.edges
            .entry(from.name().to_string())
            .or_default()
            .insert(to.name().to_string());
        Ok(())
    }

    pub fn conventions(&self) -> impl Iterator<Item = &ConventionRef> {
        self.conventions.values()
    }

    pub fn lookup(&self, name: &str) -> Option<&ConventionRef> {
        self.conventions.get(name)
    }

    /// Fewest-hop chain of convention names from `from` to `to` (both
    /// included), breadth-first over the conversion graph.
    pub fn shortest_path(&self, from: &Convention, to: &Convention) -> Option<Vec<String>> {
        if from == to {
            return Some(vec![from.name().to_string()]);
        }
        let mut prev: BTreeMap<&str, &str> = BTreeMap::new();
        let mut queue = VecDeque::from([from.name()]);
        while let Some(cur) = queue.pop_front() {
            for next in self.edges.get(cur).into_iter().flatten() {
                let next = next.as_str();
                if next == from.name() || prev.contains_key(next) {
                    continue;
                }
                prev.insert(next, cur);
                if next == to.name() {
                    let mut path = vec![next.to_string()];
                    let mut at = next;
                    while let Some(&p) = prev.get(at) {
                        path.push(p.to_string());
                        at = p;
                    }
                    path.reverse();
                    return Some(path);
                }
                queue.push_back(next);
            }
        }
        None
    }

    fn can_convert_conventions(&self, from: &Convention, to: &Convention) -> bool {
        if from.is_none() || to.is_none() {
            return false;
        }
        from == to || from.can_convert_convention(to) || self.shortest_path(from, to).is_some()
    }
}

impl RelTraitDef for ConventionTraitDef {
    fn kind(&self) -> TraitKind {
        TraitKind::CONVENTION
    }

    fn default_trait(&self) -> TraitRef {
        Convention::none()
    }

    fn can_convert(&self, from: &dyn RelTrait, to: &dyn RelTrait) -> bool {
        match (
            downcast_trait::<Convention>(from),
            downcast_trait::<Convention>(to),
        ) {
            (Some(from), Some(to)) => self.can_convert_conventions(from, to),
            _ => false,
        }
    }
}
