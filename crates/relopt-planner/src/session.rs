//! Planning session: owns the trait registry and enforces the
//! register-then-search lifecycle.
//!
//! Trait kinds and conventions are registered while the session is in
//! `Phase::Registering`. `begin_search` builds and freezes the registry
//! (convention slot first), after which trait sets can be built and
//! resolved. Registration after that point is a configuration error.

use std::sync::Arc;

use relopt_core::config::PlannerConfig;
use relopt_core::error::{Error, Result};
use relopt_core::id::SessionId;
use relopt_rel::collation::RelCollationTraitDef;
use relopt_rel::convention::{ConventionRef, ConventionTraitDef};
use relopt_rel::distribution::RelDistributionTraitDef;
use relopt_rel::plan::{explain, PlanNode};
use relopt_rel::{RelNode, RelRef, RelTraitDef, RelTraitSet, TraitDefRegistry, TraitKind, TraitRef};
use relopt_rex::RexBuilder;
use serde::{Deserialize, Serialize};

use crate::resolve::{resolve, Resolution};
use crate::stats::{ResolveStats, ResolveStatsSnapshot};
use crate::validate::validate_plan;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Registering,
    Searching,
    Finished,
}

#[derive(Debug)]
pub struct PlanningSession {
    id: SessionId,
    config: PlannerConfig,
    phase: Phase,
    conventions: ConventionTraitDef,
    catalog: Option<Arc<ConventionTraitDef>>,
    pending: Vec<Arc<dyn RelTraitDef>>,
    registry: TraitDefRegistry,
    rex: RexBuilder,
    stats: ResolveStats,
}

impl PlanningSession {
    pub fn new(config: PlannerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            id: SessionId::next(),
            rex: RexBuilder::new(&config),
            config,
            phase: Phase::Registering,
            conventions: ConventionTraitDef::new(),
            catalog: None,
            pending: Vec::new(),
            registry: TraitDefRegistry::new(),
            stats: ResolveStats::new(),
        })
    }

    /// Session with the collation and distribution kinds registered.
    pub fn with_standard_traits(config: PlannerConfig) -> Result<Self> {
        let mut session = Self::new(config)?;
        session.register_trait_def(Arc::new(RelCollationTraitDef))?;
        session.register_trait_def(Arc::new(RelDistributionTraitDef))?;
        Ok(session)
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn rex(&self) -> &RexBuilder {
        &self.rex
    }

    pub fn registry(&self) -> &TraitDefRegistry {
        &self.registry
    }

    pub fn stats(&self) -> ResolveStatsSnapshot {
        self.stats.snapshot()
    }

    pub(crate) fn stats_handle(&self) -> &ResolveStats {
        &self.stats
    }

    /// Register a non-convention trait kind. Returns `Ok(false)` if the kind
    /// is already registered.
    pub fn register_trait_def(&mut self, def: Arc<dyn RelTraitDef>) -> Result<bool> {
        self.ensure_phase(Phase::Registering, "register a trait kind")?;
        let kind = def.kind();
        if kind == TraitKind::CONVENTION {
            return Err(Error::Config(
                "the convention kind is owned by the session; use add_convention".to_string(),
            ));
        }
        if self.pending.iter().any(|d| d.kind() == kind) {
            return Ok(false);
        }
        #[cfg(feature = "tracing")]
        tracing::debug!(session = %self.id, %kind, "registered trait kind");
        self.pending.push(def);
        Ok(true)
    }

    pub fn add_convention(&mut self, convention: ConventionRef) -> Result<()> {
        self.ensure_phase(Phase::Registering, "add a convention")?;
        #[cfg(feature = "tracing")]
        tracing::debug!(session = %self.id, convention = %convention, "registered convention");
        self.conventions.add_convention(convention)
    }

    /// A convention known to this session, `NONE` included.
    pub fn convention(&self, name: &str) -> Option<ConventionRef> {
        let def = self.catalog.as_deref().unwrap_or(&self.conventions);
        def.lookup(name).cloned()
    }

    /// Record a conversion edge a converter rule provides.
    pub fn add_conversion(&mut self, from: &ConventionRef, to: &ConventionRef) -> Result<()> {
        self.ensure_phase(Phase::Registering, "add a conversion")?;
        self.conventions.add_conversion(from, to)
    }

    /// Freeze the registry and enter the search phase.
    pub fn begin_search(&mut self) -> Result<()> {
        self.ensure_phase(Phase::Registering, "begin the search")?;
        let conventions = Arc::new(std::mem::take(&mut self.conventions));
        let mut registry = TraitDefRegistry::new();
        registry.register(Arc::clone(&conventions) as Arc<dyn RelTraitDef>)?;
        for def in self.pending.drain(..) {
            registry.register(def)?;
        }
        registry.freeze()?;
        #[cfg(feature = "tracing")]
        tracing::debug!(
            session = %self.id,
            kinds = registry.len(),
            conventions = conventions.conventions().count(),
            "search started"
        );
        self.registry = registry;
        self.catalog = Some(conventions);
        self.phase = Phase::Searching;
        Ok(())
    }

    pub fn default_trait_set(&self) -> Result<RelTraitSet> {
        self.ensure_phase(Phase::Searching, "build a trait set")?;
        Ok(self.registry.default_trait_set())
    }

    /// Trait set with the given values, defaults elsewhere.
    pub fn trait_set<I>(&self, traits: I) -> Result<RelTraitSet>
    where
        I: IntoIterator<Item = TraitRef>,
    {
        self.ensure_phase(Phase::Searching, "build a trait set")?;
        self.registry.trait_set(traits)
    }

    /// Reconcile `rel` with `required`; see [`crate::resolve::resolve`].
    pub fn resolve(&self, rel: &RelRef, required: &RelTraitSet) -> Result<Resolution> {
        self.ensure_phase(Phase::Searching, "resolve traits")?;
        resolve(self, rel, required)
    }

    /// End the search with `root` as the chosen plan. Validates the plan when
    /// the config asks for it and returns its explain snapshot.
    pub fn finish(&mut self, root: &dyn RelNode) -> Result<PlanNode> {
        self.ensure_phase(Phase::Searching, "finish")?;
        if self.config.validate_final_plan {
            validate_plan(&self.registry, root)?;
        }
        self.phase = Phase::Finished;
        Ok(explain(root))
    }

    fn ensure_phase(&self, expected: Phase, action: &str) -> Result<()> {
        if self.phase != expected {
            return Err(Error::Config(format!(
                "cannot {action} while the session is {:?}",
                self.phase
            )));
        }
        Ok(())
    }
}
