//! Trait resolution: reconcile the traits an expression provides with the
//! traits a consumer requires.
//!
//! Order of attempts:
//! 1. already satisfied: nothing to do;
//! 2. convention slot differs: bridge it with a converter when the
//!    convention kind allows it, otherwise prune;
//! 3. target convention's `enforce` for the remaining slots;
//! 4. abstract converters per unsatisfied slot, when both the session
//!    config and the target convention allow them.
//!
//! "Cannot be reached" is the normal `Resolution::Unsatisfiable` outcome.
//! Errors are reserved for programmer mistakes: unregistered kinds, layout
//! mismatches, unconfigured conventions (`Error::Unsupported`), and
//! enforcers that return a node not meeting the requirement.

use std::sync::Arc;

use relopt_core::error::{Error, Result};
use relopt_rel::convention::Convention;
use relopt_rel::converter::ConverterRel;
use relopt_rel::{RelRef, RelTraitSet, TraitKind};

use crate::session::PlanningSession;

#[derive(Debug, Clone)]
pub enum Resolution {
    /// The expression already meets the requirement.
    Satisfied(RelRef),
    /// Met by wrapping the expression in one or more converters.
    Converted(RelRef),
    /// Met by a node the target convention's enforcer produced.
    Enforced(RelRef),
    /// Not reachable; the search should prune this branch.
    Unsatisfiable { reason: String },
}

impl Resolution {
    pub fn rel(&self) -> Option<&RelRef> {
        match self {
            Self::Satisfied(rel) | Self::Converted(rel) | Self::Enforced(rel) => Some(rel),
            Self::Unsatisfiable { .. } => None,
        }
    }

    pub fn into_rel(self) -> Option<RelRef> {
        match self {
            Self::Satisfied(rel) | Self::Converted(rel) | Self::Enforced(rel) => Some(rel),
            Self::Unsatisfiable { .. } => None,
        }
    }

    pub fn is_satisfiable(&self) -> bool {
        self.rel().is_some()
    }
}

pub(crate) fn resolve(
    session: &PlanningSession,
    rel: &RelRef,
    required: &RelTraitSet,
) -> Result<Resolution> {
    let registry = session.registry();
    let stats = session.stats_handle();
    if !registry.conforms(rel.trait_set()) || !registry.conforms(required) {
        return Err(Error::Registry(format!(
            "trait sets {} and {required} do not match the session's trait kinds",
            rel.trait_set()
        )));
    }

    if rel.trait_set().satisfies(required) {
        stats.record_satisfied();
        return Ok(Resolution::Satisfied(Arc::clone(rel)));
    }

    let (have, want) = match (rel.trait_set().convention(), required.convention()) {
        (Some(have), Some(want)) => (have, want),
        _ => return Err(Error::Invariant("trait set without a convention".to_string())),
    };
    let want_trait = required
        .get(TraitKind::CONVENTION)
        .cloned()
        .ok_or_else(|| Error::Invariant("trait set without a convention".to_string()))?;

    let mut current = Arc::clone(rel);
    let mut converted = false;
    if have != want {
        if want.is_none() {
            return Ok(prune(session, rel, required, "NONE is never a conversion target"));
        }
        if !registry.can_convert(TraitKind::CONVENTION, have, want)? {
            return Ok(prune(
                session,
                rel,
                required,
                &format!("no conversion from {have} to {want}"),
            ));
        }
        current = Arc::new(ConverterRel::new(current, want_trait)?);
        stats.record_converter();
        converted = true;
        #[cfg(feature = "tracing")]
        tracing::trace!(from = %have, to = %want, rel = rel.name(), "convention converter");
        if current.trait_set().satisfies(required) {
            stats.record_converted();
            return Ok(Resolution::Converted(current));
        }
    }

    if let Some(enforced) = enforce(want, &current, required)? {
        stats.record_enforced();
        return Ok(Resolution::Enforced(enforced));
    }

    if session.config().allow_abstract_converters
        && want.use_abstract_converters_for_conversion(current.trait_set(), required)
    {
        if let Some(done) = abstract_convert(session, current, required)? {
            stats.record_converted();
            return Ok(Resolution::Converted(done));
        }
    }

    let reason = if converted {
        format!("{want} cannot impose {required}")
    } else {
        format!("{} cannot be brought to {required}", rel.trait_set())
    };
    Ok(prune(session, rel, required, &reason))
}

fn enforce(
    convention: &Convention,
    input: &RelRef,
    required: &RelTraitSet,
) -> Result<Option<RelRef>> {
    let Some(enforced) = convention.enforce(input, required)? else {
        #[cfg(feature = "tracing")]
        tracing::trace!(convention = %convention, %required, "no enforcement path");
        return Ok(None);
    };
    if !enforced.trait_set().satisfies(required) {
        return Err(Error::Invariant(format!(
            "{convention} enforced {} which does not satisfy {required}",
            enforced.trait_set()
        )));
    }
    #[cfg(feature = "tracing")]
    tracing::trace!(convention = %convention, rel = enforced.name(), "enforced");
    Ok(Some(enforced))
}

/// One converter per unsatisfied non-convention slot, each built by the
/// slot's trait def.
fn abstract_convert(
    session: &PlanningSession,
    mut current: RelRef,
    required: &RelTraitSet,
) -> Result<Option<RelRef>> {
    let registry = session.registry();
    for kind in current.trait_set().unsatisfied(required) {
        let Some(want) = required.get(kind) else {
            return Ok(None);
        };
        match registry.get(kind)?.convert(&current, want)? {
            Some(next) => {
                session.stats_handle().record_converter();
                #[cfg(feature = "tracing")]
                tracing::trace!(%kind, to = %want, "abstract converter");
                current = next;
            }
            None => return Ok(None),
        }
    }
    Ok(current.trait_set().satisfies(required).then_some(current))
}

fn prune(
    session: &PlanningSession,
    _rel: &RelRef,
    _required: &RelTraitSet,
    reason: &str,
) -> Resolution {
    session.stats_handle().record_pruned();
    #[cfg(feature = "tracing")]
    tracing::debug!(rel = _rel.name(), required = %_required, reason, "pruned");
    Resolution::Unsatisfiable {
        reason: reason.to_string(),
    }
}
