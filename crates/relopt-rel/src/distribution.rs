//! Data-placement trait kind: how rows are spread across parallel workers.

use std::any::Any;
use std::fmt;
use std::hash::Hasher;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::traits::{trait_eq, trait_hash, RelTrait, RelTraitDef, TraitKind, TraitRef};

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelDistribution {
    /// No requirement; only useful as a required value.
    #[default]
    Any,
    /// All rows on one worker.
    Singleton,
    /// Partitioned by hash of the key fields.
    Hash(Vec<usize>),
    /// Partitioned by ranges of the key fields.
    Range(Vec<usize>),
    RoundRobin,
    Random,
    /// Every worker has every row.
    Broadcast,
}

impl RelDistribution {
    pub fn hash_distributed(keys: impl Into<Vec<usize>>) -> Self {
        Self::Hash(keys.into())
    }

    pub fn range_distributed(keys: impl Into<Vec<usize>>) -> Self {
        Self::Range(keys.into())
    }

    pub fn keys(&self) -> &[usize] {
        match self {
            Self::Hash(keys) | Self::Range(keys) => keys,
            _ => &[],
        }
    }

    pub fn satisfies_distribution(&self, required: &RelDistribution) -> bool {
        if self == required {
            return true;
        }
        match (self, required) {
            (_, Self::Any) => true,
            (Self::Hash(_) | Self::RoundRobin | Self::Range(_), Self::Random) => true,
            (Self::Range(have), Self::Range(want)) => !have.is_empty() && want.starts_with(have),
            _ => false,
        }
    }

    /// Renumber key fields through `map`. A keyed distribution with any key
    /// that does not survive becomes `Any`.
    pub fn apply_mapping(&self, map: impl Fn(usize) -> Option<usize>) -> RelDistribution {
        let remap = |keys: &[usize]| keys.iter().map(|&k| map(k)).collect::<Option<Vec<_>>>();
        match self {
            Self::Hash(keys) => remap(keys).map_or(Self::Any, Self::Hash),
            Self::Range(keys) => remap(keys).map_or(Self::Any, Self::Range),
            other => other.clone(),
        }
    }

    pub fn into_trait(self) -> TraitRef {
        Arc::new(self)
    }
}

impl fmt::Display for RelDistribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("any"),
            Self::Singleton => f.write_str("single"),
            Self::Hash(keys) => write!(f, "hash{keys:?}"),
            Self::Range(keys) => write!(f, "range{keys:?}"),
            Self::RoundRobin => f.write_str("rr"),
            Self::Random => f.write_str("random"),
            Self::Broadcast => f.write_str("broadcast"),
        }
    }
}

impl RelTrait for RelDistribution {
    fn kind(&self) -> TraitKind {
        TraitKind::DISTRIBUTION
    }

    fn satisfies(&self, required: &dyn RelTrait) -> bool {
        required
            .as_any()
            .downcast_ref::<RelDistribution>()
            .is_some_and(|r| self.satisfies_distribution(r))
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

/// Any distribution can be reached by an exchange.
#[derive(Debug, Default)]
pub struct RelDistributionTraitDef;

impl RelTraitDef for RelDistributionTraitDef {
    fn kind(&self) -> TraitKind {
        TraitKind::DISTRIBUTION
    }

    fn default_trait(&self) -> TraitRef {
        RelDistribution::Any.into_trait()
    }

    fn can_convert(&self, from: &dyn RelTrait, to: &dyn RelTrait) -> bool {
        from.kind() == TraitKind::DISTRIBUTION && to.kind() == TraitKind::DISTRIBUTION
    }
}

#[cfg(test)]
mod tests {
    use super::RelDistribution as D;

    #[test]
    fn everything_satisfies_any() {
        for d in [
            D::Singleton,
            D::hash_distributed(vec![0]),
            D::RoundRobin,
            D::Random,
            D::Broadcast,
            D::Any,
        ] {
            assert!(d.satisfies_distribution(&D::Any), "{d}");
        }
    }

    #[test]
    fn hash_needs_equal_keys() {
        let (h0, h01) = (D::hash_distributed(vec![0]), D::hash_distributed(vec![0, 1]));
        assert!(h01.satisfies_distribution(&h01));
        assert!(!h0.satisfies_distribution(&h01));
        assert!(!D::Singleton.satisfies_distribution(&D::hash_distributed(vec![0])));
    }

    #[test]
    fn random_is_met_by_partitioned_layouts() {
        assert!(D::RoundRobin.satisfies_distribution(&D::Random));
        assert!(D::hash_distributed(vec![3]).satisfies_distribution(&D::Random));
        assert!(!D::Broadcast.satisfies_distribution(&D::Random));
        assert!(!D::Singleton.satisfies_distribution(&D::Random));
    }

    #[test]
    fn range_prefix() {
        let r01 = D::range_distributed(vec![0, 1]);
        assert!(D::range_distributed(vec![0]).satisfies_distribution(&r01));
        assert!(!D::range_distributed(vec![1]).satisfies_distribution(&r01));
    }

    #[test]
    fn mapping_renumbers_or_forgets_keys() {
        let map = |i: usize| [Some(1), None, Some(0)][i];
        assert_eq!(
            D::hash_distributed(vec![2, 0]).apply_mapping(map),
            D::hash_distributed(vec![0, 1])
        );
        assert_eq!(D::range_distributed(vec![0, 1]).apply_mapping(map), D::Any);
        assert_eq!(D::Singleton.apply_mapping(map), D::Singleton);
    }
}
