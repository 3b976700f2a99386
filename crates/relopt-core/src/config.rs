//! Planner configuration that downstream crates can serialize/deserialize.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Session-wide gate for abstract converters on non-convention slots. The
    /// target convention must still opt in via
    /// `use_abstract_converters_for_conversion`.
    pub allow_abstract_converters: bool,

    /// Upper bound on `RexNode::node_count()` accepted by the expression builder.
    pub max_expr_node_count: usize,

    /// Validate the chosen plan (no `NONE`, converter laws, convention
    /// interfaces) when a session finishes.
    pub validate_final_plan: bool,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            allow_abstract_converters: true,
            max_expr_node_count: 1_000,
            validate_final_plan: true,
        }
    }
}

impl PlannerConfig {
    /// Create a config from environment variables, falling back to defaults.
    ///
    /// Environment variables:
    /// - `RELOPT_ALLOW_ABSTRACT_CONVERTERS`: `true`/`false`
    /// - `RELOPT_MAX_EXPR_NODE_COUNT`: positive integer
    /// - `RELOPT_VALIDATE_FINAL_PLAN`: `true`/`false`
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(s) = std::env::var("RELOPT_ALLOW_ABSTRACT_CONVERTERS") {
            if let Ok(v) = s.parse::<bool>() {
                cfg.allow_abstract_converters = v;
            }
        }

        if let Ok(s) = std::env::var("RELOPT_MAX_EXPR_NODE_COUNT") {
            if let Ok(v) = s.parse::<usize>() {
                cfg.max_expr_node_count = v;
            }
        }

        if let Ok(s) = std::env::var("RELOPT_VALIDATE_FINAL_PLAN") {
            if let Ok(v) = s.parse::<bool>() {
                cfg.validate_final_plan = v;
            }
        }

        cfg
    }

    /// Parse a YAML document; missing keys take their default value.
    ///
    /// ```yaml
    /// allow_abstract_converters: false
    /// max_expr_node_count: 64
    /// ```
    pub fn from_yaml_str(doc: &str) -> Result<Self> {
        let cfg: Self = serde_yaml::from_str(doc)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_expr_node_count == 0 {
            return Err(Error::Config(
                "max_expr_node_count must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
