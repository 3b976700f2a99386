//! Explain surfaces: `ExplainTerms` and the serializable `PlanNode` snapshot.
//!
//! A snapshot is a plain tree of strings, detached from the live nodes, so it
//! can be printed, diffed, or written out as JSON.

use relopt_core::error::Result;
use relopt_core::hash::{hash_serde, Hash256};
use serde::{Deserialize, Serialize};

use crate::rel::RelNode;

/// Ordered `name = value` attributes of a node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExplainTerms {
    items: Vec<(String, String)>,
}

impl ExplainTerms {
    pub fn item(&mut self, name: &str, value: impl ToString) -> &mut Self {
        self.items.push((name.to_string(), value.to_string()));
        self
    }

    pub fn items(&self) -> impl Iterator<Item = (&str, &str)> {
        self.items.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn into_items(self) -> Vec<(String, String)> {
        self.items
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanNode {
    pub name: String,
    pub traits: String,
    pub category: String,

    /// Node-specific attributes, in declaration order.
    pub terms: Vec<(String, String)>,

    pub inputs: Vec<PlanNode>,
}

impl PlanNode {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(doc: &str) -> Result<Self> {
        Ok(serde_json::from_str(doc)?)
    }

    /// Content fingerprint of the whole snapshot. Equal plans hash equal
    /// regardless of the node ids they were taken from.
    pub fn fingerprint(&self) -> Result<Hash256> {
        hash_serde(self)
    }

    /// Indented one-node-per-line text form.
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_into(&mut out, 0);
        out
    }

    fn render_into(&self, out: &mut String, depth: usize) {
        out.push_str(&"  ".repeat(depth));
        out.push_str(&self.name);
        out.push('.');
        out.push_str(&self.traits);
        if !self.terms.is_empty() {
            let terms: Vec<String> = self.terms.iter().map(|(n, v)| format!("{n}={v}")).collect();
            out.push('(');
            out.push_str(&terms.join(", "));
            out.push(')');
        }
        out.push('\n');
        for input in &self.inputs {
            input.render_into(out, depth + 1);
        }
    }
}

/// Snapshot a plan rooted at `rel`.
pub fn explain(rel: &dyn RelNode) -> PlanNode {
    let mut terms = ExplainTerms::default();
    rel.explain_terms(&mut terms);
    PlanNode {
        name: rel.name().to_string(),
        traits: rel.trait_set().to_string(),
        category: rel.category().to_string(),
        terms: terms.into_items(),
        inputs: rel.inputs().iter().map(|i| explain(i.as_ref())).collect(),
    }
}
