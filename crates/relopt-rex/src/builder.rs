//! Factory for expressions that checks them against a row type and the
//! planner's complexity limit.

use relopt_core::config::PlannerConfig;
use relopt_core::error::{Error, Result};
use relopt_core::schema::{DataType, RelType, Schema};
use relopt_core::types::Scalar;

use crate::node::RexNode;
use crate::op::{self, Operator};

#[derive(Debug, Clone)]
pub struct RexBuilder {
    max_node_count: usize,
}

impl Default for RexBuilder {
    fn default() -> Self {
        Self::new(&PlannerConfig::default())
    }
}

impl RexBuilder {
    pub fn new(config: &PlannerConfig) -> Self {
        Self {
            max_node_count: config.max_expr_node_count,
        }
    }

    /// Reference to field `index` of `row`, typed from the field.
    pub fn input_ref(&self, row: &Schema, index: usize) -> Result<RexNode> {
        let field = row.field(index).ok_or_else(|| {
            Error::Expr(format!(
                "input ref ${index} out of range for row with {} field(s)",
                row.len()
            ))
        })?;
        Ok(RexNode::input_ref(index, field.rel_type()))
    }

    /// Reference to the field called `name`.
    pub fn field(&self, row: &Schema, name: &str) -> Result<RexNode> {
        let index = row
            .index_of(name)
            .ok_or_else(|| Error::Expr(format!("no field named '{name}'")))?;
        self.input_ref(row, index)
    }

    pub fn literal(&self, value: impl Into<Scalar>) -> RexNode {
        RexNode::literal(value)
    }

    pub fn null_literal(&self, data_type: DataType) -> RexNode {
        RexNode::null_literal(data_type)
    }

    pub fn dynamic_param(&self, index: usize, ty: RelType) -> RexNode {
        RexNode::dynamic_param(index, ty)
    }

    pub fn call(&self, op: Operator, operands: Vec<RexNode>) -> Result<RexNode> {
        self.check_size(RexNode::call(op, operands)?)
    }

    pub fn cast(&self, operand: RexNode, target: RelType) -> Result<RexNode> {
        self.check_size(RexNode::cast(operand, target)?)
    }

    pub fn equals(&self, left: RexNode, right: RexNode) -> Result<RexNode> {
        self.call(op::EQUALS, vec![left, right])
    }

    pub fn and(&self, operands: Vec<RexNode>) -> Result<RexNode> {
        self.call(op::AND, operands)
    }

    pub fn or(&self, operands: Vec<RexNode>) -> Result<RexNode> {
        self.call(op::OR, operands)
    }

    pub fn not(&self, operand: RexNode) -> Result<RexNode> {
        self.call(op::NOT, vec![operand])
    }

    pub fn is_null(&self, operand: RexNode) -> Result<RexNode> {
        self.call(op::IS_NULL, vec![operand])
    }

    pub fn is_not_null(&self, operand: RexNode) -> Result<RexNode> {
        self.call(op::IS_NOT_NULL, vec![operand])
    }

    fn check_size(&self, node: RexNode) -> Result<RexNode> {
        if node.node_count() > self.max_node_count {
            return Err(Error::Expr(format!(
                "expression has {} nodes, limit is {}",
                node.node_count(),
                self.max_node_count
            )));
        }
        Ok(node)
    }
}
