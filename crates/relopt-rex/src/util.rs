//! Small visitors used by relational nodes and rules.

use std::collections::BTreeSet;

use relopt_core::error::Result;

use crate::node::{RexCall, RexDynamicParam, RexInputRef, RexLiteral, RexNode};
use crate::visitor::{RexBiVisitor, RexShuttle, RexVisitor};

/// Collects the input field indexes an expression references.
#[derive(Debug, Default)]
pub struct InputFinder {
    pub fields: BTreeSet<usize>,
}

impl RexVisitor<()> for InputFinder {
    fn visit_input_ref(&mut self, input_ref: &RexInputRef) {
        self.fields.insert(input_ref.index());
    }

    fn visit_literal(&mut self, _literal: &RexLiteral) {}

    fn visit_call(&mut self, call: &RexCall) {
        for operand in call.operands() {
            operand.accept(self);
        }
    }

    fn visit_dynamic_param(&mut self, _param: &RexDynamicParam) {}
}

pub fn input_refs(node: &RexNode) -> BTreeSet<usize> {
    let mut finder = InputFinder::default();
    node.accept(&mut finder);
    finder.fields
}

/// Depth of the deepest leaf, with the root at depth 1.
struct DepthVisitor;

impl RexBiVisitor<usize, usize> for DepthVisitor {
    fn visit_input_ref(&mut self, _input_ref: &RexInputRef, depth: usize) -> usize {
        depth
    }

    fn visit_literal(&mut self, _literal: &RexLiteral, depth: usize) -> usize {
        depth
    }

    fn visit_call(&mut self, call: &RexCall, depth: usize) -> usize {
        call.operands()
            .iter()
            .map(|o| o.accept_with(self, depth + 1))
            .max()
            .unwrap_or(depth)
    }

    fn visit_dynamic_param(&mut self, _param: &RexDynamicParam, depth: usize) -> usize {
        depth
    }
}

pub fn depth(node: &RexNode) -> usize {
    node.accept_with(&mut DepthVisitor, 1)
}

/// Adds `offset` to every input reference, e.g. when an expression written
/// against the right input of a join is moved onto the joined row.
struct InputShifter {
    offset: usize,
}

impl RexShuttle for InputShifter {
    fn visit_input_ref(&mut self, input_ref: &RexInputRef) -> Result<RexNode> {
        Ok(RexNode::input_ref(
            input_ref.index() + self.offset,
            *input_ref.ty(),
        ))
    }
}

pub fn shift_input_refs(node: &RexNode, offset: usize) -> Result<RexNode> {
    InputShifter { offset }.apply(node)
}
