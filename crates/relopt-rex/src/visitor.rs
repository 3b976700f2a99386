//! Double-dispatch traversal over expression trees.
//!
//! `RexNode::accept` picks the method; the visitor decides whether and how to
//! descend into operands. Nothing is visited implicitly.

use relopt_core::error::Result;

use crate::node::{RexCall, RexDynamicParam, RexInputRef, RexLiteral, RexNode};

pub trait RexVisitor<R> {
    fn visit_input_ref(&mut self, input_ref: &RexInputRef) -> R;
    fn visit_literal(&mut self, literal: &RexLiteral) -> R;
    fn visit_call(&mut self, call: &RexCall) -> R;
    fn visit_dynamic_param(&mut self, param: &RexDynamicParam) -> R;
}

/// Visitor that receives a payload with every visit.
pub trait RexBiVisitor<R, P> {
    fn visit_input_ref(&mut self, input_ref: &RexInputRef, arg: P) -> R;
    fn visit_literal(&mut self, literal: &RexLiteral, arg: P) -> R;
    fn visit_call(&mut self, call: &RexCall, arg: P) -> R;
    fn visit_dynamic_param(&mut self, param: &RexDynamicParam, arg: P) -> R;
}

/// Rewriting visitor. Defaults rebuild calls bottom-up and keep leaves; a call
/// whose operands come back unchanged is returned as-is.
///
/// Rebuilt calls go through the same construction checks as fresh ones, so a
/// shuttle cannot produce an ill-typed tree.
pub trait RexShuttle {
    fn visit_input_ref(&mut self, input_ref: &RexInputRef) -> Result<RexNode> {
        Ok(RexNode::InputRef(input_ref.clone()))
    }

    fn visit_literal(&mut self, literal: &RexLiteral) -> Result<RexNode> {
        Ok(RexNode::Literal(literal.clone()))
    }

    fn visit_dynamic_param(&mut self, param: &RexDynamicParam) -> Result<RexNode> {
        Ok(RexNode::DynamicParam(param.clone()))
    }

    fn visit_call(&mut self, call: &RexCall) -> Result<RexNode> {
        let mut changed = false;
        let mut operands = Vec::with_capacity(call.operands().len());
        for operand in call.operands() {
            let rewritten = self.apply(operand)?;
            changed |= rewritten != *operand;
            operands.push(rewritten);
        }
        if changed {
            call.with_operands(operands)
        } else {
            Ok(RexNode::Call(call.clone()))
        }
    }

    fn apply(&mut self, node: &RexNode) -> Result<RexNode> {
        match node {
            RexNode::InputRef(r) => self.visit_input_ref(r),
            RexNode::Literal(l) => self.visit_literal(l),
            RexNode::Call(c) => self.visit_call(c),
            RexNode::DynamicParam(p) => self.visit_dynamic_param(p),
        }
    }
}
