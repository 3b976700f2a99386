#![forbid(unsafe_code)]
//! relopt-rex: the scalar expression tree carried inside relational nodes.
//!
//! Expressions are immutable values. Each node fixes its type, digest and
//! node count when built, compares and hashes by content, and prints as its
//! digest. Invalid operand/type combinations are rejected at construction.
//!
//! Traversal is double-dispatch: `RexNode::accept` routes to the visitor
//! method for the node's own variant and does not descend on its own.

pub mod builder;
pub mod kind;
pub mod node;
pub mod op;
pub mod util;
pub mod visitor;

pub use builder::RexBuilder;
pub use kind::{Kind, KindSet};
pub use node::{RexCall, RexDynamicParam, RexInputRef, RexLiteral, RexNode};
pub use op::Operator;
pub use visitor::{RexBiVisitor, RexShuttle, RexVisitor};
