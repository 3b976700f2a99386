//! The immutable scalar expression tree.
//!
//! Every node fixes its result type and canonical digest at construction and
//! never changes them. Equality and hashing are by content: two independently
//! built trees with the same kind, type, and operands are equal and hash
//! identically. The digest is the printable form (`Display`).

use std::fmt;
use std::hash::{Hash, Hasher};

use relopt_core::error::{Error, Result};
use relopt_core::hash::{hash_str, Hash256};
use relopt_core::schema::{DataType, RelType};
use relopt_core::types::Scalar;

use crate::kind::{Kind, KindSet};
use crate::op::{self, Operator};
use crate::visitor::{RexBiVisitor, RexVisitor};

/// Reference to field `index` of the input row.
#[derive(Debug, Clone)]
pub struct RexInputRef {
    index: usize,
    ty: RelType,
    digest: String,
}

impl RexInputRef {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn ty(&self) -> &RelType {
        &self.ty
    }
}

/// Constant value.
#[derive(Debug, Clone)]
pub struct RexLiteral {
    value: Scalar,
    ty: RelType,
    digest: String,
}

impl RexLiteral {
    pub fn value(&self) -> &Scalar {
        &self.value
    }

    pub fn ty(&self) -> &RelType {
        &self.ty
    }
}

/// Positional query parameter (`?0`, `?1`, ...), bound at execution time.
#[derive(Debug, Clone)]
pub struct RexDynamicParam {
    index: usize,
    ty: RelType,
    digest: String,
}

impl RexDynamicParam {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn ty(&self) -> &RelType {
        &self.ty
    }
}

/// Operator applied to operands. Owns its operands; no back-references.
#[derive(Debug, Clone)]
pub struct RexCall {
    op: Operator,
    operands: Vec<RexNode>,
    ty: RelType,
    node_count: usize,
    digest: String,
}

impl RexCall {
    pub fn op(&self) -> &Operator {
        &self.op
    }

    pub fn operands(&self) -> &[RexNode] {
        &self.operands
    }

    pub fn ty(&self) -> &RelType {
        &self.ty
    }
}

#[derive(Debug, Clone)]
pub enum RexNode {
    InputRef(RexInputRef),
    Literal(RexLiteral),
    Call(RexCall),
    DynamicParam(RexDynamicParam),
}

impl RexNode {
    pub fn input_ref(index: usize, ty: RelType) -> RexNode {
        RexNode::InputRef(RexInputRef {
            index,
            ty,
            digest: format!("${index}"),
        })
    }

    /// Literal whose type follows from the value. Non-null values are NOT NULL.
    /// Use [`RexNode::null_literal`] for a typed `NULL`.
    pub fn literal(value: impl Into<Scalar>) -> RexNode {
        let value = value.into();
        let ty = RelType::new(value.data_type(), value.is_null());
        let digest = literal_digest(&value, &ty);
        RexNode::Literal(RexLiteral { value, ty, digest })
    }

    pub fn null_literal(data_type: DataType) -> RexNode {
        let ty = RelType::nullable(data_type);
        let value = Scalar::Null;
        let digest = literal_digest(&value, &ty);
        RexNode::Literal(RexLiteral { value, ty, digest })
    }

    pub fn dynamic_param(index: usize, ty: RelType) -> RexNode {
        RexNode::DynamicParam(RexDynamicParam {
            index,
            ty,
            digest: format!("?{index}"),
        })
    }

    /// Build a call, rejecting operand/type mismatches eagerly.
    pub fn call(op: Operator, operands: Vec<RexNode>) -> Result<RexNode> {
        let ty = op.derive_type(&operands, None)?;
        Ok(RexNode::Call(RexCall::build(op, operands, ty)))
    }

    pub fn cast(operand: RexNode, target: RelType) -> Result<RexNode> {
        if target.data_type == DataType::Null {
            return Err(Error::Expr("cannot cast to the NULL type".to_string()));
        }
        let operands = vec![operand];
        let ty = op::CAST.derive_type(&operands, Some(target))?;
        Ok(RexNode::Call(RexCall::build(op::CAST, operands, ty)))
    }

    /// Statically-determined result type; fixed at construction.
    pub fn ty(&self) -> &RelType {
        match self {
            RexNode::InputRef(r) => &r.ty,
            RexNode::Literal(l) => &l.ty,
            RexNode::Call(c) => &c.ty,
            RexNode::DynamicParam(p) => &p.ty,
        }
    }

    pub fn kind(&self) -> Kind {
        match self {
            RexNode::InputRef(_) => Kind::InputRef,
            RexNode::Literal(_) => Kind::Literal,
            RexNode::Call(c) => c.op.kind(),
            RexNode::DynamicParam(_) => Kind::DynamicParam,
        }
    }

    pub fn is_a(&self, kind: Kind) -> bool {
        self.kind() == kind
    }

    pub fn is_a_any(&self, kinds: KindSet) -> bool {
        self.kind().belongs_to(kinds)
    }

    /// Canonical content string. Computed once at construction.
    pub fn digest(&self) -> &str {
        match self {
            RexNode::InputRef(r) => &r.digest,
            RexNode::Literal(l) => &l.digest,
            RexNode::Call(c) => &c.digest,
            RexNode::DynamicParam(p) => &p.digest,
        }
    }

    /// blake3 of the digest; a compact key for content-addressed maps.
    pub fn fingerprint(&self) -> Hash256 {
        hash_str(self.digest())
    }

    /// 1 for leaves; 1 plus the operands' counts for calls.
    pub fn node_count(&self) -> usize {
        match self {
            RexNode::Call(c) => c.node_count,
            _ => 1,
        }
    }

    pub fn operands(&self) -> &[RexNode] {
        match self {
            RexNode::Call(c) => &c.operands,
            _ => &[],
        }
    }

    /// Whether this expression always evaluates to TRUE.
    ///
    /// May return false for expressions that are in fact always true; never
    /// returns true for one that is not.
    pub fn is_always_true(&self) -> bool {
        match self {
            RexNode::Literal(l) => l.value.as_bool() == Some(true),
            RexNode::Call(c) if c.op.kind() == Kind::IsNotNull => !c.operands[0].ty().nullable,
            _ => false,
        }
    }

    /// Whether this expression always evaluates to FALSE. Same contract as
    /// [`RexNode::is_always_true`].
    pub fn is_always_false(&self) -> bool {
        match self {
            RexNode::Literal(l) => l.value.as_bool() == Some(false),
            RexNode::Call(c) if c.op.kind() == Kind::IsNull => !c.operands[0].ty().nullable,
            _ => false,
        }
    }

    /// Dispatch to the visitor method for this node's variant. Visits only
    /// this node; visitors recurse into operands themselves.
    pub fn accept<R, V>(&self, visitor: &mut V) -> R
    where
        V: RexVisitor<R> + ?Sized,
    {
        match self {
            RexNode::InputRef(r) => visitor.visit_input_ref(r),
            RexNode::Literal(l) => visitor.visit_literal(l),
            RexNode::Call(c) => visitor.visit_call(c),
            RexNode::DynamicParam(p) => visitor.visit_dynamic_param(p),
        }
    }

    /// Like [`RexNode::accept`], threading a payload through the visit.
    pub fn accept_with<R, P, V>(&self, visitor: &mut V, arg: P) -> R
    where
        V: RexBiVisitor<R, P> + ?Sized,
    {
        match self {
            RexNode::InputRef(r) => visitor.visit_input_ref(r, arg),
            RexNode::Literal(l) => visitor.visit_literal(l, arg),
            RexNode::Call(c) => visitor.visit_call(c, arg),
            RexNode::DynamicParam(p) => visitor.visit_dynamic_param(p, arg),
        }
    }
}

impl RexCall {
    fn build(op: Operator, operands: Vec<RexNode>, ty: RelType) -> RexCall {
        let node_count = 1 + operands.iter().map(RexNode::node_count).sum::<usize>();
        let mut digest = String::with_capacity(16);
        digest.push_str(op.name());
        digest.push('(');
        for (i, o) in operands.iter().enumerate() {
            if i > 0 {
                digest.push_str(", ");
            }
            digest.push_str(o.digest());
        }
        digest.push(')');
        if op.kind() == Kind::Cast {
            digest.push(':');
            digest.push_str(&ty.to_string());
        }
        RexCall {
            op,
            operands,
            ty,
            node_count,
            digest,
        }
    }

    /// Same operator, new operands. Re-checks the operands; casts keep their
    /// target type.
    pub fn with_operands(&self, operands: Vec<RexNode>) -> Result<RexNode> {
        if self.op.kind() == Kind::Cast {
            let target = self.ty;
            let operand = operands
                .into_iter()
                .next()
                .ok_or_else(|| Error::Expr("CAST expects one operand".to_string()))?;
            return RexNode::cast(operand, target);
        }
        RexNode::call(self.op, operands)
    }
}

/// `5`, `'abc'`, `true`; non-default literal types carry a `:TYPE` suffix so
/// the digest stays unique per content (`5:BIGINT`, `null:INTEGER`).
fn literal_digest(value: &Scalar, ty: &RelType) -> String {
    match value {
        Scalar::Null => format!("null:{}", ty.data_type.sql_name()),
        Scalar::I64(_) | Scalar::F32(_) => {
            format!("{}:{}", value, ty.data_type.sql_name())
        }
        _ => value.to_string(),
    }
}

impl PartialEq for RexNode {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (RexNode::InputRef(a), RexNode::InputRef(b)) => a.index == b.index && a.ty == b.ty,
            (RexNode::Literal(a), RexNode::Literal(b)) => a.value == b.value && a.ty == b.ty,
            (RexNode::Call(a), RexNode::Call(b)) => {
                a.op == b.op && a.ty == b.ty && a.operands == b.operands
            }
            (RexNode::DynamicParam(a), RexNode::DynamicParam(b)) => {
                a.index == b.index && a.ty == b.ty
            }
            _ => false,
        }
    }
}

impl Eq for RexNode {}

impl Hash for RexNode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            RexNode::InputRef(r) => {
                r.index.hash(state);
                r.ty.hash(state);
            }
            RexNode::Literal(l) => {
                l.value.hash(state);
                l.ty.hash(state);
            }
            RexNode::Call(c) => {
                c.op.hash(state);
                c.ty.hash(state);
                c.operands.hash(state);
            }
            RexNode::DynamicParam(p) => {
                p.index.hash(state);
                p.ty.hash(state);
            }
        }
    }
}

impl fmt::Display for RexNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.digest())
    }
}
