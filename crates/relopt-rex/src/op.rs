//! Operators applied by call expressions, with operand checking and
//! return-type inference.
//!
//! Checking happens once, when a call is constructed. A call that exists has
//! passed these checks; there is no "invalid call" value.

use std::fmt;

use relopt_core::error::{Error, Result};
use relopt_core::schema::{DataType, RelType};

use crate::kind::Kind;
use crate::node::RexNode;

/// How many operands an operator accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arity {
    Exact(usize),
    AtLeast(usize),
}

impl Arity {
    fn admits(self, n: usize) -> bool {
        match self {
            Arity::Exact(k) => n == k,
            Arity::AtLeast(k) => n >= k,
        }
    }
}

/// Constraint on operand types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperandRule {
    Any,
    AllBoolean,
    AllNumeric,
    /// Every operand comparable with the first.
    Comparable,
}

/// How the result type is derived from the operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReturnRule {
    /// BOOLEAN, nullable if any operand is nullable.
    Boolean,
    /// BOOLEAN NOT NULL regardless of operands.
    BooleanNotNull,
    /// Widest numeric operand type, nullable if any operand is nullable.
    Widen,
    /// Type of the first operand.
    FirstOperand,
    /// Supplied by the caller (casts).
    Explicit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Operator {
    name: &'static str,
    kind: Kind,
    arity: Arity,
    operands: OperandRule,
    returns: ReturnRule,
}

impl Operator {
    pub const fn new(
        name: &'static str,
        kind: Kind,
        arity: Arity,
        operands: OperandRule,
        returns: ReturnRule,
    ) -> Self {
        Self {
            name,
            kind,
            arity,
            operands,
            returns,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    /// Check operands and derive the result type.
    ///
    /// `explicit` is required for `ReturnRule::Explicit` and ignored otherwise.
    pub fn derive_type(&self, operands: &[RexNode], explicit: Option<RelType>) -> Result<RelType> {
        if !self.arity.admits(operands.len()) {
            return Err(Error::Expr(format!(
                "operator {} expects {:?} operand(s), got {}",
                self.name,
                self.arity,
                operands.len()
            )));
        }
        self.check_operands(operands)?;

        let any_nullable = operands.iter().any(|o| o.ty().nullable);
        let ty = match self.returns {
            ReturnRule::Boolean => RelType::new(DataType::Boolean, any_nullable),
            ReturnRule::BooleanNotNull => RelType::not_null(DataType::Boolean),
            ReturnRule::Widen => {
                let mut widest = operands[0].ty().data_type;
                for o in &operands[1..] {
                    widest = widest.widen(o.ty().data_type).ok_or_else(|| {
                        Error::Expr(format!("operator {} cannot widen {:?}", self.name, o.ty()))
                    })?;
                }
                RelType::new(widest, any_nullable)
            }
            ReturnRule::FirstOperand => *operands[0].ty(),
            ReturnRule::Explicit => explicit.ok_or_else(|| {
                Error::Expr(format!("operator {} requires an explicit type", self.name))
            })?,
        };
        Ok(ty)
    }

    fn check_operands(&self, operands: &[RexNode]) -> Result<()> {
        match self.operands {
            OperandRule::Any => Ok(()),
            OperandRule::AllBoolean => {
                for (i, o) in operands.iter().enumerate() {
                    let dt = o.ty().data_type;
                    if dt != DataType::Boolean && dt != DataType::Null {
                        return Err(Error::Expr(format!(
                            "operand {i} of {} must be BOOLEAN, got {}",
                            self.name,
                            o.ty()
                        )));
                    }
                }
                Ok(())
            }
            OperandRule::AllNumeric => {
                for (i, o) in operands.iter().enumerate() {
                    if !o.ty().data_type.is_numeric() {
                        return Err(Error::Expr(format!(
                            "operand {i} of {} must be numeric, got {}",
                            self.name,
                            o.ty()
                        )));
                    }
                }
                Ok(())
            }
            OperandRule::Comparable => {
                let first = operands[0].ty().data_type;
                for o in &operands[1..] {
                    if !first.is_comparable_with(o.ty().data_type) {
                        return Err(Error::Expr(format!(
                            "cannot apply {} to {} and {}",
                            self.name,
                            operands[0].ty(),
                            o.ty()
                        )));
                    }
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

macro_rules! comparison {
    ($name:ident, $sym:literal, $kind:ident) => {
        pub const $name: Operator = Operator::new(
            $sym,
            Kind::$kind,
            Arity::Exact(2),
            OperandRule::Comparable,
            ReturnRule::Boolean,
        );
    };
}

macro_rules! arithmetic {
    ($name:ident, $sym:literal, $kind:ident) => {
        pub const $name: Operator = Operator::new(
            $sym,
            Kind::$kind,
            Arity::Exact(2),
            OperandRule::AllNumeric,
            ReturnRule::Widen,
        );
    };
}

comparison!(EQUALS, "=", Equals);
comparison!(NOT_EQUALS, "<>", NotEquals);
comparison!(LESS_THAN, "<", LessThan);
comparison!(LESS_THAN_OR_EQUAL, "<=", LessThanOrEqual);
comparison!(GREATER_THAN, ">", GreaterThan);
comparison!(GREATER_THAN_OR_EQUAL, ">=", GreaterThanOrEqual);

arithmetic!(PLUS, "+", Plus);
arithmetic!(MINUS, "-", Minus);
arithmetic!(TIMES, "*", Times);
arithmetic!(DIVIDE, "/", Divide);

pub const AND: Operator = Operator::new(
    "AND",
    Kind::And,
    Arity::AtLeast(2),
    OperandRule::AllBoolean,
    ReturnRule::Boolean,
);

pub const OR: Operator = Operator::new(
    "OR",
    Kind::Or,
    Arity::AtLeast(2),
    OperandRule::AllBoolean,
    ReturnRule::Boolean,
);

pub const NOT: Operator = Operator::new(
    "NOT",
    Kind::Not,
    Arity::Exact(1),
    OperandRule::AllBoolean,
    ReturnRule::Boolean,
);

pub const IS_NULL: Operator = Operator::new(
    "IS NULL",
    Kind::IsNull,
    Arity::Exact(1),
    OperandRule::Any,
    ReturnRule::BooleanNotNull,
);

pub const IS_NOT_NULL: Operator = Operator::new(
    "IS NOT NULL",
    Kind::IsNotNull,
    Arity::Exact(1),
    OperandRule::Any,
    ReturnRule::BooleanNotNull,
);

pub const UNARY_MINUS: Operator = Operator::new(
    "-",
    Kind::MinusPrefix,
    Arity::Exact(1),
    OperandRule::AllNumeric,
    ReturnRule::FirstOperand,
);

pub const CAST: Operator = Operator::new(
    "CAST",
    Kind::Cast,
    Arity::Exact(1),
    OperandRule::Any,
    ReturnRule::Explicit,
);
