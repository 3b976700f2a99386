//! Result types for scalar expressions and row types for relational nodes.
//!
//! Pure data. A `RelType` is fixed when an expression is constructed and never
//! recomputed afterwards.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    Boolean,
    Int32,
    Int64,
    Float32,
    Float64,
    Utf8,
    Binary,
    Date64,
    Decimal128,
    /// Type of an untyped `NULL` literal before it is cast.
    Null,
}

impl DataType {
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            DataType::Int32
                | DataType::Int64
                | DataType::Float32
                | DataType::Float64
                | DataType::Decimal128
        )
    }

    /// Whether values of the two types can be compared with `=`, `<`, etc.
    pub fn is_comparable_with(self, other: DataType) -> bool {
        self == other
            || self == DataType::Null
            || other == DataType::Null
            || (self.is_numeric() && other.is_numeric())
    }

    /// Least restrictive numeric type of the two, if both are numeric.
    pub fn widen(self, other: DataType) -> Option<DataType> {
        if !self.is_numeric() || !other.is_numeric() {
            return None;
        }
        if other.rank() > self.rank() {
            Some(other)
        } else {
            Some(self)
        }
    }

    fn rank(self) -> u8 {
        match self {
            DataType::Int32 => 0,
            DataType::Int64 => 1,
            DataType::Decimal128 => 2,
            DataType::Float32 => 3,
            DataType::Float64 => 4,
            _ => 0,
        }
    }

    pub fn sql_name(self) -> &'static str {
        match self {
            DataType::Boolean => "BOOLEAN",
            DataType::Int32 => "INTEGER",
            DataType::Int64 => "BIGINT",
            DataType::Float32 => "REAL",
            DataType::Float64 => "DOUBLE",
            DataType::Utf8 => "VARCHAR",
            DataType::Binary => "VARBINARY",
            DataType::Date64 => "DATE",
            DataType::Decimal128 => "DECIMAL",
            DataType::Null => "NULL",
        }
    }
}

/// Statically-determined result type of a scalar expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RelType {
    pub data_type: DataType,
    pub nullable: bool,
}

impl RelType {
    pub const fn new(data_type: DataType, nullable: bool) -> Self {
        Self {
            data_type,
            nullable,
        }
    }

    pub const fn not_null(data_type: DataType) -> Self {
        Self::new(data_type, false)
    }

    pub const fn nullable(data_type: DataType) -> Self {
        Self::new(data_type, true)
    }

    pub fn is_boolean(&self) -> bool {
        self.data_type == DataType::Boolean
    }

    pub fn with_nullable(self, nullable: bool) -> Self {
        Self::new(self.data_type, nullable)
    }
}

impl fmt::Display for RelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.nullable {
            write!(f, "{}", self.data_type.sql_name())
        } else {
            write!(f, "{} NOT NULL", self.data_type.sql_name())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub data_type: DataType,
    pub nullable: bool,
}

impl Field {
    pub fn new(name: impl Into<String>, data_type: DataType, nullable: bool) -> Self {
        Self {
            name: name.into(),
            data_type,
            nullable,
        }
    }

    pub fn rel_type(&self) -> RelType {
        RelType::new(self.data_type, self.nullable)
    }
}

/// Row type of a relational expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Schema {
    pub fields: Vec<Field>,
}

impl Schema {
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    pub fn field(&self, idx: usize) -> Option<&Field> {
        self.fields.get(idx)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
