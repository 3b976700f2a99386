//! Convenient re-exports for downstream crates.

pub use crate::config::PlannerConfig;
pub use crate::error::{Error, Result};
pub use crate::hash::Hash256;
pub use crate::id::{RelId, SessionId};
pub use crate::schema::{DataType, Field, RelType, Schema};
pub use crate::types::Scalar;
