#![forbid(unsafe_code)]
//! relopt-planner: the planning-session side of the trait layer.
//!
//! - `session`: register trait kinds and conventions, freeze, then search.
//! - `resolve`: satisfy, convert, enforce, or prune a trait requirement.
//! - `set`: equivalence sets of expressions grouped by trait set.
//! - `validate`: reject chosen plans that are not implementable.
//!
//! The search algorithm itself (rule firing, costing) lives outside this
//! crate and drives it through these entry points.

pub mod resolve;
pub mod session;
pub mod set;
pub mod stats;
pub mod validate;

pub use resolve::Resolution;
pub use session::{Phase, PlanningSession};
pub use set::RelSet;
pub use stats::{ResolveStats, ResolveStatsSnapshot};
pub use validate::validate_plan;
