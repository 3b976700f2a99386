#![forbid(unsafe_code)]
//! relopt-core: shared vocabulary for the relopt planner crates.
//!
//! Everything here is pure data: ids, the error taxonomy, planner configuration,
//! statically-determined result types, literal values, and blake3 fingerprints.
//! No planning logic lives in core.

pub mod config;
pub mod error;
pub mod hash;
pub mod id;
pub mod prelude;
pub mod schema;
pub mod types;
