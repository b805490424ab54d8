//! Keywise code generation core.
//!
//! The core is a deterministic, cache-friendly text generation engine over
//! a declarative symbol graph. Each candidate declaration is lowered into
//! an immutable, structurally-equatable state snapshot; snapshots double as
//! incremental cache keys, and a fixed-order family of fragment generators
//! renders each snapshot into the synthesized implementation.
//!
//! Nothing in this crate touches `proc_macro`; the derive front end and the
//! batch pipeline are both thin hosts over the same state + generator
//! machinery.

pub mod cache;
pub mod diagnostic;
pub mod emit;
pub mod generate;
pub mod helper;
pub mod pipeline;
pub mod state;
pub mod symbol;

mod prelude;
