//! Pipeline Lifecycle State Machine
//!
//! Derives the valid lifecycle transitions from externally supplied pipeline
//! definitions and answers reachability/publishability queries over them.

mod graph;

pub use graph::{TransitionGraph, DEFAULT_PUBLISHABLE_PATTERN};
