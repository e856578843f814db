//! Consistency Checking Module
//!
//! Cross-checks on-disk article state against the pipeline definitions and
//! the transition graph, reporting drift and optionally repairing it.

mod consistency;

pub use consistency::{
    ConsistencyChecker, ConsistencyReport, Mismatch, RepairOutcome, RepairedEntry,
};
