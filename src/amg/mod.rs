//! Aggregation-based coarsening hierarchy.
//!
//! The hierarchy is built for inspection and experimentation; the LGMRES solve in
//! [`crate::solver`] does not consume it and uses the single-level SVD preconditioner.

pub mod aggregation;
pub mod hierarchy;

pub use aggregation::{AggregationCoarsener, prolongation};
pub use hierarchy::{AmgHierarchy, AmgLevel, build_amg_hierarchy, build_amg_hierarchy_with};
