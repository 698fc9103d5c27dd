//! Context module for the amgmc pipeline.
//!
//! This module provides the context type that owns a pipeline configuration and runs
//! transition matrix construction, stationary distribution, coarsening, preconditioner
//! setup and the singular solve in one call.
//!
//! Modules:
//! - [`chain_context`]: Contains the `ChainContext` runner and the `ChainReport` it returns.
//!
//! # Example
//! ```rust,ignore
//! use amgmc::context::ChainContext;
//! let report = ChainContext::default().run(&dense, &y)?;
//! assert!(report.residual < 1e-8);
//! ```

pub mod chain_context;
pub use chain_context::{ChainContext, ChainReport};
