//! Explicit option objects for every stage of the pipeline.
//!
//! Nothing here is read from the environment or applied on load. The entry point
//! builds a [`PipelineConfig`] (usually `Default::default()`), optionally calls
//! [`ThreadConfig::apply`] once, and passes the pieces down.

use crate::error::McError;

/// What to do with a dense input row whose sum is zero.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ZeroRowPolicy {
    /// Fail with `McError::DegenerateRow`.
    #[default]
    Reject,
    /// Replace the row by the uniform distribution 1/n.
    Uniform,
}

/// Power iteration limits.
#[derive(Clone, Debug)]
pub struct PowerOptions {
    pub maxit: usize,
    /// Absolute L1 tolerance between successive iterates.
    pub tol: f64,
}

impl Default for PowerOptions {
    fn default() -> Self {
        Self { maxit: 10_000, tol: 1e-12 }
    }
}

/// Random-aggregation coarsening and hierarchy limits.
#[derive(Clone, Debug)]
pub struct CoarseningOptions {
    /// Coarse size is `max(1, floor(n * ratio))`; must lie in (0, 1].
    pub ratio: f64,
    pub max_levels: usize,
    /// Coarsening stops once a level has at most this many rows.
    pub min_coarse_size: usize,
    /// Seed of the default `StdRng` aggregation source.
    pub seed: u64,
}

impl Default for CoarseningOptions {
    fn default() -> Self {
        Self {
            ratio: 0.5,
            max_levels: 3,
            min_coarse_size: 4,
            seed: 42,
        }
    }
}

impl CoarseningOptions {
    pub fn validate(&self) -> Result<(), McError> {
        if !(self.ratio > 0.0 && self.ratio <= 1.0) {
            return Err(McError::InvalidParameter(format!(
                "coarsening ratio must lie in (0, 1], got {}",
                self.ratio
            )));
        }
        Ok(())
    }
}

/// SVD pseudo-inverse preconditioner.
#[derive(Clone, Debug)]
pub struct SvdOptions {
    /// Singular values at or below this floor are discarded.
    pub reg: f64,
    /// Largest n for which the dense O(n^3) factorization is attempted.
    pub max_dim: usize,
}

impl Default for SvdOptions {
    fn default() -> Self {
        Self { reg: 1e-8, max_dim: 2048 }
    }
}

/// Restarted LGMRES parameters.
#[derive(Clone, Debug)]
pub struct LgmresOptions {
    /// Absolute residual tolerance.
    pub tol: f64,
    /// Relative residual tolerance (0 disables it).
    pub rtol: f64,
    /// Maximum number of outer cycles.
    pub maxit: usize,
    /// Inner Krylov subspace dimension per cycle.
    pub inner_m: usize,
    /// Number of outer error approximations kept across restarts.
    pub outer_k: usize,
}

impl Default for LgmresOptions {
    fn default() -> Self {
        Self {
            tol: 1e-10,
            rtol: 0.0,
            maxit: 10_000,
            inner_m: 30,
            outer_k: 3,
        }
    }
}

impl LgmresOptions {
    pub fn validate(&self) -> Result<(), McError> {
        if self.inner_m == 0 {
            return Err(McError::InvalidParameter("inner_m must be at least 1".into()));
        }
        if self.tol < 0.0 || self.rtol < 0.0 {
            return Err(McError::InvalidParameter("tolerances must be non-negative".into()));
        }
        Ok(())
    }
}

/// Thread count for the parallel linear-algebra kernels.
#[derive(Clone, Debug, Default)]
pub struct ThreadConfig {
    /// `None` uses one thread per logical CPU.
    pub num_threads: Option<usize>,
}

impl ThreadConfig {
    pub fn with_threads(n: usize) -> Self {
        Self { num_threads: Some(n) }
    }

    /// Number of threads `apply` would request.
    pub fn resolved_threads(&self) -> usize {
        #[cfg(feature = "rayon")]
        {
            self.num_threads.unwrap_or_else(num_cpus::get)
        }
        #[cfg(not(feature = "rayon"))]
        {
            1
        }
    }

    /// Configure the rayon global pool. Succeeds at most once per process; a
    /// second call reports `McError::ThreadPool`. The first parallel kernel (SpMV,
    /// dot, norm) initializes the global pool implicitly, so `apply` also fails once
    /// any of them has run; call it before the first solve. No-op without the
    /// `rayon` feature.
    pub fn apply(&self) -> Result<(), McError> {
        #[cfg(feature = "rayon")]
        {
            let threads = self.resolved_threads();
            rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build_global()
                .map_err(|e| McError::ThreadPool(e.to_string()))?;
            log::debug!("rayon global pool configured with {threads} threads");
        }
        Ok(())
    }
}

/// Every option of the pipeline in one place.
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    pub zero_rows: ZeroRowPolicy,
    /// Edge threshold for the irreducibility check.
    pub irreducibility_tol: f64,
    pub power: PowerOptions,
    pub coarsening: CoarseningOptions,
    pub svd: SvdOptions,
    pub lgmres: LgmresOptions,
    pub threads: ThreadConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            zero_rows: ZeroRowPolicy::Reject,
            irreducibility_tol: 1e-12,
            power: PowerOptions::default(),
            coarsening: CoarseningOptions::default(),
            svd: SvdOptions::default(),
            lgmres: LgmresOptions::default(),
            threads: ThreadConfig::default(),
        }
    }
}

impl PipelineConfig {
    pub fn new() -> Self {
        Self::default()
    }
}
