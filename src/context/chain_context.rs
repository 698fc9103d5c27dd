//! End-to-end Markov chain pipeline.
//!
//! `ChainContext` holds a [`PipelineConfig`] and runs every stage on a dense input:
//!
//! 1. normalize the input into a row-stochastic `P` and check irreducibility
//! 2. stationary distribution π by power iteration on Pᵀ
//! 3. singular operator A = I − P and its aggregation hierarchy
//! 4. SVD pseudo-inverse preconditioner of A
//! 5. consistent right-hand side b = A·y, solved with preconditioned LGMRES
//!
//! All artefacts are returned in a [`ChainReport`]. A reducible chain is reported
//! through [`ChainReport::flags`] and logged, not rejected; a non-converged power
//! iteration or solve is likewise reported as data. The context never touches the
//! global thread pool; call [`crate::config::ThreadConfig::apply`] beforehand if needed.

use faer::Mat;

use crate::amg::{AggregationCoarsener, AmgHierarchy, build_amg_hierarchy_with};
use crate::config::PipelineConfig;
use crate::error::McError;
use crate::markov::{
    ChainFlags, PowerStats, build_singular_system, build_transition_matrix_with, chain_properties,
    stationary_distribution_power_with_stats,
};
use crate::matrix::CsrMatrix;
use crate::preconditioner::SvdPreconditioner;
use crate::solver::{SolveInfo, solve_singular_system_lgmres_with};
use crate::utils::metrics::{NormOrd, l1_error, residual_norm};

/// Everything produced by one [`ChainContext::run`].
#[derive(Clone, Debug)]
pub struct ChainReport {
    /// Row-stochastic transition matrix
    pub p: CsrMatrix,
    /// Singular operator I − P
    pub a: CsrMatrix,
    /// Stationary distribution (sums to one)
    pub pi: Vec<f64>,
    pub power: PowerStats,
    pub flags: ChainFlags,
    pub hierarchy: AmgHierarchy,
    /// Singular values kept by the preconditioner
    pub preconditioner_rank: usize,
    /// Right-hand side A·y
    pub b: Vec<f64>,
    /// LGMRES solution of A x = b
    pub x: Vec<f64>,
    pub solve: SolveInfo,
    /// ‖b − A x‖₂
    pub residual: f64,
    /// ‖π − Pᵀπ‖₁
    pub stationarity_error: f64,
}

impl ChainReport {
    pub fn is_irreducible(&self) -> bool {
        self.flags.contains(ChainFlags::ROW_STOCHASTIC | ChainFlags::IRREDUCIBLE)
    }
}

/// Configured pipeline runner.
#[derive(Clone, Debug, Default)]
pub struct ChainContext {
    config: PipelineConfig,
}

impl ChainContext {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the pipeline on the dense non-negative matrix `dense`, solving A x = A·y.
    pub fn run(&self, dense: &Mat<f64>, y: &[f64]) -> Result<ChainReport, McError> {
        let cfg = &self.config;
        cfg.coarsening.validate()?;
        cfg.lgmres.validate()?;

        let p = build_transition_matrix_with(dense, cfg.zero_rows)?;
        let n = p.nrows();
        if y.len() != n {
            return Err(McError::DimensionMismatch { expected: n, found: y.len() });
        }
        let flags = chain_properties(&p, cfg.irreducibility_tol);
        if !flags.contains(ChainFlags::IRREDUCIBLE) {
            log::warn!("transition matrix is reducible ({flags:?}); π and the solve may be unreliable");
        }

        let (pi, power) = stationary_distribution_power_with_stats(&p, cfg.power.maxit, cfg.power.tol)?;
        let mut pt_pi = vec![0.0; n];
        p.spmv_transpose(&pi, &mut pt_pi);
        let stationarity_error = l1_error(&pi, &pt_pi)?;

        let a = build_singular_system(&p)?;
        let mut coarsener = AggregationCoarsener::seeded(cfg.coarsening.ratio, cfg.coarsening.seed)?;
        let hierarchy = build_amg_hierarchy_with(&a, &cfg.coarsening, &mut coarsener)?;

        let pc = SvdPreconditioner::from_options(&a, &cfg.svd)?;
        let mut b = vec![0.0; n];
        a.spmv_serial(y, &mut b);
        let (x, solve) = solve_singular_system_lgmres_with(&a, &b, Some(pc.as_operator()), &cfg.lgmres)?;
        let residual = residual_norm(&a, &x, &b, NormOrd::L2)?;

        log::info!(
            "chain n = {n}: power {} its, stationarity {stationarity_error:e}, {} levels, lgmres info {} residual {residual:e}",
            power.iterations,
            hierarchy.len(),
            solve.info
        );
        Ok(ChainReport {
            p,
            a,
            pi,
            power,
            flags,
            hierarchy,
            preconditioner_rank: pc.rank(),
            b,
            x,
            solve,
            residual,
            stationarity_error,
        })
    }
}
