//! Multilevel hierarchy built by repeated aggregation coarsening.
//!
//! Level 0 holds the base operator with identity transfer operators. Each later
//! level holds the Galerkin-projected operator and the prolongation/restriction
//! pair that links it to the level above. The hierarchy is immutable once built.

use rand::Rng;

use crate::amg::aggregation::AggregationCoarsener;
use crate::config::CoarseningOptions;
use crate::error::McError;
use crate::matrix::{CsrMatrix, ensure_square};

/// One level: operator `a` (n_l × n_l), prolongation `p_op` (n_{l-1} × n_l) and
/// restriction `r_op = p_opᵀ`. On level 0 both transfers are the identity.
#[derive(Clone, Debug)]
pub struct AmgLevel {
    a: CsrMatrix,
    p_op: CsrMatrix,
    r_op: CsrMatrix,
}

impl AmgLevel {
    fn finest(a: CsrMatrix) -> Self {
        let n = a.nrows();
        Self {
            a,
            p_op: CsrMatrix::identity(n),
            r_op: CsrMatrix::identity(n),
        }
    }

    pub fn operator(&self) -> &CsrMatrix {
        &self.a
    }

    pub fn prolongation(&self) -> &CsrMatrix {
        &self.p_op
    }

    pub fn restriction(&self) -> &CsrMatrix {
        &self.r_op
    }

    pub fn size(&self) -> usize {
        self.a.nrows()
    }
}

#[derive(Clone, Debug)]
pub struct AmgHierarchy {
    levels: Vec<AmgLevel>,
}

impl AmgHierarchy {
    pub fn levels(&self) -> &[AmgLevel] {
        &self.levels
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn finest(&self) -> &AmgLevel {
        &self.levels[0]
    }

    pub fn coarsest(&self) -> &AmgLevel {
        &self.levels[self.levels.len() - 1]
    }

    /// Σ nnz(A_l) / nnz(A_0).
    pub fn operator_complexity(&self) -> f64 {
        let base = self.finest().a.nnz();
        if base == 0 {
            return 1.0;
        }
        let total: usize = self.levels.iter().map(|l| l.a.nnz()).sum();
        total as f64 / base as f64
    }
}

/// Build a hierarchy of at most `max_levels` levels with the default seeded coarsener
/// (ratio 0.5, seed 42), stopping once a level has 4 or fewer rows.
pub fn build_amg_hierarchy(a: &CsrMatrix, max_levels: usize) -> Result<AmgHierarchy, McError> {
    let opts = CoarseningOptions {
        max_levels,
        ..CoarseningOptions::default()
    };
    let mut coarsener = AggregationCoarsener::seeded(opts.ratio, opts.seed)?;
    build_amg_hierarchy_with(a, &opts, &mut coarsener)
}

/// Build a hierarchy using an explicit coarsener; `opts.ratio` and `opts.seed` are
/// ignored in favour of the coarsener's own.
pub fn build_amg_hierarchy_with<R: Rng>(
    a: &CsrMatrix,
    opts: &CoarseningOptions,
    coarsener: &mut AggregationCoarsener<R>,
) -> Result<AmgHierarchy, McError> {
    ensure_square(a.nrows(), a.ncols())?;
    if opts.max_levels == 0 {
        return Err(McError::InvalidParameter("max_levels must be at least 1".into()));
    }
    let mut levels = vec![AmgLevel::finest(a.clone())];
    while levels.len() < opts.max_levels {
        let current = &levels[levels.len() - 1].a;
        if current.nrows() <= opts.min_coarse_size {
            break;
        }
        let (a, p_op, r_op) = coarsener.coarsen(current)?;
        levels.push(AmgLevel { a, p_op, r_op });
    }
    log::debug!(
        "hierarchy built: {} levels, sizes {:?}",
        levels.len(),
        levels.iter().map(AmgLevel::size).collect::<Vec<_>>()
    );
    Ok(AmgHierarchy { levels })
}
