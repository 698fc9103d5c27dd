//! SVD preconditioner and LGMRES on the singular system (I − P) x = b.
//!
//! Right-hand sides are built as b = A·y so every system is consistent; solutions are
//! judged by their residual, since x is only determined up to the null space of A.

use amgmc::config::{PipelineConfig, SvdOptions};
use amgmc::context::ChainContext;
use amgmc::markov::{build_singular_system, build_transition_matrix};
use amgmc::matrix::CsrMatrix;
use amgmc::preconditioner::SvdPreconditioner;
use amgmc::solver::{LgmresSolver, LinearSolver, solve_singular_system_lgmres};
use amgmc::utils::convergence::SolveStatus;
use amgmc::utils::metrics::{NormOrd, residual_norm};
use approx::assert_abs_diff_eq;
use faer::Mat;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn random_system(n: usize, seed: u64) -> (CsrMatrix, Vec<f64>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let dense = Mat::from_fn(n, n, |_, _| rng.gen_range(0.01..1.0));
    let a = build_singular_system(&build_transition_matrix(&dense).unwrap()).unwrap();
    let y: Vec<f64> = (0..n).map(|_| rng.gen_range(-1.0..1.0)).collect();
    let mut b = vec![0.0; n];
    a.spmv_serial(&y, &mut b);
    (a, b)
}

#[test]
fn pseudo_inverse_is_reflexive() {
    let (a, _) = random_system(8, 1);
    let pc = SvdPreconditioner::new(&a, 1e-8).unwrap();
    let pinv = pc.pinv();
    let a_pinv = &a.to_dense() * pinv;
    let back = pinv * &a_pinv;
    for i in 0..8 {
        for j in 0..8 {
            assert_abs_diff_eq!(back[(i, j)], pinv[(i, j)], epsilon = 1e-8);
        }
    }
}

#[test]
fn preconditioned_lgmres_solves_five_state_chain() {
    init_logging();
    let (a, b) = random_system(5, 2);
    let pc = SvdPreconditioner::new(&a, 1e-8).unwrap();
    let (x, info) = solve_singular_system_lgmres(&a, &b, Some(pc.as_operator()), 1e-10, 1000).unwrap();
    assert_eq!(info.info, 0);
    assert!(info.converged);
    assert!(residual_norm(&a, &x, &b, NormOrd::L2).unwrap() < 1e-8);
}

#[test]
fn unpreconditioned_lgmres_on_consistent_system() {
    let (a, b) = random_system(5, 3);
    let (x, info) = solve_singular_system_lgmres(&a, &b, None, 1e-10, 1000).unwrap();
    assert!(info.converged);
    assert!(residual_norm(&a, &x, &b, NormOrd::L2).unwrap() < 1e-8);
}

#[test]
fn restarts_with_augmentation_still_converge() {
    let (a, b) = random_system(40, 4);
    let pc = SvdPreconditioner::new(&a, 1e-8).unwrap();
    let mut solver = LgmresSolver::new(1e-10, 200).with_inner_m(3).with_outer_k(3);
    let mut x = vec![0.0; 40];
    let stats = solver.solve(&a, Some(pc.as_operator()), &b, &mut x).unwrap();
    assert_eq!(stats.status, SolveStatus::Converged);
    assert!(residual_norm(&a, &x, &b, NormOrd::Max).unwrap() < 1e-8);
}

#[test]
fn svd_size_limit_surfaces_through_pipeline() {
    let mut config = PipelineConfig::default();
    config.svd = SvdOptions { max_dim: 3, ..SvdOptions::default() };
    let dense = Mat::from_fn(4, 4, |_, _| 1.0);
    assert!(ChainContext::new(config).run(&dense, &[0.0; 4]).is_err());
}

#[test]
fn pipeline_on_random_chain() {
    init_logging();
    let n = 30;
    let mut rng = StdRng::seed_from_u64(99);
    let dense = Mat::from_fn(n, n, |_, _| rng.gen_range(0.0..1.0));
    let y: Vec<f64> = (0..n).map(|i| (i as f64).cos()).collect();
    let report = ChainContext::default().run(&dense, &y).unwrap();
    assert!(report.is_irreducible());
    assert!(report.power.converged);
    assert!(report.stationarity_error < 1e-10);
    assert_abs_diff_eq!(report.pi.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
    assert_eq!(report.preconditioner_rank, n - 1);
    assert!(report.hierarchy.len() <= 3);
    assert!(report.solve.converged);
    assert!(report.residual < 1e-8);
}

#[test]
fn zero_preconditioner_reports_breakdown() {
    let (a, b) = random_system(4, 5);
    // floor above every singular value leaves A⁺ = 0
    let pc = SvdPreconditioner::new(&a, 1e6).unwrap();
    assert_eq!(pc.rank(), 0);
    let (x, info) = solve_singular_system_lgmres(&a, &b, Some(pc.as_operator()), 1e-10, 100).unwrap();
    assert_eq!(info.info, -1);
    assert!(!info.converged);
    assert_eq!(info.stats.status, SolveStatus::Breakdown);
    assert_eq!(info.stats.iterations, 1);
    assert_eq!(x, vec![0.0; 4]);
}
