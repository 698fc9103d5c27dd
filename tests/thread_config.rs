//! Global thread-pool configuration.
//!
//! The rayon global pool is process-wide, so this binary holds a single test that
//! configures it before any parallel kernel has run.

use amgmc::config::ThreadConfig;

#[cfg(feature = "rayon")]
#[test]
fn global_pool_is_configured_once() {
    use amgmc::error::McError;
    use amgmc::markov::{build_singular_system, build_transition_matrix};
    use amgmc::solver::solve_singular_system_lgmres;
    use faer::Mat;

    let config = ThreadConfig::with_threads(2);
    assert_eq!(config.resolved_threads(), 2);
    config.apply().unwrap();
    assert_eq!(rayon::current_num_threads(), 2);
    assert!(matches!(config.apply(), Err(McError::ThreadPool(_))));

    // kernels run on the configured pool afterwards
    let p = build_transition_matrix(&Mat::from_fn(3, 3, |i, j| (i + j + 1) as f64)).unwrap();
    let a = build_singular_system(&p).unwrap();
    let mut b = vec![0.0; 3];
    a.spmv_serial(&[1.0, 0.0, -1.0], &mut b);
    let (_, info) = solve_singular_system_lgmres(&a, &b, None, 1e-10, 100).unwrap();
    assert!(info.converged);
}

#[cfg(not(feature = "rayon"))]
#[test]
fn apply_is_a_no_op_without_rayon() {
    let config = ThreadConfig::with_threads(2);
    assert_eq!(config.resolved_threads(), 1);
    config.apply().unwrap();
    config.apply().unwrap();
}
