//! Properties of the Markov chain builders and the aggregation hierarchy.
//!
//! Inputs are random positive matrices drawn from a seeded `StdRng`, so every run sees
//! the same chains. Exact identities (R = Pᵀ, Galerkin products) are compared exactly;
//! floating-point identities use `approx` with tight tolerances.

use amgmc::amg::{AggregationCoarsener, AmgHierarchy, AmgLevel, build_amg_hierarchy, build_amg_hierarchy_with};
use amgmc::config::CoarseningOptions;
use amgmc::markov::{
    build_singular_system, build_transition_matrix, is_stochastic_irreducible,
    stationary_distribution_power,
};
use amgmc::matrix::{CsrMatrix, dense_from_rows};
use amgmc::utils::metrics::{l1_error, l2_error};
use approx::assert_abs_diff_eq;
use faer::Mat;
use rand::rngs::StdRng;
use rand::rngs::mock::StepRng;
use rand::{Rng, SeedableRng};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Random strictly positive n×n matrix.
fn random_positive(n: usize, seed: u64) -> Mat<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let data: Vec<f64> = (0..n * n).map(|_| rng.gen_range(0.01..1.0)).collect();
    Mat::from_fn(n, n, |i, j| data[i * n + j])
}

#[test]
fn transition_rows_sum_to_one() {
    init_logging();
    for (n, seed) in [(1, 1), (7, 2), (40, 3)] {
        let p = build_transition_matrix(&random_positive(n, seed)).unwrap();
        for s in p.row_sums() {
            assert_abs_diff_eq!(s, 1.0, epsilon = 1e-12);
        }
    }
}

#[test]
fn stochastic_input_is_unchanged() {
    let dense = dense_from_rows(&[
        vec![0.5, 0.25, 0.25],
        vec![0.1, 0.8, 0.1],
        vec![0.0, 0.5, 0.5],
    ])
    .unwrap();
    let p = build_transition_matrix(&dense).unwrap();
    let round = p.to_dense();
    for i in 0..3 {
        for j in 0..3 {
            assert_abs_diff_eq!(round[(i, j)], dense[(i, j)], epsilon = 1e-12);
        }
    }
}

#[test]
fn uniform_two_state_chain() {
    let p = build_transition_matrix(&Mat::from_fn(2, 2, |_, _| 1.0)).unwrap();
    let pi = stationary_distribution_power(&p, 100, 1e-12).unwrap();
    assert_abs_diff_eq!(pi[0], 0.5, epsilon = 1e-12);
    assert_abs_diff_eq!(pi[1], 0.5, epsilon = 1e-12);
}

#[test]
fn stationary_vector_is_fixed_point() {
    init_logging();
    let p = build_transition_matrix(&random_positive(25, 11)).unwrap();
    let pi = stationary_distribution_power(&p, 10_000, 1e-14).unwrap();
    assert_abs_diff_eq!(pi.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
    assert!(pi.iter().all(|&v| v > 0.0));
    let mut pt_pi = vec![0.0; 25];
    p.spmv_transpose(&pi, &mut pt_pi);
    assert!(l1_error(&pi, &pt_pi).unwrap() < 1e-12);
}

#[test]
fn irreducibility_detected() {
    let p = build_transition_matrix(&random_positive(6, 5)).unwrap();
    assert!(is_stochastic_irreducible(&p, 1e-12));
    // two disconnected 2-cycles
    let blocks = Mat::from_fn(4, 4, |i, j| if i / 2 == j / 2 && i != j { 1.0 } else { 0.0 });
    let p = build_transition_matrix(&blocks).unwrap();
    assert!(!is_stochastic_irreducible(&p, 1e-12));
}

fn assert_galerkin_levels(h: &AmgHierarchy) {
    let levels = h.levels();
    for l in 1..levels.len() {
        let level = &levels[l];
        assert_eq!(level.restriction(), &level.prolongation().transpose());
        let galerkin = level
            .restriction()
            .matmul(levels[l - 1].operator())
            .unwrap()
            .matmul(level.prolongation())
            .unwrap();
        assert_eq!(level.operator(), &galerkin);
    }
}

#[test]
fn injected_random_source_drives_aggregation() {
    let a = build_singular_system(&build_transition_matrix(&random_positive(30, 8)).unwrap()).unwrap();
    let opts = CoarseningOptions::default();
    let mut first = AggregationCoarsener::new(opts.ratio, StdRng::seed_from_u64(1)).unwrap();
    let mut second = AggregationCoarsener::new(opts.ratio, StdRng::seed_from_u64(2)).unwrap();
    let h1 = build_amg_hierarchy_with(&a, &opts, &mut first).unwrap();
    let h2 = build_amg_hierarchy_with(&a, &opts, &mut second).unwrap();
    assert_eq!(h1.levels()[1].size(), h2.levels()[1].size());
    assert_ne!(h1.levels()[1].prolongation(), h2.levels()[1].prolongation());
    assert_galerkin_levels(&h1);
    assert_galerkin_levels(&h2);

    // any Rng works, including a fixed arithmetic sequence
    let mut stepped = AggregationCoarsener::new(opts.ratio, StepRng::new(0, 0x9E37_79B9_7F4A_7C15)).unwrap();
    let h3 = build_amg_hierarchy_with(&a, &opts, &mut stepped).unwrap();
    assert_eq!(h3.len(), 3);
    assert_galerkin_levels(&h3);
}

#[test]
fn hierarchy_levels_are_galerkin_products() {
    init_logging();
    let a = build_singular_system(&build_transition_matrix(&random_positive(30, 9)).unwrap()).unwrap();
    let h = build_amg_hierarchy(&a, 4).unwrap();
    assert!(h.len() > 1);
    let levels = h.levels();
    assert_eq!(levels[0].operator(), &a);
    for l in 1..levels.len() {
        let fine = levels[l - 1].operator();
        let level = &levels[l];
        assert_eq!(level.restriction(), &level.prolongation().transpose());
        let galerkin = level.restriction().matmul(fine).unwrap().matmul(level.prolongation()).unwrap();
        assert_eq!(level.operator(), &galerkin);
        // every fine index belongs to exactly one aggregate
        for i in 0..level.prolongation().nrows() {
            assert_eq!(level.prolongation().row(i).0.len(), 1);
        }
    }
}

#[test]
fn hierarchy_respects_level_budget_and_stops_small() {
    let a = build_singular_system(&build_transition_matrix(&random_positive(50, 4)).unwrap()).unwrap();
    for max_levels in 1..8 {
        let h = build_amg_hierarchy(&a, max_levels).unwrap();
        assert!(h.len() <= max_levels);
        let sizes: Vec<usize> = h.levels().iter().map(AmgLevel::size).collect();
        if h.len() < max_levels {
            assert!(*sizes.last().unwrap() <= 4);
        }
        // only the last level may be at or below the threshold
        assert!(sizes[..sizes.len() - 1].iter().all(|&s| s > 4));
    }
}

#[test]
fn identical_vectors_have_zero_error() {
    let mut rng = StdRng::seed_from_u64(0);
    let v: Vec<f64> = (0..17).map(|_| rng.gen_range(-1.0..1.0)).collect();
    assert_eq!(l1_error(&v, &v).unwrap(), 0.0);
    assert_eq!(l2_error(&v, &v).unwrap(), 0.0);
}

#[test]
fn singular_operator_annihilates_constants() {
    let p = build_transition_matrix(&random_positive(12, 21)).unwrap();
    let a = build_singular_system(&p).unwrap();
    let mut y = vec![0.0; 12];
    a.spmv_serial(&[1.0; 12], &mut y);
    for v in y {
        assert_abs_diff_eq!(v, 0.0, epsilon = 1e-14);
    }
    assert_eq!(a.nrows(), CsrMatrix::identity(12).nrows());
}
