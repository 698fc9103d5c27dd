//! Markov-chain builders: transition matrix, stationary distribution and the singular system I − P.

pub mod singular;
pub mod stationary;
pub mod transition;

pub use singular::build_singular_system;
pub use stationary::{PowerStats, stationary_distribution_power, stationary_distribution_power_with_stats};
pub use transition::{
    ChainFlags, build_transition_matrix, build_transition_matrix_with, chain_properties,
    is_stochastic_irreducible,
};
