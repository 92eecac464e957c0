//! Metaheuristic solver for the Clique Partitioning Problem (partition the
//! vertices of a complete edge-weighted graph into cliques of maximum total
//! intra-clique weight). Implements a GRASP constructor, a simulated
//! annealing kernel with an extended neighborhood, and two outer strategies
//! (Diverse Pool Search and Fixed Set Search).

// #![warn(clippy::all, clippy::pedantic)]
// useful additional warnings if docs are missing, or crates imported but unused, etc.
#![warn(missing_debug_implementations)]
#![warn(missing_docs)]
#![warn(trivial_casts, trivial_numeric_casts)]
#![warn(unsafe_code)]
#![warn(unused_extern_crates)]
#![warn(variant_size_differences)]

// not sure if already by default in clippy
#![warn(clippy::similar_names)]
#![warn(clippy::shadow_unrelated)]
#![warn(clippy::shadow_same)]
#![warn(clippy::shadow_reuse)]


/// clique partitioning instance, partitions, value function and checker
pub mod instance;

/// read CPn problem files
pub mod cpn;

/// process-wide seedable random number generator
pub mod rng;

/// distances between partitions (Rand error, variation of information)
pub mod distances;

/// solution record: a partition with its cached value and vertex lookup
pub mod solution;

/// helper and utility methods for executables
pub mod util;

/// search algorithms for the clique partitioning problem
pub mod search;
