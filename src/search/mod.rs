//! Search algorithms for the clique partitioning problem.

/// randomized greedy constructor (GRASP adding phase)
pub mod greedy_adding;

/// deterministic steepest-ascent single-vertex local search
pub mod greedy_moving;

/// simulated annealing kernel with the move/edge/push neighborhood
pub mod annealing;

/// GRASP: repeated randomized construction, local search and annealing
pub mod grasp;

/// bounded diverse pool of elite solutions
pub mod pool;

/// Diverse Pool Search strategy
pub mod diverse_pool;

/// Fixed Set Search strategy
pub mod fixed_set;
