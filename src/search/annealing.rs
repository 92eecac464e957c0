use std::rc::Rc;
use std::time::Instant;

use crate::instance::{clique_labels, partition_from_labels, CliqueId, Instance, Partition, VertexId, Weight};
use crate::rng;
use crate::search::greedy_adding::greedy_adding_from_empty;

/** allows a vertex alone in its clique to move into another empty clique.
Disabled: such moves never change the value and only relabel the partition.
*/
const ALLOW_SINGLETON_MOVES: bool = false;

/// cooling down to this temperature means zero-gain moves keep getting
/// accepted forever; the kernel bails out instead of cooling further
const MINIMUM_TEMPERATURE: f64 = 0.0005;

/** annealing parameter bundle shared by GRASP, DPS and FSS */
#[derive(Debug, Clone)]
pub struct SaParams {
    /// starting temperature (see [calibrate_temperature] for an automatic choice)
    pub initial_temperature: f64,
    /// batch size is this factor times (nb cliques . nb vertices)
    pub batch_size_scale_factor: f64,
    /// geometric cooling factor, within (0,1)
    pub cooldown_factor: f64,
    /// a batch accepting a smaller fraction of moves counts as stagnating
    pub minimal_transition_ratio: f64,
}

impl Default for SaParams {
    fn default() -> Self {
        Self {
            initial_temperature: 100.,
            batch_size_scale_factor: 8.,
            cooldown_factor: 0.96,
            minimal_transition_ratio: 0.01,
        }
    }
}

/// the three neighborhood operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MoveType {
    /// move one vertex to another clique
    Moving,
    /// move the vertex and the previously moved one to the same new clique
    Edging,
    /// move the vertex away, the previously moved one takes its place
    Pushing,
}

/** incremental annealing state. `weight_to_clique` rows cover the non-empty
clique slots and grow on demand when a vertex settles an empty slot. */
#[derive(Debug)]
struct AnnealingState {
    /// instance object
    inst: Rc<Instance>,
    /// weight_to_clique[c][v]: total edge weight between v and the vertices
    /// of clique slot c. Moving v from its clique c to a non-empty clique k
    /// changes the value by weight_to_clique[k][v] - weight_to_clique[c][v]
    weight_to_clique: Vec<Vec<Weight>>,
    /// nb_in_clique[c]: number of vertices currently in clique slot c
    nb_in_clique: Vec<usize>,
    /// clique_of[v]: clique slot currently containing v
    clique_of: Vec<CliqueId>,
}

impl AnnealingState {

    /** builds the incremental state of a partition whose `nb_cliques` first
    slots are the non-empty ones */
    fn initialize(inst:Rc<Instance>, partition:&[Vec<VertexId>], nb_cliques:usize) -> Self {
        let n = inst.n();
        let weight_to_clique = (0..nb_cliques).map(|c| {
            (0..n).map(|v| {
                partition[c].iter().map(|u| inst.weight(v, *u)).sum()
            }).collect()
        }).collect();
        let mut nb_in_clique = vec![0 ; n.max(partition.len())];
        for (c,clique) in partition.iter().enumerate() {
            nb_in_clique[c] = clique.len();
        }
        let clique_of = clique_labels(partition, n);
        Self { inst, weight_to_clique, nb_in_clique, clique_of }
    }

    /** draws a random vertex, evaluates the neighborhood and possibly
    applies the best move. Returns (accepted, value change, drawn vertex);
    the drawn vertex becomes the next step's previously-moved vertex. */
    fn step(&mut self, previous_vertex:VertexId, temperature:f64) -> (bool, Weight, VertexId) {
        let vertex = rng::rand_below(self.inst.n());
        let origin = self.clique_of[vertex];
        let previous_origin = self.clique_of[previous_vertex];
        let (target, change, move_type) =
            self.best_two_part_move(vertex, previous_vertex, origin, previous_origin);
        let mut performed = false;
        if change >= 0 || accept_worsening_move(change, temperature) {
            let target_clique = target.expect("step: accepted move without a target clique");
            match move_type {
                MoveType::Moving => {
                    self.move_vertex(vertex, origin, target_clique);
                }
                MoveType::Edging => {
                    self.move_vertex(vertex, origin, target_clique);
                    self.move_vertex(previous_vertex, previous_origin, target_clique);
                }
                MoveType::Pushing => {
                    self.move_vertex(vertex, origin, target_clique);
                    self.move_vertex(previous_vertex, previous_origin, origin);
                }
            }
            performed = true;
        }
        (performed, change, vertex)
    }

    /// applies one single-vertex move and repairs the incremental state
    fn move_vertex(&mut self, vertex:VertexId, from:CliqueId, to:CliqueId) {
        self.nb_in_clique[from] -= 1;
        self.nb_in_clique[to] += 1;
        self.clique_of[vertex] = to;
        self.update_weight_sums(vertex, from, to);
    }

    /// shifts the moved vertex's weights between the source and target rows
    fn update_weight_sums(&mut self, moved_vertex:VertexId, from:CliqueId, to:CliqueId) {
        if from == to {
            return;
        }
        let n = self.inst.n();
        while self.weight_to_clique.len() < to + 1 {
            self.weight_to_clique.push(vec![0 ; n]);
        }
        let vertex_weights = self.inst.weights_from(moved_vertex);
        for (sum,w) in self.weight_to_clique[to].iter_mut().zip(vertex_weights) {
            *sum += *w;
        }
        for (sum,w) in self.weight_to_clique[from].iter_mut().zip(vertex_weights) {
            *sum -= *w;
        }
    }

    /** best move among the three operators and the empty-clique option.
    When the drawn vertex is the previously moved one, only simple moves are
    considered. Ties go to the earliest operator in (moving, edging, pushing,
    empty-clique move). */
    fn best_two_part_move(&self,
                          vertex:VertexId,
                          previous_vertex:VertexId,
                          origin:CliqueId,
                          previous_origin:CliqueId) -> (Option<CliqueId>, Weight, MoveType) {
        if vertex == previous_vertex {
            let (target, change) = self.best_move_for_vertex(vertex, origin);
            return (target, change, MoveType::Moving);
        }
        let (moving_target, moving_change) = self.best_classical_move(vertex, origin);
        let (edging_target, edging_change) =
            self.best_edging(vertex, origin, previous_vertex, previous_origin);
        let (pushing_target, pushing_change) =
            self.best_pushing(vertex, origin, previous_vertex, previous_origin);
        let (empty_target, empty_change) = self.value_for_moving_to_empty(vertex, origin);
        let best_change = moving_change.max(edging_change).max(pushing_change).max(empty_change);
        if best_change == moving_change {
            return (moving_target, best_change, MoveType::Moving);
        }
        if best_change == edging_change {
            return (edging_target, best_change, MoveType::Edging);
        }
        if best_change == pushing_change {
            return (pushing_target, best_change, MoveType::Pushing);
        }
        (empty_target, best_change, MoveType::Moving)
    }

    /// best simple move: the better of the classical targets and the
    /// empty-clique option (the latter wins ties)
    fn best_move_for_vertex(&self, vertex:VertexId, origin:CliqueId) -> (Option<CliqueId>, Weight) {
        let (classical_target, classical_change) = self.best_classical_move(vertex, origin);
        let (empty_target, empty_change) = self.value_for_moving_to_empty(vertex, origin);
        if classical_change > empty_change {
            (classical_target, classical_change)
        } else {
            (empty_target, empty_change)
        }
    }

    /// best move of `vertex` to another currently tracked clique
    fn best_classical_move(&self, vertex:VertexId, origin:CliqueId) -> (Option<CliqueId>, Weight) {
        let change_for_removal = -self.weight_to_clique[origin][vertex];
        let mut best_target = None;
        let mut best_gain = Weight::MIN;
        for (candidate,sums) in self.weight_to_clique.iter().enumerate() {
            if !ALLOW_SINGLETON_MOVES && self.nb_in_clique[candidate] == 0 {
                continue; // empty targets are handled by the empty-clique option
            }
            if candidate == origin {
                continue;
            }
            if sums[vertex] > best_gain {
                best_gain = sums[vertex];
                best_target = Some(candidate);
            }
        }
        match best_target {
            None => (None, Weight::MIN),
            Some(_) => (best_target, best_gain + change_for_removal),
        }
    }

    /// best clique receiving both `vertex` and the previously moved vertex
    fn best_edging(&self,
                   vertex:VertexId,
                   origin:CliqueId,
                   previous_vertex:VertexId,
                   previous_origin:CliqueId) -> (Option<CliqueId>, Weight) {
        let change_for_removal = -self.weight_to_clique[origin][vertex];
        let change_for_removal_of_previous = -self.weight_to_clique[previous_origin][previous_vertex];
        let mut best_target = None;
        let mut best_gain = Weight::MIN;
        for (candidate,sums) in self.weight_to_clique.iter().enumerate() {
            if candidate == origin || candidate == previous_origin {
                continue;
            }
            let gain = sums[vertex] + sums[previous_vertex];
            if gain > best_gain {
                best_gain = gain;
                best_target = Some(candidate);
            }
        }
        match best_target {
            None => (None, Weight::MIN),
            Some(_) => {
                // the pair edge is counted once when the vertices come from
                // different cliques, twice when they leave the same one
                let adjustment = if origin != previous_origin {
                    self.inst.weight(vertex, previous_vertex)
                } else {
                    2 * self.inst.weight(vertex, previous_vertex)
                };
                (best_target,
                 best_gain + adjustment + change_for_removal + change_for_removal_of_previous)
            }
        }
    }

    /// best move of `vertex` away while the previously moved vertex takes
    /// its place. Infeasible when both live in the same clique
    fn best_pushing(&self,
                    vertex:VertexId,
                    origin:CliqueId,
                    previous_vertex:VertexId,
                    previous_origin:CliqueId) -> (Option<CliqueId>, Weight) {
        if origin == previous_origin {
            return (None, Weight::MIN);
        }
        let change_for_removal = -self.weight_to_clique[origin][vertex];
        let change_for_removal_of_previous = -self.weight_to_clique[previous_origin][previous_vertex];
        let mut best_target = None;
        let mut best_gain = Weight::MIN;
        for (candidate,sums) in self.weight_to_clique.iter().enumerate() {
            if candidate == origin {
                continue;
            }
            // the pair edge is lost once, or twice when the two swap places
            let adjustment = if candidate != previous_origin {
                -self.inst.weight(vertex, previous_vertex)
            } else {
                -2 * self.inst.weight(vertex, previous_vertex)
            };
            let gain = sums[vertex] + self.weight_to_clique[origin][previous_vertex] + adjustment;
            if gain > best_gain {
                best_gain = gain;
                best_target = Some(candidate);
            }
        }
        match best_target {
            None => (None, Weight::MIN),
            Some(_) => (best_target,
                        best_gain + change_for_removal + change_for_removal_of_previous),
        }
    }

    /** value change for sending `vertex` to the first empty clique. A vertex
    already alone may not move (the returned target then only reports its own
    clique and the change is an absorbing minimum). */
    fn value_for_moving_to_empty(&self, vertex:VertexId, origin:CliqueId) -> (Option<CliqueId>, Weight) {
        if self.nb_in_clique[origin] == 1 {
            let change = if ALLOW_SINGLETON_MOVES { -self.weight_to_clique[origin][vertex] } else { Weight::MIN };
            return (Some(origin), change);
        }
        let first_empty = self.nb_in_clique.iter().position(|nb| *nb == 0)
            .expect("value_for_moving_to_empty: no empty clique slot");
        (Some(first_empty), -self.weight_to_clique[origin][vertex])
    }
}

/// worsening moves pass with probability exp(change / temperature)
fn accept_worsening_move(change:Weight, temperature:f64) -> bool {
    let probability = (change as f64 / temperature).exp();
    rng::rand_unit() < probability
}

/// non-empty cliques first; returns the reordered partition and the number
/// of non-empty cliques
fn sort_non_empty_first(partition:&[Vec<VertexId>]) -> (Partition, usize) {
    let (mut sorted, empty):(Partition, Partition) =
        partition.iter().cloned().partition(|c| !c.is_empty());
    let nb_cliques = sorted.len();
    sorted.extend(empty);
    (sorted, nb_cliques)
}

/** runs the annealing kernel from `initial_partition` and returns the best
partition seen, one slot per vertex. The temperature cools by
`cooldown_factor` after every batch; the search stops after five stagnating
batches in a row or when the temperature collapses. */
pub fn simulated_annealing(inst:Rc<Instance>, initial_partition:&[Vec<VertexId>], params:&SaParams) -> Partition {
    let n = inst.n();
    let (sorted_partition, nb_cliques) = sort_non_empty_first(initial_partition);
    let batch_size = (params.batch_size_scale_factor * nb_cliques as f64 * n as f64)
        .round().max(1.) as usize;
    let mut state = AnnealingState::initialize(inst.clone(), &sorted_partition, nb_cliques);
    let mut temperature = params.initial_temperature;
    let mut current_value = inst.partition_value(&sorted_partition);
    let mut best_labels = state.clique_of.clone();
    let mut best_value = current_value;
    let mut stagnation_counter = 0;
    let mut previous_vertex = 0;
    let start_time = Instant::now();
    while stagnation_counter < 5 {
        let mut nb_transitions = 0;
        for _ in 0..batch_size {
            let (performed, change, moved) = state.step(previous_vertex, temperature);
            previous_vertex = moved;
            if performed {
                current_value += change;
                nb_transitions += 1;
            }
            if current_value > best_value {
                best_labels.copy_from_slice(&state.clique_of);
                best_value = current_value;
            }
        }
        temperature *= params.cooldown_factor;
        let transition_ratio = nb_transitions as f64 / batch_size as f64;
        if transition_ratio < params.minimal_transition_ratio {
            stagnation_counter += 1;
        } else {
            stagnation_counter = 0;
        }
        if temperature < MINIMUM_TEMPERATURE {
            eprintln!("annealing: temperature too low, stopping early");
            break;
        }
    }
    let duration = start_time.elapsed().as_secs_f64();
    if duration > 10. {
        println!("annealing took {:.3} seconds (final temperature {:.6})", duration, temperature);
    }
    partition_from_labels(&best_labels, n)
}

/** picks an initial temperature by bisection on [1,2000]: build a fresh
randomized partition, run a single batch at the candidate temperature and
steer toward a 0.5 acceptance ratio (tolerance 0.05). Bounded to 50 trials
so flat instances cannot cycle forever. */
pub fn calibrate_temperature(inst:Rc<Instance>, batch_size_scale_factor:f64) -> f64 {
    let mut calibration_temperature = 1000.;
    let mut lower_temperature = 1.;
    let mut upper_temperature = 2000.;
    let tolerance = 0.05;
    let desired_transition_ratio = 0.5;
    for _ in 0..50 {
        let partition = greedy_adding_from_empty(&inst, 2);
        let (sorted_partition, nb_cliques) = sort_non_empty_first(&partition);
        let batch_size = (batch_size_scale_factor * nb_cliques as f64 * inst.n() as f64)
            .round().max(1.) as usize;
        let mut state = AnnealingState::initialize(inst.clone(), &sorted_partition, nb_cliques);
        let mut previous_vertex = 0;
        let mut nb_transitions = 0;
        for _ in 0..batch_size {
            let (performed, _, moved) = state.step(previous_vertex, calibration_temperature);
            previous_vertex = moved;
            if performed {
                nb_transitions += 1;
            }
        }
        let transition_ratio = nb_transitions as f64 / batch_size as f64;
        if transition_ratio > desired_transition_ratio + tolerance {
            upper_temperature = calibration_temperature;
            calibration_temperature = (calibration_temperature + lower_temperature) / 2.;
        } else if transition_ratio < desired_transition_ratio - tolerance {
            lower_temperature = calibration_temperature;
            calibration_temperature = (calibration_temperature + upper_temperature) / 2.;
        } else {
            break;
        }
    }
    calibration_temperature
}


#[cfg(test)]
mod tests {
    use super::*;

    use crate::instance::checker;
    use crate::rng::set_seed;
    use crate::search::greedy_moving::greedy_moving;

    fn singletons(n:usize) -> Partition {
        (0..n).map(|v| vec![v]).collect()
    }

    #[test]
    fn test_value_never_degrades() {
        set_seed(5);
        let inst = Rc::new(Instance::from_file("insts/tiny/planted6.txt"));
        let initial = singletons(6);
        let initial_value = inst.partition_value(&initial);
        let result = simulated_annealing(inst.clone(), &initial, &SaParams::default());
        let value = checker(&inst, &result).expect("annealing returned an invalid partition");
        assert!(value >= initial_value);
    }

    #[test]
    fn test_positive_pair_merged() {
        set_seed(1);
        let inst = Rc::new(Instance::from_file("insts/tiny/pair_pos.txt"));
        let result = simulated_annealing(inst.clone(), &singletons(2), &SaParams::default());
        assert_eq!(checker(&inst, &result), Some(5));
    }

    #[test]
    fn test_negative_pair_stays_apart() {
        set_seed(1);
        let inst = Rc::new(Instance::from_file("insts/tiny/pair_neg.txt"));
        let result = simulated_annealing(inst.clone(), &vec![vec![0,1], vec![]], &SaParams::default());
        assert_eq!(checker(&inst, &result), Some(0));
    }

    #[test]
    fn test_planted_triangles_found() {
        set_seed(9);
        let inst = Rc::new(Instance::from_file("insts/tiny/planted6.txt"));
        let start = greedy_moving(&inst, singletons(6));
        let result = simulated_annealing(inst.clone(), &start, &SaParams::default());
        assert_eq!(checker(&inst, &result), Some(18));
    }

    #[test]
    fn test_deterministic_under_fixed_seed() {
        let inst = Rc::new(Instance::from_file("insts/tiny/planted6.txt"));
        set_seed(123);
        let first = simulated_annealing(inst.clone(), &singletons(6), &SaParams::default());
        set_seed(123);
        let second = simulated_annealing(inst.clone(), &singletons(6), &SaParams::default());
        assert_eq!(clique_labels(&first, 6), clique_labels(&second, 6));
    }

    #[test]
    fn test_all_zero_weights_terminate() {
        // every move is a zero-gain transition: the kernel exits through the
        // collapsed-temperature path and still returns a valid partition
        set_seed(2);
        let inst = Rc::new(Instance::from_file("insts/tiny/zeros4.txt"));
        let result = simulated_annealing(inst.clone(), &singletons(4), &SaParams::default());
        assert_eq!(checker(&inst, &result), Some(0));
    }

    #[test]
    fn test_single_vertex() {
        set_seed(2);
        let inst = Rc::new(Instance::from_file("insts/tiny/k1.txt"));
        let result = simulated_annealing(inst.clone(), &vec![vec![0]], &SaParams::default());
        assert_eq!(checker(&inst, &result), Some(0));
    }

    #[test]
    fn test_calibrated_temperature_within_bounds() {
        set_seed(4);
        let inst = Rc::new(Instance::from_file("insts/tiny/planted6.txt"));
        let temperature = calibrate_temperature(inst, 8.);
        assert!((1. ..=2000.).contains(&temperature));
    }
}
