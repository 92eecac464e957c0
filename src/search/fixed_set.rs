use std::rc::Rc;
use std::time::Instant;

use bit_set::BitSet;
use dogs::search_algorithm::StoppingCriterion;
use ordered_float::OrderedFloat;

use crate::instance::{Instance, Partition, VertexId};
use crate::rng;
use crate::solution::Solution;
use crate::search::annealing::{simulated_annealing, SaParams};
use crate::search::grasp::grasp;
use crate::search::greedy_adding::greedy_adding;
use crate::search::greedy_moving::greedy_moving;

/** Fixed Set Search parameters */
#[derive(Debug, Clone)]
pub struct FssConfig {
    /// total iteration budget (the GRASP seeding counts toward it)
    pub nb_total_iterations: usize,
    /// the base solution is drawn from the m best stored solutions
    pub m: usize,
    /// the consensus subset is drawn from the n best stored solutions
    pub n: usize,
    /// number of solutions scoring the consensus
    pub k: usize,
    /// iterations without a new best before the portion advances
    pub max_stagnation_per_portion: usize,
    /// GRASP seeding budget
    pub nb_grasp_iterations: usize,
    /// length of the restricted candidate list of the constructor
    pub rcl_length: usize,
}

impl Default for FssConfig {
    fn default() -> Self {
        Self {
            nb_total_iterations: 10_000,
            m: 10,
            n: 50,
            k: 10,
            max_stagnation_per_portion: 20,
            nb_grasp_iterations: 10,
            rcl_length: 2,
        }
    }
}

/** Fixed Set Search: keep a population of good solutions, repeatedly fix
the highest-consensus portion of a random elite solution and rebuild the
rest with the GRASP machinery. The fixed portion grows along a schedule and
cycles on stagnation. Returns the best partition found. */
pub fn fixed_set_search<Stopping:StoppingCriterion>(
inst:Rc<Instance>,
config:&FssConfig,
params:&SaParams,
stopping_criterion:Stopping,
) -> Partition {
    let start_time = Instant::now();
    let portions = fixed_portion_schedule(inst.n());
    let mut portion_index = 0;
    let nb_solutions_to_store = config.n.max(config.m);
    let (mut best_solution, mut solutions) = grasp(
        inst.clone(), config.nb_grasp_iterations, config.rcl_length, params);
    let mut stagnation_counter = 0;
    // the population is re-sorted lazily, only after an insertion
    let mut added_solution = true;
    for iteration in config.nb_grasp_iterations..config.nb_total_iterations {
        if stopping_criterion.is_finished() {
            break;
        }
        if solutions.is_empty() {
            break; // nothing to recombine, keep the seed best
        }
        if added_solution {
            solutions.sort_by(|a,b| b.value.cmp(&a.value));
        }
        let nb_solutions = solutions.len();
        let m_restricted = config.m.min(nb_solutions);
        let n_restricted = config.n.min(nb_solutions);
        let k_restricted = config.k.min(nb_solutions);
        // k random solutions among the n best score the consensus
        let mut consensus_solutions:Vec<Solution> = solutions[..n_restricted].to_vec();
        rng::shuffle(&mut consensus_solutions);
        consensus_solutions.truncate(k_restricted);
        // random base among the m best
        let base_solution = &solutions[rng::rand_below(m_restricted)];
        let partial = fixed_partial_solution(
            &base_solution.partition, &consensus_solutions, portions[portion_index]);
        let partition = greedy_adding(&inst, partial, config.rcl_length);
        let partition = greedy_moving(&inst, partition);
        let partition = simulated_annealing(inst.clone(), &partition, params);
        let new_solution = Solution::new(partition, &inst);
        let unique = solutions.iter().all(|s| s != &new_solution);
        let beats_worst = solutions.last().map_or(true, |s| new_solution.value > s.value);
        let population_full = solutions.len() >= nb_solutions_to_store;
        if unique && !population_full {
            solutions.push(new_solution.clone());
            added_solution = true;
        } else if unique && beats_worst {
            solutions.pop();
            solutions.push(new_solution.clone());
            added_solution = true;
        } else {
            added_solution = false;
        }
        if new_solution.value > best_solution.value {
            println!("New best: {}    Iteration: {}    Time: {:.3} seconds.",
                new_solution.value, iteration, start_time.elapsed().as_secs_f64());
            best_solution = new_solution;
            stagnation_counter = 0;
        } else {
            stagnation_counter += 1;
        }
        if stagnation_counter >= config.max_stagnation_per_portion {
            portion_index = (portion_index + 1) % portions.len();
            stagnation_counter = 0;
        }
    }
    best_solution.partition
}

/** portions of fixed vertices: 1 - 2^-i, so each schedule step halves the
number of free vertices. The schedule stops before fewer than ~5 vertices
would remain free; tiny instances fall back to the single portion 1/2. */
fn fixed_portion_schedule(nb_vertices:usize) -> Vec<f64> {
    let max_portion_number = ((nb_vertices as f64 / 5.).log2().floor() as i64).max(1);
    (1..=max_portion_number).map(|i| 1. - 2f64.powi(-(i as i32))).collect()
}

/** keeps the `portion` of the base solution's vertices with the highest
consensus score and removes the rest, producing a partial partition of the
same shape. The score of a vertex counts, over the consensus solutions, how
many members of its base clique stay with it, normalized by the clique
size. */
pub fn fixed_partial_solution(base_solution:&[Vec<VertexId>],
                              consensus_solutions:&[Solution],
                              portion_of_fixed_vertices:f64) -> Partition {
    let mut similarity_scores:Vec<(VertexId, f64)> = Vec::new();
    for clique in base_solution {
        for vertex in clique {
            let mut score = 0.;
            for solution in consensus_solutions {
                let clique_in_solution = solution.clique_of[*vertex];
                score += clique.iter()
                    .filter(|v| solution.clique_of[**v] == clique_in_solution)
                    .count() as f64;
            }
            similarity_scores.push((*vertex, score / clique.len() as f64));
        }
    }
    similarity_scores.sort_by_key(|(_,score)| std::cmp::Reverse(OrderedFloat(*score)));
    let nb_fixed = (portion_of_fixed_vertices * similarity_scores.len() as f64).round() as usize;
    let mut kept = BitSet::new();
    for (vertex,_) in similarity_scores.iter().take(nb_fixed) {
        kept.insert(*vertex);
    }
    base_solution.iter()
        .map(|clique| clique.iter().filter(|v| kept.contains(**v)).cloned().collect())
        .collect()
}


#[cfg(test)]
mod tests {
    use super::*;

    use dogs::search_algorithm::TimeStoppingCriterion;

    use crate::instance::checker;
    use crate::rng::set_seed;

    #[test]
    fn test_portion_schedule() {
        assert_eq!(fixed_portion_schedule(40), vec![0.5, 0.75, 0.875]);
        assert_eq!(fixed_portion_schedule(10), vec![0.5]);
        // too small for the halving schedule: single portion fallback
        assert_eq!(fixed_portion_schedule(6), vec![0.5]);
        assert_eq!(fixed_portion_schedule(1), vec![0.5]);
    }

    #[test]
    fn test_fixed_partial_solution_keeps_shape() {
        let inst = Instance::from_file("insts/tiny/planted6.txt");
        let base:Partition = vec![vec![0,1,2], vec![3,4,5], vec![], vec![], vec![], vec![]];
        let consensus = vec![
            Solution::new(vec![vec![0,1,2], vec![3,4,5], vec![], vec![], vec![], vec![]], &inst),
            Solution::new(vec![vec![0,1], vec![2], vec![3,4,5], vec![], vec![], vec![]], &inst),
        ];
        let partial = fixed_partial_solution(&base, &consensus, 0.5);
        assert_eq!(partial.len(), base.len());
        let nb_kept:usize = partial.iter().map(|c| c.len()).sum();
        assert_eq!(nb_kept, 3);
        // kept vertices stay in their base slot
        for (slot,clique) in partial.iter().enumerate() {
            for v in clique {
                assert!(base[slot].contains(v));
            }
        }
        // the fully consensual triangle outscores the broken one
        assert!(partial[1].len() >= partial[0].len());
    }

    #[test]
    fn test_fixed_partial_solution_full_portion() {
        let inst = Instance::from_file("insts/tiny/planted6.txt");
        let base:Partition = vec![vec![0,1,2], vec![3,4,5]];
        let consensus = vec![
            Solution::new(vec![vec![0,1,2], vec![3,4,5]], &inst),
        ];
        let partial = fixed_partial_solution(&base, &consensus, 1.);
        assert_eq!(partial, base);
    }

    #[test]
    fn test_planted_triangles() {
        set_seed(37);
        let inst = Rc::new(Instance::from_file("insts/tiny/planted6.txt"));
        let config = FssConfig {
            nb_total_iterations: 30,
            nb_grasp_iterations: 5,
            ..FssConfig::default()
        };
        let best = fixed_set_search(
            inst.clone(), &config, &SaParams::default(),
            TimeStoppingCriterion::new(30.));
        assert_eq!(checker(&inst, &best), Some(18));
    }

    #[test]
    fn test_single_vertex() {
        set_seed(2);
        let inst = Rc::new(Instance::from_file("insts/tiny/k1.txt"));
        let config = FssConfig {
            nb_total_iterations: 5,
            nb_grasp_iterations: 2,
            ..FssConfig::default()
        };
        let best = fixed_set_search(
            inst.clone(), &config, &SaParams::default(),
            TimeStoppingCriterion::new(30.));
        assert_eq!(checker(&inst, &best), Some(0));
    }
}
