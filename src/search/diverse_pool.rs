use std::fs::File;
use std::io::Write;
use std::rc::Rc;
use std::time::Instant;

use dogs::search_algorithm::StoppingCriterion;

use crate::distances::{upper_distance_matrix, Metric};
use crate::instance::{Instance, Partition};
use crate::solution::Solution;
use crate::search::annealing::{simulated_annealing, SaParams};
use crate::search::grasp::grasp;
use crate::search::pool::SolutionPool;

/// near-duplicate threshold applied to the GRASP population before seeding
const SEED_FILTER_THRESHOLD: f64 = 0.01;

/// similarity threshold of the maintained pool
const POOL_SIMILARITY_THRESHOLD: f64 = 0.02;

/** Diverse Pool Search parameters */
#[derive(Debug, Clone)]
pub struct DpsConfig {
    /// number of refinement sweeps over the pool
    pub nb_total_iterations: usize,
    /// pool capacity
    pub desired_size: usize,
    /// scales the re-improvement temperature script
    pub improvement_factor: usize,
    /// length of the restricted candidate list of the constructor
    pub rcl_length: usize,
    /// GRASP seeding budget (3 . desired_size when absent)
    pub nb_grasp_iterations: Option<usize>,
}

impl Default for DpsConfig {
    fn default() -> Self {
        Self {
            nb_total_iterations: 10_000,
            desired_size: 10,
            improvement_factor: 3,
            rcl_length: 2,
            nb_grasp_iterations: None,
        }
    }
}

/** Diverse Pool Search: seed a pool of diverse local optima with GRASP,
then sweep it, polishing every member with the annealing kernel and a
re-improvement schedule, inserting the results back under the pool's
similarity discipline. Returns the best partition found. */
pub fn diverse_pool_search<Stopping:StoppingCriterion>(
inst:Rc<Instance>,
config:&DpsConfig,
params:&SaParams,
stopping_criterion:Stopping,
result_log_filename:Option<String>,
) -> Partition {
    let start_time = Instant::now();
    let nb_grasp_iterations = config.nb_grasp_iterations
        .unwrap_or(3 * config.desired_size);
    let (best_seed, seed_solutions) = grasp(
        inst.clone(), nb_grasp_iterations, config.rcl_length, params);
    let seed_solutions = filter_similar_solutions(seed_solutions, SEED_FILTER_THRESHOLD);
    let mut pool = SolutionPool::new(POOL_SIMILARITY_THRESHOLD, config.desired_size);
    pool.initialize(seed_solutions);
    'sweeps: for _ in 0..config.nb_total_iterations {
        for j in 0..config.desired_size.min(pool.count()) {
            if stopping_criterion.is_finished() {
                break 'sweeps;
            }
            // captured before the polish: stamps the progress line
            let elapsed_time = start_time.elapsed().as_secs_f64();
            let partition = pool.get_solution(j).partition.clone();
            let polished = simulated_annealing(inst.clone(), &partition, params);
            let new_solution = Solution::new(polished, &inst);
            if new_solution.value <= pool.get_worst_solution().value {
                continue;
            }
            // also covers the polish coming back unchanged
            if pool.exists_similar_solution_with_higher_value(&new_solution) {
                continue;
            }
            let new_solution = try_improve_solution(
                inst.clone(), new_solution, params, config.improvement_factor);
            pool.try_add_solution(new_solution, elapsed_time);
        }
    }
    log_results(result_log_filename, pool.get_all_solutions());
    if pool.count() == 0 {
        return best_seed.partition;
    }
    pool.get_best_solution().partition.clone()
}

/** re-improvement: re-anneal the solution at temperatures scripted as
initial . cooldown^m, with m running through 2f copies of 48, f copies of 36
and f copies of 24. Any improvement restarts the script from the improved
solution; a full pass without improvement returns. */
fn try_improve_solution(inst:Rc<Instance>,
                        solution:Solution,
                        params:&SaParams,
                        improvement_factor:usize) -> Solution {
    let mut exponents:Vec<f64> = Vec::new();
    exponents.extend(std::iter::repeat(48.).take(2 * improvement_factor));
    exponents.extend(std::iter::repeat(36.).take(improvement_factor));
    exponents.extend(std::iter::repeat(24.).take(improvement_factor));
    let mut improved = solution;
    let mut improving = true;
    while improving {
        improving = false;
        for exponent in &exponents {
            let reheat_params = SaParams {
                initial_temperature: params.initial_temperature
                    * params.cooldown_factor.powf(*exponent),
                ..params.clone()
            };
            let partition = simulated_annealing(inst.clone(), &improved.partition, &reheat_params);
            if inst.partition_value(&partition) > improved.value {
                improved = Solution::new(partition, &inst);
                improving = true;
                break;
            }
        }
    }
    improved
}

/** drops every solution that has a strictly better one within
`similarity_threshold` of it (equal-valued near-duplicates all survive). */
fn filter_similar_solutions(solutions:Vec<Solution>, similarity_threshold:f64) -> Vec<Solution> {
    let labels:Vec<Vec<usize>> = solutions.iter()
        .map(|s| s.clique_of.clone()).collect();
    let mut distances = upper_distance_matrix(&labels, Metric::RandError);
    for i in 0..distances.len() {
        for j in i+1..distances.len() {
            distances[j][i] = distances[i][j];
        }
    }
    solutions.iter().enumerate()
        .filter(|(i,solution)| {
            !solutions.iter().enumerate().any(|(j,other)| {
                *i != j && distances[*i][j] < similarity_threshold && solution.value < other.value
            })
        })
        .map(|(_,solution)| solution.clone())
        .collect()
}

/// writes the final pool values, one per line, in pool order
fn log_results(result_log_filename:Option<String>, solutions:&[Solution]) {
    let filename = match result_log_filename {
        None => return,
        Some(f) => {
            if f.is_empty() { return; }
            f
        }
    };
    match File::create(&filename) {
        Ok(mut file) => {
            for solution in solutions {
                writeln!(file, "{}", solution.value)
                    .unwrap_or_else(|why| panic!("couldn't write: {}", why));
            }
        }
        Err(_) => {
            eprintln!("Unable to open file: {}", filename);
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    use dogs::search_algorithm::TimeStoppingCriterion;

    use crate::instance::checker;
    use crate::rng::set_seed;

    #[test]
    fn test_planted_triangles() {
        set_seed(21);
        let inst = Rc::new(Instance::from_file("insts/tiny/planted6.txt"));
        let config = DpsConfig { nb_total_iterations: 3, ..DpsConfig::default() };
        let best = diverse_pool_search(
            inst.clone(), &config, &SaParams::default(),
            TimeStoppingCriterion::new(30.), None);
        assert_eq!(checker(&inst, &best), Some(18));
    }

    #[test]
    fn test_single_vertex() {
        set_seed(2);
        let inst = Rc::new(Instance::from_file("insts/tiny/k1.txt"));
        let config = DpsConfig { nb_total_iterations: 1, ..DpsConfig::default() };
        let best = diverse_pool_search(
            inst.clone(), &config, &SaParams::default(),
            TimeStoppingCriterion::new(30.), None);
        assert_eq!(checker(&inst, &best), Some(0));
    }

    #[test]
    fn test_filter_similar_solutions() {
        let inst = Instance::from_file("insts/tiny/planted6.txt");
        let strong = Solution::new(vec![vec![0,1,2], vec![3,4,5]], &inst);
        // same partition with one vertex split off: close and weaker
        let weak = Solution::new(vec![vec![0,1,2], vec![3,4], vec![5]], &inst);
        // far from both in Rand distance
        let apart = Solution::new(vec![vec![0,3], vec![1,4], vec![2,5]], &inst);
        let kept = filter_similar_solutions(vec![strong.clone(), weak, apart.clone()], 0.3);
        assert!(kept.contains(&strong));
        assert!(kept.contains(&apart));
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn test_result_log_written() {
        set_seed(33);
        let inst = Rc::new(Instance::from_file("insts/tiny/pair_pos.txt"));
        let config = DpsConfig { nb_total_iterations: 1, ..DpsConfig::default() };
        let log_path = std::env::temp_dir().join("clique_part_dps_test.log");
        let log_path = log_path.to_str().unwrap().to_string();
        diverse_pool_search(
            inst, &config, &SaParams::default(),
            TimeStoppingCriterion::new(30.), Some(log_path.clone()));
        let content = std::fs::read_to_string(&log_path).unwrap();
        assert_eq!(content.lines().next().unwrap().trim(), "5");
        std::fs::remove_file(&log_path).ok();
    }
}
