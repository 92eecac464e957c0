use std::rc::Rc;

use crate::instance::Instance;
use crate::solution::Solution;
use crate::search::annealing::{simulated_annealing, SaParams};
use crate::search::greedy_adding::greedy_adding_from_empty;
use crate::search::greedy_moving::greedy_moving;

/** builds a population of local optima: each iteration chains the
randomized greedy constructor, the steepest-ascent local search and the
annealing kernel. Returns the best record and the deduplicated population
(two runs reaching the same partition are stored once). */
pub fn grasp(inst:Rc<Instance>,
             nb_iterations:usize,
             rcl_length:usize,
             params:&SaParams) -> (Solution, Vec<Solution>) {
    let mut solutions:Vec<Solution> = Vec::new();
    for _ in 0..nb_iterations {
        let partition = greedy_adding_from_empty(&inst, rcl_length);
        let partition = greedy_moving(&inst, partition);
        let partition = simulated_annealing(inst.clone(), &partition, params);
        let solution = Solution::new(partition, &inst);
        if !solutions.contains(&solution) {
            solutions.push(solution);
        }
    }
    let best = solutions.iter()
        .max_by(|a,b| a.value.cmp(&b.value))
        .cloned().unwrap_or_default();
    (best, solutions)
}


#[cfg(test)]
mod tests {
    use super::*;

    use crate::instance::checker;
    use crate::rng::set_seed;

    #[test]
    fn test_population_is_unique_and_feasible() {
        set_seed(17);
        let inst = Rc::new(Instance::from_file("insts/tiny/planted6.txt"));
        let (best, solutions) = grasp(inst.clone(), 10, 2, &SaParams::default());
        assert!(!solutions.is_empty());
        for (i,solution) in solutions.iter().enumerate() {
            assert_eq!(checker(&inst, &solution.partition), Some(solution.value));
            for other in solutions.iter().skip(i+1) {
                assert_ne!(solution, other);
            }
        }
        assert!(solutions.iter().all(|s| s.value <= best.value));
    }

    #[test]
    fn test_finds_planted_triangles() {
        set_seed(8);
        let inst = Rc::new(Instance::from_file("insts/tiny/planted6.txt"));
        let (best, _) = grasp(inst.clone(), 5, 2, &SaParams::default());
        assert_eq!(best.value, 18);
    }
}
