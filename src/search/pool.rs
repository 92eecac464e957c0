use crate::distances::rand_error;
use crate::solution::Solution;

/** bounded pool of elite solutions, kept sorted by decreasing value and
free of near-duplicates: no two members lie within `similarity_threshold`
of each other in Rand-error distance. */
#[derive(Debug)]
pub struct SolutionPool {
    /// members, sorted by decreasing value
    solutions: Vec<Solution>,
    /// two solutions closer than this Rand-error distance count as similar
    similarity_threshold: f64,
    /// maximum number of members
    max_capacity: usize,
}

impl SolutionPool {

    /// empty pool with the given similarity threshold and capacity
    pub fn new(similarity_threshold:f64, max_capacity:usize) -> Self {
        Self { solutions: Vec::new(), similarity_threshold, max_capacity }
    }

    /** fills the pool with an initial population: sorts it by decreasing
    value and truncates to capacity (the caller pre-filters similar
    solutions). */
    pub fn initialize(&mut self, initial_solutions:Vec<Solution>) {
        self.solutions = initial_solutions;
        self.solutions.sort_by(|a,b| b.value.cmp(&a.value));
        self.solutions.truncate(self.max_capacity);
    }

    /// current number of members
    pub fn count(&self) -> usize { self.solutions.len() }

    /// member at the given rank
    pub fn get_solution(&self, index:usize) -> &Solution { &self.solutions[index] }

    /// best member (the pool must be non-empty)
    pub fn get_best_solution(&self) -> &Solution { &self.solutions[0] }

    /// worst member (the pool must be non-empty)
    pub fn get_worst_solution(&self) -> &Solution { self.solutions.last().unwrap() }

    /// all members in rank order
    pub fn get_all_solutions(&self) -> &[Solution] { &self.solutions }

    fn is_similar(&self, a:&Solution, b:&Solution) -> bool {
        rand_error(&a.clique_of, &b.clique_of) < self.similarity_threshold
    }

    /// rank the candidate would take: first slot holding a strictly lower value
    fn find_insert_position(&self, candidate:&Solution) -> usize {
        self.solutions.iter().position(|s| candidate.value > s.value)
            .unwrap_or(self.solutions.len())
    }

    /// true iff some member is similar to the candidate
    pub fn similar_solution_exists(&self, candidate:&Solution) -> bool {
        self.solutions.iter().any(|s| self.is_similar(candidate, s))
    }

    /// true iff a member ranked above the candidate's insert position is
    /// similar to it
    pub fn exists_similar_solution_with_higher_value(&self, candidate:&Solution) -> bool {
        let insert_position = self.find_insert_position(candidate);
        self.solutions[..insert_position].iter().any(|s| self.is_similar(candidate, s))
    }

    /** inserts the candidate if it deserves a slot: it must rank within
    capacity and must not duplicate a better member. Similar members of
    lower value are evicted. `elapsed_time` only stamps the progress line. */
    pub fn try_add_solution(&mut self, candidate:Solution, elapsed_time:f64) {
        let insert_position = self.find_insert_position(&candidate);
        if insert_position >= self.max_capacity {
            return;
        }
        if self.exists_similar_solution_with_higher_value(&candidate) {
            return;
        }
        if insert_position == 0 {
            println!("New best: {}    Time: {:.3} seconds.", candidate.value, elapsed_time);
        }
        self.solutions.insert(insert_position, candidate);
        // evict similar members of lower value
        let mut i = insert_position + 1;
        while i < self.solutions.len() {
            if self.is_similar(&self.solutions[insert_position], &self.solutions[i]) {
                self.solutions.remove(i);
            } else {
                i += 1;
            }
        }
        self.solutions.truncate(self.max_capacity);
    }
}
