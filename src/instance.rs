use std::fs;

use bit_set::BitSet;

use crate::cpn::read_from_file;

/** Vertex Id */
pub type VertexId = usize;

/** Clique slot Id */
pub type CliqueId = usize;

/** signed edge weight (also used for partition values) */
pub type Weight = i64;

/** Solution of a clique partitioning problem
(represented as a partition: one entry per clique slot, empty slots allowed).
*/
pub type Partition = Vec<Vec<VertexId>>;

/** models a Clique Partitioning instance: a complete graph over n vertices
whose edges carry signed weights. */
#[derive(Debug)]
pub struct Instance {
    /// nb vertices
    n: usize,
    /// weights[u][v]: weight of the edge (u,v). Symmetric, zero diagonal
    weights: Vec<Vec<Weight>>,
}


impl Instance {

    /// number of vertices
    pub fn n(&self) -> usize { self.n }

    /// weight of the edge (u,v)
    pub fn weight(&self, u:VertexId, v:VertexId) -> Weight {
        self.weights[u][v]
    }

    /// weights of all edges incident to v, indexed by the other endpoint
    pub fn weights_from(&self, v:VertexId) -> &[Weight] {
        &self.weights[v]
    }

    /** constructor using a symmetric weight matrix */
    pub fn new(weights:Vec<Vec<Weight>>) -> Self {
        let n = weights.len();
        debug_assert!(weights.iter().all(|row| row.len() == n));
        debug_assert!((0..n).all(|i| weights[i][i] == 0));
        debug_assert!((0..n).all(|i| (0..i).all(|j| weights[i][j] == weights[j][i])));
        Self { n, weights }
    }

    /// creates an instance from a CPn file
    pub fn from_file(filename:&str) -> Self {
        Self::new(read_from_file(filename))
    }

    /** value of a partition: sum of the edge weights inside each clique */
    pub fn partition_value(&self, partition:&[Vec<VertexId>]) -> Weight {
        let mut value = 0;
        for clique in partition {
            for (i,u) in clique.iter().enumerate() {
                for v in clique.iter().skip(i+1) {
                    value += self.weights[*u][*v];
                }
            }
        }
        value
    }

    /// print statistics of the instance
    pub fn display_statistics(&self) {
        println!("\t{} \t vertices", self.n());
        let mut nb_positive = 0;
        let mut nb_negative = 0;
        let mut min_weight = Weight::MAX;
        let mut max_weight = Weight::MIN;
        for i in 0..self.n {
            for j in i+1..self.n {
                let w = self.weights[i][j];
                if w > 0 { nb_positive += 1; }
                if w < 0 { nb_negative += 1; }
                if w < min_weight { min_weight = w; }
                if w > max_weight { max_weight = w; }
            }
        }
        println!("\t{} \t positive edges", nb_positive);
        println!("\t{} \t negative edges", nb_negative);
        if self.n > 1 {
            println!("\t{} \t min weight", min_weight);
            println!("\t{} \t max weight", max_weight);
        }
    }

    /** writes a string encoding the solution (use this to export the solution) */
    pub fn solution_to_string(&self, solution:&[Vec<VertexId>]) -> String {
        let mut res = String::default();
        for clique in solution.iter().filter(|c| !c.is_empty()) {
            for v in clique {
                res += format!("{} ", v).as_str();
            }
            res += "\n";
        }
        res
    }

    /** writes a solution into a file. each line corresponds to a clique. */
    pub fn write_solution(&self, filename:&str, solution:&[Vec<VertexId>]) {
        fs::write(filename, self.solution_to_string(solution))
            .unwrap_or_else(|_|
                panic!("write_solution: unable to write the solution in {}", filename)
            );
    }
}


/** builds the label vector of a partition (labels[v]: clique slot containing v) */
pub fn clique_labels(partition:&[Vec<VertexId>], n:usize) -> Vec<CliqueId> {
    let mut labels = vec![usize::MAX ; n];
    for (i,clique) in partition.iter().enumerate() {
        for v in clique {
            labels[*v] = i;
        }
    }
    debug_assert!(labels.iter().all(|l| *l != usize::MAX));
    labels
}

/** rebuilds a partition of length n from a label vector */
pub fn partition_from_labels(labels:&[CliqueId], n:usize) -> Partition {
    let mut partition:Partition = vec![Vec::new() ; n];
    for (v,label) in labels.iter().enumerate() {
        partition[*label].push(v);
    }
    partition
}

/**
returns None if the solution is not a partition of the vertex set
returns the objective if the solution is feasible
*/
pub fn checker(inst:&Instance, sol:&[Vec<VertexId>]) -> Option<Weight> {
    // check that all vertices appear exactly once
    let mut visited = BitSet::new();
    for clique in sol {
        for v in clique {
            if visited.contains(*v) {
                return None;  // already added
            }
            visited.insert(*v);
        }
    }
    if visited.len() != inst.n() {
        return None;
    }
    Some(inst.partition_value(sol))
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_instance() {
        let inst = Instance::from_file("insts/tiny/triangle.txt");
        assert_eq!(inst.n(), 3);
        assert_eq!(inst.weight(0,1), 10);
        assert_eq!(inst.weight(1,0), 10);
        assert_eq!(inst.weight(0,2), -1);
        assert_eq!(inst.weight(1,2), -1);
        assert_eq!(inst.weight(2,2), 0);
    }

    #[test]
    fn test_partition_value() {
        let inst = Instance::from_file("insts/tiny/triangle.txt");
        assert_eq!(inst.partition_value(&[vec![0,1], vec![2]]), 10);
        assert_eq!(inst.partition_value(&[vec![0,1,2]]), 8);
        assert_eq!(inst.partition_value(&[vec![0], vec![1], vec![2]]), 0);
    }

    #[test]
    fn test_checker() {
        let inst = Instance::from_file("insts/tiny/triangle.txt");
        assert_eq!(checker(&inst, &[vec![0,1], vec![2], vec![]]), Some(10));
        assert_eq!(checker(&inst, &[vec![0,1]]), None); // missing vertex
        assert_eq!(checker(&inst, &[vec![0,1], vec![1,2]]), None); // duplicated vertex
    }

    #[test]
    fn test_labels_round_trip() {
        let partition:Partition = vec![vec![1,3], vec![], vec![0,2]];
        let labels = clique_labels(&partition, 4);
        assert_eq!(labels, vec![2,0,2,0]);
        let rebuilt = partition_from_labels(&labels, 4);
        assert_eq!(rebuilt[0], vec![1,3]);
        assert_eq!(rebuilt[2], vec![0,2]);
        assert!(rebuilt[1].is_empty() && rebuilt[3].is_empty());
    }
}
