use bit_set::BitSet;

use crate::instance::{Instance, Partition, VertexId, Weight};
use crate::rng;

/** builds a full partition from scratch with the randomized greedy */
pub fn greedy_adding_from_empty(inst:&Instance, rcl_length:usize) -> Partition {
    let initial_partition:Partition = vec![Vec::new() ; inst.n()];
    greedy_adding(inst, initial_partition, rcl_length)
}

/** extends a (possibly partial) partition to a full one: vertices already
placed stay in their clique, every other vertex is inserted one at a time,
choosing uniformly among the `rcl_length` most profitable (vertex, clique)
insertions. The returned partition has one slot per vertex. */
pub fn greedy_adding(inst:&Instance, initial_partition:Partition, rcl_length:usize) -> Partition {
    let n = inst.n();
    let mut placed = BitSet::with_capacity(n);
    for clique in &initial_partition {
        for v in clique {
            placed.insert(*v);
        }
    }
    let mut candidates:Vec<VertexId> = (0..n).filter(|v| !placed.contains(*v)).collect();
    let mut current_partition = initial_partition;
    if current_partition.len() < n {
        current_partition.resize(n, Vec::new());
    }
    let mut benefits = initialize_adding_table(inst, &candidates, &current_partition);
    while !candidates.is_empty() {
        adding_step(inst, &mut candidates, &mut benefits, &mut current_partition, rcl_length);
    }
    current_partition
}

/// benefits[i][k]: sum of the edge weights between candidates[i] and the
/// vertices currently in clique slot k
fn initialize_adding_table(inst:&Instance, candidates:&[VertexId], current_partition:&[Vec<VertexId>]) -> Vec<Vec<Weight>> {
    candidates.iter().map(|candidate| {
        current_partition.iter().map(|clique| {
            clique.iter().map(|u| inst.weight(*candidate, *u)).sum()
        }).collect()
    }).collect()
}

/// places one candidate vertex and maintains the benefit table
fn adding_step(inst:&Instance,
               candidates:&mut Vec<VertexId>,
               benefits:&mut Vec<Vec<Weight>>,
               current_partition:&mut Partition,
               rcl_length:usize) {
    let first_empty_clique = current_partition.iter().position(|c| c.is_empty())
        .expect("adding_step: no empty clique slot left");
    let (vertex_index, clique_index) =
        random_move_from_best_options(benefits, rcl_length, candidates, first_empty_clique);
    let vertex = candidates[vertex_index];
    current_partition[clique_index].push(vertex);
    // the placed vertex now contributes to its clique's column
    for (i,candidate) in candidates.iter().enumerate() {
        benefits[i][clique_index] += inst.weight(*candidate, vertex);
    }
    benefits.remove(vertex_index);
    candidates.remove(vertex_index);
}

/** restricted candidate list selection: seed the list with the first
insertions of the first candidate, then let every (vertex, clique) entry
beating the current list minimum displace it. Clique slots past the first
empty one are redundant and skipped. */
fn random_move_from_best_options(benefits:&[Vec<Weight>],
                                 rcl_length:usize,
                                 candidates:&[VertexId],
                                 first_empty_clique:usize) -> (usize, usize) {
    // entries: (vertex index, clique index, benefit)
    let mut rcl:Vec<(usize,usize,Weight)> = Vec::with_capacity(rcl_length + 1);
    let nb_columns = benefits[0].len();
    for k in 0..rcl_length.min(nb_columns) {
        rcl.push((0, k, benefits[0][k]));
    }
    let mut rcl_minimum = rcl.iter().map(|e| e.2).min().unwrap();
    let last_column = first_empty_clique.min(nb_columns - 1);
    for (i,row) in benefits.iter().enumerate() {
        for (k,benefit) in row.iter().enumerate().take(last_column + 1) {
            if *benefit > rcl_minimum {
                rcl.push((i, k, *benefit));
                let min_position = rcl.iter().enumerate()
                    .min_by_key(|(_,e)| e.2)
                    .map(|(p,_)| p).unwrap();
                rcl.swap_remove(min_position);
                rcl_minimum = rcl.iter().map(|e| e.2).min().unwrap();
            }
        }
    }
    let max_benefit = rcl.iter().map(|e| e.2).max().unwrap();
    if max_benefit == 0 {
        // no strictly improving insertion exists: place a random candidate
        // in its first zero-benefit slot
        let vertex_index = rng::rand_below(candidates.len());
        let clique_index = benefits[vertex_index].iter().position(|b| *b == 0)
            .expect("random_move_from_best_options: no zero-benefit slot");
        return (vertex_index, clique_index);
    }
    let chosen = rcl[rng::rand_below(rcl.len())];
    (chosen.0, chosen.1)
}


#[cfg(test)]
mod tests {
    use super::*;

    use crate::instance::checker;
    use crate::rng::set_seed;

    #[test]
    fn test_covers_all_vertices() {
        set_seed(3);
        let inst = Instance::from_file("insts/tiny/planted6.txt");
        let partition = greedy_adding_from_empty(&inst, 2);
        assert_eq!(partition.len(), 6);
        assert!(checker(&inst, &partition).is_some());
    }

    #[test]
    fn test_positive_pair_merged() {
        set_seed(0);
        let inst = Instance::from_file("insts/tiny/pair_pos.txt");
        let partition = greedy_adding_from_empty(&inst, 2);
        assert_eq!(checker(&inst, &partition), Some(5));
    }

    #[test]
    fn test_single_vertex() {
        set_seed(0);
        let inst = Instance::from_file("insts/tiny/k1.txt");
        let partition = greedy_adding_from_empty(&inst, 2);
        assert_eq!(partition, vec![vec![0]]);
    }

    #[test]
    fn test_keeps_initial_placement() {
        set_seed(11);
        let inst = Instance::from_file("insts/tiny/planted6.txt");
        // vertices 0 and 3 pinned apart, the rest left free
        let mut initial:Partition = vec![Vec::new() ; 6];
        initial[0] = vec![0];
        initial[1] = vec![3];
        let partition = greedy_adding(&inst, initial, 2);
        assert!(checker(&inst, &partition).is_some());
        // pinned vertices stay in their original slot
        assert!(partition[0].contains(&0));
        assert!(partition[1].contains(&3));
        assert!(!partition[0].contains(&3));
    }
}
