use crate::instance::{clique_labels, CliqueId, Instance, Partition, VertexId, Weight};

/** deterministic steepest-ascent local search over single-vertex moves.
Repeatedly applies the move with the largest value gain until no move has a
strictly positive gain. The benefit table keeps one column per clique slot
plus a trailing column standing for a fresh empty clique. */
pub fn greedy_moving(inst:&Instance, partition:Partition) -> Partition {
    let n = inst.n();
    let mut current_partition = partition;
    let mut benefits = initialize_moving_table(inst, &current_partition);
    let mut clique_of = clique_labels(&current_partition, n);
    loop {
        let (vertex, new_clique, benefit) = best_move(&benefits);
        if benefit <= 0 {
            break;
        }
        let old_clique = clique_of[vertex];
        // apply the move
        current_partition[old_clique].retain(|u| *u != vertex);
        while current_partition.len() <= new_clique {
            current_partition.push(Vec::new());
        }
        current_partition[new_clique].push(vertex);
        clique_of[vertex] = new_clique;
        update_moving_table(inst, &current_partition, &mut benefits, vertex, old_clique, new_clique);
    }
    current_partition
}

/// benefits[v][k]: value change if v moves to clique slot k (0 for its own
/// clique). Columns past the partition length stand for empty cliques.
fn initialize_moving_table(inst:&Instance, partition:&[Vec<VertexId>]) -> Vec<Vec<Weight>> {
    let n = inst.n();
    let nb_columns = partition.iter().rposition(|c| !c.is_empty()).map_or(0, |i| i+1) + 2;
    let clique_of = clique_labels(partition, n);
    let mut benefits:Vec<Vec<Weight>> = (0..n).map(|_| {
        // appended columns stay amortized O(1) over a run
        let mut row = Vec::with_capacity(nb_columns + n);
        row.resize(nb_columns, 0);
        row
    }).collect();
    for v in 0..n {
        let origin = clique_of[v];
        let mut decrease = 0;
        for u in &partition[origin] {
            if *u != v {
                decrease += inst.weight(v, *u);
            }
        }
        for k in 0..nb_columns {
            if k == origin {
                continue;
            }
            let mut benefit = -decrease;
            if k < partition.len() {
                for u in &partition[k] {
                    benefit += inst.weight(v, *u);
                }
            }
            benefits[v][k] = benefit;
        }
    }
    benefits
}

/// best (vertex, clique, benefit) entry; ties go to the lowest row, then the
/// lowest column
fn best_move(benefits:&[Vec<Weight>]) -> (VertexId, CliqueId, Weight) {
    let mut best = (0, 0, Weight::MIN);
    for (v,row) in benefits.iter().enumerate() {
        for (k,benefit) in row.iter().enumerate() {
            if *benefit > best.2 {
                best = (v, k, *benefit);
            }
        }
    }
    best
}

/** incrementally repairs the benefit table after moving `moved_vertex`.
Expects the partition to already reflect the move. */
fn update_moving_table(inst:&Instance,
                       current_partition:&[Vec<VertexId>],
                       benefits:&mut [Vec<Weight>],
                       moved_vertex:VertexId,
                       old_clique:CliqueId,
                       new_clique:CliqueId) {
    let nb_columns = benefits[0].len();
    // the trailing empty column was consumed: append a fresh one
    if new_clique == nb_columns - 1 {
        for row in benefits.iter_mut() {
            let last = *row.last().unwrap();
            row.push(last);
        }
    }
    // vertices that lost the moved vertex gain its weight on every target
    for u in &current_partition[old_clique] {
        let w = inst.weight(*u, moved_vertex);
        for benefit in benefits[*u].iter_mut() {
            *benefit += w;
        }
    }
    // vertices that now share its clique lose it (the moved vertex's own row
    // is re-based below, its zero self-weight keeps this loop harmless)
    for u in &current_partition[new_clique] {
        let w = inst.weight(*u, moved_vertex);
        for benefit in benefits[*u].iter_mut() {
            *benefit -= w;
        }
    }
    // source and target columns changed for everyone
    for (v,row) in benefits.iter_mut().enumerate() {
        row[old_clique] -= inst.weight(v, moved_vertex);
        row[new_clique] += inst.weight(v, moved_vertex);
    }
    // re-base the moved row so that staying put has zero benefit
    let benefit_of_last_move = benefits[moved_vertex][new_clique];
    for benefit in benefits[moved_vertex].iter_mut() {
        *benefit -= benefit_of_last_move;
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    use crate::instance::checker;

    fn singletons(n:usize) -> Partition {
        (0..n).map(|v| vec![v]).collect()
    }

    #[test]
    fn test_triangle_reaches_optimum() {
        let inst = Instance::from_file("insts/tiny/triangle.txt");
        let partition = greedy_moving(&inst, singletons(3));
        assert_eq!(checker(&inst, &partition), Some(10));
        let clique_with_0 = partition.iter().find(|c| c.contains(&0)).unwrap();
        assert!(clique_with_0.contains(&1));
        assert!(!clique_with_0.contains(&2));
    }

    #[test]
    fn test_idempotent() {
        let inst = Instance::from_file("insts/tiny/planted6.txt");
        let first = greedy_moving(&inst, singletons(6));
        let second = greedy_moving(&inst, first.clone());
        assert_eq!(first, second);
    }

    #[test]
    fn test_all_positive_reaches_grand_clique() {
        let n = 5;
        let weights:Vec<Vec<Weight>> = (0..n).map(|i| {
            (0..n).map(|j| if i == j { 0 } else { 1 }).collect()
        }).collect();
        let inst = Instance::new(weights);
        let partition = greedy_moving(&inst, singletons(n));
        let nb_non_empty = partition.iter().filter(|c| !c.is_empty()).count();
        assert_eq!(nb_non_empty, 1);
        assert_eq!(checker(&inst, &partition), Some(10)); // 5 choose 2 edges
    }

    #[test]
    fn test_all_negative_keeps_singletons() {
        let n = 4;
        let weights:Vec<Vec<Weight>> = (0..n).map(|i| {
            (0..n).map(|j| if i == j { 0 } else { -2 }).collect()
        }).collect();
        let inst = Instance::new(weights);
        let partition = greedy_moving(&inst, singletons(n));
        assert_eq!(partition, singletons(n));
    }

    #[test]
    fn test_planted_triangles() {
        let inst = Instance::from_file("insts/tiny/planted6.txt");
        let partition = greedy_moving(&inst, singletons(6));
        assert_eq!(checker(&inst, &partition), Some(18));
    }
}
