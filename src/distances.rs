use std::collections::HashMap;

use crate::instance::CliqueId;

/** distance metrics over two label vectors */
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    /// fraction of vertex pairs on which the two labelings disagree
    RandError,
    /// variation of information (H(X|Y) + H(Y|X))
    VariationOfInformation,
}

/// number of unordered pairs among c elements
fn nb_pairs(c:u64) -> u64 {
    c * c.saturating_sub(1) / 2
}

/// contingency counts of two label vectors: joint and marginal cluster sizes
fn contingency_counts(a:&[CliqueId], b:&[CliqueId])
-> (HashMap<(CliqueId,CliqueId),u64>, HashMap<CliqueId,u64>, HashMap<CliqueId,u64>) {
    let mut joint:HashMap<(CliqueId,CliqueId),u64> = HashMap::new();
    let mut count_a:HashMap<CliqueId,u64> = HashMap::new();
    let mut count_b:HashMap<CliqueId,u64> = HashMap::new();
    for (x,y) in a.iter().zip(b.iter()) {
        *joint.entry((*x,*y)).or_insert(0) += 1;
        *count_a.entry(*x).or_insert(0) += 1;
        *count_b.entry(*y).or_insert(0) += 1;
    }
    (joint, count_a, count_b)
}

/** Rand error between two label vectors: the fraction of vertex pairs that
are together in one partition and apart in the other. 0 iff the partitions
induce the same equivalence relation; always within [0,1]. */
pub fn rand_error(a:&[CliqueId], b:&[CliqueId]) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    let n = a.len() as u64;
    if n < 2 { return 0.; }
    let (joint, count_a, count_b) = contingency_counts(a, b);
    let same_a:u64 = count_a.values().map(|c| nb_pairs(*c)).sum();
    let same_b:u64 = count_b.values().map(|c| nb_pairs(*c)).sum();
    let same_both:u64 = joint.values().map(|c| nb_pairs(*c)).sum();
    // pairs together in exactly one of the two partitions
    let disagreements = same_a + same_b - 2*same_both;
    disagreements as f64 / nb_pairs(n) as f64
}

/** variation of information between two label vectors
(2.H(X,Y) - H(X) - H(Y), natural logarithm). Non-negative, 0 iff the
partitions induce the same equivalence relation. */
pub fn variation_of_information(a:&[CliqueId], b:&[CliqueId]) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    let n = a.len() as f64;
    if a.is_empty() { return 0.; }
    let (joint, count_a, count_b) = contingency_counts(a, b);
    let entropy = |counts:Vec<u64>| -> f64 {
        -counts.iter().map(|c| {
            let p = *c as f64 / n;
            p * p.ln()
        }).sum::<f64>()
    };
    let h_joint = entropy(joint.values().cloned().collect());
    let h_a = entropy(count_a.values().cloned().collect());
    let h_b = entropy(count_b.values().cloned().collect());
    let vi = 2.*h_joint - h_a - h_b;
    vi.max(0.) // guard against negative rounding residue
}

/// distance between two label vectors for the given metric
pub fn distance(metric:Metric, a:&[CliqueId], b:&[CliqueId]) -> f64 {
    match metric {
        Metric::RandError => rand_error(a, b),
        Metric::VariationOfInformation => variation_of_information(a, b),
    }
}

/** fills the upper triangle of the pairwise distance matrix of a list of
label vectors (d[i][j] for i<j, zero elsewhere). Callers needing a symmetric
matrix mirror the upper triangle. */
pub fn upper_distance_matrix(labels:&[Vec<CliqueId>], metric:Metric) -> Vec<Vec<f64>> {
    let k = labels.len();
    let mut distances = vec![vec![0. ; k] ; k];
    for i in 0..k {
        for j in i+1..k {
            distances[i][j] = distance(metric, &labels[i], &labels[j]);
        }
    }
    distances
}
