use crate::instance::{clique_labels, CliqueId, Instance, Partition, Weight};

/** a partition together with its cached value and a vertex lookup table.
Built once from a partition and never mutated; improvements create a new
record. */
#[derive(Debug, Clone, Default)]
pub struct Solution {
    /// the partition itself
    pub partition: Partition,
    /// cached objective value of the partition
    pub value: Weight,
    /// clique_of[v]: clique slot of the partition containing v
    pub clique_of: Vec<CliqueId>,
}

impl Solution {
    /** builds a record from a partition, computing its value and lookup table */
    pub fn new(partition:Partition, inst:&Instance) -> Self {
        let value = inst.partition_value(&partition);
        let clique_of = clique_labels(&partition, inst.n());
        Self { partition, value, clique_of }
    }
}

/** equality is semantic: two records are equal iff every vertex pair shares
a clique in one iff it shares a clique in the other (clique ordering and
empty slots do not matter). */
impl PartialEq for Solution {
    fn eq(&self, other:&Self) -> bool {
        if self.value != other.value {
            return false;
        }
        // same number of non-empty cliques, and each clique of self lands
        // inside a single clique of other: the partitions coincide
        let nb_cliques = self.partition.iter().filter(|c| !c.is_empty()).count();
        let nb_cliques_other = other.partition.iter().filter(|c| !c.is_empty()).count();
        if nb_cliques != nb_cliques_other {
            return false;
        }
        for clique in &self.partition {
            if clique.is_empty() {
                continue;
            }
            let expected = other.clique_of[clique[0]];
            if clique.iter().any(|v| other.clique_of[*v] != expected) {
                return false;
            }
        }
        true
    }
}
