//! Random topology generation and sequence evolution.
//!
//! Produces the synthetic inputs of the estimation pipeline: a random rooted
//! binary tree over `n_leaves` taxa (2·n_leaves − 1 nodes) and one encoded
//! nucleotide sequence per node, evolved under a substitution model. The
//! root always occupies the last node index, matching the root/auxiliary
//! convention the spanning-tree stage excludes.

use crate::error::{PhylographError, Result};
use crate::model::SubstitutionModel;
use crate::tree::{Node, Tree};

/// Simple xorshift64 pseudo-random number generator.
pub(crate) struct Xorshift64 {
    state: u64,
}

impl Xorshift64 {
    pub(crate) fn new(seed: u64) -> Self {
        // Xorshift requires nonzero state.
        Self {
            state: if seed == 0 { 1 } else { seed },
        }
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    pub(crate) fn next_f64(&mut self) -> f64 {
        self.next_u64() as f64 / u64::MAX as f64
    }

    fn next_below(&mut self, n: usize) -> usize {
        (self.next_u64() % n as u64) as usize
    }
}

/// Sample a state from a cumulative distribution given a uniform draw `u`.
fn sample_state(cumulative: &[f64], u: f64) -> usize {
    for (i, &c) in cumulative.iter().enumerate() {
        if u <= c {
            return i;
        }
    }
    // Floating-point edge case: fall back to the last state.
    cumulative.len() - 1
}

/// Build a cumulative distribution from a probability row.
fn cumulative_from_row(row: &[f64]) -> Vec<f64> {
    let mut cum = Vec::with_capacity(row.len());
    let mut acc = 0.0;
    for &p in row {
        acc += p;
        cum.push(acc);
    }
    // Pin the last entry to 1.0 against rounding drift.
    if let Some(last) = cum.last_mut() {
        *last = 1.0;
    }
    cum
}

/// Generate a random rooted binary topology over `n_leaves` taxa.
///
/// Leaves occupy ids `0..n_leaves`; internal nodes are appended as random
/// pairs of active lineages coalesce, so the final merge — the root — lands
/// at id `2·n_leaves − 2`, the last index. Branch lengths are drawn from an
/// exponential with mean `scale`.
///
/// # Errors
///
/// Returns an error if `n_leaves < 2` or `scale` is not positive and finite.
pub fn random_topology(n_leaves: usize, scale: f64, seed: u64) -> Result<Tree> {
    if n_leaves < 2 {
        return Err(PhylographError::InvalidInput(format!(
            "n_leaves must be >= 2, got {}",
            n_leaves
        )));
    }
    if !scale.is_finite() || scale <= 0.0 {
        return Err(PhylographError::InvalidInput(format!(
            "scale must be finite and positive, got {}",
            scale
        )));
    }

    let mut rng = Xorshift64::new(seed);
    let mut nodes: Vec<Node> = (0..n_leaves)
        .map(|id| Node {
            id,
            parent: None,
            children: Vec::new(),
            branch_length: None,
        })
        .collect();
    let mut active: Vec<usize> = (0..n_leaves).collect();

    while active.len() > 1 {
        let i = rng.next_below(active.len());
        let a = active.swap_remove(i);
        let j = rng.next_below(active.len());
        let b = active.swap_remove(j);

        let parent_id = nodes.len();
        nodes.push(Node {
            id: parent_id,
            parent: None,
            children: vec![a, b],
            branch_length: None,
        });
        for &child in &[a, b] {
            nodes[child].parent = Some(parent_id);
            // Exponential draw: -scale * ln(u), u in (0, 1].
            let u = rng.next_f64().max(f64::MIN_POSITIVE);
            nodes[child].branch_length = Some(-scale * u.ln());
        }
        active.push(parent_id);
    }

    let root = nodes.len() - 1;
    Tree::from_nodes(nodes, root)
}

/// Evolve one encoded sequence per tree node under `model`.
///
/// The root sequence is drawn from the model's equilibrium frequencies; every
/// other node samples each site from the transition-probability row of its
/// parent's state at that node's branch length. Returns sequences indexed by
/// node id, so the root sequence sits in the last row whenever the tree came
/// from [`random_topology`].
///
/// # Errors
///
/// Returns an error if `seq_length` is zero.
pub fn evolve_sequences(
    tree: &Tree,
    model: &dyn SubstitutionModel,
    seq_length: usize,
    seed: u64,
) -> Result<Vec<Vec<u8>>> {
    if seq_length == 0 {
        return Err(PhylographError::InvalidInput(
            "seq_length must be > 0".into(),
        ));
    }

    let mut rng = Xorshift64::new(seed);
    let n_nodes = tree.node_count();
    let mut node_seqs: Vec<Vec<u8>> = vec![Vec::new(); n_nodes];

    let eq_cum = cumulative_from_row(&model.frequencies());
    node_seqs[tree.root()] = (0..seq_length)
        .map(|_| sample_state(&eq_cum, rng.next_f64()) as u8)
        .collect();

    // Pre-order guarantees the parent's sequence exists when a node is
    // visited.
    for node_id in tree.iter_preorder() {
        let node = tree.get_node(node_id).expect("preorder yields valid ids");
        let parent_id = match node.parent {
            Some(p) => p,
            None => continue,
        };

        let branch_len = node.branch_length.unwrap_or(0.0);
        let p = model.transition_matrix(branch_len);
        let cum_rows: Vec<Vec<f64>> = p.iter().map(|row| cumulative_from_row(row)).collect();

        let parent_seq = node_seqs[parent_id].clone();
        let child_seq: Vec<u8> = parent_seq
            .iter()
            .map(|&state| sample_state(&cum_rows[state as usize], rng.next_f64()) as u8)
            .collect();
        node_seqs[node_id] = child_seq;
    }

    Ok(node_seqs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::JukesCantor;

    #[test]
    fn topology_has_expected_node_count() {
        for n_leaves in [2, 3, 10, 25] {
            let tree = random_topology(n_leaves, 0.1, 42).unwrap();
            assert_eq!(tree.node_count(), 2 * n_leaves - 1);
            assert_eq!(tree.leaves().len(), n_leaves);
        }
    }

    #[test]
    fn root_is_last_index() {
        let tree = random_topology(8, 0.1, 7).unwrap();
        assert_eq!(tree.root(), tree.node_count() - 1);
        assert!(tree.get_node(tree.root()).unwrap().is_root());
    }

    #[test]
    fn branch_lengths_positive_except_root() {
        let tree = random_topology(6, 0.5, 13).unwrap();
        for id in 0..tree.node_count() {
            let node = tree.get_node(id).unwrap();
            if node.is_root() {
                assert!(node.branch_length.is_none());
            } else {
                assert!(node.branch_length.unwrap() > 0.0);
            }
        }
    }

    #[test]
    fn rejects_degenerate_params() {
        assert!(random_topology(1, 0.1, 1).is_err());
        assert!(random_topology(4, 0.0, 1).is_err());
        assert!(random_topology(4, f64::NAN, 1).is_err());
    }

    #[test]
    fn evolved_sequences_cover_all_nodes() {
        let tree = random_topology(5, 0.1, 3).unwrap();
        let model = JukesCantor::new(0.1).unwrap();
        let seqs = evolve_sequences(&tree, &model, 30, 9).unwrap();
        assert_eq!(seqs.len(), tree.node_count());
        assert!(seqs.iter().all(|s| s.len() == 30));
        assert!(seqs.iter().flatten().all(|&c| c < 4));
    }

    #[test]
    fn evolution_rejects_zero_length() {
        let tree = random_topology(3, 0.1, 3).unwrap();
        let model = JukesCantor::new(0.1).unwrap();
        assert!(evolve_sequences(&tree, &model, 0, 9).is_err());
    }

    #[test]
    fn same_seed_reproduces() {
        let model = JukesCantor::new(0.1).unwrap();
        let t1 = random_topology(6, 0.1, 77).unwrap();
        let t2 = random_topology(6, 0.1, 77).unwrap();
        let s1 = evolve_sequences(&t1, &model, 20, 5).unwrap();
        let s2 = evolve_sequences(&t2, &model, 20, 5).unwrap();
        assert_eq!(s1, s2);
    }

    #[test]
    fn short_branches_keep_sequences_close() {
        // With tiny branch lengths almost no substitutions happen, so every
        // node's sequence should nearly match the root's.
        let tree = random_topology(4, 1e-8, 19).unwrap();
        let model = JukesCantor::new(0.1).unwrap();
        let seqs = evolve_sequences(&tree, &model, 200, 23).unwrap();
        let root = &seqs[tree.root()];
        for (id, seq) in seqs.iter().enumerate() {
            let diffs = seq.iter().zip(root).filter(|(a, b)| a != b).count();
            assert!(diffs < 5, "node {} differs from root at {} sites", id, diffs);
        }
    }
}
