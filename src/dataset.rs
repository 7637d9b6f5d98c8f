//! End-to-end dataset generation.
//!
//! Wires the whole pipeline together: random topology → sequence evolution →
//! pairwise log-likelihood matrix → similarity weights → maximum spanning
//! tree → sparse adjacency, producing categorical node features and a
//! symmetric binary adjacency matrix ready for graph-learning training.

use crate::adjacency::{materialize, SparseAdjacency};
use crate::error::{PhylographError, Result};
use crate::model::JukesCantor;
use crate::mst::WeightedGraph;
use crate::pairwise::log_likelihood_matrix;
use crate::similarity::similarity_matrix;
use crate::simulate::{evolve_sequences, random_topology};

/// Parameters for one synthetic dataset.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DatasetParams {
    /// Number of leaf taxa; the tree has `2 * n_leaves - 1` nodes in total.
    pub n_leaves: usize,
    /// Jukes-Cantor substitution rate.
    pub alpha: f64,
    /// Number of sites per simulated sequence.
    pub seq_length: usize,
    /// Mean branch length of the random topology.
    pub scale: f64,
    /// RNG seed; identical parameters yield bit-identical datasets.
    pub seed: u64,
}

impl Default for DatasetParams {
    fn default() -> Self {
        Self {
            n_leaves: 200,
            alpha: 0.1,
            seq_length: 10,
            scale: 0.1,
            seed: 42,
        }
    }
}

/// A generated dataset: categorical node features plus the spanning-tree
/// adjacency structure.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PhyloDataset {
    /// One encoded sequence (codes `0..=3`) per node; the root/auxiliary
    /// node sits in the last row.
    pub node_features: Vec<Vec<u8>>,
    /// Symmetric binary adjacency of the maximum spanning tree, shaped
    /// `(num_nodes, num_nodes)`. The root row/column is all-zero since the
    /// root index is excluded from spanning-tree construction.
    pub adjacency: SparseAdjacency,
}

/// Generate a synthetic phylogenetic graph dataset.
///
/// A single simulation feeds both the node features and the likelihood
/// pipeline, so the adjacency structure describes exactly the sequences it is
/// returned with. The whole estimation sub-pipeline is deterministic given
/// the simulated sequences; rerunning with the same parameters reproduces the
/// dataset bit for bit.
///
/// # Errors
///
/// Propagates validation errors from every stage, and returns
/// [`PhylographError::ShapeMismatch`] if the feature count and adjacency
/// dimension ever disagree (a hard error here, not a logged warning).
pub fn generate(params: &DatasetParams) -> Result<PhyloDataset> {
    let model = JukesCantor::new(params.alpha)?;
    let tree = random_topology(params.n_leaves, params.scale, params.seed)?;
    let node_features = evolve_sequences(&tree, &model, params.seq_length, params.seed)?;

    let log_likelihoods = log_likelihood_matrix(&node_features, &model)?;
    let weights = similarity_matrix(&log_likelihoods);

    // The last index is the root/auxiliary connector and stays out of the
    // spanning-tree graph.
    let root_index = node_features.len() - 1;
    let graph = WeightedGraph::from_weight_matrix(&weights, Some(root_index))?;
    let tree_edges = graph.maximum_spanning_tree()?;
    let adjacency = materialize(&tree_edges, node_features.len())?;

    check_shapes(&node_features, &adjacency)?;

    Ok(PhyloDataset {
        node_features,
        adjacency,
    })
}

/// Validate that features and adjacency describe the same node set.
fn check_shapes(node_features: &[Vec<u8>], adjacency: &SparseAdjacency) -> Result<()> {
    let (rows, cols) = adjacency.shape();
    if rows != cols {
        return Err(PhylographError::ShapeMismatch {
            what: "adjacency matrix columns".into(),
            expected: rows,
            actual: cols,
        });
    }
    if node_features.len() != rows {
        return Err(PhylographError::ShapeMismatch {
            what: "node feature rows".into(),
            expected: rows,
            actual: node_features.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_params() -> DatasetParams {
        DatasetParams {
            n_leaves: 6,
            alpha: 0.1,
            seq_length: 40,
            scale: 0.1,
            seed: 2024,
        }
    }

    #[test]
    fn default_params_match_reference_defaults() {
        let p = DatasetParams::default();
        assert_eq!(p.n_leaves, 200);
        assert_eq!(p.alpha, 0.1);
    }

    #[test]
    fn generates_consistent_shapes() {
        let params = small_params();
        let ds = generate(&params).unwrap();
        let n_nodes = 2 * params.n_leaves - 1;
        assert_eq!(ds.node_features.len(), n_nodes);
        assert!(ds.node_features.iter().all(|s| s.len() == params.seq_length));
        assert_eq!(ds.adjacency.shape(), (n_nodes, n_nodes));
    }

    #[test]
    fn adjacency_is_spanning_tree_over_non_root_nodes() {
        let params = small_params();
        let ds = generate(&params).unwrap();
        let n_nodes = 2 * params.n_leaves - 1;
        // n_nodes - 1 graph nodes, so n_nodes - 2 tree edges, stored twice.
        assert_eq!(ds.adjacency.nnz(), 2 * (n_nodes - 2));
        assert!(ds.adjacency.is_symmetric());
        // Root row stays isolated.
        assert!(ds.adjacency.row(n_nodes - 1).is_empty());
    }

    #[test]
    fn features_are_valid_codes() {
        let ds = generate(&small_params()).unwrap();
        assert!(ds.node_features.iter().flatten().all(|&c| c < 4));
    }

    #[test]
    fn repeated_runs_are_bit_identical() {
        let params = small_params();
        let a = generate(&params).unwrap();
        let b = generate(&params).unwrap();
        assert_eq!(a.node_features, b.node_features);
        assert_eq!(a.adjacency.csr(), b.adjacency.csr());
    }

    #[test]
    fn identical_pair_dominates_divergent_pair() {
        // Hand-built pipeline on AAAA / AAAA / TTTT: the identical pair must
        // outscore the maximally divergent one and end up joined in the tree.
        let model = JukesCantor::new(0.1).unwrap();
        let seqs = vec![vec![0u8, 0, 0, 0], vec![0, 0, 0, 0], vec![3, 3, 3, 3]];

        let ll = log_likelihood_matrix(&seqs, &model).unwrap();
        assert!(
            ll[0][1] > ll[0][2],
            "identical pair {} must beat divergent pair {}",
            ll[0][1],
            ll[0][2]
        );

        let weights = similarity_matrix(&ll);
        let graph = WeightedGraph::from_weight_matrix(&weights, None).unwrap();
        let mst = graph.maximum_spanning_tree().unwrap();
        assert_eq!(mst.len(), 2);
        assert!(mst.iter().any(|e| (e.a, e.b) == (0, 1)));
    }

    #[test]
    fn invalid_alpha_is_rejected() {
        let params = DatasetParams {
            alpha: -1.0,
            ..small_params()
        };
        assert!(generate(&params).is_err());
    }

    #[test]
    fn check_shapes_flags_disagreement() {
        let ds = generate(&small_params()).unwrap();
        let mut features = ds.node_features.clone();
        features.pop();
        let err = check_shapes(&features, &ds.adjacency).unwrap_err();
        assert!(matches!(err, PhylographError::ShapeMismatch { .. }));
    }
}
