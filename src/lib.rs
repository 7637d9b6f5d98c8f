//! Synthetic phylogenetic-tree graph datasets for graph-learning experiments.
//!
//! Given a number of leaf taxa, `phylograph` simulates nucleotide sequences
//! evolving under a Jukes-Cantor substitution model along a random topology,
//! estimates a pairwise similarity structure by maximum-likelihood branch
//! lengths, extracts a maximum-weight spanning tree from it, and emits a
//! sparse unweighted adjacency matrix plus categorical node features.
//!
//! - **Substitution models** — [`model::JukesCantor`] behind the
//!   [`model::SubstitutionModel`] capability trait
//! - **Pairwise estimation** — per-pair branch-length optimization and an
//!   N×N log-likelihood matrix ([`pairwise`])
//! - **Similarity weights** — elementwise exponentiation ([`similarity`])
//! - **Spanning tree** — Kruskal maximum-weight extraction with an explicit
//!   root/auxiliary exclusion ([`mst`])
//! - **Adjacency** — symmetric binary CSR materialization ([`adjacency`])
//! - **Simulation** — random topologies and sequence evolution
//!   ([`tree`], [`simulate`])
//!
//! The pairwise stage is embarrassingly parallel across unique pairs; enable
//! the `parallel` feature to distribute it over a rayon worker pool.
//!
//! # Example
//!
//! ```
//! use phylograph::dataset::{generate, DatasetParams};
//!
//! let params = DatasetParams {
//!     n_leaves: 5,
//!     seq_length: 30,
//!     ..DatasetParams::default()
//! };
//! let ds = generate(&params).unwrap();
//! assert_eq!(ds.node_features.len(), 9); // 2 * 5 - 1 nodes
//! assert!(ds.adjacency.is_symmetric());
//! ```

pub mod adjacency;
pub mod dataset;
pub mod encoding;
pub mod error;
pub mod model;
pub mod mst;
pub mod pairwise;
pub mod similarity;
pub mod simulate;
pub mod tree;

pub use adjacency::{materialize, SparseAdjacency};
pub use dataset::{generate, DatasetParams, PhyloDataset};
pub use error::{PhylographError, Result};
pub use model::{JukesCantor, SubstitutionCounts, SubstitutionModel};
pub use mst::{Edge, WeightedGraph};
pub use pairwise::{log_likelihood_matrix, pair_log_likelihood};
pub use similarity::similarity_matrix;
