//! Structured error types for the phylograph pipeline.

use thiserror::Error;

/// Unified error type for all phylograph operations.
#[derive(Debug, Error)]
pub enum PhylographError {
    /// Two sequences being compared differ in length.
    #[error("sequence length mismatch: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    /// A sequence contains a code outside the nucleotide alphabet {0..3}.
    #[error("invalid symbol code {code} at position {position} (expected 0..=3)")]
    InvalidSymbol { position: usize, code: u8 },

    /// The similarity graph admits no spanning tree. Weights come from a
    /// complete graph, so this is unexpected and fatal rather than recoverable.
    #[error("graph with {n_nodes} nodes and {n_edges} edges is disconnected: no spanning tree")]
    DisconnectedGraph { n_nodes: usize, n_edges: usize },

    /// Node-feature count and adjacency dimension disagree, or an adjacency
    /// matrix is not square.
    #[error("{what} shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch {
        what: String,
        expected: usize,
        actual: usize,
    },

    /// Invalid input (bad arguments, out-of-range values).
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Convenience alias used throughout phylograph.
pub type Result<T> = std::result::Result<T, PhylographError>;
