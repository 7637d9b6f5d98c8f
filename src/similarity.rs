//! Similarity weights from pairwise log-likelihoods.
//!
//! Exponentiates a log-likelihood matrix into a non-negative weight matrix.
//! The transform is monotonic, so ordering weights by magnitude orders pairs
//! by log-likelihood, which is exactly what maximum spanning tree extraction
//! relies on: maximizing weight maximizes likelihood and minimizes the
//! evolutionary distance proxy.

/// Elementwise `exp` of a log-likelihood matrix.
///
/// All resulting weights are non-negative. The diagonal maps to
/// `exp(0) = 1`; downstream graph construction treats it as "no self-loop"
/// by convention rather than as an edge.
pub fn similarity_matrix(log_likelihoods: &[Vec<f64>]) -> Vec<Vec<f64>> {
    log_likelihoods
        .iter()
        .map(|row| row.iter().map(|&ll| ll.exp()).collect())
        .collect()
}
