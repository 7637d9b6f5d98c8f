//! Pairwise maximum-likelihood estimation between encoded sequences.
//!
//! For every pair of sequences: count site-wise substitutions, optimize the
//! branch length under the substitution model, and score the pairing by its
//! log-likelihood. The per-pair results are assembled into an N×N matrix
//! whose diagonal is fixed at 0 (no self-comparison).

use crate::error::Result;
use crate::model::{SubstitutionCounts, SubstitutionModel, NUM_STATES};

/// Log-likelihood of observing `b` given `a` under `model` with the branch
/// length optimized for this pair.
///
/// Equivalent to Σ over site-pair classes `(i, j)` of
/// `S[i][j] · ln P(t_opt)[i][j]`. Pure: no state is shared across pairs, and
/// each pair is optimized independently (branch length is pair-specific, not
/// tree-global).
///
/// # Errors
///
/// [`PhylographError::LengthMismatch`] or [`PhylographError::InvalidSymbol`]
/// from the counting step.
pub fn pair_log_likelihood<M: SubstitutionModel + ?Sized>(
    a: &[u8],
    b: &[u8],
    model: &M,
) -> Result<f64> {
    let counts = SubstitutionCounts::from_pair(a, b)?;
    let t_opt = model.optimize_branch_length(&counts);
    let p = model.transition_matrix(t_opt);

    let mut ll = 0.0;
    for i in 0..NUM_STATES {
        for j in 0..NUM_STATES {
            let c = counts.get(i, j);
            if c > 0 {
                ll += c as f64 * p[i][j].ln();
            }
        }
    }
    Ok(ll)
}

/// Build the N×N pairwise log-likelihood matrix for encoded sequences.
///
/// The matrix is computed as a batch over the unique-pair index set and
/// mirrored: the counting process applied in both directions yields the
/// transposed count matrix, and the symmetric models in scope score both
/// identically. The diagonal is 0.
///
/// With the `parallel` feature the unique pairs are distributed across a
/// rayon worker pool; results land in disjoint matrix cells, so no ordering
/// guarantee is needed.
///
/// Fewer than two sequences leave no pairs to score; the result is the
/// trivial all-zero matrix of the matching dimension.
///
/// # Errors
///
/// Fails on the first pair whose sequences differ in length or carry invalid
/// symbols; no pair-level recovery exists.
pub fn log_likelihood_matrix<M: SubstitutionModel + Sync + ?Sized>(
    sequences: &[Vec<u8>],
    model: &M,
) -> Result<Vec<Vec<f64>>> {
    let n = sequences.len();
    let pairs: Vec<(usize, usize)> = (0..n)
        .flat_map(|i| ((i + 1)..n).map(move |j| (i, j)))
        .collect();

    #[cfg(feature = "parallel")]
    let scores = {
        use rayon::prelude::*;
        pairs
            .par_iter()
            .map(|&(i, j)| pair_log_likelihood(&sequences[i], &sequences[j], model))
            .collect::<Result<Vec<f64>>>()?
    };

    #[cfg(not(feature = "parallel"))]
    let scores = pairs
        .iter()
        .map(|&(i, j)| pair_log_likelihood(&sequences[i], &sequences[j], model))
        .collect::<Result<Vec<f64>>>()?;

    let mut matrix = vec![vec![0.0; n]; n];
    for (&(i, j), &ll) in pairs.iter().zip(&scores) {
        matrix[i][j] = ll;
        matrix[j][i] = ll;
    }
    Ok(matrix)
}
