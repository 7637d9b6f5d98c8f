//! Continuous-time Markov substitution models.
//!
//! Provides the [`SubstitutionModel`] capability interface (transition
//! probabilities plus maximum-likelihood branch-length estimation) and the
//! Jukes-Cantor concrete model. Only one model exists in scope, but the trait
//! keeps the estimator and spanning-tree stages model-agnostic.

use crate::error::{PhylographError, Result};

/// Number of nucleotide states in DNA models.
pub const NUM_STATES: usize = 4;

/// Upper search bound for the scaled variable `alpha * t`. The JC maximum
/// sits at `alpha * t = -ln(1 - 4p/3) / 4`, which depends only on the
/// observed mismatch fraction `p`, so bounding the scaled variable keeps the
/// search range rate-independent; the transition matrix is numerically at
/// its uniform limit far below this point.
const SCALED_T_MAX: f64 = 1.0e3;

/// Golden-section iterations; enough to shrink [0, SCALED_T_MAX] below 1e-10.
const GOLDEN_ITERS: usize = 120;

/// Observed substitution counts between two aligned, encoded sequences.
///
/// `counts[i][j]` is the number of sites where the reference sequence carries
/// state `i` and the compared sequence state `j`. Built per pair, never
/// persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SubstitutionCounts {
    counts: [[u64; NUM_STATES]; NUM_STATES],
}

impl SubstitutionCounts {
    /// Count site-wise state pairs between two encoded sequences.
    ///
    /// # Errors
    ///
    /// [`PhylographError::LengthMismatch`] if the sequences differ in length,
    /// [`PhylographError::InvalidSymbol`] if either sequence carries a code
    /// outside `0..=3`. Symbol validity is normally enforced at encoding;
    /// the check here guards direct callers.
    pub fn from_pair(a: &[u8], b: &[u8]) -> Result<Self> {
        if a.len() != b.len() {
            return Err(PhylographError::LengthMismatch {
                expected: a.len(),
                actual: b.len(),
            });
        }
        let mut counts = [[0u64; NUM_STATES]; NUM_STATES];
        for (site, (&x, &y)) in a.iter().zip(b).enumerate() {
            if x as usize >= NUM_STATES {
                return Err(PhylographError::InvalidSymbol {
                    position: site,
                    code: x,
                });
            }
            if y as usize >= NUM_STATES {
                return Err(PhylographError::InvalidSymbol {
                    position: site,
                    code: y,
                });
            }
            counts[x as usize][y as usize] += 1;
        }
        Ok(Self { counts })
    }

    /// Count at `(i, j)`.
    pub fn get(&self, i: usize, j: usize) -> u64 {
        self.counts[i][j]
    }

    /// Total number of counted sites.
    pub fn total(&self) -> u64 {
        self.counts.iter().flatten().sum()
    }

    /// Number of sites where the two sequences disagree.
    pub fn off_diagonal(&self) -> u64 {
        let mut sum = 0;
        for i in 0..NUM_STATES {
            for j in 0..NUM_STATES {
                if i != j {
                    sum += self.counts[i][j];
                }
            }
        }
        sum
    }
}

/// Substitution model over the 4-letter nucleotide alphabet.
///
/// Implementors provide transition probabilities for a branch length and a
/// maximum-likelihood branch-length estimate for observed counts.
pub trait SubstitutionModel {
    /// Number of character states (4 for DNA).
    fn n_states(&self) -> usize {
        NUM_STATES
    }

    /// Equilibrium frequencies, one per state.
    fn frequencies(&self) -> [f64; NUM_STATES];

    /// Transition probability matrix P(t) for branch length `t >= 0`.
    /// Every row sums to 1.
    fn transition_matrix(&self, t: f64) -> [[f64; NUM_STATES]; NUM_STATES];

    /// Branch length `t >= 0` maximizing the multinomial log-likelihood of
    /// `counts` under P(t).
    ///
    /// Degenerate inputs (no counted sites) yield the default 0.
    fn optimize_branch_length(&self, counts: &SubstitutionCounts) -> f64;
}

/// Jukes-Cantor (JC69) model with an explicit rate parameter `alpha`.
///
/// Under JC the probability of observing state `j` at time `t` given state
/// `i` at time 0 is
///
/// - P(same) = 1/4 + 3/4 · e^(−4αt)
/// - P(diff) = 1/4 − 1/4 · e^(−4αt)
///
/// so P(0) is the identity and P(t) tends to the uniform 1/4 matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct JukesCantor {
    alpha: f64,
}

impl JukesCantor {
    /// Create a model with substitution rate `alpha`.
    ///
    /// # Errors
    ///
    /// Returns an error if `alpha` is not finite and positive.
    pub fn new(alpha: f64) -> Result<Self> {
        if !alpha.is_finite() || alpha <= 0.0 {
            return Err(PhylographError::InvalidInput(format!(
                "alpha must be finite and positive, got {}",
                alpha
            )));
        }
        Ok(Self { alpha })
    }

    /// The substitution rate.
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Multinomial count log-likelihood at branch length `t`.
    ///
    /// Zero-count cells contribute nothing, so the `0 · ln 0` case at `t = 0`
    /// never produces a NaN.
    fn count_log_likelihood(&self, counts: &SubstitutionCounts, t: f64) -> f64 {
        let p = self.transition_matrix(t);
        let mut ll = 0.0;
        for i in 0..NUM_STATES {
            for j in 0..NUM_STATES {
                let c = counts.get(i, j);
                if c > 0 {
                    ll += c as f64 * p[i][j].ln();
                }
            }
        }
        ll
    }
}

impl SubstitutionModel for JukesCantor {
    fn frequencies(&self) -> [f64; NUM_STATES] {
        [0.25; NUM_STATES]
    }

    fn transition_matrix(&self, t: f64) -> [[f64; NUM_STATES]; NUM_STATES] {
        let e = (-4.0 * self.alpha * t).exp();
        let p_same = 0.25 + 0.75 * e;
        let p_diff = 0.25 - 0.25 * e;

        [
            [p_same, p_diff, p_diff, p_diff],
            [p_diff, p_same, p_diff, p_diff],
            [p_diff, p_diff, p_same, p_diff],
            [p_diff, p_diff, p_diff, p_same],
        ]
    }

    fn optimize_branch_length(&self, counts: &SubstitutionCounts) -> f64 {
        if counts.total() == 0 {
            // No sites: the optimum is undefined; fall back to zero.
            return 0.0;
        }
        if counts.off_diagonal() == 0 {
            // All mass on the diagonal: the likelihood is maximized at t = 0,
            // where P(same) = 1.
            return 0.0;
        }

        // Golden-section search over the scaled variable u = alpha * t. The
        // JC count likelihood is unimodal in t for valid counts, so a bounded
        // line search converges to the maximum. Ties must shrink toward zero:
        // deep in the saturated region e^(-4u) underflows and the likelihood
        // plateaus, so equal probes mean the optimum lies at or left of the
        // lower probe.
        let eval = |u: f64| self.count_log_likelihood(counts, u / self.alpha);
        let inv_phi = 0.5 * (5.0_f64.sqrt() - 1.0);
        let mut lo = 0.0;
        let mut hi = SCALED_T_MAX;
        let mut a = hi - inv_phi * (hi - lo);
        let mut b = lo + inv_phi * (hi - lo);
        let mut fa = eval(a);
        let mut fb = eval(b);

        for _ in 0..GOLDEN_ITERS {
            if fa >= fb {
                hi = b;
                b = a;
                fb = fa;
                a = hi - inv_phi * (hi - lo);
                fa = eval(a);
            } else {
                lo = a;
                a = b;
                fa = fb;
                b = lo + inv_phi * (hi - lo);
                fb = eval(b);
            }
        }

        let u = 0.5 * (lo + hi);
        (u / self.alpha).max(0.0)
    }
}
