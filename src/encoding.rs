//! Nucleotide sequence encoding.
//!
//! Maps raw ACGT text to categorical integer codes, with the one-hot tensor
//! form and its argmax reduction used by downstream feature pipelines.

use crate::error::{PhylographError, Result};
use crate::model::NUM_STATES;

/// Nucleotide bytes indexed by state (A=0, C=1, G=2, T=3).
pub const NUCLEOTIDES: [u8; NUM_STATES] = [b'A', b'C', b'G', b'T'];

/// Map a nucleotide byte to its state index (A=0, C=1, G=2, T=3).
///
/// Accepts both upper and lower case. Returns `None` for non-standard bases.
pub fn nucleotide_index(b: u8) -> Option<u8> {
    match b.to_ascii_uppercase() {
        b'A' => Some(0),
        b'C' => Some(1),
        b'G' => Some(2),
        b'T' => Some(3),
        _ => None,
    }
}

/// Encode a raw nucleotide sequence into integer codes `0..=3`.
///
/// # Errors
///
/// [`PhylographError::InvalidSymbol`] at the first byte outside {A, C, G, T}.
/// Validation happens here, at ingestion, so the likelihood loop can assume
/// clean codes.
pub fn encode_sequence(raw: &[u8]) -> Result<Vec<u8>> {
    raw.iter()
        .enumerate()
        .map(|(position, &b)| {
            nucleotide_index(b).ok_or(PhylographError::InvalidSymbol { position, code: b })
        })
        .collect()
}

/// Encode a batch of raw sequences.
pub fn encode_sequences(raw: &[&[u8]]) -> Result<Vec<Vec<u8>>> {
    raw.iter().map(|seq| encode_sequence(seq)).collect()
}

/// One-hot encode an integer-coded sequence.
///
/// Each position produces a unit basis row of length 4.
///
/// # Errors
///
/// [`PhylographError::InvalidSymbol`] if a code is outside `0..=3`.
pub fn one_hot(encoded: &[u8]) -> Result<Vec<[u8; NUM_STATES]>> {
    encoded
        .iter()
        .enumerate()
        .map(|(position, &code)| {
            if code as usize >= NUM_STATES {
                return Err(PhylographError::InvalidSymbol { position, code });
            }
            let mut row = [0u8; NUM_STATES];
            row[code as usize] = 1;
            Ok(row)
        })
        .collect()
}

/// Reduce a one-hot sequence back to categorical codes via argmax.
///
/// The inverse of [`one_hot`] for well-formed rows; for an all-zero row the
/// argmax convention yields 0.
pub fn categorical(rows: &[[u8; NUM_STATES]]) -> Vec<u8> {
    rows.iter()
        .map(|row| {
            let mut best = 0usize;
            for (i, &v) in row.iter().enumerate() {
                if v > row[best] {
                    best = i;
                }
            }
            best as u8
        })
        .collect()
}
