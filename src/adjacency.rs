//! Sparse binary adjacency materialization.
//!
//! Converts a spanning tree's edge list into a symmetric, unweighted
//! adjacency matrix in compressed-row (CSR) form, the shape graph-learning
//! pipelines consume directly.

use crate::error::{PhylographError, Result};
use crate::mst::Edge;

/// A symmetric binary adjacency matrix in CSR form.
///
/// Stored as the usual `(data, indices, indptr)` triple; `data` is all ones
/// but kept explicit so the triple round-trips through standard sparse
/// tooling unchanged.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SparseAdjacency {
    data: Vec<u8>,
    indices: Vec<usize>,
    indptr: Vec<usize>,
    n: usize,
}

impl SparseAdjacency {
    /// (rows, cols). Always square.
    pub fn shape(&self) -> (usize, usize) {
        (self.n, self.n)
    }

    /// Number of stored (non-zero) entries.
    pub fn nnz(&self) -> usize {
        self.data.len()
    }

    /// Entry at `(row, col)`: 1 if the edge is present, 0 otherwise.
    pub fn get(&self, row: usize, col: usize) -> u8 {
        if row >= self.n || col >= self.n {
            return 0;
        }
        let start = self.indptr[row];
        let end = self.indptr[row + 1];
        if self.indices[start..end].binary_search(&col).is_ok() {
            1
        } else {
            0
        }
    }

    /// Column indices of the non-zero entries in `row`.
    pub fn row(&self, row: usize) -> &[usize] {
        &self.indices[self.indptr[row]..self.indptr[row + 1]]
    }

    /// The raw CSR triple `(data, indices, indptr)`.
    pub fn csr(&self) -> (&[u8], &[usize], &[usize]) {
        (&self.data, &self.indices, &self.indptr)
    }

    /// Expand to a dense 0/1 matrix.
    pub fn to_dense(&self) -> Vec<Vec<u8>> {
        let mut dense = vec![vec![0u8; self.n]; self.n];
        for row in 0..self.n {
            for &col in self.row(row) {
                dense[row][col] = 1;
            }
        }
        dense
    }

    /// True if `adj[u][v] == adj[v][u]` for all entries. Holds by
    /// construction for matrices built by [`materialize`].
    pub fn is_symmetric(&self) -> bool {
        for row in 0..self.n {
            for &col in self.row(row) {
                if self.get(col, row) == 0 {
                    return false;
                }
            }
        }
        true
    }
}

/// Materialize a spanning tree's edges as a sparse symmetric adjacency
/// matrix over `num_nodes` nodes.
///
/// Each edge `(u, v)` sets both `[u][v]` and `[v][u]` to 1. `num_nodes` may
/// exceed the edge list's index range (the root/auxiliary index excluded
/// from spanning-tree construction is still a node); such indices simply
/// remain isolated all-zero rows, which is accepted, not an error.
///
/// # Errors
///
/// Returns an error if an edge index is out of range or an edge is a
/// self-loop.
pub fn materialize(edges: &[Edge], num_nodes: usize) -> Result<SparseAdjacency> {
    let mut pairs: Vec<(usize, usize)> = Vec::with_capacity(edges.len() * 2);
    for e in edges {
        if e.a >= num_nodes || e.b >= num_nodes {
            return Err(PhylographError::InvalidInput(format!(
                "edge ({}, {}) out of range for {} nodes",
                e.a, e.b, num_nodes
            )));
        }
        if e.a == e.b {
            return Err(PhylographError::InvalidInput(format!(
                "self-loop on node {}",
                e.a
            )));
        }
        pairs.push((e.a, e.b));
        pairs.push((e.b, e.a));
    }

    // Sort by (row, col) and build the CSR triple; duplicate edges collapse
    // to a single stored 1.
    pairs.sort_unstable();
    pairs.dedup();

    let mut data = Vec::with_capacity(pairs.len());
    let mut indices = Vec::with_capacity(pairs.len());
    let mut indptr = vec![0usize; num_nodes + 1];
    for &(row, col) in &pairs {
        data.push(1u8);
        indices.push(col);
        indptr[row + 1] += 1;
    }
    for i in 1..=num_nodes {
        indptr[i] += indptr[i - 1];
    }

    Ok(SparseAdjacency {
        data,
        indices,
        indptr,
        n: num_nodes,
    })
}
