//! Maximum-weight spanning tree extraction from a similarity matrix.
//!
//! Builds an undirected weighted graph over sequence indices, optionally
//! excluding a designated root/auxiliary index, and extracts the spanning
//! tree of maximum total weight via Kruskal's algorithm with a union-find.

use crate::error::{PhylographError, Result};

/// An undirected weighted edge between two node indices.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Edge {
    pub a: usize,
    pub b: usize,
    pub weight: f64,
}

/// Undirected weighted graph over node indices `0..n_nodes`.
#[derive(Debug, Clone)]
pub struct WeightedGraph {
    n_nodes: usize,
    /// Indices that belong to the graph (everything except the excluded
    /// root/auxiliary index).
    members: Vec<usize>,
    edges: Vec<Edge>,
}

impl WeightedGraph {
    /// Build a graph from a square weight matrix.
    ///
    /// One undirected edge is added per unordered pair `(i, j)`, `i < j`,
    /// with weight `weights[i][j]`. A non-finite weight marks an absent edge
    /// and is skipped; there is no in-band magic sentinel beyond that.
    ///
    /// `root_index`, when given, names the row/column reserved as the
    /// root/auxiliary connector; that index is excluded from the graph and
    /// the remaining indices are kept as-is (no renumbering).
    ///
    /// # Errors
    ///
    /// Returns an error if the matrix is not square or `root_index` is out
    /// of range.
    pub fn from_weight_matrix(weights: &[Vec<f64>], root_index: Option<usize>) -> Result<Self> {
        let n = weights.len();
        for (i, row) in weights.iter().enumerate() {
            if row.len() != n {
                return Err(PhylographError::ShapeMismatch {
                    what: format!("weight matrix row {}", i),
                    expected: n,
                    actual: row.len(),
                });
            }
        }
        if let Some(r) = root_index {
            if r >= n {
                return Err(PhylographError::InvalidInput(format!(
                    "root index {} out of range for {} nodes",
                    r, n
                )));
            }
        }

        let excluded = |i: usize| root_index == Some(i);
        let mut edges = Vec::new();
        for i in 0..n {
            if excluded(i) {
                continue;
            }
            for j in (i + 1)..n {
                if excluded(j) {
                    continue;
                }
                let w = weights[i][j];
                if w.is_finite() {
                    edges.push(Edge { a: i, b: j, weight: w });
                }
            }
        }

        let members: Vec<usize> = (0..n).filter(|&i| !excluded(i)).collect();
        Ok(Self {
            n_nodes: n,
            members,
            edges,
        })
    }

    /// Extract the maximum-weight spanning tree.
    ///
    /// Edges are considered in descending weight order and joined through a
    /// union-find; the result has exactly `nodes - 1` edges. Tie-breaking
    /// between equal-weight edges follows the sort's deterministic order and
    /// carries no meaning; only the total weight is an invariant.
    ///
    /// # Errors
    ///
    /// [`PhylographError::DisconnectedGraph`] if no spanning tree exists.
    /// Weights produced by the similarity transform are always finite and
    /// positive over a complete graph, so disconnection is fatal and
    /// unexpected rather than recoverable.
    pub fn maximum_spanning_tree(&self) -> Result<Vec<Edge>> {
        let n_members = self.members.len();
        if n_members <= 1 {
            return Ok(Vec::new());
        }

        let mut sorted: Vec<Edge> = self.edges.clone();
        sorted.sort_by(|x, y| {
            y.weight
                .partial_cmp(&x.weight)
                .expect("edge weights are finite by construction")
        });

        let mut uf = UnionFind::new(self.n_nodes);
        let mut tree = Vec::with_capacity(n_members - 1);
        for e in sorted {
            if uf.union(e.a, e.b) {
                tree.push(e);
                if tree.len() == n_members - 1 {
                    break;
                }
            }
        }

        if tree.len() != n_members - 1 {
            return Err(PhylographError::DisconnectedGraph {
                n_nodes: n_members,
                n_edges: self.edges.len(),
            });
        }
        Ok(tree)
    }

    /// The graph's edge list.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }
}

/// Union-find with path halving and union by size.
struct UnionFind {
    parent: Vec<usize>,
    size: Vec<usize>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            size: vec![1; n],
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    /// Merge the sets containing `a` and `b`. Returns false if they were
    /// already in the same set.
    fn union(&mut self, a: usize, b: usize) -> bool {
        let (mut ra, mut rb) = (self.find(a), self.find(b));
        if ra == rb {
            return false;
        }
        if self.size[ra] < self.size[rb] {
            std::mem::swap(&mut ra, &mut rb);
        }
        self.parent[rb] = ra;
        self.size[ra] += self.size[rb];
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn total_weight(edges: &[Edge]) -> f64 {
        edges.iter().map(|e| e.weight).sum()
    }

    /// Brute-force the best spanning tree weight by enumerating all edge
    /// subsets of size `nodes - 1` and keeping the connected ones.
    fn brute_force_best(graph: &WeightedGraph, n_active: usize) -> f64 {
        let edges = graph.edges();
        let m = edges.len();
        let k = n_active - 1;
        let mut best = f64::NEG_INFINITY;

        for mask in 0u32..(1 << m) {
            if mask.count_ones() as usize != k {
                continue;
            }
            let chosen: Vec<&Edge> = (0..m)
                .filter(|&i| mask & (1 << i) != 0)
                .map(|i| &edges[i])
                .collect();
            let mut uf = UnionFind::new(graph.n_nodes);
            let mut joins = 0;
            for e in &chosen {
                if uf.union(e.a, e.b) {
                    joins += 1;
                }
            }
            if joins == k {
                let w: f64 = chosen.iter().map(|e| e.weight).sum();
                if w > best {
                    best = w;
                }
            }
        }
        best
    }

    fn symmetric_matrix(n: usize, seed: u64) -> Vec<Vec<f64>> {
        let mut state = seed.max(1);
        let mut next = || {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            state as f64 / u64::MAX as f64
        };
        let mut w = vec![vec![0.0; n]; n];
        for i in 0..n {
            for j in (i + 1)..n {
                let v = next();
                w[i][j] = v;
                w[j][i] = v;
            }
        }
        w
    }

    #[test]
    fn rejects_non_square_matrix() {
        let w = vec![vec![0.0, 1.0], vec![1.0, 0.0, 2.0]];
        assert!(WeightedGraph::from_weight_matrix(&w, None).is_err());
    }

    #[test]
    fn rejects_root_index_out_of_range() {
        let w = symmetric_matrix(3, 7);
        assert!(WeightedGraph::from_weight_matrix(&w, Some(3)).is_err());
        assert!(WeightedGraph::from_weight_matrix(&w, Some(2)).is_ok());
    }

    #[test]
    fn excluding_root_drops_its_edges() {
        let w = symmetric_matrix(4, 11);
        let g = WeightedGraph::from_weight_matrix(&w, Some(3)).unwrap();
        assert!(g.edges().iter().all(|e| e.a != 3 && e.b != 3));
        // 3 remaining nodes form a complete graph with 3 edges.
        assert_eq!(g.edges().len(), 3);
    }

    #[test]
    fn non_finite_weights_mark_absent_edges() {
        let mut w = symmetric_matrix(4, 5);
        w[0][2] = f64::NEG_INFINITY;
        w[2][0] = f64::NEG_INFINITY;
        let g = WeightedGraph::from_weight_matrix(&w, None).unwrap();
        assert!(g.edges().iter().all(|e| !(e.a == 0 && e.b == 2)));
        assert_eq!(g.edges().len(), 5);
    }

    #[test]
    fn spanning_tree_has_n_minus_one_edges() {
        let w = symmetric_matrix(6, 99);
        let g = WeightedGraph::from_weight_matrix(&w, None).unwrap();
        let tree = g.maximum_spanning_tree().unwrap();
        assert_eq!(tree.len(), 5);
    }

    #[test]
    fn disconnected_graph_is_an_error() {
        // Two components {0,1} and {2,3}: cross edges absent.
        let mut w = vec![vec![f64::NAN; 4]; 4];
        w[0][1] = 1.0;
        w[1][0] = 1.0;
        w[2][3] = 2.0;
        w[3][2] = 2.0;
        let g = WeightedGraph::from_weight_matrix(&w, None).unwrap();
        let err = g.maximum_spanning_tree().unwrap_err();
        assert!(matches!(err, PhylographError::DisconnectedGraph { .. }));
    }

    #[test]
    fn matches_brute_force_on_small_graphs() {
        for n in 3..=6 {
            for seed in [3, 17, 2026] {
                let w = symmetric_matrix(n, seed);
                let g = WeightedGraph::from_weight_matrix(&w, None).unwrap();
                let tree = g.maximum_spanning_tree().unwrap();
                let best = brute_force_best(&g, n);
                assert!(
                    (total_weight(&tree) - best).abs() < 1e-12,
                    "n={} seed={}: kruskal {} vs brute force {}",
                    n,
                    seed,
                    total_weight(&tree),
                    best
                );
            }
        }
    }

    #[test]
    fn heaviest_edge_always_selected() {
        let mut w = symmetric_matrix(5, 31);
        w[1][3] = 10.0;
        w[3][1] = 10.0;
        let g = WeightedGraph::from_weight_matrix(&w, None).unwrap();
        let tree = g.maximum_spanning_tree().unwrap();
        assert!(tree
            .iter()
            .any(|e| (e.a, e.b) == (1, 3) || (e.a, e.b) == (3, 1)));
    }

    #[test]
    fn two_node_graph() {
        let w = vec![vec![0.0, 0.5], vec![0.5, 0.0]];
        let g = WeightedGraph::from_weight_matrix(&w, None).unwrap();
        let tree = g.maximum_spanning_tree().unwrap();
        assert_eq!(tree.len(), 1);
        assert_eq!((tree[0].a, tree[0].b), (0, 1));
    }
}
