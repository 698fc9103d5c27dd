//! Directed transition graphs and breadth-first reachability.
//!
//! Used by the irreducibility check: an irreducible chain is one whose transition
//! graph is strongly connected, which for a single source reduces to "every node is
//! reachable from node 0 forward and on the reversed graph".

use crate::matrix::CsrMatrix;
use std::collections::VecDeque;

/// Extract adjacency list from a matrix pattern: adj[i] = { j | A[i,j] > tol }
pub fn adjacency(a: &CsrMatrix, tol: f64) -> Vec<Vec<usize>> {
    (0..a.nrows())
        .map(|i| {
            let (cols, vals) = a.row(i);
            cols.iter()
                .zip(vals)
                .filter(|&(_, &v)| v > tol)
                .map(|(&j, _)| j)
                .collect()
        })
        .collect()
}

/// Reverse every edge: rev[j] contains i iff adj[i] contains j.
pub fn reverse(adj: &[Vec<usize>]) -> Vec<Vec<usize>> {
    let mut rev = vec![Vec::new(); adj.len()];
    for (i, targets) in adj.iter().enumerate() {
        for &j in targets {
            rev[j].push(i);
        }
    }
    rev
}

/// Breadth-first search from `start`. Returns visited[i] for every node.
pub fn reachable_from(adj: &[Vec<usize>], start: usize) -> Vec<bool> {
    let mut visited = vec![false; adj.len()];
    if start >= adj.len() {
        return visited;
    }
    let mut frontier = VecDeque::from([start]);
    visited[start] = true;
    while let Some(u) = frontier.pop_front() {
        for &v in &adj[u] {
            if !visited[v] {
                visited[v] = true;
                frontier.push_back(v);
            }
        }
    }
    visited
}
