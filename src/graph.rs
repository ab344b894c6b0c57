//! The connectivity matrix data model and its well-formedness checks.

use std::collections::VecDeque;

use crate::error::ParseError;
use crate::ids::ProcessId;

/// Sentinel weight meaning "no edge".
pub const NO_EDGE: i64 = -1;

/// Square matrix of signed integers; entry `(i, j)` is the weight of the
/// edge between 1-based processes `i + 1` and `j + 1`, or [`NO_EDGE`].
pub type ConnectivityMatrix = Vec<Vec<i64>>;

/// Checks the structural invariants a [`ConnectivityMatrix`] must satisfy
/// before any actor thread is spawned: square, `-1` diagonal, symmetric
/// presence and weight, strictly positive weights, and (since an
/// unreachable vertex would wait for acknowledgements that never arrive)
/// full connectivity from `root`.
pub fn validate(matrix: &ConnectivityMatrix, root: ProcessId) -> Result<(), ParseError> {
  let n = matrix.len();
  debug_assert!(matrix.iter().all(|row| row.len() == n));

  for (i, row) in matrix.iter().enumerate() {
    if row[i] != NO_EDGE {
      return Err(ParseError::DiagonalNotSentinel { line: i + 2 });
    }
    for j in (i + 1)..n {
      let w_ij = row[j];
      let w_ji = matrix[j][i];
      if w_ij != w_ji {
        return Err(ParseError::Asymmetric { a: i + 1, b: j + 1 });
      }
      if w_ij != NO_EDGE && w_ij <= 0 {
        return Err(ParseError::NonPositiveWeight { a: i + 1, b: j + 1, weight: w_ij });
      }
    }
  }

  if let Some(unreached) = first_unreachable(matrix, root) {
    return Err(ParseError::Disconnected { unreached: unreached + 1 });
  }

  Ok(())
}

/// Breadth-first search from `root`'s index; returns the index of an
/// unreachable vertex, if any.
fn first_unreachable(matrix: &ConnectivityMatrix, root: ProcessId) -> Option<usize> {
  let n = matrix.len();
  let mut visited = vec![false; n];
  let mut queue = VecDeque::new();
  visited[root.index()] = true;
  queue.push_back(root.index());
  while let Some(u) = queue.pop_front() {
    for v in 0..n {
      if matrix[u][v] != NO_EDGE && !visited[v] {
        visited[v] = true;
        queue.push_back(v);
      }
    }
  }
  visited.iter().position(|&reached| !reached)
}

/// The true single-source shortest-path distance from `root` to every
/// vertex, computed with a direct Dijkstra pass. Not used by the simulator
/// itself; exists so tests (including integration tests, which cannot see
/// `#[cfg(test)]` items) can check the simulator's output against ground
/// truth rather than duplicating the algorithm under test.
pub fn dijkstra(matrix: &ConnectivityMatrix, root: ProcessId) -> Vec<f64> {
  let n = matrix.len();
  let mut dist = vec![f64::INFINITY; n];
  let mut visited = vec![false; n];
  dist[root.index()] = 0.0;
  for _ in 0..n {
    let u = (0..n)
      .filter(|&v| !visited[v])
      .min_by(|&a, &b| dist[a].partial_cmp(&dist[b]).unwrap())
      .unwrap();
    if dist[u].is_infinite() {
      break;
    }
    visited[u] = true;
    for v in 0..n {
      if matrix[u][v] != NO_EDGE {
        let alt = dist[u] + matrix[u][v] as f64;
        if alt < dist[v] {
          dist[v] = alt;
        }
      }
    }
  }
  dist
}
