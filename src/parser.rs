//! Parses the line-oriented connectivity file format into a
//! [`ConnectivityMatrix`] plus root [`ProcessId`].
//!
//! Line 1 is `N R`; lines 2..=N+1 are each one row of `N` signed integers.
//! Integers are separated by runs of non-digit, non-minus characters,
//! mirroring the reference parser's "extract everything matching a signed
//! integer" approach without pulling in a regex dependency for it.

use std::io::BufRead;

use crate::error::ParseError;
use crate::graph::{self, ConnectivityMatrix};
use crate::ids::ProcessId;

/// Splits a line into signed-integer tokens, grouping a leading `-` with the
/// digit run that follows it.
fn extract_integers(line: &str) -> Vec<i64> {
  line
    .split(|c: char| !(c.is_ascii_digit() || c == '-'))
    .filter(|token| !token.is_empty() && *token != "-")
    .filter_map(|token| token.parse::<i64>().ok())
    .collect()
}

/// Parse a connectivity file, validating it against [`graph::validate`]
/// before returning.
pub fn parse_connectivity(
  reader: impl BufRead
) -> Result<(ConnectivityMatrix, ProcessId), ParseError> {
  let mut lines = reader.lines();

  let header = lines
    .next()
    .ok_or(ParseError::Header { line: 1 })?
    .map_err(|_| ParseError::Header { line: 1 })?;
  let header_ints = extract_integers(&header);
  let (process_count, root) = match header_ints.as_slice() {
    [n, r] => (*n, *r),
    _ => return Err(ParseError::Header { line: 1 }),
  };
  if process_count <= 0 {
    return Err(ParseError::Header { line: 1 });
  }
  let process_count = process_count as usize;
  if root < 1 || root as usize > process_count {
    return Err(ParseError::RootOutOfRange {
      line: 1, root: root.max(0) as usize, count: process_count,
    });
  }
  let root = ProcessId::new(root as usize).unwrap();

  let mut matrix = ConnectivityMatrix::with_capacity(process_count);
  for row_index in 0..process_count {
    let line_number = row_index + 2;
    let line = lines
      .next()
      .ok_or(ParseError::RowCount { expected: process_count, found: row_index })?
      .map_err(|_| ParseError::RowLength { line: line_number, expected: process_count, found: 0 })?;
    let row = extract_integers(&line);
    if row.len() != process_count {
      return Err(ParseError::RowLength {
        line: line_number, expected: process_count, found: row.len(),
      });
    }
    matrix.push(row);
  }

  if lines.next().is_some() {
    return Err(ParseError::RowCount { expected: process_count, found: process_count + 1 });
  }

  graph::validate(&matrix, root)?;
  Ok((matrix, root))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn parse(text: &str) -> Result<(ConnectivityMatrix, ProcessId), ParseError> {
    parse_connectivity(text.as_bytes())
  }

  #[test]
  fn parses_two_node_example() {
    let (matrix, root) = parse("2 1\n-1 5\n5 -1\n").unwrap();
    assert_eq!(matrix, vec![vec![-1, 5], vec![5, -1]]);
    assert_eq!(root, ProcessId::new(1).unwrap());
  }

  #[test]
  fn parses_star_from_non_first_root() {
    let (matrix, root) = parse(
      "5 3\n\
       -1 -1 2 -1 -1\n\
       -1 -1 7 -1 -1\n\
       2 7 -1 2 7\n\
       -1 -1 2 -1 -1\n\
       -1 -1 7 -1 -1\n",
    )
    .unwrap();
    assert_eq!(root, ProcessId::new(3).unwrap());
    assert_eq!(matrix[2], vec![2, 7, -1, 2, 7]);
  }

  #[test]
  fn rejects_wrong_row_length() {
    let err = parse("2 1\n-1 5 9\n5 -1\n").unwrap_err();
    assert!(matches!(err, ParseError::RowLength { line: 2, expected: 2, found: 3 }));
  }

  #[test]
  fn rejects_missing_rows() {
    let err = parse("3 1\n-1 5 -1\n5 -1 -1\n").unwrap_err();
    assert!(matches!(err, ParseError::RowCount { .. }));
  }

  #[test]
  fn rejects_out_of_range_root() {
    let err = parse("2 5\n-1 5\n5 -1\n").unwrap_err();
    assert!(matches!(err, ParseError::RootOutOfRange { line: 1, root: 5, count: 2 }));
  }

  #[test]
  fn rejects_malformed_header() {
    let err = parse("two one\n").unwrap_err();
    assert!(matches!(err, ParseError::Header { line: 1 }));
  }

  #[test]
  fn propagates_graph_validation_errors() {
    let err = parse("2 1\n-1 0\n0 -1\n").unwrap_err();
    assert!(matches!(err, ParseError::NonPositiveWeight { .. }));
  }
}
