use nalgebra::DMatrix;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdjacencyError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Invalid number on line {line}, column {column}: '{value}'")]
    InvalidNumber {
        line: usize,
        column: usize,
        value: String,
    },
    #[error("Row on line {line} has {found} values, expected {expected}")]
    RaggedRow {
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("Matrix is not square ({rows} rows, {cols} columns)")]
    NotSquare { rows: usize, cols: usize },
    #[error("Matrix file contains no rows")]
    Empty,
}

/// Parses a whitespace-delimited square matrix, one row per line. Blank lines are skipped.
pub fn read_adjacency(reader: &mut impl BufRead) -> Result<DMatrix<f64>, AdjacencyError> {
    let mut values = Vec::new();
    let mut cols = None;
    let mut rows = 0;

    for (line_num, line_res) in reader.lines().enumerate() {
        let line = line_res?;
        if line.trim().is_empty() {
            continue;
        }
        let before = values.len();
        for (column, token) in line.split_whitespace().enumerate() {
            let value: f64 = token.parse().map_err(|_| AdjacencyError::InvalidNumber {
                line: line_num + 1,
                column: column + 1,
                value: token.to_string(),
            })?;
            values.push(value);
        }
        let found = values.len() - before;
        match cols {
            None => cols = Some(found),
            Some(expected) if expected != found => {
                return Err(AdjacencyError::RaggedRow {
                    line: line_num + 1,
                    expected,
                    found,
                });
            }
            Some(_) => {}
        }
        rows += 1;
    }

    let cols = cols.ok_or(AdjacencyError::Empty)?;
    if rows != cols {
        return Err(AdjacencyError::NotSquare { rows, cols });
    }
    Ok(DMatrix::from_row_slice(rows, cols, &values))
}

pub fn read_adjacency_path<P: AsRef<Path>>(path: P) -> Result<DMatrix<f64>, AdjacencyError> {
    let mut reader = BufReader::new(File::open(path)?);
    read_adjacency(&mut reader)
}

/// Writes one row per line, values separated by single spaces.
pub fn write_adjacency(matrix: &DMatrix<f64>, writer: &mut impl Write) -> io::Result<()> {
    for row in matrix.row_iter() {
        let line = row
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(" ");
        writeln!(writer, "{}", line)?;
    }
    Ok(())
}

pub fn write_adjacency_path<P: AsRef<Path>>(matrix: &DMatrix<f64>, path: P) -> io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_adjacency(matrix, &mut writer)?;
    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::tempdir;

    fn read(text: &str) -> Result<DMatrix<f64>, AdjacencyError> {
        read_adjacency(&mut Cursor::new(text.as_bytes()))
    }

    #[test]
    fn reads_scientific_and_plain_values() {
        let m = read("0 1.000000000000000000e+00\n1 0\n").unwrap();
        assert_eq!(m, DMatrix::from_row_slice(2, 2, &[0.0, 1.0, 1.0, 0.0]));
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let err = read("0 1 0\n1 0\n").unwrap_err();
        assert!(matches!(
            err,
            AdjacencyError::RaggedRow {
                line: 2,
                expected: 3,
                found: 2
            }
        ));
    }

    #[test]
    fn non_square_and_empty_inputs_are_rejected() {
        assert!(matches!(
            read("0 1\n").unwrap_err(),
            AdjacencyError::NotSquare { rows: 1, cols: 2 }
        ));
        assert!(matches!(read("\n\n").unwrap_err(), AdjacencyError::Empty));
    }

    #[test]
    fn invalid_tokens_report_their_position() {
        let err = read("0 x\n1 0\n").unwrap_err();
        assert!(matches!(
            err,
            AdjacencyError::InvalidNumber { line: 1, column: 2, .. }
        ));
    }

    #[test]
    fn written_matrix_reads_back_identically() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("m.txt");
        let m = DMatrix::from_row_slice(3, 3, &[0.0, 0.25, 0.0, 0.25, 0.0, 1.0, 0.0, 1.0, 0.0]);
        write_adjacency_path(&m, &path).unwrap();
        assert_eq!(read_adjacency_path(&path).unwrap(), m);
    }
}
