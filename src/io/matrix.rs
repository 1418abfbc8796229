//! Transport matrix reader.
//!
//! Each of the four matrices is a semicolon-separated table: a header
//! row of attraction names (first cell empty or a corner label), then
//! one row per origin starting with its name followed by `n` numeric
//! cells. A UTF-8 BOM on the header is stripped and decimal commas are
//! accepted.

use std::fmt::{self, Display, Formatter};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::catalog::parse_decimal;
use crate::transport::{MatrixDataError, TravelMatrices};

/// Conventional file names inside a matrix directory, in loader order:
/// car distance, walk distance, car time, walk time.
pub const MATRIX_FILE_NAMES: [&str; 4] = [
    "matriz_distancias_carro_metros.csv",
    "matriz_distancias_pe_metros.csv",
    "matriz_tempos_carro_min.csv",
    "matriz_tempos_pe_min.csv",
];

/// Errors raised while loading the transport matrices.
#[derive(Debug)]
pub enum MatrixLoadError {
    /// A file could not be read.
    Io(io::Error),
    /// A row did not match the expected format.
    MalformedRow {
        /// 1-based line number.
        line: usize,
        /// What was wrong.
        reason: String,
    },
    /// The parsed tables were inconsistent with one another.
    Data(MatrixDataError),
    /// Two matrix files disagree on the attraction names.
    NameMismatch {
        /// Row index where the disagreement was found.
        index: usize,
    },
}

impl Display for MatrixLoadError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "could not read matrix file: {err}"),
            Self::MalformedRow { line, reason } => {
                write!(f, "malformed matrix row {line}: {reason}")
            }
            Self::Data(err) => write!(f, "{err}"),
            Self::NameMismatch { index } => {
                write!(f, "matrix files disagree on attraction name at index {index}")
            }
        }
    }
}

impl std::error::Error for MatrixLoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Data(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for MatrixLoadError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<MatrixDataError> for MatrixLoadError {
    fn from(err: MatrixDataError) -> Self {
        Self::Data(err)
    }
}

/// Builds the four conventional file paths under a directory.
pub fn matrix_paths(dir: impl AsRef<Path>) -> [PathBuf; 4] {
    let dir = dir.as_ref();
    MATRIX_FILE_NAMES.map(|name| dir.join(name))
}

/// Loads the four matrices and assembles the transport oracle.
///
/// Attraction names are taken from the car-distance header; the other
/// three files must agree on them.
pub fn load_matrices(
    car_distances: impl AsRef<Path>,
    walk_distances: impl AsRef<Path>,
    car_times: impl AsRef<Path>,
    walk_times: impl AsRef<Path>,
) -> Result<TravelMatrices, MatrixLoadError> {
    let car_dist = parse_matrix(&fs::read_to_string(car_distances)?)?;
    let walk_dist = parse_matrix(&fs::read_to_string(walk_distances)?)?;
    let car_time = parse_matrix(&fs::read_to_string(car_times)?)?;
    let walk_time = parse_matrix(&fs::read_to_string(walk_times)?)?;
    assemble(car_dist, walk_dist, car_time, walk_time)
}

/// Loads the matrices from a directory laid out with the conventional
/// file names.
pub fn load_matrices_from_dir(dir: impl AsRef<Path>) -> Result<TravelMatrices, MatrixLoadError> {
    let [cd, wd, ct, wt] = matrix_paths(dir);
    load_matrices(cd, wd, ct, wt)
}

/// One parsed table: header names plus the dense rows.
type ParsedMatrix = (Vec<String>, Vec<Vec<f64>>);

/// Assembles four parsed tables into the oracle, checking that the
/// headers agree.
pub fn assemble(
    car_distances: ParsedMatrix,
    walk_distances: ParsedMatrix,
    car_times: ParsedMatrix,
    walk_times: ParsedMatrix,
) -> Result<TravelMatrices, MatrixLoadError> {
    let (names, car_dist) = car_distances;
    for other in [&walk_distances.0, &car_times.0, &walk_times.0] {
        if other.len() != names.len() {
            return Err(MatrixLoadError::NameMismatch { index: other.len().min(names.len()) });
        }
        if let Some(index) = names
            .iter()
            .zip(other.iter())
            .position(|(a, b)| a.trim() != b.trim())
        {
            return Err(MatrixLoadError::NameMismatch { index });
        }
    }
    Ok(TravelMatrices::from_tables(
        names,
        car_dist,
        walk_distances.1,
        car_times.1,
        walk_times.1,
    )?)
}

/// Parses one semicolon-separated matrix file.
pub fn parse_matrix(content: &str) -> Result<ParsedMatrix, MatrixLoadError> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut lines = content.lines().enumerate();

    let Some((_, header)) = lines.next() else {
        return Err(MatrixLoadError::Data(MatrixDataError::Empty));
    };
    let mut names: Vec<String> = header.split(';').map(|s| s.trim().to_string()).collect();
    if names.first().is_some_and(|name| name.is_empty()) {
        names.remove(0);
    }
    names.retain(|name| !name.is_empty());
    if names.is_empty() {
        return Err(MatrixLoadError::Data(MatrixDataError::Empty));
    }

    let mut rows = Vec::new();
    for (idx, raw) in lines {
        let line_no = idx + 1;
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        let mut cells: Vec<&str> = line.split(';').map(str::trim).collect();
        while cells.last().is_some_and(|cell| cell.is_empty()) {
            cells.pop();
        }
        // First cell is the origin's name.
        let mut row = Vec::with_capacity(names.len());
        for cell in cells.iter().skip(1) {
            let value = parse_decimal(cell).map_err(|reason| MatrixLoadError::MalformedRow {
                line: line_no,
                reason,
            })?;
            row.push(value);
        }
        if row.len() != names.len() {
            return Err(MatrixLoadError::MalformedRow {
                line: line_no,
                reason: format!("expected {} cells, found {}", names.len(), row.len()),
            });
        }
        rows.push(row);
    }

    Ok((names, rows))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::TransportMode;

    fn square(content: &str) -> ParsedMatrix {
        parse_matrix(content).unwrap()
    }

    const CAR_DIST: &str = ";A;B\nA;0;500\nB;500;0\n";
    const WALK_DIST: &str = ";A;B\nA;0;700\nB;700;0\n";
    const CAR_TIME: &str = ";A;B\nA;0;5\nB;5;0\n";
    const WALK_TIME: &str = ";A;B\nA;0;10\nB;10;0\n";

    #[test]
    fn test_parse_matrix_basic() {
        let (names, rows) = square(CAR_DIST);
        assert_eq!(names, vec!["A", "B"]);
        assert_eq!(rows, vec![vec![0.0, 500.0], vec![500.0, 0.0]]);
    }

    #[test]
    fn test_parse_matrix_strips_bom_and_corner_label() {
        let (names, _) = square("\u{feff}origem;A;B\nA;0;1\nB;1;0\n");
        assert_eq!(names, vec!["A", "B"]);
    }

    #[test]
    fn test_parse_matrix_accepts_decimal_commas() {
        let (_, rows) = square(";A;B\nA;0;12,5\nB;12,5;0\n");
        assert_eq!(rows[0][1], 12.5);
    }

    #[test]
    fn test_parse_matrix_rejects_short_row() {
        let err = parse_matrix(";A;B\nA;0\nB;1;0\n").unwrap_err();
        assert!(matches!(err, MatrixLoadError::MalformedRow { line: 2, .. }));
    }

    #[test]
    fn test_parse_matrix_rejects_bad_cell() {
        let err = parse_matrix(";A;B\nA;0;muito\nB;1;0\n").unwrap_err();
        assert!(matches!(err, MatrixLoadError::MalformedRow { .. }));
    }

    #[test]
    fn test_assemble_builds_oracle() {
        let matrices = assemble(
            square(CAR_DIST),
            square(WALK_DIST),
            square(CAR_TIME),
            square(WALK_TIME),
        )
        .unwrap();
        assert_eq!(matrices.travel_time("A", "B", TransportMode::Walk).unwrap(), 10.0);
        assert_eq!(matrices.distance("A", "B", TransportMode::Car).unwrap(), 500.0);
    }

    #[test]
    fn test_assemble_rejects_disagreeing_names() {
        let err = assemble(
            square(CAR_DIST),
            square(";A;C\nA;0;1\nC;1;0\n"),
            square(CAR_TIME),
            square(WALK_TIME),
        )
        .unwrap_err();
        assert!(matches!(err, MatrixLoadError::NameMismatch { index: 1 }));
    }

    #[test]
    fn test_assemble_rejects_missing_rows() {
        let err = assemble(
            square(";A;B\nA;0;1\n"),
            square(WALK_DIST),
            square(CAR_TIME),
            square(WALK_TIME),
        )
        .unwrap_err();
        assert!(matches!(err, MatrixLoadError::Data(_)));
    }

    #[test]
    fn test_matrix_paths_use_convention() {
        let paths = matrix_paths("/data");
        assert!(paths[0].ends_with("matriz_distancias_carro_metros.csv"));
        assert!(paths[1].ends_with("matriz_distancias_pe_metros.csv"));
        assert!(paths[2].ends_with("matriz_tempos_carro_min.csv"));
        assert!(paths[3].ends_with("matriz_tempos_pe_min.csv"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_matrices_from_dir("/nonexistent").unwrap_err();
        assert!(matches!(err, MatrixLoadError::Io(_)));
    }
}
