//! Attraction catalog reader.
//!
//! One attraction per line, semicolon-separated, header row skipped:
//!
//! ```text
//! name;"lat,lon";visit_minutes;cost;opening_min;closing_min[;neighborhood]
//! ```
//!
//! Comment lines starting with `#` and blank lines are ignored. The
//! neighborhood column is optional and defaults to an empty tag.

use std::fmt::{self, Display, Formatter};
use std::fs;
use std::io;
use std::path::Path;

use crate::model::{Attraction, AttractionError};

/// Errors raised while loading an attraction catalog file.
#[derive(Debug)]
pub enum CatalogLoadError {
    /// The file could not be read.
    Io(io::Error),
    /// A data line did not match the expected format.
    MalformedLine {
        /// 1-based line number.
        line: usize,
        /// What was wrong.
        reason: String,
    },
    /// A line parsed but described an invalid attraction.
    Attraction {
        /// 1-based line number.
        line: usize,
        /// The underlying validation failure.
        source: AttractionError,
    },
    /// The file contained a header but no attractions.
    Empty,
}

impl Display for CatalogLoadError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "could not read catalog file: {err}"),
            Self::MalformedLine { line, reason } => {
                write!(f, "malformed catalog line {line}: {reason}")
            }
            Self::Attraction { line, source } => {
                write!(f, "invalid attraction on line {line}: {source}")
            }
            Self::Empty => write!(f, "catalog file contains no attractions"),
        }
    }
}

impl std::error::Error for CatalogLoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Attraction { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<io::Error> for CatalogLoadError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

/// Loads attractions from a file.
pub fn load_attractions(path: impl AsRef<Path>) -> Result<Vec<Attraction>, CatalogLoadError> {
    let content = fs::read_to_string(path)?;
    parse_attractions(&content)
}

/// Parses catalog text; see the module docs for the format.
pub fn parse_attractions(content: &str) -> Result<Vec<Attraction>, CatalogLoadError> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut attractions = Vec::new();

    for (idx, raw) in content.lines().enumerate().skip(1) {
        let line_no = idx + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.split(';').map(str::trim).collect();
        if fields.len() != 6 && fields.len() != 7 {
            return Err(CatalogLoadError::MalformedLine {
                line: line_no,
                reason: format!("expected 6 or 7 fields, found {}", fields.len()),
            });
        }

        let (latitude, longitude) = parse_coordinates(fields[1]).map_err(|reason| {
            CatalogLoadError::MalformedLine {
                line: line_no,
                reason,
            }
        })?;
        let visit_time = parse_decimal(fields[2]).map_err(|reason| {
            CatalogLoadError::MalformedLine {
                line: line_no,
                reason,
            }
        })?;
        let cost = parse_decimal(fields[3]).map_err(|reason| CatalogLoadError::MalformedLine {
            line: line_no,
            reason,
        })?;
        let opening = parse_minute(fields[4]).map_err(|reason| CatalogLoadError::MalformedLine {
            line: line_no,
            reason,
        })?;
        let closing = parse_minute(fields[5]).map_err(|reason| CatalogLoadError::MalformedLine {
            line: line_no,
            reason,
        })?;
        let neighborhood = fields.get(6).copied().unwrap_or("");

        let attraction = Attraction::new(
            fields[0],
            neighborhood,
            latitude,
            longitude,
            visit_time,
            cost,
            opening,
            closing,
        )
        .map_err(|source| CatalogLoadError::Attraction {
            line: line_no,
            source,
        })?;
        attractions.push(attraction);
    }

    if attractions.is_empty() {
        return Err(CatalogLoadError::Empty);
    }
    Ok(attractions)
}

/// Parses a number accepting either decimal separator.
pub(crate) fn parse_decimal(field: &str) -> Result<f64, String> {
    field
        .trim()
        .replace(',', ".")
        .parse::<f64>()
        .map_err(|_| format!("'{field}' is not a number"))
}

fn parse_minute(field: &str) -> Result<u32, String> {
    field
        .trim()
        .parse::<u32>()
        .map_err(|_| format!("'{field}' is not a minute-of-day"))
}

/// Parses a quoted `"lat,lon"` pair.
///
/// With dot decimals the pair splits into two tokens; with comma
/// decimals it splits into four, which are re-joined pairwise.
fn parse_coordinates(field: &str) -> Result<(f64, f64), String> {
    let inner = field.trim().trim_matches('"');
    let parts: Vec<&str> = inner.split(',').map(str::trim).collect();
    match parts.len() {
        2 => Ok((
            parts[0]
                .parse::<f64>()
                .map_err(|_| format!("bad latitude '{}'", parts[0]))?,
            parts[1]
                .parse::<f64>()
                .map_err(|_| format!("bad longitude '{}'", parts[1]))?,
        )),
        4 => {
            let lat = format!("{}.{}", parts[0], parts[1]);
            let lon = format!("{}.{}", parts[2], parts[3]);
            Ok((
                lat.parse::<f64>().map_err(|_| format!("bad latitude '{lat}'"))?,
                lon.parse::<f64>().map_err(|_| format!("bad longitude '{lon}'"))?,
            ))
        }
        n => Err(format!("expected coordinate pair, found {n} tokens")),
    }
}

// ============================================================================
// Tests
// ============================================================================
