//! Loading `x, y` samples from a two-column CSV file.

use std::{fs, num::ParseFloatError, path::Path};

use thiserror::Error;
use tracing::debug;

use crate::Value;

#[derive(Debug, Error)]
pub enum DataError {
    #[error("data io: {0}")]
    Io(#[from] std::io::Error),
    #[error("line {line}: expected 2 columns, found {found}")]
    ColumnCount { line: usize, found: usize },
    #[error("line {line}, column {column}: {source}")]
    Parse {
        line: usize,
        column: usize,
        #[source]
        source: ParseFloatError,
    },
    #[error("data: input has no samples")]
    Empty,
}

/// Paired samples, each one a leaf node.
#[derive(Debug, Clone, Default)]
pub struct Samples {
    pub x: Vec<Value>,
    pub y: Vec<Value>,
}

impl Samples {
    pub fn from_pairs(pairs: impl IntoIterator<Item = (f64, f64)>) -> Self {
        let (x, y) = pairs
            .into_iter()
            .map(|(x, y)| (Value::new(x), Value::new(y)))
            .unzip();
        Self { x, y }
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

/// Parse comma separated `x, y` rows. Blank lines are skipped, and the first row is
/// treated as a header if it does not start with a number.
pub fn parse_csv(text: &str) -> Result<Samples, DataError> {
    let mut pairs = vec![];
    let mut rows = text
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty())
        .peekable();

    if let Some((line, first)) = rows.peek() {
        let head = first.split(',').next().unwrap_or_default().trim();
        if head.parse::<f64>().is_err() {
            debug!(line, header = first, "skipping header row");
            rows.next();
        }
    }

    for (line, row) in rows {
        let fields: Vec<_> = row.split(',').map(str::trim).collect();
        if fields.len() != 2 {
            return Err(DataError::ColumnCount {
                line,
                found: fields.len(),
            });
        }
        let parse = |column: usize| {
            fields[column]
                .parse::<f64>()
                .map_err(|source| DataError::Parse {
                    line,
                    column: column + 1,
                    source,
                })
        };
        pairs.push((parse(0)?, parse(1)?));
    }

    if pairs.is_empty() {
        return Err(DataError::Empty);
    }
    Ok(Samples::from_pairs(pairs))
}

pub fn load_csv(path: impl AsRef<Path>) -> Result<Samples, DataError> {
    let text = fs::read_to_string(path.as_ref())?;
    let samples = parse_csv(&text)?;
    debug!(path = %path.as_ref().display(), rows = samples.len(), "loaded samples");
    Ok(samples)
}
