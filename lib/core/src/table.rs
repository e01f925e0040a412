use crate::{Error, Result};

/// Header plus string cells, as read from a tabular source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Rows shorter than the header are padded with empty cells,
    /// longer ones are truncated.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .collect();
        Self { headers, rows }
    }

    /// Convenience constructor for literals.
    pub fn from_strs(headers: &[&str], rows: &[&[&str]]) -> Self {
        Self::new(
            headers.iter().map(|h| h.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        )
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column by exact header name (surrounding whitespace ignored).
    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.headers
            .iter()
            .position(|h| h.trim() == name.trim())
            .ok_or_else(|| {
                Error::Load(format!(
                    "column '{}' not found (available: {})",
                    name,
                    self.headers.join(", ")
                ))
            })
    }
}

/// Anything that can produce a [`RawTable`]: CSV files, fixtures, in-memory data.
pub trait TableSource {
    fn read_table(&self) -> Result<RawTable>;

    /// Human readable origin used in log and error messages.
    fn describe(&self) -> String {
        "<table>".to_string()
    }
}

impl TableSource for RawTable {
    fn read_table(&self) -> Result<RawTable> {
        Ok(self.clone())
    }

    fn describe(&self) -> String {
        "<in-memory table>".to_string()
    }
}
