//! The fixed skill taxonomy the neighbour index was trained on.
//!
//! Row positions are the identity of a label: the trained index refers to
//! vocabulary rows only by position, so the row order and the column order
//! of the source must be the ones used at training time.

use crate::table::{RawTable, TableSource};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// One canonical label: the attribute values of a vocabulary row in source column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabularyRow {
    values: Vec<String>,
}

impl VocabularyRow {
    pub fn new(values: Vec<String>) -> Self {
        Self { values }
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// The values joined with single spaces.
    pub fn text(&self) -> String {
        self.values.join(" ")
    }
}

#[derive(Debug, Clone)]
pub struct VocabularyIndex {
    columns: Vec<String>,
    rows: Vec<VocabularyRow>,
}

impl VocabularyIndex {
    /// Read and validate a vocabulary from any table source.
    pub fn load(source: &impl TableSource) -> Result<Self> {
        let table = source
            .read_table()
            .map_err(|e| Error::Load(format!("vocabulary {}: {}", source.describe(), e)))?;
        let index = Self::from_table(table)?;
        tracing::info!(
            rows = index.len(),
            columns = index.columns.len(),
            "Loaded vocabulary from {}",
            source.describe()
        );
        Ok(index)
    }

    pub fn from_table(table: RawTable) -> Result<Self> {
        if table.headers.is_empty() {
            return Err(Error::Load("vocabulary has no columns".to_string()));
        }
        if table.rows.is_empty() {
            return Err(Error::Load("vocabulary has zero rows".to_string()));
        }
        Ok(Self {
            columns: table.headers,
            rows: table.rows.into_iter().map(VocabularyRow::new).collect(),
        })
    }

    /// Single-column vocabulary from label strings.
    pub fn from_labels<I, S>(column: &str, labels: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let rows = labels.into_iter().map(|l| vec![l.into()]).collect();
        Self::from_table(RawTable::new(vec![column.to_string()], rows))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Always false for a loaded index; kept for API symmetry with `len`.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn row(&self, index: usize) -> Result<&VocabularyRow> {
        self.rows.get(index).ok_or(Error::Index {
            index,
            len: self.rows.len(),
        })
    }

    /// The literal label text for a row, as compared by the fuzzy filter.
    pub fn label_text(&self, index: usize) -> Result<String> {
        self.row(index).map(VocabularyRow::text)
    }

    /// All label texts in row order.
    pub fn labels(&self) -> Vec<String> {
        self.rows.iter().map(VocabularyRow::text).collect()
    }
}
