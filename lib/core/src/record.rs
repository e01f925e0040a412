use crate::normalize::normalize;
use crate::table::{RawTable, TableSource};
use crate::{Error, Result};
use ahash::AHashSet;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Which free-text roster column a query targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchColumn {
    Skill,
    Certification,
}

impl MatchColumn {
    pub const ALL: [MatchColumn; 2] = [MatchColumn::Skill, MatchColumn::Certification];

    pub fn as_str(&self) -> &'static str {
        match self {
            MatchColumn::Skill => "skill",
            MatchColumn::Certification => "certification",
        }
    }
}

impl std::fmt::Display for MatchColumn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Header names of the identifier and free-text columns in the roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RosterColumns {
    pub id: String,
    pub skill: String,
    pub certification: String,
}

impl Default for RosterColumns {
    fn default() -> Self {
        Self {
            id: "Employee ID".to_string(),
            skill: "Skills".to_string(),
            certification: "Certification".to_string(),
        }
    }
}

impl RosterColumns {
    pub fn name(&self, column: MatchColumn) -> &str {
        match column {
            MatchColumn::Skill => &self.skill,
            MatchColumn::Certification => &self.certification,
        }
    }

    pub fn validate(&self) -> Result<()> {
        for (role, name) in [
            ("id", &self.id),
            ("skill", &self.skill),
            ("certification", &self.certification),
        ] {
            if name.trim().is_empty() {
                return Err(Error::InvalidConfig(format!("{} column name is empty", role)));
            }
        }
        Ok(())
    }
}

/// One roster row. Cells are kept in header order; the skill and
/// certification cells hold their normalized text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeeRecord {
    id: String,
    values: Vec<String>,
}

impl EmployeeRecord {
    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[inline]
    pub fn values(&self) -> &[String] {
        &self.values
    }

    #[inline]
    pub fn get(&self, column: usize) -> Option<&str> {
        self.values.get(column).map(String::as_str)
    }
}

/// The loaded roster, shared read-only between all queries.
#[derive(Debug, Clone)]
pub struct EmployeeTable {
    columns: Vec<String>,
    id_column: usize,
    skill_column: usize,
    certification_column: usize,
    records: Vec<Arc<EmployeeRecord>>,
}

impl EmployeeTable {
    pub fn load(source: &impl TableSource, roster: &RosterColumns) -> Result<Self> {
        let table = source
            .read_table()
            .map_err(|e| Error::Load(format!("employees {}: {}", source.describe(), e)))?;
        let employees = Self::from_table(table, roster)?;
        tracing::info!(
            records = employees.len(),
            "Loaded employee table from {}",
            source.describe()
        );
        Ok(employees)
    }

    /// Validate identifiers and normalize the text columns once, up front.
    pub fn from_table(table: RawTable, roster: &RosterColumns) -> Result<Self> {
        roster.validate()?;
        if table.rows.is_empty() {
            return Err(Error::Load("employee table has zero rows".to_string()));
        }
        let id_column = table.column_index(&roster.id)?;
        let skill_column = table.column_index(&roster.skill)?;
        let certification_column = table.column_index(&roster.certification)?;

        let width = table.headers.len();
        let mut seen = AHashSet::with_capacity(table.rows.len());
        let mut records = Vec::with_capacity(table.rows.len());
        for (line, mut values) in table.rows.into_iter().enumerate() {
            values.resize(width, String::new());
            let id = values[id_column].trim().to_string();
            if id.is_empty() {
                return Err(Error::Load(format!("row {} has an empty '{}'", line + 1, roster.id)));
            }
            if !seen.insert(id.clone()) {
                return Err(Error::Load(format!("duplicate {} '{}'", roster.id, id)));
            }
            for column in [skill_column, certification_column] {
                values[column] = normalize(&values[column]);
            }
            records.push(Arc::new(EmployeeRecord { id, values }));
        }

        Ok(Self {
            columns: table.headers,
            id_column,
            skill_column,
            certification_column,
            records,
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn records(&self) -> &[Arc<EmployeeRecord>] {
        &self.records
    }

    pub fn id_column(&self) -> usize {
        self.id_column
    }

    pub fn column_index(&self, column: MatchColumn) -> usize {
        match column {
            MatchColumn::Skill => self.skill_column,
            MatchColumn::Certification => self.certification_column,
        }
    }

    /// Normalized text of `column` for `record`.
    pub fn text<'a>(&self, record: &'a EmployeeRecord, column: MatchColumn) -> &'a str {
        record.get(self.column_index(column)).unwrap_or("")
    }

    pub fn get(&self, id: &str) -> Option<&Arc<EmployeeRecord>> {
        self.records.iter().find(|r| r.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw() -> RawTable {
        RawTable::from_strs(
            &["Employee ID", "Name", "Skills", "Certification"],
            &[
                &["1", "Ada", "  Advanced PYTHON  Programming ", "AWS Certified"],
                &["2", "Linus", "Welding", ""],
                &["3", "Grace"],
            ],
        )
    }

    #[test]
    fn test_text_columns_normalized_at_load() {
        let table = EmployeeTable::from_table(raw(), &RosterColumns::default()).unwrap();
        let first = &table.records()[0];
        assert_eq!(table.text(first, MatchColumn::Skill), "advanced python programming");
        assert_eq!(table.text(first, MatchColumn::Certification), "aws certified");
        assert_eq!(first.get(1), Some("Ada"));
        // missing cells become empty text
        assert_eq!(table.text(&table.records()[2], MatchColumn::Skill), "");
    }

    #[test]
    fn test_unpadded_rows_are_resized() {
        let table = RawTable {
            headers: vec!["Skills".into(), "Certification".into(), "Employee ID".into()],
            rows: vec![vec!["x".into()], vec!["Rust".into(), "AWS".into(), "7".into(), "extra".into()]],
        };
        let result = EmployeeTable::from_table(table.clone(), &RosterColumns::default());
        assert!(matches!(result, Err(Error::Load(_))));

        let table = RawTable {
            rows: vec![table.rows[1].clone()],
            ..table
        };
        let employees = EmployeeTable::from_table(table, &RosterColumns::default()).unwrap();
        let record = employees.get("7").unwrap();
        assert_eq!(record.values(), &["rust", "aws", "7"]);
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let table = RawTable::from_strs(
            &["Employee ID", "Skills", "Certification"],
            &[&["7", "a", ""], &[" 7 ", "b", ""]],
        );
        let err = EmployeeTable::from_table(table, &RosterColumns::default()).unwrap_err();
        assert!(matches!(err, Error::Load(msg) if msg.contains("duplicate")));
    }

    #[test]
    fn test_missing_column_rejected() {
        let table = RawTable::from_strs(&["Employee ID", "Skills"], &[&["1", "x"]]);
        assert!(matches!(
            EmployeeTable::from_table(table, &RosterColumns::default()),
            Err(Error::Load(_))
        ));
    }

    #[test]
    fn test_lookup_by_id() {
        let table = EmployeeTable::from_table(raw(), &RosterColumns::default()).unwrap();
        assert_eq!(table.get("2").map(|r| r.id()), Some("2"));
        assert!(table.get("42").is_none());
    }
}
