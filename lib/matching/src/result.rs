//! Result sets returned by the engine.

use ahash::AHashSet;
use serde::Serialize;
use serde_json::{Map, Value};
use skillmatch_core::{CandidateIndices, EmployeeRecord, EmployeeTable};
use std::sync::Arc;

/// The vocabulary rows nearest to one query and their label texts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateSet {
    pub rows: Vec<usize>,
    pub labels: Vec<String>,
}

impl CandidateSet {
    pub(crate) fn new(rows: CandidateIndices, labels: Vec<String>) -> Self {
        Self {
            rows: rows.into_vec(),
            labels,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Records of the shared roster accepted by a query, in roster order.
#[derive(Debug, Clone)]
pub struct MatchResult {
    table: Arc<EmployeeTable>,
    records: Vec<Arc<EmployeeRecord>>,
}

impl MatchResult {
    pub(crate) fn new(table: Arc<EmployeeTable>, records: Vec<Arc<EmployeeRecord>>) -> Self {
        Self { table, records }
    }

    pub(crate) fn empty(table: Arc<EmployeeTable>) -> Self {
        Self::new(table, Vec::new())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[Arc<EmployeeRecord>] {
        &self.records
    }

    pub fn ids(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.id()).collect()
    }

    pub fn columns(&self) -> &[String] {
        self.table.columns()
    }

    /// Inner join on the identifier. Order follows `self`; each id appears once.
    pub fn intersect(&self, other: &MatchResult) -> MatchResult {
        let other_ids: AHashSet<&str> = other.records.iter().map(|r| r.id()).collect();
        let mut seen: AHashSet<&str> = AHashSet::with_capacity(self.records.len());
        let mut records = Vec::new();
        for record in &self.records {
            let id = record.id();
            if other_ids.contains(id) && seen.insert(id) {
                records.push(record.clone());
            }
        }
        MatchResult::new(self.table.clone(), records)
    }

    /// One JSON object per record, keyed by the roster headers.
    pub fn to_json(&self) -> Value {
        let columns = self.table.columns();
        Value::Array(
            self.records
                .iter()
                .map(|record| {
                    let object: Map<String, Value> = columns
                        .iter()
                        .zip(record.values())
                        .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                        .collect();
                    Value::Object(object)
                })
                .collect(),
        )
    }
}

/// Everything a two-field search produced.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub skill: Option<MatchResult>,
    pub certification: Option<MatchResult>,
    /// Present only when both fields were queried.
    pub combined: Option<MatchResult>,
}

impl SearchOutcome {
    pub fn to_json(&self) -> Value {
        let render = |r: &Option<MatchResult>| r.as_ref().map_or(Value::Null, MatchResult::to_json);
        serde_json::json!({
            "skill_employees": render(&self.skill),
            "cert_employees": render(&self.certification),
            "both_matching_employees": render(&self.combined),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skillmatch_core::{RawTable, RosterColumns};

    fn table() -> Arc<EmployeeTable> {
        Arc::new(
            EmployeeTable::from_table(
                RawTable::from_strs(
                    &["Employee ID", "Name", "Skills", "Certification"],
                    &[
                        &["1", "Ada", "python", "aws"],
                        &["2", "Grace", "cobol", "azure"],
                        &["3", "Linus", "c", "aws"],
                    ],
                ),
                &RosterColumns::default(),
            )
            .unwrap(),
        )
    }

    fn subset(table: &Arc<EmployeeTable>, ids: &[&str]) -> MatchResult {
        let records = ids.iter().filter_map(|id| table.get(id).cloned()).collect();
        MatchResult::new(table.clone(), records)
    }

    #[test]
    fn test_intersect_by_id() {
        let t = table();
        let skill = subset(&t, &["1", "2"]);
        let cert = subset(&t, &["2", "3"]);
        assert_eq!(skill.intersect(&cert).ids(), vec!["2"]);
        assert!(skill.intersect(&MatchResult::empty(t.clone())).is_empty());
    }

    #[test]
    fn test_intersect_no_duplicates() {
        let t = table();
        let left = subset(&t, &["1", "1", "3"]);
        let right = subset(&t, &["3", "1"]);
        assert_eq!(left.intersect(&right).ids(), vec!["1", "3"]);
    }

    #[test]
    fn test_to_json_keys() {
        let t = table();
        let json = subset(&t, &["1"]).to_json();
        assert_eq!(json[0]["Employee ID"], "1");
        assert_eq!(json[0]["Name"], "Ada");
        assert_eq!(json[0]["Skills"], "python");
    }

    #[test]
    fn test_outcome_json_nulls() {
        let t = table();
        let outcome = SearchOutcome {
            skill: Some(subset(&t, &["1"])),
            certification: None,
            combined: None,
        };
        let json = outcome.to_json();
        assert_eq!(json["skill_employees"].as_array().map(Vec::len), Some(1));
        assert!(json["cert_employees"].is_null());
        assert!(json["both_matching_employees"].is_null());
    }
}
