//! The match engine: normalization, neighbour lookup, fuzzy filtering and
//! the identifier join, over data loaded once and shared read-only.
//!
//! Each request walks the stages
//!
//! ```text
//! Idle -> Normalizing -> Matching -> Filtering -> (Intersecting) -> Done
//! ```
//!
//! and any failing stage ends the request in `Failed` with the error kind;
//! no later stage runs after a failure.

use crate::config::MatchConfig;
use crate::fuzzy::{FuzzyFilter, Threshold};
use crate::result::{CandidateSet, MatchResult, SearchOutcome};
use skillmatch_core::{
    normalize, EmployeeTable, Error, ErrorKind, MatchColumn, Result, SemanticMatcher,
    VocabularyIndex,
};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStage {
    Idle,
    Normalizing,
    Matching,
    Filtering,
    Intersecting,
    Done,
    Failed(ErrorKind),
}

impl MatchStage {
    pub fn is_terminal(&self) -> bool {
        matches!(self, MatchStage::Done | MatchStage::Failed(_))
    }
}

/// Stage bookkeeping for one request.
#[derive(Debug, Clone)]
pub struct RequestState {
    stage: MatchStage,
    history: Vec<MatchStage>,
}

impl Default for RequestState {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestState {
    pub fn new() -> Self {
        Self {
            stage: MatchStage::Idle,
            history: vec![MatchStage::Idle],
        }
    }

    pub fn stage(&self) -> MatchStage {
        self.stage
    }

    /// Every stage entered so far, starting with `Idle`.
    pub fn history(&self) -> &[MatchStage] {
        &self.history
    }

    fn advance(&mut self, next: MatchStage) {
        debug_assert!(!self.stage.is_terminal(), "advance after terminal stage");
        tracing::debug!(from = ?self.stage, to = ?next, "match stage");
        self.stage = next;
        self.history.push(next);
    }

    fn fail(&mut self, error: Error) -> Error {
        self.advance(MatchStage::Failed(error.kind()));
        error
    }

    /// Enter `stage`, run `f`, and fail the request if it errors.
    fn run<T>(&mut self, stage: MatchStage, f: impl FnOnce() -> Result<T>) -> Result<T> {
        self.advance(stage);
        f().map_err(|e| self.fail(e))
    }
}

/// Either side of a search; blank input counts as absent.
#[derive(Debug, Clone, Default)]
pub struct SearchRequest {
    pub skill: Option<String>,
    pub certification: Option<String>,
    /// Falls back to the configured threshold.
    pub threshold: Option<Threshold>,
}

impl SearchRequest {
    fn supplied(field: &Option<String>) -> Option<&str> {
        field.as_deref().filter(|q| !normalize(q).is_empty())
    }
}

pub struct MatchEngine {
    vocabulary: Arc<VocabularyIndex>,
    matcher: Arc<SemanticMatcher>,
    employees: Arc<EmployeeTable>,
    filter: FuzzyFilter,
    neighbors: usize,
    config: MatchConfig,
}

impl MatchEngine {
    /// Wire loaded data into an engine. Fails when the matcher's index and
    /// the vocabulary disagree on the number of rows.
    pub fn new(
        vocabulary: Arc<VocabularyIndex>,
        matcher: Arc<SemanticMatcher>,
        employees: Arc<EmployeeTable>,
        config: MatchConfig,
    ) -> Result<Self> {
        config.validate()?;
        if vocabulary.len() != matcher.cardinality() {
            return Err(Error::ModelLoad(format!(
                "model indexes {} rows but the vocabulary has {}",
                matcher.cardinality(),
                vocabulary.len()
            )));
        }
        let neighbors = config.neighbors.unwrap_or_else(|| matcher.index().n_neighbors());
        tracing::info!(
            vocabulary = vocabulary.len(),
            employees = employees.len(),
            neighbors,
            threshold = %config.threshold,
            anchor = ?config.anchor,
            "Match engine ready"
        );
        Ok(Self {
            vocabulary,
            matcher,
            employees,
            filter: FuzzyFilter::new(config.anchor),
            neighbors,
            config,
        })
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Labels fetched per query: the configured override, else the
    /// model's trained count.
    pub fn neighbors(&self) -> usize {
        self.neighbors
    }

    pub fn employees(&self) -> &Arc<EmployeeTable> {
        &self.employees
    }

    pub fn vocabulary(&self) -> &Arc<VocabularyIndex> {
        &self.vocabulary
    }

    /// The `k` nearest labels for an already normalized query.
    pub fn candidates(&self, normalized_query: &str) -> Result<CandidateSet> {
        let rows = self.matcher.nearest(normalized_query, self.neighbors)?;
        let labels = rows
            .iter()
            .map(|&i| self.vocabulary.label_text(i))
            .collect::<Result<Vec<_>>>()?;
        Ok(CandidateSet::new(rows, labels))
    }

    pub fn match_field(&self, query: &str, column: MatchColumn, threshold: Threshold) -> Result<MatchResult> {
        let mut state = RequestState::new();
        self.match_field_traced(query, column, threshold, &mut state)
    }

    /// [`MatchEngine::match_field`] recording its stages in `state`, which
    /// is reset first.
    pub fn match_field_traced(
        &self,
        query: &str,
        column: MatchColumn,
        threshold: Threshold,
        state: &mut RequestState,
    ) -> Result<MatchResult> {
        *state = RequestState::new();
        let result = self.field_stages(query, column, threshold, state)?;
        state.advance(MatchStage::Done);
        Ok(result)
    }

    fn field_stages(
        &self,
        query: &str,
        column: MatchColumn,
        threshold: Threshold,
        state: &mut RequestState,
    ) -> Result<MatchResult> {
        let normalized = state.run(MatchStage::Normalizing, || {
            let normalized = normalize(query);
            if normalized.is_empty() {
                return Err(Error::EmptyQuery {
                    column: self.config.columns.name(column).to_string(),
                });
            }
            Ok(normalized)
        })?;

        let candidates = state.run(MatchStage::Matching, || self.candidates(&normalized))?;
        tracing::debug!(query = %normalized, %column, labels = ?candidates.labels, "candidate labels");

        let records = state.run(MatchStage::Filtering, || {
            Ok(self.filter.filter(
                &self.employees,
                column,
                &normalized,
                &candidates.labels,
                threshold,
            ))
        })?;
        tracing::debug!(query = %normalized, %column, matched = records.len(), "filtered roster");

        Ok(MatchResult::new(self.employees.clone(), records))
    }

    /// Employees matching both queries, joined on the identifier.
    pub fn match_both(&self, skill_query: &str, cert_query: &str, threshold: Threshold) -> Result<MatchResult> {
        let mut state = RequestState::new();
        self.match_both_traced(skill_query, cert_query, threshold, &mut state)
    }

    pub fn match_both_traced(
        &self,
        skill_query: &str,
        cert_query: &str,
        threshold: Threshold,
        state: &mut RequestState,
    ) -> Result<MatchResult> {
        *state = RequestState::new();
        if normalize(skill_query).is_empty() && normalize(cert_query).is_empty() {
            return Err(state.fail(Error::NoCriteria));
        }
        let (skill, cert) = self.match_pair(skill_query, cert_query, threshold, state)?;
        let combined = state.run(MatchStage::Intersecting, || Ok(skill.intersect(&cert)))?;
        state.advance(MatchStage::Done);
        Ok(combined)
    }

    /// Run both field matches concurrently. The shared state mirrors the
    /// stages of the skill side; a failure on either side fails the request.
    fn match_pair(
        &self,
        skill_query: &str,
        cert_query: &str,
        threshold: Threshold,
        state: &mut RequestState,
    ) -> Result<(MatchResult, MatchResult)> {
        let mut cert_state = RequestState::new();
        let (skill, cert) = rayon::join(
            || self.field_stages(skill_query, MatchColumn::Skill, threshold, state),
            || self.field_stages(cert_query, MatchColumn::Certification, threshold, &mut cert_state),
        );
        match (skill, cert) {
            (Ok(skill), Ok(cert)) => Ok((skill, cert)),
            (Err(e), _) => Err(e),
            (Ok(_), Err(e)) => {
                // the skill side finished cleanly; record the certification failure
                state.stage = MatchStage::Failed(e.kind());
                state.history.push(state.stage);
                Err(e)
            }
        }
    }

    /// Query either or both fields; at least one must be non-blank.
    pub fn search(&self, request: &SearchRequest) -> Result<SearchOutcome> {
        let threshold = request.threshold.unwrap_or(self.config.threshold);
        let skill_query = SearchRequest::supplied(&request.skill);
        let cert_query = SearchRequest::supplied(&request.certification);

        let outcome = match (skill_query, cert_query) {
            (None, None) => return Err(Error::NoCriteria),
            (Some(skill), None) => SearchOutcome {
                skill: Some(self.match_field(skill, MatchColumn::Skill, threshold)?),
                certification: None,
                combined: None,
            },
            (None, Some(cert)) => SearchOutcome {
                skill: None,
                certification: Some(self.match_field(cert, MatchColumn::Certification, threshold)?),
                combined: None,
            },
            (Some(skill), Some(cert)) => {
                let mut state = RequestState::new();
                let (skill, cert) = self.match_pair(skill, cert, threshold, &mut state)?;
                let combined = skill.intersect(&cert);
                SearchOutcome {
                    skill: Some(skill),
                    certification: Some(cert),
                    combined: Some(combined),
                }
            }
        };

        tracing::info!(
            skill = outcome.skill.as_ref().map(MatchResult::len),
            certification = outcome.certification.as_ref().map(MatchResult::len),
            combined = outcome.combined.as_ref().map(MatchResult::len),
            %threshold,
            "Search complete"
        );
        Ok(outcome)
    }
}
