//! # skillmatch
//!
//! Resolves free-text skill and certification queries against an employee
//! roster.
//!
//! A query is normalized, mapped to its nearest labels in a controlled
//! vocabulary by a TF-IDF nearest-neighbour model, then roster rows are kept
//! when their field text fuzzily contains the query. Two queries can be
//! joined on the employee identifier.
//!
//! ## Quick Start
//!
//! ### As a CLI
//!
//! ```bash
//! skillmatch train --vocabulary skills.csv --output skill_classifier.skm
//! skillmatch query --vocabulary skills.csv --employees roster.csv \
//!     --model skill_classifier.skm --skip-rows 2 --skill "python programming"
//! ```
//!
//! ### As a Library
//!
//! ```rust,no_run
//! use skillmatch::prelude::*;
//! use std::path::PathBuf;
//!
//! let engine = Loader::new(DataPaths {
//!     vocabulary: PathBuf::from("skills.csv"),
//!     employees: PathBuf::from("roster.csv"),
//!     model: PathBuf::from("skill_classifier.skm"),
//! })
//! .load()?;
//!
//! let result = engine.match_field("Python Programming", MatchColumn::Skill, Threshold::DEFAULT)?;
//! println!("{}", result.to_json());
//! # Ok::<(), skillmatch::Error>(())
//! ```
//!
//! ## Crate Structure
//!
//! - `skillmatch-core` - normalization, tables, TF-IDF vectorizer, neighbour index
//! - `skillmatch-matching` - fuzzy filter, match engine, results
//! - `skillmatch-storage` - CSV sources, model artifacts, startup loading

pub use skillmatch_core::{
    normalize, EmployeeRecord, EmployeeTable, Error, ErrorKind, MatchColumn, Metric,
    NeighborIndex, RawTable, Result, RosterColumns, SemanticMatcher, TableSource,
    TfidfVectorizer, TrainingConfig, VectorizerConfig, VocabularyIndex,
};

pub use skillmatch_matching::{
    partial_ratio, CandidateSet, FuzzyAnchor, FuzzyFilter, MatchConfig, MatchEngine, MatchResult,
    MatchStage, SearchOutcome, SearchRequest, Threshold,
};

pub use skillmatch_storage::{
    train_from_csv, ArtifactMetadata, CsvOptions, CsvTable, DataPaths, Loader, ModelArtifact,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        normalize, EmployeeTable, Error, MatchColumn, MatchConfig, MatchEngine, MatchResult,
        Result, SearchRequest, SemanticMatcher, Threshold, TrainingConfig, VocabularyIndex,
        CsvOptions, DataPaths, Loader, ModelArtifact,
    };
}
