//! # skillmatch Matching
//!
//! Resolves skill and certification queries against an employee roster.
//!
//! ## Pipeline
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Query     │────>│  Normalize  │────>│  Semantic   │────>│   Fuzzy     │
//! │ (free text) │     │             │     │ (k labels)  │     │  (roster)   │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//!                                                                    │
//!                                                             ┌──────┴──────┐
//!                                                             │ Intersect   │
//!                                                             │ (skill+cert)│
//!                                                             └─────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use skillmatch_core::{EmployeeTable, MatchColumn, RawTable, RosterColumns,
//!     SemanticMatcher, TrainingConfig, VocabularyIndex};
//! use skillmatch_matching::{MatchConfig, MatchEngine, Threshold};
//! use std::sync::Arc;
//!
//! let vocabulary = VocabularyIndex::from_labels("Skill", ["Python Programming"]).unwrap();
//! let matcher = SemanticMatcher::train(&vocabulary, &TrainingConfig::default()).unwrap();
//! let employees = EmployeeTable::from_table(
//!     RawTable::from_strs(
//!         &["Employee ID", "Skills", "Certification"],
//!         &[&["1", "Advanced Python Programming skills", ""], &["2", "Welding", ""]],
//!     ),
//!     &RosterColumns::default(),
//! ).unwrap();
//!
//! let config = MatchConfig { neighbors: Some(1), ..MatchConfig::default() };
//! let engine = MatchEngine::new(
//!     Arc::new(vocabulary), Arc::new(matcher), Arc::new(employees), config,
//! ).unwrap();
//!
//! let result = engine
//!     .match_field("python programming", MatchColumn::Skill, Threshold::new(80).unwrap())
//!     .unwrap();
//! assert_eq!(result.ids(), vec!["1"]);
//! ```

pub mod config;
pub mod fuzzy;
pub mod result;
pub mod engine;

pub use config::MatchConfig;
pub use fuzzy::{partial_ratio, ratio, FuzzyAnchor, FuzzyFilter, Threshold};
pub use result::{CandidateSet, MatchResult, SearchOutcome};
pub use engine::{MatchEngine, MatchStage, RequestState, SearchRequest};
