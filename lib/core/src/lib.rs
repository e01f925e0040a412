//! # skillmatch Core
//!
//! Core library for skillmatch.
//!
//! This crate provides the building blocks of the matching engine:
//!
//! - [`normalize`] - Case-folding and whitespace collapsing shared by every stage
//! - [`VocabularyIndex`] - The fixed table of canonical skill labels
//! - [`EmployeeTable`] - The roster, with its text columns normalized at load
//! - [`TfidfVectorizer`] - TF-IDF features fitted on the vocabulary labels
//! - [`NeighborIndex`] - Exact, deterministic nearest-neighbour search
//! - [`SemanticMatcher`] - Query text to the closest vocabulary rows
//!
//! ## Example
//!
//! ```rust
//! use skillmatch_core::{normalize, SemanticMatcher, TrainingConfig, VocabularyIndex};
//!
//! let vocabulary = VocabularyIndex::from_labels(
//!     "Skill",
//!     ["Python Programming", "Welding", "Project Management"],
//! ).unwrap();
//! let matcher = SemanticMatcher::train(&vocabulary, &TrainingConfig::default()).unwrap();
//!
//! let query = normalize("  PYTHON   programming ");
//! let rows = matcher.nearest(&query, 1).unwrap();
//! assert_eq!(vocabulary.label_text(rows[0]).unwrap(), "Python Programming");
//! ```

pub mod error;
pub mod normalize;
pub mod vector;
pub mod table;
pub mod vocabulary;
pub mod record;
pub mod vectorizer;
pub mod neighbors;
pub mod semantic;

pub use error::{Error, ErrorKind, Result};
pub use normalize::{normalize, normalize_opt};
pub use vector::SparseVector;
pub use table::{RawTable, TableSource};
pub use vocabulary::{VocabularyIndex, VocabularyRow};
pub use record::{EmployeeRecord, EmployeeTable, MatchColumn, RosterColumns};
pub use vectorizer::{TfidfVectorizer, VectorizerConfig};
pub use neighbors::{CandidateIndices, Metric, NeighborIndex};
pub use semantic::{SemanticMatcher, TrainingConfig};
