use crate::neighbors::{CandidateIndices, Metric, NeighborIndex};
use crate::normalize::normalize;
use crate::vectorizer::{TfidfVectorizer, VectorizerConfig};
use crate::vocabulary::VocabularyIndex;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Settings for building a matcher from a vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub vectorizer: VectorizerConfig,
    pub metric: Metric,
    pub neighbors: usize,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            vectorizer: VectorizerConfig::default(),
            metric: Metric::Euclidean,
            neighbors: 5,
        }
    }
}

/// Maps a normalized query to the closest vocabulary rows.
///
/// Immutable once built; share it behind an `Arc`.
#[derive(Debug, Clone)]
pub struct SemanticMatcher {
    vectorizer: TfidfVectorizer,
    index: NeighborIndex,
}

impl SemanticMatcher {
    /// Pair a vectorizer with an index built from its output.
    pub fn new(vectorizer: TfidfVectorizer, index: NeighborIndex) -> Result<Self> {
        if vectorizer.n_features() != index.dim() {
            return Err(Error::ModelLoad(format!(
                "vectorizer has {} features but the neighbour index expects {}",
                vectorizer.n_features(),
                index.dim()
            )));
        }
        if index.is_empty() {
            return Err(Error::ModelLoad("neighbour index has no rows".to_string()));
        }
        Ok(Self { vectorizer, index })
    }

    /// Fit the vectorizer on the vocabulary labels and index every row.
    pub fn train(vocabulary: &VocabularyIndex, config: &TrainingConfig) -> Result<Self> {
        if config.neighbors == 0 {
            return Err(Error::InvalidConfig("neighbors must be at least 1".to_string()));
        }
        let labels: Vec<String> = vocabulary.labels().iter().map(|l| normalize(l)).collect();
        let vectorizer = TfidfVectorizer::fit(&labels, config.vectorizer.clone())?;

        let mut index = NeighborIndex::new(vectorizer.n_features(), config.metric, config.neighbors);
        for label in &labels {
            index.push(vectorizer.transform(label))?;
        }

        tracing::info!(
            rows = index.len(),
            features = vectorizer.n_features(),
            metric = %config.metric,
            "Trained semantic matcher"
        );
        Self::new(vectorizer, index)
    }

    /// Vocabulary row positions nearest to `normalized_query`, closest first.
    pub fn nearest(&self, normalized_query: &str, k: usize) -> Result<CandidateIndices> {
        let k = if k > self.index.len() {
            tracing::warn!(
                requested = k,
                available = self.index.len(),
                "Neighbour count exceeds vocabulary size, clamping"
            );
            self.index.len()
        } else {
            k
        };
        let query = self.vectorizer.transform(normalized_query);
        self.index.nearest(&query, k)
    }

    /// Number of indexed vocabulary rows.
    #[inline]
    pub fn cardinality(&self) -> usize {
        self.index.len()
    }

    pub fn vectorizer(&self) -> &TfidfVectorizer {
        &self.vectorizer
    }

    pub fn index(&self) -> &NeighborIndex {
        &self.index
    }

    pub fn into_parts(self) -> (TfidfVectorizer, NeighborIndex) {
        (self.vectorizer, self.index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocabulary() -> VocabularyIndex {
        VocabularyIndex::from_labels(
            "Skill",
            [
                "Python Programming",
                "Java Programming",
                "Welding",
                "AWS Solutions Architect",
                "Project Management",
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_nearest_finds_matching_label() {
        let matcher = SemanticMatcher::train(&vocabulary(), &TrainingConfig::default()).unwrap();
        let hits = matcher.nearest("python programming", 2).unwrap();
        assert_eq!(hits[0], 0);
        assert_eq!(hits[1], 1);
    }

    #[test]
    fn test_nearest_deterministic() {
        let matcher = SemanticMatcher::train(&vocabulary(), &TrainingConfig::default()).unwrap();
        let first = matcher.nearest("aws architect", 5).unwrap();
        for _ in 0..5 {
            assert_eq!(matcher.nearest("aws architect", 5).unwrap(), first);
        }
        assert_eq!(first[0], 3);
    }

    #[test]
    fn test_unknown_query_falls_back_to_row_order() {
        let config = TrainingConfig {
            metric: Metric::Cosine,
            ..TrainingConfig::default()
        };
        let matcher = SemanticMatcher::train(&vocabulary(), &config).unwrap();
        // zero vector: every row is at cosine distance 1
        let hits = matcher.nearest("underwater basket weaving", 3).unwrap();
        assert_eq!(hits.as_slice(), &[0, 1, 2]);
    }

    #[test]
    fn test_k_clamped() {
        let matcher = SemanticMatcher::train(&vocabulary(), &TrainingConfig::default()).unwrap();
        assert_eq!(matcher.nearest("welding", 99).unwrap().len(), 5);
        assert_eq!(matcher.cardinality(), 5);
    }

    #[test]
    fn test_mismatched_parts_rejected() {
        let matcher = SemanticMatcher::train(&vocabulary(), &TrainingConfig::default()).unwrap();
        let (vectorizer, _) = matcher.into_parts();
        let index = NeighborIndex::new(vectorizer.n_features() + 1, Metric::Euclidean, 5);
        assert!(matches!(
            SemanticMatcher::new(vectorizer, index),
            Err(Error::ModelLoad(_))
        ));
    }
}
