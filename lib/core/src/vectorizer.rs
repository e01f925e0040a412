//! TF-IDF vectorizer fitted on the vocabulary labels.
//!
//! Tokens are runs of two or more word characters (alphanumeric or `_`)
//! after lowercasing. Feature ids follow the lexicographic order of the
//! terms, so fitting the same labels always yields the same feature space.

use crate::vector::SparseVector;
use crate::{Error, Result};
use ahash::{AHashMap, AHashSet};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorizerConfig {
    /// Inclusive word n-gram range, `(1, 1)` for plain unigrams.
    pub ngram_range: (usize, usize),
    /// Drop terms that occur in fewer than this many labels.
    pub min_df: usize,
    /// Use `1 + ln(tf)` instead of the raw term count.
    pub sublinear_tf: bool,
    /// Add one to document frequencies as if an extra label held every term.
    pub smooth_idf: bool,
}

impl Default for VectorizerConfig {
    fn default() -> Self {
        Self {
            ngram_range: (1, 1),
            min_df: 1,
            sublinear_tf: false,
            smooth_idf: true,
        }
    }
}

impl VectorizerConfig {
    pub fn validate(&self) -> Result<()> {
        let (min_n, max_n) = self.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(Error::InvalidConfig(format!(
                "invalid ngram range ({}, {})",
                min_n, max_n
            )));
        }
        if self.min_df == 0 {
            return Err(Error::InvalidConfig("min_df must be at least 1".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    config: VectorizerConfig,
    vocabulary: AHashMap<String, u32>,
    idf: Vec<f32>,
}

impl TfidfVectorizer {
    /// Learn the term vocabulary and idf weights from `documents`.
    pub fn fit<S: AsRef<str>>(documents: &[S], config: VectorizerConfig) -> Result<Self> {
        config.validate()?;
        if documents.is_empty() {
            return Err(Error::Training("no documents to fit".to_string()));
        }

        let mut doc_freq: AHashMap<String, usize> = AHashMap::new();
        for doc in documents {
            let unique: AHashSet<String> = analyze(doc.as_ref(), config.ngram_range)
                .into_iter()
                .collect();
            for term in unique {
                *doc_freq.entry(term).or_insert(0) += 1;
            }
        }

        let mut terms: Vec<(String, usize)> = doc_freq
            .into_iter()
            .filter(|(_, df)| *df >= config.min_df)
            .collect();
        if terms.is_empty() {
            return Err(Error::Training(
                "empty vocabulary; labels contain no terms of two or more characters".to_string(),
            ));
        }
        terms.sort_unstable_by(|a, b| a.0.cmp(&b.0));

        let n = documents.len() as f64;
        let mut vocabulary = AHashMap::with_capacity(terms.len());
        let mut idf = Vec::with_capacity(terms.len());
        for (id, (term, df)) in terms.into_iter().enumerate() {
            let df = df as f64;
            let weight = if config.smooth_idf {
                ((1.0 + n) / (1.0 + df)).ln() + 1.0
            } else {
                (n / df).ln() + 1.0
            };
            idf.push(weight as f32);
            vocabulary.insert(term, id as u32);
        }

        tracing::debug!(features = idf.len(), documents = documents.len(), "Fitted TF-IDF vectorizer");
        Ok(Self { config, vocabulary, idf })
    }

    /// L2-normalized TF-IDF vector of `text`. Unknown terms are ignored,
    /// so text sharing no term with the vocabulary maps to the zero vector.
    pub fn transform(&self, text: &str) -> SparseVector {
        let mut counts: AHashMap<u32, f32> = AHashMap::new();
        for term in analyze(text, self.config.ngram_range) {
            if let Some(&id) = self.vocabulary.get(&term) {
                *counts.entry(id).or_insert(0.0) += 1.0;
            }
        }

        let pairs = counts
            .into_iter()
            .map(|(id, tf)| {
                let tf = if self.config.sublinear_tf { 1.0 + tf.ln() } else { tf };
                (id, tf * self.idf[id as usize])
            })
            .collect();
        let mut vector = SparseVector::from_pairs(self.idf.len(), pairs);
        vector.normalize();
        vector
    }

    #[inline]
    pub fn n_features(&self) -> usize {
        self.idf.len()
    }

    pub fn config(&self) -> &VectorizerConfig {
        &self.config
    }

    pub fn feature_id(&self, term: &str) -> Option<u32> {
        self.vocabulary.get(term).copied()
    }

    pub fn idf(&self, term: &str) -> Option<f32> {
        self.feature_id(term).map(|id| self.idf[id as usize])
    }
}

/// Lowercased word tokens of two or more characters.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|t| t.chars().count() >= 2)
        .map(str::to_string)
        .collect()
}

fn analyze(text: &str, (min_n, max_n): (usize, usize)) -> Vec<String> {
    let tokens = tokenize(text);
    if min_n == 1 && max_n == 1 {
        return tokens;
    }
    let mut terms = Vec::new();
    for n in min_n..=max_n {
        if n > tokens.len() {
            break;
        }
        for window in tokens.windows(n) {
            terms.push(window.join(" "));
        }
    }
    terms
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_drops_single_chars() {
        assert_eq!(tokenize("C++ & R, Python_3 a"), vec!["python_3"]);
        assert_eq!(tokenize("AWS  Solutions-Architect"), vec!["aws", "solutions", "architect"]);
    }

    #[test]
    fn test_vocabulary_sorted() {
        let v = TfidfVectorizer::fit(&["zeta alpha", "mid"], VectorizerConfig::default()).unwrap();
        assert_eq!(v.n_features(), 3);
        assert_eq!(v.feature_id("alpha"), Some(0));
        assert_eq!(v.feature_id("mid"), Some(1));
        assert_eq!(v.feature_id("zeta"), Some(2));
    }

    #[test]
    fn test_smooth_idf_weights() {
        let docs = ["python programming", "python scripting", "welding"];
        let v = TfidfVectorizer::fit(&docs, VectorizerConfig::default()).unwrap();
        // ln((1+3)/(1+2)) + 1
        let expected = (4.0f64 / 3.0).ln() + 1.0;
        assert!((v.idf("python").unwrap() as f64 - expected).abs() < 1e-6);
        // ln((1+3)/(1+1)) + 1
        let expected = 2.0f64.ln() + 1.0;
        assert!((v.idf("welding").unwrap() as f64 - expected).abs() < 1e-6);
    }

    #[test]
    fn test_transform_unit_length_and_unknown_terms() {
        let v = TfidfVectorizer::fit(&["python programming", "welding"], VectorizerConfig::default())
            .unwrap();
        let q = v.transform("Python programming");
        assert_eq!(q.nnz(), 2);
        assert!((q.norm() - 1.0).abs() < 1e-6);
        assert!(v.transform("underwater basket weaving").is_zero());
    }

    #[test]
    fn test_bigrams() {
        let config = VectorizerConfig {
            ngram_range: (1, 2),
            ..VectorizerConfig::default()
        };
        let v = TfidfVectorizer::fit(&["machine learning engineer"], config).unwrap();
        assert!(v.feature_id("machine learning").is_some());
        assert!(v.feature_id("learning engineer").is_some());
        assert_eq!(v.n_features(), 5);
    }

    #[test]
    fn test_empty_vocabulary_is_training_error() {
        let result = TfidfVectorizer::fit(&["a b c"], VectorizerConfig::default());
        assert!(matches!(result, Err(Error::Training(_))));
    }

    #[test]
    fn test_invalid_config() {
        let config = VectorizerConfig {
            ngram_range: (2, 1),
            ..VectorizerConfig::default()
        };
        assert!(matches!(
            TfidfVectorizer::fit(&["x y"], config),
            Err(Error::InvalidConfig(_))
        ));
    }
}
