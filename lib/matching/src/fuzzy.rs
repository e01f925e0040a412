//! Partial-ratio scoring and the per-record acceptance filter.
//!
//! All scores are integers on a 0-100 scale and computed over `char`s, so
//! multi-byte text is compared character by character.

use ahash::AHashMap;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use skillmatch_core::{normalize, EmployeeRecord, EmployeeTable, Error, MatchColumn, Result};
use std::sync::Arc;

/// Minimum partial-ratio score for a record to be accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Threshold(u8);

impl Threshold {
    pub const DEFAULT: Threshold = Threshold(93);

    pub fn new(value: u32) -> Result<Self> {
        if value > 100 {
            return Err(Error::InvalidThreshold(value));
        }
        Ok(Self(value as u8))
    }

    #[inline]
    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for Threshold {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<u32> for Threshold {
    type Error = Error;

    fn try_from(value: u32) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Threshold> for u32 {
    fn from(t: Threshold) -> u32 {
        u32::from(t.0)
    }
}

impl std::fmt::Display for Threshold {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which text is scored against a record's field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FuzzyAnchor {
    /// Score the query itself; the candidate labels only gate acceptance.
    #[default]
    Query,
    /// Score each normalized candidate label.
    Label,
}

/// Strings at least this long have their most frequent characters dropped
/// from the match index, like a Ratcliff/Obershelp matcher's autojunk rule.
const POPULAR_MIN_LEN: usize = 200;

type Block = (usize, usize, usize);

fn index_positions(b: &[char]) -> AHashMap<char, Vec<usize>> {
    let mut positions: AHashMap<char, Vec<usize>> = AHashMap::new();
    for (j, &c) in b.iter().enumerate() {
        positions.entry(c).or_default().push(j);
    }
    if b.len() >= POPULAR_MIN_LEN {
        let limit = b.len() / 100 + 1;
        positions.retain(|_, js| js.len() <= limit);
    }
    positions
}

/// Longest common run of `a[alo..ahi]` and `b[blo..bhi]`; the earliest in
/// `a` wins ties, then the earliest in `b`.
fn longest_match(
    a: &[char],
    b: &[char],
    positions: &AHashMap<char, Vec<usize>>,
    (alo, ahi, blo, bhi): (usize, usize, usize, usize),
) -> Block {
    let (mut best_i, mut best_j, mut best_k) = (alo, blo, 0);
    let mut run_ending_at: AHashMap<usize, usize> = AHashMap::new();
    for (i, c) in a.iter().enumerate().take(ahi).skip(alo) {
        let mut next: AHashMap<usize, usize> = AHashMap::new();
        for &j in positions.get(c).map(Vec::as_slice).unwrap_or(&[]) {
            if j < blo {
                continue;
            }
            if j >= bhi {
                break;
            }
            let k = j
                .checked_sub(1)
                .and_then(|prev| run_ending_at.get(&prev))
                .copied()
                .unwrap_or(0)
                + 1;
            next.insert(j, k);
            if k > best_k {
                (best_i, best_j, best_k) = (i + 1 - k, j + 1 - k, k);
            }
        }
        run_ending_at = next;
    }

    // characters left out of the index can still extend a run
    while best_i > alo && best_j > blo && a[best_i - 1] == b[best_j - 1] {
        best_i -= 1;
        best_j -= 1;
        best_k += 1;
    }
    while best_i + best_k < ahi && best_j + best_k < bhi && a[best_i + best_k] == b[best_j + best_k] {
        best_k += 1;
    }
    (best_i, best_j, best_k)
}

/// Non-adjacent matching blocks `(i, j, len)` of `a` in `b`, in order, closed
/// by the `(a.len(), b.len(), 0)` sentinel.
fn matching_blocks(a: &[char], b: &[char]) -> Vec<Block> {
    let positions = index_positions(b);
    let mut pending = vec![(0, a.len(), 0, b.len())];
    let mut blocks = Vec::new();
    while let Some(range) = pending.pop() {
        let (alo, ahi, blo, bhi) = range;
        let (i, j, k) = longest_match(a, b, &positions, range);
        if k > 0 {
            blocks.push((i, j, k));
            if alo < i && blo < j {
                pending.push((alo, i, blo, j));
            }
            if i + k < ahi && j + k < bhi {
                pending.push((i + k, ahi, j + k, bhi));
            }
        }
    }
    blocks.sort_unstable();

    let mut merged = Vec::with_capacity(blocks.len() + 1);
    let (mut i1, mut j1, mut k1) = (0, 0, 0);
    for (i2, j2, k2) in blocks {
        if i1 + k1 == i2 && j1 + k1 == j2 {
            k1 += k2;
        } else {
            if k1 > 0 {
                merged.push((i1, j1, k1));
            }
            (i1, j1, k1) = (i2, j2, k2);
        }
    }
    if k1 > 0 {
        merged.push((i1, j1, k1));
    }
    merged.push((a.len(), b.len(), 0));
    merged
}

/// `2 * matched / (|a| + |b|)` over the matching blocks.
fn similarity(a: &[char], b: &[char]) -> f64 {
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    let matched: usize = matching_blocks(a, b).iter().map(|&(_, _, k)| k).sum();
    (2 * matched) as f64 / total as f64
}

/// Scale to 0-100, rounding halves to even.
fn to_score(similarity: f64) -> u8 {
    let x = similarity * 100.0;
    let floor = x.floor();
    let rounded = match (x - floor).partial_cmp(&0.5) {
        Some(std::cmp::Ordering::Greater) => floor + 1.0,
        Some(std::cmp::Ordering::Equal) if floor % 2.0 != 0.0 => floor + 1.0,
        _ => floor,
    };
    rounded.clamp(0.0, 100.0) as u8
}

/// Whole-string similarity on the 0-100 scale.
pub fn ratio(a: &str, b: &str) -> u8 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    to_score(similarity(&a, &b))
}

/// Best similarity between the shorter string and a window of the longer
/// one. Each matching block anchors one window of the shorter string's
/// length, starting where the block would align the two strings (never
/// before the start of the longer string). Only the end of a window can run
/// past the longer string.
///
/// Either side empty scores 0.
pub fn partial_ratio(a: &str, b: &str) -> u8 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    let (short, long) = if a.len() <= b.len() { (&a, &b) } else { (&b, &a) };

    let mut best = 0.0f64;
    for (i, j, _) in matching_blocks(short, long) {
        let start = j.saturating_sub(i);
        let end = (start + short.len()).min(long.len());
        let sim = similarity(short, &long[start..end]);
        if sim > 0.995 {
            return 100;
        }
        best = best.max(sim);
    }
    to_score(best)
}

/// Decides which roster records a query's candidate labels accept.
#[derive(Debug, Clone, Copy, Default)]
pub struct FuzzyFilter {
    anchor: FuzzyAnchor,
}

impl FuzzyFilter {
    pub fn new(anchor: FuzzyAnchor) -> Self {
        Self { anchor }
    }

    pub fn anchor(&self) -> FuzzyAnchor {
        self.anchor
    }

    /// True iff some candidate label yields a score `>= threshold` for `field_text`.
    pub fn accepts(
        &self,
        normalized_query: &str,
        field_text: &str,
        candidate_labels: &[String],
        threshold: Threshold,
    ) -> bool {
        match self.anchor {
            FuzzyAnchor::Query => {
                !candidate_labels.is_empty()
                    && partial_ratio(normalized_query, field_text) >= threshold.get()
            }
            FuzzyAnchor::Label => candidate_labels
                .iter()
                .any(|label| partial_ratio(&normalize(label), field_text) >= threshold.get()),
        }
    }

    /// Records of `table` whose `column` text is accepted, in table order.
    pub fn filter(
        &self,
        table: &EmployeeTable,
        column: MatchColumn,
        normalized_query: &str,
        candidate_labels: &[String],
        threshold: Threshold,
    ) -> Vec<Arc<EmployeeRecord>> {
        if candidate_labels.is_empty() {
            return Vec::new();
        }
        let t = threshold.get();
        let labels: Vec<String> = match self.anchor {
            FuzzyAnchor::Query => Vec::new(),
            FuzzyAnchor::Label => candidate_labels.iter().map(|l| normalize(l)).collect(),
        };
        let anchor = self.anchor;

        table
            .records()
            .par_iter()
            .filter(|record| {
                // text columns are normalized when the table is built
                let field = table.text(record, column);
                match anchor {
                    FuzzyAnchor::Query => partial_ratio(normalized_query, field) >= t,
                    FuzzyAnchor::Label => labels.iter().any(|l| partial_ratio(l, field) >= t),
                }
            })
            .cloned()
            .collect()
    }
}
