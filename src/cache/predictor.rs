//! Access Predictor Module
//!
//! Frequency and co-occurrence heuristics that rank keys likely to be
//! requested next. Rankings are hints for preloading, nothing depends on them
//! being right.

use std::collections::{HashMap, VecDeque};

use indexmap::IndexMap;

// == Public Constants ==
/// Distinct keys kept in the co-occurrence window
pub const WINDOW_SIZE: usize = 5;

/// Keys taken from the frequency ranking
pub const FREQUENCY_PICKS: usize = 5;

/// Keys taken from each key's correlation ranking
pub const CORRELATION_PICKS: usize = 3;

/// Upper bound on a single prediction
pub const MAX_PREDICTIONS: usize = 10;

// == Access Predictor ==
/// Learns from writes and ranks keys for speculative preloading.
///
/// Maps keep first-seen order so equal counts rank deterministically.
#[derive(Debug, Default)]
pub struct AccessPredictor {
    /// Times each key was learned
    frequency: IndexMap<String, u64>,
    /// key -> (key seen shortly before it -> count)
    correlations: IndexMap<String, IndexMap<String, u64>>,
    /// Most recent distinct keys, oldest first
    recent_window: VecDeque<String>,
    /// Last reported access timestamps per key
    access_patterns: HashMap<String, Vec<u64>>,
    /// Upper bound on tracked keys, None = unbounded
    max_tracked_keys: Option<usize>,
}

impl AccessPredictor {
    // == Constructor ==
    pub fn new() -> Self {
        Self::default()
    }

    /// Bounds the number of distinct keys tracked.
    ///
    /// Past the bound the least frequently learned key (earliest seen on ties)
    /// is forgotten. Zero means unbounded.
    pub fn with_max_tracked_keys(mut self, max: usize) -> Self {
        self.max_tracked_keys = (max > 0).then_some(max);
        self
    }

    // == Learn ==
    /// Records a write of `key`.
    pub fn learn(&mut self, key: &str) {
        *self.frequency.entry(key.to_string()).or_insert(0) += 1;

        if self.recent_window.iter().any(|k| k != key) {
            let row = self.correlations.entry(key.to_string()).or_default();
            for other in self.recent_window.iter().filter(|k| *k != key) {
                *row.entry(other.clone()).or_insert(0) += 1;
            }
        }

        if let Some(pos) = self.recent_window.iter().position(|k| k == key) {
            self.recent_window.remove(pos);
        }
        self.recent_window.push_back(key.to_string());
        while self.recent_window.len() > WINDOW_SIZE {
            self.recent_window.pop_front();
        }

        self.enforce_bound(key);
    }

    // == Update Access Pattern ==
    /// Stores the access history reported for `key`.
    ///
    /// Kept for temporal heuristics; does not affect rankings.
    pub fn update_access_pattern(&mut self, key: &str, timestamps: &[u64]) {
        self.access_patterns
            .insert(key.to_string(), timestamps.to_vec());
    }

    // == Predict ==
    /// Ranks up to [`MAX_PREDICTIONS`] keys.
    ///
    /// The most frequent keys come first, followed by the strongest
    /// correlations of every key that has any. Duplicates keep their first
    /// position.
    pub fn predict(&self) -> Vec<String> {
        let mut predictions: Vec<String> = Vec::with_capacity(MAX_PREDICTIONS);

        let correlated = self
            .correlations
            .values()
            .flat_map(|row| top_by_count(row, CORRELATION_PICKS));

        for key in top_by_count(&self.frequency, FREQUENCY_PICKS).chain(correlated) {
            if predictions.len() >= MAX_PREDICTIONS {
                break;
            }
            if !predictions.iter().any(|k| k == key) {
                predictions.push(key.clone());
            }
        }

        predictions
    }

    // == Reset ==
    pub fn reset(&mut self) {
        self.frequency.clear();
        self.correlations.clear();
        self.recent_window.clear();
        self.access_patterns.clear();
    }

    // == Accessors ==
    pub fn frequency(&self, key: &str) -> u64 {
        self.frequency.get(key).copied().unwrap_or(0)
    }

    /// Times `other` was in the window when `key` was learned.
    pub fn correlation(&self, key: &str, other: &str) -> u64 {
        self.correlations
            .get(key)
            .and_then(|row| row.get(other))
            .copied()
            .unwrap_or(0)
    }

    pub fn access_pattern(&self, key: &str) -> Option<&[u64]> {
        self.access_patterns.get(key).map(Vec::as_slice)
    }

    pub fn recent_window(&self) -> Vec<&str> {
        self.recent_window.iter().map(String::as_str).collect()
    }

    pub fn tracked_keys(&self) -> usize {
        self.frequency.len()
    }

    // == Bound Enforcement ==
    fn enforce_bound(&mut self, just_learned: &str) {
        let Some(max) = self.max_tracked_keys else {
            return;
        };

        while self.frequency.len() > max {
            let victim = self
                .frequency
                .iter()
                .filter(|(k, _)| k.as_str() != just_learned)
                .min_by_key(|(_, count)| **count)
                .map(|(k, _)| k.clone());

            match victim {
                Some(victim) => self.forget(&victim),
                None => break,
            }
        }
    }

    fn forget(&mut self, key: &str) {
        self.frequency.shift_remove(key);
        self.correlations.shift_remove(key);
        for row in self.correlations.values_mut() {
            row.shift_remove(key);
        }
        self.correlations.retain(|_, row| !row.is_empty());
        if let Some(pos) = self.recent_window.iter().position(|k| k == key) {
            self.recent_window.remove(pos);
        }
        self.access_patterns.remove(key);
    }
}

/// Keys of `map` by descending count; the sort is stable so ties keep map order.
fn top_by_count(map: &IndexMap<String, u64>, n: usize) -> impl Iterator<Item = &String> {
    let mut ranked: Vec<(&String, &u64)> = map.iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(a.1));
    ranked.into_iter().take(n).map(|(k, _)| k)
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn learned(keys: &[&str]) -> AccessPredictor {
        let mut predictor = AccessPredictor::new();
        for key in keys {
            predictor.learn(key);
        }
        predictor
    }

    #[test]
    fn test_frequency_ranking() {
        let predictor = learned(&["a", "a", "a", "b", "b", "c"]);
        let predictions = predictor.predict();

        assert_eq!(&predictions[..3], &["a", "b", "c"]);
        assert_eq!(predictor.frequency("a"), 3);
        assert_eq!(predictor.frequency("b"), 2);
        assert_eq!(predictor.frequency("c"), 1);
    }

    #[test]
    fn test_frequency_ties_keep_first_seen_order() {
        let predictor = learned(&["x", "y", "z"]);
        assert_eq!(predictor.predict(), vec!["x", "y", "z"]);
    }

    #[test]
    fn test_correlations_are_directional() {
        let predictor = learned(&["a", "b"]);

        assert_eq!(predictor.correlation("b", "a"), 1);
        assert_eq!(predictor.correlation("a", "b"), 0);
    }

    #[test]
    fn test_no_self_correlation() {
        let predictor = learned(&["a", "a", "a"]);
        assert_eq!(predictor.correlation("a", "a"), 0);
    }

    #[test]
    fn test_window_holds_distinct_keys() {
        let predictor = learned(&["a", "b", "a"]);
        assert_eq!(predictor.recent_window(), vec!["b", "a"]);
    }

    #[test]
    fn test_window_is_bounded() {
        let predictor = learned(&["k1", "k2", "k3", "k4", "k5", "k6", "k7"]);

        assert_eq!(predictor.recent_window(), vec!["k3", "k4", "k5", "k6", "k7"]);
        // k7 only saw k2..k6 in the window
        assert_eq!(predictor.correlation("k7", "k1"), 0);
        assert_eq!(predictor.correlation("k7", "k2"), 1);
    }

    #[test]
    fn test_correlated_keys_extend_frequency_picks() {
        let keys: Vec<String> = (0..8).map(|i| format!("k{i}")).collect();
        let refs: Vec<&str> = keys.iter().map(String::as_str).collect();
        let predictor = learned(&refs);

        let predictions = predictor.predict();

        // Top five by frequency are the first five seen, then correlations fill in
        assert_eq!(&predictions[..5], &["k0", "k1", "k2", "k3", "k4"]);
        assert!(predictions.len() <= MAX_PREDICTIONS);
        let unique: HashSet<&String> = predictions.iter().collect();
        assert_eq!(unique.len(), predictions.len());
    }

    #[test]
    fn test_correlation_picks_take_top_three_by_count() {
        // x is learned after each of a, b, c, d, so the window gives it
        // a=4, b=3, c=2, d=1. The h keys are learned twice each afterwards
        // to push a..d out of the frequency picks.
        let predictor = learned(&[
            "a", "x", "b", "x", "c", "x", "d", "x", "h1", "h2", "h3", "h4", "h5", "h1", "h2", "h3",
            "h4", "h5",
        ]);

        assert_eq!(predictor.correlation("x", "a"), 4);
        assert_eq!(predictor.correlation("x", "b"), 3);
        assert_eq!(predictor.correlation("x", "c"), 2);
        assert_eq!(predictor.correlation("x", "d"), 1);

        let predictions = predictor.predict();

        // frequency: x=4 then the first four h keys at 2
        assert_eq!(&predictions[..FREQUENCY_PICKS], &["x", "h1", "h2", "h3", "h4"]);
        // x's row is the first correlation row and contributes its top three in count order
        assert_eq!(&predictions[FREQUENCY_PICKS..], &["a", "b", "c"]);
        assert!(!predictions.iter().any(|k| k == "d"));
    }

    #[test]
    fn test_correlation_ties_keep_first_seen_order() {
        // w sees p, q, r, s once each in that order
        let predictor = learned(&["p", "q", "r", "s", "w"]);
        let row: Vec<&String> = top_by_count(&predictor.correlations["w"], CORRELATION_PICKS).collect();

        assert_eq!(row, vec!["p", "q", "r"]);
    }

    #[test]
    fn test_predictions_capped() {
        let keys: Vec<String> = (0..50).map(|i| format!("k{i}")).collect();
        let mut predictor = AccessPredictor::new();
        for key in &keys {
            predictor.learn(key);
        }

        assert_eq!(predictor.predict().len(), MAX_PREDICTIONS);
    }

    #[test]
    fn test_access_pattern_storage_does_not_change_rankings() {
        let mut predictor = learned(&["a", "b"]);
        let before = predictor.predict();

        predictor.update_access_pattern("a", &[1, 2, 3]);

        assert_eq!(predictor.access_pattern("a"), Some(&[1u64, 2, 3][..]));
        assert_eq!(predictor.frequency("a"), 1);
        assert_eq!(predictor.predict(), before);
    }

    #[test]
    fn test_reset() {
        let mut predictor = learned(&["a", "b", "c"]);
        predictor.update_access_pattern("a", &[1]);

        predictor.reset();

        assert!(predictor.predict().is_empty());
        assert_eq!(predictor.tracked_keys(), 0);
        assert!(predictor.recent_window().is_empty());
        assert!(predictor.access_pattern("a").is_none());
    }

    #[test]
    fn test_bounded_tracking_forgets_least_frequent() {
        let mut predictor = AccessPredictor::new().with_max_tracked_keys(2);

        predictor.learn("hot");
        predictor.learn("hot");
        predictor.learn("cold");
        predictor.learn("new");

        assert_eq!(predictor.tracked_keys(), 2);
        assert_eq!(predictor.frequency("cold"), 0);
        assert_eq!(predictor.frequency("hot"), 2);
        assert_eq!(predictor.frequency("new"), 1);
        assert_eq!(predictor.correlation("new", "cold"), 0);
        assert!(!predictor.recent_window().contains(&"cold"));
    }

    #[test]
    fn test_zero_bound_is_unbounded() {
        let mut predictor = AccessPredictor::new().with_max_tracked_keys(0);
        for i in 0..100 {
            predictor.learn(&format!("k{i}"));
        }
        assert_eq!(predictor.tracked_keys(), 100);
    }
}
