// 🔎 Identity Matcher - resolve free-text display names to roster identities
//
// normalize → project into the index's vector space → argmax cosine similarity
// Below the threshold the name stays "Unknown".

use crate::normalizer::normalize_name;
use crate::roster::RosterEntry;
use crate::similarity::SimilarityIndex;

/// Label used for names that resolve to no roster entry
pub const UNKNOWN: &str = "Unknown";

/// Default minimum similarity for a match
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.5;

// ============================================================================
// IDENTITY
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Identity {
    Known(RosterEntry),
    Unknown,
}

impl Identity {
    /// "Identified As" value: the composite roster name or "Unknown"
    pub fn label(&self) -> &str {
        match self {
            Identity::Known(entry) => &entry.composite,
            Identity::Unknown => UNKNOWN,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, Identity::Known(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    pub identity: Identity,

    /// Best cosine similarity observed, even when unresolved
    pub score: f64,
}

// ============================================================================
// IDENTITY MATCHER
// ============================================================================

pub struct IdentityMatcher<'a> {
    index: &'a SimilarityIndex,
    threshold: f64,
}

impl<'a> IdentityMatcher<'a> {
    pub fn new(index: &'a SimilarityIndex) -> Self {
        IdentityMatcher {
            index,
            threshold: DEFAULT_SIMILARITY_THRESHOLD,
        }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Resolve a raw display name.
    ///
    /// Ties on the best score go to the entry that comes first in the roster.
    pub fn identify(&self, raw_name: &str) -> MatchResult {
        let query = normalize_name(raw_name);
        let scores = self.index.scores(&query);

        let mut best: Option<(usize, f64)> = None;
        for (i, &score) in scores.iter().enumerate() {
            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ => best = Some((i, score)),
            }
        }

        let (best_idx, score) = match best {
            Some(b) => b,
            None => {
                return MatchResult {
                    identity: Identity::Unknown,
                    score: 0.0,
                }
            }
        };

        if score < self.threshold {
            return MatchResult {
                identity: Identity::Unknown,
                score,
            };
        }

        let identity = match self.index.roster().get(best_idx) {
            Some(entry) => Identity::Known(entry.clone()),
            None => Identity::Unknown,
        };

        MatchResult { identity, score }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::Roster;
    use proptest::prelude::*;

    fn create_test_index(names: &[&str]) -> SimilarityIndex {
        SimilarityIndex::build(Roster::from_composites(names).unwrap())
    }

    #[test]
    fn test_punctuated_name_resolves() {
        let index = create_test_index(&["Jane Doe [10A]", "John Smith [10B]"]);
        let matcher = IdentityMatcher::new(&index);

        let result = matcher.identify("Jane.Doe");

        assert_eq!(result.identity.label(), "Jane Doe [10A]");
        assert!(result.score >= 0.5);
        match result.identity {
            Identity::Known(entry) => {
                assert_eq!(entry.full_name, "Jane Doe");
                assert_eq!(entry.class, "10A");
            }
            Identity::Unknown => panic!("expected a roster match"),
        }
    }

    #[test]
    fn test_below_threshold_is_unknown_with_score() {
        let index = create_test_index(&["Jane Mary Anne Doe [10A]", "John Smith [10B]"]);

        // Only "jane" is shared: 1 of 5 equally weighted terms
        let result = IdentityMatcher::new(&index).identify("Jane Xavier");

        assert_eq!(result.identity, Identity::Unknown);
        assert!(result.score > 0.0 && result.score < 0.5);
    }

    #[test]
    fn test_no_shared_terms_is_unknown() {
        let index = create_test_index(&["Jane Doe [10A]"]);
        let result = IdentityMatcher::new(&index).identify("xyz123");

        assert_eq!(result.identity.label(), UNKNOWN);
        assert_eq!(result.score, 0.0);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let index = create_test_index(&["Jane Doe [10A]"]);
        let score = IdentityMatcher::new(&index).identify("Jane Doe").score;

        let at = IdentityMatcher::new(&index).with_threshold(score);
        assert!(at.identify("Jane Doe").identity.is_known());

        let above = IdentityMatcher::new(&index).with_threshold(score + 1e-9);
        assert!(!above.identify("Jane Doe").identity.is_known());
    }

    #[test]
    fn test_tie_goes_to_first_roster_entry() {
        // Both entries share "budi" with identical weights
        let index = create_test_index(&["Budi [10A]", "Budi [10B]"]);
        let scores = index.scores("Budi");
        assert_eq!(scores[0], scores[1]);

        let result = IdentityMatcher::new(&index).identify("Budi");
        assert_eq!(result.identity.label(), "Budi [10A]");
    }

    #[test]
    fn test_deterministic() {
        let index = create_test_index(&["Jane Doe [10A]", "Jane Roe [10B]", "John Doe [11A]"]);
        let matcher = IdentityMatcher::new(&index);

        let first = matcher.identify("jane_doe");
        for _ in 0..10 {
            assert_eq!(matcher.identify("jane_doe"), first);
        }
    }

    #[test]
    fn test_empty_roster_is_unknown() {
        let index = create_test_index(&[]);
        let result = IdentityMatcher::new(&index).identify("Jane Doe");

        assert_eq!(result.identity, Identity::Unknown);
        assert_eq!(result.score, 0.0);
    }

    #[test]
    fn test_exact_multi_term_match_scores_at_most_one() {
        let index = create_test_index(&[
            "Muhammad Rizky Pratama [XI IPA 2]",
            "Siti Nurhaliza [XI IPS 1]",
        ]);

        let result = IdentityMatcher::new(&index).identify("Muhammad Rizky Pratama XI IPA 2");

        assert_eq!(result.identity.label(), "Muhammad Rizky Pratama [XI IPA 2]");
        assert!(result.score <= 1.0);
        assert!((result.score - 1.0).abs() < 1e-9);
    }

    fn roster_words() -> impl Strategy<Value = String> {
        prop::collection::vec(
            prop::sample::select(vec!["jane", "doe", "john", "smith", "10a", "10b", "budi", "xyz", "."]),
            0..6,
        )
        .prop_map(|words| words.join(" "))
    }

    proptest! {
        #[test]
        fn prop_unknown_iff_best_score_below_threshold(query in roster_words()) {
            let index = create_test_index(&["Jane Doe [10A]", "John Smith [10B]", "Budi [10A]"]);
            let scores = index.scores(&normalize_name(&query));
            let best = scores.iter().cloned().fold(0.0f64, f64::max);

            let result = IdentityMatcher::new(&index).identify(&query);

            prop_assert!(scores.iter().all(|s| (0.0..=1.0).contains(s)));
            prop_assert_eq!(result.score, best);
            if best < DEFAULT_SIMILARITY_THRESHOLD {
                prop_assert_eq!(result.identity, Identity::Unknown);
            } else {
                prop_assert!(result.identity.is_known());
            }
        }
    }
}
