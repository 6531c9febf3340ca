use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::Display;

use super::DisplayGame;

/// A suggestion decoded from the generative service, not yet validated
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CandidateSuggestion {
    pub game_id: String,
    pub title: String,
    pub reasoning: String,
    pub match_score: i64,
    pub similar_to: Vec<String>,
}

/// A suggestion whose app id resolved in the catalog to a matching title
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ValidatedRecommendation {
    pub game_id: String,
    pub game: DisplayGame,
    pub reasoning: String,
    pub match_score: i64,
}

/// Catalog ids the generator must not suggest
///
/// Seeded from owned, previously recommended and disliked games, then grown
/// whenever a candidate is rejected. Iteration is sorted so anything rendered
/// from the set is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionSet(BTreeSet<String>);

impl ExclusionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an id, returning true if it was not already excluded
    pub fn insert(&mut self, game_id: impl Into<String>) -> bool {
        self.0.insert(game_id.into())
    }

    pub fn contains(&self, game_id: &str) -> bool {
        self.0.contains(game_id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.0.iter()
    }

    /// Ids present here but not in `baseline`
    pub fn added_since(&self, baseline: &ExclusionSet) -> Vec<String> {
        self.0.difference(&baseline.0).cloned().collect()
    }
}

impl<S: Into<String>> FromIterator<S> for ExclusionSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl<S: Into<String>> Extend<S> for ExclusionSet {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        self.0.extend(iter.into_iter().map(Into::into));
    }
}

/// A user's explicit verdict on a game
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Preference {
    Liked,
    Disliked,
}

impl Preference {
    pub fn as_str(&self) -> &'static str {
        match self {
            Preference::Liked => "liked",
            Preference::Disliked => "disliked",
        }
    }
}

impl Display for Preference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of persisting a recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved(i64),
    /// The (user, game) pair already exists in history
    AlreadyRecommended,
}

/// A recommendation row from the user's history
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoredRecommendation {
    pub game_id: String,
    pub game: DisplayGame,
    pub reasoning: String,
    pub match_score: i64,
    pub requested_genres: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exclusion_set_insert_reports_growth() {
        let mut set = ExclusionSet::new();
        assert!(set.insert("570"));
        assert!(!set.insert("570"));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_exclusion_set_iterates_sorted() {
        let set: ExclusionSet = ["730", "1091500", "570"].into_iter().collect();
        let ids: Vec<&String> = set.iter().collect();
        assert_eq!(ids, vec!["1091500", "570", "730"]);
    }

    #[test]
    fn test_exclusion_set_added_since() {
        let baseline: ExclusionSet = ["570", "730"].into_iter().collect();
        let mut grown = baseline.clone();
        grown.extend(["292030", "570"]);
        assert_eq!(grown.added_since(&baseline), vec!["292030".to_string()]);
    }

    #[test]
    fn test_preference_serialization() {
        assert_eq!(
            serde_json::to_string(&Preference::Disliked).unwrap(),
            "\"disliked\""
        );
        let liked: Preference = serde_json::from_str("\"liked\"").unwrap();
        assert_eq!(liked, Preference::Liked);
    }
}
