use serde::{Deserialize, Serialize};

/// One title in a user's Steam library, with raw playtime in minutes
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OwnedGame {
    pub game_id: String,
    pub title: String,
    pub playtime_forever_minutes: u64,
    pub playtime_two_weeks_minutes: u64,
}

impl OwnedGame {
    pub fn new(game_id: &str, title: &str, forever_minutes: u64, two_weeks_minutes: u64) -> Self {
        Self {
            game_id: game_id.to_string(),
            title: title.to_string(),
            playtime_forever_minutes: forever_minutes,
            playtime_two_weeks_minutes: two_weeks_minutes,
        }
    }
}

/// A (game, hours) pair in a profile listing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlaytimeEntry {
    pub game_id: String,
    pub title: String,
    /// Hours rounded to one decimal
    pub hours: f64,
}

/// Summary of a user's play history used to personalize prompts
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GamingProfile {
    pub game_count: usize,
    pub total_playtime_hours: f64,
    /// At most 10, by all-time playtime descending
    pub top_games: Vec<PlaytimeEntry>,
    /// Played in the last two weeks, by recent hours descending
    pub recently_active_games: Vec<PlaytimeEntry>,
    /// 50+ hours all-time
    pub most_played_games: Vec<PlaytimeEntry>,
    /// At most 5, hours-weighted
    pub favorite_genres: Vec<String>,
}
