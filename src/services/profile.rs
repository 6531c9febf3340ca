use std::cmp::Ordering;
use std::collections::HashMap;

use crate::{
    models::{GamingProfile, OwnedGame, PlaytimeEntry},
    services::providers::GenreLookup,
};

const TOP_GAMES_LIMIT: usize = 10;
/// 50 hours
const MOST_PLAYED_MINUTES: u64 = 3000;
/// Top games below this many hours do not vote on favorite genres
const GENRE_VOTE_MIN_HOURS: f64 = 5.0;
const FAVORITE_GENRES_LIMIT: usize = 5;

/// Converts minutes to hours rounded to one decimal
pub fn minutes_to_hours(minutes: u64) -> f64 {
    (minutes as f64 / 60.0 * 10.0).round() / 10.0
}

/// Owned games by all-time playtime, descending; ties keep input order
fn by_playtime(games: &[OwnedGame]) -> Vec<&OwnedGame> {
    let mut sorted: Vec<&OwnedGame> = games.iter().collect();
    sorted.sort_by(|a, b| b.playtime_forever_minutes.cmp(&a.playtime_forever_minutes));
    sorted
}

fn all_time_entry(game: &OwnedGame) -> PlaytimeEntry {
    PlaytimeEntry {
        game_id: game.game_id.clone(),
        title: game.title.clone(),
        hours: minutes_to_hours(game.playtime_forever_minutes),
    }
}

/// Ids of the top games heavy enough to vote on favorite genres
///
/// These are the only games whose genres `build_profile` will look at, so
/// callers only need to resolve genre data for this list.
pub fn genre_vote_candidates(games: &[OwnedGame]) -> Vec<String> {
    by_playtime(games)
        .into_iter()
        .take(TOP_GAMES_LIMIT)
        .filter(|game| minutes_to_hours(game.playtime_forever_minutes) >= GENRE_VOTE_MIN_HOURS)
        .map(|game| game.game_id.clone())
        .collect()
}

/// Derives a gaming profile from owned games
///
/// `genres` maps game ids to genre names; a game missing from it simply does
/// not vote. Pure and deterministic: identical input gives identical output.
pub fn build_profile(games: &[OwnedGame], genres: &HashMap<String, Vec<String>>) -> GamingProfile {
    let sorted = by_playtime(games);

    let total_minutes: u64 = games.iter().map(|g| g.playtime_forever_minutes).sum();

    let top_games: Vec<PlaytimeEntry> = sorted
        .iter()
        .take(TOP_GAMES_LIMIT)
        .map(|game| all_time_entry(game))
        .collect();

    let mut recently_active_games: Vec<PlaytimeEntry> = sorted
        .iter()
        .filter(|game| game.playtime_two_weeks_minutes > 0)
        .map(|game| PlaytimeEntry {
            game_id: game.game_id.clone(),
            title: game.title.clone(),
            hours: minutes_to_hours(game.playtime_two_weeks_minutes),
        })
        .collect();
    recently_active_games.sort_by(|a, b| b.hours.partial_cmp(&a.hours).unwrap_or(Ordering::Equal));

    let most_played_games: Vec<PlaytimeEntry> = sorted
        .iter()
        .filter(|game| game.playtime_forever_minutes >= MOST_PLAYED_MINUTES)
        .map(|game| all_time_entry(game))
        .collect();

    let favorite_genres = favorite_genres(&top_games, genres);

    GamingProfile {
        game_count: games.len(),
        total_playtime_hours: minutes_to_hours(total_minutes),
        top_games,
        recently_active_games,
        most_played_games,
        favorite_genres,
    }
}

/// Hours-weighted genre ranking over the top games
fn favorite_genres(top_games: &[PlaytimeEntry], genres: &HashMap<String, Vec<String>>) -> Vec<String> {
    // Insertion-ordered so equal weights rank by first encounter
    let mut weights: Vec<(String, f64)> = Vec::new();

    for entry in top_games.iter().filter(|e| e.hours >= GENRE_VOTE_MIN_HOURS) {
        let Some(names) = genres.get(&entry.game_id) else {
            continue;
        };

        for name in names.iter().filter(|name| !name.is_empty()) {
            match weights.iter_mut().find(|(genre, _)| genre == name) {
                Some((_, weight)) => *weight += entry.hours,
                None => weights.push((name.clone(), entry.hours)),
            }
        }
    }

    weights.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    weights
        .into_iter()
        .take(FAVORITE_GENRES_LIMIT)
        .map(|(genre, _)| genre)
        .collect()
}

/// Builds a profile, resolving genre votes through the cache-only lookup
pub async fn load_profile(games: &[OwnedGame], lookup: &dyn GenreLookup) -> GamingProfile {
    let mut genres = HashMap::new();

    for game_id in genre_vote_candidates(games) {
        match lookup.cached_genres(&game_id).await {
            Some(names) => {
                genres.insert(game_id, names);
            }
            None => tracing::debug!(game_id = %game_id, "No cached genres, skipping vote"),
        }
    }

    let profile = build_profile(games, &genres);

    tracing::debug!(
        game_count = profile.game_count,
        total_hours = profile.total_playtime_hours,
        favorite_genres = ?profile.favorite_genres,
        "Gaming profile built"
    );

    profile
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::providers::MockGenreLookup;

    fn scenario_library() -> Vec<OwnedGame> {
        vec![
            OwnedGame::new("72850", "Skyrim", 14700, 0),
            OwnedGame::new("292030", "Witcher 3", 10800, 900),
            OwnedGame::new("1091500", "Cyberpunk 2077", 7200, 480),
        ]
    }

    fn genres(pairs: &[(&str, &[&str])]) -> HashMap<String, Vec<String>> {
        pairs
            .iter()
            .map(|(id, names)| {
                (
                    id.to_string(),
                    names.iter().map(|n| n.to_string()).collect(),
                )
            })
            .collect()
    }

    #[test]
    fn test_minutes_to_hours_rounds_to_one_decimal() {
        assert_eq!(minutes_to_hours(0), 0.0);
        assert_eq!(minutes_to_hours(90), 1.5);
        assert_eq!(minutes_to_hours(100), 1.7);
        assert_eq!(minutes_to_hours(14700), 245.0);
    }

    #[test]
    fn test_scenario_library_profile() {
        let profile = build_profile(&scenario_library(), &HashMap::new());

        assert_eq!(profile.game_count, 3);
        assert_eq!(profile.total_playtime_hours, 545.0);
        assert_eq!(
            profile.top_games[0],
            PlaytimeEntry {
                game_id: "72850".to_string(),
                title: "Skyrim".to_string(),
                hours: 245.0,
            }
        );
        assert_eq!(
            profile.recently_active_games[0],
            PlaytimeEntry {
                game_id: "292030".to_string(),
                title: "Witcher 3".to_string(),
                hours: 15.0,
            }
        );
        assert_eq!(profile.recently_active_games.len(), 2);
        assert_eq!(profile.most_played_games.len(), 3);
        assert!(profile.favorite_genres.is_empty());
    }

    #[test]
    fn test_empty_library_profile() {
        let profile = build_profile(&[], &HashMap::new());

        assert_eq!(profile, GamingProfile::default());
        assert_eq!(profile.game_count, 0);
        assert_eq!(profile.total_playtime_hours, 0.0);
    }

    #[test]
    fn test_build_profile_is_deterministic() {
        let library = scenario_library();
        let genre_map = genres(&[("72850", &["RPG"]), ("292030", &["RPG", "Action"])]);

        let first = serde_json::to_string(&build_profile(&library, &genre_map)).unwrap();
        let second = serde_json::to_string(&build_profile(&library, &genre_map)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_total_playtime_sums_every_game() {
        let library: Vec<OwnedGame> = (0..15)
            .map(|i| OwnedGame::new(&i.to_string(), &format!("Game {}", i), 61, 0))
            .collect();

        let profile = build_profile(&library, &HashMap::new());
        assert_eq!(profile.game_count, 15);
        assert_eq!(profile.top_games.len(), 10);
        // 15 * 61 minutes = 915 minutes = 15.25 hours
        assert_eq!(profile.total_playtime_hours, 15.3);
    }

    #[test]
    fn test_recently_active_sorted_by_recent_hours() {
        let library = vec![
            OwnedGame::new("1", "Big Old Favorite", 50_000, 60),
            OwnedGame::new("2", "New Obsession", 600, 540),
            OwnedGame::new("3", "Untouched", 300, 0),
        ];

        let profile = build_profile(&library, &HashMap::new());
        let ids: Vec<&str> = profile
            .recently_active_games
            .iter()
            .map(|e| e.game_id.as_str())
            .collect();
        assert_eq!(ids, vec!["2", "1"]);
    }

    #[test]
    fn test_most_played_threshold_is_3000_minutes() {
        let library = vec![
            OwnedGame::new("1", "Exactly Fifty", 3000, 0),
            OwnedGame::new("2", "Just Short", 2999, 0),
        ];

        let profile = build_profile(&library, &HashMap::new());
        assert_eq!(profile.most_played_games.len(), 1);
        assert_eq!(profile.most_played_games[0].game_id, "1");
    }

    #[test]
    fn test_favorite_genres_weighted_by_hours() {
        let library = vec![
            OwnedGame::new("1", "Strategy Marathon", 60_000, 0),
            OwnedGame::new("2", "Shooter A", 6_000, 0),
            OwnedGame::new("3", "Shooter B", 6_000, 0),
        ];
        let genre_map = genres(&[
            ("1", &["Strategy"]),
            ("2", &["Action", "FPS"]),
            ("3", &["Action"]),
        ]);

        let profile = build_profile(&library, &genre_map);
        assert_eq!(profile.favorite_genres, vec!["Strategy", "Action", "FPS"]);
    }

    #[test]
    fn test_favorite_genres_ignore_light_games_and_misses() {
        let library = vec![
            OwnedGame::new("1", "Played A Lot", 600, 0),
            OwnedGame::new("2", "Barely Played", 240, 0),
            OwnedGame::new("3", "Not Cached", 6000, 0),
        ];
        let genre_map = genres(&[("1", &["Puzzle"]), ("2", &["Horror"])]);

        let profile = build_profile(&library, &genre_map);
        assert_eq!(profile.favorite_genres, vec!["Puzzle"]);
    }

    #[test]
    fn test_favorite_genres_ties_keep_encounter_order() {
        let library = vec![OwnedGame::new("1", "Hybrid", 600, 0)];
        let genre_map = genres(&[("1", &["Indie", "Casual", "Adventure"])]);

        let profile = build_profile(&library, &genre_map);
        assert_eq!(profile.favorite_genres, vec!["Indie", "Casual", "Adventure"]);
    }

    #[test]
    fn test_favorite_genres_capped_at_five() {
        let library = vec![OwnedGame::new("1", "Everything", 600, 0)];
        let genre_map = genres(&[("1", &["A", "B", "C", "D", "E", "F", "G"])]);

        let profile = build_profile(&library, &genre_map);
        assert_eq!(profile.favorite_genres.len(), 5);
    }

    #[test]
    fn test_genre_vote_candidates() {
        let mut library: Vec<OwnedGame> = (0..12)
            .map(|i| OwnedGame::new(&format!("{}", i), "Game", 1000 + i, 0))
            .collect();
        library.push(OwnedGame::new("light", "Light", 10, 0));

        let candidates = genre_vote_candidates(&library);
        assert_eq!(candidates.len(), 10);
        assert_eq!(candidates[0], "11");
        assert!(!candidates.contains(&"light".to_string()));
    }

    #[tokio::test]
    async fn test_load_profile_uses_cached_genres() {
        let mut lookup = MockGenreLookup::new();
        lookup.expect_cached_genres().returning(|id| match id {
            "72850" => Some(vec!["RPG".to_string()]),
            "292030" => Some(vec!["RPG".to_string(), "Adventure".to_string()]),
            _ => None,
        });

        let profile = load_profile(&scenario_library(), &lookup).await;
        assert_eq!(profile.favorite_genres, vec!["RPG", "Adventure"]);
    }
}
