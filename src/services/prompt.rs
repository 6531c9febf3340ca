use std::fmt::Write;

use crate::models::{ExclusionSet, GamingProfile, PlaytimeEntry};

const RECENT_GAMES_SHOWN: usize = 5;

/// Experience tier derived from total hours played
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExperienceTier {
    New,
    Casual,
    Hardcore,
}

impl ExperienceTier {
    pub fn from_hours(total_hours: f64) -> Self {
        if total_hours <= 100.0 {
            ExperienceTier::New
        } else if total_hours <= 1000.0 {
            ExperienceTier::Casual
        } else {
            ExperienceTier::Hardcore
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ExperienceTier::New => "New",
            ExperienceTier::Casual => "Casual",
            ExperienceTier::Hardcore => "Hardcore",
        }
    }
}

fn write_entries(out: &mut String, entries: &[PlaytimeEntry], empty_marker: &str) {
    if entries.is_empty() {
        let _ = writeln!(out, "  {}", empty_marker);
        return;
    }

    for (rank, entry) in entries.iter().enumerate() {
        let _ = writeln!(
            out,
            "  {}. {} (app {}) - {:.1} hours",
            rank + 1,
            entry.title,
            entry.game_id,
            entry.hours
        );
    }
}

/// Renders the generation prompt for one attempt
///
/// Pure templating. Every excluded id is listed; the generator has no other
/// way to learn what it must not suggest.
pub fn compose_prompt(
    profile: &GamingProfile,
    requested_genres: &[String],
    exclusions: &ExclusionSet,
) -> String {
    let mut out = String::new();
    let tier = ExperienceTier::from_hours(profile.total_playtime_hours);

    out.push_str(
        "You are an expert video game curator with deep knowledge of the Steam catalog. \
         Recommend exactly ONE game this player does not own and will love.\n\n",
    );

    out.push_str("LIBRARY STATS:\n");
    let _ = writeln!(out, "- Games owned: {}", profile.game_count);
    let _ = writeln!(
        out,
        "- Total playtime: {:.0} hours",
        profile.total_playtime_hours
    );
    let _ = writeln!(out, "- Experience: {}", tier.as_str());
    out.push('\n');

    out.push_str("TOP 10 GAMES BY PLAYTIME:\n");
    write_entries(&mut out, &profile.top_games, "(No significant playtime data)");
    out.push('\n');

    out.push_str("RECENTLY ACTIVE (last two weeks):\n");
    let recent_shown = profile.recently_active_games.len().min(RECENT_GAMES_SHOWN);
    write_entries(
        &mut out,
        &profile.recently_active_games[..recent_shown],
        "(No recent activity)",
    );
    out.push('\n');

    out.push_str("MOST-PLAYED GAMES (50+ hours):\n");
    write_entries(&mut out, &profile.most_played_games, "(None yet)");
    out.push('\n');

    out.push_str("FAVORITE GENRES: ");
    if profile.favorite_genres.is_empty() {
        out.push_str("Not enough data - analyze their top games instead\n\n");
    } else {
        let _ = writeln!(out, "{}\n", profile.favorite_genres.join(", "));
    }

    out.push_str("REQUESTED GENRES: ");
    if requested_genres.is_empty() {
        out.push_str("No specific genres requested - recommend based on their play history\n\n");
    } else {
        let _ = writeln!(out, "{}\n", requested_genres.join(", "));
    }

    out.push_str("CONSTRAINTS:\n");
    out.push_str(
        "The recommended game must NOT be any of these Steam app ids \
         (already owned, already recommended or rejected):\n",
    );
    if exclusions.is_empty() {
        out.push_str("  (none)\n");
    } else {
        let ids: Vec<&str> = exclusions.iter().map(String::as_str).collect();
        let _ = writeln!(out, "  {}", ids.join(", "));
    }
    out.push('\n');

    out.push_str("THINK ABOUT:\n");
    if profile.top_games.is_empty() {
        out.push_str(
            "- This player has little history, so favor widely loved, approachable games\n\
             - Lean on the requested genres if any were given\n",
        );
    } else {
        out.push_str(
            "- What mechanics, themes and pacing their top games share\n\
             - What they are playing right now and whether their taste is shifting\n\
             - A game that extends those patterns rather than repeating one title\n",
        );
    }
    out.push('\n');

    out.push_str(
        "RESPONSE FORMAT:\n\
         Respond with exactly one JSON object and nothing else, no markdown and no commentary:\n\
         {\n\
         \x20 \"gameId\": \"1621690\",\n\
         \x20 \"title\": \"Core Keeper\",\n\
         \x20 \"reasoning\": \"Since you sank hundreds of hours into Stardew Valley and Terraria, \
         Core Keeper blends both: relaxed farming and crafting with underground exploration.\",\n\
         \x20 \"matchScore\": 92,\n\
         \x20 \"similarTo\": [\"Stardew Valley\", \"Terraria\"]\n\
         }\n\n",
    );

    out.push_str(
        "REASONING:\n\
         - Two or three sentences addressed to the player\n\
         - Name specific games from their library and what carries over\n\
         - Mention the requested genres when they apply\n\n",
    );

    out.push_str(
        "IMPORTANT:\n\
         - gameId must be the real numeric Steam app id of the game, as a string\n\
         - gameId, title and the game described in reasoning must all be the SAME game; \
         every suggestion is checked against the Steam store and rejected on any mismatch\n\
         - Only recommend games that are currently sold on Steam\n\
         - matchScore is an integer from 0 to 100\n\
         - similarTo lists titles from the player's library\n",
    );

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, title: &str, hours: f64) -> PlaytimeEntry {
        PlaytimeEntry {
            game_id: id.to_string(),
            title: title.to_string(),
            hours,
        }
    }

    fn sample_profile() -> GamingProfile {
        GamingProfile {
            game_count: 3,
            total_playtime_hours: 545.0,
            top_games: vec![
                entry("72850", "Skyrim", 245.0),
                entry("292030", "Witcher 3", 180.0),
                entry("1091500", "Cyberpunk 2077", 120.0),
            ],
            recently_active_games: vec![
                entry("292030", "Witcher 3", 15.0),
                entry("1091500", "Cyberpunk 2077", 8.0),
            ],
            most_played_games: vec![entry("72850", "Skyrim", 245.0)],
            favorite_genres: vec!["RPG".to_string(), "Adventure".to_string()],
        }
    }

    #[test]
    fn test_experience_tiers() {
        assert_eq!(ExperienceTier::from_hours(0.0), ExperienceTier::New);
        assert_eq!(ExperienceTier::from_hours(100.0), ExperienceTier::New);
        assert_eq!(ExperienceTier::from_hours(100.1), ExperienceTier::Casual);
        assert_eq!(ExperienceTier::from_hours(1000.0), ExperienceTier::Casual);
        assert_eq!(ExperienceTier::from_hours(1000.5), ExperienceTier::Hardcore);
    }

    #[test]
    fn test_prompt_renders_profile() {
        let prompt = compose_prompt(&sample_profile(), &[], &ExclusionSet::new());

        assert!(prompt.contains("Games owned: 3"));
        assert!(prompt.contains("Total playtime: 545 hours"));
        assert!(prompt.contains("Experience: Casual"));
        assert!(prompt.contains("1. Skyrim (app 72850) - 245.0 hours"));
        assert!(prompt.contains("1. Witcher 3 (app 292030) - 15.0 hours"));
        assert!(prompt.contains("FAVORITE GENRES: RPG, Adventure"));
        assert!(prompt.contains("No specific genres requested"));
    }

    #[test]
    fn test_prompt_for_empty_profile_uses_markers() {
        let prompt = compose_prompt(&GamingProfile::default(), &[], &ExclusionSet::new());

        assert!(prompt.contains("Experience: New"));
        assert!(prompt.contains("(No significant playtime data)"));
        assert!(prompt.contains("(No recent activity)"));
        assert!(prompt.contains("(None yet)"));
        assert!(prompt.contains("Not enough data"));
        assert!(prompt.contains("little history"));
    }

    #[test]
    fn test_prompt_lists_requested_genres() {
        let genres = vec!["Roguelike".to_string(), "Co-op".to_string()];
        let prompt = compose_prompt(&sample_profile(), &genres, &ExclusionSet::new());

        assert!(prompt.contains("REQUESTED GENRES: Roguelike, Co-op"));
        assert!(!prompt.contains("No specific genres requested"));
    }

    #[test]
    fn test_prompt_renders_every_excluded_id() {
        let exclusions: ExclusionSet = (1000..1250).map(|id| id.to_string()).collect();
        let prompt = compose_prompt(&sample_profile(), &[], &exclusions);

        for id in exclusions.iter() {
            assert!(prompt.contains(id.as_str()), "missing excluded id {}", id);
        }
    }

    #[test]
    fn test_prompt_caps_recent_games_at_five() {
        let mut profile = sample_profile();
        profile.recently_active_games = (1..=8)
            .map(|i| entry(&format!("9{}", i), &format!("Recent {}", i), 1.0))
            .collect();

        let prompt = compose_prompt(&profile, &[], &ExclusionSet::new());
        assert!(prompt.contains("Recent 5"));
        assert!(!prompt.contains("Recent 6"));
    }

    #[test]
    fn test_prompt_embeds_output_directive() {
        let prompt = compose_prompt(&sample_profile(), &[], &ExclusionSet::new());

        for field in ["\"gameId\"", "\"title\"", "\"reasoning\"", "\"matchScore\"", "\"similarTo\""] {
            assert!(prompt.contains(field), "directive missing {}", field);
        }
        assert!(prompt.contains("exactly one JSON object"));
        assert!(prompt.contains("must all be the SAME game"));
    }

    #[test]
    fn test_prompt_is_deterministic() {
        let exclusions: ExclusionSet = ["730", "570"].into_iter().collect();
        let genres = vec!["Strategy".to_string()];

        assert_eq!(
            compose_prompt(&sample_profile(), &genres, &exclusions),
            compose_prompt(&sample_profile(), &genres, &exclusions)
        );
    }
}
