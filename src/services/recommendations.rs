use serde::Serialize;
use std::sync::Arc;

use crate::{
    db::{PreferenceStore, RecommendationStore},
    error::{AppError, AppResult},
    models::{
        EventKind, ExclusionSet, OwnedGame, Preference, SaveOutcome, StoredRecommendation,
        UserEvent, ValidatedRecommendation,
    },
    services::{
        profile::load_profile,
        providers::{GenreLookup, LibrarySource},
        recommender::{RecommendationOutcome, Recommender},
    },
};

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;
pub const DEFAULT_EVENT_LIMIT: i64 = 50;
pub const MAX_EVENT_LIMIT: i64 = 500;

/// Trims genre names and drops blanks and repeats, keeping first-seen order
pub fn normalize_genres(genres: Vec<String>) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::with_capacity(genres.len());
    for genre in genres {
        let genre = genre.trim();
        if !genre.is_empty() && !normalized.iter().any(|seen| seen == genre) {
            normalized.push(genre.to_string());
        }
    }
    normalized
}

/// What a recommendation request produced
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RecommendOutcome {
    Recommended {
        recommendation: ValidatedRecommendation,
    },
    /// Validated, but a concurrent request saved the same game first
    AlreadyRecommended {
        recommendation: ValidatedRecommendation,
    },
    NoneFound {
        attempts: u32,
        message: String,
    },
}

/// One page of a user's recommendation history
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct HistoryPage {
    pub recommendations: Vec<StoredRecommendation>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

/// Per-user recommendation flow
///
/// Loads the user's library and history, seeds the exclusion set, runs the
/// orchestrator and records the result. Each call owns its exclusion set, so
/// concurrent requests for one user never share state; the unique
/// (user, game) constraint settles any race at save time.
#[derive(Clone)]
pub struct RecommendationService {
    library: Arc<dyn LibrarySource>,
    genres: Arc<dyn GenreLookup>,
    preferences: Arc<dyn PreferenceStore>,
    history: Arc<dyn RecommendationStore>,
    recommender: Recommender,
}

impl RecommendationService {
    pub fn new(
        library: Arc<dyn LibrarySource>,
        genres: Arc<dyn GenreLookup>,
        preferences: Arc<dyn PreferenceStore>,
        history: Arc<dyn RecommendationStore>,
        recommender: Recommender,
    ) -> Self {
        Self {
            library,
            genres,
            preferences,
            history,
            recommender,
        }
    }

    /// Produces one recommendation
    ///
    /// `None` for `requested_genres` means the caller did not choose any, and
    /// the user's saved genre filter applies. An explicit list, even an empty
    /// one, is used as given.
    pub async fn recommend(
        &self,
        steam_id: &str,
        requested_genres: Option<Vec<String>>,
    ) -> AppResult<RecommendOutcome> {
        let requested_genres = match requested_genres {
            Some(genres) => normalize_genres(genres),
            None => self.saved_genres(steam_id).await?,
        };
        let requested_genres = requested_genres.as_slice();

        let owned = self.library.fetch_owned_games(steam_id).await?;
        let profile = load_profile(&owned, self.genres.as_ref()).await;

        let seeded = self.seed_exclusions(steam_id, &owned).await?;
        let mut exclusions = seeded.clone();

        tracing::info!(
            steam_id = %steam_id,
            owned = owned.len(),
            excluded = seeded.len(),
            genres = ?requested_genres,
            "Generating recommendation"
        );

        let outcome = self
            .recommender
            .recommend(&profile, requested_genres, &mut exclusions)
            .await;

        let dead_ends = exclusions.added_since(&seeded);
        if !dead_ends.is_empty() {
            tracing::info!(
                steam_id = %steam_id,
                game_ids = ?dead_ends,
                "Candidates rejected during this run"
            );
        }

        match outcome {
            RecommendationOutcome::Succeeded(recommendation) => {
                match self
                    .history
                    .save_recommendation(steam_id, &recommendation, requested_genres)
                    .await?
                {
                    SaveOutcome::Saved(id) => {
                        tracing::info!(
                            steam_id = %steam_id,
                            game_id = %recommendation.game_id,
                            recommendation_id = id,
                            "Recommendation saved"
                        );
                        self.log_event(steam_id, EventKind::Recommended, &recommendation.game_id)
                            .await;
                        Ok(RecommendOutcome::Recommended { recommendation })
                    }
                    SaveOutcome::AlreadyRecommended => {
                        Ok(RecommendOutcome::AlreadyRecommended { recommendation })
                    }
                }
            }
            RecommendationOutcome::Exhausted { attempts } => {
                tracing::warn!(steam_id = %steam_id, attempts, "No recommendation found");
                Ok(RecommendOutcome::NoneFound {
                    attempts,
                    message: format!(
                        "Couldn't find a new game to recommend after {} attempts. \
                         Try different or broader genres.",
                        attempts
                    ),
                })
            }
        }
    }

    /// Owned, previously recommended and disliked games
    async fn seed_exclusions(
        &self,
        steam_id: &str,
        owned: &[OwnedGame],
    ) -> AppResult<ExclusionSet> {
        let mut exclusions: ExclusionSet = owned.iter().map(|g| g.game_id.as_str()).collect();
        exclusions.extend(self.preferences.recommended_game_ids(steam_id).await?);
        exclusions.extend(
            self.preferences
                .preference_game_ids(steam_id, Preference::Disliked)
                .await?,
        );

        Ok(exclusions)
    }

    pub async fn history(&self, steam_id: &str, limit: i64, offset: i64) -> AppResult<HistoryPage> {
        let limit = limit.clamp(1, MAX_PAGE_SIZE);
        let offset = offset.max(0);

        let recommendations = self
            .history
            .list_recommendations(steam_id, limit, offset)
            .await?;
        let total = self.history.count_recommendations(steam_id).await?;

        Ok(HistoryPage {
            recommendations,
            total,
            limit,
            offset,
        })
    }

    pub async fn set_preference(
        &self,
        steam_id: &str,
        game_id: &str,
        preference: Preference,
    ) -> AppResult<()> {
        self.preferences
            .set_preference(steam_id, game_id, preference)
            .await?;
        self.log_event(steam_id, preference.into(), game_id).await;

        Ok(())
    }

    pub async fn clear_preference(&self, steam_id: &str, game_id: &str) -> AppResult<()> {
        if self.preferences.delete_preference(steam_id, game_id).await? {
            Ok(())
        } else {
            Err(AppError::NotFound(format!(
                "No preference stored for game {}",
                game_id
            )))
        }
    }

    /// The saved genre filter; empty when none was saved
    pub async fn saved_genres(&self, steam_id: &str) -> AppResult<Vec<String>> {
        Ok(self
            .preferences
            .saved_genres(steam_id)
            .await?
            .unwrap_or_default())
    }

    /// Normalizes and stores a genre filter, returning what was stored
    pub async fn save_genres(&self, steam_id: &str, genres: Vec<String>) -> AppResult<Vec<String>> {
        let genres = normalize_genres(genres);
        self.preferences.save_genres(steam_id, &genres).await?;
        Ok(genres)
    }

    /// Removes the genre filter; clearing an absent filter is not an error
    pub async fn clear_saved_genres(&self, steam_id: &str) -> AppResult<()> {
        let existed = self.preferences.delete_saved_genres(steam_id).await?;
        tracing::info!(steam_id = %steam_id, existed, "Genre filter cleared");
        Ok(())
    }

    pub async fn events(
        &self,
        steam_id: &str,
        kind: Option<EventKind>,
        limit: i64,
    ) -> AppResult<Vec<UserEvent>> {
        self.history
            .list_events(steam_id, kind, limit.clamp(1, MAX_EVENT_LIMIT))
            .await
    }

    /// Appends to the event log; a failed write is logged and never fails
    /// the request that caused it
    async fn log_event(&self, steam_id: &str, kind: EventKind, game_id: &str) {
        if let Err(e) = self.history.record_event(steam_id, kind, game_id).await {
            tracing::warn!(
                steam_id = %steam_id,
                game_id = %game_id,
                event = %kind,
                error = %e,
                "Failed to record user event"
            );
        }
    }
}
