/// Recommendation orchestrator
///
/// Each attempt composes a prompt, asks the generator for one candidate and
/// checks it against the catalog. A candidate the catalog cannot resolve, or
/// resolves to a different title, is added to the exclusion set so the next
/// prompt rules it out. Generator failures and malformed output leave the set
/// untouched. Running out of attempts is an ordinary outcome, not an error.
use std::sync::Arc;

use crate::{
    models::{
        CandidateSuggestion, DisplayGame, ExclusionSet, GamingProfile, ValidatedRecommendation,
    },
    services::{
        prompt::compose_prompt,
        providers::{CatalogError, CatalogSource, GenerationError, GenerativeService, ResponseFormat},
        suggestion::parse_suggestion,
    },
};

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Lowercased ASCII letters and digits only
pub fn normalize_title(title: &str) -> String {
    title
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Loose title equality: either normalized title contains the other
///
/// Symmetric. Short titles can match unrelated longer ones that contain them.
pub fn titles_match(a: &str, b: &str) -> bool {
    let (a, b) = (normalize_title(a), normalize_title(b));
    a.contains(&b) || b.contains(&a)
}

#[derive(Debug, Clone, PartialEq)]
pub enum RecommendationOutcome {
    Succeeded(ValidatedRecommendation),
    Exhausted { attempts: u32 },
}

/// Why a single attempt produced no recommendation
#[derive(Debug, thiserror::Error)]
enum Rejection {
    #[error("{0}")]
    Generation(GenerationError),
    #[error("candidate {0} is already excluded")]
    AlreadyExcluded(String),
    #[error("candidate {0} is not available in the catalog")]
    Unavailable(String),
    #[error("catalog entry {0} has no title")]
    Untitled(String),
    #[error("candidate {game_id} was suggested as {suggested:?} but the catalog lists {catalog:?}")]
    TitleMismatch {
        game_id: String,
        suggested: String,
        catalog: String,
    },
}

impl Rejection {
    /// The candidate id to exclude from later attempts, if there is one
    fn dead_end(&self) -> Option<&str> {
        match self {
            Rejection::Unavailable(id) | Rejection::Untitled(id) => Some(id),
            Rejection::TitleMismatch { game_id, .. } => Some(game_id),
            Rejection::Generation(_) | Rejection::AlreadyExcluded(_) => None,
        }
    }
}

#[derive(Clone)]
pub struct Recommender {
    generator: Arc<dyn GenerativeService>,
    catalog: Arc<dyn CatalogSource>,
    max_attempts: u32,
}

impl Recommender {
    pub fn new(
        generator: Arc<dyn GenerativeService>,
        catalog: Arc<dyn CatalogSource>,
        max_attempts: u32,
    ) -> Self {
        Self {
            generator,
            catalog,
            max_attempts: max_attempts.max(1),
        }
    }

    /// Runs up to `max_attempts` attempts, growing `exclusions` on every
    /// catalog-side rejection
    pub async fn recommend(
        &self,
        profile: &GamingProfile,
        requested_genres: &[String],
        exclusions: &mut ExclusionSet,
    ) -> RecommendationOutcome {
        for attempt in 1..=self.max_attempts {
            match self.attempt(profile, requested_genres, exclusions).await {
                Ok(recommendation) => {
                    tracing::info!(
                        attempt,
                        game_id = %recommendation.game_id,
                        title = %recommendation.game.title,
                        "Recommendation validated"
                    );
                    return RecommendationOutcome::Succeeded(recommendation);
                }
                Err(rejection) => {
                    tracing::warn!(
                        attempt,
                        max_attempts = self.max_attempts,
                        reason = %rejection,
                        "Recommendation attempt rejected"
                    );

                    if let Some(game_id) = rejection.dead_end() {
                        exclusions.insert(game_id);
                    }
                }
            }
        }

        tracing::info!(
            attempts = self.max_attempts,
            excluded = exclusions.len(),
            "No recommendation found"
        );

        RecommendationOutcome::Exhausted {
            attempts: self.max_attempts,
        }
    }

    async fn attempt(
        &self,
        profile: &GamingProfile,
        requested_genres: &[String],
        exclusions: &ExclusionSet,
    ) -> Result<ValidatedRecommendation, Rejection> {
        let prompt = compose_prompt(profile, requested_genres, exclusions);

        let raw = self
            .generator
            .generate(&prompt, ResponseFormat::Json)
            .await
            .map_err(Rejection::Generation)?;

        let candidate = parse_suggestion(&raw).map_err(Rejection::Generation)?;
        tracing::debug!(
            game_id = %candidate.game_id,
            title = %candidate.title,
            "Candidate suggested"
        );

        if exclusions.contains(&candidate.game_id) {
            return Err(Rejection::AlreadyExcluded(candidate.game_id));
        }

        let entry = match self.catalog.fetch_entry(&candidate.game_id).await {
            Ok(entry) => entry,
            Err(CatalogError::NotAvailable(_)) => {
                return Err(Rejection::Unavailable(candidate.game_id))
            }
        };

        let Some(catalog_title) = entry.title() else {
            return Err(Rejection::Untitled(candidate.game_id));
        };

        if !titles_match(&candidate.title, catalog_title) {
            return Err(Rejection::TitleMismatch {
                catalog: catalog_title.to_string(),
                game_id: candidate.game_id,
                suggested: candidate.title,
            });
        }

        let mut game = DisplayGame::from(&entry);
        if game.id.is_empty() {
            game.id = candidate.game_id.clone();
        }

        Ok(validated(candidate, game))
    }
}

fn validated(candidate: CandidateSuggestion, game: DisplayGame) -> ValidatedRecommendation {
    ValidatedRecommendation {
        game_id: candidate.game_id,
        game,
        reasoning: candidate.reasoning,
        match_score: candidate.match_score,
    }
}
