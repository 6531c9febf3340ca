//! Wire and domain types shared by the providers, the recommendation engine
//! and the HTTP layer.
mod activity;
mod catalog;
mod profile;
mod recommendation;

pub use activity::{EventKind, UserEvent};
pub use catalog::{CatalogEntry, DisplayGame, Genre, PriceOverview, ReleaseDate};
pub use profile::{GamingProfile, OwnedGame, PlaytimeEntry};
pub use recommendation::{
    CandidateSuggestion, ExclusionSet, Preference, SaveOutcome, StoredRecommendation,
    ValidatedRecommendation,
};
