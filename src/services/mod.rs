//! Recommendation engine and its collaborators
pub mod profile;
pub mod prompt;
pub mod providers;
pub mod recommendations;
pub mod recommender;
pub mod suggestion;

pub use recommendations::{
    normalize_genres, HistoryPage, RecommendOutcome, RecommendationService,
    DEFAULT_EVENT_LIMIT, DEFAULT_PAGE_SIZE, MAX_EVENT_LIMIT, MAX_PAGE_SIZE,
};
pub use recommender::{RecommendationOutcome, Recommender};
