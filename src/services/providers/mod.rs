/// External data and generation providers
///
/// The recommendation engine only talks to the outside world through the traits
/// in this module: the game catalog, the user's owned library, and a generative
/// text service. Concrete implementations target Steam and Gemini, but any
/// provider satisfying the same contract can be swapped in.
use crate::{
    error::AppResult,
    models::{CatalogEntry, OwnedGame},
};

pub mod cached_catalog;
pub mod gemini;
pub mod steam_store;
pub mod steam_web;

pub use cached_catalog::CachedCatalog;
pub use gemini::GeminiProvider;
pub use steam_store::{RetryPolicy, SteamStoreCatalog};
pub use steam_web::SteamWebLibrary;

/// Catalog lookup failure as seen by callers
///
/// Transient failures are retried inside the catalog client, so by the time
/// this surfaces the id is simply not usable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("Game {0} is not available in the catalog")]
    NotAvailable(String),
}

/// Generative service failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
    /// Provider unreachable, rate limited, timed out or returned an error status
    #[error("Generative provider error: {0}")]
    Provider(String),

    /// Provider replied, but not with a usable suggestion
    #[error("Malformed generator output: {0}")]
    MalformedOutput(String),
}

/// Output format hint passed to the generative service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    Json,
    Text,
}

/// Authoritative game metadata keyed by app id
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fetch a single game's metadata
    ///
    /// Implementations retry transient failures themselves and report
    /// `NotAvailable` for permanent ones or once retries are exhausted.
    async fn fetch_entry(&self, game_id: &str) -> Result<CatalogEntry, CatalogError>;
}

/// One-shot text completion
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait GenerativeService: Send + Sync {
    async fn generate(&self, prompt: &str, format: ResponseFormat)
        -> Result<String, GenerationError>;
}

/// A user's owned games with playtime
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait LibrarySource: Send + Sync {
    async fn fetch_owned_games(&self, steam_id: &str) -> AppResult<Vec<OwnedGame>>;
}

/// Cache-only genre lookup used when building profiles
///
/// Never triggers a network call; a miss returns `None`.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait GenreLookup: Send + Sync {
    async fn cached_genres(&self, game_id: &str) -> Option<Vec<String>>;
}

/// Serves `router` on an ephemeral local port and returns its base URL
#[cfg(test)]
pub(crate) async fn serve_locally(router: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}
