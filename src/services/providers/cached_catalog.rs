use std::sync::Arc;

use crate::{
    db::{Cache, CacheKey},
    models::CatalogEntry,
    services::providers::{CatalogError, CatalogSource, GenreLookup},
};

/// Found entries stay cached for a week
const GAME_CACHE_TTL: u64 = 604_800;

/// Read-through Redis cache in front of any catalog source
///
/// Only found entries are cached; an unavailable id is asked again next time,
/// since delisted or region-locked games can come back.
#[derive(Clone)]
pub struct CachedCatalog {
    inner: Arc<dyn CatalogSource>,
    cache: Cache,
}

impl CachedCatalog {
    pub fn new(inner: Arc<dyn CatalogSource>, cache: Cache) -> Self {
        Self { inner, cache }
    }
}

#[async_trait::async_trait]
impl CatalogSource for CachedCatalog {
    async fn fetch_entry(&self, game_id: &str) -> Result<CatalogEntry, CatalogError> {
        let key = CacheKey::GameDetails(game_id.to_string());

        if let Some(entry) = self.cache.get_or_miss::<CatalogEntry>(&key).await {
            tracing::debug!(game_id = %game_id, "Catalog cache hit");
            return Ok(entry);
        }

        let entry = self.inner.fetch_entry(game_id).await?;
        self.cache.set_in_background(&key, &entry, GAME_CACHE_TTL);

        Ok(entry)
    }
}

#[async_trait::async_trait]
impl GenreLookup for CachedCatalog {
    async fn cached_genres(&self, game_id: &str) -> Option<Vec<String>> {
        self.cache
            .get_or_miss::<CatalogEntry>(&CacheKey::GameDetails(game_id.to_string()))
            .await
            .map(|entry| entry.genre_names())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_redis_client;
    use crate::services::providers::MockCatalogSource;

    // Redis is unreachable here, so every read is a miss
    fn offline_cache() -> Cache {
        let client = create_redis_client("redis://127.0.0.1:1").unwrap();
        let (cache, _handle) = Cache::new(client);
        cache
    }

    #[tokio::test]
    async fn test_cache_miss_delegates_to_inner_source() {
        let mut inner = MockCatalogSource::new();
        inner
            .expect_fetch_entry()
            .withf(|id| id == "570")
            .times(1)
            .returning(|_| {
                Ok(CatalogEntry {
                    name: Some("Dota 2".to_string()),
                    ..Default::default()
                })
            });

        let catalog = CachedCatalog::new(Arc::new(inner), offline_cache());
        let entry = catalog.fetch_entry("570").await.unwrap();
        assert_eq!(entry.title(), Some("Dota 2"));
    }

    #[tokio::test]
    async fn test_unavailable_passes_through() {
        let mut inner = MockCatalogSource::new();
        inner
            .expect_fetch_entry()
            .returning(|id| Err(CatalogError::NotAvailable(id.to_string())));

        let catalog = CachedCatalog::new(Arc::new(inner), offline_cache());
        assert_eq!(
            catalog.fetch_entry("1").await,
            Err(CatalogError::NotAvailable("1".to_string()))
        );
    }

    #[tokio::test]
    async fn test_genre_lookup_miss_is_none() {
        let catalog = CachedCatalog::new(Arc::new(MockCatalogSource::new()), offline_cache());
        assert_eq!(catalog.cached_genres("292030").await, None);
    }
}
