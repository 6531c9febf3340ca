pub mod postgres;
pub mod redis;
pub mod store;

pub use self::redis::{create_redis_client, Cache, CacheKey, CacheWriterHandle};
pub use postgres::create_pool;
pub use store::{PgStore, PreferenceStore, RecommendationStore};
