/// Read-through caching for fallible async computations.
///
/// Returns the cached value for `$key` when present. Otherwise awaits `$block`,
/// queues a successful result for a background write with `$ttl` seconds, and
/// returns it. Errors from the block are propagated and never cached.
///
/// A failed cache read is logged and counts as a miss, so a Redis outage
/// falls through to `$block`.
///
/// # Example
/// ```rust,ignore
/// async fn owned(&self, id: &str) -> AppResult<Vec<OwnedGame>> {
///     cached!(self.cache, CacheKey::OwnedGames(id.to_string()), 86_400, async {
///         self.call_api(id).await
///     })
/// }
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        let key = $key;
        if let Some(cached) = $cache.get_or_miss(&key).await {
            tracing::debug!(key = %key, "Cache hit");
            Ok(cached)
        } else {
            let value = $block.await?;
            $cache.set_in_background(&key, &value, $ttl);
            Ok(value)
        }
    }};
}
