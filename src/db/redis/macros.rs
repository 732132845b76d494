/// Read-through caching for async fetches backed by Redis.
///
/// Returns the cached value for `$key` when present. Otherwise awaits `$block`,
/// queues the result for a background write with the given TTL (seconds) and
/// returns it. A failed cache read is logged and treated as a miss so that a
/// Redis outage only costs extra upstream calls.
///
/// # Example
/// ```rust,ignore
/// let games: Vec<OwnedGame> = cached!(self.cache, CacheKey::OwnedGames(id), 3600, async move {
///     fetch_owned_games(id).await
/// })?;
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        let key = $key;
        match $cache.get_from_cache(&key).await {
            Ok(Some(cached)) => Ok(cached),
            result => {
                if let Err(e) = result {
                    tracing::warn!(error = %e, key = %key, "Cache read failed, treating as miss");
                }
                match $block.await {
                    Ok(value) => {
                        $cache.set_in_background(&key, &value, $ttl);
                        Ok(value)
                    }
                    Err(e) => Err(e),
                }
            }
        }
    }};
}
