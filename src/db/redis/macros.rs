/// Read-through caching over an optional Redis cache.
///
/// If a cache is configured and holds the key, the cached value is returned.
/// Otherwise the block is awaited, its value is queued for a background write
/// and returned. Cache read failures are logged and treated as misses, so an
/// unavailable Redis never fails the lookup itself.
///
/// # Arguments
/// * `$cache`: `Option<Cache>` (or a reference to one).
/// * `$key`: The `CacheKey` to read and write.
/// * `$ttl`: Time-to-live for the cached value in seconds.
/// * `$block`: Future computing the value on a miss; its error is propagated.
///
/// # Example
/// ```rust,ignore
/// let details = cached!(self.cache, CacheKey::MovieDetails(id), 86400, async move {
///     fetch_from_api(id).await
/// });
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        let key = $key;
        let cache_slot = &$cache;
        let cache = cache_slot.as_ref();

        let hit = match cache {
            Some(cache) => match cache.get_from_cache(&key).await {
                Ok(hit) => hit,
                Err(e) => {
                    tracing::warn!(error = %e, key = %key, "Cache read failed, treating as miss");
                    None
                }
            },
            None => None,
        };

        if let Some(cached) = hit {
            Ok(cached)
        } else {
            let value = $block.await?;
            if let Some(cache) = cache {
                cache.set_in_background(&key, &value, $ttl);
            }
            Ok(value)
        }
    }};
}
