/// Memoizes an async computation in a [`ResponseCache`](crate::cache::ResponseCache).
///
/// On a hit the cached value is returned without running the block. On a miss
/// the block is awaited, its `Ok` value is stored with the cache's default TTL
/// and then returned. Errors from the block propagate with `?`; cache failures
/// never do.
///
/// # Arguments
/// * `$cache`: a `ResponseCache`
/// * `$key`: the `CacheKey` for the value
/// * `$block`: a future yielding `AppResult<T>`
///
/// # Example
/// ```rust,ignore
/// cached!(self.cache, CacheKey::Details(kind, id), async move {
///     fetch_details(kind, id).await
/// })
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $block:expr) => {{
        let key = $key;
        if let Some(hit) = $cache.get(&key).await {
            Ok(hit)
        } else {
            let value = $block.await?;
            $cache.set(&key, &value).await;
            Ok(value)
        }
    }};
}
