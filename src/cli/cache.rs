use crate::{error, info, management::ResponseCache, success};

/// Deletes cache entries whose TTL has run out.
pub async fn purge_cache() {
    let cache = ResponseCache::new();
    info!("Purging expired responses in {}", cache.root().display());

    match cache.purge_expired().await {
        Ok(removed) => success!("Removed {} expired responses", removed),
        Err(e) => error!("Cannot purge cache. Err: {}", e),
    }
}

/// Deletes every cache entry.
pub async fn clear_cache() {
    let cache = ResponseCache::new();

    match cache.clear().await {
        Ok(removed) => success!("Removed {} cached responses", removed),
        Err(e) => error!("Cannot clear cache. Err: {}", e),
    }
}
