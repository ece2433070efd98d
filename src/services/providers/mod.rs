/// External data providers
///
/// Each provider wraps one third-party REST API. The metadata provider sits
/// behind a trait so the HTTP layer can be exercised against a mock; the
/// account, awards and AI clients are used directly.
use crate::{
    error::AppResult,
    models::{MediaDetail, MediaKind, MediaSummary, SearchKind, TimeWindow, TrendingItem, TrendingMediaType},
};

pub mod firebase;
pub mod http;
pub mod omdb;
pub mod perplexity;
pub mod tmdb;

/// Trait for movie metadata providers
///
/// Implementations normalize provider payloads into [`MediaSummary`],
/// [`MediaDetail`] and [`TrendingItem`], and may memoize responses.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Search titles by free text
    ///
    /// Provider order is preserved. No match is an empty list, not an error.
    async fn search(&self, query: &str, kind: SearchKind, page: u32) -> AppResult<Vec<MediaSummary>>;

    /// Fetch one title with credits and external ids
    async fn details(&self, kind: MediaKind, id: u64) -> AppResult<MediaDetail>;

    /// Fetch the provider-ranked trending list
    async fn trending(
        &self,
        media_type: TrendingMediaType,
        window: TimeWindow,
        page: u32,
    ) -> AppResult<Vec<TrendingItem>>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}
