/// TMDB API provider
///
/// Search, details and trending lookups against The Movie Database v3 API.
/// Every lookup goes through the response cache first.
///
/// API Flow:
/// 1. Search: /search/{multi,movie,tv} → list items normalized to MediaSummary
/// 2. Details: /{movie,tv}/{id}?append_to_response=credits,external_ids → MediaDetail,
///    optionally enriched with OMDb awards via the IMDB id
/// 3. Trending: /trending/{all,movie,tv}/{day,week} → TrendingItem
use crate::{
    cache::{CacheKey, ResponseCache},
    cached,
    error::{AppError, AppResult},
    models::{
        MediaDetail, MediaKind, MediaSummary, SearchKind, TimeWindow, TmdbDetails, TmdbListItem,
        TmdbPage, TrendingItem, TrendingMediaType,
    },
    services::providers::{
        http::{self, RetryPolicy},
        omdb::OmdbClient,
        MetadataProvider,
    },
};
use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;
use std::time::Duration;

const PROVIDER: &str = "tmdb";

#[derive(Clone)]
pub struct TmdbProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    image_url: String,
    cache: ResponseCache,
    retry: RetryPolicy,
    /// Awards enrichment; skipped when unset
    omdb: Option<OmdbClient>,
}

impl TmdbProvider {
    pub fn new(
        cache: ResponseCache,
        api_key: String,
        api_url: String,
        image_url: String,
        timeout: Duration,
    ) -> AppResult<Self> {
        Ok(Self {
            http_client: http::build_client(timeout)?,
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
            image_url,
            cache,
            retry: RetryPolicy::default(),
            omdb: None,
        })
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_omdb(mut self, omdb: OmdbClient) -> Self {
        self.omdb = Some(omdb);
        self
    }

    /// GETs `path` with the API key and decodes the JSON body
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> AppResult<T> {
        let url = format!("{}{}", self.api_url, path);
        let mut query: Vec<(&str, &str)> = vec![("api_key", self.api_key.as_str())];
        query.extend(params.iter().map(|(k, v)| (*k, v.as_str())));

        let response =
            http::get_with_retry(&self.http_client, &url, &query, &self.retry, PROVIDER).await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let message = http::json_error_message(&body, "/status_message").unwrap_or(body);
            tracing::warn!(
                path = %path,
                status = status.as_u16(),
                message = %message,
                provider = PROVIDER,
                "TMDB request failed"
            );
            return Err(AppError::upstream(PROVIDER, status.as_u16(), message));
        }

        http::decode_json(response, PROVIDER).await
    }

    /// Normalizes one search hit; `None` drops it from the results
    fn normalize_search_hit(&self, kind: SearchKind, raw: serde_json::Value) -> Option<MediaSummary> {
        let item: TmdbListItem = serde_json::from_value(raw.clone()).ok()?;
        let media_kind = match kind.media_kind() {
            Some(media_kind) => media_kind,
            None => match item.media_type.as_deref() {
                Some("movie") => MediaKind::Movie,
                Some("tv") => MediaKind::Tv,
                _ => return None,
            },
        };

        MediaSummary::from_tmdb(media_kind, item, raw, &self.image_url)
    }

    async fn fetch_search(
        &self,
        query: &str,
        kind: SearchKind,
        page: u32,
    ) -> AppResult<Vec<MediaSummary>> {
        let path = format!("/search/{}", kind);
        let data: TmdbPage = self
            .get_json(
                &path,
                &[
                    ("query", query.to_string()),
                    ("page", page.to_string()),
                    ("include_adult", "false".to_string()),
                ],
            )
            .await?;

        let results: Vec<MediaSummary> = data
            .results
            .into_iter()
            .filter_map(|raw| self.normalize_search_hit(kind, raw))
            .collect();

        tracing::info!(
            query = %query,
            kind = %kind,
            page,
            results = results.len(),
            provider = PROVIDER,
            "Title search completed"
        );

        Ok(results)
    }

    async fn fetch_details(&self, kind: MediaKind, id: u64) -> AppResult<MediaDetail> {
        let path = format!("/{}/{}", kind, id);
        let data: TmdbDetails = self
            .get_json(
                &path,
                &[("append_to_response", "credits,external_ids".to_string())],
            )
            .await?;

        let mut detail = MediaDetail::from_tmdb(kind, data, &self.image_url);

        let awards = match (&self.omdb, detail.imdb_id.as_deref()) {
            (Some(omdb), Some(imdb_id)) => omdb.awards(imdb_id).await,
            _ => None,
        };
        detail.awards = awards;

        tracing::info!(
            kind = %kind,
            id,
            imdb_id = ?detail.imdb_id,
            has_awards = detail.awards.is_some(),
            provider = PROVIDER,
            "Details fetched"
        );

        Ok(detail)
    }

    async fn fetch_trending(
        &self,
        media_type: TrendingMediaType,
        window: TimeWindow,
        page: u32,
    ) -> AppResult<Vec<TrendingItem>> {
        let path = format!("/trending/{}/{}", media_type, window);
        let data: TmdbPage = self.get_json(&path, &[("page", page.to_string())]).await?;

        let items: Vec<TrendingItem> = data
            .results
            .into_iter()
            .filter_map(|raw| {
                let item: TmdbListItem = serde_json::from_value(raw.clone()).ok()?;
                TrendingItem::from_tmdb(media_type, item, raw, &self.image_url)
            })
            .collect();

        tracing::info!(
            media_type = %media_type,
            window = %window,
            page,
            results = items.len(),
            provider = PROVIDER,
            "Trending fetched"
        );

        Ok(items)
    }
}

#[async_trait::async_trait]
impl MetadataProvider for TmdbProvider {
    async fn search(&self, query: &str, kind: SearchKind, page: u32) -> AppResult<Vec<MediaSummary>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        cached!(
            self.cache,
            CacheKey::Search {
                kind,
                query: query.to_string(),
                page,
            },
            self.fetch_search(query, kind, page)
        )
    }

    async fn details(&self, kind: MediaKind, id: u64) -> AppResult<MediaDetail> {
        cached!(
            self.cache,
            CacheKey::Details(kind, id),
            self.fetch_details(kind, id)
        )
    }

    async fn trending(
        &self,
        media_type: TrendingMediaType,
        window: TimeWindow,
        page: u32,
    ) -> AppResult<Vec<TrendingItem>> {
        cached!(
            self.cache,
            CacheKey::Trending {
                media_type,
                window,
                page,
            },
            self.fetch_trending(media_type, window, page)
        )
    }

    fn name(&self) -> &'static str {
        PROVIDER
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryStore;
    use serde_json::json;
    use std::sync::Arc;

    fn create_test_provider() -> TmdbProvider {
        let cache = ResponseCache::new(Arc::new(MemoryStore::new()), Duration::from_secs(3600));
        TmdbProvider::new(
            cache,
            "test_key".to_string(),
            "http://test.local/3/".to_string(),
            "https://image.tmdb.org/t/p".to_string(),
            Duration::from_secs(1),
        )
        .unwrap()
    }

    #[test]
    fn test_api_url_trailing_slash_trimmed() {
        let provider = create_test_provider();
        assert_eq!(provider.api_url, "http://test.local/3");
    }

    #[test]
    fn test_multi_hit_keeps_movie() {
        let provider = create_test_provider();
        let raw = json!({"id": 438631, "media_type": "movie", "title": "Dune", "release_date": "2021-09-15"});
        let hit = provider.normalize_search_hit(SearchKind::Multi, raw).unwrap();
        assert_eq!(hit.kind, MediaKind::Movie);
        assert_eq!(hit.title, "Dune");
    }

    #[test]
    fn test_multi_hit_drops_person() {
        let provider = create_test_provider();
        let raw = json!({"id": 1, "media_type": "person", "name": "Denis Villeneuve"});
        assert!(provider.normalize_search_hit(SearchKind::Multi, raw).is_none());
    }

    #[test]
    fn test_single_kind_hit_assigns_requested_type() {
        let provider = create_test_provider();
        let raw = json!({"id": 1399, "name": "Game of Thrones"});
        let hit = provider.normalize_search_hit(SearchKind::Tv, raw).unwrap();
        assert_eq!(hit.kind, MediaKind::Tv);
        assert_eq!(hit.title, "Game of Thrones");
    }

    #[tokio::test]
    async fn test_blank_query_returns_empty_without_request() {
        // api_url points nowhere; any request would fail
        let provider = create_test_provider();
        let results = provider.search("   ", SearchKind::Multi, 1).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_cached_details_skip_network() {
        let provider = create_test_provider();
        let detail: MediaDetail = serde_json::from_value(json!({
            "type": "movie",
            "id": 42,
            "title": "Cached",
            "overview": null,
            "poster": null,
            "backdrop": null,
            "genres": [],
            "runtime": 120,
            "rating": 7.5,
            "credits": {"cast": [], "crew": []},
            "imdb_id": null
        }))
        .unwrap();
        provider
            .cache
            .set(&CacheKey::Details(MediaKind::Movie, 42), &detail)
            .await;

        let fetched = provider.details(MediaKind::Movie, 42).await.unwrap();
        assert_eq!(fetched, detail);
        assert_eq!(provider.name(), "tmdb");
    }
}
