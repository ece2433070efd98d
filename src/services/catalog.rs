use crate::{
    error::{AppError, AppResult},
    models::{MediaDetail, MediaKind, MediaSummary, SearchKind, TimeWindow, TrendingItem, TrendingMediaType},
    services::providers::{
        omdb::{OmdbClient, OmdbLookup, OmdbSearchHit, OmdbTitle},
        MetadataProvider,
    },
};
use std::sync::Arc;

/// Highest page TMDB will serve
pub const MAX_PAGE: u32 = 500;

fn validate_page(page: u32) -> AppResult<u32> {
    if page == 0 || page > MAX_PAGE {
        return Err(AppError::InvalidArgument(format!(
            "page must be between 1 and {}, got {}",
            MAX_PAGE, page
        )));
    }
    Ok(page)
}

/// Service function for title search
///
/// `kind` is one of `movie`, `tv`, `multi` (or `both`). Arguments are
/// validated before the provider is consulted.
pub async fn search(
    provider: Arc<dyn MetadataProvider>,
    query: &str,
    kind: &str,
    page: u32,
) -> AppResult<Vec<MediaSummary>> {
    let kind: SearchKind = kind.parse()?;
    let page = validate_page(page)?;
    provider.search(query, kind, page).await
}

/// Service function for title details; `kind` is `movie` or `tv`
pub async fn details(
    provider: Arc<dyn MetadataProvider>,
    kind: &str,
    id: u64,
) -> AppResult<MediaDetail> {
    let kind: MediaKind = kind.parse()?;
    provider.details(kind, id).await
}

/// Service function for trending titles
///
/// Fails with [`AppError::InvalidArgument`] before any provider call when
/// `media_type` is not `all`/`movie`/`tv` or `window` is not `day`/`week`.
pub async fn trending(
    provider: Arc<dyn MetadataProvider>,
    media_type: &str,
    window: &str,
    page: u32,
) -> AppResult<Vec<TrendingItem>> {
    let media_type: TrendingMediaType = media_type.parse()?;
    let window: TimeWindow = window.parse()?;
    let page = validate_page(page)?;
    provider.trending(media_type, window, page).await
}

/// Service function for an OMDb title record
///
/// An IMDB id wins over a title when both are given.
pub async fn omdb_title(
    client: &OmdbClient,
    imdb_id: Option<&str>,
    title: Option<&str>,
) -> AppResult<OmdbTitle> {
    let imdb_id = imdb_id.map(str::trim).filter(|id| !id.is_empty());
    let title = title.map(str::trim).filter(|t| !t.is_empty());
    let lookup = match (imdb_id, title) {
        (Some(id), _) => OmdbLookup::ImdbId(id.to_string()),
        (None, Some(title)) => OmdbLookup::Title(title.to_string()),
        (None, None) => {
            return Err(AppError::InvalidArgument(
                "Provide either an IMDB id or a title".to_string(),
            ))
        }
    };
    client.title_details(&lookup).await
}

/// Service function for OMDb title search; a blank query is an empty list
pub async fn omdb_search(
    client: &OmdbClient,
    query: &str,
    page: u32,
) -> AppResult<Vec<OmdbSearchHit>> {
    let page = validate_page(page)?;
    let query = query.trim();
    if query.is_empty() {
        return Ok(Vec::new());
    }
    client.search(query, page).await
}
