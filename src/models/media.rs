use serde::{Deserialize, Serialize};

use super::{MediaKind, TrendingMediaType};

/// Poster size used for search results and details
pub const POSTER_SIZE: &str = "w500";
/// Poster size used for trending rows
pub const TRENDING_POSTER_SIZE: &str = "w342";

/// Builds an absolute image URL from a TMDB relative path
pub fn image_url(image_base: &str, size: &str, path: Option<&str>) -> Option<String> {
    path.filter(|p| !p.is_empty())
        .map(|p| format!("{}/{}{}", image_base.trim_end_matches('/'), size, p))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// A normalized search hit
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MediaSummary {
    #[serde(rename = "type")]
    pub kind: MediaKind,
    pub id: u64,
    pub title: String,
    pub release_date: Option<String>,
    pub overview: Option<String>,
    pub poster: Option<String>,
    pub popularity: Option<f64>,
    /// Untouched provider record
    pub tmdb_raw: serde_json::Value,
}

impl MediaSummary {
    /// Normalizes a TMDB list item. Returns `None` for records without an id.
    pub fn from_tmdb(
        kind: MediaKind,
        item: TmdbListItem,
        raw: serde_json::Value,
        image_base: &str,
    ) -> Option<Self> {
        let id = item.id?;
        let title = match kind {
            MediaKind::Movie => item.title.or(item.name),
            MediaKind::Tv => item.name.or(item.title),
        };

        Some(Self {
            kind,
            id,
            title: title.unwrap_or_default(),
            release_date: non_empty(item.release_date).or(non_empty(item.first_air_date)),
            overview: item.overview,
            poster: image_url(image_base, POSTER_SIZE, item.poster_path.as_deref()),
            popularity: item.popularity,
            tmdb_raw: raw,
        })
    }
}

/// A normalized trending row
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrendingItem {
    pub id: u64,
    /// Provider media type; may be `person` for `all` listings
    pub media_type: Option<String>,
    pub title: String,
    /// Release or first-air date, empty when unknown
    pub release_date: String,
    pub poster_path: Option<String>,
    pub poster: Option<String>,
    pub popularity: Option<f64>,
    pub vote_average: Option<f64>,
    pub raw: serde_json::Value,
}

impl TrendingItem {
    pub fn from_tmdb(
        requested: TrendingMediaType,
        item: TmdbListItem,
        raw: serde_json::Value,
        image_base: &str,
    ) -> Option<Self> {
        let id = item.id?;
        let media_type = match requested {
            TrendingMediaType::All => item.media_type,
            other => item.media_type.or_else(|| Some(other.as_str().to_string())),
        };
        let poster_path = non_empty(item.poster_path);

        Some(Self {
            id,
            media_type,
            title: non_empty(item.title)
                .or(non_empty(item.name))
                .unwrap_or_default(),
            release_date: non_empty(item.release_date)
                .or(non_empty(item.first_air_date))
                .unwrap_or_default(),
            poster: image_url(image_base, TRENDING_POSTER_SIZE, poster_path.as_deref()),
            poster_path,
            popularity: item.popularity,
            vote_average: item.vote_average,
            raw,
        })
    }
}

/// A normalized movie or tv detail record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MediaDetail {
    #[serde(rename = "type")]
    pub kind: MediaKind,
    pub id: u64,
    pub title: String,
    pub overview: Option<String>,
    pub poster: Option<String>,
    pub backdrop: Option<String>,
    pub genres: Vec<String>,
    /// Minutes; only movies report a runtime
    pub runtime: Option<u32>,
    pub rating: Option<f64>,
    pub credits: Credits,
    pub imdb_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub awards: Option<String>,
}

impl MediaDetail {
    pub fn from_tmdb(kind: MediaKind, details: TmdbDetails, image_base: &str) -> Self {
        let title = match kind {
            MediaKind::Movie => details.title.or(details.name),
            MediaKind::Tv => details.name.or(details.title),
        };

        Self {
            kind,
            id: details.id,
            title: title.unwrap_or_default(),
            overview: details.overview,
            poster: image_url(image_base, POSTER_SIZE, details.poster_path.as_deref()),
            backdrop: image_url(image_base, POSTER_SIZE, details.backdrop_path.as_deref()),
            genres: details.genres.into_iter().filter_map(|g| g.name).collect(),
            runtime: match kind {
                MediaKind::Movie => details.runtime,
                MediaKind::Tv => None,
            },
            rating: details.vote_average,
            credits: details.credits,
            imdb_id: non_empty(details.external_ids.imdb_id),
            awards: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Credits {
    #[serde(default)]
    pub cast: Vec<CastMember>,
    #[serde(default)]
    pub crew: Vec<CrewMember>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CastMember {
    pub id: u64,
    pub name: String,
    pub character: Option<String>,
    pub profile_path: Option<String>,
    pub order: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CrewMember {
    pub id: u64,
    pub name: String,
    pub job: Option<String>,
    pub department: Option<String>,
    pub profile_path: Option<String>,
}

// ============================================================================
// TMDB API Types
// ============================================================================

/// Paged list response (search, trending)
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbPage {
    #[serde(default)]
    pub results: Vec<serde_json::Value>,
}

/// Fields shared by movie, tv and multi list items
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TmdbListItem {
    pub id: Option<u64>,
    pub media_type: Option<String>,
    pub title: Option<String>,
    pub name: Option<String>,
    pub release_date: Option<String>,
    pub first_air_date: Option<String>,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub popularity: Option<f64>,
    pub vote_average: Option<f64>,
}

/// `/movie/{id}` and `/tv/{id}` with `append_to_response=credits,external_ids`
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbDetails {
    pub id: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub genres: Vec<TmdbGenre>,
    #[serde(default)]
    pub runtime: Option<u32>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub credits: Credits,
    #[serde(default)]
    pub external_ids: TmdbExternalIds,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbGenre {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TmdbExternalIds {
    #[serde(default)]
    pub imdb_id: Option<String>,
}
