use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

use crate::error::AppError;

pub mod account;
pub mod media;

pub use account::{AccountUpdate, Credentials, Session, Watchlist, WatchlistItem};
pub use media::{
    CastMember, Credits, CrewMember, MediaDetail, MediaSummary, TmdbDetails, TmdbListItem,
    TmdbPage, TrendingItem,
};

/// Kind of a concrete title
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Movie,
    Tv,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Movie => "movie",
            MediaKind::Tv => "tv",
        }
    }
}

impl FromStr for MediaKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "movie" => Ok(MediaKind::Movie),
            "tv" => Ok(MediaKind::Tv),
            other => Err(AppError::InvalidArgument(format!(
                "kind must be 'movie' or 'tv', got '{}'",
                other
            ))),
        }
    }
}

/// Which search endpoint to use
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SearchKind {
    Movie,
    Tv,
    /// Combined search, filtered down to movies and tv shows
    Multi,
}

impl SearchKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchKind::Movie => "movie",
            SearchKind::Tv => "tv",
            SearchKind::Multi => "multi",
        }
    }

    /// The single media kind this search is restricted to, if any
    pub fn media_kind(&self) -> Option<MediaKind> {
        match self {
            SearchKind::Movie => Some(MediaKind::Movie),
            SearchKind::Tv => Some(MediaKind::Tv),
            SearchKind::Multi => None,
        }
    }
}

impl FromStr for SearchKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "movie" => Ok(SearchKind::Movie),
            "tv" => Ok(SearchKind::Tv),
            "multi" | "both" => Ok(SearchKind::Multi),
            other => Err(AppError::InvalidArgument(format!(
                "kind must be 'movie', 'tv' or 'multi', got '{}'",
                other
            ))),
        }
    }
}

/// Media filter for trending listings
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TrendingMediaType {
    All,
    Movie,
    Tv,
}

impl TrendingMediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrendingMediaType::All => "all",
            TrendingMediaType::Movie => "movie",
            TrendingMediaType::Tv => "tv",
        }
    }
}

impl FromStr for TrendingMediaType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(TrendingMediaType::All),
            "movie" => Ok(TrendingMediaType::Movie),
            "tv" => Ok(TrendingMediaType::Tv),
            other => Err(AppError::InvalidArgument(format!(
                "media_type must be 'all', 'movie' or 'tv', got '{}'",
                other
            ))),
        }
    }
}

/// Trending aggregation window
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TimeWindow {
    Day,
    Week,
}

impl TimeWindow {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeWindow::Day => "day",
            TimeWindow::Week => "week",
        }
    }
}

impl FromStr for TimeWindow {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "day" => Ok(TimeWindow::Day),
            "week" => Ok(TimeWindow::Week),
            other => Err(AppError::InvalidArgument(format!(
                "time_window must be 'day' or 'week', got '{}'",
                other
            ))),
        }
    }
}

macro_rules! display_as_str {
    ($($ty:ty),*) => {
        $(impl Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        })*
    };
}

display_as_str!(MediaKind, SearchKind, TrendingMediaType, TimeWindow);
