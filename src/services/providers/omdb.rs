/// OMDb API client
///
/// Secondary metadata source. TMDB has no awards data, so detail lookups use
/// OMDb to enrich titles that carry an IMDB id.
use crate::{
    error::{AppError, AppResult},
    services::providers::http,
};
use reqwest::{Client as HttpClient, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const PROVIDER: &str = "omdb";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(8);
const NOT_FOUND: &str = "Movie not found!";

/// How to identify a title
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OmdbLookup {
    ImdbId(String),
    Title(String),
}

/// `/?i=` or `/?t=` response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct OmdbTitle {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub year: Option<String>,
    #[serde(default)]
    pub plot: Option<String>,
    #[serde(default)]
    pub awards: Option<String>,
    #[serde(default, rename = "imdbID")]
    pub imdb_id: Option<String>,
    #[serde(default, rename = "Type")]
    pub title_type: Option<String>,
    /// Ratings, box office, cast etc. as sent by OMDb
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// One `/?s=` hit
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct OmdbSearchHit {
    pub title: String,
    #[serde(default)]
    pub year: Option<String>,
    #[serde(rename = "imdbID")]
    pub imdb_id: String,
    #[serde(default, rename = "Type")]
    pub title_type: Option<String>,
    #[serde(default)]
    pub poster: Option<String>,
}

/// Envelope shared by every OMDb reply
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct OmdbStatus {
    #[serde(default)]
    response: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl OmdbStatus {
    fn failed(&self) -> bool {
        self.response.as_deref() == Some("False")
    }

    fn message(&self) -> String {
        self.error
            .clone()
            .unwrap_or_else(|| "Unknown OMDb error".to_string())
    }
}

#[derive(Debug, Deserialize)]
struct OmdbSearchResponse {
    #[serde(default, rename = "Search")]
    search: Vec<OmdbSearchHit>,
}

#[derive(Clone)]
pub struct OmdbClient {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
}

impl OmdbClient {
    pub fn new(api_key: String, api_url: String) -> AppResult<Self> {
        Ok(Self {
            http_client: http::build_client(REQUEST_TIMEOUT)?,
            api_key,
            api_url,
        })
    }

    /// Awards text for an IMDB id. Every failure collapses to `None`.
    pub async fn awards(&self, imdb_id: &str) -> Option<String> {
        if imdb_id.is_empty() {
            return None;
        }

        let response = match self
            .http_client
            .get(&self.api_url)
            .query(&[("i", imdb_id), ("apikey", self.api_key.as_str())])
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!(imdb_id = %imdb_id, error = %e, "Awards lookup failed");
                return None;
            }
        };

        if response.status() != StatusCode::OK {
            tracing::debug!(
                imdb_id = %imdb_id,
                status = response.status().as_u16(),
                "Awards lookup rejected"
            );
            return None;
        }

        let title: OmdbTitle = response.json().await.ok()?;
        title.awards
    }

    /// Full record for one title
    pub async fn title_details(&self, lookup: &OmdbLookup) -> AppResult<OmdbTitle> {
        let selector = match lookup {
            OmdbLookup::ImdbId(id) => ("i", id.as_str()),
            OmdbLookup::Title(title) => ("t", title.as_str()),
        };
        if selector.1.trim().is_empty() {
            return Err(AppError::InvalidArgument(
                "Provide either an IMDB id or a title".to_string(),
            ));
        }

        let body = self
            .get_value(&[selector, ("plot", "full"), ("apikey", self.api_key.as_str())])
            .await?;
        let status: OmdbStatus = serde_json::from_value(body.clone())
            .map_err(|_| AppError::malformed(PROVIDER, "Failed to decode JSON"))?;
        if status.failed() {
            return Err(AppError::malformed(PROVIDER, status.message()));
        }

        serde_json::from_value(body).map_err(|e| {
            AppError::malformed(PROVIDER, format!("Failed to parse OMDb response: {}", e))
        })
    }

    /// Title search; no match is an empty list
    pub async fn search(&self, query: &str, page: u32) -> AppResult<Vec<OmdbSearchHit>> {
        let page = page.to_string();
        let body = self
            .get_value(&[
                ("s", query),
                ("page", page.as_str()),
                ("apikey", self.api_key.as_str()),
            ])
            .await?;

        let status: OmdbStatus = serde_json::from_value(body.clone())
            .map_err(|_| AppError::malformed(PROVIDER, "Failed to decode JSON"))?;
        if status.failed() {
            if status.error.as_deref() == Some(NOT_FOUND) {
                return Ok(Vec::new());
            }
            return Err(AppError::malformed(PROVIDER, status.message()));
        }

        let results: OmdbSearchResponse = serde_json::from_value(body).map_err(|e| {
            AppError::malformed(PROVIDER, format!("Failed to parse OMDb response: {}", e))
        })?;

        tracing::info!(
            query = %query,
            results = results.search.len(),
            provider = PROVIDER,
            "Title search completed"
        );

        Ok(results.search)
    }

    async fn get_value(&self, query: &[(&str, &str)]) -> AppResult<serde_json::Value> {
        let response = self
            .http_client
            .get(&self.api_url)
            .query(query)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let message = http::json_error_message(&body, "/Error").unwrap_or(body);
            return Err(AppError::upstream(PROVIDER, status.as_u16(), message));
        }

        http::decode_json(response, PROVIDER).await
    }
}
