use axum::{extract::State, Json};
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    error::AppResult,
    models::{MediaDetail, MediaSummary, TrendingItem},
    routes::{
        extract::{Path, Query},
        AppState,
    },
    services::catalog,
};

fn default_page() -> u32 {
    1
}

fn default_search_kind() -> String {
    "multi".to_string()
}

fn default_media_type() -> String {
    "all".to_string()
}

fn default_window() -> String {
    "week".to_string()
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    q: String,
    #[serde(default = "default_search_kind")]
    kind: String,
    #[serde(default = "default_page")]
    page: u32,
}

#[derive(Debug, Deserialize)]
pub struct TrendingQuery {
    #[serde(default = "default_media_type")]
    media_type: String,
    #[serde(default = "default_window")]
    window: String,
    #[serde(default = "default_page")]
    page: u32,
}

/// Handler for title search endpoint
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchQuery>,
) -> AppResult<Json<Vec<MediaSummary>>> {
    let results = catalog::search(state.catalog.clone(), &params.q, &params.kind, params.page).await?;
    Ok(Json(results))
}

/// Handler for trending titles endpoint
pub async fn trending(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TrendingQuery>,
) -> AppResult<Json<Vec<TrendingItem>>> {
    let items = catalog::trending(
        state.catalog.clone(),
        &params.media_type,
        &params.window,
        params.page,
    )
    .await?;
    Ok(Json(items))
}

/// Handler for title details endpoint
pub async fn details(
    State(state): State<Arc<AppState>>,
    Path((kind, id)): Path<(String, u64)>,
) -> AppResult<Json<MediaDetail>> {
    let detail = catalog::details(state.catalog.clone(), &kind, id).await?;
    Ok(Json(detail))
}

#[cfg(test)]
mod tests {
    use crate::{
        error::AppError,
        models::{MediaKind, SearchKind, TimeWindow, TrendingMediaType},
        routes::{create_router, test_support::*},
        services::providers::MockMetadataProvider,
    };
    use axum::http::StatusCode;
    use serde_json::{json, Value};

    fn summary(id: u64, title: &str) -> crate::models::MediaSummary {
        crate::models::MediaSummary {
            kind: MediaKind::Movie,
            id,
            title: title.to_string(),
            release_date: Some("2021-09-15".to_string()),
            overview: None,
            poster: None,
            popularity: Some(10.0),
            tmdb_raw: Value::Null,
        }
    }

    #[tokio::test]
    async fn test_search_defaults_to_multi_page_one() {
        let mut provider = MockMetadataProvider::new();
        provider
            .expect_search()
            .withf(|query, kind, page| {
                query.to_string() == "Dune" && *kind == SearchKind::Multi && *page == 1
            })
            .times(1)
            .returning(|_, _, _| Ok(vec![summary(438631, "Dune")]));

        let router = create_router(state_with(provider));
        let (status, body) = send(router, get_request("/api/v1/search?q=Dune")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["id"], 438631);
        assert_eq!(body[0]["type"], "movie");
    }

    #[tokio::test]
    async fn test_search_unknown_kind_is_bad_request() {
        let mut provider = MockMetadataProvider::new();
        provider.expect_search().never();

        let router = create_router(state_with(provider));
        let (status, body) = send(router, get_request("/api/v1/search?q=Dune&kind=person")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("person"));
    }

    #[tokio::test]
    async fn test_non_numeric_id_is_json_bad_request() {
        let mut provider = MockMetadataProvider::new();
        provider.expect_details().never();

        let router = create_router(state_with(provider));
        let (status, body) = send(router, get_request("/api/v1/titles/movie/abc")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().starts_with("Invalid argument"));
    }

    #[tokio::test]
    async fn test_non_numeric_page_is_json_bad_request() {
        let mut provider = MockMetadataProvider::new();
        provider.expect_search().never();

        let router = create_router(state_with(provider));
        let (status, body) = send(router, get_request("/api/v1/search?q=Dune&page=x")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"]
            .as_str()
            .unwrap()
            .starts_with("Invalid argument: Failed to deserialize query string"));
    }

    #[tokio::test]
    async fn test_trending_defaults() {
        let mut provider = MockMetadataProvider::new();
        provider
            .expect_trending()
            .withf(|media_type, window, page| {
                *media_type == TrendingMediaType::All && *window == TimeWindow::Week && *page == 1
            })
            .times(1)
            .returning(|_, _, _| Ok(vec![]));

        let router = create_router(state_with(provider));
        let (status, body) = send(router, get_request("/api/v1/trending")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn test_details_upstream_failure_is_bad_gateway() {
        let mut provider = MockMetadataProvider::new();
        provider
            .expect_details()
            .withf(|kind, id| *kind == MediaKind::Tv && *id == 1399)
            .times(1)
            .returning(|_, _| {
                Err(AppError::upstream(
                    "tmdb",
                    404,
                    "The resource you requested could not be found.",
                ))
            });

        let router = create_router(state_with(provider));
        let (status, body) = send(router, get_request("/api/v1/titles/tv/1399")).await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(
            body["error"],
            "tmdb error: The resource you requested could not be found."
        );
    }
}
