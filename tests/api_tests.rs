mod common;

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use cinelist::{
    config::Config,
    routes::{create_router, AppState},
};
use common::FakeUpstream;
use serde_json::{json, Value};
use tempfile::TempDir;

struct Harness {
    server: TestServer,
    tmdb: FakeUpstream,
    firebase: FakeUpstream,
    omdb: FakeUpstream,
    _cache_dir: TempDir,
}

async fn create_test_server() -> Harness {
    let tmdb = FakeUpstream::start(|req| match req.path.as_str() {
        "/search/movie" => (
            StatusCode::OK,
            json!({"results": [{"id": 438631, "title": "Dune", "release_date": "2021-09-15"}]}),
        ),
        "/trending/all/week" => (
            StatusCode::OK,
            json!({"results": [{"id": 1399, "name": "Game of Thrones", "media_type": "tv"}]}),
        ),
        _ => (
            StatusCode::NOT_FOUND,
            json!({"status_message": "The resource you requested could not be found."}),
        ),
    })
    .await;
    let firebase = FakeUpstream::start(|req| {
        if req.path.ends_with(":signInWithPassword") {
            (
                StatusCode::OK,
                json!({"idToken": "id-token", "localId": "uid-1", "email": "paul@arrakis.dune"}),
            )
        } else {
            (
                StatusCode::OK,
                json!({"tt1160419": {"title": "Dune", "type": "movie"}}),
            )
        }
    })
    .await;
    let omdb = FakeUpstream::start(|req| {
        if req.query.get("i").map(String::as_str) == Some("tt1160419") {
            (
                StatusCode::OK,
                json!({"Title": "Dune", "Year": "2021", "imdbID": "tt1160419", "Type": "movie", "Response": "True"}),
            )
        } else {
            (
                StatusCode::OK,
                json!({"Response": "False", "Error": "Movie not found!"}),
            )
        }
    })
    .await;
    let cache_dir = tempfile::tempdir().unwrap();

    let pairs = vec![
        ("TMDB_API_KEY", "tmdb-key".to_string()),
        ("TMDB_API_URL", tmdb.url.clone()),
        ("TMDB_MAX_RETRIES", "0".to_string()),
        ("OMDB_API_KEY", String::new()),
        ("OMDB_API_URL", format!("{}/", omdb.url)),
        ("FIREBASE_API_KEY", "web-key".to_string()),
        ("FIREBASE_AUTH_URL", format!("{}/v1", firebase.url)),
        ("FIREBASE_DB_URL", firebase.url.clone()),
        (
            "CACHE_PATH",
            cache_dir.path().join("cache.json").display().to_string(),
        ),
    ];
    let config = Config::from_pairs(pairs.into_iter().map(|(k, v)| (k.to_string(), v))).unwrap();

    let state = AppState::from_config(&config).unwrap();
    let server = TestServer::new(create_router(state)).unwrap();

    Harness {
        server,
        tmdb,
        firebase,
        omdb,
        _cache_dir: cache_dir,
    }
}

#[tokio::test]
async fn test_health_check() {
    let harness = create_test_server().await;
    let response = harness.server.get("/health").await;
    response.assert_status_ok();
    response.assert_json(&json!({"status": "healthy"}));
}

#[tokio::test]
async fn test_search_is_cached_across_requests() {
    let harness = create_test_server().await;

    for _ in 0..2 {
        let response = harness
            .server
            .get("/api/v1/search")
            .add_query_param("q", "Dune")
            .add_query_param("kind", "movie")
            .await;
        response.assert_status_ok();
        let results: Vec<Value> = response.json();
        assert_eq!(results[0]["title"], "Dune");
        assert_eq!(results[0]["type"], "movie");
    }

    assert_eq!(harness.tmdb.hits(), 1);
}

#[tokio::test]
async fn test_trending_defaults_to_all_week() {
    let harness = create_test_server().await;

    let response = harness.server.get("/api/v1/trending").await;

    response.assert_status_ok();
    let items: Vec<Value> = response.json();
    assert_eq!(items[0]["title"], "Game of Thrones");
    assert_eq!(items[0]["media_type"], "tv");
}

#[tokio::test]
async fn test_bogus_trending_window_is_rejected_without_upstream_call() {
    let harness = create_test_server().await;

    let response = harness
        .server
        .get("/api/v1/trending")
        .add_query_param("window", "month")
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(harness.tmdb.hits(), 0);
}

#[tokio::test]
async fn test_missing_title_is_bad_gateway() {
    let harness = create_test_server().await;

    let response = harness.server.get("/api/v1/titles/movie/1").await;

    response.assert_status(StatusCode::BAD_GATEWAY);
    let body: Value = response.json();
    assert_eq!(
        body["error"],
        "tmdb error: The resource you requested could not be found."
    );
}

#[tokio::test]
async fn test_watchlist_requires_session() {
    let harness = create_test_server().await;

    let response = harness.server.get("/api/v1/watchlist").await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(harness.firebase.hits(), 0);
}

#[tokio::test]
async fn test_sign_in_then_read_watchlist() {
    let harness = create_test_server().await;

    let response = harness
        .server
        .post("/api/v1/auth/signin")
        .json(&json!({"email": "paul@arrakis.dune", "password": "spice"}))
        .await;
    response.assert_status_ok();
    let session: Value = response.json();
    let token = session["idToken"].as_str().unwrap().to_string();
    let uid = session["localId"].as_str().unwrap().to_string();

    let response = harness
        .server
        .get("/api/v1/watchlist")
        .add_header(
            HeaderName::from_static("authorization"),
            HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
        )
        .add_header(
            HeaderName::from_static("x-user-id"),
            HeaderValue::from_str(&uid).unwrap(),
        )
        .await;

    response.assert_status_ok();
    let items: Value = response.json();
    assert_eq!(items["tt1160419"]["title"], "Dune");

    let requests = harness.firebase.requests();
    assert_eq!(requests[1].path, "/users/uid-1/watchlist.json");
    assert_eq!(
        requests[1].query.get("auth").map(String::as_str),
        Some("id-token")
    );
}

#[tokio::test]
async fn test_insights_disabled_without_key() {
    let harness = create_test_server().await;

    let response = harness
        .server
        .post("/api/v1/insights")
        .json(&json!({"title": "Dune", "plot": "Spice must flow."}))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["configured"], false);
}

#[tokio::test]
async fn test_omdb_title_by_imdb_id() {
    let harness = create_test_server().await;

    let response = harness
        .server
        .get("/api/v1/omdb/title")
        .add_query_param("imdb_id", "tt1160419")
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["Title"], "Dune");
    assert_eq!(body["imdbID"], "tt1160419");
    assert_eq!(
        harness.omdb.requests()[0].query.get("plot").map(String::as_str),
        Some("full")
    );
}

#[tokio::test]
async fn test_omdb_search_without_match_is_empty() {
    let harness = create_test_server().await;

    let response = harness
        .server
        .get("/api/v1/omdb/search")
        .add_query_param("q", "Nonexistent")
        .await;

    response.assert_status_ok();
    let hits: Vec<Value> = response.json();
    assert!(hits.is_empty());
    assert_eq!(harness.omdb.hits(), 1);
}

#[tokio::test]
async fn test_bad_title_id_is_json_bad_request() {
    let harness = create_test_server().await;

    let response = harness.server.get("/api/v1/titles/movie/abc").await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert!(body["error"].as_str().unwrap().starts_with("Invalid argument"));
    assert_eq!(harness.tmdb.hits(), 0);
}
