use axum::{
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    routing::{get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    cache::{FileStore, ResponseCache},
    config::Config,
    error::AppResult,
    middleware::request_id::{
        make_span_with_request_id, propagate_request_id_layer, set_request_id_layer,
    },
    models::Session,
    services::providers::{
        firebase::FirebaseClient,
        http::RetryPolicy,
        omdb::OmdbClient,
        perplexity::PerplexityClient,
        tmdb::TmdbProvider,
        MetadataProvider,
    },
};

pub mod account;
pub mod extract;
pub mod insights;
pub mod omdb;
pub mod titles;
pub mod watchlist;

/// Header carrying the caller's user id alongside the bearer id token
pub const USER_ID_HEADER: &str = "x-user-id";
/// Optional header carrying the caller's email
pub const USER_EMAIL_HEADER: &str = "x-user-email";

/// Shared application state
pub struct AppState {
    pub catalog: Arc<dyn MetadataProvider>,
    pub accounts: FirebaseClient,
    pub insights: PerplexityClient,
    pub omdb: OmdbClient,
}

impl AppState {
    /// Wires every provider client from configuration
    pub fn from_config(config: &Config) -> AppResult<Self> {
        let cache = ResponseCache::new(
            Arc::new(FileStore::new(config.cache_path.clone())),
            config.cache_ttl(),
        );

        let mut tmdb = TmdbProvider::new(
            cache,
            config.tmdb_api_key.clone(),
            config.tmdb_api_url.clone(),
            config.tmdb_image_url.clone(),
            config.http_timeout(),
        )?
        .with_retry_policy(RetryPolicy {
            max_retries: config.tmdb_max_retries,
            backoff: std::time::Duration::from_millis(config.tmdb_backoff_ms),
        });

        let omdb = OmdbClient::new(config.omdb_api_key.clone(), config.omdb_api_url.clone())?;
        if config.omdb_api_key.trim().is_empty() {
            tracing::warn!("OMDB_API_KEY is blank; awards enrichment disabled");
        } else {
            tmdb = tmdb.with_omdb(omdb.clone());
        }

        let accounts = FirebaseClient::new(
            config.firebase_api_key.clone(),
            config.firebase_auth_url.clone(),
            config.firebase_db_url.clone(),
            config.http_timeout(),
        )?;

        let insights = PerplexityClient::new(
            config.ai_api_key().map(str::to_string),
            config.perplexity_api_url.clone(),
            config.perplexity_model.clone(),
            config.http_timeout(),
        )?;

        tracing::info!(
            provider = tmdb.name(),
            cache_path = %config.cache_path.display(),
            ai_enabled = insights.is_enabled(),
            "Providers configured"
        );

        Ok(Self {
            catalog: Arc::new(tmdb),
            accounts,
            insights,
            omdb,
        })
    }
}

/// Session passed by the caller, if any
///
/// Expects `Authorization: Bearer <idToken>` and `X-User-Id: <localId>`.
pub fn session_from_headers(headers: &HeaderMap) -> Option<Session> {
    let id_token = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())?;
    let local_id = headers
        .get(USER_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|id| !id.is_empty())?;

    let mut session = Session::new(id_token, local_id);
    session.email = headers
        .get(USER_EMAIL_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::to_string);
    Some(session)
}

/// Creates the application router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .with_state(Arc::new(state))
        .layer(
            ServiceBuilder::new()
                .layer(set_request_id_layer())
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(propagate_request_id_layer())
                .layer(CorsLayer::permissive()),
        )
}

/// API routes under /api/v1
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/search", get(titles::search))
        .route("/trending", get(titles::trending))
        .route("/titles/:kind/:id", get(titles::details))
        .route("/omdb/search", get(omdb::search))
        .route("/omdb/title", get(omdb::title))
        .route("/auth/signup", post(account::sign_up))
        .route("/auth/signin", post(account::sign_in))
        .route("/account", post(account::update_account))
        .route("/account/profile", post(account::update_profile))
        .route(
            "/watchlist",
            get(watchlist::get_watchlist).delete(watchlist::clear_watchlist),
        )
        .route(
            "/watchlist/:id",
            put(watchlist::add_to_watchlist).delete(watchlist::remove_from_watchlist),
        )
        .route("/insights", post(insights::insights))
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::services::providers::MockMetadataProvider;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use std::time::Duration;
    use tower::ServiceExt;

    /// State whose account and AI clients point at an unroutable address
    pub fn state_with(catalog: MockMetadataProvider) -> AppState {
        AppState {
            catalog: Arc::new(catalog),
            accounts: FirebaseClient::new(
                "key".to_string(),
                "http://127.0.0.1:9/v1".to_string(),
                "http://127.0.0.1:9".to_string(),
                Duration::from_millis(200),
            )
            .unwrap(),
            insights: PerplexityClient::new(
                None,
                "http://127.0.0.1:9".to_string(),
                "sonar".to_string(),
                Duration::from_millis(200),
            )
            .unwrap(),
            omdb: OmdbClient::new("key".to_string(), "http://127.0.0.1:9/".to_string()).unwrap(),
        }
    }

    pub async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    pub fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }
}
