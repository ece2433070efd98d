/// Firebase identity + realtime database client
///
/// Identity calls (`accounts:*`) authenticate with the Web API key as a query
/// parameter. Database calls address `/users/{localId}/...json` and
/// authenticate with the caller's id token as the `auth` query parameter.
///
/// Nothing is cached and nothing is retried: every call is one round trip and
/// its outcome is reported as-is.
use crate::{
    error::{AppError, AppResult},
    models::{account::validate_watchlist_id, AccountUpdate, Session, Watchlist, WatchlistItem},
    services::providers::http,
};
use reqwest::{Client as HttpClient, Response, StatusCode};
use serde_json::{json, Map, Value};
use std::time::Duration;

const PROVIDER: &str = "firebase";

#[derive(Clone)]
pub struct FirebaseClient {
    http_client: HttpClient,
    api_key: String,
    auth_url: String,
    db_url: String,
}

/// Decodes entries one by one so a single malformed item cannot hide the rest
fn decode_watchlist(user_id: &str, raw: Map<String, Value>) -> Watchlist {
    raw.into_iter()
        .filter_map(|(id, value)| match serde_json::from_value::<WatchlistItem>(value) {
            Ok(item) => Some((id, item)),
            Err(e) => {
                tracing::warn!(
                    user_id = %user_id,
                    item_id = %id,
                    error = %e,
                    "Skipping unreadable watchlist entry"
                );
                None
            }
        })
        .collect()
}

fn require_live(session: &Session) -> AppResult<&Session> {
    if session.is_live() {
        Ok(session)
    } else {
        Err(AppError::NotAuthenticated)
    }
}

fn stored(status: StatusCode) -> bool {
    status == StatusCode::OK || status == StatusCode::NO_CONTENT
}

impl FirebaseClient {
    pub fn new(
        api_key: String,
        auth_url: String,
        db_url: String,
        timeout: Duration,
    ) -> AppResult<Self> {
        Ok(Self {
            http_client: http::build_client(timeout)?,
            api_key,
            auth_url: auth_url.trim_end_matches('/').to_string(),
            db_url: db_url.trim_end_matches('/').to_string(),
        })
    }

    /// Creates an account and seeds an empty profile for it
    pub async fn sign_up(&self, email: &str, password: &str) -> AppResult<Session> {
        let payload = json!({
            "email": email,
            "password": password,
            "returnSecureToken": true
        });
        let data = self.identity_post("signUp", &payload, "Sign up failed").await?;
        let session = session_from(data)?;

        tracing::info!(user_id = %session.local_id, "Account created");

        if let Err(e) = self.seed_profile(&session).await {
            tracing::warn!(user_id = %session.local_id, error = %e, "Failed to seed user profile");
        }

        Ok(session)
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> AppResult<Session> {
        let payload = json!({
            "email": email,
            "password": password,
            "returnSecureToken": true
        });
        let data = self
            .identity_post("signInWithPassword", &payload, "Sign in failed")
            .await?;
        let session = session_from(data)?;

        tracing::info!(user_id = %session.local_id, "Signed in");

        Ok(session)
    }

    /// Changes email and/or password; returns the session with the provider's updates applied
    pub async fn update_account(
        &self,
        session: &Session,
        update: &AccountUpdate,
    ) -> AppResult<Session> {
        let session = require_live(session)?;
        if update.is_empty() {
            return Err(AppError::InvalidArgument(
                "Provide a new email or password".to_string(),
            ));
        }

        let mut payload = Map::new();
        payload.insert("idToken".to_string(), json!(session.id_token));
        payload.insert("returnSecureToken".to_string(), json!(true));
        if let Some(email) = update.email.as_deref().filter(|e| !e.is_empty()) {
            payload.insert("email".to_string(), json!(email));
        }
        if let Some(password) = update.password.as_deref().filter(|p| !p.is_empty()) {
            payload.insert("password".to_string(), json!(password));
        }

        let data = self
            .identity_post("update", &Value::Object(payload), "Failed to update account")
            .await?;

        tracing::info!(user_id = %session.local_id, "Account updated");

        session.merged(data)
    }

    pub async fn update_profile(&self, session: &Session, display_name: &str) -> AppResult<()> {
        let session = require_live(session)?;
        let response = self
            .http_client
            .patch(self.user_url(session, "profile"))
            .query(&[("auth", session.id_token.as_str())])
            .json(&json!({ "name": display_name }))
            .send()
            .await?;

        ensure_stored(response, "Failed to update profile").await
    }

    pub async fn add_to_watchlist(
        &self,
        session: &Session,
        id: &str,
        item: &WatchlistItem,
    ) -> AppResult<()> {
        let session = require_live(session)?;
        let id = validate_watchlist_id(id)?;
        let response = self
            .http_client
            .put(self.user_url(session, &format!("watchlist/{}", id)))
            .query(&[("auth", session.id_token.as_str())])
            .json(item)
            .send()
            .await?;

        ensure_stored(response, "Failed to save to watchlist").await?;
        tracing::info!(user_id = %session.local_id, item_id = %id, "Added to watchlist");
        Ok(())
    }

    pub async fn get_watchlist(&self, session: &Session) -> AppResult<Watchlist> {
        let session = require_live(session)?;
        let response = self
            .http_client
            .get(self.user_url(session, "watchlist"))
            .query(&[("auth", session.id_token.as_str())])
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            return Err(AppError::upstream(
                PROVIDER,
                response.status().as_u16(),
                "Failed to fetch watchlist",
            ));
        }

        // An empty node comes back as `null`
        let raw: Option<Map<String, Value>> = http::decode_json(response, PROVIDER).await?;
        Ok(decode_watchlist(&session.local_id, raw.unwrap_or_default()))
    }

    pub async fn remove_from_watchlist(&self, session: &Session, id: &str) -> AppResult<()> {
        let session = require_live(session)?;
        let id = validate_watchlist_id(id)?;
        let response = self
            .http_client
            .delete(self.user_url(session, &format!("watchlist/{}", id)))
            .query(&[("auth", session.id_token.as_str())])
            .send()
            .await?;

        ensure_stored(response, "Failed to remove from watchlist").await?;
        tracing::info!(user_id = %session.local_id, item_id = %id, "Removed from watchlist");
        Ok(())
    }

    pub async fn clear_watchlist(&self, session: &Session) -> AppResult<()> {
        let session = require_live(session)?;
        let response = self
            .http_client
            .delete(self.user_url(session, "watchlist"))
            .query(&[("auth", session.id_token.as_str())])
            .send()
            .await?;

        ensure_stored(response, "Failed to clear watchlist").await?;
        tracing::info!(user_id = %session.local_id, "Cleared watchlist");
        Ok(())
    }

    /// `{db}/users/{uid}.json` for an empty path, `{db}/users/{uid}/{path}.json` otherwise
    fn user_url(&self, session: &Session, path: &str) -> String {
        if path.is_empty() {
            format!("{}/users/{}.json", self.db_url, session.local_id)
        } else {
            format!("{}/users/{}/{}.json", self.db_url, session.local_id, path)
        }
    }

    async fn seed_profile(&self, session: &Session) -> AppResult<()> {
        let response = self
            .http_client
            .patch(self.user_url(session, ""))
            .query(&[("auth", session.id_token.as_str())])
            .json(&json!({
                "email": session.email,
                "watchlist": {}
            }))
            .send()
            .await?;

        ensure_stored(response, "Failed to seed user profile").await
    }

    /// POSTs to `accounts:{endpoint}`; a non-200 reply becomes [`AppError::Auth`]
    async fn identity_post(
        &self,
        endpoint: &str,
        payload: &Value,
        fallback: &str,
    ) -> AppResult<Map<String, Value>> {
        let url = format!("{}/accounts:{}", self.auth_url, endpoint);
        let response = self
            .http_client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(payload)
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let message = http::json_error_message(&body, "/error/message")
                .unwrap_or_else(|| fallback.to_string());
            tracing::warn!(
                endpoint = %endpoint,
                status = status.as_u16(),
                message = %message,
                provider = PROVIDER,
                "Identity request rejected"
            );
            return Err(AppError::Auth(message));
        }

        http::decode_json(response, PROVIDER).await
    }
}

fn session_from(data: Map<String, Value>) -> AppResult<Session> {
    serde_json::from_value(Value::Object(data))
        .map_err(|e| AppError::malformed(PROVIDER, format!("Invalid auth payload: {}", e)))
}

async fn ensure_stored(response: Response, message: &str) -> AppResult<()> {
    let status = response.status();
    if stored(status) {
        return Ok(());
    }

    let body = response.text().await.unwrap_or_default();
    tracing::warn!(status = status.as_u16(), body = %body, provider = PROVIDER, "{}", message);
    Err(AppError::upstream(PROVIDER, status.as_u16(), message))
}
