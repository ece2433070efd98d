use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use super::MediaKind;
use crate::error::{AppError, AppResult};

/// Characters the realtime database rejects in a path segment
const FORBIDDEN_KEY_CHARS: &[char] = &['.', '$', '#', '[', ']', '/'];

/// Email/password pair for sign-up and sign-in
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Signed-in user, as returned by the identity provider.
///
/// The caller owns this value and passes it to every account operation;
/// nothing is kept server-side.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id_token: String,
    pub local_id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    /// Remaining provider fields, kept so the raw payload survives
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Session {
    pub fn new(id_token: impl Into<String>, local_id: impl Into<String>) -> Self {
        Self {
            id_token: id_token.into(),
            local_id: local_id.into(),
            email: None,
            refresh_token: None,
            expires_in: None,
            display_name: None,
            extra: Map::new(),
        }
    }

    /// A session is live when it carries both a token and a user id
    pub fn is_live(&self) -> bool {
        !self.id_token.is_empty() && !self.local_id.is_empty()
    }

    /// Overlays fields from an account-update response onto this session
    pub fn merged(&self, patch: Map<String, Value>) -> AppResult<Session> {
        let mut base = match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        };
        base.extend(patch);

        serde_json::from_value(Value::Object(base)).map_err(|e| {
            AppError::malformed("firebase", format!("Invalid account payload: {}", e))
        })
    }
}

/// Requested account changes; absent fields are left untouched
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccountUpdate {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl AccountUpdate {
    pub fn is_empty(&self) -> bool {
        self.email.as_deref().map_or(true, str::is_empty)
            && self.password.as_deref().map_or(true, str::is_empty)
    }
}

/// One saved title, stored under `/users/{uid}/watchlist/{id}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WatchlistItem {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub poster: Option<String>,
    #[serde(rename = "type")]
    pub kind: MediaKind,
}

/// Watchlist keyed by external id (usually the IMDB id)
pub type Watchlist = BTreeMap<String, WatchlistItem>;

/// Checks that `id` can be used as a database path segment
pub fn validate_watchlist_id(id: &str) -> AppResult<&str> {
    let id = id.trim();
    if id.is_empty() {
        return Err(AppError::InvalidArgument(
            "Watchlist id cannot be empty".to_string(),
        ));
    }
    if id.contains(FORBIDDEN_KEY_CHARS) {
        return Err(AppError::InvalidArgument(format!(
            "Watchlist id '{}' contains a reserved character",
            id
        )));
    }
    Ok(id)
}
