use serde::Deserialize;
use std::{path::PathBuf, time::Duration};

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// TMDB API key
    pub tmdb_api_key: String,

    /// TMDB API base URL
    #[serde(default = "default_tmdb_api_url")]
    pub tmdb_api_url: String,

    /// TMDB image CDN base URL
    #[serde(default = "default_tmdb_image_url")]
    pub tmdb_image_url: String,

    /// OMDb API key, used for awards enrichment
    pub omdb_api_key: String,

    /// OMDb API base URL
    #[serde(default = "default_omdb_api_url")]
    pub omdb_api_url: String,

    /// Firebase Web API key
    pub firebase_api_key: String,

    /// Firebase Realtime Database URL
    pub firebase_db_url: String,

    /// Firebase Identity Toolkit base URL
    #[serde(default = "default_firebase_auth_url")]
    pub firebase_auth_url: String,

    /// Perplexity API key. AI insights are disabled when unset.
    #[serde(default)]
    pub perplexity_api_key: Option<String>,

    /// Perplexity API base URL
    #[serde(default = "default_perplexity_api_url")]
    pub perplexity_api_url: String,

    /// Perplexity chat model
    #[serde(default = "default_perplexity_model")]
    pub perplexity_model: String,

    /// Location of the TMDB response cache file
    #[serde(default = "default_cache_path")]
    pub cache_path: PathBuf,

    /// Cache entry lifetime in seconds
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Per-request timeout for outbound calls
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,

    /// Retries for TMDB GETs that hit a 5xx or a transport failure
    #[serde(default = "default_tmdb_max_retries")]
    pub tmdb_max_retries: u32,

    /// Base delay between TMDB retries, doubled on each attempt
    #[serde(default = "default_tmdb_backoff_ms")]
    pub tmdb_backoff_ms: u64,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_tmdb_api_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_tmdb_image_url() -> String {
    "https://image.tmdb.org/t/p".to_string()
}

fn default_omdb_api_url() -> String {
    "http://www.omdbapi.com/".to_string()
}

fn default_firebase_auth_url() -> String {
    "https://identitytoolkit.googleapis.com/v1".to_string()
}

fn default_perplexity_api_url() -> String {
    "https://api.perplexity.ai".to_string()
}

fn default_perplexity_model() -> String {
    "sonar".to_string()
}

fn default_cache_path() -> PathBuf {
    PathBuf::from("tmdb_cache.json")
}

fn default_cache_ttl_secs() -> u64 {
    3600
}

fn default_http_timeout_secs() -> u64 {
    10
}

fn default_tmdb_max_retries() -> u32 {
    3
}

fn default_tmdb_backoff_ms() -> u64 {
    500
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// Load configuration from explicit key/value pairs
    pub fn from_pairs<I>(pairs: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::from_iter::<_, Config>(pairs)
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// API key for AI insights, if one is set and non-blank
    pub fn ai_api_key(&self) -> Option<&str> {
        self.perplexity_api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}
