#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use axum::{
    extract::Query,
    http::{Method, StatusCode, Uri},
    Json, Router,
};
use serde_json::Value;

/// One request seen by a [`FakeUpstream`]
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub query: HashMap<String, String>,
    pub body: String,
}

impl Recorded {
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap_or(Value::Null)
    }
}

/// Local HTTP server standing in for a third-party API
pub struct FakeUpstream {
    pub url: String,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl FakeUpstream {
    /// Serves every request through `respond` on an ephemeral port
    pub async fn start<F>(respond: F) -> Self
    where
        F: Fn(&Recorded) -> (StatusCode, Value) + Send + Sync + 'static,
    {
        Self::start_with_delay(Duration::ZERO, respond).await
    }

    /// Like [`FakeUpstream::start`], but holds every response for `delay`
    pub async fn start_with_delay<F>(delay: Duration, respond: F) -> Self
    where
        F: Fn(&Recorded) -> (StatusCode, Value) + Send + Sync + 'static,
    {
        let respond = Arc::new(respond);
        let requests = Arc::new(Mutex::new(Vec::new()));
        let log = requests.clone();

        let app = Router::new().fallback(move |method: Method, uri: Uri, body: String| {
            let respond = respond.clone();
            let log = log.clone();
            async move {
                let query = Query::<HashMap<String, String>>::try_from_uri(&uri)
                    .map(|q| q.0)
                    .unwrap_or_default();
                let recorded = Recorded {
                    method,
                    path: uri.path().to_string(),
                    query,
                    body,
                };
                let (status, value) = respond(&recorded);
                log.lock().unwrap().push(recorded);
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                (status, Json(value))
            }
        });

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            url: format!("http://{}", addr),
            requests,
        }
    }

    pub fn hits(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }
}

/// Base URL of a local port with nothing listening on it
pub fn closed_port_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}
