//! Local stand-in for the entity-search API.

use crate::config::SearchConfig;
use axum::{Json, Router, extract::Query, http::StatusCode, routing::get};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

type Params = HashMap<String, String>;

pub(crate) struct Upstream {
    endpoint: String,
    hits: Arc<AtomicUsize>,
    last_params: Arc<Mutex<Option<Params>>>,
}

impl Upstream {
    pub(crate) async fn spawn(status: StatusCode, body: serde_json::Value) -> Self {
        let hits = Arc::new(AtomicUsize::new(0));
        let last_params = Arc::new(Mutex::new(None));
        let handler = {
            let hits = hits.clone();
            let last_params = last_params.clone();
            move |Query(params): Query<Params>| {
                let hits = hits.clone();
                let last_params = last_params.clone();
                let body = body.clone();
                async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    *last_params.lock().unwrap() = Some(params);
                    (status, Json(body))
                }
            }
        };
        let router = Router::new().route("/v1/search", get(handler));
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        Self {
            endpoint: format!("http://{addr}/v1/search"),
            hits,
            last_params,
        }
    }

    pub(crate) fn config(&self) -> SearchConfig {
        SearchConfig::new("test-key")
            .unwrap()
            .with_endpoint(self.endpoint.clone())
    }

    pub(crate) fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub(crate) fn last_params(&self) -> Option<Params> {
        self.last_params.lock().unwrap().clone()
    }
}

/// An endpoint on a port nothing listens on.
pub(crate) async fn unused_endpoint() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/v1/search")
}
