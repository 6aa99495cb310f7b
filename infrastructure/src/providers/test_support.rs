//! Local fake provider server for adapter tests.

use axum::Router;
use axum::http::HeaderMap;
use serde_json::Value;
use std::sync::{Arc, Mutex};

/// One request as seen by the fake server.
#[derive(Debug, Clone)]
pub(crate) struct Recorded {
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub body: Option<Value>,
}

pub(crate) type Recorder = Arc<Mutex<Vec<Recorded>>>;

pub(crate) fn record(
    recorder: &Recorder,
    uri: &axum::http::Uri,
    headers: &HeaderMap,
    body: Option<Value>,
) {
    recorder.lock().unwrap().push(Recorded {
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        authorization: headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body,
    });
}

/// Serves `router` on an ephemeral loopback port and returns its base URL.
pub(crate) async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}
