//! Shared test harness for integration tests.
//!
//! [`TestHarness`] creates a temporary media root, a config pointing at it,
//! and the full router, and sends requests through it with `oneshot`.

#![allow(dead_code)]

use std::path::Path;

use axum::{
    body::Body,
    http::{Method, Request, Response},
    Router,
};
use http_body_util::BodyExt;
use tempfile::TempDir;
use tower::ServiceExt;
use vidserve::config::Config;
use vidserve::server::{create_router, AppContext};
use vidserve_common::MediaToken;

/// Test harness wrapping a temporary media root and the router serving it.
pub struct TestHarness {
    pub root: TempDir,
    pub config: Config,
}

impl TestHarness {
    /// Media root holding `a.mp4` (1000 bytes), `sub/b.mkv` (20 bytes) and
    /// `notes.txt`.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Same fixture files with a custom configuration; the media root is
    /// replaced by the temporary directory.
    pub fn with_config(mut config: Config) -> Self {
        let root = tempfile::tempdir().expect("failed to create media root");
        config.media.root = root.path().to_path_buf();

        let harness = Self { root, config };
        harness.write("a.mp4", &pattern(1000));
        harness.write("sub/b.mkv", &[7u8; 20]);
        harness.write("notes.txt", b"not a video");
        harness
    }

    /// Write a file under the media root, creating parent directories.
    pub fn write(&self, relative: &str, data: &[u8]) {
        let path = self.root.path().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("failed to create parent dir");
        }
        std::fs::write(path, data).expect("failed to write fixture");
    }

    pub fn path(&self) -> &Path {
        self.root.path()
    }

    pub fn router(&self) -> Router {
        create_router(AppContext::new(self.config.clone()))
    }

    /// Send a GET with optional extra headers and collect the response.
    pub async fn get(&self, uri: &str, headers: &[(&str, &str)]) -> TestResponse {
        self.send(Method::GET, uri, headers).await
    }

    pub async fn head(&self, uri: &str, headers: &[(&str, &str)]) -> TestResponse {
        self.send(Method::HEAD, uri, headers).await
    }

    pub async fn send(&self, method: Method, uri: &str, headers: &[(&str, &str)]) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let request = builder.body(Body::empty()).expect("failed to build request");

        let response = self
            .router()
            .oneshot(request)
            .await
            .expect("router failed");
        TestResponse::collect(response).await
    }
}

/// Response with its body already collected.
pub struct TestResponse {
    pub status: u16,
    pub headers: axum::http::HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    async fn collect(response: Response<Body>) -> Self {
        let (parts, body) = response.into_parts();
        let body = body
            .collect()
            .await
            .expect("failed to read body")
            .to_bytes()
            .to_vec();
        Self {
            status: parts.status.as_u16(),
            headers: parts.headers,
            body,
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).expect("body is not JSON")
    }
}

/// Deterministic, position-dependent bytes so windows can be checked.
pub fn pattern(len: usize) -> Vec<u8> {
    (0..=255u8).cycle().take(len).collect()
}

/// Media id for a relative path.
pub fn id(relative: &str) -> String {
    MediaToken::encode(relative).to_string()
}
