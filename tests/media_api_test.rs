//! Catalog API tests: `GET /media` and `GET /media/:id`.

mod common;

use common::{id, TestHarness};

fn sorted_paths(json: &serde_json::Value) -> Vec<String> {
    let mut paths: Vec<String> = json
        .as_array()
        .expect("catalog is an array")
        .iter()
        .map(|e| e["path"].as_str().unwrap().to_string())
        .collect();
    paths.sort();
    paths
}

#[tokio::test]
async fn health_check_returns_ok() {
    let h = TestHarness::new();
    let resp = h.get("/health", &[]).await;
    assert_eq!(resp.status, 200);
    assert_eq!(resp.body, b"ok");
}

#[tokio::test]
async fn list_media_excludes_non_video_files() {
    let h = TestHarness::new();
    let resp = h.get("/media", &[]).await;
    assert_eq!(resp.status, 200);

    let json = resp.json();
    assert_eq!(sorted_paths(&json), vec!["a.mp4", "sub/b.mkv"]);

    let b = json
        .as_array()
        .unwrap()
        .iter()
        .find(|e| e["path"] == "sub/b.mkv")
        .unwrap();
    assert_eq!(b["id"], id("sub/b.mkv"));
    assert_eq!(b["name"], "b.mkv");
    assert_eq!(b["size"], 20);
    assert_eq!(b["mime"], "video/x-matroska");
}

#[tokio::test]
async fn list_media_is_idempotent() {
    let h = TestHarness::new();
    let first = sorted_paths(&h.get("/media", &[]).await.json());
    let second = sorted_paths(&h.get("/media", &[]).await.json());
    assert_eq!(first, second);
}

#[tokio::test]
async fn list_media_reflects_new_files() {
    let h = TestHarness::new();
    h.write("later/c.webm", b"webm");

    let resp = h.get("/media", &[]).await;
    assert_eq!(
        sorted_paths(&resp.json()),
        vec!["a.mp4", "later/c.webm", "sub/b.mkv"]
    );
}

#[tokio::test]
async fn list_media_missing_root_is_server_error() {
    let mut h = TestHarness::new();
    h.config.media.root = h.path().join("does-not-exist");

    let resp = h.get("/media", &[]).await;
    assert_eq!(resp.status, 500);
    assert_eq!(resp.json()["code"], "io_error");
}

#[tokio::test]
async fn get_media_returns_entry() {
    let h = TestHarness::new();
    let resp = h.get(&format!("/media/{}", id("a.mp4")), &[]).await;
    assert_eq!(resp.status, 200);

    let json = resp.json();
    assert_eq!(json["path"], "a.mp4");
    assert_eq!(json["name"], "a.mp4");
    assert_eq!(json["size"], 1000);
    assert_eq!(json["mime"], "video/mp4");
}

#[tokio::test]
async fn get_media_not_a_video_is_404() {
    let h = TestHarness::new();
    let resp = h.get(&format!("/media/{}", id("notes.txt")), &[]).await;
    assert_eq!(resp.status, 404);

    let json = resp.json();
    assert_eq!(json["code"], "not_found");
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn get_media_missing_is_404() {
    let h = TestHarness::new();
    let resp = h.get(&format!("/media/{}", id("gone.mp4")), &[]).await;
    assert_eq!(resp.status, 404);
}

#[tokio::test]
async fn get_media_invalid_id_is_400() {
    let h = TestHarness::new();
    let resp = h.get("/media/not=valid", &[]).await;
    assert_eq!(resp.status, 400);
    assert_eq!(resp.json()["code"], "invalid_id");
}

#[tokio::test]
async fn get_media_traversal_is_404() {
    let h = TestHarness::new();

    for relative in ["../escape.mp4", "sub/../../escape.mp4", "/etc/passwd.mp4"] {
        let resp = h.get(&format!("/media/{}", id(relative)), &[]).await;
        assert_eq!(resp.status, 404, "{relative}");
    }
}
