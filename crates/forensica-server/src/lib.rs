//! HTTP server assembly for Forensica.
//!
//! Mounts the JSON/multipart API from `forensica-api` under `/api` and adds
//! request tracing. [`serve`] runs the router and closes the store on exit;
//! the binary in `main.rs` owns configuration loading.

use std::{
  future::Future,
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use axum::Router;
use forensica_api::UploadLimits;
use forensica_core::store::AnalysisStore;
use forensica_store_sqlite::SqliteStore;
use serde::Deserialize;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `FORENSICA_*` environment variables. Every field has a default.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
  pub host:             String,
  pub port:             u16,
  pub store_path:       PathBuf,
  pub max_upload_bytes: usize,
  pub max_text_bytes:   usize,
}

impl Default for ServerConfig {
  fn default() -> Self {
    let limits = UploadLimits::default();
    Self {
      host:             "0.0.0.0".to_string(),
      port:             3000,
      store_path:       PathBuf::from("forensica.db"),
      max_upload_bytes: limits.max_upload_bytes,
      max_text_bytes:   limits.max_text_bytes,
    }
  }
}

impl ServerConfig {
  pub fn limits(&self) -> UploadLimits {
    UploadLimits {
      max_upload_bytes: self.max_upload_bytes,
      max_text_bytes:   self.max_text_bytes,
    }
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  /// `store_path` with a leading `~` expanded to the user's home directory.
  pub fn resolved_store_path(&self) -> PathBuf { expand_tilde(&self.store_path) }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the application [`Router`] for `store`.
pub fn router<S>(store: Arc<S>, config: &ServerConfig) -> Router
where
  S: AnalysisStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Router::new()
    .nest("/api", forensica_api::api_router(store, config.limits()))
    .layer(TraceLayer::new_for_http())
}

/// Serve `store` on `listener` until `shutdown` resolves, then close the
/// store. The store is closed whether or not serving failed.
pub async fn serve(
  listener: TcpListener,
  store: SqliteStore,
  config: &ServerConfig,
  shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
  let app = router(Arc::new(store.clone()), config);

  let served = axum::serve(listener, app)
    .with_graceful_shutdown(shutdown)
    .await;

  let closed = store.close().await;
  served.context("server error")?;
  closed.context("failed to close store")?;
  tracing::info!("store closed");
  Ok(())
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use forensica_core::{
    analysis::{NewAnalysis, Score},
    modality::Modality,
  };
  use serde_json::{Value, json};
  use tower::ServiceExt as _;

  const BOUNDARY: &str = "forensica-test-boundary";

  async fn make_store() -> Arc<SqliteStore> {
    Arc::new(SqliteStore::open_in_memory().await.unwrap())
  }

  fn config() -> ServerConfig {
    ServerConfig {
      store_path: PathBuf::from(":memory:"),
      ..ServerConfig::default()
    }
  }

  /// A multipart field: name, optional filename, content.
  type Part<'a> = (&'a str, Option<&'a str>, &'a [u8]);

  fn field<'a>(name: &'a str, value: &'a str) -> Part<'a> {
    (name, None, value.as_bytes())
  }

  fn file<'a>(filename: &'a str, data: &'a [u8]) -> Part<'a> {
    ("file", Some(filename), data)
  }

  fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, filename, data) in parts {
      body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
      match filename {
        Some(f) => body.extend_from_slice(
          format!(
            "Content-Disposition: form-data; name=\"{name}\"; filename=\"{f}\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n"
          )
          .as_bytes(),
        ),
        None => body.extend_from_slice(
          format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
        ),
      }
      body.extend_from_slice(data);
      body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
  }

  async fn send(
    store:  Arc<SqliteStore>,
    config: &ServerConfig,
    req:    Request<Body>,
  ) -> (StatusCode, Value) {
    let resp = router(store, config).oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    let value = if bytes.is_empty() {
      Value::Null
    } else {
      serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
  }

  async fn detect(
    store: Arc<SqliteStore>,
    parts: &[Part<'_>],
  ) -> (StatusCode, Value) {
    detect_with(store, &config(), parts).await
  }

  async fn detect_with(
    store:  Arc<SqliteStore>,
    config: &ServerConfig,
    parts:  &[Part<'_>],
  ) -> (StatusCode, Value) {
    let req = Request::builder()
      .method("POST")
      .uri("/api/detect")
      .header(
        header::CONTENT_TYPE,
        format!("multipart/form-data; boundary={BOUNDARY}"),
      )
      .body(Body::from(multipart_body(parts)))
      .unwrap();
    send(store, config, req).await
  }

  async fn get_json(store: Arc<SqliteStore>, uri: &str) -> (StatusCode, Value) {
    let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(store, &config(), req).await
  }

  async fn post_json(
    store: Arc<SqliteStore>,
    uri:   &str,
    body:  Value,
  ) -> (StatusCode, Value) {
    let req = Request::builder()
      .method("POST")
      .uri(uri)
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from(body.to_string()))
      .unwrap();
    send(store, &config(), req).await
  }

  fn score_of(v: &Value) -> u64 { v["score"].as_u64().unwrap() }

  // ── Detect ──────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn detect_human_text() {
    let store = make_store().await;
    let (status, body) = detect(store.clone(), &[
      field("modality", "text"),
      field("textContent", "This is a short human note."),
    ])
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["type"], "text");
    assert_eq!(body["generation_source"], "HUMAN");
    assert!((55..=94).contains(&score_of(&body)));
    assert!(body["id"].as_i64().is_some());
    assert!(body["justification"].as_str().is_some());
    let confidence = body["confidence"].as_f64().unwrap();
    assert!((0.80..1.0).contains(&confidence));
    let breakdown = body["breakdown"].as_array().unwrap();
    assert_eq!(breakdown.len(), 3);
    assert_eq!(breakdown[0]["label"], "Perplexity Score");
    assert_eq!(breakdown[0]["value"], 75.0);
  }

  #[tokio::test]
  async fn detect_keyword_text_is_ai() {
    let store = make_store().await;
    let (status, body) = detect(store, &[
      field("modality", "text"),
      field("textContent", "We must delve into a comprehensive review of the findings."),
    ])
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["generation_source"], "AI");
    assert!((10..=29).contains(&score_of(&body)));
  }

  #[tokio::test]
  async fn detect_photo_upload() {
    let store = make_store().await;
    let (status, body) = detect(store.clone(), &[
      field("modality", "photo"),
      file("cat.jpg", b"\xff\xd8\xff\xe0 not really a jpeg"),
    ])
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["type"], "photo");
    let score = score_of(&body);
    assert!((10..=39).contains(&score) || (65..=94).contains(&score));
    let expected = if score > 50 { "HUMAN" } else { "AI" };
    assert_eq!(body["generation_source"], expected);

    let (_, stats) = get_json(store, "/api/stats").await;
    assert_eq!(stats["totalAttempts"], 1);
  }

  #[tokio::test]
  async fn detect_missing_modality_is_rejected_without_side_effects() {
    let store = make_store().await;
    let (status, body) =
      detect(store.clone(), &[field("textContent", "whatever you like")]).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Modality is required" }));

    let (_, stats) = get_json(store, "/api/stats").await;
    assert_eq!(stats["totalAttempts"], 0);
  }

  #[tokio::test]
  async fn detect_invalid_modality_is_rejected_without_side_effects() {
    let store = make_store().await;
    let (status, body) = detect(store.clone(), &[
      field("modality", "hologram"),
      file("x.bin", b"\x00\x01"),
    ])
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Invalid modality" }));

    let (_, history) = get_json(store, "/api/history").await;
    assert_eq!(history, json!([]));
  }

  #[tokio::test]
  async fn detect_media_without_file_is_rejected() {
    let store = make_store().await;
    let (status, body) = detect(store, &[field("modality", "video")]).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("file"));
  }

  #[tokio::test]
  async fn detect_oversized_upload_is_rejected() {
    let store = make_store().await;
    let cfg = ServerConfig {
      max_upload_bytes: 8,
      ..config()
    };
    let (status, _) = detect_with(store.clone(), &cfg, &[
      field("modality", "audio"),
      file("clip.wav", b"RIFF....WAVEfmt "),
    ])
    .await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);

    let (_, stats) = get_json(store, "/api/stats").await;
    assert_eq!(stats["totalAttempts"], 0);
  }

  #[tokio::test]
  async fn detect_without_multipart_is_rejected() {
    let store = make_store().await;
    let (status, body) =
      post_json(store, "/api/detect", json!({ "modality": "text" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
  }

  // ── Feedback & stats ────────────────────────────────────────────────────────

  #[tokio::test]
  async fn stats_on_empty_store() {
    let store = make_store().await;
    let (status, body) = get_json(store, "/api/stats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
      body,
      json!({ "totalAttempts": 0, "averageAccuracy": 85, "learningProgress": 51 })
    );
  }

  #[tokio::test]
  async fn feedback_drives_accuracy() {
    let store = make_store().await;
    let (_, first) = detect(store.clone(), &[
      field("modality", "text"),
      field("textContent", "This is a short human note."),
    ])
    .await;
    let id = first["id"].as_i64().unwrap();

    for is_correct in [true, true, true, false] {
      let (status, body) = post_json(
        store.clone(),
        "/api/feedback",
        json!({ "analysisId": id, "rating": 4, "isCorrect": is_correct }),
      )
      .await;
      assert_eq!(status, StatusCode::OK);
      assert_eq!(body, json!({ "success": true }));
    }

    let (_, stats) = get_json(store, "/api/stats").await;
    assert_eq!(stats["totalAttempts"], 1);
    assert_eq!(stats["averageAccuracy"], 75);
    assert_eq!(stats["learningProgress"], 45);
  }

  #[tokio::test]
  async fn feedback_for_unknown_analysis_is_accepted() {
    let store = make_store().await;
    let (status, body) = post_json(
      store,
      "/api/feedback",
      json!({ "analysisId": 424242, "rating": 1, "isCorrect": false }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
  }

  #[tokio::test]
  async fn feedback_missing_field_is_rejected() {
    let store = make_store().await;
    let (status, body) = post_json(
      store.clone(),
      "/api/feedback",
      json!({ "analysisId": 1, "rating": 5 }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("isCorrect"));

    let (_, stats) = get_json(store, "/api/stats").await;
    assert_eq!(stats["averageAccuracy"], 85);
  }

  // ── History ─────────────────────────────────────────────────────────────────

  async fn seed(store: &SqliteStore, n: u8) -> Vec<i64> {
    use forensica_core::store::AnalysisStore as _;
    let mut ids = Vec::new();
    for i in 0..n {
      let a = store
        .insert_analysis(NewAnalysis::new(
          Modality::Audio,
          Score::new(i % 101).unwrap(),
          0.9,
          "seeded",
        ))
        .await
        .unwrap();
      ids.push(a.id);
    }
    ids
  }

  #[tokio::test]
  async fn history_is_newest_first_and_capped() {
    let store = make_store().await;
    let ids = seed(&store, 60).await;

    let (status, body) = get_json(store, "/api/history").await;
    assert_eq!(status, StatusCode::OK);
    let items = body.as_array().unwrap();
    assert_eq!(items.len(), 50);

    let got: Vec<i64> = items.iter().map(|i| i["id"].as_i64().unwrap()).collect();
    let expected: Vec<i64> = ids.iter().rev().take(50).copied().collect();
    assert_eq!(got, expected);

    let first = &items[0];
    for key in [
      "id",
      "modality",
      "source",
      "score",
      "confidence",
      "justification",
      "timestamp",
    ] {
      assert!(first.get(key).is_some(), "missing {key}");
    }
    assert_eq!(first["modality"], "audio");
  }

  #[tokio::test]
  async fn history_entry_lookup() {
    let store = make_store().await;
    let ids = seed(&store, 2).await;

    let (status, body) = get_json(store.clone(), &format!("/api/history/{}", ids[1])).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], ids[1]);

    let (status, _) = get_json(store, "/api/history/99999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn history_lookup_with_non_numeric_id_is_json_400() {
    let store = make_store().await;
    let (status, body) = get_json(store, "/api/history/abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string(), "{body}");
  }

  #[tokio::test]
  async fn clear_empties_history_and_resets_stats() {
    let store = make_store().await;
    let ids = seed(&store, 3).await;
    post_json(
      store.clone(),
      "/api/feedback",
      json!({ "analysisId": ids[0], "rating": 2, "isCorrect": false }),
    )
    .await;

    let (status, body) = post_json(store.clone(), "/api/history/clear", Value::Null).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true }));

    let (_, history) = get_json(store.clone(), "/api/history").await;
    assert_eq!(history, json!([]));
    let (_, stats) = get_json(store.clone(), "/api/stats").await;
    assert_eq!(
      stats,
      json!({ "totalAttempts": 0, "averageAccuracy": 85, "learningProgress": 51 })
    );

    let (_, next) = detect(store, &[
      field("modality", "photo"),
      file("a.png", b"\x89PNG"),
    ])
    .await;
    assert!(next["id"].as_i64().unwrap() > *ids.last().unwrap());
  }

  // ── Lifecycle ───────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn serve_closes_store_on_shutdown() {
    let dir = std::env::temp_dir().join(format!(
      "forensica-serve-test-{}",
      std::process::id()
    ));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("forensica.db");

    let store = SqliteStore::open(&path).await.unwrap();
    store
      .insert_analysis(NewAnalysis::new(
        Modality::Audio,
        Score::new(62).unwrap(),
        0.9,
        String::from("kept"),
      ))
      .await
      .unwrap();
    let handle = store.clone();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();

    serve(listener, store, &config(), async {}).await.unwrap();

    // Every clone shares the now-closed connection.
    assert!(handle.snapshot().await.is_err());

    let reopened = SqliteStore::open(&path).await.unwrap();
    assert_eq!(reopened.snapshot().await.unwrap().total_analyses, 1);
    reopened.close().await.unwrap();
    std::fs::remove_dir_all(&dir).ok();
  }

  // ── Config ──────────────────────────────────────────────────────────────────

  #[test]
  fn config_defaults() {
    let cfg = ServerConfig::default();
    assert_eq!(cfg.address(), "0.0.0.0:3000");
    assert_eq!(cfg.limits(), UploadLimits::default());
  }

  #[test]
  fn tilde_is_expanded() {
    if let Ok(home) = std::env::var("HOME") {
      let cfg = ServerConfig {
        store_path: PathBuf::from("~/data/forensica.db"),
        ..ServerConfig::default()
      };
      assert_eq!(
        cfg.resolved_store_path(),
        PathBuf::from(home).join("data/forensica.db")
      );
    }
    assert_eq!(expand_tilde(Path::new("/abs/x.db")), PathBuf::from("/abs/x.db"));
  }
}
