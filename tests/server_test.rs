//! Integration tests for the HTTP surface: the app and a mock classification
//! service both run in-process on ephemeral ports.

mod common;

use std::collections::HashMap;

use common::*;
use notation_core::GlyphStyle;
use serde_json::{json, Value};
use server::config::Config;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const OPENING: [&str; 6] = ["e4", "e5", "Nf3", "Nc6", "Bb5", "a6"];

fn config(classifier_url: String) -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        classifier_url,
        classifier_timeout_secs: 5,
        classifier_top_k: 5,
        max_body_bytes: 50 * 1024 * 1024,
        notation_style: GlyphStyle::Unicode,
    }
}

/// Start the app backed by a mock classifier that knows `labels`.
async fn spawn_app(labels: HashMap<String, notation_core::Figure>) -> String {
    let classifier_url = spawn_mock_classifier(labels).await;
    spawn(server::app(config(classifier_url)).unwrap()).await
}

/// Start the app with a classifier URL nothing listens on.
async fn spawn_app_without_classifier() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let dead = format!("http://{}/predict", listener.local_addr().unwrap());
    drop(listener);
    spawn(server::app(config(dead)).unwrap()).await
}

async fn post_notation(base: &str, body: &Value) -> reqwest::Response {
    client()
        .post(format!("{base}/api/notation"))
        .json(body)
        .send()
        .await
        .unwrap()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_health() {
    let base = spawn_app(HashMap::new()).await;
    let resp = client().get(format!("{base}/health")).send().await.unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_notation_from_beginning_in_letters() {
    let base = spawn_app(HashMap::new()).await;
    let positions = play_script(&OPENING);
    let body = json!({ "snapshots": game_payload(&positions, false), "style": "letters" });

    let resp = post_notation(&base, &body).await;
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();

    let moves: Vec<String> = serde_json::from_value(body["moves"].clone()).unwrap();
    assert_eq!(moves, OPENING);
    replay_letters(&moves);
    assert_eq!(body["movetext"], "1. e4 e5 2. Nf3 Nc6 3. Bb5 a6");
    assert_eq!(body["transcript"].as_str().unwrap().lines().count(), 3);
}

#[tokio::test]
async fn test_default_style_is_unicode() {
    let base = spawn_app(HashMap::new()).await;
    let positions = play_script(&OPENING[..3]);
    let body = json!({ "snapshots": game_payload(&positions, false) });

    let body: Value = post_notation(&base, &body).await.json().await.unwrap();
    assert_eq!(body["moves"], json!(["e4", "e5", "♘f3"]));
}

#[tokio::test]
async fn test_mid_game_start_uses_classifier_scores() {
    let positions = play_script(&OPENING);
    let base = spawn_app(identities(&positions[2])).await;
    let body = json!({
        "snapshots": game_payload(&positions[2..], false),
        "fromBeginning": false,
        "style": "letters",
    });

    let resp = post_notation(&base, &body).await;
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["moves"], json!(["Nf3", "Nc6", "Bb5", "a6"]));
}

#[tokio::test]
async fn test_unreachable_classifier_promotes_to_bishop() {
    let base = spawn_app_without_classifier().await;
    let positions = play_script(&["a4", "h5", "a5", "h4", "a6", "h3", "axb7", "hxg2", "bxa8=Q"]);
    let body = json!({ "snapshots": game_payload(&positions, false), "style": "letters" });

    let resp = post_notation(&base, &body).await;
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["moves"][8], "bxa8=B");
}

#[tokio::test]
async fn test_incomplete_snapshot_is_bad_request() {
    let base = spawn_app(HashMap::new()).await;
    let mut snapshot = snapshot_json(None, false);
    snapshot["squares"].as_array_mut().unwrap().pop();
    let body = json!({ "snapshots": [snapshot] });

    let resp = post_notation(&base, &body).await;
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["detail"], "Snapshot has 63 squares, expected 64");
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let base = spawn_app(HashMap::new()).await;
    let resp = client()
        .post(format!("{base}/api/notation"))
        .header("content-type", "application/json")
        .body(r#"{"snapshots": [{"squares": "nope"}]}"#)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn test_unrepairable_game_is_unprocessable() {
    let base = spawn_app(HashMap::new()).await;
    let positions = play_script(&OPENING[..2]);
    let mut snapshots = game_payload(&positions, false);
    // Every white pawn vanishes from the last photo
    let last = snapshots.last_mut().unwrap();
    for square in last["squares"].as_array_mut().unwrap() {
        if square["col"] == 1 {
            square["occupied"] = json!(false);
        }
    }

    let resp = post_notation(&base, &json!({ "snapshots": snapshots })).await;
    assert_eq!(resp.status(), 422);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(
        body["detail"],
        "Could not reconstruct the game from the given photos"
    );
    assert!(body.get("moves").is_none());
}
