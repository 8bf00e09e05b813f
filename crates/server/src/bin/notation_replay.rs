//! Replay a recorded notation request offline and print the transcript.
//!
//! Usage: cargo run --bin notation-replay -- <payload.json>
//!
//! The payload has the same shape as the body of `POST /api/notation`.
//! Squares that need classifying are sent to CLASSIFIER_URL.

use std::fs;
use std::time::Duration;

use anyhow::{bail, Context};
use server::clients::classifier::HttpClassifier;
use server::config::Config;
use server::routes::notation::{transcribe, NotationRequest};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .init();

    let Some(path) = std::env::args().nth(1) else {
        bail!("usage: notation-replay <payload.json>");
    };

    let config = Config::from_env();
    let classifier = HttpClassifier::new(
        config.classifier_url.clone(),
        Duration::from_secs(config.classifier_timeout_secs),
    )?;

    println!("Reading {path}...");
    let raw = fs::read_to_string(&path).with_context(|| format!("Failed to read {path}"))?;
    let request: NotationRequest =
        serde_json::from_str(&raw).with_context(|| format!("Invalid payload in {path}"))?;
    println!("Found {} snapshots", request.snapshots.len());

    let response = transcribe(
        request,
        classifier,
        config.notation_style,
        config.classifier_top_k,
    )
    .await
    .context("Failed to reconstruct the game")?;

    print!("{}", response.transcript);
    println!();
    println!("{}", response.movetext);
    Ok(())
}
