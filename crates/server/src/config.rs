use std::env;

use notation_core::GlyphStyle;

#[derive(Clone, Debug)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub classifier_url: String,
    pub classifier_timeout_secs: u64,
    pub classifier_top_k: usize,
    pub max_body_bytes: usize,
    pub notation_style: GlyphStyle,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8000),
            classifier_url: env::var("CLASSIFIER_URL")
                .unwrap_or_else(|_| "http://localhost:5000/predict".to_string()),
            classifier_timeout_secs: env::var("CLASSIFIER_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
            classifier_top_k: env::var("CLASSIFIER_TOP_K")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5),
            max_body_bytes: env::var("MAX_BODY_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(500 * 1024 * 1024), // 500 MB of photos per game
            notation_style: env::var("NOTATION_STYLE")
                .ok()
                .and_then(|v| parse_style(&v))
                .unwrap_or_default(),
        }
    }
}

pub fn parse_style(value: &str) -> Option<GlyphStyle> {
    match value.trim().to_ascii_lowercase().as_str() {
        "unicode" => Some(GlyphStyle::Unicode),
        "letters" | "san" => Some(GlyphStyle::Letters),
        _ => None,
    }
}
