use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::layout::engine::AutoFitConfig;

const DEFAULT_AI_BASE_URL: &str = "https://api.openai.com";
const DEFAULT_AI_MODEL: &str = "gpt-4o-mini";

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: String,
    pub ai_base_url: String,
    pub ai_model: String,
    /// Language requested from the AI when the client does not specify one.
    pub default_language: String,
    pub port: u16,
    pub rust_log: String,
    pub layout: AutoFitConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = AutoFitConfig::default();
        let layout = AutoFitConfig {
            target_height_px: optional_env("LAYOUT_TARGET_HEIGHT_PX", defaults.target_height_px)?,
            overflow_tolerance_px: optional_env(
                "LAYOUT_OVERFLOW_TOLERANCE_PX",
                defaults.overflow_tolerance_px,
            )?,
            grow_margin_px: optional_env("LAYOUT_GROW_MARGIN_PX", defaults.grow_margin_px)?,
            scale_floor: optional_env("LAYOUT_SCALE_FLOOR", defaults.scale_floor)?,
            settle: Duration::from_millis(optional_env(
                "LAYOUT_SETTLE_MS",
                defaults.settle.as_millis() as u64,
            )?),
            typography_ladder: optional_env("LAYOUT_TYPOGRAPHY_LADDER", defaults.typography_ladder)?,
        };
        validate_layout(&layout)?;

        Ok(Config {
            openai_api_key: require_env("OPENAI_API_KEY")?,
            ai_base_url: std::env::var("AI_BASE_URL").unwrap_or_else(|_| DEFAULT_AI_BASE_URL.to_string()),
            ai_model: std::env::var("AI_MODEL").unwrap_or_else(|_| DEFAULT_AI_MODEL.to_string()),
            default_language: std::env::var("DEFAULT_LANGUAGE").unwrap_or_else(|_| "French".to_string()),
            port: optional_env("PORT", 8080u16)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            layout,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
        Err(_) => Ok(default),
    }
}

fn validate_layout(layout: &AutoFitConfig) -> Result<()> {
    anyhow::ensure!(
        layout.target_height_px > 0.0,
        "LAYOUT_TARGET_HEIGHT_PX must be positive"
    );
    anyhow::ensure!(
        layout.overflow_tolerance_px >= 0.0 && layout.grow_margin_px > layout.overflow_tolerance_px,
        "LAYOUT_GROW_MARGIN_PX must exceed LAYOUT_OVERFLOW_TOLERANCE_PX"
    );
    anyhow::ensure!(
        layout.scale_floor > 0.0 && layout.scale_floor <= 1.0,
        "LAYOUT_SCALE_FLOOR must be in (0, 1]"
    );
    Ok(())
}
