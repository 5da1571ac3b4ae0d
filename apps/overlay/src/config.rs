use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::feed::client::DEFAULT_RECONNECT_DELAY;
use crate::layout::autofit::{DEFAULT_MAX_FONT_SIZE, DEFAULT_MIN_FONT_SIZE};
use crate::layout::debounce::DEFAULT_DEBOUNCE;
use crate::layout::{FitBounds, Size};
use crate::settings::models::DEFAULT_WEBSOCKET_PATH;

/// Application configuration loaded from environment variables.
/// Every variable has a default; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub feed_url: String,
    pub feed_reconnect: Duration,
    pub fit_bounds: FitBounds,
    pub fit_debounce: Duration,
    pub fit_offset_px: u32,
    pub viewport: Size,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let min_size = parse_or(&lookup, "FIT_MIN_FONT_SIZE", DEFAULT_MIN_FONT_SIZE)?;
        let max_size = parse_or(&lookup, "FIT_MAX_FONT_SIZE", DEFAULT_MAX_FONT_SIZE)?;
        let fit_bounds = FitBounds::new(min_size, max_size)
            .context("FIT_MIN_FONT_SIZE must not exceed FIT_MAX_FONT_SIZE")?;

        Ok(Config {
            port: parse_or(&lookup, "PORT", 8080)?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            feed_url: lookup("FEED_URL").unwrap_or_else(|| DEFAULT_WEBSOCKET_PATH.to_string()),
            feed_reconnect: Duration::from_millis(parse_or(
                &lookup,
                "FEED_RECONNECT_MS",
                DEFAULT_RECONNECT_DELAY.as_millis() as u64,
            )?),
            fit_bounds,
            fit_debounce: Duration::from_millis(parse_or(
                &lookup,
                "FIT_DEBOUNCE_MS",
                DEFAULT_DEBOUNCE.as_millis() as u64,
            )?),
            fit_offset_px: parse_or(&lookup, "FIT_OFFSET_PX", 0)?,
            viewport: Size::new(
                parse_or(&lookup, "VIEWPORT_WIDTH", 1920)?,
                parse_or(&lookup, "VIEWPORT_HEIGHT", 1080)?,
            ),
        })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: {raw:?}")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.feed_url, "ws://localhost:4001/ws");
        assert_eq!(config.feed_reconnect, Duration::from_secs(3));
        assert_eq!(config.fit_bounds, FitBounds::default());
        assert_eq!(config.fit_debounce, Duration::from_millis(100));
        assert_eq!(config.fit_offset_px, 0);
        assert_eq!(config.viewport, Size::new(1920, 1080));
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("PORT", "9000"),
            ("FIT_MIN_FONT_SIZE", "20"),
            ("FIT_MAX_FONT_SIZE", "400"),
            ("FIT_OFFSET_PX", "4"),
            ("VIEWPORT_WIDTH", " 1280 "),
        ])
        .unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.fit_bounds, FitBounds::new(20, 400).unwrap());
        assert_eq!(config.fit_offset_px, 4);
        assert_eq!(config.viewport.width, 1280);
    }

    #[test]
    fn test_invalid_values_fail() {
        assert!(config(&[("PORT", "http")]).is_err());
        assert!(config(&[("FIT_MIN_FONT_SIZE", "500"), ("FIT_MAX_FONT_SIZE", "100")]).is_err());
    }
}
