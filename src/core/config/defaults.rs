use std::time::Duration;

use crate::core::config::data::{Config, ThemePreference};
use crate::core::constants::{
    DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_REVEAL_CHARS_PER_TICK,
    DEFAULT_REVEAL_INTERVAL_MS,
};
use crate::core::reveal::RevealConfig;
use crate::export::DEFAULT_EXPORT_WIDTH;

/// Keys accepted by `set` / `unset`.
pub const CONFIG_KEYS: &[&str] = &[
    "theme",
    "model",
    "base-url",
    "request-timeout",
    "reveal-chars-per-tick",
    "reveal-interval-ms",
    "export-width",
];

impl Config {
    pub fn theme_preference(&self) -> ThemePreference {
        self.theme.unwrap_or_default()
    }

    pub fn model_or_default(&self) -> &str {
        self.model.as_deref().unwrap_or(DEFAULT_MODEL)
    }

    pub fn base_url_or_default(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(
            self.request_timeout_secs
                .filter(|secs| *secs > 0)
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        )
    }

    pub fn reveal_config(&self) -> RevealConfig {
        RevealConfig::new(
            self.reveal_chars_per_tick
                .filter(|chars| *chars > 0)
                .unwrap_or(DEFAULT_REVEAL_CHARS_PER_TICK),
            Duration::from_millis(
                self.reveal_interval_ms
                    .filter(|ms| *ms > 0)
                    .unwrap_or(DEFAULT_REVEAL_INTERVAL_MS),
            ),
        )
    }

    pub fn export_width(&self) -> usize {
        self.export_width
            .filter(|width| *width >= 20)
            .unwrap_or(DEFAULT_EXPORT_WIDTH)
    }

    /// Apply `key = value` from the command line.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<(), String> {
        let value = value.trim();
        if value.is_empty() {
            return Err(format!("A value is required for {key}"));
        }
        match key {
            "theme" => self.theme = Some(ThemePreference::try_from(value)?),
            "model" => self.model = Some(value.to_string()),
            "base-url" => self.base_url = Some(value.trim_end_matches('/').to_string()),
            "request-timeout" => self.request_timeout_secs = Some(parse_positive(key, value)?),
            "reveal-chars-per-tick" => {
                self.reveal_chars_per_tick = Some(parse_positive(key, value)?)
            }
            "reveal-interval-ms" => self.reveal_interval_ms = Some(parse_positive(key, value)?),
            "export-width" => {
                let width: usize = parse_positive(key, value)?;
                if width < 20 {
                    return Err("export-width must be at least 20 columns".to_string());
                }
                self.export_width = Some(width);
            }
            _ => return Err(unknown_key(key)),
        }
        Ok(())
    }

    pub fn unset_value(&mut self, key: &str) -> Result<(), String> {
        match key {
            "theme" => self.theme = None,
            "model" => self.model = None,
            "base-url" => self.base_url = None,
            "request-timeout" => self.request_timeout_secs = None,
            "reveal-chars-per-tick" => self.reveal_chars_per_tick = None,
            "reveal-interval-ms" => self.reveal_interval_ms = None,
            "export-width" => self.export_width = None,
            _ => return Err(unknown_key(key)),
        }
        Ok(())
    }
}

fn parse_positive<T>(key: &str, value: &str) -> Result<T, String>
where
    T: std::str::FromStr + PartialOrd + Default,
{
    match value.parse::<T>() {
        Ok(parsed) if parsed > T::default() => Ok(parsed),
        _ => Err(format!("{key} must be a positive whole number")),
    }
}

fn unknown_key(key: &str) -> String {
    format!("Unknown config key: {key} (expected one of: {})", CONFIG_KEYS.join(", "))
}
