//! User settings stored as settings.json in the app data directory

use crate::constants::{API_URL_ENV, DEFAULT_API_BASE_URL, DEFAULT_PAGE_SIZE};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // Window geometry
    pub window_x: Option<f32>,
    pub window_y: Option<f32>,
    pub window_w: Option<f32>,
    pub window_h: Option<f32>,

    // Backend
    pub api_base_url: String,

    // Restaurants page
    pub restaurants_page_size: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            window_x: None,
            window_y: None,
            window_w: None,
            window_h: None,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            restaurants_page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Settings {
    pub fn load(data_dir: &Path) -> Self {
        let path = data_dir.join("settings.json");
        match std::fs::read_to_string(&path) {
            Ok(s) => match serde_json::from_str(&s) {
                Ok(settings) => {
                    debug!(path = %path.display(), "Settings loaded");
                    settings
                }
                Err(e) => {
                    warn!(error = %e, "Failed to parse settings, using defaults");
                    Self::default()
                }
            },
            Err(_) => {
                debug!("No settings file found, using defaults");
                Self::default()
            }
        }
    }

    pub fn save(&self, data_dir: &Path) {
        let path = data_dir.join("settings.json");
        match serde_json::to_string_pretty(self) {
            Ok(json) => {
                if let Err(e) = std::fs::write(&path, json) {
                    warn!(error = %e, "Failed to save settings");
                }
            }
            Err(e) => warn!(error = %e, "Failed to serialize settings"),
        }
    }

    /// Base URL to talk to, honouring the environment override
    pub fn api_base_url(&self) -> String {
        Self::resolve_base_url(std::env::var(API_URL_ENV).ok(), &self.api_base_url)
    }

    fn resolve_base_url(env_value: Option<String>, configured: &str) -> String {
        match env_value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
            Some(url) => {
                info!(url = %url, "Using API base URL from environment");
                url
            }
            None if configured.trim().is_empty() => DEFAULT_API_BASE_URL.to_string(),
            None => configured.trim().to_string(),
        }
    }

    /// Page size clamped to something the backend will accept
    pub fn page_size(&self) -> u32 {
        self.restaurants_page_size.clamp(1, 50)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = TempDir::new().expect("temp dir");
        let settings = Settings::load(dir.path());
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(settings.page_size(), 3);
    }

    #[test]
    fn corrupt_file_falls_back_to_defaults() {
        let dir = TempDir::new().expect("temp dir");
        std::fs::write(dir.path().join("settings.json"), "{ not json").expect("write");
        assert_eq!(Settings::load(dir.path()), Settings::default());
    }

    #[test]
    fn saved_settings_load_back_and_fill_missing_fields() {
        let dir = TempDir::new().expect("temp dir");
        let settings = Settings {
            window_w: Some(1200.0),
            api_base_url: "https://api.slooze.test".into(),
            ..Settings::default()
        };
        settings.save(dir.path());
        assert_eq!(Settings::load(dir.path()), settings);

        std::fs::write(dir.path().join("settings.json"), r#"{"window_x": 10.0}"#).expect("write");
        let partial = Settings::load(dir.path());
        assert_eq!(partial.window_x, Some(10.0));
        assert_eq!(partial.restaurants_page_size, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn environment_value_overrides_configured_url() {
        assert_eq!(
            Settings::resolve_base_url(Some(" http://env:9000 ".into()), "http://file:1"),
            "http://env:9000"
        );
        assert_eq!(Settings::resolve_base_url(Some("   ".into()), "http://file:1"), "http://file:1");
        assert_eq!(Settings::resolve_base_url(None, ""), DEFAULT_API_BASE_URL);
    }

    #[test]
    fn page_size_is_clamped() {
        let zero = Settings { restaurants_page_size: 0, ..Settings::default() };
        assert_eq!(zero.page_size(), 1);
        let huge = Settings { restaurants_page_size: 500, ..Settings::default() };
        assert_eq!(huge.page_size(), 50);
    }
}
