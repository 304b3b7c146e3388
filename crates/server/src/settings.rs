//! Runtime settings loaded from the environment (and `.env`, if present).

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use tmdb_client::{DEFAULT_BASE_URL, TmdbConfig};

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Settings {
    /// TMDB v3 API key; the offline catalog is used when absent
    #[serde(default)]
    pub tmdb_api_key: Option<String>,

    #[serde(default = "default_base_url")]
    pub tmdb_base_url: String,

    #[serde(default = "default_timeout_secs")]
    pub tmdb_timeout_secs: u64,

    #[serde(default = "default_max_retries")]
    pub tmdb_max_retries: u32,

    /// Directory holding the static catalog files
    #[serde(rename = "moviepulse_data_dir", default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Directory holding per-user flat files
    #[serde(rename = "moviepulse_user_data_dir", default = "default_user_data_dir")]
    pub user_data_dir: PathBuf,

    /// Watched movies needed before weights are personalized
    #[serde(rename = "moviepulse_min_history", default = "default_min_history")]
    pub min_history: usize,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    5
}

fn default_max_retries() -> u32 {
    3
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("static_data")
}

fn default_user_data_dir() -> PathBuf {
    PathBuf::from("user_data")
}

fn default_min_history() -> usize {
    pipeline::personalization::DEFAULT_MIN_HISTORY
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tmdb_api_key: None,
            tmdb_base_url: default_base_url(),
            tmdb_timeout_secs: default_timeout_secs(),
            tmdb_max_retries: default_max_retries(),
            data_dir: default_data_dir(),
            user_data_dir: default_user_data_dir(),
            min_history: default_min_history(),
        }
    }
}

impl Settings {
    /// Load settings from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Settings>().map_err(|e| anyhow::anyhow!("Failed to load settings: {}", e))
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    pub fn with_user_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.user_data_dir = dir.into();
        self
    }

    /// Client configuration, when a non-blank API key is set
    pub fn tmdb_config(&self) -> Option<TmdbConfig> {
        let key = self.tmdb_api_key.as_deref()?.trim();
        if key.is_empty() {
            return None;
        }
        Some(
            TmdbConfig::new(key)
                .with_base_url(self.tmdb_base_url.clone())
                .with_timeout(Duration::from_secs(self.tmdb_timeout_secs))
                .with_max_retries(self.tmdb_max_retries),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults_from_empty_env() {
        let settings: Settings = envy::from_iter(vars(&[])).unwrap();
        assert_eq!(settings, Settings::default());
        assert!(settings.tmdb_config().is_none());
    }

    #[test]
    fn test_overrides() {
        let settings: Settings = envy::from_iter(vars(&[
            ("TMDB_API_KEY", "abc123"),
            ("TMDB_TIMEOUT_SECS", "9"),
            ("MOVIEPULSE_DATA_DIR", "/srv/data"),
            ("MOVIEPULSE_MIN_HISTORY", "2"),
        ]))
        .unwrap();

        assert_eq!(settings.data_dir, PathBuf::from("/srv/data"));
        assert_eq!(settings.min_history, 2);
        assert_eq!(settings.tmdb_timeout_secs, 9);
        assert!(settings.tmdb_config().is_some());
    }

    #[test]
    fn test_blank_key_means_offline() {
        let settings: Settings = envy::from_iter(vars(&[("TMDB_API_KEY", "  ")])).unwrap();
        assert!(settings.tmdb_config().is_none());
    }
}
