use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the generation service.
    pub service_url: String,
    pub data_dir: PathBuf,
    /// Generation request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs::data_dir()
            .map(|d| d.join("coldmail"))
            .unwrap_or_else(|| PathBuf::from(".coldmail"));

        Self {
            service_url: "http://localhost:5000".to_string(),
            data_dir,
            request_timeout_secs: 60,
        }
    }
}

impl Config {
    /// Root directory of the history snapshot store.
    pub fn history_dir(&self) -> PathBuf {
        self.data_dir.join("history")
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn load() -> anyhow::Result<Self> {
        let config_path = dirs::config_dir()
            .map(|d| d.join("coldmail").join("config.toml"))
            .unwrap_or_else(|| PathBuf::from(".coldmail/config.toml"));

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_the_local_backend() {
        let config = Config::default();
        assert_eq!(config.service_url, "http://localhost:5000");
        assert_eq!(config.request_timeout_secs, 60);
        assert!(config.history_dir().ends_with("history"));
    }

    #[test]
    fn partial_config_fills_in_defaults() {
        let config: Config = toml::from_str(r#"service_url = "https://gen.example.com""#).unwrap();
        assert_eq!(config.service_url, "https://gen.example.com");
        assert_eq!(config.request_timeout_secs, 60);
    }
}
