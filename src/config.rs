//! TOML configuration, kept in the platform config dir
//! (`~/.config/toolshed/config.toml` on Linux). Every field has a default
//! so a missing file just means defaults.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::{fs, Error, Result};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub youtube: YoutubeConfig,
    #[serde(default)]
    pub upload: UploadConfig,
    #[serde(default)]
    pub libdeps: LibdepsConfig,
    #[serde(default)]
    pub retry: RetryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YoutubeConfig {
    /// Directory holding the OAuth client secrets and the stored token.
    #[serde(default = "YoutubeConfig::default_secret_dir")]
    pub secret_dir: PathBuf,
    #[serde(default = "YoutubeConfig::default_client_secrets_file")]
    pub client_secrets_file: String,
    #[serde(default = "YoutubeConfig::default_credentials_file")]
    pub credentials_file: String,
    #[serde(default = "YoutubeConfig::default_region_code")]
    pub region_code: String,
}

impl YoutubeConfig {
    fn default_secret_dir() -> PathBuf {
        dirs::home_dir().unwrap_or_default().join("secret")
    }

    fn default_client_secrets_file() -> String {
        "client_secrets_desktop.json".to_string()
    }

    fn default_credentials_file() -> String {
        "youtube-credentials.json".to_string()
    }

    fn default_region_code() -> String {
        "US".to_string()
    }

    pub fn client_secrets_path(&self) -> PathBuf {
        self.secret_dir.join(&self.client_secrets_file)
    }

    pub fn credentials_path(&self) -> PathBuf {
        self.secret_dir.join(&self.credentials_file)
    }
}

impl Default for YoutubeConfig {
    fn default() -> Self {
        toml::from_str("").expect("all fields have defaults")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Videos waiting to be uploaded.
    #[serde(default)]
    pub queue_dir: Option<PathBuf>,
    /// Where uploaded videos are moved to.
    #[serde(default)]
    pub done_dir: Option<PathBuf>,
    #[serde(default = "UploadConfig::default_chunk_size")]
    pub chunk_size_bytes: u64,
    #[serde(default = "UploadConfig::default_log_path")]
    pub log_path: PathBuf,
    #[serde(default = "UploadConfig::default_description")]
    pub description: String,
    /// YouTube category; 22 is "People & Blogs".
    #[serde(default = "UploadConfig::default_category_id")]
    pub category_id: String,
    #[serde(default = "UploadConfig::default_privacy")]
    pub privacy: String,
}

impl UploadConfig {
    fn default_chunk_size() -> u64 {
        1024 * 1024
    }

    fn default_log_path() -> PathBuf {
        PathBuf::from("/tmp/upload.log")
    }

    fn default_description() -> String {
        "uploaded by toolshed".to_string()
    }

    fn default_category_id() -> String {
        "22".to_string()
    }

    fn default_privacy() -> String {
        "private".to_string()
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        toml::from_str("").expect("all fields have defaults")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibdepsConfig {
    /// Shared libraries whose exports count as always-available symbols.
    #[serde(default = "LibdepsConfig::default_baseline_libs")]
    pub baseline_libs: Vec<PathBuf>,
}

impl LibdepsConfig {
    fn default_baseline_libs() -> Vec<PathBuf> {
        vec![
            PathBuf::from("/usr/lib32/libc.so.6"),
            PathBuf::from("/usr/lib32/libm.so.6"),
        ]
    }
}

impl Default for LibdepsConfig {
    fn default() -> Self {
        toml::from_str("").expect("all fields have defaults")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Upper bound on attempts per API call.
    #[serde(default = "RetryConfig::default_attempts")]
    pub attempts: u32,
    #[serde(default = "RetryConfig::default_transient_sleep_secs")]
    pub transient_sleep_secs: u64,
    /// Quota errors reset daily; an hour between probes is long enough to
    /// notice without burning more quota.
    #[serde(default = "RetryConfig::default_quota_sleep_secs")]
    pub quota_sleep_secs: u64,
}

impl RetryConfig {
    fn default_attempts() -> u32 {
        10
    }

    fn default_transient_sleep_secs() -> u64 {
        3
    }

    fn default_quota_sleep_secs() -> u64 {
        3600
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        toml::from_str("").expect("all fields have defaults")
    }
}

impl Config {
    pub fn path() -> Result<PathBuf> {
        let base = dirs::config_dir()
            .ok_or_else(|| Error::Config("cannot determine the user config dir".to_string()))?;
        Ok(base.join("toolshed").join("config.toml"))
    }

    /// Loads the config file, falling back to defaults when it is absent.
    pub fn load() -> Result<Config> {
        let path = Self::path()?;
        if !path.exists() {
            return Ok(Config::default());
        }
        let text = fs::read_text(&path)?;
        toml::from_str(&text)
            .map_err(|err| Error::Config(format!("{}: {err}", path.display())))
    }

    /// Writes the current values back to the config file.
    pub fn save(&self) -> Result<()> {
        let path = Self::path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let rendered = toml::to_string_pretty(self)
            .map_err(|err| Error::Config(err.to_string()))?;
        fs::write_text(&path, rendered)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_sections() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.upload.chunk_size_bytes, 1024 * 1024);
        assert_eq!(config.upload.privacy, "private");
        assert_eq!(config.retry.attempts, 10);
        assert_eq!(config.libdeps.baseline_libs.len(), 2);
        assert_eq!(config.youtube.region_code, "US");
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config: Config = toml::from_str(
            r#"
[upload]
queue_dir = "/videos/queue"
chunk_size_bytes = 4096
"#,
        )
        .unwrap();
        assert_eq!(
            config.upload.queue_dir.as_deref(),
            Some(std::path::Path::new("/videos/queue"))
        );
        assert_eq!(config.upload.chunk_size_bytes, 4096);
        assert_eq!(config.upload.category_id, "22");
        assert_eq!(config.retry.quota_sleep_secs, 3600);
    }

    #[test]
    fn config_round_trips_through_toml() {
        let config = Config::default();
        let rendered = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed.upload.chunk_size_bytes, config.upload.chunk_size_bytes);
        assert_eq!(parsed.youtube.client_secrets_file, config.youtube.client_secrets_file);
    }
}
