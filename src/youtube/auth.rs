use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::YoutubeConfig;
use crate::{fs, Error, Result};

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// OAuth client identity from a Google "installed app" secrets file.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientSecrets {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

// The secrets file nests everything under an "installed" key.
#[derive(Debug, Deserialize)]
struct ClientSecretsFile {
    installed: ClientSecrets,
}

impl ClientSecrets {
    pub fn from_file(path: &Path) -> Result<ClientSecrets> {
        let text = fs::read_text(path).map_err(|_| {
            Error::Auth(format!(
                "client secrets file {} not found; download the OAuth client \
                 credentials from the Google Cloud console and place them there",
                path.display()
            ))
        })?;
        let parsed: ClientSecretsFile = serde_json::from_str(&text)?;
        Ok(parsed.installed)
    }
}

/// A persisted OAuth token pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredToken {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expiry: Option<DateTime<Utc>>,
}

impl StoredToken {
    pub fn from_file(path: &Path) -> Result<StoredToken> {
        let text = fs::read_text(path).map_err(|_| {
            Error::Auth(format!(
                "stored token {} not found; provision it once with an external \
                 OAuth tool, including a refresh_token",
                path.display()
            ))
        })?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Expired, or about to be. A token without an expiry is assumed stale.
    pub fn needs_refresh(&self, now: DateTime<Utc>) -> bool {
        match self.expiry {
            Some(expiry) => now + Duration::seconds(60) >= expiry,
            None => true,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access_token: String,
    expires_in: i64,
}

/// Keeps a valid access token at hand, refreshing and persisting as needed.
pub struct Authenticator {
    secrets: ClientSecrets,
    token: StoredToken,
    store_path: PathBuf,
    http: reqwest::blocking::Client,
}

impl Authenticator {
    pub fn from_config(config: &YoutubeConfig) -> Result<Authenticator> {
        let secrets = ClientSecrets::from_file(&config.client_secrets_path())?;
        let store_path = config.credentials_path();
        let token = StoredToken::from_file(&store_path)?;
        Ok(Authenticator {
            secrets,
            token,
            store_path,
            http: reqwest::blocking::Client::new(),
        })
    }

    /// A currently valid bearer token.
    pub fn token(&mut self) -> Result<String> {
        if self.token.needs_refresh(Utc::now()) {
            self.refresh()?;
        }
        Ok(self.token.access_token.clone())
    }

    fn refresh(&mut self) -> Result<()> {
        let refresh_token = self.token.refresh_token.clone().ok_or_else(|| {
            Error::Auth(
                "stored token has no refresh_token; re-provision the credentials file"
                    .to_string(),
            )
        })?;
        info!("refreshing access token");
        let response = self
            .http
            .post(&self.secrets.token_uri)
            .form(&[
                ("client_id", self.secrets.client_id.as_str()),
                ("client_secret", self.secrets.client_secret.as_str()),
                ("refresh_token", refresh_token.as_str()),
                ("grant_type", "refresh_token"),
            ])
            .send()?;
        if !response.status().is_success() {
            return Err(Error::Auth(format!(
                "token refresh failed with HTTP {}: {}",
                response.status().as_u16(),
                response.text().unwrap_or_default()
            )));
        }
        let refreshed: RefreshResponse = response.json()?;
        self.token.access_token = refreshed.access_token;
        self.token.expiry = Some(Utc::now() + Duration::seconds(refreshed.expires_in));
        self.persist()
    }

    fn persist(&self) -> Result<()> {
        let rendered = serde_json::to_string_pretty(&self.token)?;
        fs::write_text(&self.store_path, rendered)
    }
}
