//! Application configuration.
//!
//! Loaded from `<config_dir>/ubikial/config.json` (camelCase JSON, every field
//! optional), then overridden by `UBIKIAL_*` environment variables. Frontends
//! apply their own flags last.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use ubikial_core::error::{CoreError, CoreResult};
use ubikial_github::GitHubConfig;
use ubikial_github::utils::log_sanitizer::mask_token;

/// Directory name under the platform config/data directories.
const APP_DIR: &str = "ubikial";
const CONFIG_FILE: &str = "config.json";

/// Environment variable names.
pub mod env_vars {
    pub const USER: &str = "UBIKIAL_USER";
    pub const GITHUB_TOKEN: &str = "UBIKIAL_GITHUB_TOKEN";
    pub const GITHUB_API: &str = "UBIKIAL_GITHUB_API";
    pub const OFFLINE: &str = "UBIKIAL_OFFLINE";
    pub const VAULT_PASSPHRASE: &str = "UBIKIAL_VAULT_PASSPHRASE";
    pub const DATA_DIR: &str = "UBIKIAL_DATA_DIR";
}

/// Key/value backend used for local storage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    /// One JSON file (`store.json`)
    #[default]
    File,
    /// `SQLite` database (`store.db`), requires the `sqlite-store` feature
    Sqlite,
}

/// GitHub settings
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GitHubSettings {
    /// Personal access token or OAuth token with `repo` and `delete_repo` scopes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(flatten)]
    pub client: GitHubConfig,
}

/// Application configuration
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppConfig {
    /// User whose session is opened
    pub user: Option<String>,
    /// Local storage directory; platform data directory when unset
    pub data_dir: Option<PathBuf>,
    pub store: StoreKind,
    /// Never contact the repository host
    pub offline: bool,
    pub github: GitHubSettings,
    /// Passphrase of the credential vault; prefer the environment variable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vault_passphrase: Option<String>,
}

impl AppConfig {
    /// Default config file location: `<config_dir>/ubikial/config.json`.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Read a config file; a missing file yields the defaults.
    pub fn from_file(path: &Path) -> CoreResult<Self> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No config file at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(CoreError::StorageError(format!(
                    "Failed to read {}: {e}",
                    path.display()
                )));
            }
        };
        serde_json::from_str(&raw).map_err(|e| {
            CoreError::ValidationError(format!("Invalid config file {}: {e}", path.display()))
        })
    }

    /// Load the config file (explicit path or default location) and apply
    /// environment overrides.
    pub fn load(path: Option<&Path>) -> CoreResult<Self> {
        let mut config = match path.map(Path::to_path_buf).or_else(Self::default_path) {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        config.apply_overrides(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// Apply `UBIKIAL_*` overrides read through `lookup`. Empty values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> CoreResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(user) = get(env_vars::USER) {
            self.user = Some(user);
        }
        if let Some(token) = get(env_vars::GITHUB_TOKEN) {
            self.github.token = Some(token);
        }
        if let Some(api) = get(env_vars::GITHUB_API) {
            self.github.client.api_base = api;
        }
        if let Some(offline) = get(env_vars::OFFLINE) {
            self.offline = parse_bool(env_vars::OFFLINE, &offline)?;
        }
        if let Some(passphrase) = get(env_vars::VAULT_PASSPHRASE) {
            self.vault_passphrase = Some(passphrase);
        }
        if let Some(dir) = get(env_vars::DATA_DIR) {
            self.data_dir = Some(PathBuf::from(dir));
        }
        Ok(())
    }

    /// Effective data directory.
    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| {
            dirs::data_dir().map_or_else(|| PathBuf::from(".ubikial"), |d| d.join(APP_DIR))
        })
    }

    /// Effective user id.
    pub fn user(&self) -> CoreResult<&str> {
        self.user
            .as_deref()
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| {
                CoreError::ValidationError(format!(
                    "No user configured (set {} or \"user\" in the config file)",
                    env_vars::USER
                ))
            })
    }
}

impl fmt::Debug for GitHubSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitHubSettings")
            .field("token", &self.token.as_deref().map(mask_token))
            .field("client", &self.client)
            .finish()
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("user", &self.user)
            .field("data_dir", &self.data_dir)
            .field("store", &self.store)
            .field("offline", &self.offline)
            .field("github", &self.github)
            .field(
                "vault_passphrase",
                &self.vault_passphrase.as_ref().map(|_| "****"),
            )
            .finish()
    }
}

fn parse_bool(name: &str, value: &str) -> CoreResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(CoreError::ValidationError(format!(
            "{name}: expected a boolean, got '{other}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults() {
        let config = AppConfig::default();
        assert_eq!(config.store, StoreKind::File);
        assert!(!config.offline);
        assert_eq!(config.github.client.api_base, ubikial_github::DEFAULT_API_BASE);
        assert!(config.user().is_err());
    }

    #[test]
    fn parses_partial_camel_case_file() {
        let config: AppConfig = serde_json::from_str(
            r#"{"user":"alice","store":"sqlite","github":{"apiBase":"https://ghe.example.com/api/v3","timeoutSecs":5}}"#,
        )
        .unwrap();
        assert_eq!(config.user().unwrap(), "alice");
        assert_eq!(config.store, StoreKind::Sqlite);
        assert_eq!(config.github.client.api_base, "https://ghe.example.com/api/v3");
        assert_eq!(config.github.client.timeout_secs, 5);
        assert!(config.github.token.is_none());
    }

    #[test]
    fn environment_overrides_file() {
        let mut config = AppConfig {
            user: Some("from-file".to_string()),
            ..Default::default()
        };
        config
            .apply_overrides(lookup(&[
                (env_vars::USER, "bob"),
                (env_vars::GITHUB_TOKEN, "ghp_env"),
                (env_vars::OFFLINE, "yes"),
                (env_vars::DATA_DIR, "/tmp/ubikial"),
                (env_vars::VAULT_PASSPHRASE, ""),
            ]))
            .unwrap();

        assert_eq!(config.user().unwrap(), "bob");
        assert_eq!(config.github.token.as_deref(), Some("ghp_env"));
        assert!(config.offline);
        assert_eq!(config.data_dir(), PathBuf::from("/tmp/ubikial"));
        // Empty values are ignored
        assert!(config.vault_passphrase.is_none());
    }

    #[test]
    fn invalid_boolean_is_rejected() {
        let mut config = AppConfig::default();
        let result = config.apply_overrides(lookup(&[(env_vars::OFFLINE, "maybe")]));
        assert!(matches!(result, Err(CoreError::ValidationError(_))));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::from_file(&dir.path().join("absent.json")).unwrap();
        assert!(config.user.is_none());
    }

    #[test]
    fn malformed_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ nope").unwrap();
        assert!(matches!(
            AppConfig::from_file(&path),
            Err(CoreError::ValidationError(_))
        ));
    }

    #[test]
    fn debug_masks_secrets() {
        let mut config = AppConfig::default();
        config.github.token = Some("ghp_abcdefghijklmnop".to_string());
        config.vault_passphrase = Some("correct horse".to_string());
        let debug = format!("{config:?}");
        assert!(!debug.contains("ghp_abcdefghijklmnop"));
        assert!(!debug.contains("correct horse"));
        assert!(debug.contains("mnop"));
    }

    #[test]
    fn serialization_omits_secrets_when_unset() {
        let json = serde_json::to_string(&AppConfig::default()).unwrap();
        assert!(!json.contains("token"));
        assert!(!json.contains("vaultPassphrase"));
    }
}
