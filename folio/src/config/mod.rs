use crate::auth::{SessionGate, StoredCredentialVerifier, DEFAULT_SESSION_MAX_AGE_SECS};
use crate::content::Admin;
use crate::error::{FolioError, Result};
use crate::store::ContentStore;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Environment variable naming the YAML config file.
pub const CONFIG_FILE_ENV: &str = "FOLIO_CONFIG";

/// Config file picked up from the working directory when present.
pub const DEFAULT_CONFIG_FILE: &str = "folio.yaml";

/// Credential seeded into a new document unless configured otherwise.
pub const DEFAULT_ADMIN_USERNAME: &str = "admin";
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin";

pub const SENDGRID_ENDPOINT: &str = "https://api.sendgrid.com/v3/mail/send";

/// Runtime settings for the server and CLI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path of the JSON document.
    pub data_file: PathBuf,
    pub host: String,
    pub port: u16,
    /// Prebuilt frontend to serve at `/`.
    pub static_dir: Option<PathBuf>,
    /// Mark cookies `Secure`.
    pub secure_cookies: bool,
    pub session_max_age_secs: i64,
    /// Admin credential written into a document that has none.
    pub admin: Admin,
    pub mail: MailConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MailConfig {
    /// SendGrid API key. Without one, contact messages cannot be relayed.
    pub api_key: Option<String>,
    pub endpoint: String,
    pub to: String,
    pub from: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data_file: PathBuf::from("database.json"),
            host: "127.0.0.1".into(),
            port: 8080,
            static_dir: None,
            secure_cookies: false,
            session_max_age_secs: DEFAULT_SESSION_MAX_AGE_SECS,
            admin: Admin {
                username: DEFAULT_ADMIN_USERNAME.into(),
                password: DEFAULT_ADMIN_PASSWORD.into(),
            },
            mail: MailConfig::default(),
        }
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        MailConfig {
            api_key: None,
            endpoint: SENDGRID_ENDPOINT.into(),
            to: "owner@example.com".into(),
            from: "portfolio-bot@example.com".into(),
        }
    }
}

impl Config {
    /// Load from the optional YAML file, then apply `FOLIO_*` environment overrides.
    pub fn load() -> Result<Self> {
        let file = std::env::var_os(CONFIG_FILE_ENV)
            .map(PathBuf::from)
            .or_else(|| {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                default.exists().then_some(default)
            });
        Self::from_sources(file.as_deref(), |key| std::env::var(key).ok())
    }

    pub fn from_sources(
        file: Option<&Path>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let mut config = match file {
            Some(path) => Self::from_file(path)?,
            None => Config::default(),
        };

        if let Some(v) = env("FOLIO_DATA_FILE") {
            config.data_file = PathBuf::from(v);
        }
        if let Some(v) = env("FOLIO_HOST") {
            config.host = v;
        }
        if let Some(v) = env("FOLIO_PORT") {
            config.port = parse_var("FOLIO_PORT", &v)?;
        }
        if let Some(v) = env("FOLIO_STATIC_DIR") {
            config.static_dir = Some(PathBuf::from(v));
        }
        if let Some(v) = env("FOLIO_SECURE_COOKIES") {
            config.secure_cookies = parse_bool("FOLIO_SECURE_COOKIES", &v)?;
        }
        if let Some(v) = env("FOLIO_SESSION_MAX_AGE") {
            config.session_max_age_secs = parse_var("FOLIO_SESSION_MAX_AGE", &v)?;
        }
        if let Some(v) = env("FOLIO_ADMIN_USERNAME") {
            config.admin.username = v;
        }
        if let Some(v) = env("FOLIO_ADMIN_PASSWORD") {
            config.admin.password = v;
        }
        if let Some(v) = env("SENDGRID_API_KEY") {
            config.mail.api_key = Some(v).filter(|key| !key.is_empty());
        }
        if let Some(v) = env("FOLIO_CONTACT_TO") {
            config.mail.to = v;
        }
        if let Some(v) = env("FOLIO_CONTACT_FROM") {
            config.mail.from = v;
        }

        if config.admin.username.trim().is_empty() || config.admin.password.is_empty() {
            return Err(FolioError::Config(
                "admin username and password must not be empty".into(),
            ));
        }
        if config.session_max_age_secs <= 0 {
            return Err(FolioError::Config(
                "session_max_age_secs must be positive".into(),
            ));
        }
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            FolioError::Config(format!("Failed to read {}: {e}", path.display()))
        })?;
        if contents.trim().is_empty() {
            return Ok(Config::default());
        }
        Ok(serde_yaml::from_str(&contents)?)
    }

    /// Open the file-backed content store this config points at.
    pub fn open_store(&self) -> Result<ContentStore> {
        ContentStore::open_file(&self.data_file, self.admin.clone())
    }

    pub fn session_gate(&self) -> SessionGate {
        SessionGate::new(StoredCredentialVerifier, self.session_max_age_secs)
    }
}

fn parse_var<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| FolioError::Config(format!("Invalid value for {key}: '{value}'")))
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(FolioError::Config(format!(
            "Invalid value for {key}: '{value}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_sources(None, env_from(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.port, 8080);
        assert_eq!(config.session_max_age_secs, 86400);
    }

    #[test]
    fn test_env_overrides() {
        let config = Config::from_sources(
            None,
            env_from(&[
                ("FOLIO_PORT", "9000"),
                ("FOLIO_DATA_FILE", "/srv/site.json"),
                ("FOLIO_SECURE_COOKIES", "true"),
                ("SENDGRID_API_KEY", "SG.key"),
                ("FOLIO_ADMIN_PASSWORD", "pw"),
            ]),
        )
        .unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.data_file, PathBuf::from("/srv/site.json"));
        assert!(config.secure_cookies);
        assert_eq!(config.mail.api_key.as_deref(), Some("SG.key"));
        assert_eq!(config.admin.password, "pw");
    }

    #[test]
    fn test_bad_env_values() {
        assert!(Config::from_sources(None, env_from(&[("FOLIO_PORT", "http")])).is_err());
        assert!(
            Config::from_sources(None, env_from(&[("FOLIO_SECURE_COOKIES", "maybe")])).is_err()
        );
        assert!(Config::from_sources(None, env_from(&[("FOLIO_SESSION_MAX_AGE", "0")])).is_err());
    }

    #[test]
    fn test_partial_admin_in_file_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("folio.yaml");
        std::fs::write(&path, "admin:\n  username: owner\n").unwrap();

        let err = Config::from_sources(Some(&path), env_from(&[])).unwrap_err();
        assert!(matches!(err, FolioError::Config(_)));

        let config =
            Config::from_sources(Some(&path), env_from(&[("FOLIO_ADMIN_PASSWORD", "s3cret")]))
                .unwrap();
        assert_eq!(config.admin.username, "owner");
        assert_eq!(config.admin.password, "s3cret");
    }

    #[test]
    fn test_yaml_file_then_env() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("folio.yaml");
        std::fs::write(
            &path,
            "port: 3000\nhost: 0.0.0.0\nmail:\n  to: me@site.dev\n",
        )
        .unwrap();

        let config = Config::from_sources(Some(&path), env_from(&[("FOLIO_PORT", "3001")])).unwrap();
        assert_eq!(config.port, 3001);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.mail.to, "me@site.dev");
        assert_eq!(config.mail.endpoint, SENDGRID_ENDPOINT);
    }

    #[test]
    fn test_open_store_creates_document() {
        let tmp = TempDir::new().unwrap();
        let config = Config {
            data_file: tmp.path().join("data").join("database.json"),
            ..Config::default()
        };
        let store = config.open_store().unwrap();
        let admin = store.read().unwrap().admin;
        assert_eq!(admin, config.admin);
        assert_eq!(admin.username, DEFAULT_ADMIN_USERNAME);
    }
}
