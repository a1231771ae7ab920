//! Service configuration.
//!
//! Loaded once at startup from `medport.toml` in the working directory, if present, with
//! `MEDPORT_*` environment variables taking precedence. The resulting [`Config`] is passed
//! explicitly to the server and the controllers that need it.
use std::env::var;
use std::fs::read_to_string;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

/// Default configuration file name.
pub const CONFIG_FILE: &str = "medport.toml";

#[derive(Error, Debug)]
pub enum Error {
    #[error("config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("config file not readable: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid value for {name}: \"{value}\"")]
    InvalidValue { name: &'static str, value: String },
}

/// Service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    path: Option<PathBuf>,
    pub host: String,
    pub port: u16,
    /// Value of `Access-Control-Allow-Origin` on every response.
    pub allowed_origin: String,
    pub header_max_size: usize,
    pub body_max_size: usize,
    /// Bearer token required by the admin routes. Admin routes are open when unset.
    pub admin_token: Option<String>,
    /// Location of the file store log. The in-memory store is used when unset.
    pub store_path: Option<PathBuf>,
    /// Contact submissions allowed per client IP per minute.
    pub contact_rate_limit: Option<u64>,
    /// Rate limit by `X-Forwarded-For`. Only set this behind a proxy that overwrites it.
    pub trust_forwarded_for: bool,
    pub cert_file: Option<PathBuf>,
    pub key_file: Option<PathBuf>,
    pub tty: bool,
}

/// Request size limits enforced while reading from the socket.
#[derive(Debug, Clone, Copy)]
pub struct Limits {
    pub header_max_size: usize,
    pub body_max_size: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            header_max_size: 16 * 1024, // 16KB
            body_max_size: 64 * 1024,   // 64KB
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let limits = Limits::default();

        Self {
            path: None,
            host: "0.0.0.0".into(),
            port: 8000,
            allowed_origin: "*".into(),
            header_max_size: limits.header_max_size,
            body_max_size: limits.body_max_size,
            admin_token: None,
            store_path: None,
            contact_rate_limit: None,
            trust_forwarded_for: false,
            cert_file: None,
            key_file: None,
            tty: std::io::stderr().is_terminal(),
        }
    }
}

impl Config {
    /// Load configuration from `medport.toml`, if it exists, and the environment.
    pub fn load() -> Result<Config, Error> {
        let path = PathBuf::from(CONFIG_FILE);

        let mut config = if path.exists() {
            Self::load_file(&path)?
        } else {
            Config::default()
        };

        config.apply_env(|name| var(name).ok())?;

        Ok(config)
    }

    /// Load configuration from a specific file. Environment overrides are not applied.
    pub fn load_file(path: impl AsRef<Path>) -> Result<Config, Error> {
        let file = ConfigFile::load(path.as_ref())?;
        let mut config = Config::default();
        config.apply_file(file);
        config.path = Some(path.as_ref().to_owned());

        Ok(config)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(text: &str) -> Result<Config, Error> {
        let file: ConfigFile = toml::from_str(text)?;
        let mut config = Config::default();
        config.apply_file(file);

        Ok(config)
    }

    fn apply_file(&mut self, file: ConfigFile) {
        let general = file.general;

        self.host = general.host;
        self.port = general.port;
        self.allowed_origin = general.allowed_origin;
        self.header_max_size = general.header_max_size;
        self.body_max_size = general.body_max_size;
        self.admin_token = general.admin_token.filter(|token| !token.is_empty());
        self.contact_rate_limit = general.contact_rate_limit;
        self.trust_forwarded_for = general.trust_forwarded_for;
        self.cert_file = general.cert_file;
        self.key_file = general.key_file;

        if let Some(store) = file.store {
            self.store_path = store.path;
        }
    }

    /// Apply `MEDPORT_*` overrides using the provided variable lookup.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<(), Error> {
        if let Some(host) = lookup("MEDPORT_HOST") {
            self.host = host;
        }

        if let Some(port) = lookup("MEDPORT_PORT") {
            self.port = port.parse().map_err(|_| Error::InvalidValue {
                name: "MEDPORT_PORT",
                value: port.clone(),
            })?;
        }

        if let Some(origin) = lookup("MEDPORT_ALLOWED_ORIGIN") {
            self.allowed_origin = origin;
        }

        if let Some(token) = lookup("MEDPORT_ADMIN_TOKEN") {
            self.admin_token = Some(token).filter(|token| !token.is_empty());
        }

        if let Some(path) = lookup("MEDPORT_STORE_PATH") {
            self.store_path = Some(PathBuf::from(path));
        }

        if let Some(limit) = lookup("MEDPORT_CONTACT_RATE_LIMIT") {
            self.contact_rate_limit = Some(limit.parse().map_err(|_| Error::InvalidValue {
                name: "MEDPORT_CONTACT_RATE_LIMIT",
                value: limit.clone(),
            })?);
        }

        if let Some(trust) = lookup("MEDPORT_TRUST_FORWARDED_FOR") {
            self.trust_forwarded_for = trust.parse().map_err(|_| Error::InvalidValue {
                name: "MEDPORT_TRUST_FORWARDED_FOR",
                value: trust.clone(),
            })?;
        }

        Ok(())
    }

    /// Socket address the server binds to.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn limits(&self) -> Limits {
        Limits {
            header_max_size: self.header_max_size,
            body_max_size: self.body_max_size,
        }
    }

    /// Log the effective configuration. Secrets are not printed.
    pub fn log_info(&self) {
        match self.path {
            Some(ref path) => info!("Loaded configuration from \"{}\"", path.display()),
            None => info!("Using default configuration"),
        }

        match self.store_path {
            Some(ref path) => info!("Storing messages in \"{}\"", path.display()),
            None => warn!("Storing messages in memory, they will be lost on restart"),
        }

        if self.admin_token.is_none() {
            warn!("No admin token configured, admin routes are open");
        }
    }
}

#[derive(Serialize, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    general: General,
    store: Option<StoreConfig>,
}

impl ConfigFile {
    fn load(path: &Path) -> Result<ConfigFile, Error> {
        let file = read_to_string(path)?;
        let config: Self = toml::from_str(&file)?;

        Ok(config)
    }
}

#[derive(Serialize, Deserialize)]
struct General {
    #[serde(default = "General::default_host")]
    host: String,
    #[serde(default = "General::default_port")]
    port: u16,
    #[serde(default = "General::default_allowed_origin")]
    allowed_origin: String,
    #[serde(default = "General::default_header_max_size")]
    header_max_size: usize,
    #[serde(default = "General::default_body_max_size")]
    body_max_size: usize,
    admin_token: Option<String>,
    contact_rate_limit: Option<u64>,
    #[serde(default)]
    trust_forwarded_for: bool,
    cert_file: Option<PathBuf>,
    key_file: Option<PathBuf>,
}

impl Default for General {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
            allowed_origin: Self::default_allowed_origin(),
            header_max_size: Self::default_header_max_size(),
            body_max_size: Self::default_body_max_size(),
            admin_token: None,
            contact_rate_limit: None,
            trust_forwarded_for: false,
            cert_file: None,
            key_file: None,
        }
    }
}

impl General {
    fn default_host() -> String {
        "0.0.0.0".into()
    }

    fn default_port() -> u16 {
        8000
    }

    fn default_allowed_origin() -> String {
        "*".into()
    }

    fn default_header_max_size() -> usize {
        Limits::default().header_max_size
    }

    fn default_body_max_size() -> usize {
        Limits::default().body_max_size
    }
}

#[derive(Serialize, Deserialize, Default)]
struct StoreConfig {
    path: Option<PathBuf>,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.allowed_origin, "*");
        assert_eq!(config.addr(), "0.0.0.0:8000");
        assert!(config.admin_token.is_none());
        assert!(config.store_path.is_none());
        assert!(!config.trust_forwarded_for);
    }

    #[test]
    fn test_from_toml() {
        let config = Config::from_toml(
            r#"
            [general]
            port = 9000
            allowed_origin = "https://portal.example"
            admin_token = "s3cret"
            contact_rate_limit = 5
            trust_forwarded_for = true

            [store]
            path = "data/messages.jsonl"
            "#,
        )
        .expect("parse");

        assert_eq!(config.port, 9000);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.allowed_origin, "https://portal.example");
        assert_eq!(config.admin_token.as_deref(), Some("s3cret"));
        assert_eq!(config.contact_rate_limit, Some(5));
        assert!(config.trust_forwarded_for);
        assert_eq!(
            config.store_path,
            Some(PathBuf::from("data/messages.jsonl"))
        );
        assert_eq!(config.body_max_size, 64 * 1024);
    }

    #[test]
    fn test_empty_token_is_no_token() {
        let config = Config::from_toml("[general]\nadmin_token = \"\"").expect("parse");
        assert!(config.admin_token.is_none());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config
            .apply_env(|name| match name {
                "MEDPORT_PORT" => Some("8080".into()),
                "MEDPORT_ALLOWED_ORIGIN" => Some("https://pharma.example".into()),
                "MEDPORT_ADMIN_TOKEN" => Some("token".into()),
                "MEDPORT_TRUST_FORWARDED_FOR" => Some("true".into()),
                _ => None,
            })
            .expect("env");

        assert_eq!(config.port, 8080);
        assert_eq!(config.allowed_origin, "https://pharma.example");
        assert_eq!(config.admin_token.as_deref(), Some("token"));
        assert!(config.trust_forwarded_for);

        let err = config
            .apply_env(|name| (name == "MEDPORT_PORT").then(|| "eighty".to_string()))
            .expect_err("bad port");
        assert!(matches!(err, Error::InvalidValue { .. }));
    }
}
