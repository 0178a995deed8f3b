//! Service configuration.
//!
//! Loaded from a JSON file (camelCase keys, every key optional), then a few
//! environment overrides, then validated. A missing file means defaults.

use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

use crate::error::ConfigError;
use crate::store::{DEFAULT_TABLE_NAME, MAX_LOOKUP_BATCH, validate_table_name};
use crate::verification::ValidationConfig;

/// Environment variable naming the config file.
pub const CONFIG_PATH_ENV: &str = "PORT_OUT_CONFIG";

/// Config file used when `PORT_OUT_CONFIG` is unset.
pub const DEFAULT_CONFIG_PATH: &str = "./config.json";

/// Path reserved for the health probe.
pub const HEALTH_PATH: &str = "/health";

/// Characters the router reads as captures or wildcards.
const ROUTE_METACHARACTERS: [char; 4] = [':', '*', '{', '}'];

/// Full service configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceConfig {
    /// Port to listen on (all interfaces).
    #[serde(default = "default_port")]
    pub port: u16,
    /// Path the validation endpoint is mounted at.
    #[serde(default = "default_path")]
    pub path: String,
    /// Rule switches, read from top-level keys.
    #[serde(flatten)]
    pub validation: ValidationConfig,
    /// Subscriber table queried for records.
    #[serde(default = "default_table_name")]
    pub table_name: String,
    #[serde(default)]
    pub database: DatabaseSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Record store location.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DatabaseSettings {
    #[serde(default = "default_database_path")]
    pub path: PathBuf,
}

/// Log output settings.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LoggingSettings {
    /// JSON lines instead of compact text on stderr.
    #[serde(default)]
    pub json: bool,
    /// Also write daily-rolling log files here.
    #[serde(default)]
    pub directory: Option<PathBuf>,
}

fn default_port() -> u16 {
    3000
}

fn default_path() -> String {
    "/".to_string()
}

fn default_table_name() -> String {
    DEFAULT_TABLE_NAME.to_string()
}

fn default_database_path() -> PathBuf {
    PathBuf::from(format!("./data/{DEFAULT_TABLE_NAME}.db"))
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: default_database_path(),
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            path: default_path(),
            validation: ValidationConfig::default(),
            table_name: default_table_name(),
            database: DatabaseSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl ServiceConfig {
    /// Load from `PORT_OUT_CONFIG` (or `./config.json`), apply environment
    /// overrides and validate.
    pub fn from_env() -> Result<Self, ConfigError> {
        let path = std::env::var(CONFIG_PATH_ENV)
            .unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let mut config = Self::from_file(Path::new(&path))?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Read a config file. A missing file yields the defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(contents) => {
                info!(path = %path.display(), "Loaded configuration file");
                Self::from_json(&contents)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %path.display(), "No configuration file, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(ConfigError::Io(e)),
        }
    }

    pub fn from_json(contents: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(contents).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Apply `PORT_OUT_PORT`, `PORT_OUT_PATH` and `PORT_OUT_DB_PATH`.
    /// Unparseable values are logged and ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(port) = lookup("PORT_OUT_PORT") {
            match port.parse() {
                Ok(port) => self.port = port,
                Err(_) => warn!(value = %port, "Ignoring invalid PORT_OUT_PORT"),
            }
        }
        if let Some(path) = lookup("PORT_OUT_PATH") {
            self.path = path;
        }
        if let Some(db_path) = lookup("PORT_OUT_DB_PATH") {
            self.database.path = PathBuf::from(db_path);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::InvalidValue {
                key: "port".into(),
                message: "must be non-zero".into(),
            });
        }
        if !self.path.starts_with('/') {
            return Err(ConfigError::InvalidValue {
                key: "path".into(),
                message: format!("{:?} must start with '/'", self.path),
            });
        }
        if self.path.contains(ROUTE_METACHARACTERS) {
            return Err(ConfigError::InvalidValue {
                key: "path".into(),
                message: format!("{:?} must be a literal path", self.path),
            });
        }
        if self.path == HEALTH_PATH {
            return Err(ConfigError::InvalidValue {
                key: "path".into(),
                message: format!("{HEALTH_PATH} is reserved for the health probe"),
            });
        }
        if self.validation.max_telephone_numbers > MAX_LOOKUP_BATCH {
            return Err(ConfigError::InvalidValue {
                key: "maxTelephoneNumbers".into(),
                message: format!("must be at most {MAX_LOOKUP_BATCH}"),
            });
        }
        validate_table_name(&self.table_name).map_err(|e| ConfigError::InvalidValue {
            key: "tableName".into(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.port))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn empty_object_gives_defaults() {
        let config = ServiceConfig::from_json("{}").unwrap();
        assert_eq!(config, ServiceConfig::default());
        assert_eq!(config.port, 3000);
        assert_eq!(config.path, "/");
        assert_eq!(config.table_name, "bandwidth-port-out-validation");
        assert_eq!(config.validation, ValidationConfig::default());
    }

    #[test]
    fn partial_file_merges_with_defaults() {
        let config = ServiceConfig::from_json(
            r#"{
                "port": 8080,
                "verifyStatus": false,
                "verifySubscriberName": true,
                "maxTelephoneNumbers": 5,
                "database": { "path": "/var/lib/port-out/records.db" }
            }"#,
        )
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.path, "/");
        assert!(!config.validation.verify_status);
        assert!(config.validation.verify_subscriber_name);
        assert!(config.validation.verify_pin);
        assert_eq!(config.validation.max_telephone_numbers, 5);
        assert_eq!(
            config.database.path,
            PathBuf::from("/var/lib/port-out/records.db")
        );
        assert!(!config.logging.json);
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let config = ServiceConfig::from_json(
            r#"{ "timezone": "UTC", "mysql": { "host": "127.0.0.1" }, "verifyPin": false }"#,
        )
        .unwrap();
        assert!(!config.validation.verify_pin);
    }

    #[test]
    fn malformed_json_is_parse_error() {
        let result = ServiceConfig::from_json("{ \"port\": ");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));

        let result = ServiceConfig::from_json(r#"{ "verifyPin": "yes" }"#);
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn missing_file_gives_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("absent.json");
        let config = ServiceConfig::from_file(&path).unwrap();
        assert_eq!(config, ServiceConfig::default());
    }

    #[test]
    fn reads_file_from_disk() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.json");
        let contents = r#"{ "path": "/validate", "logging": { "json": true } }"#;
        std::fs::write(&path, contents).unwrap();

        let config = ServiceConfig::from_file(&path).unwrap();
        assert_eq!(config.path, "/validate");
        assert!(config.logging.json);
    }

    #[test]
    fn directory_instead_of_file_is_io_error() {
        let tmp = tempfile::tempdir().unwrap();
        let result = ServiceConfig::from_file(tmp.path());
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn overrides_replace_file_values() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("PORT_OUT_PORT", "9090"),
            ("PORT_OUT_PATH", "/porting"),
            ("PORT_OUT_DB_PATH", "/tmp/records.db"),
        ]);
        let lookup = |key: &str| env.get(key).map(|v| v.to_string());
        let mut config = ServiceConfig::default();
        config.apply_overrides(lookup);

        assert_eq!(config.port, 9090);
        assert_eq!(config.path, "/porting");
        assert_eq!(config.database.path, PathBuf::from("/tmp/records.db"));
    }

    #[test]
    fn invalid_port_override_is_ignored() {
        let mut config = ServiceConfig::default();
        let lookup = |key: &str| (key == "PORT_OUT_PORT").then(|| "not-a-port".to_string());
        config.apply_overrides(lookup);
        assert_eq!(config.port, 3000);
    }

    fn rejected_key(config: &ServiceConfig) -> Option<String> {
        match config.validate() {
            Err(ConfigError::InvalidValue { key, .. }) => Some(key),
            _ => None,
        }
    }

    #[test]
    fn validation_rejects_bad_values() {
        let config = ServiceConfig {
            path: "validate".into(),
            ..ServiceConfig::default()
        };
        assert_eq!(rejected_key(&config).as_deref(), Some("path"));

        let config = ServiceConfig {
            path: HEALTH_PATH.into(),
            ..ServiceConfig::default()
        };
        assert!(config.validate().is_err());

        let config = ServiceConfig {
            table_name: "records; DROP TABLE x".into(),
            ..ServiceConfig::default()
        };
        assert_eq!(rejected_key(&config).as_deref(), Some("tableName"));

        let config = ServiceConfig {
            port: 0,
            ..ServiceConfig::default()
        };
        assert!(config.validate().is_err());

        assert!(ServiceConfig::default().validate().is_ok());
    }

    #[test]
    fn path_must_be_literal() {
        for path in ["/:id", "/*rest", "/{a}{b}", "/port-out/{id}"] {
            let config = ServiceConfig {
                path: path.into(),
                ..ServiceConfig::default()
            };
            assert_eq!(rejected_key(&config).as_deref(), Some("path"), "{path}");
        }

        let config = ServiceConfig {
            path: "/port-out/v1".into(),
            ..ServiceConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn batch_limit_fits_one_lookup() {
        let mut config = ServiceConfig::default();
        config.validation.max_telephone_numbers = MAX_LOOKUP_BATCH;
        assert!(config.validate().is_ok());

        config.validation.max_telephone_numbers = MAX_LOOKUP_BATCH + 1;
        let key = rejected_key(&config);
        assert_eq!(key.as_deref(), Some("maxTelephoneNumbers"));
    }

    #[test]
    fn listens_on_all_interfaces() {
        let addr = ServiceConfig::default().listen_addr();
        assert_eq!(addr.to_string(), "0.0.0.0:3000");
    }
}
