// ⚙️ Configuration - reduzo.toml
//
// Every section and field is optional; missing values fall back to the
// defaults below. The file is looked up at `--config`, then $REDUZO_CONFIG,
// then ./reduzo.toml.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ProcurementError, Result};
use crate::quotation::ResponseDeadline;

pub const CONFIG_ENV_VAR: &str = "REDUZO_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "reduzo.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub dashboard: DashboardConfig,
    pub quotations: QuotationConfig,
    pub logging: LoggingConfig,
    pub seed: SeedConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Prefix for links sent to suppliers
    pub public_base_url: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        DashboardConfig {
            public_base_url: "http://localhost:3000".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuotationConfig {
    /// 0 = no deadline
    pub default_deadline_hours: u32,
}

impl Default for QuotationConfig {
    fn default() -> Self {
        QuotationConfig {
            default_deadline_hours: 24,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// EnvFilter directive, RUST_LOG wins when set
    pub filter: String,
    pub json: bool,

    /// Log file, required for logs while the dashboard owns the terminal
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            filter: "reduzo=info".to_string(),
            json: false,
            file: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
    /// JSON seed file; the built-in demo data is used when unset
    pub path: Option<PathBuf>,
}

impl AppConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(content)
            .map_err(|e| ProcurementError::Config(format!("TOML parsing error: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve and load the configuration
    ///
    /// An explicit path must exist. Without one, a missing default file
    /// just means defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            return Self::from_file(path);
        }

        let default_path = Path::new(DEFAULT_CONFIG_FILE);
        if default_path.exists() {
            Self::from_file(default_path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(ProcurementError::Config("server.port must be greater than 0".to_string()));
        }
        if self.server.host.trim().is_empty() {
            return Err(ProcurementError::Config("server.host must not be empty".to_string()));
        }
        if self.dashboard.public_base_url.trim().is_empty() {
            return Err(ProcurementError::Config(
                "dashboard.public_base_url must not be empty".to_string(),
            ));
        }
        if ResponseDeadline::from_hours(self.quotations.default_deadline_hours).is_none() {
            let valid: Vec<String> = ResponseDeadline::OPTIONS
                .iter()
                .map(|d| d.hours().unwrap_or(0).to_string())
                .collect();
            return Err(ProcurementError::Config(format!(
                "quotations.default_deadline_hours = {} is not one of: {}",
                self.quotations.default_deadline_hours,
                valid.join(", ")
            )));
        }
        Ok(())
    }

    pub fn default_deadline(&self) -> ResponseDeadline {
        ResponseDeadline::from_hours(self.quotations.default_deadline_hours).unwrap_or_default()
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_gives_defaults() {
        let config = AppConfig::from_toml_str("").unwrap();

        assert_eq!(config, AppConfig::default());
        assert_eq!(config.bind_address(), "127.0.0.1:3000");
        assert_eq!(config.default_deadline(), ResponseDeadline::Hours(24));
    }

    #[test]
    fn test_partial_sections() {
        let config = AppConfig::from_toml_str(
            r#"
            [server]
            port = 8080

            [quotations]
            default_deadline_hours = 0

            [logging]
            json = true
            file = "reduzo.log"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.default_deadline(), ResponseDeadline::NoDeadline);
        assert!(config.logging.json);
        assert_eq!(config.logging.filter, "reduzo=info");
        assert_eq!(config.logging.file, Some(PathBuf::from("reduzo.log")));
    }

    #[test]
    fn test_validation_errors() {
        assert!(AppConfig::from_toml_str("[server]\nport = 0").is_err());
        assert!(AppConfig::from_toml_str("[dashboard]\npublic_base_url = \" \"").is_err());

        let err = AppConfig::from_toml_str("[quotations]\ndefault_deadline_hours = 5").unwrap_err();
        assert!(err.to_string().contains("not one of"));

        let err = AppConfig::from_toml_str("[server\nport = 1").unwrap_err();
        assert!(err.to_string().contains("TOML parsing error"));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reduzo.toml");
        std::fs::write(&path, "[dashboard]\npublic_base_url = \"https://compras.example.com\"\n").unwrap();

        let config = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(config.dashboard.public_base_url, "https://compras.example.com");

        assert!(AppConfig::load(Some(&dir.path().join("missing.toml"))).is_err());
    }
}
